use uuid::Uuid;

use crate::error::Error;
use crate::models::{Entry, Relation};
use crate::services::search_service::load_relations;
use crate::store::{tsquery, IndexTokens, Indexed};
use crate::tokenizer::{serialize_tokens, Lang, Tokenize};
use crate::AppState;

/// 决定词条的索引方式:
/// 1. 请求中已带 tokens 的直接使用
/// 2. 内置词典交给存储引擎
/// 3. 其余由分词器生成并序列化
pub fn index_tokens(lang: &Lang, e: &Entry) -> Result<IndexTokens, Error> {
    let given = e.tokens.trim();
    if !given.is_empty() {
        tsquery::parse_vector(given).map_err(|m| Error::validation(format!("invalid tokens: {}", m)))?;
        return Ok(IndexTokens::Precomputed(given.to_string()));
    }
    if let Some(dict) = lang.tokenizer.builtin_dict() {
        return Ok(IndexTokens::Native {
            dict: dict.to_string(),
        });
    }

    let tokens = lang.tokenizer.to_tokens(&e.content_text(), &lang.id)?;
    Ok(IndexTokens::Precomputed(serialize_tokens(&tokens)))
}

/// 清理并补全词条字段, 生成索引
pub fn prepare(state: &AppState, mut e: Entry) -> Result<Indexed, Error> {
    e.content = e
        .content
        .iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    if e.content.is_empty() {
        return Err(Error::validation("entry content is empty"));
    }

    let lang = state.langs.resolve(&e.lang)?;

    if e.guid.trim().is_empty() {
        e.guid = Uuid::new_v4().to_string();
    }
    if e.initial.trim().is_empty() {
        e.initial = e
            .head()
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default();
    }
    if !e.meta.is_object() {
        e.meta = serde_json::Value::Object(Default::default());
    }

    let index = index_tokens(lang, &e)?;
    Ok(Indexed { entry: e, index })
}

/// 关系类型必须属于父词条所在语言
fn check_types(state: &AppState, lang: &str, types: &[String]) -> Result<(), Error> {
    let lang = state.langs.resolve(lang)?;
    match types.iter().find(|t| !lang.has_type(t)) {
        Some(t) => Err(Error::validation(format!("unknown type '{}'", t))),
        None => Ok(()),
    }
}

/// 获取词条, 同时带回它的释义
pub async fn get_entry(state: &AppState, id: i64, guid: &str) -> Result<Entry, Error> {
    let e = state.store.get_entry(id, guid).await?;
    let status = e.status;
    let mut list = vec![e];
    load_relations(state, &mut list, None, &[], &[], status).await?;
    list.pop().ok_or(Error::NotFound)
}

pub async fn get_parents(state: &AppState, id: i64) -> Result<Vec<Entry>, Error> {
    Ok(state.store.get_parent_entries(id).await?)
}

/// 1. 新建词条
pub async fn insert_entry(state: &AppState, e: Entry) -> Result<Entry, Error> {
    let e = prepare(state, e)?;
    tracing::info!(">>> 新建词条: {} ({})", e.entry.head(), e.entry.lang);

    let id = state.store.insert_entry(&e).await?;
    tracing::info!("<<< 词条已创建: id={}", id);
    get_entry(state, id, "").await
}

/// 2. 更新词条, 没有给 tokens 时按新内容重新分词
pub async fn update_entry(state: &AppState, id: i64, e: Entry) -> Result<Entry, Error> {
    let e = prepare(state, e)?;
    tracing::info!(">>> 更新词条: id={}", id);

    state.store.update_entry(id, &e).await?;
    get_entry(state, id, "").await
}

/// 3. 删除词条
///
/// 作为其他词条的释义时需要 `force`; 删除只去掉关系, 不删除它指向的释义词条。
pub async fn delete_entry(state: &AppState, id: i64, force: bool) -> Result<(), Error> {
    if !force {
        let parents = state.store.get_parent_entries(id).await?;
        if !parents.is_empty() {
            return Err(Error::validation(format!(
                "entry {} is a definition of {} other entries",
                id,
                parents.len()
            )));
        }
    }

    state.store.delete_entry(id).await?;
    tracing::info!("<<< 词条已删除: id={}", id);
    Ok(())
}

/// 4. 添加关系
pub async fn insert_relation(state: &AppState, from_id: i64, to_id: i64, r: Relation) -> Result<i64, Error> {
    let from = state.store.get_entry(from_id, "").await?;
    check_types(state, &from.lang, &r.types)?;

    let id = state.store.insert_relation(from_id, to_id, &r).await?;
    tracing::info!("<<< 关系已创建: {} -> {} (id={})", from_id, to_id, id);
    Ok(id)
}

/// 更新关系; 类型只需是任一已配置语言的类型
pub async fn update_relation(state: &AppState, id: i64, r: Relation) -> Result<(), Error> {
    if let Some(t) = r
        .types
        .iter()
        .find(|t| !state.langs.iter().any(|l| l.has_type(t)))
    {
        return Err(Error::validation(format!("unknown type '{}'", t)));
    }

    state.store.update_relation(id, &r).await?;
    Ok(())
}

pub async fn delete_relation(state: &AppState, id: i64) -> Result<(), Error> {
    state.store.delete_relation(id).await?;
    tracing::info!("<<< 关系已删除: id={}", id);
    Ok(())
}

/// 5. 调整同一父词条下释义的顺序
pub async fn reorder_relations(state: &AppState, ids: &[i64]) -> Result<(), Error> {
    if ids.is_empty() {
        return Err(Error::validation("no relation ids"));
    }
    state.store.reorder_relations(ids).await?;
    Ok(())
}
