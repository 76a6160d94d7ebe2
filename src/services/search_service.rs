use std::collections::HashMap;

use crate::cache;
use crate::error::Error;
use crate::models::{Entry, Pagination, Query, SearchResults, Status};
use crate::services::rank::RankParams;
use crate::store::{RelationParams, SearchParams};
use crate::tokenizer::{Lang, Tokenize};
use crate::AppState;

/// 校验查询, 返回源语言。任何一项不合法都在访问存储前拒绝
pub fn validate<'a>(state: &'a AppState, q: &Query) -> Result<&'a Lang, Error> {
    if q.query.trim().is_empty() {
        return Err(Error::validation("empty query"));
    }

    let lang = state.langs.resolve(&q.from_lang)?;
    if let Some(to) = q.to_lang_filter() {
        state.langs.resolve(to)?;
    }

    if let Some(t) = q.types.iter().find(|t| !lang.has_type(t)) {
        return Err(Error::validation(format!("unknown type '{}'", t)));
    }

    Ok(lang)
}

/// 检索词条并挂载释义
///
/// `public` 为 true 时结果会清空数字 id, 并读写缓存。
pub async fn search(state: &AppState, q: &Query, pg: &Pagination, public: bool) -> Result<SearchResults, Error> {
    let mut q = q.clone();
    q.offset = pg.offset;
    q.limit = pg.limit;

    let lang = validate(state, &q)?;
    let text = q.query.trim().to_string();

    let cache_key = cache::search_key(&q);
    if public {
        if let Some(res) = state.cache_get::<SearchResults>(&cache_key) {
            tracing::debug!("<<< 命中缓存: {}", text);
            return Ok(res);
        }
    }

    tracing::info!(">>> 检索: '{}' ({} -> {})", text, q.from_lang, q.to_lang);

    let precomputed = lang.tokenizer.to_query(&text, &lang.id).map_err(|e| {
        tracing::warn!("!!! 分词失败 ({}): {}", lang.id, e);
        e
    })?;

    let params = SearchParams {
        raw_query: text.clone(),
        builtin_dict: lang.tokenizer.builtin_dict().unwrap_or_default().to_string(),
        precomputed_query: precomputed,
        lang: lang.id.clone(),
        types: q.types.clone(),
        tags: q.tags.clone(),
        status: q.status(),
        offset: q.offset,
        limit: q.limit,
        rank: RankParams::from(&state.config.search),
    };

    let (mut entries, total) = state.store.search(&params).await?;
    if entries.is_empty() {
        tracing::info!("--- 没有结果: '{}'", text);
    } else {
        load_relations(state, &mut entries, q.to_lang_filter(), &q.types, &q.tags, q.status()).await?;
    }

    if public {
        entries.iter_mut().for_each(Entry::zero_ids);
    }

    let res = SearchResults {
        entries,
        page: pg.page,
        per_page: pg.per_page,
        total,
        total_pages: pg.total_pages(total),
    };

    if public {
        state.cache_put(&cache_key, &res);
    }

    tracing::info!("<<< 检索完成: '{}', 共 {} 条", text, total);
    Ok(res)
}

/// 一次查询取回所有父词条的释义, 再按 id -> 下标 挂回各自的父词条
pub async fn load_relations(
    state: &AppState,
    entries: &mut [Entry],
    to_lang: Option<&str>,
    types: &[String],
    tags: &[String],
    status: Status,
) -> Result<(), Error> {
    let mut index = HashMap::with_capacity(entries.len());
    for (i, e) in entries.iter_mut().enumerate() {
        e.relations = Vec::new();
        index.insert(e.id, i);
    }

    let params = RelationParams {
        parent_ids: entries.iter().map(|e| e.id).collect(),
        to_lang: to_lang.map(String::from),
        types: types.to_vec(),
        tags: tags.to_vec(),
        status,
    };

    for rel in state.store.search_relations(&params).await? {
        if let Some(&i) = index.get(&rel.from_id) {
            entries[i].relations.push(rel.entry);
        }
    }
    Ok(())
}
