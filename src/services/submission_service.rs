use crate::error::Error;
use crate::models::{Comment, CommentReq, Entry, Pagination, Relation, SearchResults, Status, Submission};
use crate::services::entry_service::prepare;
use crate::services::search_service::load_relations;
use crate::AppState;

/// 公开投稿: 新词条及可选的释义, 全部为 pending, 一个事务内写入
pub async fn submit(state: &AppState, sub: Submission) -> Result<i64, Error> {
    if !state.config.app.enable_submissions {
        return Err(Error::validation("submissions are disabled"));
    }

    let relation = Relation::from(sub.relation);
    let head = prepare(state, Entry::from(sub.entry))?;
    tracing::info!(">>> 收到投稿: {} ({})", head.entry.head(), head.entry.lang);

    let definition = match sub.definition {
        Some(def) => {
            let lang = state.langs.resolve(&head.entry.lang)?;
            if let Some(t) = relation.types.iter().find(|t| !lang.has_type(t)) {
                return Err(Error::validation(format!("unknown type '{}'", t)));
            }
            Some(prepare(state, Entry::from(def))?)
        }
        None => None,
    };

    let id = state
        .store
        .insert_submission(&head, definition.as_ref().map(|d| (d, &relation)))
        .await
        .map_err(|e| {
            tracing::error!("!!! 投稿写入失败: {}", e);
            e
        })?;

    tracing::info!("<<< 投稿已保存: id={}", id);
    Ok(id)
}

/// 待审核列表, 每个词条带上它的待审释义
pub async fn list_pending(state: &AppState, lang: Option<&str>, pg: &Pagination) -> Result<SearchResults, Error> {
    let (mut entries, total) = state.store.get_pending_entries(lang, pg.offset, pg.limit).await?;
    load_relations(state, &mut entries, None, &[], &[], Status::Pending).await?;

    Ok(SearchResults {
        entries,
        page: pg.page,
        per_page: pg.per_page,
        total,
        total_pages: pg.total_pages(total),
    })
}

pub async fn approve(state: &AppState, id: i64) -> Result<(), Error> {
    state.store.approve_submission(id).await?;
    tracing::info!("<<< 投稿已通过: id={}", id);
    Ok(())
}

pub async fn reject(state: &AppState, id: i64) -> Result<(), Error> {
    state.store.reject_submission(id).await?;
    tracing::info!("<<< 投稿已拒绝: id={}", id);
    Ok(())
}

pub async fn delete_all_pending(state: &AppState) -> Result<(), Error> {
    state.store.delete_all_pending().await?;
    tracing::info!("<<< 已清空待审核投稿");
    Ok(())
}

/// 公开用户对词条提意见, 与投稿共用开关
pub async fn submit_comment(state: &AppState, req: CommentReq) -> Result<i64, Error> {
    if !state.config.app.enable_submissions {
        return Err(Error::validation("submissions are disabled"));
    }
    if req.from_guid.trim().is_empty() {
        return Err(Error::validation("from_guid is required"));
    }
    let text = req.comments.trim();
    if text.is_empty() {
        return Err(Error::validation("comments is required"));
    }

    let id = state
        .store
        .insert_comment(req.from_guid.trim(), req.to_guid.trim(), text)
        .await?;
    tracing::info!("<<< 收到意见: id={} entry={}", id, req.from_guid);
    Ok(id)
}

pub async fn list_comments(state: &AppState) -> Result<Vec<Comment>, Error> {
    Ok(state.store.get_comments().await?)
}

pub async fn delete_comment(state: &AppState, id: i64) -> Result<(), Error> {
    state.store.delete_comment(id).await?;
    tracing::info!("<<< 意见已删除: id={}", id);
    Ok(())
}
