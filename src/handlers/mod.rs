use axum::{
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::AppState;

pub mod entry_handler;
pub mod glossary_handler;
pub mod search_handler;
pub mod submission_handler;

/// 通用的查询串参数, 列表用逗号分隔
#[derive(Debug, Default, Deserialize)]
pub struct ListArgs {
    pub q: Option<String>,
    pub types: Option<String>,
    pub tags: Option<String>,
    pub status: Option<String>,
    pub lang: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    #[serde(default)]
    pub force: bool,
}

/// `a, b,,c` -> ["a", "b", "c"]
pub fn split_list(raw: &Option<String>) -> Vec<String> {
    raw.as_deref()
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// 公开接口
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/dictionary/:from/:to/:q", get(search_handler::public_search))
        .route("/api/glossary/:lang", get(glossary_handler::list_initials))
        .route("/api/glossary/:lang/:initial", get(glossary_handler::list_words))
        .route("/api/stats", get(glossary_handler::get_stats))
        .route("/api/suggestions/:lang/:q", get(search_handler::suggestions))
        .route("/api/submissions", post(submission_handler::submit))
        .route("/api/submissions/comments", post(submission_handler::submit_comment))
}

/// 管理接口, 需挂在外部鉴权之后
pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/search/:from/:to", get(search_handler::admin_search))
        // 词条
        .route("/api/admin/entries", post(entry_handler::create_entry))
        .route(
            "/api/admin/entries/:id",
            get(entry_handler::get_entry)
                .put(entry_handler::update_entry)
                .delete(entry_handler::delete_entry),
        )
        .route("/api/admin/entries/:id/parents", get(entry_handler::get_parents))
        // 关系
        .route(
            "/api/admin/entries/:id/relations/:to_id",
            post(entry_handler::create_relation),
        )
        .route(
            "/api/admin/entries/:id/relations/weights",
            put(entry_handler::reorder_relations),
        )
        .route(
            "/api/admin/relations/:id",
            put(entry_handler::update_relation).delete(entry_handler::delete_relation),
        )
        // 投稿审核
        .route(
            "/api/admin/pending",
            get(submission_handler::list_pending).delete(submission_handler::delete_all_pending),
        )
        .route(
            "/api/admin/submissions/:id",
            put(submission_handler::approve).delete(submission_handler::reject),
        )
        .route("/api/admin/comments", get(submission_handler::list_comments))
        .route("/api/admin/comments/:id", delete(submission_handler::delete_comment))
        .route("/api/admin/suggestions", post(search_handler::rebuild_suggestions))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(admin_routes())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(&Some("noun, verb,,".into())), vec!["noun", "verb"]);
        assert!(split_list(&None).is_empty());
    }
}
