use axum::{
    extract::{Path, Query as QueryArgs, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use super::{split_list, ListArgs};
use crate::error::Error;
use crate::models::{Query, Status};
use crate::services::{search_service, suggest_service};
use crate::AppState;

/// 1. 公开检索, 结果不带数字 id, 只查 enabled
pub async fn public_search(
    State(state): State<Arc<AppState>>,
    Path((from, to, q)): Path<(String, String, String)>,
    QueryArgs(args): QueryArgs<ListArgs>,
) -> impl IntoResponse {
    let query = Query {
        query: q,
        from_lang: from,
        to_lang: to,
        types: split_list(&args.types),
        tags: split_list(&args.tags),
        status: Some(Status::Enabled),
        ..Default::default()
    };
    let pg = state.paginate(args.page, args.per_page);

    match search_service::search(&state, &query, &pg, true).await {
        Ok(res) => (StatusCode::OK, Json(res)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 2. 管理端检索, 可按状态过滤
pub async fn admin_search(
    State(state): State<Arc<AppState>>,
    Path((from, to)): Path<(String, String)>,
    QueryArgs(args): QueryArgs<ListArgs>,
) -> impl IntoResponse {
    let status = match args.status.as_deref().map(str::parse::<Status>).transpose() {
        Ok(s) => s,
        Err(msg) => return Error::Validation(msg).into_response(),
    };

    let query = Query {
        query: args.q.clone().unwrap_or_default(),
        from_lang: from,
        to_lang: to,
        types: split_list(&args.types),
        tags: split_list(&args.tags),
        status,
        ..Default::default()
    };
    let pg = state.paginate(args.page, args.per_page);

    match search_service::search(&state, &query, &pg, false).await {
        Ok(res) => (StatusCode::OK, Json(res)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 3. 自动补全
pub async fn suggestions(
    State(state): State<Arc<AppState>>,
    Path((lang, q)): Path<(String, String)>,
) -> impl IntoResponse {
    match suggest_service::suggest(&state, &lang, &q).await {
        Ok(words) => (StatusCode::OK, Json(words)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 4. 管理端重建自动补全
pub async fn rebuild_suggestions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match suggest_service::rebuild(&state).await {
        Ok(_) => StatusCode::OK.into_response(),
        Err(e) => e.into_response(),
    }
}
