use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use super::ListArgs;
use crate::models::{CommentReq, Submission};
use crate::services::submission_service;
use crate::AppState;

/// 用户提交新词条
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Submission>,
) -> impl IntoResponse {
    match submission_service::submit(&state, payload).await {
        Ok(_) => StatusCode::CREATED.into_response(),
        Err(e) => e.into_response(),
    }
}

/// 管理员获取待审核列表
pub async fn list_pending(
    State(state): State<Arc<AppState>>,
    Query(args): Query<ListArgs>,
) -> impl IntoResponse {
    let pg = state.paginate(args.page, args.per_page);
    match submission_service::list_pending(&state, args.lang.as_deref(), &pg).await {
        Ok(res) => (StatusCode::OK, Json(res)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 管理员通过投稿
pub async fn approve(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match submission_service::approve(&state, id).await {
        Ok(_) => StatusCode::OK.into_response(),
        Err(e) => e.into_response(),
    }
}

/// 管理员拒绝投稿
pub async fn reject(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match submission_service::reject(&state, id).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_all_pending(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match submission_service::delete_all_pending(&state).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// 用户对词条提意见
pub async fn submit_comment(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CommentReq>,
) -> impl IntoResponse {
    match submission_service::submit_comment(&state, payload).await {
        Ok(id) => (StatusCode::CREATED, Json(serde_json::json!({ "id": id }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_comments(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match submission_service::list_comments(&state).await {
        Ok(list) => (StatusCode::OK, Json(list)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match submission_service::delete_comment(&state, id).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
