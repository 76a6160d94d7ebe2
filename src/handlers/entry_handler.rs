use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use super::ListArgs;
use crate::models::{Entry, Relation};
use crate::services::entry_service;
use crate::AppState;

/// 1. 创建词条
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Entry>,
) -> impl IntoResponse {
    match entry_service::insert_entry(&state, payload).await {
        Ok(e) => (StatusCode::CREATED, Json(e)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 2. 获取词条及其释义
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match entry_service::get_entry(&state, id, "").await {
        Ok(e) => (StatusCode::OK, Json(e)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_parents(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match entry_service::get_parents(&state, id).await {
        Ok(list) => (StatusCode::OK, Json(list)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 3. 更新词条
pub async fn update_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<Entry>,
) -> impl IntoResponse {
    match entry_service::update_entry(&state, id, payload).await {
        Ok(e) => (StatusCode::OK, Json(e)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 4. 删除词条, `?force=true` 时即使被引用也删除
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(args): Query<ListArgs>,
) -> impl IntoResponse {
    match entry_service::delete_entry(&state, id, args.force).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// 5. 为词条添加释义
pub async fn create_relation(
    State(state): State<Arc<AppState>>,
    Path((from_id, to_id)): Path<(i64, i64)>,
    Json(payload): Json<Relation>,
) -> impl IntoResponse {
    match entry_service::insert_relation(&state, from_id, to_id, payload).await {
        Ok(id) => (StatusCode::CREATED, Json(serde_json::json!({ "id": id }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_relation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<Relation>,
) -> impl IntoResponse {
    match entry_service::update_relation(&state, id, payload).await {
        Ok(_) => StatusCode::OK.into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_relation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match entry_service::delete_relation(&state, id).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// 6. 按给定的关系 id 顺序重排释义
pub async fn reorder_relations(
    State(state): State<Arc<AppState>>,
    Path(_id): Path<i64>,
    Json(ids): Json<Vec<i64>>,
) -> impl IntoResponse {
    match entry_service::reorder_relations(&state, &ids).await {
        Ok(_) => StatusCode::OK.into_response(),
        Err(e) => e.into_response(),
    }
}
