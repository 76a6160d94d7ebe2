use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use super::ListArgs;
use crate::services::glossary_service;
use crate::AppState;

pub async fn list_initials(
    State(state): State<Arc<AppState>>,
    Path(lang): Path<String>,
) -> impl IntoResponse {
    match glossary_service::initials(&state, &lang).await {
        Ok(list) => (StatusCode::OK, Json(list)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_words(
    State(state): State<Arc<AppState>>,
    Path((lang, initial)): Path<(String, String)>,
    Query(args): Query<ListArgs>,
) -> impl IntoResponse {
    let pg = state.paginate(args.page, args.per_page);
    match glossary_service::words(&state, &lang, &initial, &pg, true).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match glossary_service::stats(&state).await {
        Ok(s) => (StatusCode::OK, Json(s)).into_response(),
        Err(e) => e.into_response(),
    }
}
