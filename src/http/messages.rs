//! Message JSON APIs: list, detail, preview, delete.

use crate::{app::AppState, preview, store};
use axum::{
  Json,
  extract::{Path as AxumPath, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::error;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub limit: Option<u32>,
  pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
  pub headers: HashMap<String, String>,
  pub body: String,
}

pub async fn list_messages(
  State(state): State<AppState>,
  Query(params): Query<ListParams>,
) -> impl IntoResponse {
  let limit = params.limit.unwrap_or(100).clamp(1, 500);
  match state.store.list_messages(limit).await {
    Ok(rows) => {
      let q = params.q.as_deref().unwrap_or("");
      Json(store::filter_summaries(rows, q)).into_response()
    }
    Err(e) => {
      error!("list_messages error: {e}");
      (StatusCode::INTERNAL_SERVER_ERROR, "store error").into_response()
    }
  }
}

pub async fn get_message(
  State(state): State<AppState>,
  AxumPath(id): AxumPath<Uuid>,
) -> impl IntoResponse {
  match state.store.get_message(id).await {
    Ok(Some(detail)) => Json(detail).into_response(),
    Ok(None) => (StatusCode::NOT_FOUND, "message not found").into_response(),
    Err(e) => {
      error!("get_message error: {e}");
      (StatusCode::INTERNAL_SERVER_ERROR, "store error").into_response()
    }
  }
}

pub async fn preview_message(
  State(state): State<AppState>,
  AxumPath(id): AxumPath<Uuid>,
) -> impl IntoResponse {
  match state.store.get_message(id).await {
    Ok(Some(detail)) => {
      let (headers, body) = preview::extract_file(&detail.raw_path).await;
      Json(PreviewResponse { headers, body }).into_response()
    }
    Ok(None) => (StatusCode::NOT_FOUND, "message not found").into_response(),
    Err(e) => {
      error!("preview_message error: {e}");
      (StatusCode::INTERNAL_SERVER_ERROR, "store error").into_response()
    }
  }
}

pub async fn delete_message(
  State(state): State<AppState>,
  AxumPath(id): AxumPath<Uuid>,
) -> impl IntoResponse {
  match state.store.delete_message(id).await {
    Ok(true) => StatusCode::NO_CONTENT.into_response(),
    Ok(false) => (StatusCode::NOT_FOUND, "message not found").into_response(),
    Err(e) => {
      error!("delete_message error: {e}");
      (StatusCode::INTERNAL_SERVER_ERROR, "store error").into_response()
    }
  }
}
