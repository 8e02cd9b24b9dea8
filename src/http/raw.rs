//! Raw payload download.

use crate::app::AppState;
use axum::{
  extract::{Path as AxumPath, State},
  http::{HeaderMap, StatusCode, header},
  response::IntoResponse,
};
use tracing::error;
use uuid::Uuid;

/// Serve the exact captured bytes as an `.eml` download.
pub async fn download_raw(
  State(state): State<AppState>,
  AxumPath(id): AxumPath<Uuid>,
) -> impl IntoResponse {
  let detail = match state.store.get_message(id).await {
    Ok(Some(d)) => d,
    Ok(None) => return (StatusCode::NOT_FOUND, "message not found").into_response(),
    Err(e) => {
      error!("download_raw error: {e}");
      return (StatusCode::INTERNAL_SERVER_ERROR, "store error").into_response();
    }
  };

  match tokio::fs::read(&detail.raw_path).await {
    Ok(bytes) => {
      let mut headers = HeaderMap::new();
      headers.insert(header::CONTENT_TYPE, "message/rfc822".parse().unwrap());
      headers.insert(
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{id}.eml\"").parse().unwrap(),
      );
      (headers, bytes).into_response()
    }
    Err(e) => {
      error!("raw file for {id} unreadable: {e}");
      (StatusCode::NOT_FOUND, "raw message missing").into_response()
    }
  }
}
