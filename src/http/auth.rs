//! Bearer-token guard for the message routes.

use crate::app::AppState;
use axum::{
  extract::{Request, State},
  http::{StatusCode, header},
  middleware::Next,
  response::{IntoResponse, Response},
};

/// Require `Authorization: Bearer <token>` when a token is configured.
///
/// With no token configured every request passes, which is the usual
/// local-dev setup.
pub async fn bearer_guard(State(state): State<AppState>, req: Request, next: Next) -> Response {
  let Some(expected) = state.api_token.as_deref() else {
    return next.run(req).await;
  };

  let supplied = req
    .headers()
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "));

  match supplied {
    Some(token) if token == expected => next.run(req).await,
    Some(_) => (StatusCode::UNAUTHORIZED, "invalid token").into_response(),
    None => (StatusCode::UNAUTHORIZED, "missing token").into_response(),
  }
}
