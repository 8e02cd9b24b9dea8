//! HTTP router and handlers.

use crate::app::AppState;
use axum::{Json, Router, middleware, routing::get};
use serde_json::json;

pub mod auth;
pub mod messages;
pub mod raw;

/// Assemble the HTTP router with all routes.
///
/// Everything under `/messages` sits behind the bearer guard; the
/// health probe stays open.
pub fn build_router(state: AppState) -> Router {
    let guarded = Router::new()
        .route("/messages", get(messages::list_messages))
        .route(
            "/messages/:id",
            get(messages::get_message).delete(messages::delete_message),
        )
        .route("/messages/:id/preview", get(messages::preview_message))
        .route("/messages/:id/raw", get(raw::download_raw))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::bearer_guard,
        ));

    Router::new()
        .route("/healthz", get(healthz))
        .merge(guarded)
        .with_state(state)
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}
