use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::error::{ApiError, Result};
use crate::state::AppState;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "ok": true }))
}

/// Reachability of the conversation store.
pub async fn store_health(state: web::Data<AppState>) -> Result<HttpResponse> {
    if let Err(error) = state.conversations.health().await {
        log::error!("Conversation store is unavailable: {}", error);
        return Err(ApiError::Store(error));
    }
    Ok(HttpResponse::Ok().json(json!({ "store": "ok" })))
}
