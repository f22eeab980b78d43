use actix_web::{web, HttpResponse};
use formflow_persistence::{StateSnapshot, StepAppend};
use serde_json::json;

use crate::dto::{CreateConversationRequest, RenameConversationRequest};
use crate::error::Result;
use crate::state::AppState;

fn ok() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "ok": true }))
}

/// Create a conversation and return the full record. A blank title is
/// replaced by the generated id.
pub async fn create(
    state: web::Data<AppState>,
    payload: web::Json<CreateConversationRequest>,
) -> Result<HttpResponse> {
    let payload = payload.into_inner();
    let title = payload
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty());

    let handle = state.conversations.create(title, &payload.initial).await?;
    let record = state.conversations.load(&handle.id).await?;
    log::info!("[{}] Conversation created: {}", record.id, record.title);
    Ok(HttpResponse::Ok().json(record))
}

pub async fn list(state: web::Data<AppState>) -> Result<HttpResponse> {
    let items = state.conversations.list().await?;
    Ok(HttpResponse::Ok().json(json!({ "items": items })))
}

pub async fn get(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let record = state.conversations.load(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(record))
}

pub async fn rename(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<RenameConversationRequest>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    state.conversations.rename(&id, &payload.title).await?;
    log::debug!("[{}] Conversation renamed", id);
    Ok(ok())
}

pub async fn append_step(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<StepAppend>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    state.conversations.append_step(&id, &payload).await?;
    log::debug!(
        "[{}] Step appended: {} ({}, {} ops)",
        id,
        payload.template_path,
        payload.mode,
        payload.ops.len()
    );
    Ok(ok())
}

pub async fn undo(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let id = path.into_inner();
    state.conversations.undo(&id).await?;
    log::debug!("[{}] Last step removed", id);
    Ok(ok())
}

pub async fn reset(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let id = path.into_inner();
    state.conversations.reset(&id).await?;
    log::info!("[{}] Conversation history reset", id);
    Ok(ok())
}

pub async fn save_state(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<StateSnapshot>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    state.conversations.save_state(&id, &payload).await?;
    log::debug!(
        "[{}] State saved ({} pending steps)",
        id,
        payload.pending_steps.len()
    );
    Ok(ok())
}
