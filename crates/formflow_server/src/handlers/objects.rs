use actix_web::{web, HttpResponse};
use formflow_core::{apply_patch, Operation};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::dto::{ApplyPatchRequest, CreateObjectRequest, ObjectResponse};
use crate::error::{ApiError, Result};
use crate::state::AppState;

pub async fn create(
    state: web::Data<AppState>,
    payload: web::Json<CreateObjectRequest>,
) -> Result<HttpResponse> {
    let id = Uuid::new_v4().simple().to_string();
    state.objects.insert(&id, payload.into_inner().doc).await?;
    log::info!("[{}] Object stored", id);
    Ok(HttpResponse::Ok().json(json!({ "id": id })))
}

pub async fn get(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let id = path.into_inner();
    let doc = state.objects.get(&id).await?.ok_or(ApiError::NotFound)?;
    Ok(HttpResponse::Ok().json(ObjectResponse { id, doc }))
}

/// Apply a patch to a stored object. The object is replaced only when every
/// operation succeeds.
pub async fn apply(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<ApplyPatchRequest>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let ops: Vec<Operation> = serde_json::from_value(Value::Array(payload.into_inner().patch))
        .map_err(|err| ApiError::Patch(err.to_string()))?;

    let updated = state
        .objects
        .update(&id, |doc| {
            apply_patch(doc, &ops).map_err(|err| {
                log::warn!("[{}] Rejected patch: {}", id, err);
                ApiError::Patch(err.to_string())
            })
        })
        .await?;

    log::debug!("[{}] Applied {} operations", id, ops.len());
    Ok(HttpResponse::Ok().json(ObjectResponse { id, doc: updated }))
}
