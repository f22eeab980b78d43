use actix_web::{web, HttpResponse};
use formflow_core::Template;
use uuid::Uuid;

use crate::dto::{CreateTemplateRequest, StoredTemplate};
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Templates are stored raw. A body that does not parse is kept but logged.
pub async fn create(
    state: web::Data<AppState>,
    payload: web::Json<CreateTemplateRequest>,
) -> Result<HttpResponse> {
    let payload = payload.into_inner();
    if let Err(error) = Template::from_yaml(&payload.yaml) {
        log::warn!("Storing template that does not parse: {}", error);
    }

    let template = StoredTemplate {
        id: Uuid::new_v4().simple().to_string(),
        yaml: payload.yaml,
        name: payload.name,
    };
    state.templates.insert(&template.id, template.clone()).await?;
    log::info!("[{}] Template stored", template.id);
    Ok(HttpResponse::Ok().json(template))
}

pub async fn get(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let id = path.into_inner();
    let template = state.templates.get(&id).await?.ok_or(ApiError::NotFound)?;
    Ok(HttpResponse::Ok().json(template))
}
