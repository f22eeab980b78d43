use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use formflow_persistence::AdapterError;
use serde::Serialize;
use thiserror::Error;

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found")]
    NotFound,

    #[error("patch_error: {0}")]
    Patch(String),

    #[error("store_error: {0}")]
    Store(AdapterError),
}

impl From<AdapterError> for ApiError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::NotFound(_) => ApiError::NotFound,
            other => ApiError::Store(other),
        }
    }
}

#[derive(Serialize)]
struct JsonError {
    detail: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Patch(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(JsonError {
            detail: self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_not_found_maps_to_404() {
        let err = ApiError::from(AdapterError::NotFound("c1".to_string()));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Not found");
    }

    #[test]
    fn other_adapter_errors_are_500() {
        let err = ApiError::from(AdapterError::InvalidData("bad".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().starts_with("store_error"));
    }
}
