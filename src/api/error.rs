use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::domain::ModuleError;
use crate::registry::RegistryError;

/// Error returned by the registry handlers
#[derive(Debug)]
pub enum ApiError {
    /// Path segment is not one of the four registry families
    UnknownKind(String),
    BatchTooLarge { size: usize, limit: usize },
    Module(ModuleError),
}

impl From<ModuleError> for ApiError {
    fn from(e: ModuleError) -> Self {
        ApiError::Module(e)
    }
}

fn status_for(error: &RegistryError) -> StatusCode {
    match error {
        RegistryError::NotFound { .. } => StatusCode::NOT_FOUND,
        RegistryError::InvalidPayload(_)
        | RegistryError::MissingField { .. }
        | RegistryError::InvalidField { .. }
        | RegistryError::Csv(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RegistryError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::UnknownKind(kind) => (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "success": false,
                    "error": format!("Unknown registry family '{}'", kind)
                })),
            )
                .into_response(),
            ApiError::BatchTooLarge { size, limit } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({
                    "success": false,
                    "error": format!("Batch of {} records exceeds the limit of {}", size, limit)
                })),
            )
                .into_response(),
            ApiError::Module(e) => {
                let status = status_for(&e.source);
                if status.is_server_error() {
                    tracing::error!(tenant = ?e.tenant_id, "{}", e);
                } else {
                    tracing::warn!(tenant = ?e.tenant_id, "{}", e);
                }

                let mut body = json!({
                    "success": false,
                    "module": e.module,
                    "error": e.message(),
                });
                if let Some(field) = e.source.field() {
                    body["field"] = json!(field);
                }
                if let Some(tenant) = &e.tenant_id {
                    body["tenant_id"] = json!(tenant);
                }

                (status, Json(body)).into_response()
            }
        }
    }
}
