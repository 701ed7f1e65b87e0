pub mod error;
pub mod health;
pub mod registry;
pub mod tenant;

use axum::{
    Router,
    routing::{get, post},
};

use crate::infrastructure::AppState;

pub use error::ApiError;
pub use tenant::{TENANT_HEADER, TenantId};

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Registry catalogue
        .route("/registry", get(registry::list_entries))
        .route("/registry/:kind", get(registry::list_kind))
        .route(
            "/registry/:kind/:name",
            get(registry::describe_entry).post(registry::invoke_entry),
        )
        .route("/registry/:kind/:name/batch", post(registry::invoke_batch))
        .with_state(state)
}
