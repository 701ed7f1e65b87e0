use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

pub const TENANT_HEADER: &str = "X-Tenant-ID";

/// Caller's tenant, taken from the `X-Tenant-ID` header when present.
/// Only used to label logs and error responses.
#[derive(Debug, Clone, Default)]
pub struct TenantId(pub Option<String>);

impl TenantId {
    /// Label for log lines
    pub fn label(&self) -> &str {
        self.0.as_deref().unwrap_or("-")
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for TenantId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let tenant = parts
            .headers
            .get(TENANT_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        Ok(TenantId(tenant))
    }
}
