//! Domain error types
//!
//! Every registry entry belongs to a business module. When an invocation
//! fails, the registry error is wrapped with that module and the caller's
//! tenant so logs and API responses say where the failure came from.

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

use crate::registry::RegistryError;

/// ERP business module owning a registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BusinessModule {
    Accounting,
    Commercial,
    Inventory,
    Treasury,
    Hr,
    Purchase,
    /// The catalogue itself (unknown entries, malformed batches)
    Registry,
}

impl BusinessModule {
    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessModule::Accounting => "accounting",
            BusinessModule::Commercial => "commercial",
            BusinessModule::Inventory => "inventory",
            BusinessModule::Treasury => "treasury",
            BusinessModule::Hr => "hr",
            BusinessModule::Purchase => "purchase",
            BusinessModule::Registry => "registry",
        }
    }
}

impl fmt::Display for BusinessModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registry failure attributed to a business module and tenant
#[derive(Debug, Error)]
#[error("{module} error: {source}")]
pub struct ModuleError {
    pub module: BusinessModule,
    pub tenant_id: Option<String>,
    #[source]
    pub source: RegistryError,
}

impl ModuleError {
    pub fn new(module: BusinessModule, tenant_id: Option<String>, source: RegistryError) -> Self {
        Self {
            module,
            tenant_id,
            source,
        }
    }

    /// Failure of the catalogue itself rather than of an entry
    pub fn registry(tenant_id: Option<String>, source: RegistryError) -> Self {
        Self::new(BusinessModule::Registry, tenant_id, source)
    }

    pub fn message(&self) -> String {
        self.source.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_error_display_names_module() {
        let err = ModuleError::new(
            BusinessModule::Accounting,
            Some("tenant-42".to_string()),
            RegistryError::missing("rate"),
        );

        assert_eq!(
            err.to_string(),
            "accounting error: missing required field 'rate'"
        );
        assert_eq!(err.message(), "missing required field 'rate'");
        assert_eq!(err.tenant_id.as_deref(), Some("tenant-42"));
    }
}
