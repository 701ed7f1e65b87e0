//! Registry error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// No entry registered under this id
    #[error("registry entry not found: {id}")]
    NotFound { id: String },

    /// The payload is not shaped like an entry input (e.g. not a JSON object)
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("missing required field '{field}'")]
    MissingField { field: String },

    #[error("invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RegistryError {
    pub fn missing(field: &str) -> Self {
        RegistryError::MissingField {
            field: field.to_string(),
        }
    }

    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        RegistryError::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Name of the offending input field, if the error is tied to one
    pub fn field(&self) -> Option<&str> {
        match self {
            RegistryError::MissingField { field } | RegistryError::InvalidField { field, .. } => {
                Some(field)
            }
            _ => None,
        }
    }

    /// Prefix the field name, used when reading nested objects (`lines[2].quantity`)
    pub(crate) fn nested(self, prefix: &str) -> Self {
        match self {
            RegistryError::MissingField { field } => RegistryError::MissingField {
                field: format!("{}.{}", prefix, field),
            },
            RegistryError::InvalidField { field, reason } => RegistryError::InvalidField {
                field: format!("{}.{}", prefix, field),
                reason,
            },
            other => other,
        }
    }
}
