//! Domain layer - Pure business abstractions
//!
//! This layer contains NO framework dependencies (no Axum).
//! Only business module identities and their error types.

pub mod errors;

pub use errors::{BusinessModule, ModuleError};
