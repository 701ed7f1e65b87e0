pub mod api;
pub mod api_docs;
pub mod domain;
pub mod import;
pub mod infrastructure;
pub mod registry;

pub use infrastructure::config;
pub use infrastructure::server;
pub use registry::{Registry, RegistryError};
