//! Configuration and the service-level error taxonomy.

pub mod config;
pub mod errors;

pub use config::Settings;
pub use errors::ServiceError;
