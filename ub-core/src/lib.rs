//! Ubicasure Core - Foundation types, error handling, configuration, and logging.
//!
//! This crate provides the shared foundation used by all other Ubicasure crates:
//! - Application configuration (backend URL, identity provider, storage)
//! - Global error types covering all error categories
//! - Structured logging with tracing
//! - Platform directory resolution
//! - Common constants (endpoints, wire values, storage keys)

pub mod config;
pub mod error;
pub mod logging;
pub mod platform;
pub mod constants;

// Re-export commonly used items at the crate root
pub use config::{AppConfig, ConfigHandle};
pub use error::{UbError, UbResult};
pub use logging::init_logging;
