//! Ubicasure API - HTTP client for the Ubicasure backend.
//!
//! Typed access to the station directory, chat, message, user registration
//! and alert endpoints, plus a thin client for the identity provider's REST
//! interface. Requests are never retried; callers decide what a failure means.

pub mod client;
pub mod endpoints;
pub mod identity;
pub mod response;

// Re-export key types
pub use client::ApiClient;
pub use endpoints::chats::{ChatCreation, ChatExistence};
pub use identity::{IdentityClient, IdentityRecord};
pub use response::ErrorBody;
