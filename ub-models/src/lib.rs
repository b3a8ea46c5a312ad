//! Ubicasure Models - wire entities and local preference storage.
//!
//! This crate owns the data shapes exchanged with the backend (stations,
//! chats, messages, request and response bodies) and the small SQLite store
//! that keeps the last signed-in identity across restarts.

pub mod db;
pub mod schema;
pub mod models;
pub mod migrations;

// Re-export key types
pub use db::{Database, DbPool};
pub use models::station::{Location, Station, StationCategory, StationEntry, StationsResponse};
pub use models::chat::Chat;
pub use models::message::{Message, MessagePosition, MessageTimestamp, MessageType};
pub use models::requests::{
    ActionResponse, AlertRequest, ChatRequest, ChatResponse, ImageUpload, MessageRequest,
    ProfileRequest,
};
pub use models::preferences::Preferences;
