//! Entity model definitions.

pub mod station;
pub mod chat;
pub mod message;
pub mod requests;
pub mod preferences;
