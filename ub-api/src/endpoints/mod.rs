//! API endpoint modules organized by category.
//!
//! Each module adds typed methods on [`ApiClient`](crate::ApiClient) for a
//! group of related backend routes.

pub mod stations;
pub mod chats;
pub mod messages;
pub mod users;
pub mod alerts;
