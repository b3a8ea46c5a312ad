//! Request and response bodies exchanged with the REST backend.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use ub_core::constants::wire;

/// `POST /messages/` body for a text message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRequest {
    #[serde(rename = "chatId")]
    pub chat_id: String,
    pub sender: String,
    #[serde(rename = "type")]
    pub message_type: String,
    pub position: String,
    pub data: String,
}

impl MessageRequest {
    /// A text message authored on this device.
    pub fn text(chat_id: impl Into<String>, sender: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            sender: sender.into(),
            message_type: wire::TYPE_TEXT.to_string(),
            position: wire::POSITION_RIGHT.to_string(),
            data: data.into(),
        }
    }
}

/// Multipart image upload: the text fields plus the file to attach as `data`.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub chat_id: String,
    pub sender: String,
    pub path: PathBuf,
    pub file_name: String,
    pub mime_type: String,
}

/// `POST /chats/` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub sender: String,
    pub receiver: String,
}

/// `POST /chats/` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub users: Vec<String>,
}

/// Generic `{success, message}` reply of send and delete calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// `POST /alerts` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRequest {
    pub email: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// `POST /users/register` body, sent after the credential account exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub firebase_uid: String,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub birth_date: String,
    pub blood_type: String,
}
