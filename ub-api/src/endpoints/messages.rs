//! Message endpoints.

use tracing::debug;

use ub_core::constants::wire;
use ub_core::error::{UbError, UbResult};
use ub_models::{ActionResponse, ImageUpload, MessageRequest};

use crate::client::ApiClient;

impl ApiClient {
    /// Post a text message as JSON.
    pub async fn send_message(&self, request: &MessageRequest) -> UbResult<ActionResponse> {
        let body = serde_json::to_value(request)?;
        self.post_json("/messages/", &body).await
    }

    /// Upload an image message as multipart form data.
    ///
    /// The file is read fully into memory; images are small enough that
    /// streaming buys nothing here.
    pub async fn send_image(&self, upload: &ImageUpload) -> UbResult<ActionResponse> {
        let bytes = tokio::fs::read(&upload.path).await?;
        debug!(
            "uploading {} ({} bytes, {})",
            upload.file_name,
            bytes.len(),
            upload.mime_type
        );

        let file_part = reqwest::multipart::Part::bytes(bytes)
            .file_name(upload.file_name.clone())
            .mime_str(&upload.mime_type)
            .map_err(|e| UbError::Http(format!("invalid mime type: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .text("chatId", upload.chat_id.clone())
            .text("sender", upload.sender.clone())
            .text("type", wire::TYPE_IMAGE)
            .text("position", wire::POSITION_RIGHT)
            .part(wire::IMAGE_PART, file_part);

        let resp = self.post_multipart("/messages/", form).await?;
        Self::parse_json(resp).await
    }

    /// Raw message documents of one chat, in server order. A 404 surfaces as
    /// `NotFound`.
    pub async fn messages_by_chat(&self, chat_id: &str) -> UbResult<Vec<serde_json::Value>> {
        let path = format!("/messages/getByChat/{}", Self::segment(chat_id));
        self.get_json(&path).await
    }
}
