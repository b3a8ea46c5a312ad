//! Message dispatch.
//!
//! Sending never touches the message view; a sent message shows up when the
//! live source delivers its next snapshot.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use ub_api::response::into_result;
use ub_api::ApiClient;
use ub_core::error::{UbError, UbResult};
use ub_models::{ImageUpload, MessageRequest};

use crate::event_bus::{AppEvent, EventBus};
use crate::service::{Service, ServiceState};

pub struct MessageService {
    state: ServiceState,
    api: ApiClient,
    event_bus: EventBus,
    upload_dir: PathBuf,
}

impl MessageService {
    pub fn new(api: ApiClient, event_bus: EventBus, upload_dir: PathBuf) -> Self {
        Self {
            state: ServiceState::Created,
            api,
            event_bus,
            upload_dir,
        }
    }

    /// Directory image copies are staged in while uploading.
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Send a text message.
    pub async fn send_text(&self, chat_id: &str, sender: &str, text: &str) -> UbResult<String> {
        if chat_id.trim().is_empty() {
            return Err(UbError::Validation("chat id is required".into()));
        }
        if text.trim().is_empty() {
            return Err(UbError::Validation("message text is empty".into()));
        }

        let request = MessageRequest::text(chat_id, sender, text);
        let message = into_result(self.api.send_message(&request).await?)?;
        debug!("text message accepted in chat {chat_id}");

        self.event_bus.emit(AppEvent::MessageSent {
            chat_id: chat_id.to_string(),
            is_image: false,
        });
        Ok(message)
    }

    /// Upload an image as a message. The staged copy is removed afterwards,
    /// whether or not the upload succeeded.
    pub async fn send_image(&self, chat_id: &str, sender: &str, path: &Path) -> UbResult<String> {
        if chat_id.trim().is_empty() {
            return Err(UbError::Validation("chat id is required".into()));
        }
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                UbError::Validation(format!("not a file path: {}", path.display()))
            })?;

        let staged = self.stage(path, &file_name).await?;
        let upload = ImageUpload {
            chat_id: chat_id.to_string(),
            sender: sender.to_string(),
            path: staged.clone(),
            file_name: file_name.clone(),
            mime_type: guess_mime(&file_name).to_string(),
        };

        let result = match self.api.send_image(&upload).await {
            Ok(resp) => into_result(resp),
            Err(e) => Err(e),
        };

        if let Err(e) = tokio::fs::remove_file(&staged).await {
            warn!("could not remove staged upload {}: {e}", staged.display());
        }

        let message = result?;
        info!("image {file_name} sent to chat {chat_id}");
        self.event_bus.emit(AppEvent::MessageSent {
            chat_id: chat_id.to_string(),
            is_image: true,
        });
        Ok(message)
    }

    async fn stage(&self, path: &Path, file_name: &str) -> UbResult<PathBuf> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        let staged = self
            .upload_dir
            .join(format!("{}-{file_name}", uuid::Uuid::new_v4()));
        tokio::fs::copy(path, &staged).await?;
        debug!("staged {} at {}", path.display(), staged.display());
        Ok(staged)
    }
}

/// Image MIME type from the file extension.
pub fn guess_mime(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}

impl Service for MessageService {
    fn name(&self) -> &str {
        "messages"
    }

    fn state(&self) -> ServiceState {
        self.state
    }

    fn init(&mut self) -> UbResult<()> {
        self.state = ServiceState::Running;
        Ok(())
    }

    fn shutdown(&mut self) -> UbResult<()> {
        self.state = ServiceState::Stopped;
        Ok(())
    }
}
