//! Chat lifecycle: existence checks, open-or-create, listing and deletion.

use tokio::sync::watch;
use tracing::{debug, info, warn};

use ub_api::response::into_result;
use ub_api::{ApiClient, ChatCreation, ChatExistence};
use ub_core::error::{UbError, UbResult};
use ub_models::{Chat, ChatRequest};

use crate::event_bus::{AppEvent, EventBus};
use crate::service::{Service, ServiceState};

/// How `open_chat` got hold of the chat.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatOpened {
    AlreadyExisted,
    Created(Vec<String>),
}

impl ChatOpened {
    pub fn was_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// What the chat list screen renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatsView {
    pub chats: Vec<Chat>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct ChatService {
    state: ServiceState,
    api: ApiClient,
    event_bus: EventBus,
    view: watch::Sender<ChatsView>,
}

impl ChatService {
    pub fn new(api: ApiClient, event_bus: EventBus) -> Self {
        let (view, _) = watch::channel(ChatsView::default());
        Self {
            state: ServiceState::Created,
            api,
            event_bus,
            view,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ChatsView> {
        self.view.subscribe()
    }

    pub fn view(&self) -> ChatsView {
        self.view.borrow().clone()
    }

    /// Whether a chat between the two users exists, in either ordering.
    ///
    /// A status other than 200 or 404 is logged and counts as absent.
    pub async fn chat_exists(&self, first: &str, second: &str) -> UbResult<bool> {
        for (a, b) in [(first, second), (second, first)] {
            match self.api.chat_existence(a, b).await? {
                ChatExistence::Exists => return Ok(true),
                ChatExistence::Missing => {}
                ChatExistence::Indeterminate(status) => {
                    warn!("chat lookup {a} -> {b} answered {status}, treating as absent");
                }
            }
        }
        Ok(false)
    }

    /// Open the chat between sender and receiver, creating it when absent.
    pub async fn open_chat(&self, sender: &str, receiver: &str) -> UbResult<ChatOpened> {
        let sender = sender.trim();
        let receiver = receiver.trim();
        if sender.is_empty() || receiver.is_empty() {
            return Err(UbError::Validation("both chat participants are required".into()));
        }

        let opened = if self.chat_exists(sender, receiver).await? {
            debug!("chat {sender} <-> {receiver} already exists");
            ChatOpened::AlreadyExisted
        } else {
            let request = ChatRequest {
                sender: sender.to_string(),
                receiver: receiver.to_string(),
            };
            match self.api.create_chat(&request).await? {
                ChatCreation::Created(resp) => {
                    info!("created chat {sender} <-> {receiver}");
                    ChatOpened::Created(resp.users)
                }
                ChatCreation::AlreadyExisted => {
                    info!("chat {sender} <-> {receiver} was created concurrently");
                    ChatOpened::AlreadyExisted
                }
            }
        };

        self.event_bus.emit(AppEvent::ChatOpened {
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            created: opened.was_created(),
        });
        Ok(opened)
    }

    /// Load every chat the user takes part in into the view.
    pub async fn load_chats(&self, username: &str) -> ChatsView {
        self.view.send_modify(|v| {
            v.loading = true;
            v.error = None;
        });

        let next = match self.api.chats_by_username(username).await {
            Ok(chats) => {
                for chat in chats.iter().filter(|c| !c.is_well_formed()) {
                    warn!("chat {} has {} participants", chat.id, chat.users.len());
                }
                ChatsView {
                    chats,
                    loading: false,
                    error: None,
                }
            }
            Err(UbError::NotFound(_)) => {
                debug!("no chats for {username}");
                ChatsView::default()
            }
            Err(e) => {
                warn!("loading chats for {username} failed: {e}");
                ChatsView {
                    chats: Vec::new(),
                    loading: false,
                    error: Some(format!("failed to load chats: {e}")),
                }
            }
        };

        self.view.send_replace(next.clone());
        next
    }

    /// Delete a chat and drop it from the view.
    pub async fn delete_chat(&self, chat_id: &str) -> UbResult<String> {
        if chat_id.trim().is_empty() {
            return Err(UbError::Validation("chat id is required".into()));
        }

        let message = into_result(self.api.delete_chat(chat_id).await?)?;
        info!("deleted chat {chat_id}");

        self.view.send_if_modified(|v| {
            let before = v.chats.len();
            v.chats.retain(|c| c.id != chat_id);
            v.chats.len() != before
        });
        self.event_bus.emit(AppEvent::ChatDeleted {
            chat_id: chat_id.to_string(),
        });
        Ok(message)
    }
}

impl Service for ChatService {
    fn name(&self) -> &str {
        "chats"
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
