//! Observable message list for the open chat.
//!
//! `MessageSync` owns at most one listener. Opening a chat tears down the
//! previous listener before registering the new one, and every snapshot is
//! tagged with the generation it was requested under so a late delivery from
//! a torn-down listener can never overwrite the current view.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use ub_core::error::{UbError, UbResult};
use ub_models::Message;

use crate::snapshot::{Document, MessageQuery, Snapshot, SubscriptionState};
use crate::source::{ListenerRegistration, SnapshotSource};

/// What a message screen renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessagesView {
    pub chat_id: Option<String>,
    pub messages: Vec<Message>,
    pub loading: bool,
    pub error: Option<String>,
    pub state: SubscriptionState,
}

struct ActiveListener {
    chat_id: String,
    registration: ListenerRegistration,
    pump: JoinHandle<()>,
}

/// Message list state holder.
pub struct MessageSync {
    source: Arc<dyn SnapshotSource>,
    view_tx: Arc<watch::Sender<MessagesView>>,
    active: Mutex<Option<ActiveListener>>,
    generation: Arc<AtomicU64>,
}

impl MessageSync {
    pub fn new(source: Arc<dyn SnapshotSource>) -> Self {
        let (view_tx, _) = watch::channel(MessagesView::default());
        Self {
            source,
            view_tx: Arc::new(view_tx),
            active: Mutex::new(None),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Subscribe to view changes.
    pub fn subscribe(&self) -> watch::Receiver<MessagesView> {
        self.view_tx.subscribe()
    }

    /// Current view.
    pub fn view(&self) -> MessagesView {
        self.view_tx.borrow().clone()
    }

    /// Chat the live listener is attached to, if any.
    pub fn active_chat(&self) -> Option<String> {
        self.lock_active().as_ref().map(|a| a.chat_id.clone())
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<ActiveListener>> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start observing a chat. Any previous listener is released first.
    pub fn load_messages(&self, chat_id: &str) -> UbResult<()> {
        if chat_id.trim().is_empty() {
            return Err(UbError::Validation("chat id is required".into()));
        }
        let mut active = self.lock_active();
        Self::teardown(&mut active);

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.view_tx.send_modify(|view| {
            view.chat_id = Some(chat_id.to_string());
            view.messages.clear();
            view.loading = true;
            view.error = None;
            view.state = SubscriptionState::Loading;
        });

        let (tx, rx) = mpsc::unbounded_channel();
        let registration = match self.source.listen(MessageQuery::for_chat(chat_id), tx) {
            Ok(reg) => reg,
            Err(e) => {
                warn!("could not listen to chat {chat_id}: {e}");
                let message = e.to_string();
                self.view_tx.send_modify(|view| {
                    view.loading = false;
                    view.error = Some(message);
                    view.state = SubscriptionState::Failed;
                });
                return Err(e);
            }
        };

        info!("listening to chat {chat_id} (listener {})", registration.id());
        let pump = tokio::spawn(Self::pump(
            rx,
            self.view_tx.clone(),
            self.generation.clone(),
            generation,
        ));

        *active = Some(ActiveListener {
            chat_id: chat_id.to_string(),
            registration,
            pump,
        });
        Ok(())
    }

    /// Release the listener and mark the view closed.
    pub fn close(&self) {
        let mut active = self.lock_active();
        Self::teardown(&mut active);
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.view_tx.send_modify(|view| {
            view.loading = false;
            view.state = SubscriptionState::Closed;
        });
    }

    fn teardown(active: &mut Option<ActiveListener>) {
        if let Some(prev) = active.take() {
            debug!("tearing down listener for chat {}", prev.chat_id);
            prev.registration.remove();
            prev.pump.abort();
        }
    }

    async fn pump(
        mut rx: mpsc::UnboundedReceiver<Snapshot>,
        view_tx: Arc<watch::Sender<MessagesView>>,
        current: Arc<AtomicU64>,
        generation: u64,
    ) {
        while let Some(snapshot) = rx.recv().await {
            let terminal = snapshot.is_err();
            let update = match snapshot {
                Ok(docs) => Ok(decode(docs)),
                Err(e) => Err(e.to_string()),
            };

            // Checked under the watch lock so a concurrent load_messages wins.
            let applied = view_tx.send_if_modified(|view| {
                if current.load(Ordering::SeqCst) != generation {
                    return false;
                }
                match &update {
                    Ok(messages) => {
                        view.messages = messages.clone();
                        view.error = None;
                        view.state = SubscriptionState::Live;
                    }
                    Err(message) => {
                        view.error = Some(message.clone());
                        view.state = SubscriptionState::Failed;
                    }
                }
                view.loading = false;
                true
            });

            if !applied {
                debug!("discarding snapshot from stale listener (generation {generation})");
                return;
            }
            if terminal {
                warn!("message subscription failed, not retrying");
                return;
            }
        }
    }
}

impl Drop for MessageSync {
    fn drop(&mut self) {
        let mut active = self.lock_active();
        Self::teardown(&mut active);
    }
}

/// Map documents to messages, skipping the ones that do not decode.
fn decode(docs: Vec<Document>) -> Vec<Message> {
    docs.into_iter()
        .filter_map(|doc| match Message::from_document(&doc.id, &doc.fields) {
            Ok(msg) => Some(msg),
            Err(e) => {
                warn!("dropping undecodable message {}: {e}", doc.id);
                None
            }
        })
        .collect()
}
