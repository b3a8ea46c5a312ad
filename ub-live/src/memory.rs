//! In-process message collection with live listeners.
//!
//! Behaves like the remote document store as far as the app can observe:
//! each listener receives the full filtered, ordered result set right after
//! registering and again after every change that touches its chat.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tracing::{debug, warn};

use ub_core::error::{UbError, UbResult};

use crate::snapshot::{Document, MessageQuery};
use crate::source::{ListenerRegistration, SnapshotSink, SnapshotSource};

struct Listener {
    query: MessageQuery,
    sink: SnapshotSink,
}

#[derive(Default)]
struct Inner {
    /// Documents in insertion order.
    documents: Vec<Document>,
    listeners: HashMap<u64, Listener>,
    next_listener: u64,
}

impl Inner {
    /// Push a fresh snapshot to every listener whose chat is in `chats`
    /// (all listeners when `None`), dropping listeners whose receiver is gone.
    fn notify(&mut self, chats: Option<&[String]>) {
        let documents = &self.documents;
        self.listeners.retain(|id, listener| {
            if let Some(chats) = chats {
                if !chats.iter().any(|c| *c == listener.query.chat_id) {
                    return true;
                }
            }
            let snapshot = listener.query.apply(documents);
            if listener.sink.send(Ok(snapshot)).is_err() {
                debug!("listener {id} receiver closed, removing");
                return false;
            }
            true
        });
    }
}

/// Shared in-memory `messages` collection. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryCollection {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add a document under a generated id. Returns the id.
    pub fn add(&self, fields: serde_json::Value) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.insert(id.clone(), fields);
        id
    }

    /// Insert or replace a document.
    pub fn insert(&self, id: impl Into<String>, fields: serde_json::Value) {
        let doc = Document::new(id, fields);
        let mut inner = self.lock();

        let mut touched: Vec<String> = doc.chat_id().map(str::to_string).into_iter().collect();
        if let Some(existing) = inner.documents.iter_mut().find(|d| d.id == doc.id) {
            if let Some(old_chat) = existing.chat_id() {
                touched.push(old_chat.to_string());
            }
            *existing = doc;
        } else {
            inner.documents.push(doc);
        }
        inner.notify(Some(&touched));
    }

    /// Remove a document. Returns whether it existed.
    pub fn remove(&self, id: &str) -> bool {
        let mut inner = self.lock();
        let Some(pos) = inner.documents.iter().position(|d| d.id == id) else {
            return false;
        };
        let doc = inner.documents.remove(pos);
        let touched: Vec<String> = doc.chat_id().map(str::to_string).into_iter().collect();
        inner.notify(Some(&touched));
        true
    }

    /// Remove every message of a chat. Returns how many were removed.
    pub fn remove_chat(&self, chat_id: &str) -> usize {
        let mut inner = self.lock();
        let before = inner.documents.len();
        inner.documents.retain(|d| d.chat_id() != Some(chat_id));
        let removed = before - inner.documents.len();
        if removed > 0 {
            inner.notify(Some(&[chat_id.to_string()]));
        }
        removed
    }

    /// Deliver an error to every listener and drop them all.
    pub fn fail_listeners(&self, message: &str) {
        let mut inner = self.lock();
        warn!("failing {} listener(s): {message}", inner.listeners.len());
        for (_, listener) in inner.listeners.drain() {
            let _ = listener
                .sink
                .send(Err(UbError::Subscription(message.to_string())));
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Current documents in insertion order.
    pub fn documents(&self) -> Vec<Document> {
        self.lock().documents.clone()
    }

    fn unregister(inner: &Weak<Mutex<Inner>>, id: u64) {
        if let Some(inner) = inner.upgrade() {
            let mut guard = inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if guard.listeners.remove(&id).is_some() {
                debug!("listener {id} removed");
            }
        }
    }
}

impl SnapshotSource for MemoryCollection {
    fn listen(&self, query: MessageQuery, sink: SnapshotSink) -> UbResult<ListenerRegistration> {
        let mut inner = self.lock();
        let id = inner.next_listener;
        inner.next_listener += 1;

        let initial = query.apply(&inner.documents);
        if sink.send(Ok(initial)).is_err() {
            return Err(UbError::Subscription("listener closed before registration".into()));
        }
        debug!("listener {id} registered for chat {}", query.chat_id);
        inner.listeners.insert(id, Listener { query, sink });
        drop(inner);

        let weak = Arc::downgrade(&self.inner);
        Ok(ListenerRegistration::new(id, move || {
            MemoryCollection::unregister(&weak, id)
        }))
    }
}
