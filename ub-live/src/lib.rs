//! Ubicasure Live - live message synchronization.
//!
//! This crate keeps a chat's message list in step with the remote message
//! collection:
//! - `SnapshotSource` abstracts a live query over the collection; every
//!   notification carries the full filtered, ordered result set
//! - `MemoryCollection` is an in-process collection with live listeners
//! - `PollingSource` materializes the query by polling the REST backend
//! - `MessageSync` holds the observable message view for one open chat

pub mod memory;
pub mod polling;
pub mod snapshot;
pub mod source;
pub mod sync;

// Re-export key types
pub use memory::MemoryCollection;
pub use polling::PollingSource;
pub use snapshot::{Document, MessageQuery, Snapshot, SubscriptionState};
pub use source::{ListenerRegistration, SnapshotSink, SnapshotSource};
pub use sync::{MessageSync, MessagesView};
