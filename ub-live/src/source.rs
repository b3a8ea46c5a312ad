//! The live-query seam.

use tokio::sync::mpsc;
use tracing::debug;

use ub_core::error::UbResult;

use crate::snapshot::{MessageQuery, Snapshot};

/// Channel end a source pushes snapshots into.
pub type SnapshotSink = mpsc::UnboundedSender<Snapshot>;

/// A collection that supports live queries.
///
/// `listen` registers the query and returns at once; snapshots arrive on the
/// sink, the first one as soon as the source has a result. After sending an
/// error a source sends nothing more on that sink.
pub trait SnapshotSource: Send + Sync {
    fn listen(&self, query: MessageQuery, sink: SnapshotSink) -> UbResult<ListenerRegistration>;
}

/// Handle to a registered listener. Removing it, or dropping it, stops
/// delivery and releases the listener at the source.
pub struct ListenerRegistration {
    id: u64,
    remover: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl ListenerRegistration {
    pub fn new(id: u64, remover: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            id,
            remover: Some(Box::new(remover)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Release the listener now.
    pub fn remove(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(remover) = self.remover.take() {
            debug!("releasing listener {}", self.id);
            remover();
        }
    }
}

impl Drop for ListenerRegistration {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ListenerRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistration")
            .field("id", &self.id)
            .field("active", &self.remover.is_some())
            .finish()
    }
}
