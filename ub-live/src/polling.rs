//! REST-backed snapshot source.
//!
//! Materializes the live query by polling `GET /messages/getByChat/{chatId}`.
//! A snapshot is pushed for the first result and then whenever the
//! materialized list changes. A 404 is an empty collection; any other failure
//! is sent once as a terminal error and the poller stops.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use ub_api::ApiClient;
use ub_core::error::{UbError, UbResult};

use crate::snapshot::{Document, MessageQuery};
use crate::source::{ListenerRegistration, SnapshotSink, SnapshotSource};

/// Polling implementation of [`SnapshotSource`].
#[derive(Clone)]
pub struct PollingSource {
    api: ApiClient,
    interval: Duration,
    next_listener: Arc<AtomicU64>,
}

impl PollingSource {
    pub fn new(api: ApiClient, interval: Duration) -> Self {
        Self {
            api,
            interval,
            next_listener: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Fetch the current result set once.
    pub async fn fetch(api: &ApiClient, query: &MessageQuery) -> UbResult<Vec<Document>> {
        match api.messages_by_chat(&query.chat_id).await {
            Ok(values) => {
                let docs: Vec<Document> = values
                    .into_iter()
                    .enumerate()
                    .filter_map(|(i, v)| into_document(i, v, &query.chat_id))
                    .collect();
                Ok(query.apply(&docs))
            }
            Err(UbError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    async fn run(api: ApiClient, query: MessageQuery, sink: SnapshotSink, interval: Duration, id: u64) {
        let mut last: Option<Vec<Document>> = None;

        loop {
            if sink.is_closed() {
                debug!("poller {id} receiver closed");
                return;
            }

            match Self::fetch(&api, &query).await {
                Ok(docs) => {
                    if last.as_ref() != Some(&docs) {
                        debug!("poller {id}: {} message(s) for chat {}", docs.len(), query.chat_id);
                        if sink.send(Ok(docs.clone())).is_err() {
                            return;
                        }
                        last = Some(docs);
                    }
                }
                Err(e) => {
                    warn!("poller {id} for chat {} failed: {e}", query.chat_id);
                    let _ = sink.send(Err(UbError::Subscription(e.to_string())));
                    return;
                }
            }

            tokio::select! {
                _ = sleep(interval) => {},
                _ = sink.closed() => {
                    debug!("poller {id} receiver closed");
                    return;
                }
            }
        }
    }
}

/// Body fields of a REST message document become the document fields; the
/// id comes from `id` or `_id`. Documents of another chat are skipped.
fn into_document(index: usize, value: serde_json::Value, chat_id: &str) -> Option<Document> {
    if !value.is_object() {
        return None;
    }
    if let Some(other) = value.get("chatId").and_then(|v| v.as_str()) {
        if other != chat_id {
            return None;
        }
    }
    let id = value
        .get("id")
        .or_else(|| value.get("_id"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{chat_id}-{index}"));

    let mut fields = value;
    if let Some(map) = fields.as_object_mut() {
        map.remove("id");
        map.remove("_id");
        map.entry("chatId")
            .or_insert_with(|| serde_json::Value::String(chat_id.to_string()));
    }
    Some(Document::new(id, fields))
}

impl SnapshotSource for PollingSource {
    fn listen(&self, query: MessageQuery, sink: SnapshotSink) -> UbResult<ListenerRegistration> {
        let id = self.next_listener.fetch_add(1, Ordering::SeqCst);
        info!(
            "polling chat {} every {}ms (listener {id})",
            query.chat_id,
            self.interval.as_millis()
        );

        let handle = tokio::spawn(Self::run(
            self.api.clone(),
            query,
            sink,
            self.interval,
            id,
        ));

        Ok(ListenerRegistration::new(id, move || handle.abort()))
    }
}
