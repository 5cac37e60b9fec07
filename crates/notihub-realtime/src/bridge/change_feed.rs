//! In-process fan-out of content-change events by collection.

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;

use crate::message::types::ContentChange;

/// Per-collection broadcast of [`ContentChange`]s.
///
/// Lets refresh consumers (comments, articles, playlists, ...) share the
/// notification stream instead of each opening its own.
#[derive(Debug)]
pub struct ChangeFeed {
    /// Collection name → broadcast sender
    channels: DashMap<String, broadcast::Sender<ContentChange>>,
    /// Receives every change regardless of collection
    all: broadcast::Sender<ContentChange>,
    /// Buffer size for channels
    buffer_size: usize,
}

impl ChangeFeed {
    /// Create a feed whose channels buffer `buffer_size` changes.
    pub fn new(buffer_size: usize) -> Self {
        let buffer_size = buffer_size.max(1);
        Self {
            channels: DashMap::new(),
            all: broadcast::channel(buffer_size).0,
            buffer_size,
        }
    }

    /// Publish a change. Returns how many subscribers received it.
    pub fn publish(&self, change: ContentChange) -> usize {
        let mut delivered = self.all.send(change.clone()).unwrap_or(0);
        if let Some(tx) = self.channels.get(&change.collection) {
            delivered += tx.send(change.clone()).unwrap_or(0);
        }
        debug!(collection = %change.collection, delivered, "Content change published");
        delivered
    }

    /// Subscribe to one collection.
    pub fn subscribe(&self, collection: &str) -> broadcast::Receiver<ContentChange> {
        self.channels
            .entry(collection.to_string())
            .or_insert_with(|| broadcast::channel(self.buffer_size).0)
            .subscribe()
    }

    /// Subscribe to every collection.
    pub fn subscribe_all(&self) -> broadcast::Receiver<ContentChange> {
        self.all.subscribe()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(64)
    }
}
