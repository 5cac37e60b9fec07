//! Change notification for store readers.

use serde::Serialize;

use notihub_core::types::{Notification, NotificationId};

use super::feedback::Feedback;
use super::store::StoreState;

/// Synchronous store observer.
///
/// Observers run on the caller's task right after each change, with the
/// store lock released, so they may read the store but must not block.
pub trait StoreObserver: Send + Sync + std::fmt::Debug + 'static {
    /// An unread record was just ingested from the event stream.
    fn on_ingest(&self, record: &Notification) {
        let _ = record;
    }

    /// The record list or the counter changed; `state` is the new state.
    fn on_change(&self, state: &StoreState) {
        let _ = state;
    }
}

/// Change broadcast to asynchronous subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreChange {
    /// The list was replaced by a fetch.
    Replaced { unread_count: usize },
    /// A record was ingested from the stream.
    Ingested {
        id: NotificationId,
        unread_count: usize,
    },
    /// A mutation was applied or rolled back.
    Updated { unread_count: usize },
    /// The session ended and the list was cleared.
    Cleared,
    /// Feedback for the user.
    Feedback(Feedback),
}
