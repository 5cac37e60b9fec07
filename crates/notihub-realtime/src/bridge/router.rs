//! Routes decoded stream messages to the store and the change feed.

use std::sync::Arc;

use tracing::debug;

use crate::bridge::change_feed::ChangeFeed;
use crate::message::types::StreamMessage;
use crate::notification::store::NotificationStore;
use crate::stream::manager::StreamHandler;

/// [`StreamHandler`] for the notification stream.
#[derive(Debug)]
pub struct MessageRouter {
    store: Arc<NotificationStore>,
    feed: Arc<ChangeFeed>,
}

impl MessageRouter {
    /// Create a router feeding `store` and `feed`.
    pub fn new(store: Arc<NotificationStore>, feed: Arc<ChangeFeed>) -> Self {
        Self { store, feed }
    }
}

impl StreamHandler for MessageRouter {
    fn handle(&self, message: StreamMessage) {
        match message {
            StreamMessage::Notification { data } => self.store.ingest(data),
            StreamMessage::Change(change) => {
                self.feed.publish(change);
            }
            StreamMessage::Unknown => debug!("Unhandled stream message"),
        }
    }
}
