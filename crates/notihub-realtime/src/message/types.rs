//! Envelopes carried in the `data` field of stream events.

use serde::{Deserialize, Serialize};

use notihub_core::types::Notification;

/// A message decoded from one server-sent event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamMessage {
    /// A new notification for the signed-in user.
    Notification {
        /// The notification record with base and alternate text.
        data: Notification,
    },
    /// A content collection changed on the server.
    Change(ContentChange),
    /// Any message type this client does not handle.
    #[serde(other)]
    Unknown,
}

/// A change to a content collection, fanned out by the change feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentChange {
    /// Collection name, e.g. `articles` or `comments`.
    pub collection: String,
    /// Change operation (`insert`, `update`, `delete`, ...), when given.
    #[serde(default, alias = "operationType", skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    /// Id of the changed document, when given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
}

impl ContentChange {
    /// A change without operation or document details.
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            operation: None,
            document_id: None,
        }
    }
}
