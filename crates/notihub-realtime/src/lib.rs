//! # notihub-realtime
//!
//! Real-time notification engine for NotiHub. Provides:
//!
//! - Server-sent event framing and a single-connection stream manager with
//!   fixed-delay reconnect
//! - The notification store with optimistic mutations and rollback
//! - The toast queue derived from newly ingested unread notifications
//! - A native notification bridge and a content-change feed
//! - [`NotificationEngine`], which wires the pieces together

pub mod bridge;
pub mod engine;
pub mod message;
pub mod notification;
pub mod stream;
pub mod toast;

#[cfg(test)]
pub(crate) mod test_support;

pub use bridge::change_feed::ChangeFeed;
pub use bridge::native::NativeBridge;
pub use engine::NotificationEngine;
pub use notification::store::NotificationStore;
pub use stream::manager::StreamManager;
pub use toast::queue::ToastQueue;
