//! Core traits defined in `notihub-core` and implemented by other crates.

pub mod api;
pub mod notifier;
pub mod stream;

pub use api::NotificationApi;
pub use notifier::{NativeNotification, NativeNotifier, Permission};
pub use stream::{ByteStream, EventSource};
