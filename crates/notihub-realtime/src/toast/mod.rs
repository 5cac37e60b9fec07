//! Transient toast queue derived from newly ingested notifications.

pub mod queue;
pub mod seen;

pub use queue::{QueuedToast, RemovalReason, ScreenEdge, ToastEvent, ToastLayout, ToastQueue};
pub use seen::SeenIds;
