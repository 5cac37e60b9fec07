//! Side channels fed by the store and the event stream: native
//! notifications, the content-change feed, and the message router that
//! connects the stream to both.

pub mod change_feed;
pub mod native;
pub mod notifier;
pub mod router;

pub use change_feed::ChangeFeed;
pub use native::NativeBridge;
pub use notifier::{ConsoleNotifier, TracingNotifier};
pub use router::MessageRouter;
