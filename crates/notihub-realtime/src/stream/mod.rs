//! Server-sent event stream: framing, reconnect state machine, and the
//! connection manager.

pub mod codec;
pub mod manager;
pub mod state;

pub use codec::{SseCodec, SseFrame};
pub use manager::{StreamHandler, StreamManager};
pub use state::{ConnectionAction, ConnectionEvent, ConnectionMachine, ConnectionState};
