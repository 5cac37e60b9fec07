//! Event stream transport trait.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// A stream of raw bytes read from a long-lived HTTP response.
pub type ByteStream = Pin<Box<dyn Stream<Item = AppResult<Bytes>> + Send>>;

/// Opens server-sent event streams.
///
/// Each successful `open` is one live transport connection; it is closed
/// when the returned stream is dropped.
#[async_trait]
pub trait EventSource: Send + Sync + std::fmt::Debug + 'static {
    /// Open the stream at `path` (relative to the API base URL).
    async fn open(&self, path: &str) -> AppResult<ByteStream>;
}
