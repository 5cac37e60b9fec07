//! Server-sent event transport over a long-lived HTTP response.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use tracing::debug;

use notihub_core::result::AppResult;
use notihub_core::traits::stream::{ByteStream, EventSource};

use crate::endpoint::{Endpoint, status_error, transport_error};

/// Opens `text/event-stream` responses and exposes their raw body.
///
/// Framing is left to the caller; this type only owns the HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpEventSource {
    endpoint: Endpoint,
}

impl HttpEventSource {
    /// Create an event source bound to `endpoint`.
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl EventSource for HttpEventSource {
    async fn open(&self, path: &str) -> AppResult<ByteStream> {
        let url = self.endpoint.path_url(path)?;
        debug!(%url, "Opening event stream");

        let request = self
            .endpoint
            .client()
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache");

        let response = self
            .endpoint
            .authorize(request)
            .send()
            .await
            .map_err(|e| transport_error("open event stream", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error("open event stream", status));
        }

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| transport_error("read event stream", e)));

        Ok(Box::pin(body))
    }
}
