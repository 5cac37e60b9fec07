//! # notihub-client
//!
//! HTTP transport for NotiHub. Implements the core
//! [`NotificationApi`](notihub_core::traits::NotificationApi) and
//! [`EventSource`](notihub_core::traits::EventSource) traits on top of a
//! shared `reqwest` client.

pub mod endpoint;
pub mod http;
pub mod stream;

pub use endpoint::Endpoint;
pub use http::HttpNotificationApi;
pub use stream::HttpEventSource;
