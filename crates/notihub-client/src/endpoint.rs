//! Base URL, credentials, and the shared HTTP client.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode, Url};

use notihub_core::config::{ApiConfig, SessionConfig};
use notihub_core::error::{AppError, ErrorKind};
use notihub_core::result::AppResult;

/// Where the notification API lives and how to authenticate against it.
///
/// Cloning is cheap: the inner `reqwest::Client` is reference counted, so
/// the REST API and the event source share one connection pool.
#[derive(Debug, Clone)]
pub struct Endpoint {
    client: Client,
    base: Url,
    token: Option<String>,
}

impl Endpoint {
    /// Build an endpoint from the `api` and `session` configuration sections.
    pub fn new(api: &ApiConfig, session: &SessionConfig) -> AppResult<Self> {
        let base = Url::parse(api.base_url.trim()).map_err(|e| {
            AppError::configuration(format!("Invalid api.base_url '{}': {e}", api.base_url))
        })?;
        if base.cannot_be_a_base() {
            return Err(AppError::configuration(format!(
                "api.base_url '{}' cannot carry a path",
                api.base_url
            )));
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(api.connect_timeout_seconds))
            .build()
            .map_err(|e| transport_error("build HTTP client", e))?;

        let token = session
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        Ok(Self {
            client,
            base,
            token,
        })
    }

    /// The shared HTTP client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Resolve `segments` below the base URL, escaping each one.
    pub fn url(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| AppError::configuration("api.base_url cannot carry a path"))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    /// Resolve a slash-separated path such as `/notifications/stream`.
    pub fn path_url(&self, path: &str) -> AppResult<Url> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        self.url(&segments)
    }

    /// Attach the bearer token, if the session has one.
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Map a `reqwest` failure into a network error.
pub(crate) fn transport_error(operation: &str, err: reqwest::Error) -> AppError {
    AppError::with_source(
        ErrorKind::Network,
        format!("{operation} failed: {err}"),
        err,
    )
}

/// Classify a non-success HTTP status.
pub(crate) fn status_error(operation: &str, status: StatusCode) -> AppError {
    match status {
        StatusCode::NOT_FOUND => AppError::not_found(format!("{operation}: not found")),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            AppError::session(format!("{operation} was refused with HTTP {status}"))
        }
        StatusCode::SERVICE_UNAVAILABLE => {
            AppError::service_unavailable(format!("{operation}: service unavailable"))
        }
        _ => AppError::external_service(format!("{operation} failed with HTTP {status}")),
    }
}
