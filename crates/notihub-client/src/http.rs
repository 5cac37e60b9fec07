//! REST implementation of [`NotificationApi`].

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::Serialize;
use tracing::{debug, warn};

use notihub_core::error::AppError;
use notihub_core::result::AppResult;
use notihub_core::traits::api::NotificationApi;
use notihub_core::types::{ApiAck, Language, NotificationId, NotificationList};

use crate::endpoint::{Endpoint, status_error, transport_error};

/// Path segment every route hangs off.
const COLLECTION: &str = "notifications";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MarkReadBody {
    mark_as_read: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MarkAllReadBody {
    mark_all_as_read: bool,
}

/// Notification API client speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpNotificationApi {
    endpoint: Endpoint,
}

impl HttpNotificationApi {
    /// Create a client bound to `endpoint`.
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }

    /// Send a mutating request and interpret its `{success, error?}` body.
    async fn send_ack(&self, request: RequestBuilder, operation: &str) -> AppResult<()> {
        let response = self
            .endpoint
            .authorize(request)
            .send()
            .await
            .map_err(|e| transport_error(operation, e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(operation, e))?;

        match serde_json::from_slice::<ApiAck>(&body) {
            Ok(ack) if status.is_success() => ack.into_result(operation),
            Ok(ApiAck {
                error: Some(reason),
                ..
            }) if !reason.trim().is_empty() => Err(AppError::rejected(reason)),
            Ok(_) => Err(status_error(operation, status)),
            Err(e) if status.is_success() => {
                warn!(operation, error = %e, "Unreadable acknowledgement body");
                Err(AppError::external_service(format!(
                    "{operation} returned an unreadable body"
                )))
            }
            Err(_) => Err(status_error(operation, status)),
        }
    }
}

#[async_trait]
impl NotificationApi for HttpNotificationApi {
    async fn fetch_all(&self, language: Language) -> AppResult<NotificationList> {
        let mut url = self.endpoint.url(&[COLLECTION])?;
        url.query_pairs_mut()
            .append_pair("language", language.code());
        debug!(%url, "Fetching notifications");

        let response = self
            .endpoint
            .authorize(self.endpoint.client().get(url))
            .send()
            .await
            .map_err(|e| transport_error("fetch notifications", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error("fetch notifications", status));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error("fetch notifications", e))?;
        let list: NotificationList = serde_json::from_slice(&body)?;
        Ok(list)
    }

    async fn mark_read(&self, id: &NotificationId) -> AppResult<()> {
        let url = self.endpoint.url(&[COLLECTION, id.as_str()])?;
        let request = self
            .endpoint
            .client()
            .patch(url)
            .json(&MarkReadBody { mark_as_read: true });
        self.send_ack(request, "mark as read").await
    }

    async fn mark_all_read(&self) -> AppResult<()> {
        let url = self.endpoint.url(&[COLLECTION])?;
        let request = self
            .endpoint
            .client()
            .patch(url)
            .json(&MarkAllReadBody {
                mark_all_as_read: true,
            });
        self.send_ack(request, "mark all as read").await
    }

    async fn delete(&self, id: &NotificationId) -> AppResult<()> {
        let url = self.endpoint.url(&[COLLECTION, id.as_str()])?;
        let request = self.endpoint.client().delete(url);
        self.send_ack(request, "delete").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_bodies_use_camel_case_flags() {
        let one = serde_json::to_value(MarkReadBody { mark_as_read: true }).unwrap();
        assert_eq!(one, serde_json::json!({ "markAsRead": true }));

        let all = serde_json::to_value(MarkAllReadBody {
            mark_all_as_read: true,
        })
        .unwrap();
        assert_eq!(all, serde_json::json!({ "markAllAsRead": true }));
    }
}
