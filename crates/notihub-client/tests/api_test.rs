//! Integration tests for the REST notification client.

mod helpers;

use notihub_client::{Endpoint, HttpNotificationApi};
use notihub_core::config::{ApiConfig, SessionConfig};
use notihub_core::error::ErrorKind;
use notihub_core::traits::NotificationApi;
use notihub_core::types::{Language, NotificationId, RelatedKind};

#[tokio::test]
async fn test_fetch_all_decodes_list_and_sends_language() {
    let server = helpers::TestServer::start().await;

    let list = server.api().fetch_all(Language::En).await.unwrap();

    assert_eq!(list.unread_count, 1);
    assert_eq!(list.notifications.len(), 2);
    assert_eq!(list.notifications[0].id.as_str(), "n-2");
    assert_eq!(list.notifications[0].related_kind, Some(RelatedKind::Episode));
    assert!(list.notifications[1].is_read);
    assert_eq!(server.recorded.lock().unwrap().language.as_deref(), Some("en"));
}

#[tokio::test]
async fn test_fetch_all_without_token_is_a_session_error() {
    let server = helpers::TestServer::start().await;
    let api = HttpNotificationApi::new(server.endpoint(None));

    let err = api.fetch_all(Language::Ar).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Session);
}

#[tokio::test]
async fn test_mark_read_sends_flag_body() {
    let server = helpers::TestServer::start().await;

    server.api().mark_read(&NotificationId::new("n-2")).await.unwrap();

    let recorded = server.recorded.lock().unwrap();
    assert_eq!(recorded.calls, vec!["PATCH /notifications/n-2"]);
    assert_eq!(recorded.bodies[0], serde_json::json!({ "markAsRead": true }));
}

#[tokio::test]
async fn test_refusal_reason_is_surfaced() {
    let server = helpers::TestServer::start().await;

    let err = server
        .api()
        .mark_read(&NotificationId::new("locked"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Rejected);
    assert_eq!(err.server_reason(), Some("notification is locked"));
}

#[tokio::test]
async fn test_not_found_without_reason() {
    let server = helpers::TestServer::start().await;

    let err = server
        .api()
        .mark_read(&NotificationId::new("missing"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(err.server_reason().is_none());
}

#[tokio::test]
async fn test_mark_all_read_sends_flag_body() {
    let server = helpers::TestServer::start().await;

    server.api().mark_all_read().await.unwrap();

    let recorded = server.recorded.lock().unwrap();
    assert_eq!(recorded.calls, vec!["PATCH /notifications"]);
    assert_eq!(
        recorded.bodies[0],
        serde_json::json!({ "markAllAsRead": true })
    );
}

#[tokio::test]
async fn test_delete_success_and_failures() {
    let server = helpers::TestServer::start().await;
    let api = server.api();

    api.delete(&NotificationId::new("n-1")).await.unwrap();

    let err = api.delete(&NotificationId::new("boom")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::ExternalService);
    assert!(err.server_reason().is_none());

    let err = api.delete(&NotificationId::new("refused")).await.unwrap_err();
    assert_eq!(err.server_reason(), Some("cannot delete system notice"));

    assert_eq!(server.calls().len(), 3);
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_error() {
    let api = ApiConfig {
        base_url: "http://127.0.0.1:1/api".to_string(),
        ..ApiConfig::default()
    };
    let endpoint = Endpoint::new(&api, &SessionConfig::default()).unwrap();

    let err = HttpNotificationApi::new(endpoint)
        .mark_all_read()
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Network);
}
