//! In-process notification server used by the client integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde_json::{Value, json};

use notihub_client::{Endpoint, HttpEventSource, HttpNotificationApi};
use notihub_core::config::{ApiConfig, SessionConfig};

/// Bearer token the fake server accepts.
pub const TOKEN: &str = "secret-token";

/// Body streamed by `GET /api/notifications/stream`.
pub const STREAM_BODY: &str = concat!(
    ": keep-alive\n\n",
    "data: {\"type\":\"notification\",\"data\":{\"id\":\"n-9\",\"title\":\"t\",\"message\":\"m\"}}\n\n",
);

/// Requests observed by the fake server.
#[derive(Debug, Default)]
pub struct Recorded {
    /// `"METHOD /path"` per request, in arrival order.
    pub calls: Vec<String>,
    /// JSON bodies of PATCH requests.
    pub bodies: Vec<Value>,
    /// Value of the `language` query parameter of the last list request.
    pub language: Option<String>,
}

type Shared = Arc<Mutex<Recorded>>;

/// Running fake server.
pub struct TestServer {
    /// Base URL including the `/api` prefix.
    pub base_url: String,
    /// What the server has seen so far.
    pub recorded: Shared,
}

impl TestServer {
    /// Bind to an ephemeral port and serve in the background.
    pub async fn start() -> Self {
        let recorded: Shared = Arc::default();
        let app = Router::new()
            .route("/api/notifications", get(list).patch(mark_all))
            .route("/api/notifications/stream", get(stream))
            .route("/api/notifications/{id}", patch(mark_one).delete(remove))
            .with_state(recorded.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });

        Self {
            base_url: format!("http://{addr}/api"),
            recorded,
        }
    }

    /// An endpoint pointing at this server, optionally authenticated.
    pub fn endpoint(&self, token: Option<&str>) -> Endpoint {
        let api = ApiConfig {
            base_url: self.base_url.clone(),
            ..ApiConfig::default()
        };
        let session = SessionConfig {
            user_id: Some("u-1".to_string()),
            token: token.map(str::to_string),
        };
        Endpoint::new(&api, &session).expect("Failed to build endpoint")
    }

    /// Authenticated REST client.
    pub fn api(&self) -> HttpNotificationApi {
        HttpNotificationApi::new(self.endpoint(Some(TOKEN)))
    }

    /// Authenticated event source.
    pub fn events(&self) -> HttpEventSource {
        HttpEventSource::new(self.endpoint(Some(TOKEN)))
    }

    /// Snapshot of the recorded calls.
    pub fn calls(&self) -> Vec<String> {
        self.recorded.lock().unwrap().calls.clone()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

async fn list(
    State(recorded): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    {
        let mut r = recorded.lock().unwrap();
        r.calls.push("GET /notifications".to_string());
        r.language = query.get("language").cloned();
    }
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({
        "notifications": [
            {
                "_id": "n-2",
                "title": "حلقة جديدة",
                "message": "تمت إضافة حلقة",
                "titleEn": "New episode",
                "messageEn": "An episode was added",
                "type": "info",
                "isRead": false,
                "relatedType": "episode",
                "createdAt": "2026-10-02T08:00:00Z"
            },
            {
                "_id": "n-1",
                "title": "مرحبا",
                "message": "أهلا بك",
                "type": "success",
                "isRead": true,
                "createdAt": "2026-10-01T08:00:00Z"
            }
        ],
        "unreadCount": 1
    }))
    .into_response()
}

async fn mark_all(State(recorded): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut r = recorded.lock().unwrap();
    r.calls.push("PATCH /notifications".to_string());
    r.bodies.push(body);
    Json(json!({ "success": true })).into_response()
}

async fn mark_one(
    State(recorded): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut r = recorded.lock().unwrap();
    r.calls.push(format!("PATCH /notifications/{id}"));
    r.bodies.push(body);
    match id.as_str() {
        "locked" => Json(json!({ "success": false, "error": "notification is locked" }))
            .into_response(),
        "missing" => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false })),
        )
            .into_response(),
        _ => Json(json!({ "success": true })).into_response(),
    }
}

async fn remove(State(recorded): State<Shared>, Path(id): Path<String>) -> Response {
    recorded
        .lock()
        .unwrap()
        .calls
        .push(format!("DELETE /notifications/{id}"));
    match id.as_str() {
        "boom" => (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response(),
        "refused" => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "cannot delete system notice" })),
        )
            .into_response(),
        _ => Json(json!({ "success": true })).into_response(),
    }
}

async fn stream(State(recorded): State<Shared>, headers: HeaderMap) -> Response {
    recorded
        .lock()
        .unwrap()
        .calls
        .push("GET /notifications/stream".to_string());
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    ([(header::CONTENT_TYPE, "text/event-stream")], STREAM_BODY).into_response()
}
