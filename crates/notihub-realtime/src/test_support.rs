//! In-crate fakes shared by unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Duration, TimeZone, Utc};
use futures::StreamExt;
use tokio::sync::Notify;

use notihub_core::error::AppError;
use notihub_core::result::AppResult;
use notihub_core::traits::api::NotificationApi;
use notihub_core::traits::notifier::{NativeNotification, NativeNotifier, Permission};
use notihub_core::traits::stream::{ByteStream, EventSource};
use notihub_core::types::{Language, Notification, NotificationId, NotificationList, UserId};

use crate::message::types::StreamMessage;
use crate::notification::store::NotificationStore;
use crate::stream::manager::StreamHandler;

/// Fixed reference time so record ordering is deterministic.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// A bilingual record created `minutes_ago` before [`epoch`].
pub fn record(id: &str, minutes_ago: i64, is_read: bool) -> Notification {
    let mut n = Notification::new(id, format!("عنوان {id}"), format!("رسالة {id}"))
        .with_alt(format!("Title {id}"), format!("Message {id}"))
        .created(epoch() - Duration::minutes(minutes_ago));
    n.is_read = is_read;
    n
}

/// One SSE frame carrying a notification envelope.
pub fn notification_frame(id: &str, is_read: bool) -> String {
    let message = StreamMessage::Notification {
        data: record(id, 0, is_read),
    };
    let json = crate::message::serializer::encode_message(&message).expect("encodable");
    format!("data: {json}\n\n")
}

/// Store signed in as `u-1`, displaying English over Arabic base text,
/// loaded with `records` through a fetch.
pub async fn seeded_store(records: Vec<Notification>) -> (Arc<FakeNotificationApi>, NotificationStore) {
    let api = Arc::new(FakeNotificationApi::with_records(records));
    let store = NotificationStore::new(api.clone(), Language::En, Language::Ar);
    store.set_user(Some(UserId::new("u-1")));
    store.fetch_all().await.expect("seed fetch");
    (api, store)
}

/// Scriptable [`NotificationApi`].
#[derive(Debug, Default)]
pub struct FakeNotificationApi {
    list: Mutex<NotificationList>,
    mutation_failure: Mutex<Option<AppError>>,
    fetch_failure: Mutex<Option<AppError>>,
    calls: Mutex<Vec<String>>,
    fetches: Mutex<Vec<Language>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeNotificationApi {
    /// Serve `records` from `fetch_all`.
    pub fn with_records(records: Vec<Notification>) -> Self {
        let unread_count = records.iter().filter(|r| !r.is_read).count();
        let api = Self::default();
        *api.list.lock().unwrap() = NotificationList {
            notifications: records,
            unread_count,
        };
        api
    }

    /// Override the unread count reported by `fetch_all`.
    pub fn set_server_unread_count(&self, count: usize) {
        self.list.lock().unwrap().unread_count = count;
    }

    /// Make every mutation fail with `err`.
    pub fn fail_mutations_with(&self, err: AppError) {
        *self.mutation_failure.lock().unwrap() = Some(err);
    }

    /// Make `fetch_all` fail with `err`.
    pub fn fail_fetch_with(&self, err: AppError) {
        *self.fetch_failure.lock().unwrap() = Some(err);
    }

    /// Let mutations succeed again.
    pub fn succeed(&self) {
        *self.mutation_failure.lock().unwrap() = None;
    }

    /// Hold each mutation until the returned handle is notified.
    pub fn gate(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(notify.clone());
        notify
    }

    /// Mutation calls seen so far, e.g. `mark_read:a`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Languages passed to `fetch_all`, in order.
    pub fn fetch_languages(&self) -> Vec<Language> {
        self.fetches.lock().unwrap().clone()
    }

    async fn mutate(&self, call: String) -> AppResult<()> {
        self.calls.lock().unwrap().push(call);
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        match self.mutation_failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl NotificationApi for FakeNotificationApi {
    async fn fetch_all(&self, language: Language) -> AppResult<NotificationList> {
        self.fetches.lock().unwrap().push(language);
        if let Some(err) = self.fetch_failure.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.list.lock().unwrap().clone())
    }

    async fn mark_read(&self, id: &NotificationId) -> AppResult<()> {
        self.mutate(format!("mark_read:{id}")).await
    }

    async fn mark_all_read(&self) -> AppResult<()> {
        self.mutate("mark_all_read".to_string()).await
    }

    async fn delete(&self, id: &NotificationId) -> AppResult<()> {
        self.mutate(format!("delete:{id}")).await
    }
}

/// What one `open` call does.
#[derive(Debug, Clone)]
pub enum Script {
    /// Fail to connect.
    Fail,
    /// Send these chunks, then end the stream.
    Emit(Vec<String>),
    /// Send these chunks, then stay open.
    Hold(Vec<String>),
}

/// Decrements the live counter when its stream is dropped.
struct LiveGuard(Arc<AtomicUsize>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Scripted [`EventSource`] that tracks concurrently open streams.
///
/// Once the script runs out, further opens hold an empty stream open.
#[derive(Debug, Default)]
pub struct MockEventSource {
    scripts: Mutex<VecDeque<Script>>,
    opens: AtomicUsize,
    live: Arc<AtomicUsize>,
    max_live: AtomicUsize,
}

impl MockEventSource {
    /// Create a source following `scripts` in order.
    pub fn new(scripts: Vec<Script>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            ..Self::default()
        }
    }

    /// Total `open` calls.
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Streams currently open.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Highest number of streams open at once.
    pub fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventSource for MockEventSource {
    async fn open(&self, _path: &str) -> AppResult<ByteStream> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Script::Hold(Vec::new()));

        let (chunks, hold) = match script {
            Script::Fail => return Err(AppError::network("connection refused")),
            Script::Emit(chunks) => (chunks, false),
            Script::Hold(chunks) => (chunks, true),
        };

        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_live.fetch_max(live, Ordering::SeqCst);
        let guard = LiveGuard(self.live.clone());

        let body = futures::stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok::<Bytes, AppError>(Bytes::from(c))),
        );
        let tail = if hold {
            futures::stream::pending::<AppResult<Bytes>>().boxed()
        } else {
            futures::stream::empty::<AppResult<Bytes>>().boxed()
        };
        let stream = body.chain(tail).map(move |item| {
            let _ = &guard;
            item
        });
        Ok(Box::pin(stream))
    }
}

/// Records every message it handles.
#[derive(Debug, Default)]
pub struct RecordingHandler {
    messages: Mutex<Vec<StreamMessage>>,
}

impl RecordingHandler {
    /// Ids of handled notification messages, in order.
    pub fn notification_ids(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter_map(|m| match m {
                StreamMessage::Notification { data } => Some(data.id.to_string()),
                _ => None,
            })
            .collect()
    }
}

impl StreamHandler for RecordingHandler {
    fn handle(&self, message: StreamMessage) {
        self.messages.lock().unwrap().push(message);
    }
}

/// [`NativeNotifier`] that records prompts and shown notifications.
#[derive(Debug)]
pub struct RecordingNotifier {
    permission: Mutex<Permission>,
    answer: Permission,
    requests: AtomicUsize,
    shown: Mutex<Vec<NativeNotification>>,
}

impl RecordingNotifier {
    /// Start in `initial`; a prompt resolves to `answer`.
    pub fn new(initial: Permission, answer: Permission) -> Self {
        Self {
            permission: Mutex::new(initial),
            answer,
            requests: AtomicUsize::new(0),
            shown: Mutex::new(Vec::new()),
        }
    }

    /// Number of permission prompts.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Notifications shown so far.
    pub fn shown(&self) -> Vec<NativeNotification> {
        self.shown.lock().unwrap().clone()
    }
}

impl NativeNotifier for RecordingNotifier {
    fn permission(&self) -> Permission {
        *self.permission.lock().unwrap()
    }

    fn request_permission(&self) -> Permission {
        self.requests.fetch_add(1, Ordering::SeqCst);
        *self.permission.lock().unwrap() = self.answer;
        self.answer
    }

    fn show(&self, notification: &NativeNotification) {
        self.shown.lock().unwrap().push(notification.clone());
    }
}
