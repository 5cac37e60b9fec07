//! Top-level engine that ties the store, toast queue, native bridge,
//! change feed, and event stream together.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use notihub_core::config::AppConfig;
use notihub_core::error::AppError;
use notihub_core::result::AppResult;
use notihub_core::traits::api::NotificationApi;
use notihub_core::traits::notifier::{NativeNotifier, Permission};
use notihub_core::traits::stream::EventSource;
use notihub_core::types::Language;

use crate::bridge::change_feed::ChangeFeed;
use crate::bridge::native::NativeBridge;
use crate::bridge::router::MessageRouter;
use crate::notification::store::NotificationStore;
use crate::stream::manager::StreamManager;
use crate::stream::state::ConnectionState;
use crate::toast::queue::{RemovalReason, ToastQueue};

/// The running notification client.
pub struct NotificationEngine {
    store: Arc<NotificationStore>,
    toasts: Arc<ToastQueue>,
    bridge: Arc<NativeBridge>,
    feed: Arc<ChangeFeed>,
    stream: StreamManager,
    config: AppConfig,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for NotificationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationEngine")
            .field("stream", &self.stream)
            .field("toasts", &self.toasts.len())
            .finish()
    }
}

impl NotificationEngine {
    /// Wire up all components. Nothing runs until [`start`](Self::start).
    pub fn new(
        config: AppConfig,
        api: Arc<dyn NotificationApi>,
        source: Arc<dyn EventSource>,
        notifier: Arc<dyn NativeNotifier>,
    ) -> Self {
        let store = Arc::new(NotificationStore::new(
            api,
            config.locale.language,
            config.locale.base_language,
        ));
        store.set_user(config.user_id());

        let toasts = Arc::new(ToastQueue::new(&config.toast));
        let bridge = Arc::new(NativeBridge::new(notifier, config.native.enabled));
        store.add_observer(toasts.clone());
        store.add_observer(bridge.clone());

        let feed = Arc::new(ChangeFeed::default());
        let router = Arc::new(MessageRouter::new(store.clone(), feed.clone()));
        let stream = StreamManager::new("notifications", source, router, &config.stream);

        info!("Notification engine initialized");

        Self {
            store,
            toasts,
            bridge,
            feed,
            stream,
            config,
            cancel: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// The notification store.
    pub fn store(&self) -> &Arc<NotificationStore> {
        &self.store
    }

    /// The toast queue.
    pub fn toasts(&self) -> &Arc<ToastQueue> {
        &self.toasts
    }

    /// The content-change feed.
    pub fn feed(&self) -> &Arc<ChangeFeed> {
        &self.feed
    }

    /// Watch the event stream connection state.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.stream.subscribe_state()
    }

    /// Load the list, open the stream, and start the toast timers.
    ///
    /// A failed initial load is reported as feedback and does not stop the
    /// stream from opening. Fails only when no user is signed in.
    pub async fn start(&self) -> AppResult<Permission> {
        if self.store.user().is_none() {
            return Err(AppError::session(
                "No signed-in user; set session.user_id to start",
            ));
        }

        let permission = self.bridge.init();

        if let Err(e) = self.store.fetch_all().await {
            warn!(error = %e, "Initial notification load failed");
        }

        self.stream.connect();
        self.spawn_timers();
        info!(permission = ?permission, "Notification engine started");
        Ok(permission)
    }

    /// Follow a toast's action: remove the toast, mark its notification
    /// read, and return the navigation target.
    pub async fn open_toast(&self, queue_id: &str) -> Option<String> {
        let toast = self.toasts.remove(queue_id, RemovalReason::Opened)?;
        let outcome = self.store.mark_as_read(&toast.notification.id).await;
        debug!(queue_id, ?outcome, "Toast opened");
        toast.notification.action_url
    }

    /// Close a toast. Returns whether it was visible.
    pub fn dismiss_toast(&self, queue_id: &str) -> bool {
        self.toasts.dismiss(queue_id).is_some()
    }

    /// Switch the display language.
    pub fn set_language(&self, language: Language) {
        self.store.set_language(language);
    }

    /// Stop the stream and timers and wait for them to finish.
    pub async fn shutdown(&self) {
        info!("Shutting down notification engine");
        self.cancel.cancel();
        self.stream.shutdown().await;

        let tasks: Vec<_> = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(|e| e.into_inner()));
        for task in tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Engine task ended abnormally");
            }
        }
        info!("Notification engine shut down");
    }

    fn spawn_timers(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        if !tasks.is_empty() {
            return;
        }

        let toasts = self.toasts.clone();
        let cancel = self.cancel.clone();
        let tick = self.config.toast.tick_interval();
        tasks.push(tokio::spawn(async move {
            let mut interval = time::interval(tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        toasts.expire(Instant::now());
                    }
                }
            }
        }));

        let toasts = self.toasts.clone();
        let store = self.store.clone();
        let cancel = self.cancel.clone();
        let period = self.config.toast.seen_prune_interval();
        tasks.push(tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        toasts.prune_seen(&store.ids());
                    }
                }
            }
        }));
    }
}
