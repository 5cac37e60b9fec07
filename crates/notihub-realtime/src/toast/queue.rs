//! Capped, auto-expiring toast queue.

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::debug;

use notihub_core::config::ToastConfig;
use notihub_core::types::{Language, Notification, NotificationId, TextDirection};

use super::seen::SeenIds;
use crate::notification::observer::StoreObserver;
use crate::notification::store::StoreState;

/// Capacity of the toast event channel.
const EVENT_BUFFER: usize = 64;

/// A visible toast.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedToast {
    /// `{notification_id}-{admitted_unix_millis}`.
    pub queue_id: String,
    /// Snapshot of the notification at admission.
    pub notification: Notification,
    /// Admission time; drives the countdown.
    pub admitted_at: Instant,
}

/// Why a toast left the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
    /// Its lifetime elapsed.
    Expired,
    /// The user closed it.
    Dismissed,
    /// The user followed its action.
    Opened,
    /// Its notification was read elsewhere or is gone.
    Read,
    /// A newer toast pushed it out.
    Evicted,
}

/// Queue change for renderers.
#[derive(Debug, Clone, PartialEq)]
pub enum ToastEvent {
    /// A toast was admitted.
    Shown(QueuedToast),
    /// A toast was removed.
    Removed {
        /// Queue id of the removed toast.
        queue_id: String,
        /// Why it was removed.
        reason: RemovalReason,
    },
}

/// Screen edge toasts stack against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenEdge {
    /// Left edge.
    Left,
    /// Right edge.
    Right,
}

/// What a renderer needs to lay out the queue.
#[derive(Debug, Clone, PartialEq)]
pub struct ToastLayout {
    /// Edge the stack is anchored to.
    pub anchor: ScreenEdge,
    /// Text direction of the toast contents.
    pub direction: TextDirection,
    /// Visible toasts, newest first.
    pub toasts: Vec<QueuedToast>,
}

#[derive(Debug, Default)]
struct Inner {
    /// Oldest first.
    toasts: VecDeque<QueuedToast>,
    seen: SeenIds,
}

/// Toasts for unread notifications that arrived while the client was open.
///
/// Registered as a [`StoreObserver`]: admits on ingest and drops toasts
/// whose notification is read or gone on every store change.
#[derive(Debug)]
pub struct ToastQueue {
    lifetime: Duration,
    max_visible: usize,
    inner: Mutex<Inner>,
    events: broadcast::Sender<ToastEvent>,
}

impl ToastQueue {
    /// Create an empty queue.
    pub fn new(config: &ToastConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            lifetime: config.lifetime(),
            max_visible: config.max_visible.max(1),
            inner: Mutex::new(Inner::default()),
            events,
        }
    }

    /// Subscribe to queue changes.
    pub fn subscribe(&self) -> broadcast::Receiver<ToastEvent> {
        self.events.subscribe()
    }

    /// Admit `record` unless it is read or was admitted before.
    pub fn admit(&self, record: &Notification, now: Instant) -> Option<QueuedToast> {
        if record.is_read {
            return None;
        }

        let (toast, evicted) = {
            let mut inner = self.lock();
            if !inner.seen.insert(&record.id) {
                debug!(id = %record.id, "Toast already shown once; not re-admitting");
                return None;
            }
            let toast = QueuedToast {
                queue_id: format!("{}-{}", record.id, Utc::now().timestamp_millis()),
                notification: record.clone(),
                admitted_at: now,
            };
            inner.toasts.push_back(toast.clone());
            let mut evicted = Vec::new();
            while inner.toasts.len() > self.max_visible {
                if let Some(old) = inner.toasts.pop_front() {
                    evicted.push(old);
                }
            }
            (toast, evicted)
        };

        debug!(queue_id = %toast.queue_id, "Toast admitted");
        self.emit(ToastEvent::Shown(toast.clone()));
        self.emit_removed(evicted, RemovalReason::Evicted);
        Some(toast)
    }

    /// Visible toasts, oldest first.
    pub fn visible(&self) -> Vec<QueuedToast> {
        self.lock().toasts.iter().cloned().collect()
    }

    /// Number of visible toasts.
    pub fn len(&self) -> usize {
        self.lock().toasts.len()
    }

    /// Whether no toast is visible.
    pub fn is_empty(&self) -> bool {
        self.lock().toasts.is_empty()
    }

    /// Copy of one toast.
    pub fn get(&self, queue_id: &str) -> Option<QueuedToast> {
        self.lock()
            .toasts
            .iter()
            .find(|t| t.queue_id == queue_id)
            .cloned()
    }

    /// Close a toast at the user's request.
    pub fn dismiss(&self, queue_id: &str) -> Option<QueuedToast> {
        self.remove(queue_id, RemovalReason::Dismissed)
    }

    /// Remove a toast for `reason`.
    pub fn remove(&self, queue_id: &str, reason: RemovalReason) -> Option<QueuedToast> {
        let removed = {
            let mut inner = self.lock();
            let index = inner.toasts.iter().position(|t| t.queue_id == queue_id)?;
            inner.toasts.remove(index)
        };
        if let Some(toast) = &removed {
            self.emit(ToastEvent::Removed {
                queue_id: toast.queue_id.clone(),
                reason,
            });
        }
        removed
    }

    /// Remove toasts whose lifetime has elapsed at `now`.
    pub fn expire(&self, now: Instant) -> Vec<QueuedToast> {
        let lifetime = self.lifetime;
        let expired = self.drain_where(|t| now.saturating_duration_since(t.admitted_at) >= lifetime);
        self.emit_removed(expired.clone(), RemovalReason::Expired);
        expired
    }

    /// Remaining fraction of a toast's lifetime at `now`, from 1.0 to 0.0.
    pub fn progress(&self, queue_id: &str, now: Instant) -> Option<f64> {
        let inner = self.lock();
        let toast = inner.toasts.iter().find(|t| t.queue_id == queue_id)?;
        let elapsed = now.saturating_duration_since(toast.admitted_at);
        let remaining = self.lifetime.saturating_sub(elapsed);
        if self.lifetime.is_zero() {
            return Some(0.0);
        }
        Some(remaining.as_secs_f64() / self.lifetime.as_secs_f64())
    }

    /// Drop toasts whose notification is read or no longer held.
    pub fn retain_unread(&self, state: &StoreState) -> Vec<QueuedToast> {
        let dropped = self.drain_where(|t| {
            state
                .get(&t.notification.id)
                .is_none_or(|record| record.is_read)
        });
        self.emit_removed(dropped.clone(), RemovalReason::Read);
        dropped
    }

    /// Forget seen ids that are not in `current`. Returns how many were dropped.
    pub fn prune_seen(&self, current: &[NotificationId]) -> usize {
        let present: HashSet<NotificationId> = current.iter().cloned().collect();
        let pruned = self.lock().seen.retain_present(&present);
        if pruned > 0 {
            debug!(pruned, "Pruned toast seen-ids");
        }
        pruned
    }

    /// Number of remembered admission ids.
    pub fn seen_count(&self) -> usize {
        self.lock().seen.len()
    }

    /// Layout for `language`: right-to-left text stacks on the left edge.
    pub fn layout(&self, language: Language) -> ToastLayout {
        let direction = language.direction();
        let anchor = match direction {
            TextDirection::Rtl => ScreenEdge::Left,
            TextDirection::Ltr => ScreenEdge::Right,
        };
        let toasts = self.lock().toasts.iter().rev().cloned().collect();
        ToastLayout {
            anchor,
            direction,
            toasts,
        }
    }

    fn drain_where(&self, mut predicate: impl FnMut(&QueuedToast) -> bool) -> Vec<QueuedToast> {
        let mut inner = self.lock();
        let mut removed = Vec::new();
        inner.toasts.retain(|t| {
            if predicate(t) {
                removed.push(t.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    fn emit_removed(&self, toasts: Vec<QueuedToast>, reason: RemovalReason) {
        for toast in toasts {
            debug!(queue_id = %toast.queue_id, ?reason, "Toast removed");
            self.emit(ToastEvent::Removed {
                queue_id: toast.queue_id,
                reason,
            });
        }
    }

    fn emit(&self, event: ToastEvent) {
        let _ = self.events.send(event);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StoreObserver for ToastQueue {
    fn on_ingest(&self, record: &Notification) {
        self.admit(record, Instant::now());
    }

    fn on_change(&self, state: &StoreState) {
        self.retain_unread(state);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::test_support::{record, seeded_store};

    fn queue(max_visible: usize) -> ToastQueue {
        ToastQueue::new(&ToastConfig {
            max_visible,
            ..ToastConfig::default()
        })
    }

    async fn store_with_toasts(
        records: Vec<Notification>,
    ) -> (
        Arc<crate::test_support::FakeNotificationApi>,
        crate::notification::store::NotificationStore,
        Arc<ToastQueue>,
    ) {
        let (api, store) = seeded_store(records).await;
        let toasts = Arc::new(queue(5));
        store.add_observer(toasts.clone());
        (api, store, toasts)
    }

    #[tokio::test]
    async fn ingesting_unread_admits_exactly_one_toast() {
        let (_api, store, toasts) = store_with_toasts(vec![record("a", 5, false)]).await;

        store.ingest(record("c", 0, false));

        let visible = toasts.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].notification.id.as_str(), "c");
        assert!(visible[0].queue_id.starts_with("c-"));
    }

    #[tokio::test]
    async fn same_id_twice_is_admitted_once() {
        let (_api, store, toasts) = store_with_toasts(vec![]).await;

        store.ingest(record("c", 0, false));
        store.ingest(record("c", 0, false));

        assert_eq!(toasts.len(), 1);
    }

    #[tokio::test]
    async fn read_records_are_never_admitted() {
        let (_api, store, toasts) = store_with_toasts(vec![]).await;
        store.ingest(record("c", 0, true));
        assert!(toasts.is_empty());
        assert_eq!(toasts.seen_count(), 0);
    }

    #[tokio::test]
    async fn reading_elsewhere_removes_the_toast() {
        let (api, store, toasts) = store_with_toasts(vec![record("a", 5, false)]).await;
        store.ingest(record("c", 0, false));
        assert_eq!(toasts.len(), 1);
        let mut events = toasts.subscribe();

        let gate = api.gate();
        let store = Arc::new(store);
        let task = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .mark_as_read(&NotificationId::new("c"))
                    .await
            })
        };
        while api.calls().is_empty() {
            tokio::task::yield_now().await;
        }

        // Gone as soon as the optimistic change lands.
        assert!(toasts.is_empty());
        assert!(matches!(
            events.try_recv().unwrap(),
            ToastEvent::Removed {
                reason: RemovalReason::Read,
                ..
            }
        ));

        gate.notify_one();
        assert!(task.await.unwrap().is_applied());
        assert!(toasts.is_empty());
    }

    #[tokio::test]
    async fn mark_all_read_and_delete_clear_matching_toasts() {
        let (_api, store, toasts) = store_with_toasts(vec![]).await;
        store.ingest(record("c", 0, false));
        store.ingest(record("d", 0, false));
        assert_eq!(toasts.len(), 2);

        store.delete(&NotificationId::new("d")).await;
        assert_eq!(toasts.len(), 1);

        store.mark_all_as_read().await;
        assert!(toasts.is_empty());
    }

    #[test]
    fn expires_after_lifetime() {
        let q = queue(5);
        let t0 = Instant::now();
        let toast = q.admit(&record("c", 0, false), t0).unwrap();

        assert!(q.expire(t0 + Duration::from_secs(59)).is_empty());
        assert_eq!(
            q.progress(&toast.queue_id, t0 + Duration::from_secs(30)),
            Some(0.5)
        );

        let expired = q.expire(t0 + Duration::from_secs(60));
        assert_eq!(expired.len(), 1);
        assert!(q.is_empty());
        assert_eq!(q.progress(&toast.queue_id, t0), None);
    }

    #[test]
    fn cap_evicts_oldest() {
        let q = queue(2);
        let mut events = q.subscribe();
        let t0 = Instant::now();
        q.admit(&record("a", 0, false), t0);
        q.admit(&record("b", 0, false), t0);
        q.admit(&record("c", 0, false), t0);

        let ids: Vec<_> = q
            .visible()
            .iter()
            .map(|t| t.notification.id.as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["b", "c"]);

        let evicted = std::iter::from_fn(|| events.try_recv().ok()).any(|e| {
            matches!(e, ToastEvent::Removed { ref queue_id, reason: RemovalReason::Evicted } if queue_id.starts_with("a-"))
        });
        assert!(evicted);
    }

    #[test]
    fn dismiss_removes_only_that_toast() {
        let q = queue(5);
        let t0 = Instant::now();
        let a = q.admit(&record("a", 0, false), t0).unwrap();
        q.admit(&record("b", 0, false), t0);

        assert!(q.dismiss(&a.queue_id).is_some());
        assert!(q.dismiss(&a.queue_id).is_none());
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn prune_seen_forgets_ids_no_longer_held() {
        let q = queue(5);
        let t0 = Instant::now();
        q.admit(&record("a", 0, false), t0);
        q.admit(&record("b", 0, false), t0);

        assert_eq!(q.prune_seen(&[NotificationId::new("b")]), 1);
        assert_eq!(q.seen_count(), 1);
        // A pruned id can be admitted again if it reappears.
        assert!(q.admit(&record("a", 0, false), t0).is_some());
    }

    #[test]
    fn layout_follows_text_direction() {
        let q = queue(5);
        let t0 = Instant::now();
        q.admit(&record("a", 0, false), t0);
        q.admit(&record("b", 0, false), t0);

        let rtl = q.layout(Language::Ar);
        assert_eq!(rtl.anchor, ScreenEdge::Left);
        assert_eq!(rtl.direction, TextDirection::Rtl);
        assert_eq!(rtl.toasts[0].notification.id.as_str(), "b");

        assert_eq!(q.layout(Language::En).anchor, ScreenEdge::Right);
    }
}
