//! The notification store: single source of truth for the signed-in user's
//! notifications and unread counter.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use notihub_core::error::AppError;
use notihub_core::locale::{FeedbackMessage, project};
use notihub_core::result::AppResult;
use notihub_core::traits::api::NotificationApi;
use notihub_core::types::{Language, Notification, NotificationId, UserId};

use super::feedback::Feedback;
use super::observer::{StoreChange, StoreObserver};
use super::optimistic::{Mutation, Undo};

/// Capacity of the change broadcast channel.
const CHANGE_BUFFER: usize = 64;

/// Records, newest first, plus the incrementally maintained unread counter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreState {
    pub(crate) notifications: Vec<Notification>,
    pub(crate) unread_count: usize,
}

impl StoreState {
    /// Build a state from a server list, dropping repeated ids.
    pub fn from_records(records: Vec<Notification>) -> Self {
        let mut seen = HashSet::with_capacity(records.len());
        let notifications: Vec<Notification> = records
            .into_iter()
            .filter(|r| seen.insert(r.id.clone()))
            .collect();
        let unread_count = notifications.iter().filter(|r| !r.is_read).count();
        Self {
            notifications,
            unread_count,
        }
    }

    /// Records, newest first.
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Unread counter.
    pub fn unread_count(&self) -> usize {
        self.unread_count
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    /// Whether no records are held.
    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    /// Look up a record.
    pub fn get(&self, id: &NotificationId) -> Option<&Notification> {
        self.notifications.iter().find(|r| &r.id == id)
    }

    /// Index of a record.
    pub fn position(&self, id: &NotificationId) -> Option<usize> {
        self.notifications.iter().position(|r| &r.id == id)
    }

    /// Whether the counter matches the records and ids are unique.
    pub fn is_consistent(&self) -> bool {
        let mut ids = HashSet::with_capacity(self.notifications.len());
        let unique = self.notifications.iter().all(|r| ids.insert(&r.id));
        let unread = self.notifications.iter().filter(|r| !r.is_read).count();
        unique && unread == self.unread_count
    }

    /// Insert `record` at its newest-first position by creation time.
    pub(crate) fn insert_by_recency(&mut self, record: Notification) {
        let index = self
            .notifications
            .iter()
            .position(|r| r.created_at < record.created_at)
            .unwrap_or(self.notifications.len());
        if !record.is_read {
            self.unread_count += 1;
        }
        self.notifications.insert(index, record);
    }

    fn reproject(&mut self, language: Language, base: Language) {
        for record in &mut self.notifications {
            record.localized = project(record, language, base);
        }
    }
}

/// Result of a store mutation.
#[derive(Debug, Clone)]
pub enum MutationOutcome {
    /// Applied locally and confirmed by the server.
    Applied,
    /// Nothing to do: the record is missing or already in the target state.
    NoOp,
    /// No signed-in user; nothing was sent.
    Skipped,
    /// The server call failed and the local change was reverted.
    RolledBack(AppError),
}

impl MutationOutcome {
    /// Whether the change is now in effect on the server.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    /// The error that caused a rollback.
    pub fn error(&self) -> Option<&AppError> {
        match self {
            Self::RolledBack(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub(super) struct Inner {
    pub(super) state: StoreState,
    pub(super) language: Language,
    pub(super) user: Option<UserId>,
}

/// Owner of the notification list.
///
/// Mutation methods are the only write path. Readers take snapshots,
/// register a [`StoreObserver`], or subscribe to [`StoreChange`]s.
#[derive(Debug)]
pub struct NotificationStore {
    api: Arc<dyn NotificationApi>,
    base_language: Language,
    inner: Mutex<Inner>,
    observers: RwLock<Vec<Arc<dyn StoreObserver>>>,
    changes: broadcast::Sender<StoreChange>,
}

impl NotificationStore {
    /// Create an empty store without a signed-in user.
    ///
    /// `base_language` is the language of the records' primary fields.
    pub fn new(api: Arc<dyn NotificationApi>, language: Language, base_language: Language) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Self {
            api,
            base_language,
            inner: Mutex::new(Inner {
                state: StoreState::default(),
                language,
                user: None,
            }),
            observers: RwLock::new(Vec::new()),
            changes,
        }
    }

    /// Register a synchronous observer.
    pub fn add_observer(&self, observer: Arc<dyn StoreObserver>) {
        self.observers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(observer);
    }

    /// Subscribe to change events.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> StoreState {
        self.lock().state.clone()
    }

    /// Current unread counter.
    pub fn unread_count(&self) -> usize {
        self.lock().state.unread_count
    }

    /// Ids of all held records.
    pub fn ids(&self) -> Vec<NotificationId> {
        self.lock()
            .state
            .notifications
            .iter()
            .map(|r| r.id.clone())
            .collect()
    }

    /// Copy of one record.
    pub fn get(&self, id: &NotificationId) -> Option<Notification> {
        self.lock().state.get(id).cloned()
    }

    /// Current display language.
    pub fn language(&self) -> Language {
        self.lock().language
    }

    /// Language of the records' primary fields.
    pub fn base_language(&self) -> Language {
        self.base_language
    }

    /// Signed-in user, if any.
    pub fn user(&self) -> Option<UserId> {
        self.lock().user.clone()
    }

    /// Set or clear the signed-in user. Held records are dropped when the
    /// user changes. Returns whether anything changed.
    pub fn set_user(&self, user: Option<UserId>) -> bool {
        let state = {
            let mut inner = self.lock();
            if inner.user == user {
                return false;
            }
            let had_user = inner.user.is_some();
            inner.user = user;
            if !had_user && inner.state.is_empty() {
                return true;
            }
            inner.state = StoreState::default();
            inner.state.clone()
        };
        info!("Session changed; notification list cleared");
        self.notify_observers(&state);
        self.emit(StoreChange::Cleared);
        true
    }

    /// Switch the display language and re-project held records.
    pub fn set_language(&self, language: Language) {
        let state = {
            let mut inner = self.lock();
            if inner.language == language {
                return;
            }
            inner.language = language;
            inner.state.reproject(language, self.base_language);
            inner.state.clone()
        };
        debug!(%language, "Display language changed");
        self.changed(&state);
    }

    /// Replace the list with the server's.
    ///
    /// On failure the previous list is kept, error feedback is emitted, and
    /// the error is returned.
    pub async fn fetch_all(&self) -> AppResult<()> {
        let language = {
            let inner = self.lock();
            if inner.user.is_none() {
                return Err(AppError::session("No signed-in user"));
            }
            inner.language
        };

        let list = match self.api.fetch_all(language).await {
            Ok(list) => list,
            Err(err) => {
                warn!(error = %err, "Failed to fetch notifications; keeping previous list");
                self.feedback(Feedback::from_error(&err, FeedbackMessage::FetchFailed, language));
                return Err(err);
            }
        };

        let server_unread = list.unread_count;
        let state = {
            let mut inner = self.lock();
            let mut state = StoreState::from_records(list.notifications);
            state.reproject(inner.language, self.base_language);
            inner.state = state;
            inner.state.clone()
        };
        if state.unread_count != server_unread {
            debug!(
                server = server_unread,
                local = state.unread_count,
                "Server unread count differs from records; using local count"
            );
        }
        info!(
            count = state.len(),
            unread = state.unread_count,
            "Notifications loaded"
        );

        self.notify_observers(&state);
        self.emit(StoreChange::Replaced {
            unread_count: state.unread_count,
        });
        Ok(())
    }

    /// Add a record delivered by the event stream.
    ///
    /// A record whose id is already held replaces the old copy, so ids stay
    /// unique; the read flag of the old copy is kept if it was set. Unread
    /// records are forwarded to observers' `on_ingest`.
    pub fn ingest(&self, mut record: Notification) {
        let state = {
            let mut inner = self.lock();
            record.localized = project(&record, inner.language, self.base_language);

            if let Some(index) = inner.state.position(&record.id) {
                let old = inner.state.notifications.remove(index);
                if !old.is_read {
                    inner.state.unread_count = inner.state.unread_count.saturating_sub(1);
                }
                // A redelivery never turns a read record unread again.
                record.is_read |= old.is_read;
                debug!(id = %record.id, "Replacing duplicate notification");
            }
            if !record.is_read {
                inner.state.unread_count += 1;
            }
            inner.state.notifications.insert(0, record.clone());
            inner.state.clone()
        };
        debug!(id = %record.id, unread = !record.is_read, "Notification ingested");

        let observers = self.observers();
        if !record.is_read {
            for observer in &observers {
                observer.on_ingest(&record);
            }
        }
        for observer in &observers {
            observer.on_change(&state);
        }
        self.emit(StoreChange::Ingested {
            id: record.id,
            unread_count: state.unread_count,
        });
    }

    /// Mark one record read.
    pub async fn mark_as_read(&self, id: &NotificationId) -> MutationOutcome {
        self.run_optimistic(
            Mutation::MARK_READ,
            |state| {
                let index = state.position(id)?;
                if state.notifications[index].is_read {
                    return None;
                }
                state.notifications[index].is_read = true;
                state.unread_count = state.unread_count.saturating_sub(1);
                Some(Undo::Unread(vec![id.clone()]))
            },
            || self.api.mark_read(id),
        )
        .await
    }

    /// Mark every record read. Sends nothing when nothing is unread.
    pub async fn mark_all_as_read(&self) -> MutationOutcome {
        self.run_optimistic(
            Mutation::MARK_ALL_READ,
            |state| {
                let touched: Vec<NotificationId> = state
                    .notifications
                    .iter_mut()
                    .filter(|r| !r.is_read)
                    .map(|r| {
                        r.is_read = true;
                        r.id.clone()
                    })
                    .collect();
                if touched.is_empty() {
                    return None;
                }
                state.unread_count = 0;
                Some(Undo::Unread(touched))
            },
            || self.api.mark_all_read(),
        )
        .await
    }

    /// Delete one record.
    pub async fn delete(&self, id: &NotificationId) -> MutationOutcome {
        self.run_optimistic(
            Mutation::DELETE,
            |state| {
                let index = state.position(id)?;
                let record = state.notifications.remove(index);
                if !record.is_read {
                    state.unread_count = state.unread_count.saturating_sub(1);
                }
                Some(Undo::Reinsert(record))
            },
            || self.api.delete(id),
        )
        .await
    }

    pub(super) fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(super) fn reproject(&self, state: &mut StoreState, language: Language) {
        state.reproject(language, self.base_language);
    }

    /// Tell observers and subscribers about a mutation or rollback.
    pub(super) fn changed(&self, state: &StoreState) {
        self.notify_observers(state);
        self.emit(StoreChange::Updated {
            unread_count: state.unread_count,
        });
    }

    pub(super) fn feedback(&self, feedback: Feedback) {
        self.emit(StoreChange::Feedback(feedback));
    }

    fn observers(&self) -> Vec<Arc<dyn StoreObserver>> {
        self.observers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn notify_observers(&self, state: &StoreState) {
        for observer in self.observers() {
            observer.on_change(state);
        }
    }

    fn emit(&self, change: StoreChange) {
        // No subscribers is fine.
        let _ = self.changes.send(change);
    }
}
