//! Snapshot, apply, confirm-or-revert.
//!
//! Every store mutation goes through [`NotificationStore::run_optimistic`]:
//! the local change is applied and published before the server call is
//! issued, and undone with the [`Undo`] it returned if the call fails.

use std::future::Future;

use tracing::{debug, warn};

use notihub_core::locale::FeedbackMessage;
use notihub_core::result::AppResult;
use notihub_core::types::{Notification, NotificationId};

use super::feedback::Feedback;
use super::store::{MutationOutcome, NotificationStore, StoreState};

/// How to revert an optimistic change.
#[derive(Debug, Clone)]
pub(crate) enum Undo {
    /// Flip these records back to unread.
    Unread(Vec<NotificationId>),
    /// Re-add a removed record and its unread contribution.
    Reinsert(Notification),
}

impl Undo {
    fn revert(self, state: &mut StoreState) {
        match self {
            Self::Unread(ids) => {
                // Records that arrived or left meanwhile are not touched.
                for id in ids {
                    let Some(index) = state.position(&id) else {
                        continue;
                    };
                    let record = &mut state.notifications[index];
                    if record.is_read {
                        record.is_read = false;
                        state.unread_count += 1;
                    }
                }
            }
            Self::Reinsert(record) => {
                // The stream may have delivered it again meanwhile.
                if state.position(&record.id).is_none() {
                    state.insert_by_recency(record);
                }
            }
        }
    }
}

/// Static description of a mutation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Mutation {
    name: &'static str,
    failure: FeedbackMessage,
    success: Option<FeedbackMessage>,
}

impl Mutation {
    pub(crate) const MARK_READ: Self = Self {
        name: "mark_as_read",
        failure: FeedbackMessage::MarkReadFailed,
        success: None,
    };

    pub(crate) const MARK_ALL_READ: Self = Self {
        name: "mark_all_as_read",
        failure: FeedbackMessage::MarkAllReadFailed,
        success: None,
    };

    pub(crate) const DELETE: Self = Self {
        name: "delete",
        failure: FeedbackMessage::DeleteFailed,
        success: Some(FeedbackMessage::Deleted),
    };
}

impl NotificationStore {
    /// Apply `apply` locally, then confirm with `confirm`.
    ///
    /// `apply` returns `None` when there is nothing to do; no request is
    /// sent in that case. Without a signed-in user nothing is applied or
    /// sent.
    pub(crate) async fn run_optimistic<A, C, F>(
        &self,
        mutation: Mutation,
        apply: A,
        confirm: C,
    ) -> MutationOutcome
    where
        A: FnOnce(&mut StoreState) -> Option<Undo>,
        C: FnOnce() -> F,
        F: Future<Output = AppResult<()>>,
    {
        let (undo, user, applied) = {
            let mut inner = self.lock();
            let Some(user) = inner.user.clone() else {
                debug!(operation = mutation.name, "No signed-in user; skipping");
                return MutationOutcome::Skipped;
            };
            let Some(undo) = apply(&mut inner.state) else {
                return MutationOutcome::NoOp;
            };
            (undo, user, inner.state.clone())
        };
        self.changed(&applied);

        let err = match confirm().await {
            Ok(()) => {
                if let Some(message) = mutation.success {
                    self.feedback(Feedback::success(message, self.language()));
                }
                return MutationOutcome::Applied;
            }
            Err(err) => err,
        };

        warn!(operation = mutation.name, error = %err, "Server refused change; rolling back");
        let reverted = {
            let mut inner = self.lock();
            if inner.user.as_ref() != Some(&user) {
                debug!(operation = mutation.name, "Session changed during request; nothing to revert");
                None
            } else {
                undo.revert(&mut inner.state);
                let language = inner.language;
                self.reproject(&mut inner.state, language);
                Some((inner.state.clone(), language))
            }
        };

        let language = match reverted {
            Some((state, language)) => {
                self.changed(&state);
                language
            }
            None => self.language(),
        };
        self.feedback(Feedback::from_error(&err, mutation.failure, language));
        MutationOutcome::RolledBack(err)
    }
}
