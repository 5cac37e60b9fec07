//! Ids that have already been admitted as toasts.

use std::collections::HashSet;

use notihub_core::types::NotificationId;

/// Admission history of the toast queue.
///
/// Grows by one id per admitted toast; [`retain_present`](Self::retain_present)
/// bounds it to ids the store still holds.
#[derive(Debug, Default)]
pub struct SeenIds {
    ids: HashSet<NotificationId>,
}

impl SeenIds {
    /// Record `id`. Returns `false` if it was already seen.
    pub fn insert(&mut self, id: &NotificationId) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.clone())
    }

    /// Whether `id` was seen.
    pub fn contains(&self, id: &NotificationId) -> bool {
        self.ids.contains(id)
    }

    /// Forget ids not in `present`. Returns how many were dropped.
    pub fn retain_present(&mut self, present: &HashSet<NotificationId>) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| present.contains(id));
        before - self.ids.len()
    }

    /// Number of remembered ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is remembered.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
