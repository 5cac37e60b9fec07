//! Notification REST API trait.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::id::NotificationId;
use crate::types::language::Language;
use crate::types::response::NotificationList;

/// Server-side notification operations consumed by the store.
///
/// Implementations turn a refused acknowledgement (`success: false`) into an
/// error, so `Ok(())` always means the server applied the change.
#[async_trait]
pub trait NotificationApi: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch the full notification list for `language`.
    async fn fetch_all(&self, language: Language) -> AppResult<NotificationList>;

    /// Mark one notification as read.
    async fn mark_read(&self, id: &NotificationId) -> AppResult<()>;

    /// Mark every notification of the current user as read.
    async fn mark_all_read(&self) -> AppResult<()>;

    /// Delete one notification.
    async fn delete(&self, id: &NotificationId) -> AppResult<()>;
}
