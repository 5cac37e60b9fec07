//! Shared domain types: typed identifiers, languages, the notification
//! record, and REST response shapes.

pub mod id;
pub mod language;
pub mod notification;
pub mod response;

pub use id::{NotificationId, UserId};
pub use language::{Language, TextDirection};
pub use notification::{LocalizedText, Notification, NotificationKind, RelatedKind};
pub use response::{ApiAck, NotificationList};
