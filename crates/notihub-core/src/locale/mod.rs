//! Localization helpers: field projection, user feedback texts, and
//! relative timestamps.

pub mod messages;
pub mod projection;
pub mod relative_time;

pub use messages::FeedbackMessage;
pub use projection::project;
pub use relative_time::relative_time;
