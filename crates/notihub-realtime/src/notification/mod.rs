//! The notification store and its collaborators.

pub mod feedback;
pub mod observer;
pub mod optimistic;
pub mod store;

pub use feedback::{Feedback, FeedbackLevel};
pub use observer::{StoreChange, StoreObserver};
pub use store::{MutationOutcome, NotificationStore, StoreState};
