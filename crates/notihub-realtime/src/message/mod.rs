//! Stream message envelope and JSON (de)serialization.

pub mod serializer;
pub mod types;

pub use types::{ContentChange, StreamMessage};
