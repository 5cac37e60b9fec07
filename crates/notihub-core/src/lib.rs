//! # notihub-core
//!
//! Core crate for NotiHub. Contains configuration schemas, the notification
//! data model, typed identifiers, localization helpers, the traits that the
//! client and realtime crates implement or consume, and the unified error
//! system.
//!
//! This crate has **no** internal dependencies on other NotiHub crates.

pub mod config;
pub mod error;
pub mod locale;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
