//! Display language configuration.

use serde::{Deserialize, Serialize};

use crate::types::language::Language;

/// Language settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocaleConfig {
    /// Current display language.
    #[serde(default)]
    pub language: Language,
    /// Language of the records' base `title`/`message` fields.
    #[serde(default)]
    pub base_language: Language,
}
