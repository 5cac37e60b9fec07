//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field has a default so an empty file is valid.

pub mod api;
pub mod locale;
pub mod logging;
pub mod realtime;

use serde::{Deserialize, Serialize};

pub use self::api::{ApiConfig, SessionConfig};
pub use self::locale::LocaleConfig;
pub use self::logging::LoggingConfig;
pub use self::realtime::{NativeConfig, StreamConfig, ToastConfig};

use crate::error::AppError;
use crate::types::id::UserId;

/// Environment variable prefix, e.g. `NOTIHUB__API__BASE_URL`.
const ENV_PREFIX: &str = "NOTIHUB";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// REST endpoint settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Session identity.
    #[serde(default)]
    pub session: SessionConfig,
    /// Event stream settings.
    #[serde(default)]
    pub stream: StreamConfig,
    /// Toast queue settings.
    #[serde(default)]
    pub toast: ToastConfig,
    /// Display language settings.
    #[serde(default)]
    pub locale: LocaleConfig,
    /// Native notification settings.
    #[serde(default)]
    pub native: NativeConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for an environment.
    ///
    /// Merges `config/default.toml`, the `config/{env}.toml` overlay, and
    /// environment variables prefixed with `NOTIHUB__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(Self::env_source())
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        Self::finish(config)
    }

    /// Load configuration from an explicit file plus environment overrides.
    pub fn load_file(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(Self::env_source())
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        Self::finish(config)
    }

    /// Parse configuration from TOML text, without environment overrides.
    pub fn from_toml_str(text: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        Self::finish(config)
    }

    /// Checks values that deserialize fine but cannot work.
    pub fn validate(&self) -> Result<(), AppError> {
        let base = self.api.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(AppError::configuration(format!(
                "api.base_url must be an http(s) URL, got '{base}'"
            )));
        }
        if !self.stream.path.starts_with('/') {
            return Err(AppError::configuration("stream.path must start with '/'"));
        }
        if self.stream.reconnect_delay_ms == 0 {
            return Err(AppError::configuration(
                "stream.reconnect_delay_ms must be greater than zero",
            ));
        }
        if self.toast.max_visible == 0 {
            return Err(AppError::configuration("toast.max_visible must be at least 1"));
        }
        if self.toast.lifetime_seconds == 0 || self.toast.tick_interval_ms == 0 {
            return Err(AppError::configuration(
                "toast.lifetime_seconds and toast.tick_interval_ms must be greater than zero",
            ));
        }
        Ok(())
    }

    /// The signed-in user, if the session provider supplied one.
    pub fn user_id(&self) -> Option<UserId> {
        self.session
            .user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(UserId::from)
    }

    fn env_source() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
    }

    fn finish(config: config::Config) -> Result<Self, AppError> {
        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        parsed.validate()?;
        Ok(parsed)
    }
}
