//! Event stream, toast, and native notification configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::traits::notifier::Permission;

/// Event stream (SSE) connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Stream path relative to the API base URL.
    #[serde(default = "default_stream_path")]
    pub path: String,
    /// Fixed delay before reconnecting after a transport error.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
    /// Longest accepted line in the event stream.
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,
}

impl StreamConfig {
    /// Reconnect delay as a [`Duration`].
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            path: default_stream_path(),
            reconnect_delay_ms: default_reconnect_delay(),
            max_line_bytes: default_max_line_bytes(),
        }
    }
}

/// Toast queue settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToastConfig {
    /// Seconds a toast stays visible.
    #[serde(default = "default_lifetime")]
    pub lifetime_seconds: u64,
    /// Maximum toasts visible at once; admitting more evicts the oldest.
    #[serde(default = "default_max_visible")]
    pub max_visible: usize,
    /// Countdown refresh interval in milliseconds.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Interval between seen-id garbage collections, in seconds.
    #[serde(default = "default_seen_prune_interval")]
    pub seen_prune_interval_seconds: u64,
}

impl ToastConfig {
    /// Toast lifetime as a [`Duration`].
    pub fn lifetime(&self) -> Duration {
        Duration::from_secs(self.lifetime_seconds)
    }

    /// Tick interval as a [`Duration`].
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Seen-id prune interval as a [`Duration`].
    pub fn seen_prune_interval(&self) -> Duration {
        Duration::from_secs(self.seen_prune_interval_seconds)
    }
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            lifetime_seconds: default_lifetime(),
            max_visible: default_max_visible(),
            tick_interval_ms: default_tick_interval(),
            seen_prune_interval_seconds: default_seen_prune_interval(),
        }
    }
}

/// Native notification bridge settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeConfig {
    /// Whether new notifications are mirrored to the native surface.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Answer given when the console notifier is asked for permission.
    #[serde(default = "default_permission")]
    pub permission: Permission,
}

impl Default for NativeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            permission: default_permission(),
        }
    }
}

fn default_stream_path() -> String {
    "/notifications/stream".to_string()
}

fn default_reconnect_delay() -> u64 {
    2000
}

fn default_max_line_bytes() -> usize {
    64 * 1024
}

fn default_lifetime() -> u64 {
    60
}

fn default_max_visible() -> usize {
    5
}

fn default_tick_interval() -> u64 {
    50
}

fn default_seen_prune_interval() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

fn default_permission() -> Permission {
    Permission::Granted
}
