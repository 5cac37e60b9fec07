//! CLI command definitions and dispatch.

pub mod config;
pub mod notification;
pub mod watch;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use notihub_client::{Endpoint, HttpNotificationApi};
use notihub_core::config::AppConfig;
use notihub_core::error::AppError;
use notihub_core::types::Language;
use notihub_realtime::NotificationStore;

/// NotiHub: read and manage your notifications from the terminal
#[derive(Debug, Parser)]
#[command(name = "notihub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Display language, overriding `locale.language`
    #[arg(short, long)]
    pub language: Option<Language>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List notifications, newest first
    List(notification::ListArgs),
    /// Mark one notification as read
    Read(notification::ReadArgs),
    /// Mark every notification as read
    ReadAll,
    /// Delete a notification
    Delete(notification::DeleteArgs),
    /// Follow the live stream and print toasts until Ctrl-C
    Watch(watch::WatchArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::List(args) => notification::list(args, &self.settings()?, self.format).await,
            Commands::Read(args) => notification::read(args, &self.settings()?).await,
            Commands::ReadAll => notification::read_all(&self.settings()?).await,
            Commands::Delete(args) => notification::delete(args, &self.settings()?).await,
            Commands::Watch(args) => watch::execute(args, self.settings()?, self.format).await,
            Commands::Config(args) => config::execute(args, &self.config, self.format).await,
        }
    }

    /// Configuration with command-line overrides applied
    fn settings(&self) -> Result<AppConfig, AppError> {
        let mut config = load_config(&self.config)?;
        if let Some(language) = self.language {
            config.locale.language = language;
        }
        Ok(config)
    }
}

/// Helper: load and validate configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    let config = AppConfig::load_file(config_path)?;
    config.validate()?;
    Ok(config)
}

/// Helper: build a signed-in store backed by the REST API
pub fn open_store(config: &AppConfig) -> Result<NotificationStore, AppError> {
    let user = config.user_id().ok_or_else(|| {
        AppError::session("No signed-in user; set session.user_id or NOTIHUB__SESSION__USER_ID")
    })?;
    let endpoint = Endpoint::new(&config.api, &config.session)?;
    let store = NotificationStore::new(
        Arc::new(HttpNotificationApi::new(endpoint)),
        config.locale.language,
        config.locale.base_language,
    );
    store.set_user(Some(user));
    Ok(store)
}
