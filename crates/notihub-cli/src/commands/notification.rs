//! Notification list and mutation commands.

use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use notihub_core::config::AppConfig;
use notihub_core::error::AppError;
use notihub_core::locale::{FeedbackMessage, relative_time};
use notihub_core::types::{Language, Notification, NotificationId};
use notihub_realtime::NotificationStore;
use notihub_realtime::notification::MutationOutcome;

/// Arguments for `list`
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only show unread notifications
    #[arg(short, long)]
    pub unread: bool,
}

/// Arguments for `read`
#[derive(Debug, Args)]
pub struct ReadArgs {
    /// Notification ID
    pub id: String,
}

/// Arguments for `delete`
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Notification ID
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Notification display row for table output
#[derive(Debug, Serialize, Tabled)]
pub(crate) struct NotificationRow {
    /// Unread marker
    #[tabled(rename = "")]
    #[serde(skip)]
    marker: &'static str,
    /// Notification ID
    id: String,
    /// Kind glyph
    #[tabled(rename = "kind")]
    kind: String,
    /// Title in the display language
    title: String,
    /// Body in the display language
    message: String,
    /// Relative creation time
    received: String,
    /// Read flag
    #[tabled(skip)]
    is_read: bool,
    /// Navigation target
    #[tabled(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    action_url: Option<String>,
}

impl NotificationRow {
    pub(crate) fn new(record: &Notification, now: DateTime<Utc>, language: Language) -> Self {
        Self {
            marker: if record.is_read { "" } else { "●" },
            id: record.id.to_string(),
            kind: record.kind.glyph().to_string(),
            title: record.localized.title.clone(),
            message: record.localized.message.clone(),
            received: relative_time(record.created_at, now, language),
            is_read: record.is_read,
            action_url: record.action_url.clone(),
        }
    }
}

/// Execute `list`
pub async fn list(args: &ListArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let store = super::open_store(config)?;
    store.fetch_all().await?;

    let state = store.snapshot();
    let language = store.language();
    let now = Utc::now();
    let rows: Vec<NotificationRow> = state
        .notifications()
        .iter()
        .filter(|n| !args.unread || !n.is_read)
        .map(|n| NotificationRow::new(n, now, language))
        .collect();

    output::print_list(&rows, format, "No notifications.");
    if format == OutputFormat::Table {
        output::print_kv("Unread", &state.unread_count().to_string());
    }
    Ok(())
}

/// Execute `read`
pub async fn read(args: &ReadArgs, config: &AppConfig) -> Result<(), AppError> {
    let store = super::open_store(config)?;
    let id = load_target(&store, &args.id).await?;

    match store.get(&id) {
        Some(record) if record.is_read => {
            output::print_warning(&format!("Notification '{}' is already read", id));
            Ok(())
        }
        _ => finish(
            store.mark_as_read(&id).await,
            &format!("Notification '{}' marked as read", id),
            FeedbackMessage::MarkReadFailed,
            &store,
        ),
    }
}

/// Execute `read-all`
pub async fn read_all(config: &AppConfig) -> Result<(), AppError> {
    let store = super::open_store(config)?;
    store.fetch_all().await?;

    let unread = store.unread_count();
    if unread == 0 {
        output::print_warning("No unread notifications");
        return Ok(());
    }

    finish(
        store.mark_all_as_read().await,
        &format!("{} notification(s) marked as read", unread),
        FeedbackMessage::MarkAllReadFailed,
        &store,
    )
}

/// Execute `delete`
pub async fn delete(args: &DeleteArgs, config: &AppConfig) -> Result<(), AppError> {
    let store = super::open_store(config)?;
    let id = load_target(&store, &args.id).await?;

    if !args.yes {
        let title = store
            .get(&id)
            .map(|n| n.localized.title)
            .unwrap_or_default();
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Delete notification '{}' ({})?", title, id))
            .default(false)
            .interact()
            .map_err(|e| AppError::internal(format!("Input error: {}", e)))?;
        if !confirmed {
            output::print_warning("Cancelled");
            return Ok(());
        }
    }

    finish(
        store.delete(&id).await,
        FeedbackMessage::Deleted.text(store.language()),
        FeedbackMessage::DeleteFailed,
        &store,
    )
}

/// Fetch the list and resolve `raw` to a held notification.
async fn load_target(store: &NotificationStore, raw: &str) -> Result<NotificationId, AppError> {
    let id: NotificationId = raw.parse()?;
    store.fetch_all().await?;
    if store.get(&id).is_none() {
        return Err(AppError::not_found(format!("Notification '{}' not found", id)));
    }
    Ok(id)
}

/// Report a mutation outcome.
fn finish(
    outcome: MutationOutcome,
    success: &str,
    failure: FeedbackMessage,
    store: &NotificationStore,
) -> Result<(), AppError> {
    match outcome {
        MutationOutcome::Applied => {
            output::print_success(success);
            Ok(())
        }
        MutationOutcome::NoOp => {
            output::print_warning("Nothing to change");
            Ok(())
        }
        MutationOutcome::Skipped => Err(AppError::session("No signed-in user")),
        MutationOutcome::RolledBack(err) => {
            let message = err
                .server_reason()
                .unwrap_or_else(|| failure.text(store.language()));
            output::print_error(message);
            Err(err)
        }
    }
}
