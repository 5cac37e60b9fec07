//! Live notification feed.

use std::future::Future;
use std::sync::Arc;

use clap::Args;
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;

use crate::output::{self, OutputFormat};
use notihub_client::{Endpoint, HttpEventSource, HttpNotificationApi};
use notihub_core::config::AppConfig;
use notihub_core::error::AppError;
use notihub_core::traits::notifier::NativeNotifier;
use notihub_realtime::NotificationEngine;
use notihub_realtime::bridge::notifier::{ConsoleNotifier, TracingNotifier};
use notihub_realtime::message::types::ContentChange;
use notihub_realtime::notification::{FeedbackLevel, StoreChange};
use notihub_realtime::stream::state::ConnectionState;
use notihub_realtime::toast::queue::{RemovalReason, ToastEvent};

/// Arguments for `watch`
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Do not mirror notifications to the native surface
    #[arg(long)]
    pub no_native: bool,

    /// Also print content-change events
    #[arg(long)]
    pub changes: bool,
}

/// One line of `watch` output
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum WatchLine<'a> {
    Toast {
        queue_id: &'a str,
        id: &'a str,
        title: &'a str,
        message: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        action_url: Option<&'a str>,
    },
    ToastRemoved {
        queue_id: &'a str,
        reason: RemovalReason,
    },
    Feedback {
        success: bool,
        message: &'a str,
    },
    Change(&'a ContentChange),
    Connection {
        state: ConnectionState,
    },
}

/// Execute `watch`
pub async fn execute(args: &WatchArgs, mut config: AppConfig, format: OutputFormat) -> Result<(), AppError> {
    if config.user_id().is_none() {
        return Err(AppError::session(
            "No signed-in user; set session.user_id or NOTIHUB__SESSION__USER_ID",
        ));
    }
    if args.no_native {
        config.native.enabled = false;
    }

    let endpoint = Endpoint::new(&config.api, &config.session)?;
    let notifier: Arc<dyn NativeNotifier> = match format {
        OutputFormat::Table => Arc::new(ConsoleNotifier::new(config.native.permission)),
        OutputFormat::Json => Arc::new(TracingNotifier),
    };
    let engine = NotificationEngine::new(
        config,
        Arc::new(HttpNotificationApi::new(endpoint.clone())),
        Arc::new(HttpEventSource::new(endpoint)),
        notifier,
    );

    let feeds = Feeds::subscribe(&engine);
    engine.start().await?;
    if format == OutputFormat::Table {
        let unread = engine.store().unread_count();
        output::print_success(&format!("Watching notifications ({} unread). Press Ctrl-C to stop.", unread));
    }

    feeds.follow(args.changes, format, ctrl_c()).await;

    engine.shutdown().await;
    if format == OutputFormat::Table {
        output::print_success("Stopped");
    }
    Ok(())
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Engine channels printed by `watch`, subscribed before the engine starts.
struct Feeds {
    toasts: broadcast::Receiver<ToastEvent>,
    changes: broadcast::Receiver<StoreChange>,
    content: broadcast::Receiver<ContentChange>,
    connection: watch::Receiver<ConnectionState>,
}

impl Feeds {
    fn subscribe(engine: &NotificationEngine) -> Self {
        Self {
            toasts: engine.toasts().subscribe(),
            changes: engine.store().subscribe(),
            content: engine.feed().subscribe_all(),
            connection: engine.connection_state(),
        }
    }

    /// Print events until `shutdown` completes or a channel closes.
    async fn follow<S>(mut self, show_changes: bool, format: OutputFormat, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                event = self.toasts.recv() => match event {
                    Ok(ToastEvent::Shown(toast)) => {
                        let n = &toast.notification;
                        emit(format, &WatchLine::Toast {
                            queue_id: &toast.queue_id,
                            id: n.id.as_str(),
                            title: &n.localized.title,
                            message: &n.localized.message,
                            action_url: n.action_url.as_deref(),
                        });
                    }
                    Ok(ToastEvent::Removed { queue_id, reason }) => {
                        emit(format, &WatchLine::ToastRemoved { queue_id: &queue_id, reason });
                    }
                    Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "Toast events lagged"),
                    Err(RecvError::Closed) => break,
                },
                change = self.changes.recv() => match change {
                    Ok(StoreChange::Feedback(feedback)) => {
                        emit(format, &WatchLine::Feedback {
                            success: feedback.level == FeedbackLevel::Success,
                            message: &feedback.message,
                        });
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "Store changes lagged"),
                    Err(RecvError::Closed) => break,
                },
                change = self.content.recv(), if show_changes => match change {
                    Ok(change) => emit(format, &WatchLine::Change(&change)),
                    Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "Content changes lagged"),
                    Err(RecvError::Closed) => break,
                },
                changed = self.connection.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = *self.connection.borrow_and_update();
                    emit(format, &WatchLine::Connection { state });
                }
            }
        }
    }
}

fn emit(format: OutputFormat, line: &WatchLine<'_>) {
    match format {
        OutputFormat::Json => output::print_json_line(line),
        OutputFormat::Table => match line {
            WatchLine::Toast {
                id,
                title,
                message,
                action_url,
                ..
            } => {
                println!("┌ {} [{}]", title, id);
                println!("│ {}", message);
                if let Some(url) = action_url {
                    println!("│ → {}", url);
                }
                println!("└");
            }
            WatchLine::ToastRemoved { queue_id, reason } => {
                tracing::debug!(queue_id, ?reason, "Toast removed");
            }
            WatchLine::Feedback { success: true, message } => output::print_success(message),
            WatchLine::Feedback { success: false, message } => output::print_error(message),
            WatchLine::Change(change) => output::print_kv(
                &change.collection,
                &format!(
                    "{} {}",
                    change.operation.as_deref().unwrap_or("change"),
                    change.document_id.as_deref().unwrap_or("")
                ),
            ),
            WatchLine::Connection { state } => match state {
                ConnectionState::Connected => output::print_success("Connected"),
                ConnectionState::RetryScheduled => output::print_warning("Connection lost; retrying"),
                ConnectionState::Connecting | ConnectionState::Disconnected => {
                    tracing::debug!(?state, "Connection state")
                }
            },
        },
    }
}
