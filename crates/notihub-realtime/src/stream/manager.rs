//! Single-connection event stream manager with fixed-delay reconnect.

use std::io;
use std::sync::{Arc, Mutex};

use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::codec::FramedRead;
use tokio_util::io::StreamReader;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use notihub_core::config::StreamConfig;
use notihub_core::result::AppResult;
use notihub_core::traits::stream::{ByteStream, EventSource};

use super::codec::{SseCodec, SseFrame};
use super::state::{ConnectionAction, ConnectionEvent, ConnectionMachine, ConnectionState};
use crate::message::serializer::decode_message;
use crate::message::types::StreamMessage;

/// Receives decoded messages, in delivery order, from the connection task.
pub trait StreamHandler: Send + Sync + 'static {
    /// Handle one message. Must not block.
    fn handle(&self, message: StreamMessage);
}

/// State shared between the manager and its connection task.
struct Shared {
    name: String,
    path: String,
    max_line_bytes: usize,
    source: Arc<dyn EventSource>,
    handler: Arc<dyn StreamHandler>,
    machine: Mutex<ConnectionMachine>,
    state_tx: watch::Sender<ConnectionState>,
}

impl Shared {
    fn transition(&self, event: ConnectionEvent) -> ConnectionAction {
        let mut machine = self.machine.lock().unwrap_or_else(|e| e.into_inner());
        let action = machine.apply(event);
        self.state_tx.send_replace(machine.state());
        action
    }

    fn dispatch(&self, frame: SseFrame) {
        if frame.data.trim().is_empty() {
            return;
        }
        match decode_message(&frame.data) {
            Ok(StreamMessage::Unknown) => {
                debug!(stream = %self.name, event = ?frame.event, "Ignoring unhandled message type");
            }
            Ok(message) => self.handler.handle(message),
            Err(e) => {
                warn!(stream = %self.name, error = %e, "Skipping malformed stream message");
            }
        }
    }
}

/// The running connection task.
struct Running {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owns at most one live event stream connection.
///
/// [`connect`](Self::connect) tears down the previous connection (and any
/// pending retry) before the new one opens. The new task waits for the old
/// one to exit, so two transports are never open at the same time.
pub struct StreamManager {
    shared: Arc<Shared>,
    running: Mutex<Option<Running>>,
}

impl std::fmt::Debug for StreamManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamManager")
            .field("name", &self.shared.name)
            .field("path", &self.shared.path)
            .field("state", &self.state())
            .finish()
    }
}

impl StreamManager {
    /// Create a manager for the stream described by `config`.
    ///
    /// `name` only labels log lines; several managers may share a source.
    pub fn new(
        name: impl Into<String>,
        source: Arc<dyn EventSource>,
        handler: Arc<dyn StreamHandler>,
        config: &StreamConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            shared: Arc::new(Shared {
                name: name.into(),
                path: config.path.clone(),
                max_line_bytes: config.max_line_bytes,
                source,
                handler,
                machine: Mutex::new(ConnectionMachine::new(config.reconnect_delay())),
                state_tx,
            }),
            running: Mutex::new(None),
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.shared.state_tx.borrow()
    }

    /// Watch connection state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state_tx.subscribe()
    }

    /// Open the stream, replacing any existing connection.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect(&self) {
        // Held across the transition so tasks are spawned in generation order.
        let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        let generation = match self.shared.transition(ConnectionEvent::Connect) {
            ConnectionAction::Open { generation } | ConnectionAction::Reopen { generation } => {
                generation
            }
            _ => return,
        };

        let previous = running.take().map(|prev| {
            prev.cancel.cancel();
            prev.handle
        });

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_connection(
            self.shared.clone(),
            generation,
            cancel.clone(),
            previous,
        ));
        *running = Some(Running { cancel, handle });
    }

    /// Close the live connection and cancel any pending retry.
    pub fn disconnect(&self) {
        let running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        if self.shared.transition(ConnectionEvent::Stop) == ConnectionAction::Teardown {
            info!(stream = %self.shared.name, "Event stream stopped");
        }
        if let Some(running) = running.as_ref() {
            running.cancel.cancel();
        }
    }

    /// Disconnect and wait for the connection task to exit.
    pub async fn shutdown(&self) {
        self.disconnect();
        let running = self.running.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(running) = running {
            if let Err(e) = running.handle.await {
                warn!(stream = %self.shared.name, error = %e, "Connection task ended abnormally");
            }
        }
    }
}

impl Drop for StreamManager {
    fn drop(&mut self) {
        let running = self.running.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(running) = running.as_ref() {
            running.cancel.cancel();
        }
    }
}

async fn run_connection(
    shared: Arc<Shared>,
    generation: u64,
    cancel: CancellationToken,
    previous: Option<JoinHandle<()>>,
) {
    if let Some(previous) = previous {
        let _ = previous.await;
    }

    loop {
        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            opened = shared.source.open(&shared.path) => opened,
        };

        match opened {
            Ok(stream) => {
                if shared.transition(ConnectionEvent::Opened { generation }) != ConnectionAction::Read {
                    break;
                }
                info!(stream = %shared.name, generation, "Event stream connected");

                let outcome = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    outcome = pump(&shared, stream) => outcome,
                };
                match outcome {
                    Ok(()) => info!(stream = %shared.name, "Event stream ended by server"),
                    Err(e) => warn!(stream = %shared.name, error = %e, "Event stream failed"),
                }
            }
            Err(e) => {
                warn!(stream = %shared.name, error = %e, "Failed to open event stream");
            }
        }

        let delay = match shared.transition(ConnectionEvent::Failed { generation }) {
            ConnectionAction::ScheduleRetry { delay, .. } => delay,
            _ => break,
        };
        debug!(stream = %shared.name, delay_ms = delay.as_millis() as u64, "Reconnect scheduled");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }

        if !matches!(
            shared.transition(ConnectionEvent::RetryElapsed { generation }),
            ConnectionAction::Open { .. }
        ) {
            break;
        }
    }

    debug!(stream = %shared.name, generation, "Connection task exited");
}

/// Read frames until the transport ends or fails.
async fn pump(shared: &Shared, stream: ByteStream) -> AppResult<()> {
    let reader = StreamReader::new(stream.map(|chunk| chunk.map_err(io::Error::other)));
    let mut frames = FramedRead::new(reader, SseCodec::new(shared.max_line_bytes));

    while let Some(frame) = frames.next().await {
        shared.dispatch(frame?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::test_support::{MockEventSource, RecordingHandler, Script, notification_frame};

    fn config(delay_ms: u64) -> StreamConfig {
        StreamConfig {
            reconnect_delay_ms: delay_ms,
            ..StreamConfig::default()
        }
    }

    fn manager(source: &Arc<MockEventSource>, handler: &Arc<RecordingHandler>) -> StreamManager {
        StreamManager::new("test", source.clone(), handler.clone(), &config(2000))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_connects_leave_the_latest_connection_running() {
        let source = Arc::new(MockEventSource::new(vec![]));
        let handler = Arc::new(RecordingHandler::default());
        let manager = Arc::new(manager(&source, &handler));

        let callers: Vec<_> = (0..8)
            .map(|_| {
                let manager = manager.clone();
                tokio::spawn(async move {
                    for _ in 0..25 {
                        manager.connect();
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();
        for caller in callers {
            caller.await.unwrap();
        }

        tokio::time::timeout(Duration::from_secs(5), async {
            while manager.state() != ConnectionState::Connected || source.live() != 1 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("latest connection never opened");

        assert_eq!(source.max_live(), 1);
        manager.shutdown().await;
        assert_eq!(source.live(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_error_schedules_exactly_one_reconnect_after_delay() {
        let source = Arc::new(MockEventSource::new(vec![Script::Fail, Script::Hold(vec![])]));
        let handler = Arc::new(RecordingHandler::default());
        let manager = manager(&source, &handler);

        manager.connect();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(source.opens(), 1);
        assert_eq!(manager.state(), ConnectionState::RetryScheduled);

        tokio::time::sleep(Duration::from_millis(1980)).await;
        assert_eq!(source.opens(), 1);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(source.opens(), 2);
        assert_eq!(manager.state(), ConnectionState::Connected);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(source.opens(), 2);
        assert_eq!(source.live(), 1);
        assert_eq!(source.max_live(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn connect_twice_keeps_one_live_connection() {
        let source = Arc::new(MockEventSource::new(vec![
            Script::Hold(vec![]),
            Script::Hold(vec![]),
        ]));
        let handler = Arc::new(RecordingHandler::default());
        let manager = manager(&source, &handler);

        manager.connect();
        manager.connect();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(source.live(), 1);
        assert_eq!(source.max_live(), 1);
        assert_eq!(manager.state(), ConnectionState::Connected);

        manager.connect();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(source.live(), 1);
        assert_eq!(source.max_live(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_message_does_not_end_the_stream() {
        let source = Arc::new(MockEventSource::new(vec![Script::Hold(vec![
            "data: {broken\n\n".to_string(),
            notification_frame("a", false),
            "data: {\"type\":\"typing\"}\n\n".to_string(),
            notification_frame("b", false),
        ])]));
        let handler = Arc::new(RecordingHandler::default());
        let manager = manager(&source, &handler);

        manager.connect();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let ids = handler.notification_ids();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(source.opens(), 1);
        assert_eq!(manager.state(), ConnectionState::Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn server_ending_the_stream_reconnects() {
        let source = Arc::new(MockEventSource::new(vec![
            Script::Emit(vec![notification_frame("a", false)]),
            Script::Hold(vec![notification_frame("b", false)]),
        ]));
        let handler = Arc::new(RecordingHandler::default());
        let manager = manager(&source, &handler);

        manager.connect();
        tokio::time::sleep(Duration::from_millis(2100)).await;

        assert_eq!(source.opens(), 2);
        assert_eq!(handler.notification_ids(), vec!["a", "b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_cancels_pending_retry() {
        let source = Arc::new(MockEventSource::new(vec![Script::Fail]));
        let handler = Arc::new(RecordingHandler::default());
        let manager = manager(&source, &handler);

        manager.connect();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(manager.state(), ConnectionState::RetryScheduled);

        manager.shutdown().await;
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(source.opens(), 1);
        assert_eq!(source.live(), 0);
        assert_eq!(manager.state(), ConnectionState::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_closes_live_connection() {
        let source = Arc::new(MockEventSource::new(vec![Script::Hold(vec![])]));
        let handler = Arc::new(RecordingHandler::default());
        let manager = manager(&source, &handler);
        let mut states = manager.subscribe_state();

        manager.connect();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(source.live(), 1);
        assert!(states.has_changed().unwrap());
        assert_eq!(*states.borrow_and_update(), ConnectionState::Connected);

        manager.shutdown().await;
        assert_eq!(source.live(), 0);
        assert_eq!(*states.borrow_and_update(), ConnectionState::Disconnected);
    }
}
