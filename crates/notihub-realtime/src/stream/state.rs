//! Connection lifecycle state machine.
//!
//! Every connection attempt belongs to a generation. `Connect` and `Stop`
//! start a new generation, so events reported by a superseded task no
//! longer match and fall through to [`ConnectionAction::Ignore`].

use std::time::Duration;

use serde::Serialize;

/// Observable connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No connection and nothing scheduled.
    #[default]
    Disconnected,
    /// A connection is being opened.
    Connecting,
    /// The stream is open and being read.
    Connected,
    /// The last attempt failed; a reconnect is pending.
    RetryScheduled,
}

/// Input to [`ConnectionMachine::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// Caller asked for a (re)connection.
    Connect,
    /// The transport opened for `generation`.
    Opened { generation: u64 },
    /// The transport failed or ended for `generation`.
    Failed { generation: u64 },
    /// The reconnect delay of `generation` elapsed.
    RetryElapsed { generation: u64 },
    /// Caller asked for teardown.
    Stop,
}

/// What the driver must do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionAction {
    /// Open a connection; nothing was running.
    Open { generation: u64 },
    /// Tear down the running connection or retry, then open a new one.
    Reopen { generation: u64 },
    /// Keep reading the freshly opened stream.
    Read,
    /// Close the failed transport and retry once after `delay`.
    ScheduleRetry { generation: u64, delay: Duration },
    /// Close everything; no further attempts.
    Teardown,
    /// The event is stale or does not apply in the current state.
    Ignore,
}

/// Fixed-delay reconnect state machine.
#[derive(Debug, Clone)]
pub struct ConnectionMachine {
    state: ConnectionState,
    generation: u64,
    retry_delay: Duration,
}

impl ConnectionMachine {
    /// Create a disconnected machine retrying after `retry_delay`.
    pub fn new(retry_delay: Duration) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            generation: 0,
            retry_delay,
        }
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Apply one event and return the action to perform.
    pub fn apply(&mut self, event: ConnectionEvent) -> ConnectionAction {
        use ConnectionState::*;

        match event {
            ConnectionEvent::Connect => {
                let was = self.state;
                self.generation += 1;
                self.state = Connecting;
                if was == Disconnected {
                    ConnectionAction::Open {
                        generation: self.generation,
                    }
                } else {
                    ConnectionAction::Reopen {
                        generation: self.generation,
                    }
                }
            }
            ConnectionEvent::Opened { generation }
                if generation == self.generation && self.state == Connecting =>
            {
                self.state = Connected;
                ConnectionAction::Read
            }
            ConnectionEvent::Failed { generation }
                if generation == self.generation
                    && matches!(self.state, Connecting | Connected) =>
            {
                self.state = RetryScheduled;
                ConnectionAction::ScheduleRetry {
                    generation,
                    delay: self.retry_delay,
                }
            }
            ConnectionEvent::RetryElapsed { generation }
                if generation == self.generation && self.state == RetryScheduled =>
            {
                self.state = Connecting;
                ConnectionAction::Open { generation }
            }
            ConnectionEvent::Stop if self.state != Disconnected => {
                self.generation += 1;
                self.state = Disconnected;
                ConnectionAction::Teardown
            }
            _ => ConnectionAction::Ignore,
        }
    }
}
