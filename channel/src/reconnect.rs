//! Reconnect scheduling for the realtime link.
//!
//! The machine is pure: the driver feeds it socket events plus the current
//! time and asks when (or whether) to dial again. Scheduling lives in the
//! state itself, so two close events observed back to back cannot arm two
//! timers. Once closed, the machine never schedules another attempt.

use parallax_types::Timestamp;

/// Fixed delay between losing the transport and the next dial, in
/// milliseconds.
pub const RECONNECT_DELAY_MS: u64 = 5_000;

/// Lifecycle of the underlying transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkState {
    /// No transport yet and none scheduled.
    Idle,
    /// A dial is in flight.
    Connecting,
    /// The transport is up.
    Open,
    /// The transport is down and one dial is scheduled for `due_at`.
    ReconnectPending { due_at: Timestamp },
    /// Shut down for good. No further dials.
    Closed,
}

#[derive(Debug)]
pub struct ReconnectPolicy {
    delay_ms: u64,
    state: LinkState,
    attempts: u32,
}

impl ReconnectPolicy {
    pub fn new(delay_ms: u64) -> Self {
        ReconnectPolicy {
            delay_ms,
            state: LinkState::Idle,
            attempts: 0,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Number of dials started after the first one.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_closed(&self) -> bool {
        self.state == LinkState::Closed
    }

    /// A dial is starting. Counts every dial after the initial one as a
    /// reconnect attempt.
    pub fn on_connect_started(&mut self) {
        if self.state == LinkState::Closed {
            return;
        }
        if !matches!(self.state, LinkState::Idle) {
            self.attempts += 1;
        }
        self.state = LinkState::Connecting;
    }

    /// The dial succeeded.
    pub fn on_open(&mut self) {
        if self.state == LinkState::Closed {
            return;
        }
        self.state = LinkState::Open;
    }

    /// The transport dropped without a local close. Returns the scheduled
    /// dial time if this event armed the timer; `None` when an attempt was
    /// already pending or the link is closed.
    pub fn on_unexpected_close(&mut self, now: Timestamp) -> Option<Timestamp> {
        match self.state {
            LinkState::Open | LinkState::Connecting | LinkState::Idle => Some(self.schedule(now)),
            LinkState::ReconnectPending { .. } | LinkState::Closed => None,
        }
    }

    /// The dial failed. Schedules the next one unless the link is closed.
    pub fn on_connect_failed(&mut self, now: Timestamp) -> Option<Timestamp> {
        match self.state {
            LinkState::Closed => None,
            LinkState::ReconnectPending { .. } => None,
            _ => Some(self.schedule(now)),
        }
    }

    /// Whether the pending dial is due.
    pub fn due(&self, now: Timestamp) -> bool {
        match self.state {
            LinkState::ReconnectPending { due_at } => now >= due_at,
            _ => false,
        }
    }

    /// Shut down for good. Terminal on every path, including while a dial
    /// is pending.
    pub fn close(&mut self) {
        self.state = LinkState::Closed;
    }

    fn schedule(&mut self, now: Timestamp) -> Timestamp {
        let due_at = now.plus_millis(self.delay_ms);
        self.state = LinkState::ReconnectPending { due_at };
        due_at
    }
}
