//! The challenge phase state machine.
//!
//! Phase state has two mutators: local dwell timers and remote overrides
//! pushed by the server. Both funnel through one transition function on
//! [`PhaseController`], and the remote entry point always cancels whatever
//! local timer is pending, so the two authorities can never race.
//!
//! The controller is pure: it takes `now` as a parameter, never sleeps, and
//! communicates only by queueing [`PhaseChange`] announcements for the
//! caller to drain.

pub mod controller;
pub mod script;

pub use controller::{PhaseChange, PhaseController};
pub use script::{default_copy, DwellTimes};
