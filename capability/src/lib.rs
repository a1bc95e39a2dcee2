//! Device eligibility and permission negotiation.
//!
//! Eligibility runs in two stages. The baseline stage is passive: it reads
//! the device profile and applies a rule table without prompting the user
//! for anything, so ineligible devices are turned away before any
//! permission dialog appears. The permission stage actively prompts for
//! camera and motion access; a refusal produces a report, never an error,
//! and re-running the stage always re-prompts because the user may have
//! changed OS-level settings in between.

pub mod checker;
pub mod platform;
pub mod report;

pub use checker::{check_baseline, check_with_permissions};
pub use platform::{DevicePlatform, Grant};
pub use report::{Blocker, CompatibilityReport};
