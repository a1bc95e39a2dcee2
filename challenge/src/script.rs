//! Dwell durations and built-in copy for each phase.

use parallax_types::ChallengePhase;
use serde::{Deserialize, Serialize};

/// How long each timer-driven phase holds before the local path advances,
/// in milliseconds. `analyzing` has no dwell on purpose: it waits for the
/// server's terminal message, however long that takes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DwellTimes {
    pub baseline_ms: u64,
    pub pan_ms: u64,
    pub return_ms: u64,
}

impl Default for DwellTimes {
    fn default() -> Self {
        Self {
            baseline_ms: 3_000,
            pan_ms: 4_000,
            return_ms: 3_000,
        }
    }
}

impl DwellTimes {
    /// Dwell for `phase`, or `None` for phases that only leave on a remote
    /// message.
    pub fn for_phase(&self, phase: ChallengePhase) -> Option<u64> {
        match phase {
            ChallengePhase::Baseline => Some(self.baseline_ms),
            ChallengePhase::Pan => Some(self.pan_ms),
            ChallengePhase::Return => Some(self.return_ms),
            ChallengePhase::Analyzing | ChallengePhase::Complete | ChallengePhase::Failed => None,
        }
    }
}

/// Built-in title and instruction for a phase, used whenever the server
/// sends a phase change without its own copy.
pub fn default_copy(phase: ChallengePhase) -> (&'static str, &'static str) {
    match phase {
        ChallengePhase::Baseline => ("Hold still", "Hold your device steady at eye level"),
        ChallengePhase::Pan => ("Pan slowly", "Sweep your device slowly to your right"),
        ChallengePhase::Return => ("Come back", "Bring your device back to where it started"),
        ChallengePhase::Analyzing => ("Analyzing", "Hold on while your capture is verified"),
        ChallengePhase::Complete => ("Done", "Verification is complete"),
        ChallengePhase::Failed => ("Verification failed", "This session could not be verified"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_scripted_phases_have_dwells() {
        let dwell = DwellTimes::default();
        assert_eq!(dwell.for_phase(ChallengePhase::Baseline), Some(3_000));
        assert_eq!(dwell.for_phase(ChallengePhase::Pan), Some(4_000));
        assert_eq!(dwell.for_phase(ChallengePhase::Return), Some(3_000));
        assert_eq!(dwell.for_phase(ChallengePhase::Analyzing), None);
        assert_eq!(dwell.for_phase(ChallengePhase::Complete), None);
        assert_eq!(dwell.for_phase(ChallengePhase::Failed), None);
    }

    #[test]
    fn every_phase_has_copy() {
        for phase in [
            ChallengePhase::Baseline,
            ChallengePhase::Pan,
            ChallengePhase::Return,
            ChallengePhase::Analyzing,
            ChallengePhase::Complete,
            ChallengePhase::Failed,
        ] {
            let (title, instruction) = default_copy(phase);
            assert!(!title.is_empty());
            assert!(!instruction.is_empty());
        }
    }
}
