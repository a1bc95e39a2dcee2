//! The phase controller.

use crate::script::{default_copy, DwellTimes};
use parallax_types::{ChallengePhase, Timestamp};

/// One phase announcement, queued once per transition for the presentation
/// surface to render. This is the only way the controller communicates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhaseChange {
    pub phase: ChallengePhase,
    pub title: String,
    pub instruction: String,
}

/// Tracks the current phase and the pending local timer.
///
/// `on_tick` is the timer entry point and `force` the remote one. A remote
/// transition replaces the pending deadline, so a timer callback scheduled
/// for the old deadline finds nothing due and does nothing.
pub struct PhaseController {
    dwell: DwellTimes,
    phase: ChallengePhase,
    deadline: Option<Timestamp>,
    pending_events: Vec<PhaseChange>,
}

impl PhaseController {
    /// Start the challenge in `baseline` with its dwell timer armed. The
    /// initial entry is announced like any other transition.
    pub fn new(dwell: DwellTimes, now: Timestamp) -> Self {
        let mut controller = Self {
            dwell,
            phase: ChallengePhase::Baseline,
            deadline: None,
            pending_events: Vec::new(),
        };
        controller.enter(ChallengePhase::Baseline, None, None, now, "local");
        controller
    }

    pub fn phase(&self) -> ChallengePhase {
        self.phase
    }

    /// When the next local transition is due, if any timer is pending.
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.deadline
    }

    /// Timer entry point. Advances along the local path when `now` has
    /// reached the pending deadline; otherwise does nothing, which is how
    /// stale timers cancelled by a remote override fall away.
    pub fn on_tick(&mut self, now: Timestamp) {
        let Some(deadline) = self.deadline else {
            return;
        };
        if now < deadline {
            return;
        }
        match next_local(self.phase) {
            Some(next) => self.enter(next, None, None, now, "timer"),
            None => self.deadline = None,
        }
    }

    /// Remote entry point. The server may set any phase at any time; it
    /// always wins over local timers. Terminal phases accept no further
    /// transitions.
    pub fn force(
        &mut self,
        phase: ChallengePhase,
        title: Option<String>,
        instruction: Option<String>,
        now: Timestamp,
    ) {
        if self.phase.is_terminal() {
            tracing::debug!(current = %self.phase, requested = %phase, "phase change after terminal ignored");
            return;
        }
        self.enter(phase, title, instruction, now, "remote");
    }

    /// Drain queued announcements in transition order.
    pub fn drain_events(&mut self) -> Vec<PhaseChange> {
        std::mem::take(&mut self.pending_events)
    }

    /// The single transition function both entry points funnel through.
    fn enter(
        &mut self,
        phase: ChallengePhase,
        title: Option<String>,
        instruction: Option<String>,
        now: Timestamp,
        origin: &'static str,
    ) {
        self.phase = phase;
        // Entering any phase cancels the previous timer; a fresh one is
        // armed only when the new phase has a dwell.
        self.deadline = self.dwell.for_phase(phase).map(|ms| now.plus_millis(ms));

        let (default_title, default_instruction) = default_copy(phase);
        self.pending_events.push(PhaseChange {
            phase,
            title: title.unwrap_or_else(|| default_title.to_owned()),
            instruction: instruction.unwrap_or_else(|| default_instruction.to_owned()),
        });
        tracing::debug!(phase = %phase, origin, "entered phase");
    }
}

/// The ordered local path. Analyzing and the terminal phases advance only
/// on remote messages.
fn next_local(phase: ChallengePhase) -> Option<ChallengePhase> {
    match phase {
        ChallengePhase::Baseline => Some(ChallengePhase::Pan),
        ChallengePhase::Pan => Some(ChallengePhase::Return),
        ChallengePhase::Return => Some(ChallengePhase::Analyzing),
        ChallengePhase::Analyzing | ChallengePhase::Complete | ChallengePhase::Failed => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: u64) -> Timestamp {
        Timestamp::new(ms)
    }

    fn controller() -> PhaseController {
        PhaseController::new(DwellTimes::default(), at(0))
    }

    fn phases(events: &[PhaseChange]) -> Vec<ChallengePhase> {
        events.iter().map(|e| e.phase).collect()
    }

    #[test]
    fn starts_in_baseline_and_announces_it() {
        let mut c = controller();
        assert_eq!(c.phase(), ChallengePhase::Baseline);
        assert_eq!(c.next_deadline(), Some(at(3_000)));
        let events = c.drain_events();
        assert_eq!(phases(&events), vec![ChallengePhase::Baseline]);
        assert_eq!(events[0].title, "Hold still");
        assert!(c.drain_events().is_empty());
    }

    #[test]
    fn local_path_walks_baseline_pan_return_analyzing() {
        let mut c = controller();
        c.drain_events();

        c.on_tick(at(3_000));
        assert_eq!(c.phase(), ChallengePhase::Pan);
        assert_eq!(c.next_deadline(), Some(at(7_000)));

        c.on_tick(at(7_000));
        assert_eq!(c.phase(), ChallengePhase::Return);
        assert_eq!(c.next_deadline(), Some(at(10_000)));

        c.on_tick(at(10_000));
        assert_eq!(c.phase(), ChallengePhase::Analyzing);
        // Analyzing waits for the server, forever if need be.
        assert_eq!(c.next_deadline(), None);

        c.on_tick(at(600_000));
        assert_eq!(c.phase(), ChallengePhase::Analyzing);

        assert_eq!(
            phases(&c.drain_events()),
            vec![
                ChallengePhase::Pan,
                ChallengePhase::Return,
                ChallengePhase::Analyzing,
            ]
        );
    }

    #[test]
    fn early_tick_does_nothing() {
        let mut c = controller();
        c.drain_events();
        c.on_tick(at(2_999));
        assert_eq!(c.phase(), ChallengePhase::Baseline);
        assert!(c.drain_events().is_empty());
    }

    #[test]
    fn remote_override_cancels_the_pending_timer() {
        let mut c = controller();
        c.drain_events();

        c.force(ChallengePhase::Analyzing, None, None, at(1_000));
        assert_eq!(c.phase(), ChallengePhase::Analyzing);
        assert_eq!(c.next_deadline(), None);

        // The timer armed for baseline would have fired at 3000. It finds
        // no deadline and must not transition.
        c.on_tick(at(3_000));
        assert_eq!(c.phase(), ChallengePhase::Analyzing);
        assert_eq!(phases(&c.drain_events()), vec![ChallengePhase::Analyzing]);
    }

    #[test]
    fn remote_override_arms_a_fresh_timer_for_dwell_phases() {
        let mut c = controller();
        c.drain_events();

        c.force(ChallengePhase::Return, None, None, at(500));
        assert_eq!(c.next_deadline(), Some(at(3_500)));

        c.on_tick(at(3_500));
        assert_eq!(c.phase(), ChallengePhase::Analyzing);
    }

    #[test]
    fn re_forcing_the_current_phase_restarts_its_timer() {
        let mut c = controller();
        c.drain_events();

        c.force(ChallengePhase::Baseline, None, None, at(2_000));
        assert_eq!(c.next_deadline(), Some(at(5_000)));

        c.on_tick(at(3_000));
        assert_eq!(c.phase(), ChallengePhase::Baseline);

        c.on_tick(at(5_000));
        assert_eq!(c.phase(), ChallengePhase::Pan);
    }

    #[test]
    fn server_copy_wins_and_missing_copy_falls_back() {
        let mut c = controller();
        c.drain_events();

        c.force(
            ChallengePhase::Pan,
            Some("Custom title".to_owned()),
            None,
            at(100),
        );
        let events = c.drain_events();
        assert_eq!(events[0].title, "Custom title");
        assert_eq!(events[0].instruction, "Sweep your device slowly to your right");
    }

    #[test]
    fn terminal_phases_accept_no_further_transitions() {
        let mut c = controller();
        c.drain_events();

        c.force(ChallengePhase::Complete, None, None, at(1_000));
        assert_eq!(c.phase(), ChallengePhase::Complete);
        assert_eq!(c.next_deadline(), None);

        c.force(ChallengePhase::Pan, None, None, at(1_500));
        c.on_tick(at(60_000));
        assert_eq!(c.phase(), ChallengePhase::Complete);
        assert_eq!(phases(&c.drain_events()), vec![ChallengePhase::Complete]);
    }

    #[test]
    fn one_announcement_per_transition() {
        let mut c = controller();
        c.on_tick(at(3_000));
        c.force(ChallengePhase::Analyzing, None, None, at(3_100));
        let events = c.drain_events();
        assert_eq!(
            phases(&events),
            vec![
                ChallengePhase::Baseline,
                ChallengePhase::Pan,
                ChallengePhase::Analyzing,
            ]
        );
    }
}
