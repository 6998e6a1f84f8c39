//! The game session state machine.
//!
//! A session is one participant's run at the timed game. It tracks:
//! - WHERE things are (original, start, and target locations)
//! - HOW MUCH time is left (`remaining_secs`)
//! - WHAT was taken away for the duration (revoked capabilities)
//! - WHETHER it is still running (`status`)
//!
//! The session itself never talks to the outside world. It answers two
//! questions for the [`GameManager`](crate::GameManager): "what happened on
//! this tick?" ([`GameSession::tick`]) and "may I end you?"
//! ([`GameSession::conclude`]). The second one is the terminal guard: it
//! says yes exactly once.

use std::collections::BTreeSet;

use wayforge_protocol::{Location, ParticipantId};
use wayforge_tick::TimerHandle;

use crate::SessionMarker;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndCause {
    /// The participant reached the target. Rewards are dispatched.
    Success,
    /// The countdown hit zero.
    Timeout,
    /// The participant or an administrator ended it.
    ManualEnd,
    /// The participant left the server (or was found offline on a tick).
    Disconnect,
    /// The engine is stopping; sessions are torn down silently so
    /// capabilities are not left revoked.
    Shutdown,
}

/// The lifecycle state of a session.
///
/// ```text
///   Active ──(success | timeout | manual end | disconnect)──→ Ended
/// ```
///
/// `Ended` is terminal: nothing moves a session back to `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Ended(EndCause),
}

/// Result of one countdown step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickVerdict {
    /// The session had already ended; nothing changed.
    Inactive,
    /// The participant is within the target radius.
    Reached,
    /// Time ran out.
    TimedOut,
    /// Still going. `warning` is set when a warning threshold was hit.
    Continue { warning: Option<u32> },
}

/// Everything the manager must release after the terminal transition.
///
/// Returned by [`GameSession::conclude`] exactly once per session.
#[derive(Debug)]
pub struct Teardown {
    pub cause: EndCause,
    pub timer: Option<TimerHandle>,
    pub capabilities: Vec<String>,
    pub remaining_secs: u32,
}

// ---------------------------------------------------------------------------
// GameSession
// ---------------------------------------------------------------------------

/// One participant's running game.
#[derive(Debug)]
pub struct GameSession {
    participant: ParticipantId,
    original_location: Location,
    start_location: Location,
    target_location: Location,
    time_limit_secs: u32,
    remaining_secs: u32,
    status: SessionStatus,
    revoked: BTreeSet<String>,
    timer: Option<TimerHandle>,
}

impl GameSession {
    pub fn new(
        participant: ParticipantId,
        original_location: Location,
        start_location: Location,
        target_location: Location,
        time_limit_secs: u32,
    ) -> Self {
        Self {
            participant,
            original_location,
            start_location,
            target_location,
            time_limit_secs,
            remaining_secs: time_limit_secs,
            status: SessionStatus::Active,
            revoked: BTreeSet::new(),
            timer: None,
        }
    }

    pub fn participant(&self) -> ParticipantId {
        self.participant
    }

    /// Where the participant stood before the game moved them.
    pub fn original_location(&self) -> &Location {
        &self.original_location
    }

    pub fn start_location(&self) -> &Location {
        &self.start_location
    }

    pub fn target_location(&self) -> &Location {
        &self.target_location
    }

    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, SessionStatus::Active)
    }

    /// Capabilities currently held back from the participant.
    pub fn revoked_capabilities(&self) -> impl Iterator<Item = &str> {
        self.revoked.iter().map(String::as_str)
    }

    /// Records a capability that was revoked at start and must be given
    /// back at the end.
    pub fn record_revoked(&mut self, name: impl Into<String>) {
        self.revoked.insert(name.into());
    }

    /// Hands the session ownership of its repeating tick timer.
    pub fn attach_timer(&mut self, handle: TimerHandle) {
        self.timer = Some(handle);
    }

    pub fn timer(&self) -> Option<TimerHandle> {
        self.timer
    }

    /// Runs one countdown step.
    ///
    /// Order matters: the clock is decremented first, then the win check
    /// runs, then the timeout check. A participant who arrives on the same
    /// tick the clock hits zero wins. `distance` is `None` when the
    /// participant is in another world, which never counts as reached.
    pub fn tick(&mut self, distance: Option<f64>, radius: f64, warnings: &[u32]) -> TickVerdict {
        if !self.is_active() {
            return TickVerdict::Inactive;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);

        if distance.is_some_and(|d| d <= radius) {
            return TickVerdict::Reached;
        }
        if self.remaining_secs == 0 {
            return TickVerdict::TimedOut;
        }

        let warning = warnings
            .contains(&self.remaining_secs)
            .then_some(self.remaining_secs);
        TickVerdict::Continue { warning }
    }

    /// Performs the terminal transition.
    ///
    /// Returns `Some(Teardown)` the first time and `None` on every later
    /// call, whatever the cause. Draining the revoked set and taking the
    /// timer here means a second caller has nothing left to release.
    pub fn conclude(&mut self, cause: EndCause) -> Option<Teardown> {
        if !self.is_active() {
            return None;
        }
        self.status = SessionStatus::Ended(cause);
        Some(Teardown {
            cause,
            timer: self.timer.take(),
            capabilities: std::mem::take(&mut self.revoked).into_iter().collect(),
            remaining_secs: self.remaining_secs,
        })
    }

    /// Snapshot for the crash-recovery marker.
    pub fn marker(&self) -> SessionMarker {
        SessionMarker {
            active: self.is_active(),
            target: self.target_location.clone(),
            remaining_secs: self.remaining_secs,
            ended: !self.is_active(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the session state machine in isolation: no registry,
    //! no services, just ticks and the terminal guard.

    use super::*;

    const RADIUS: f64 = 5.0;
    const WARNINGS: &[u32] = &[60, 30, 10];

    fn session(limit: u32) -> GameSession {
        GameSession::new(
            ParticipantId(1),
            Location::new("world", 0.0, 64.0, 0.0),
            Location::block_centre("world", 700, 64, 100),
            Location::block_centre("world", 100, 70, 100),
            limit,
        )
    }

    #[test]
    fn test_tick_far_away_counts_down() {
        let mut s = session(300);

        let verdict = s.tick(Some(600.0), RADIUS, WARNINGS);

        assert_eq!(verdict, TickVerdict::Continue { warning: None });
        assert_eq!(s.remaining_secs(), 299);
        assert!(s.is_active());
    }

    #[test]
    fn test_tick_within_radius_reaches() {
        let mut s = session(300);
        assert_eq!(s.tick(Some(5.0), RADIUS, WARNINGS), TickVerdict::Reached);
    }

    #[test]
    fn test_tick_last_second_out_of_range_times_out() {
        let mut s = session(1);
        assert_eq!(s.tick(Some(50.0), RADIUS, WARNINGS), TickVerdict::TimedOut);
        assert_eq!(s.remaining_secs(), 0);
    }

    #[test]
    fn test_tick_success_preempts_timeout_on_same_tick() {
        let mut s = session(1);
        assert_eq!(s.tick(Some(1.0), RADIUS, WARNINGS), TickVerdict::Reached);
        assert_eq!(s.remaining_secs(), 0);
    }

    #[test]
    fn test_tick_other_world_never_reaches() {
        let mut s = session(2);
        assert_eq!(
            s.tick(None, RADIUS, WARNINGS),
            TickVerdict::Continue { warning: None }
        );
    }

    #[test]
    fn test_tick_emits_warning_at_threshold() {
        let mut s = session(31);
        assert_eq!(
            s.tick(Some(100.0), RADIUS, WARNINGS),
            TickVerdict::Continue { warning: Some(30) }
        );
    }

    #[test]
    fn test_tick_after_end_is_inactive_and_frozen() {
        let mut s = session(300);
        s.conclude(EndCause::ManualEnd);

        assert_eq!(s.tick(Some(0.0), RADIUS, WARNINGS), TickVerdict::Inactive);
        assert_eq!(s.remaining_secs(), 300);
    }

    #[test]
    fn test_conclude_only_once() {
        let mut s = session(300);
        s.record_revoked("fly");
        s.attach_timer_for_test();

        let first = s.conclude(EndCause::Timeout).expect("first conclude");
        assert_eq!(first.cause, EndCause::Timeout);
        assert_eq!(first.capabilities, vec!["fly".to_string()]);
        assert!(first.timer.is_some());

        assert!(s.conclude(EndCause::Success).is_none());
        assert!(s.conclude(EndCause::Disconnect).is_none());
        assert_eq!(s.status(), SessionStatus::Ended(EndCause::Timeout));
    }

    #[test]
    fn test_conclude_drains_revoked_capabilities() {
        let mut s = session(300);
        s.record_revoked("home");
        s.record_revoked("tpa");
        s.record_revoked("home");

        let teardown = s.conclude(EndCause::ManualEnd).unwrap();

        assert_eq!(teardown.capabilities, vec!["home".to_string(), "tpa".to_string()]);
        assert_eq!(s.revoked_capabilities().count(), 0);
    }

    #[test]
    fn test_marker_reflects_state() {
        let mut s = session(300);
        s.tick(Some(900.0), RADIUS, WARNINGS);

        let marker = s.marker();
        assert!(marker.active);
        assert!(!marker.ended);
        assert_eq!(marker.remaining_secs, 299);
        assert_eq!(marker.target.block().x, 100);

        s.conclude(EndCause::ManualEnd);
        assert!(s.marker().ended);
    }

    impl GameSession {
        fn attach_timer_for_test(&mut self) {
            let mut timers = wayforge_tick::Timers::new();
            let handle = timers.run_every(20, ());
            self.attach_timer(handle);
        }
    }
}
