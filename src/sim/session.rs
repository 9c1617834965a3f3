//! Roll session state
//!
//! One explicit phase value replaces loose booleans: timers live inside the
//! phase that uses them, and "awaiting a result" / "already announced" are
//! derived rather than stored.

use serde::{Deserialize, Serialize};

use super::animate::TaskToken;

/// Lifecycle phase of the current throw
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RollPhase {
    /// No throw in flight. Carries the last announced number of this session.
    Idle { last_result: Option<u32> },
    /// Free flight; `still` counts time spent not moving
    Rolling { still: f32 },
    /// Classified settled; `settle` accumulates only while settled
    WaitingToSettle { settle: f32, still: f32 },
    /// Scripted move to the scoring pose
    Recentering { number: u32, token: TaskToken },
    /// Result emitted this tick; becomes Idle on the next update
    Announced { number: u32 },
}

/// Phase names for logs and the web binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseKind {
    Idle,
    Rolling,
    WaitingToSettle,
    Recentering,
    Announced,
}

impl RollPhase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            RollPhase::Idle { .. } => PhaseKind::Idle,
            RollPhase::Rolling { .. } => PhaseKind::Rolling,
            RollPhase::WaitingToSettle { .. } => PhaseKind::WaitingToSettle,
            RollPhase::Recentering { .. } => PhaseKind::Recentering,
            RollPhase::Announced { .. } => PhaseKind::Announced,
        }
    }
}

/// Per-die throw bookkeeping. Reset on each throw, replaced when the variant
/// changes.
#[derive(Debug, Clone)]
pub struct RollSession {
    pub phase: RollPhase,
    /// Guard after a settle event; blocks re-entering WaitingToSettle
    pub cooldown: f32,
    generation: u64,
}

impl Default for RollSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RollSession {
    pub fn new() -> Self {
        Self {
            phase: RollPhase::Idle { last_result: None },
            cooldown: 0.0,
            generation: 0,
        }
    }

    /// Counter bumped by every throw
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a new throw: timers cleared, generation bumped
    pub fn begin_throw(&mut self) -> u64 {
        self.generation += 1;
        self.phase = RollPhase::Rolling { still: 0.0 };
        self.cooldown = 0.0;
        self.generation
    }

    /// Fresh state for a new die: Idle with no result, generation still
    /// moving forward
    pub fn reset(&mut self) {
        self.generation += 1;
        self.phase = RollPhase::Idle { last_result: None };
        self.cooldown = 0.0;
    }

    /// True from the instant a throw begins until its result is announced
    pub fn awaiting_result(&self) -> bool {
        matches!(
            self.phase,
            RollPhase::Rolling { .. }
                | RollPhase::WaitingToSettle { .. }
                | RollPhase::Recentering { .. }
        )
    }

    /// True once this throw's result went out
    pub fn has_announced(&self) -> bool {
        matches!(
            self.phase,
            RollPhase::Announced { .. } | RollPhase::Idle { last_result: Some(_) }
        )
    }

    pub fn settle_timer(&self) -> f32 {
        match self.phase {
            RollPhase::WaitingToSettle { settle, .. } => settle,
            _ => 0.0,
        }
    }

    pub fn still_timer(&self) -> f32 {
        match self.phase {
            RollPhase::Rolling { still } | RollPhase::WaitingToSettle { still, .. } => still,
            _ => 0.0,
        }
    }

    pub fn last_result(&self) -> Option<u32> {
        match self.phase {
            RollPhase::Announced { number } => Some(number),
            RollPhase::Idle { last_result } => last_result,
            _ => None,
        }
    }

    pub fn tick_cooldown(&mut self, dt: f32) {
        self.cooldown = (self.cooldown - dt).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_session_is_idle() {
        let session = RollSession::new();
        assert_eq!(session.phase.kind(), PhaseKind::Idle);
        assert!(!session.awaiting_result());
        assert!(!session.has_announced());
        assert_eq!(session.generation(), 0);
    }

    #[test]
    fn test_begin_throw_resets() {
        let mut session = RollSession::new();
        session.phase = RollPhase::Idle {
            last_result: Some(4),
        };
        session.cooldown = 3.0;
        assert!(session.has_announced());

        let generation = session.begin_throw();
        assert_eq!(generation, 1);
        assert!(session.awaiting_result());
        assert!(!session.has_announced());
        assert_eq!(session.cooldown, 0.0);
        assert_eq!(session.still_timer(), 0.0);
        assert_eq!(session.settle_timer(), 0.0);
    }

    #[test]
    fn test_flags_are_exclusive() {
        let mut session = RollSession::new();
        let phases = [
            RollPhase::Idle { last_result: None },
            RollPhase::Idle {
                last_result: Some(2),
            },
            RollPhase::Rolling { still: 0.3 },
            RollPhase::WaitingToSettle {
                settle: 0.1,
                still: 0.2,
            },
            RollPhase::Announced { number: 5 },
        ];
        for phase in phases {
            session.phase = phase;
            assert!(!(session.awaiting_result() && session.has_announced()));
        }
    }

    #[test]
    fn test_reset_for_new_die() {
        let mut session = RollSession::new();
        session.begin_throw();
        session.cooldown = 5.0;
        session.phase = RollPhase::WaitingToSettle {
            settle: 0.2,
            still: 0.4,
        };
        session.reset();
        assert_eq!(session.phase, RollPhase::Idle { last_result: None });
        assert_eq!(session.cooldown, 0.0);
        assert_eq!(session.generation(), 2);
        assert!(!session.awaiting_result());
        assert!(!session.has_announced());
    }

    #[test]
    fn test_cooldown_floors_at_zero() {
        let mut session = RollSession::new();
        session.cooldown = 0.05;
        session.tick_cooldown(0.1);
        assert_eq!(session.cooldown, 0.0);
    }
}
