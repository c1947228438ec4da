// src/engine/trigger.rs

//! One-shot trigger shared by the pattern-match and startup-timeout paths.

use super::TriggerCause;

/// At-most-once trigger.
///
/// Starts in `Waiting` and moves to `Fired` on the first of a pattern match
/// or a timer expiry. Once fired, both paths are absorbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTrigger {
    Waiting { timer_armed: bool },
    Fired(TriggerCause),
}

/// Result of a successful transition to `Fired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Firing {
    pub cause: TriggerCause,
    /// The startup timer was still armed and must be disarmed now.
    pub disarm_timer: bool,
}

impl MatchTrigger {
    pub fn new(timer_armed: bool) -> Self {
        MatchTrigger::Waiting { timer_armed }
    }

    /// A line matched the pattern.
    pub fn on_match(&mut self) -> Option<Firing> {
        match *self {
            MatchTrigger::Waiting { timer_armed } => {
                *self = MatchTrigger::Fired(TriggerCause::PatternMatch);
                Some(Firing {
                    cause: TriggerCause::PatternMatch,
                    disarm_timer: timer_armed,
                })
            }
            MatchTrigger::Fired(_) => None,
        }
    }

    /// The startup timer elapsed.
    ///
    /// A stale expiry (the timer was never armed, or a match already fired
    /// the trigger) is ignored.
    pub fn on_timeout(&mut self) -> Option<Firing> {
        match *self {
            MatchTrigger::Waiting { timer_armed: true } => {
                *self = MatchTrigger::Fired(TriggerCause::StartupTimeout);
                Some(Firing {
                    cause: TriggerCause::StartupTimeout,
                    disarm_timer: true,
                })
            }
            _ => None,
        }
    }

    /// The timer is armed and has not fired yet.
    pub fn timer_pending(&self) -> bool {
        matches!(self, MatchTrigger::Waiting { timer_armed: true })
    }

    pub fn fired(&self) -> Option<TriggerCause> {
        match self {
            MatchTrigger::Fired(cause) => Some(*cause),
            MatchTrigger::Waiting { .. } => None,
        }
    }
}
