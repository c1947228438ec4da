// src/engine/mod.rs

//! Orchestration engine for runmon.
//!
//! Every lifecycle change is delivered as a [`RuntimeEvent`] over a single
//! channel:
//! - lines read from the master's stdout, and the end of that stream
//! - the master process exiting
//! - the startup timer elapsing
//! - a dependent task exiting
//! - an OS signal arriving at runmon itself
//!
//! The pure core state machine lives in [`core`]; the async/IO shell that
//! owns the task registry and the startup timer is implemented in
//! [`runtime`].

use std::fmt;

use crate::signals::RelaySignal;

/// Stable identity of a dependent task: its position on the command line.
pub type SlotIndex = usize;

/// What caused the one-shot trigger to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerCause {
    /// A master output line matched the pattern.
    PatternMatch,
    /// The startup timer elapsed before any line matched.
    StartupTimeout,
}

/// Events flowing into the runtime from the master reader, task waiters,
/// the startup timer and the signal relay.
#[derive(Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// One line of master stdout, without its line terminator.
    MasterLine(Vec<u8>),
    /// The master's stdout reached EOF (or could no longer be read).
    MasterOutputClosed,
    /// The master process exited.
    MasterExited { code: Option<i32> },
    /// The startup timer elapsed.
    StartupTimerFired,
    /// The process running in `slot` exited (any status).
    TaskExited { slot: SlotIndex, code: Option<i32> },
    /// runmon itself received one of the relayed signals.
    SignalReceived(RelaySignal),
}

impl fmt::Debug for RuntimeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeEvent::MasterLine(line) => f
                .debug_tuple("MasterLine")
                .field(&String::from_utf8_lossy(line))
                .finish(),
            RuntimeEvent::MasterOutputClosed => f.write_str("MasterOutputClosed"),
            RuntimeEvent::MasterExited { code } => {
                f.debug_struct("MasterExited").field("code", code).finish()
            }
            RuntimeEvent::StartupTimerFired => f.write_str("StartupTimerFired"),
            RuntimeEvent::TaskExited { slot, code } => f
                .debug_struct("TaskExited")
                .field("slot", slot)
                .field("code", code)
                .finish(),
            RuntimeEvent::SignalReceived(signal) => {
                f.debug_tuple("SignalReceived").field(signal).finish()
            }
        }
    }
}

/// Why the runtime loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The master finished, no timer is pending and no task is running.
    Completed,
    /// A terminating signal was forwarded and runmon stopped after it.
    Signalled(RelaySignal),
}

impl ExitReason {
    /// Process exit status for this outcome (`128 + signo` for signals).
    pub fn exit_code(&self) -> i32 {
        match self {
            ExitReason::Completed => 0,
            ExitReason::Signalled(signal) => 128 + signal.number(),
        }
    }
}

pub mod core;
pub mod event_handlers;
pub mod runtime;
pub mod timer;
pub mod trigger;

pub use self::core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::Runtime;
pub use timer::StartupTimer;
pub use trigger::MatchTrigger;
