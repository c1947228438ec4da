// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated core state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from the channel
//! - writing echoed lines to stdout
//! - starting and signalling tasks through the registry
//! - cancelling the startup timer
//!
//! The core has no channels, no Tokio types and performs no IO, so it is
//! unit tested directly.

use regex::Regex;
use tracing::{debug, info};

use crate::engine::event_handlers::{
    handle_master_line, handle_signal, handle_startup_timeout, handle_task_exit, CoreStep,
};
use crate::engine::trigger::MatchTrigger;
use crate::engine::{ExitReason, RuntimeEvent, TriggerCause};
use crate::signals::RelaySignal;

/// Progress of the master process as seen through its events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct MasterState {
    output_closed: bool,
    exited: bool,
}

impl MasterState {
    fn finished(&self) -> bool {
        self.output_closed && self.exited
    }
}

#[derive(Debug)]
pub struct CoreRuntime {
    pattern: Regex,
    trigger: MatchTrigger,
    master: MasterState,
    /// Set once a terminating signal has been forwarded.
    stop_signal: Option<RelaySignal>,
}

impl CoreRuntime {
    pub fn new(pattern: Regex, timer_armed: bool) -> Self {
        Self {
            pattern,
            trigger: MatchTrigger::new(timer_armed),
            master: MasterState::default(),
            stop_signal: None,
        }
    }

    /// Which path fired the trigger, if it has fired.
    pub fn trigger_cause(&self) -> Option<TriggerCause> {
        self.trigger.fired()
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::MasterLine(line) => {
                handle_master_line(&self.pattern, &mut self.trigger, line)
            }
            RuntimeEvent::MasterOutputClosed => {
                debug!("master output closed");
                self.master.output_closed = true;
                CoreStep::default()
            }
            RuntimeEvent::MasterExited { code } => {
                info!(exit_code = ?code, "master task exited");
                self.master.exited = true;
                CoreStep::default()
            }
            RuntimeEvent::StartupTimerFired => handle_startup_timeout(&mut self.trigger),
            RuntimeEvent::TaskExited { slot, .. } => handle_task_exit(slot),
            RuntimeEvent::SignalReceived(signal) => {
                if signal.stops_runmon() && self.stop_signal.is_none() {
                    self.stop_signal = Some(signal);
                }
                handle_signal(signal)
            }
        }
    }

    /// Decide whether the runtime loop should stop, given how many task
    /// slots currently hold a live process.
    ///
    /// Normal completion requires the master to have closed its output and
    /// exited, no startup timer still pending, and every task slot empty.
    pub fn exit_reason(&self, running_tasks: usize) -> Option<ExitReason> {
        if let Some(signal) = self.stop_signal {
            return Some(ExitReason::Signalled(signal));
        }

        let drained =
            self.master.finished() && !self.trigger.timer_pending() && running_tasks == 0;
        drained.then_some(ExitReason::Completed)
    }
}
