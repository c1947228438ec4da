// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use regex::Regex;
use tracing::{debug, info};

use crate::engine::trigger::{Firing, MatchTrigger};
use crate::engine::{SlotIndex, TriggerCause};
use crate::signals::RelaySignal;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Write this master line (plus `\n`) to runmon's stdout.
    Echo(Vec<u8>),
    /// Cancel the startup timer if it is still armed.
    DisarmStartupTimer,
    /// Ensure every task slot has a running process.
    StartAll(TriggerCause),
    /// Deliver a signal to every running task.
    SignalAll(RelaySignal),
    /// Forget the process recorded for this slot.
    ClearSlot(SlotIndex),
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreStep {
    /// Commands the IO shell should execute, in order.
    pub commands: Vec<CoreCommand>,
}

impl CoreStep {
    fn single(command: CoreCommand) -> Self {
        Self {
            commands: vec![command],
        }
    }
}

/// Handle one line of master output.
///
/// The line is always echoed first. On the first match the timer is
/// disarmed (if it was armed) and the tasks are started; any later match is
/// only echoed.
pub fn handle_master_line(pattern: &Regex, trigger: &mut MatchTrigger, line: Vec<u8>) -> CoreStep {
    let matched = pattern.is_match(&String::from_utf8_lossy(&line));
    let mut commands = vec![CoreCommand::Echo(line)];

    if matched {
        match trigger.on_match() {
            Some(firing) => push_firing(&mut commands, firing),
            None => debug!("pattern matched again; trigger already fired"),
        }
    }

    CoreStep { commands }
}

/// Handle expiry of the startup timer.
pub fn handle_startup_timeout(trigger: &mut MatchTrigger) -> CoreStep {
    let mut commands = Vec::new();
    match trigger.on_timeout() {
        Some(firing) => {
            info!("startup match timeout elapsed before any match");
            push_firing(&mut commands, firing);
        }
        None => debug!("startup timer fired after the trigger; ignoring"),
    }
    CoreStep { commands }
}

/// Handle a relayed OS signal.
pub fn handle_signal(signal: RelaySignal) -> CoreStep {
    CoreStep::single(CoreCommand::SignalAll(signal))
}

/// Handle a dependent task exiting. Exit codes are not inspected.
pub fn handle_task_exit(slot: SlotIndex) -> CoreStep {
    CoreStep::single(CoreCommand::ClearSlot(slot))
}

fn push_firing(commands: &mut Vec<CoreCommand>, firing: Firing) {
    if firing.disarm_timer {
        commands.push(CoreCommand::DisarmStartupTimer);
    }
    commands.push(CoreCommand::StartAll(firing.cause));
}
