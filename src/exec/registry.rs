// src/exec/registry.rs

//! Per-slot record of running dependent tasks.

use tracing::{debug, error, warn};

use crate::engine::SlotIndex;
use crate::exec::backend::{TaskHandle, TaskLauncher};
use crate::signals::RelaySignal;

/// Outcome of a [`TaskRegistry::start_all`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartReport {
    /// Slots that got a new process.
    pub started: Vec<SlotIndex>,
    /// Slots that already had a live process and were left alone.
    pub already_running: Vec<SlotIndex>,
    /// Slots whose spawn failed; they stay empty.
    pub failed: Vec<SlotIndex>,
}

/// Tracks, per task slot, whether a process is currently running for it.
///
/// At most one process is recorded per slot. A slot is filled by
/// [`start_all`](Self::start_all) and emptied by
/// [`mark_exited`](Self::mark_exited), after which a later `start_all` may
/// fill it again.
pub struct TaskRegistry<L: TaskLauncher> {
    commands: Vec<String>,
    slots: Vec<Option<TaskHandle>>,
    launcher: L,
}

impl<L: TaskLauncher> std::fmt::Debug for TaskRegistry<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRegistry")
            .field("commands", &self.commands)
            .field("slots", &self.slots)
            .finish_non_exhaustive()
    }
}

impl<L: TaskLauncher> TaskRegistry<L> {
    pub fn new(commands: Vec<String>, launcher: L) -> Self {
        let slots = vec![None; commands.len()];
        Self {
            commands,
            slots,
            launcher,
        }
    }

    /// Ensure every slot has a running process.
    ///
    /// Occupied slots are untouched. A spawn failure is logged and the
    /// remaining slots are still attempted.
    pub fn start_all(&mut self) -> StartReport {
        let mut report = StartReport::default();

        for (slot, entry) in self.slots.iter_mut().enumerate() {
            if entry.is_some() {
                debug!(slot, "task already running; not starting again");
                report.already_running.push(slot);
                continue;
            }

            let command = &self.commands[slot];
            match self.launcher.launch(slot, command) {
                Ok(handle) => {
                    *entry = Some(handle);
                    report.started.push(slot);
                }
                Err(err) => {
                    error!(slot, cmd = %command, error = %err, "failed to start task");
                    report.failed.push(slot);
                }
            }
        }

        report
    }

    /// Deliver `signal` to every running task. Empty slots are skipped.
    ///
    /// Returns the number of tasks the signal was delivered to.
    pub fn signal_all(&mut self, signal: RelaySignal) -> usize {
        if self.is_idle() {
            debug!(%signal, "no running tasks; signal not forwarded");
            return 0;
        }

        let mut delivered = 0;

        for handle in self.slots.iter().flatten() {
            match self.launcher.deliver(handle, signal) {
                Ok(()) => {
                    debug!(
                        slot = handle.slot,
                        pid = ?handle.pid,
                        cmd = %handle.command,
                        %signal,
                        "forwarded signal"
                    );
                    delivered += 1;
                }
                Err(err) => {
                    warn!(
                        slot = handle.slot,
                        pid = ?handle.pid,
                        cmd = %handle.command,
                        %signal,
                        error = %err,
                        "failed to forward signal"
                    );
                }
            }
        }

        delivered
    }

    /// Forget the process recorded for `slot`.
    pub fn mark_exited(&mut self, slot: SlotIndex) {
        match self.slots.get_mut(slot) {
            Some(entry) => {
                if entry.take().is_none() {
                    debug!(slot, "exit reported for an empty slot");
                }
            }
            None => warn!(slot, "exit reported for unknown slot"),
        }
    }

    #[cfg(test)]
    fn is_running(&self, slot: SlotIndex) -> bool {
        self.slots.get(slot).is_some_and(Option::is_some)
    }

    /// Number of slots currently holding a live process.
    pub fn running(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_idle(&self) -> bool {
        self.running() == 0
    }

    #[cfg(test)]
    fn launcher(&self) -> &L {
        &self.launcher
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::errors::{Result, RunmonError};

    #[derive(Default)]
    struct RecordingLauncher {
        launches: Vec<SlotIndex>,
        delivered: Vec<(SlotIndex, RelaySignal)>,
        failing: HashSet<SlotIndex>,
    }

    impl TaskLauncher for RecordingLauncher {
        fn launch(&mut self, slot: SlotIndex, command: &str) -> Result<TaskHandle> {
            if self.failing.contains(&slot) {
                return Err(RunmonError::Spawn {
                    what: format!("task {slot}"),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                });
            }
            self.launches.push(slot);
            Ok(TaskHandle {
                slot,
                pid: Some(1000 + slot as u32),
                command: command.to_string(),
            })
        }

        fn deliver(&mut self, task: &TaskHandle, signal: RelaySignal) -> Result<()> {
            self.delivered.push((task.slot, signal));
            Ok(())
        }
    }

    fn registry(n: usize) -> TaskRegistry<RecordingLauncher> {
        let commands = (0..n).map(|i| format!("echo task{i}")).collect();
        TaskRegistry::new(commands, RecordingLauncher::default())
    }

    #[test]
    fn start_all_is_idempotent_while_running() {
        let mut reg = registry(2);

        let first = reg.start_all();
        assert_eq!(first.started, vec![0, 1]);

        let second = reg.start_all();
        assert!(second.started.is_empty());
        assert_eq!(second.already_running, vec![0, 1]);
        assert_eq!(reg.launcher().launches, vec![0, 1]);
    }

    #[test]
    fn exited_slot_is_relaunched_in_place() {
        let mut reg = registry(2);
        reg.start_all();

        reg.mark_exited(1);
        assert!(reg.is_running(0));
        assert!(!reg.is_running(1));
        assert_eq!(reg.running(), 1);

        let report = reg.start_all();
        assert_eq!(report.started, vec![1]);
        assert_eq!(reg.launcher().launches, vec![0, 1, 1]);
        assert_eq!(reg.running(), 2);
    }

    #[test]
    fn spawn_failure_does_not_block_other_slots() {
        let mut reg = registry(3);
        reg.launcher.failing.insert(1);

        let report = reg.start_all();
        assert_eq!(report.started, vec![0, 2]);
        assert_eq!(report.failed, vec![1]);
        assert!(!reg.is_running(1));
    }

    #[test]
    fn signal_all_skips_empty_slots() {
        let mut reg = registry(3);
        assert_eq!(reg.signal_all(RelaySignal::User1), 0);

        reg.start_all();
        reg.mark_exited(0);

        assert_eq!(reg.signal_all(RelaySignal::User2), 2);
        assert_eq!(
            reg.launcher().delivered,
            vec![(1, RelaySignal::User2), (2, RelaySignal::User2)]
        );
    }

    #[test]
    fn unknown_slot_exit_is_ignored() {
        let mut reg = registry(1);
        reg.mark_exited(7);
        assert!(reg.is_idle());
    }
}
