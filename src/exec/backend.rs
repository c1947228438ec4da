// src/exec/backend.rs

//! Pluggable task launcher abstraction.
//!
//! The registry talks to a `TaskLauncher` instead of spawning processes
//! itself. This makes it easy to swap in a fake launcher in tests while
//! keeping the production implementation here.
//!
//! - `RealTaskLauncher` is the default implementation used by `runmon`.
//!   It spawns each task through `sh -c` with inherited stdio and reports
//!   the exit back to the runtime as `RuntimeEvent::TaskExited`.
//! - Tests can provide their own `TaskLauncher` that records launches and
//!   signals, and emits exits whenever the test decides.

use std::process::Stdio;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::engine::{RuntimeEvent, SlotIndex};
use crate::errors::{Result, RunmonError};
use crate::exec::shell::shell_command;
use crate::signals::{deliver_signal, RelaySignal};

/// Reference to a launched task process, held by its registry slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandle {
    pub slot: SlotIndex,
    /// OS process id, if the platform reported one.
    pub pid: Option<u32>,
    pub command: String,
}

/// Trait abstracting how dependent tasks are started and signalled.
///
/// Production code uses [`RealTaskLauncher`]; tests can provide their own
/// implementation that doesn't spawn real processes.
pub trait TaskLauncher: Send {
    /// Start `command` for `slot`.
    ///
    /// The implementation must eventually cause a
    /// `RuntimeEvent::TaskExited { slot, .. }` once the process is gone.
    fn launch(&mut self, slot: SlotIndex, command: &str) -> Result<TaskHandle>;

    /// Deliver `signal` to a task this launcher started.
    fn deliver(&mut self, task: &TaskHandle, signal: RelaySignal) -> Result<()>;
}

/// Real launcher used in production.
pub struct RealTaskLauncher {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl RealTaskLauncher {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self { runtime_tx }
    }
}

impl TaskLauncher for RealTaskLauncher {
    fn launch(&mut self, slot: SlotIndex, command: &str) -> Result<TaskHandle> {
        // Dependents write straight to runmon's stdio, and are not killed
        // when runmon stops, so they can act on a forwarded signal.
        let mut cmd = shell_command(command);
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(false);

        let mut child = cmd.spawn().map_err(|source| RunmonError::Spawn {
            what: format!("task {slot} ('{command}')"),
            source,
        })?;
        let pid = child.id();
        info!(slot, pid = ?pid, cmd = %command, "started task process");

        let runtime_tx = self.runtime_tx.clone();
        tokio::spawn(async move {
            let code = match child.wait().await {
                Ok(status) => {
                    info!(slot, pid = ?pid, exit_code = ?status.code(), "task process exited");
                    status.code()
                }
                Err(e) => {
                    warn!(slot, pid = ?pid, error = %e, "failed waiting for task process");
                    None
                }
            };
            let _ = runtime_tx
                .send(RuntimeEvent::TaskExited { slot, code })
                .await;
        });

        Ok(TaskHandle {
            slot,
            pid,
            command: command.to_string(),
        })
    }

    fn deliver(&mut self, task: &TaskHandle, signal: RelaySignal) -> Result<()> {
        match task.pid {
            Some(pid) => deliver_signal(pid, signal),
            // No pid means the process was already reaped.
            None => Ok(()),
        }
    }
}
