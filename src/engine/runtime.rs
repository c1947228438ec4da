// src/engine/runtime.rs

use std::fmt;
use std::io::Write;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::exec::{TaskLauncher, TaskRegistry};

use super::core::CoreRuntime;
use super::timer::StartupTimer;
use super::{CoreCommand, ExitReason, RuntimeEvent};

/// Single dispatcher for every runmon event.
///
/// This is a pure IO shell around `CoreRuntime`, which contains all the
/// trigger semantics. This struct handles IO: reading events from the
/// channel, echoing master lines, driving the task registry and cancelling
/// the startup timer. All mutable state is touched only from [`run`](Self::run),
/// one event at a time.
pub struct Runtime<L: TaskLauncher, W: Write> {
    core: CoreRuntime,
    registry: TaskRegistry<L>,
    timer: StartupTimer,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    out: W,
    echo_failed: bool,
}

impl<L: TaskLauncher, W: Write> fmt::Debug for Runtime<L, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("registry", &self.registry)
            .field("timer", &self.timer)
            .finish_non_exhaustive()
    }
}

impl<L: TaskLauncher, W: Write> Runtime<L, W> {
    pub fn new(
        core: CoreRuntime,
        registry: TaskRegistry<L>,
        timer: StartupTimer,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        out: W,
    ) -> Self {
        Self {
            core,
            registry,
            timer,
            event_rx,
            out,
            echo_failed: false,
        }
    }

    /// Main event loop.
    ///
    /// - Consumes `RuntimeEvent`s from `event_rx`.
    /// - Feeds them into the core runtime.
    /// - Executes the commands returned by the core.
    /// - Stops as soon as the core reports an [`ExitReason`].
    pub async fn run(mut self) -> Result<ExitReason> {
        info!("runmon runtime started");

        loop {
            if let Some(reason) = self.core.exit_reason(self.registry.running()) {
                info!(?reason, cause = ?self.core.trigger_cause(), "runtime finished");
                return Ok(reason);
            }

            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    return Ok(ExitReason::Completed);
                }
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event);
            for command in step.commands {
                self.execute_command(command);
            }
        }
    }

    /// Execute a single command from the core.
    fn execute_command(&mut self, command: CoreCommand) {
        match command {
            CoreCommand::Echo(line) => self.echo(&line),
            CoreCommand::DisarmStartupTimer => self.timer.cancel(),
            CoreCommand::StartAll(cause) => {
                let report = self.registry.start_all();
                info!(
                    ?cause,
                    started = ?report.started,
                    failed = ?report.failed,
                    "trigger fired; starting tasks"
                );
            }
            CoreCommand::SignalAll(signal) => {
                let delivered = self.registry.signal_all(signal);
                info!(%signal, delivered, "forwarded signal to running tasks");
            }
            CoreCommand::ClearSlot(slot) => self.registry.mark_exited(slot),
        }
    }

    fn echo(&mut self, line: &[u8]) {
        if let Err(e) = write_line(&mut self.out, line) {
            // Keep matching even if nobody is reading our stdout.
            if !self.echo_failed {
                warn!(error = %e, "failed to echo master output");
                self.echo_failed = true;
            }
        }
    }
}

fn write_line<W: Write>(out: &mut W, line: &[u8]) -> std::io::Result<()> {
    out.write_all(line)?;
    out.write_all(b"\n")?;
    out.flush()
}
