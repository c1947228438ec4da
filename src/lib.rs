// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod signals;

use std::io;

use tokio::sync::mpsc;
use tracing::info;

use crate::config::RunConfig;
use crate::engine::{CoreRuntime, ExitReason, Runtime, RuntimeEvent, StartupTimer};
use crate::errors::Result;
use crate::exec::{spawn_master, RealTaskLauncher, TaskRegistry};
use crate::signals::spawn_signal_relay;

/// Capacity of the runtime event channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - the signal relay (installed first, so no signal is missed)
/// - the master task and its stdout reader
/// - the optional startup timer
/// - the task registry with the real launcher
/// - the runtime event loop
///
/// Returns once the master has finished and every task has exited, or right
/// after a terminating signal has been forwarded.
pub async fn run(config: RunConfig) -> Result<ExitReason> {
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(EVENT_CHANNEL_CAPACITY);

    let relay = spawn_signal_relay(rt_tx.clone())?;
    let master = spawn_master(&config.command, rt_tx.clone())?;

    let timer = match config.startup_timeout {
        Some(timeout) => StartupTimer::arm(timeout, rt_tx.clone()),
        None => StartupTimer::disarmed(),
    };

    let registry = TaskRegistry::new(config.tasks.clone(), RealTaskLauncher::new(rt_tx));
    let core = CoreRuntime::new(config.pattern.clone(), timer.is_armed());

    info!(
        pattern = %config.pattern,
        tasks = config.slot_count(),
        startup_timeout = ?config.startup_timeout,
        "waiting for master output"
    );

    let runtime = Runtime::new(core, registry, timer, rt_rx, io::stdout());
    let outcome = runtime.run().await;

    master.stop().await;
    relay.abort();

    outcome
}
