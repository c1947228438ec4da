// src/signals.rs

//! OS signal relay.
//!
//! runmon subscribes to a fixed set of signals for its whole lifetime:
//! - **SIGINT** (Ctrl-C in terminal)
//! - **SIGUSR1** / **SIGUSR2** (application-defined, typically "reload")
//! - **SIGTERM** (default kill signal)
//!
//! Each delivery becomes a [`RuntimeEvent::SignalReceived`]; the runtime
//! forwards it unchanged to every running dependent task. SIGINT and SIGTERM
//! additionally stop runmon once forwarded.

use std::fmt;
use std::io;

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::engine::RuntimeEvent;
use crate::errors::{Result, RunmonError};

/// A signal runmon relays to its dependent tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelaySignal {
    Interrupt,
    User1,
    User2,
    Terminate,
}

impl RelaySignal {
    /// Every relayed signal, in subscription order.
    pub const ALL: [RelaySignal; 4] = [
        RelaySignal::Interrupt,
        RelaySignal::User1,
        RelaySignal::User2,
        RelaySignal::Terminate,
    ];

    pub fn kind(self) -> SignalKind {
        match self {
            RelaySignal::Interrupt => SignalKind::interrupt(),
            RelaySignal::User1 => SignalKind::user_defined1(),
            RelaySignal::User2 => SignalKind::user_defined2(),
            RelaySignal::Terminate => SignalKind::terminate(),
        }
    }

    pub fn as_nix(self) -> Signal {
        match self {
            RelaySignal::Interrupt => Signal::SIGINT,
            RelaySignal::User1 => Signal::SIGUSR1,
            RelaySignal::User2 => Signal::SIGUSR2,
            RelaySignal::Terminate => Signal::SIGTERM,
        }
    }

    /// Raw signal number.
    pub fn number(self) -> i32 {
        self.as_nix() as i32
    }

    /// Whether runmon itself stops after forwarding this signal.
    pub fn stops_runmon(self) -> bool {
        matches!(self, RelaySignal::Interrupt | RelaySignal::Terminate)
    }
}

impl fmt::Display for RelaySignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_nix().as_str())
    }
}

/// Install handlers for every [`RelaySignal`] and forward deliveries into
/// the runtime channel.
///
/// Handlers are registered before this returns, so a signal arriving right
/// after the call is not lost. The relay task ends when the runtime drops
/// its receiver.
pub fn spawn_signal_relay(runtime_tx: mpsc::Sender<RuntimeEvent>) -> io::Result<JoinHandle<()>> {
    let mut sigint = signal(RelaySignal::Interrupt.kind())?;
    let mut sigusr1 = signal(RelaySignal::User1.kind())?;
    let mut sigusr2 = signal(RelaySignal::User2.kind())?;
    let mut sigterm = signal(RelaySignal::Terminate.kind())?;

    Ok(tokio::spawn(async move {
        loop {
            let received = tokio::select! {
                Some(()) = sigint.recv() => RelaySignal::Interrupt,
                Some(()) = sigusr1.recv() => RelaySignal::User1,
                Some(()) = sigusr2.recv() => RelaySignal::User2,
                Some(()) = sigterm.recv() => RelaySignal::Terminate,
                else => break,
            };

            debug!(signal = %received, "received signal");
            if runtime_tx
                .send(RuntimeEvent::SignalReceived(received))
                .await
                .is_err()
            {
                break;
            }
        }
        debug!("signal relay finished");
    }))
}

/// Send `signal` to the process `pid`.
///
/// A process that is already gone (`ESRCH`) is not an error: its exit event
/// is simply still on its way to the runtime.
pub fn deliver_signal(pid: u32, signal: RelaySignal) -> Result<()> {
    let raw = i32::try_from(pid).map_err(|e| RunmonError::Other(e.into()))?;
    match kill(Pid::from_raw(raw), signal.as_nix()) {
        Ok(()) => Ok(()),
        Err(Errno::ESRCH) => {
            debug!(pid, signal = %signal, "process already exited; signal not delivered");
            Ok(())
        }
        Err(source) => Err(RunmonError::Signal { pid, source }),
    }
}
