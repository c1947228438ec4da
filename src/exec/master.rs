// src/exec/master.rs

//! Master task process: spawn, stream stdout lines, observe exit.

use std::process::Stdio;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Child;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::RuntimeEvent;
use crate::errors::{Result, RunmonError};
use crate::exec::shell::shell_command;

/// Handle to the running master task.
///
/// The process itself is owned by a background waiter; this handle can only
/// ask the waiter to stop it. Dropping the handle without calling
/// [`stop`](Self::stop) also kills the process.
#[derive(Debug)]
pub struct MasterProcess {
    pid: Option<u32>,
    cancel: Option<oneshot::Sender<()>>,
    waiter: JoinHandle<()>,
}

impl MasterProcess {
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Kill the master if it is still running and wait until it is reaped.
    ///
    /// A no-op if the master already exited.
    pub async fn stop(mut self) {
        if let Some(cancel) = self.cancel.take() {
            if cancel.send(()).is_err() {
                debug!("master already exited");
            }
        }
        if let Err(e) = (&mut self.waiter).await {
            debug!(error = %e, "master waiter ended abnormally");
        }
    }
}

/// Spawn `command` through `sh -c` with stdout captured.
///
/// Each stdout line is sent as `RuntimeEvent::MasterLine`, followed by
/// `MasterOutputClosed` at EOF, and `MasterExited` when the process ends.
/// Stdin and stderr are inherited.
pub fn spawn_master(command: &str, runtime_tx: mpsc::Sender<RuntimeEvent>) -> Result<MasterProcess> {
    let mut cmd = shell_command(command);
    cmd.stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| RunmonError::Spawn {
        what: format!("master command '{command}'"),
        source,
    })?;
    let pid = child.id();

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow::anyhow!("master stdout was not captured"))?;
    spawn_line_reader(BufReader::new(stdout), runtime_tx.clone());

    let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
    let waiter = tokio::spawn(wait_for_exit(child, runtime_tx, cancel_rx));

    info!(pid = ?pid, cmd = %command, "started master task");

    Ok(MasterProcess {
        pid,
        cancel: Some(cancel_tx),
        waiter,
    })
}

/// Forward lines from `reader` to the runtime, in order, then report EOF.
pub fn spawn_line_reader<R>(mut reader: R, runtime_tx: mpsc::Sender<RuntimeEvent>) -> JoinHandle<()>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = trim_line_ending(&buf).to_vec();
                    if runtime_tx.send(RuntimeEvent::MasterLine(line)).await.is_err() {
                        return;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed reading master stdout");
                    break;
                }
            }
        }

        debug!("master stdout reader finished");
        let _ = runtime_tx.send(RuntimeEvent::MasterOutputClosed).await;
    })
}

async fn wait_for_exit(
    mut child: Child,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    mut cancel_rx: oneshot::Receiver<()>,
) {
    tokio::select! {
        status = child.wait() => {
            let code = match status {
                Ok(status) => status.code(),
                Err(e) => {
                    warn!(error = %e, "failed waiting for master task");
                    None
                }
            };
            let _ = runtime_tx.send(RuntimeEvent::MasterExited { code }).await;
        }

        cancel = &mut cancel_rx => {
            match cancel {
                Ok(()) => {
                    info!("stopping master task");
                    if let Err(e) = child.kill().await {
                        warn!(error = %e, "failed to kill master task");
                    }
                }
                Err(_) => {
                    // Handle dropped; kill_on_drop(true) takes care of it.
                    debug!("master handle dropped");
                }
            }
        }
    }
}

/// Strip a trailing `\n` or `\r\n`.
pub fn trim_line_ending(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_unix_and_windows_endings() {
        assert_eq!(trim_line_ending(b"abc\n"), b"abc");
        assert_eq!(trim_line_ending(b"abc\r\n"), b"abc");
        assert_eq!(trim_line_ending(b"abc"), b"abc");
        assert_eq!(trim_line_ending(b"\n"), b"");
    }

    #[tokio::test]
    async fn reader_emits_lines_in_order_then_closes() {
        let (tx, mut rx) = mpsc::channel(8);
        let input: &[u8] = b"first\nsecond\r\n\nlast-without-newline";

        spawn_line_reader(input, tx).await.unwrap();

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                RuntimeEvent::MasterLine(b"first".to_vec()),
                RuntimeEvent::MasterLine(b"second".to_vec()),
                RuntimeEvent::MasterLine(Vec::new()),
                RuntimeEvent::MasterLine(b"last-without-newline".to_vec()),
                RuntimeEvent::MasterOutputClosed,
            ]
        );
    }

    #[tokio::test]
    async fn master_lines_and_exit_are_reported() {
        let (tx, mut rx) = mpsc::channel(8);
        let master = spawn_master("printf 'one\\ntwo\\n'", tx).unwrap();
        assert!(master.pid().is_some());

        let mut lines = Vec::new();
        let mut closed = false;
        let mut exited = None;
        while !(closed && exited.is_some()) {
            match rx.recv().await.expect("channel open") {
                RuntimeEvent::MasterLine(line) => lines.push(line),
                RuntimeEvent::MasterOutputClosed => closed = true,
                RuntimeEvent::MasterExited { code } => exited = Some(code),
                other => panic!("unexpected event {other:?}"),
            }
        }

        assert_eq!(lines, vec![b"one".to_vec(), b"two".to_vec()]);
        assert_eq!(exited, Some(Some(0)));
        master.stop().await;
    }

    #[tokio::test]
    async fn stop_kills_a_running_master() {
        let (tx, _rx) = mpsc::channel(8);
        let master = spawn_master("sleep 30", tx).unwrap();

        tokio::time::timeout(std::time::Duration::from_secs(5), master.stop())
            .await
            .expect("stop returns promptly");
    }
}
