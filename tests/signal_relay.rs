// tests/signal_relay.rs
//
// Signals sent to runmon reach its running dependent tasks.

mod common;
use crate::common::{init_tracing, runmon_bin};

use std::error::Error;
use std::process::Stdio;

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use runmon_test_utils::with_timeout;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};

type TestResult = Result<(), Box<dyn Error>>;

/// A dependent task that reports `signal` once it is received, then exits.
fn trapping_task(signal: &str) -> String {
    format!(
        "trap 'echo got-{signal}; exit 0' {signal}; echo armed; while :; do sleep 0.05; done"
    )
}

fn spawn_runmon(master: &str, task: &str) -> std::io::Result<Child> {
    Command::new(runmon_bin())
        .args([master, "ready", task])
        .env_remove("RUNMON_LOG")
        .stdout(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
}

async fn read_until(lines: &mut Lines<BufReader<ChildStdout>>, wanted: &str) -> TestResult {
    while let Some(line) = lines.next_line().await? {
        if line == wanted {
            return Ok(());
        }
    }
    Err(format!("stdout closed before {wanted:?}").into())
}

fn send(child: &Child, signal: Signal) -> TestResult {
    let pid = child.id().ok_or("runmon already exited")?;
    kill(Pid::from_raw(pid as i32), signal)?;
    Ok(())
}

#[tokio::test]
async fn usr1_is_forwarded_and_runmon_keeps_running() -> TestResult {
    init_tracing();

    let mut child = spawn_runmon("echo ready; sleep 1", &trapping_task("USR1"))?;
    let stdout = child.stdout.take().ok_or("no stdout")?;
    let mut lines = BufReader::new(stdout).lines();

    with_timeout(read_until(&mut lines, "armed")).await?;
    send(&child, Signal::SIGUSR1)?;
    with_timeout(read_until(&mut lines, "got-USR1")).await?;

    let status = with_timeout(child.wait()).await?;
    assert_eq!(status.code(), Some(0));
    Ok(())
}

#[tokio::test]
async fn term_is_forwarded_and_stops_runmon() -> TestResult {
    init_tracing();

    let mut child = spawn_runmon("echo ready; exec sleep 30", &trapping_task("TERM"))?;
    let stdout = child.stdout.take().ok_or("no stdout")?;
    let mut lines = BufReader::new(stdout).lines();

    with_timeout(read_until(&mut lines, "armed")).await?;
    send(&child, Signal::SIGTERM)?;

    let status = with_timeout(child.wait()).await?;
    assert_eq!(status.code(), Some(128 + 15));

    // The orphaned task still shares our stdout pipe.
    with_timeout(read_until(&mut lines, "got-TERM")).await?;
    Ok(())
}

#[tokio::test]
async fn usr2_reaches_a_running_task() -> TestResult {
    init_tracing();

    let mut child = spawn_runmon("echo ready; sleep 1", &trapping_task("USR2"))?;
    let stdout = child.stdout.take().ok_or("no stdout")?;
    let mut lines = BufReader::new(stdout).lines();

    with_timeout(read_until(&mut lines, "armed")).await?;
    send(&child, Signal::SIGUSR2)?;
    with_timeout(read_until(&mut lines, "got-USR2")).await?;

    let status = with_timeout(child.wait()).await?;
    assert_eq!(status.code(), Some(0));
    Ok(())
}

#[tokio::test]
async fn int_is_forwarded_and_stops_runmon() -> TestResult {
    init_tracing();

    let mut child = spawn_runmon("echo ready; exec sleep 30", &trapping_task("INT"))?;
    let stdout = child.stdout.take().ok_or("no stdout")?;
    let mut lines = BufReader::new(stdout).lines();

    with_timeout(read_until(&mut lines, "armed")).await?;
    send(&child, Signal::SIGINT)?;

    let status = with_timeout(child.wait()).await?;
    assert_eq!(status.code(), Some(128 + 2));

    with_timeout(read_until(&mut lines, "got-INT")).await?;
    Ok(())
}

#[tokio::test]
async fn signal_before_trigger_reaches_nobody() -> TestResult {
    init_tracing();

    let mut child = spawn_runmon("sleep 1; echo ready", "echo task-ran")?;
    let stdout = child.stdout.take().ok_or("no stdout")?;
    let mut lines = BufReader::new(stdout).lines();

    // Give runmon time to install its handlers before the master prints.
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;
    send(&child, Signal::SIGUSR2)?;

    with_timeout(read_until(&mut lines, "task-ran")).await?;
    let status = with_timeout(child.wait()).await?;
    assert_eq!(status.code(), Some(0));
    Ok(())
}
