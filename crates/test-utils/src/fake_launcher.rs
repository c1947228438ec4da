use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use runmon::engine::SlotIndex;
use runmon::errors::{Result, RunmonError};
use runmon::exec::{TaskHandle, TaskLauncher};
use runmon::signals::RelaySignal;

/// What a [`FakeLauncher`] was asked to do, shared with the test body.
#[derive(Debug, Default)]
pub struct LaunchRecord {
    pub launched: Vec<SlotIndex>,
    pub signalled: Vec<(SlotIndex, RelaySignal)>,
}

/// Shared view of a [`FakeLauncher`]'s activity.
#[derive(Debug, Clone, Default)]
pub struct LaunchLog {
    inner: Arc<Mutex<LaunchRecord>>,
}

impl LaunchLog {
    pub fn launched(&self) -> Vec<SlotIndex> {
        self.inner.lock().unwrap().launched.clone()
    }

    pub fn launches_of(&self, slot: SlotIndex) -> usize {
        self.launched().into_iter().filter(|s| *s == slot).count()
    }

    pub fn signalled(&self) -> Vec<(SlotIndex, RelaySignal)> {
        self.inner.lock().unwrap().signalled.clone()
    }
}

/// A fake launcher that:
/// - records which slots were "started" and which signals were delivered
/// - never spawns a process; the test decides when a task exits by sending
///   `RuntimeEvent::TaskExited` itself
/// - fails to launch any slot listed via [`failing_slot`](Self::failing_slot).
pub struct FakeLauncher {
    log: LaunchLog,
    failing: HashSet<SlotIndex>,
    next_pid: u32,
}

impl FakeLauncher {
    pub fn new(log: LaunchLog) -> Self {
        Self {
            log,
            failing: HashSet::new(),
            next_pid: 4000,
        }
    }

    pub fn failing_slot(mut self, slot: SlotIndex) -> Self {
        self.failing.insert(slot);
        self
    }
}

impl TaskLauncher for FakeLauncher {
    fn launch(&mut self, slot: SlotIndex, command: &str) -> Result<TaskHandle> {
        if self.failing.contains(&slot) {
            return Err(RunmonError::Spawn {
                what: format!("task {slot} ('{command}')"),
                source: io::Error::from(io::ErrorKind::NotFound),
            });
        }

        self.log.inner.lock().unwrap().launched.push(slot);
        self.next_pid += 1;
        Ok(TaskHandle {
            slot,
            pid: Some(self.next_pid),
            command: command.to_string(),
        })
    }

    fn deliver(&mut self, task: &TaskHandle, signal: RelaySignal) -> Result<()> {
        self.log
            .inner
            .lock()
            .unwrap()
            .signalled
            .push((task.slot, signal));
        Ok(())
    }
}

/// In-memory stdout replacement that tests can inspect after the runtime
/// consumed its copy.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.inner.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
