// src/engine/timer.rs

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::debug;

use crate::engine::RuntimeEvent;

/// Handle to the optional startup-match timer.
///
/// When armed, a background task sleeps for the configured duration and then
/// sends [`RuntimeEvent::StartupTimerFired`]. Cancelling is idempotent:
/// cancelling a timer that already fired or was already cancelled does
/// nothing. An expiry that was queued before the cancel is absorbed by the
/// core's one-shot trigger.
#[derive(Debug, Default)]
pub struct StartupTimer {
    handle: Option<JoinHandle<()>>,
}

impl StartupTimer {
    /// A timer that will never fire.
    pub fn disarmed() -> Self {
        Self { handle: None }
    }

    pub fn arm(duration: Duration, runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        debug!(timeout_ms = duration.as_millis() as u64, "arming startup match timer");
        let handle = tokio::spawn(async move {
            sleep(duration).await;
            let _ = runtime_tx.send(RuntimeEvent::StartupTimerFired).await;
        });
        Self {
            handle: Some(handle),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                debug!("cancelling startup match timer");
            }
            handle.abort();
        }
    }
}

impl Drop for StartupTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fires_after_duration() {
        let (tx, mut rx) = mpsc::channel(4);
        let timer = StartupTimer::arm(Duration::from_millis(50), tx);
        assert!(timer.is_armed());

        assert_eq!(rx.recv().await, Some(RuntimeEvent::StartupTimerFired));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_is_idempotent_and_suppresses_expiry() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut timer = StartupTimer::arm(Duration::from_millis(50), tx);

        timer.cancel();
        timer.cancel();
        assert!(!timer.is_armed());

        tokio::time::advance(Duration::from_millis(100)).await;
        // The aborted task dropped the only sender.
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn disarmed_timer_cancels_as_noop() {
        let mut timer = StartupTimer::disarmed();
        assert!(!timer.is_armed());
        timer.cancel();
    }
}
