//! A named slot holding at most one running interval task.
//!
//! Starting a slot that is already running cancels the old task first, so
//! restarting can never leak a second interval. Dropping the slot cancels
//! whatever is running.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace};

/// Owns the handle of one repeating background task.
#[derive(Debug)]
pub struct IntervalSlot {
    name: &'static str,
    handle: Option<JoinHandle<()>>,
    starts: u64,
}

impl IntervalSlot {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            handle: None,
            starts: 0,
        }
    }

    /// Runs `on_tick` every `period`, first firing one period from now.
    ///
    /// Cancels any task already running in this slot. Missed ticks are
    /// skipped rather than replayed in a burst.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn restart<F>(&mut self, period: Duration, mut on_tick: F)
    where
        F: FnMut() + Send + 'static,
    {
        let replaced = self.cancel();
        self.starts += 1;

        let name = self.name;
        self.handle = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                trace!(slot = name, "interval tick");
                on_tick();
            }
        }));

        debug!(
            slot = self.name,
            period_ms = period.as_millis() as u64,
            replaced,
            "interval started"
        );
    }

    /// Stops the running task. Returns `true` if one was running.
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                let was_running = !handle.is_finished();
                handle.abort();
                was_running
            }
            None => false,
        }
    }

    /// Whether a task is currently running in this slot.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// How many times the slot has been (re)started.
    pub fn starts(&self) -> u64 {
        self.starts
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for IntervalSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn counter() -> (Arc<AtomicU32>, impl FnMut() + Send + 'static) {
        let count = Arc::new(AtomicU32::new(0));
        let inner = Arc::clone(&count);
        (count, move || {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_fires_every_period() {
        let mut slot = IntervalSlot::new("test");
        let (count, tick) = counter();

        slot.restart(Duration::from_millis(100), tick);
        time::sleep(Duration::from_millis(350)).await;
        tokio::task::yield_now().await;

        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(slot.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_cancels_previous_task() {
        let mut slot = IntervalSlot::new("test");
        let (count, tick_a) = counter();
        let tick_b = {
            let count = Arc::clone(&count);
            move || {
                count.fetch_add(1, Ordering::SeqCst);
            }
        };

        slot.restart(Duration::from_millis(100), tick_a);
        slot.restart(Duration::from_millis(100), tick_b);
        time::sleep(Duration::from_millis(250)).await;
        tokio::task::yield_now().await;

        // One task ticking twice, not two tasks.
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(slot.starts(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticks() {
        let mut slot = IntervalSlot::new("test");
        let (count, tick) = counter();

        slot.restart(Duration::from_millis(100), tick);
        time::sleep(Duration::from_millis(150)).await;
        tokio::task::yield_now().await;
        assert!(slot.cancel());
        time::sleep(Duration::from_millis(500)).await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!slot.is_running());
        assert!(!slot.cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_task() {
        let (count, tick) = counter();
        {
            let mut slot = IntervalSlot::new("test");
            slot.restart(Duration::from_millis(100), tick);
        }
        time::sleep(Duration::from_millis(500)).await;

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
