use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Whole-second countdown driving time-bounded attempts.
///
/// One recurring 1-second callback reports the remaining time; when it
/// reaches zero, `on_expire` fires exactly once and the clock stops itself.
/// Remaining time is not persisted anywhere: a restart restarts the full
/// duration.
pub struct SessionClock;

impl SessionClock {
    /// Starts the countdown and returns its cancellation handle.
    ///
    /// `on_tick` receives the remaining whole seconds after each tick;
    /// `on_expire` fires once when the countdown reaches zero, unless the
    /// handle was stopped first.
    pub fn start<T, F>(duration_secs: u64, mut on_tick: T, on_expire: F) -> TimerHandle
    where
        T: FnMut(u64) + Send + 'static,
        F: FnOnce() + Send + 'static,
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let task = tokio::spawn(async move {
            let mut remaining = duration_secs;
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of a tokio interval completes immediately.
            interval.tick().await;

            loop {
                interval.tick().await;
                if flag.load(Ordering::SeqCst) {
                    return;
                }
                remaining = remaining.saturating_sub(1);
                on_tick(remaining);
                if remaining == 0 {
                    // Re-checked so a stop that raced the final tick still
                    // suppresses expiry.
                    if !flag.load(Ordering::SeqCst) {
                        on_expire();
                    }
                    return;
                }
            }
        });

        TimerHandle { cancelled, task }
    }
}

/// Cancellation handle for a running countdown.
///
/// The owning controller disposes of it deterministically on finish; dropping
/// the handle stops the clock, so an abandoned attempt never fires expiry.
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Cancels future ticks and guarantees `on_expire` will not fire
    /// afterwards. Stopping twice is a no-op.
    pub fn stop(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            self.task.abort();
        }
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("stopped", &self.is_stopped())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
