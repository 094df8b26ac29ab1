//! Timer registration over tokio
//!
//! Tasks run on the tokio runtime; under a paused clock (`tokio::time::pause`)
//! tests advance virtual time instead of waiting.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Cancels its timer when `cancel` is called. Dropping the handle leaves the timer running.
#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Scheduler;

impl Scheduler {
    pub fn new() -> Self {
        Self
    }

    /// Run `task` every `period`, first run one period from now.
    ///
    /// Ticks do not overlap: a slow run delays the following tick.
    pub fn every<F, Fut>(&self, period: Duration, mut task: F) -> TimerHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                task().await;
            }
        });
        TimerHandle { task: handle }
    }

    /// Run `task` once after `delay`.
    pub fn after<Fut>(&self, delay: Duration, task: Fut) -> TimerHandle
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            time::sleep(delay).await;
            task.await;
        });
        TimerHandle { task: handle }
    }
}
