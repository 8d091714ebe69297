// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Task scheduling with cancellation handles
//!
//! Every coordinator owns an [`Epoch`]. Spawning a task captures the current epoch
//! value; cancelling advances it and aborts the task. A task that still manages to
//! run after cancellation (a callback already in flight) sees a stale epoch and
//! discards its work.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

/// Generation counter shared by a coordinator and its tasks
#[derive(Debug, Clone, Default)]
pub struct Epoch(Arc<AtomicU64>);

impl Epoch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    /// Invalidate every guard issued so far
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn guard(&self) -> EpochGuard {
        EpochGuard {
            epoch: self.clone(),
            issued: self.current(),
        }
    }
}

/// Snapshot of an epoch taken when a task was spawned
#[derive(Debug, Clone)]
pub struct EpochGuard {
    epoch: Epoch,
    issued: u64,
}

impl EpochGuard {
    pub fn is_current(&self) -> bool {
        self.epoch.current() == self.issued
    }
}

/// Cancellation handle for a spawned task. Dropping it cancels the task.
#[derive(Debug)]
pub struct TaskHandle {
    name: &'static str,
    epoch: Epoch,
    join: Option<JoinHandle<()>>,
}

impl TaskHandle {
    fn new(name: &'static str, epoch: Epoch, join: JoinHandle<()>) -> Self {
        Self {
            name,
            epoch,
            join: Some(join),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Task still scheduled
    pub fn is_live(&self) -> bool {
        self.join.as_ref().map(|j| !j.is_finished()).unwrap_or(false)
    }

    /// Advance the epoch, then abort. Safe to call repeatedly.
    pub fn cancel(&mut self) {
        if let Some(join) = self.join.take() {
            self.epoch.advance();
            join.abort();
            debug!("Cancelled task '{}'", self.name);
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Run `tick` every `period`, first call one period from now
pub fn spawn_repeating<F>(name: &'static str, epoch: &Epoch, period: Duration, mut tick: F) -> TaskHandle
where
    F: FnMut() + Send + 'static,
{
    let guard = epoch.guard();
    let join = tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if !guard.is_current() {
                break;
            }
            tick();
        }
    });
    debug!("Scheduled task '{}' with period {:?}", name, period);
    TaskHandle::new(name, epoch.clone(), join)
}

/// Spawn a task that receives its epoch guard
pub fn spawn_guarded<F, Fut>(name: &'static str, epoch: &Epoch, task: F) -> TaskHandle
where
    F: FnOnce(EpochGuard) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    let join = tokio::spawn(task(epoch.guard()));
    debug!("Spawned task '{}'", name);
    TaskHandle::new(name, epoch.clone(), join)
}
