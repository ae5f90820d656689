use std::{sync::Arc, time::Instant};

use tokio::sync::mpsc;
use tracing::{debug, error};

use super::{Inner, task::QueuedTask};
use crate::metrics::TaskOutcome;

/// Drain loop: the only place tasks run, so at most one executes at a time.
pub(crate) async fn run(inner: Arc<Inner>, mut rx: mpsc::UnboundedReceiver<QueuedTask>) {
    while let Some(task) = rx.recv().await {
        inner.lock().pending -= 1;

        let QueuedTask { id, name, fut } = task;
        let started = Instant::now();
        debug!(queue = %inner.name, task = %name, task_id = id, "task started");

        // Spawned so that a panic surfaces as a JoinError instead of killing the worker.
        let outcome = match tokio::spawn(fut).await {
            Ok(Ok(())) => {
                debug!(queue = %inner.name, task = %name, task_id = id, "task completed");
                TaskOutcome::Success
            }
            Ok(Err(reason)) => {
                error!(queue = %inner.name, task = %name, task_id = id, error = %reason, "task failed");
                TaskOutcome::Failure
            }
            Err(join) => {
                error!(queue = %inner.name, task = %name, task_id = id, error = %join, "task panicked");
                TaskOutcome::Panicked
            }
        };
        let duration_ms = started.elapsed().as_millis() as u64;
        inner
            .metrics
            .record_task_completed(&inner.name, outcome, duration_ms);

        let mut state = inner.lock();
        match outcome {
            TaskOutcome::Success => state.completed += 1,
            TaskOutcome::Failure | TaskOutcome::Panicked => state.failed += 1,
        }
        if state.pending == 0 {
            state.draining = false;
            drop(state);
            debug!(queue = %inner.name, "task queue idle");
            inner.idle.notify_waiters();
        }
    }
    debug!(queue = %inner.name, "task queue stopped");
}
