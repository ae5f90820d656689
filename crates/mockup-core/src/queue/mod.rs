//! Sequential background task queue.
//!
//! A single worker consumes a channel and awaits one task at a time, in submission
//! order. Task failures and panics are logged and counted, never propagated, and
//! never stop the worker. Tasks are not persisted: whatever is pending when the
//! process exits is lost.
mod task;
mod worker;

use std::{
    fmt::Display,
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use serde::{Deserialize, Serialize};
use tokio::sync::{Notify, mpsc};
use tracing::{debug, trace};

use crate::{
    error::CoreError,
    metrics::{MetricsHandle, noop_metrics},
};
use task::QueuedTask;

/// Sequence number assigned to every accepted task.
pub type TaskId = u64;

/// Snapshot of queue counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    /// Accepted tasks not yet started.
    pub pending: usize,
    /// True while the worker is running tasks.
    pub draining: bool,
    pub completed: u64,
    pub failed: u64,
}

#[derive(Default)]
pub(crate) struct QueueState {
    next_id: TaskId,
    pending: usize,
    draining: bool,
    completed: u64,
    failed: u64,
}

pub(crate) struct Inner {
    name: String,
    state: Mutex<QueueState>,
    idle: Notify,
    metrics: MetricsHandle,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to a single-worker FIFO executor. Cloning shares the same worker.
#[derive(Clone)]
pub struct TaskQueue {
    tx: mpsc::UnboundedSender<QueuedTask>,
    inner: Arc<Inner>,
}

impl TaskQueue {
    /// Create a queue and spawn its worker. Must be called inside a tokio runtime.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_metrics(name, noop_metrics())
    }

    /// Same as [`TaskQueue::new`] with an explicit metrics backend.
    pub fn with_metrics(name: impl Into<String>, metrics: MetricsHandle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let inner = Arc::new(Inner {
            name: name.into(),
            state: Mutex::new(QueueState::default()),
            idle: Notify::new(),
            metrics,
        });
        tokio::spawn(worker::run(Arc::clone(&inner), rx));
        debug!(queue = %inner.name, "task queue started");
        Self { tx, inner }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Enqueue a task and return without waiting for it.
    ///
    /// The future's error is logged by the worker and otherwise dropped.
    pub fn add_task<Fut, E>(&self, name: impl Into<String>, fut: Fut) -> Result<TaskId, CoreError>
    where
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let name = name.into();
        let mut state = self.inner.lock();
        let id = state.next_id;
        let task = QueuedTask::new(id, name, fut);
        let task_name = task.name.clone();

        self.tx
            .send(task)
            .map_err(|_| CoreError::QueueClosed(self.inner.name.clone()))?;

        state.next_id += 1;
        state.pending += 1;
        state.draining = true;
        drop(state);

        trace!(queue = %self.inner.name, task = %task_name, task_id = id, "task enqueued");
        self.inner.metrics.record_task_enqueued(&self.inner.name);
        Ok(id)
    }

    /// Enqueue `op(payload)`; the payload is moved into the task at enqueue time.
    pub fn add_task_with<P, F, Fut, E>(
        &self,
        name: impl Into<String>,
        payload: P,
        op: F,
    ) -> Result<TaskId, CoreError>
    where
        F: FnOnce(P) -> Fut,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        self.add_task(name, op(payload))
    }

    /// Current counters.
    pub fn stats(&self) -> QueueStats {
        let state = self.inner.lock();
        QueueStats {
            pending: state.pending,
            draining: state.draining,
            completed: state.completed,
            failed: state.failed,
        }
    }

    pub fn is_idle(&self) -> bool {
        !self.inner.lock().draining
    }

    /// Wait until every task accepted so far has finished.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_idle() {
                return;
            }
            notified.await;
        }
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("name", &self.inner.name)
            .field("stats", &self.stats())
            .finish()
    }
}
