use std::{fmt::Display, future::Future, pin::Pin};

use super::TaskId;

pub(crate) type TaskFuture = Pin<Box<dyn Future<Output = Result<(), String>> + Send>>;

/// Type-erased unit of work with its payload already captured.
pub(crate) struct QueuedTask {
    pub(crate) id: TaskId,
    pub(crate) name: String,
    pub(crate) fut: TaskFuture,
}

impl QueuedTask {
    pub(crate) fn new<Fut, E>(id: TaskId, name: String, fut: Fut) -> Self
    where
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        Self {
            id,
            name,
            fut: Box::pin(async move { fut.await.map_err(|e| e.to_string()) }),
        }
    }
}
