use thiserror::Error;

use mockup_model::ModelError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("task queue '{0}' is closed")]
    QueueClosed(String),

    #[error("model error: {0}")]
    Model(#[from] ModelError),
}
