use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Serializable retry tuning for one call site.
///
/// Total attempts are `max_retries + 1`. The delay before retry `k` grows as
/// `initial_delay_ms * 2^(k-1)`, is jittered by ±10% and never exceeds `max_delay_ms`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryStrategy {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryStrategy {
    pub const fn new(max_retries: u32, initial_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_retries,
            initial_delay_ms,
            max_delay_ms,
        }
    }

    /// Tuning used for rendering backend calls: 3 attempts, 500ms..2s.
    pub const fn render_backend() -> Self {
        Self::new(2, 500, 2_000)
    }

    /// Total number of attempts allowed.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.initial_delay_ms == 0 {
            return Err(ModelError::Invalid(
                "retry initialDelayMs must be positive".into(),
            ));
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(ModelError::Invalid(format!(
                "retry initialDelayMs ({}) exceeds maxDelayMs ({})",
                self.initial_delay_ms, self.max_delay_ms
            )));
        }
        Ok(())
    }
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self::new(3, 100, 3_000)
    }
}
