use std::{fmt::Display, future::Future};

use tracing::{debug, warn};

use super::RetryPolicy;

/// Run `op` until it succeeds, the retry budget is spent, or the predicate refuses.
///
/// Success returns at once with no delay. A refused or final failure returns the
/// latest error without waiting. Retries repeat the operation's side effects, so
/// only idempotent-tolerant operations should be wrapped. There is no timeout on
/// a single attempt; callers bound the operation themselves.
pub async fn with_retry<T, E, F, Fut>(mut op: F, policy: &RetryPolicy<E>) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt: u32 = 0;
    loop {
        let err = match op().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(operation = policy.name(), attempts = attempt + 1, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => err,
        };
        attempt += 1;

        if attempt > policy.max_retries() || !policy.should_retry(&err) {
            return Err(err);
        }

        let delay = policy.delay_for(attempt);
        warn!(
            operation = policy.name(),
            attempt,
            max_retries = policy.max_retries(),
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "retry scheduled"
        );
        policy.metrics().record_retry(policy.name());
        tokio::time::sleep(delay).await;
    }
}

/// Reusable retrying wrapper around a function of one argument.
pub struct Retrying<F, E> {
    op: F,
    policy: RetryPolicy<E>,
}

/// Bind `op` to `policy`; every [`Retrying::call`] runs it through [`with_retry`].
pub fn retrying<F, E>(op: F, policy: RetryPolicy<E>) -> Retrying<F, E> {
    Retrying { op, policy }
}

impl<F, E> Retrying<F, E> {
    pub fn policy(&self) -> &RetryPolicy<E> {
        &self.policy
    }

    /// Call the wrapped function with `arg`, cloned for every attempt.
    pub async fn call<A, T, Fut>(&self, arg: A) -> Result<T, E>
    where
        A: Clone,
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        with_retry(|| (self.op)(arg.clone()), &self.policy).await
    }
}
