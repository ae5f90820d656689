use std::{fmt, sync::Arc, time::Duration};

use mockup_model::RetryStrategy;
use rand::Rng;

use crate::{
    error::CoreError,
    metrics::{MetricsHandle, noop_metrics},
};

/// Lower bound of the multiplicative jitter factor.
pub const JITTER_MIN: f64 = 0.9;
/// Upper bound of the multiplicative jitter factor.
pub const JITTER_MAX: f64 = 1.1;

/// Shortest delay a policy accepts; smaller values are raised to it.
pub const MIN_DELAY: Duration = Duration::from_millis(1);

/// Largest exponent applied to the initial delay; beyond it the cap always wins.
const MAX_EXPONENT: u32 = 30;

type ShouldRetry<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Retry tuning plus a predicate classifying errors as retryable.
///
/// Defaults: 3 retries, 100ms initial delay, 3s cap, every error retryable.
/// The initial delay is always at least [`MIN_DELAY`] and never above the cap.
pub struct RetryPolicy<E> {
    name: &'static str,
    max_retries: u32,
    initial_delay: Duration,
    max_delay: Duration,
    /// `None` retries every error.
    should_retry: Option<ShouldRetry<E>>,
    metrics: MetricsHandle,
}

impl<E> RetryPolicy<E> {
    /// Build a policy from serializable tuning; errors are always retried.
    ///
    /// Fails when the strategy has a zero initial delay or an initial delay above the cap.
    pub fn from_strategy(strategy: &RetryStrategy) -> Result<Self, CoreError> {
        strategy.validate()?;
        Ok(Self::from_checked(strategy))
    }

    /// `strategy` must already pass [`RetryStrategy::validate`].
    pub(crate) fn from_checked(strategy: &RetryStrategy) -> Self {
        Self {
            name: "operation",
            max_retries: strategy.max_retries,
            initial_delay: Duration::from_millis(strategy.initial_delay_ms),
            max_delay: Duration::from_millis(strategy.max_delay_ms),
            should_retry: None,
            metrics: noop_metrics(),
        }
    }

    /// Operation name used in log lines and metric labels.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the first retry delay; the cap is raised to it when lower.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay.max(MIN_DELAY);
        self.max_delay = self.max_delay.max(self.initial_delay);
        self
    }

    /// Set the delay cap; the initial delay is lowered to it when higher.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay.max(MIN_DELAY);
        self.initial_delay = self.initial_delay.min(self.max_delay);
        self
    }

    /// Replace the retry predicate. Returning `false` fails the call immediately.
    pub fn with_should_retry<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.should_retry = Some(Arc::new(predicate));
        self
    }

    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    pub(crate) fn metrics(&self) -> &MetricsHandle {
        &self.metrics
    }

    /// Whether `err` may be retried according to the predicate.
    pub fn should_retry(&self, err: &E) -> bool {
        self.should_retry.as_ref().is_none_or(|retry| retry(err))
    }

    /// Delay after `attempt` failed attempts (1-based) for a given jitter factor.
    ///
    /// `min(max_delay, initial_delay * 2^(attempt-1) * jitter)`.
    pub fn delay_with_jitter(&self, attempt: u32, jitter: f64) -> Duration {
        let exp = attempt.saturating_sub(1).min(MAX_EXPONENT);
        let base = self.initial_delay.as_secs_f64() * f64::from(1u32 << exp);
        Duration::try_from_secs_f64(base * jitter)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Delay after `attempt` failed attempts with jitter drawn from `[0.9, 1.1]`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let jitter = rand::thread_rng().gen_range(JITTER_MIN..=JITTER_MAX);
        self.delay_with_jitter(attempt, jitter)
    }
}

impl<E> Default for RetryPolicy<E> {
    fn default() -> Self {
        Self::from_checked(&RetryStrategy::default())
    }
}

impl<E> Clone for RetryPolicy<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            max_retries: self.max_retries,
            initial_delay: self.initial_delay,
            max_delay: self.max_delay,
            should_retry: self.should_retry.clone(),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<E> fmt::Debug for RetryPolicy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("name", &self.name)
            .field("max_retries", &self.max_retries)
            .field("initial_delay", &self.initial_delay)
            .field("max_delay", &self.max_delay)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy<()> {
        RetryPolicy::default()
            .with_initial_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_millis(2_000))
    }

    #[test]
    fn defaults_match_strategy() {
        let p: RetryPolicy<()> = RetryPolicy::default();
        assert_eq!(p.max_retries(), 3);
        assert_eq!(p.initial_delay(), Duration::from_millis(100));
        assert_eq!(p.max_delay(), Duration::from_millis(3_000));
        assert!(p.should_retry(&()));
    }

    #[test]
    fn delay_grows_exponentially() {
        let p = policy();
        assert_eq!(p.delay_with_jitter(1, 1.0), Duration::from_millis(100));
        assert_eq!(p.delay_with_jitter(2, 1.0), Duration::from_millis(200));
        assert_eq!(p.delay_with_jitter(3, 1.0), Duration::from_millis(400));
    }

    #[test]
    fn delay_is_capped() {
        let p = policy();
        assert_eq!(p.delay_with_jitter(6, 1.1), Duration::from_millis(2_000));
        assert_eq!(p.delay_with_jitter(u32::MAX, 1.1), Duration::from_millis(2_000));
    }

    #[test]
    fn invalid_strategies_are_rejected() {
        assert!(matches!(
            RetryPolicy::<()>::from_strategy(&RetryStrategy::new(2, 500, 100)),
            Err(CoreError::Model(_))
        ));
        assert!(matches!(
            RetryPolicy::<()>::from_strategy(&RetryStrategy::new(2, 0, 100)),
            Err(CoreError::Model(_))
        ));
        let p = RetryPolicy::<()>::from_strategy(&RetryStrategy::new(2, 100, 500)).unwrap();
        assert_eq!(p.initial_delay(), Duration::from_millis(100));
        assert_eq!(p.max_delay(), Duration::from_millis(500));
    }

    #[test]
    fn builders_keep_initial_within_cap() {
        let p: RetryPolicy<()> = RetryPolicy::default()
            .with_initial_delay(Duration::from_millis(500))
            .with_max_delay(Duration::from_millis(100));
        assert!(p.initial_delay() <= p.max_delay());
        for _ in 0..50 {
            let d = p.delay_for(1);
            assert!(d >= p.initial_delay().mul_f64(JITTER_MIN), "{d:?}");
            assert!(d <= p.max_delay(), "{d:?}");
        }

        let p: RetryPolicy<()> = RetryPolicy::default().with_initial_delay(Duration::from_secs(5));
        assert_eq!(p.max_delay(), Duration::from_secs(5));
    }

    #[test]
    fn zero_delays_are_raised_to_minimum() {
        let p: RetryPolicy<()> = RetryPolicy::default().with_initial_delay(Duration::ZERO);
        assert_eq!(p.initial_delay(), MIN_DELAY);
        assert!(p.delay_for(1) >= MIN_DELAY.mul_f64(JITTER_MIN));

        let p: RetryPolicy<()> = RetryPolicy::default().with_max_delay(Duration::ZERO);
        assert_eq!(p.max_delay(), MIN_DELAY);
        assert_eq!(p.initial_delay(), MIN_DELAY);
    }

    #[test]
    fn jittered_delay_within_bounds() {
        let p = policy();
        for attempt in 1..=5u32 {
            let base = 100.0 * f64::from(1u32 << (attempt - 1));
            for _ in 0..50 {
                let ms = p.delay_for(attempt).as_secs_f64() * 1000.0;
                assert!(ms >= (base * JITTER_MIN).min(2_000.0) - 1e-6, "attempt {attempt}: {ms}");
                assert!(ms <= (base * JITTER_MAX).min(2_000.0) + 1e-6, "attempt {attempt}: {ms}");
            }
        }
    }
}
