//! Retry of a single fallible async operation with exponential, jittered backoff.
//!
//! Attempts for one call are strictly sequential; independent calls share no state.
//! On final failure only the error of the last attempt is returned, earlier ones are dropped.
mod executor;
mod policy;

pub use executor::{Retrying, retrying, with_retry};
pub use policy::{JITTER_MAX, JITTER_MIN, MIN_DELAY, RetryPolicy};
