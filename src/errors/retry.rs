use std::time::Duration;

use super::types::OpsError;
use tracing::{debug, warn};

/// Bounds on an interactive acquisition loop (password confirmation, username
/// validation). Replaces open-ended re-prompting.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// No pause between attempts. Used by non-interactive callers.
    pub fn immediate(max_attempts: u32) -> Self {
        Self { max_attempts, delay: Duration::ZERO }
    }
}

/// Repeat `step` until it yields a value.
///
/// `Ok(Some(v))` ends the loop, `Ok(None)` is a rejected attempt that is
/// retried after `policy.delay`, and `Err` aborts immediately. Running out of
/// attempts is a validation error.
pub fn retry_until<T, F>(operation: &str, policy: &RetryPolicy, mut step: F) -> Result<T, OpsError>
where
    F: FnMut(u32) -> Result<Option<T>, OpsError>,
{
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 0..max_attempts {
        if let Some(value) = step(attempt)? {
            debug!(operation, attempt = attempt + 1, "Accepted input");
            return Ok(value);
        }

        if attempt + 1 < max_attempts {
            warn!(operation, attempt = attempt + 1, max = max_attempts, "Input rejected, asking again");
            if !policy.delay.is_zero() {
                // Blocks the thread. Callers are prompt loops on the
                // current-thread runtime, where no other task is waiting.
                std::thread::sleep(policy.delay);
            }
        }
    }

    Err(OpsError::Validation(format!(
        "{}: no valid input after {} attempts",
        operation, max_attempts
    )))
}
