//! Lock timing configuration

use std::time::Duration;

use tracing::warn;

/// Tunable timing parameters for a [`Lock`](crate::Lock).
#[derive(Debug, Clone)]
pub struct LockConfig {
    /// Store-side expiry applied on acquisition, and the default renewal
    /// length (default: 10 s).
    pub timeout: Duration,
    /// Additional acquisition attempts after a failed first one (default: 6).
    pub retries: u32,
    /// Base delay between acquisition attempts (default: 50 ms).
    pub delay: Duration,
    /// Upper bound of the random backoff multiplier, must be >= 1
    /// (default: 1.2).
    pub jitter: f64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(10_000),
            retries: 6,
            delay: Duration::from_millis(50),
            jitter: 1.2,
        }
    }
}

impl LockConfig {
    /// Clamp invalid jitter values. Applied once when a lock is constructed.
    pub(crate) fn sanitized(mut self) -> Self {
        if self.jitter < 1.0 {
            warn!(jitter = self.jitter, "jitter must be >= 1, clamping to 1");
            self.jitter = 1.0;
        }
        self
    }

    /// Backoff before the next acquisition attempt: `delay` scaled by a
    /// uniform random factor in `[1, jitter]`.
    pub(crate) fn backoff_delay(&self) -> Duration {
        let factor = 1.0 + rand::random::<f64>() * (self.jitter - 1.0);
        self.delay.mul_f64(factor)
    }
}
