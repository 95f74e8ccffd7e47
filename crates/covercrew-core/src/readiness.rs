//! Readiness probe with bounded exponential backoff
//!
//! A freshly spawned runtime needs a moment before it accepts requests.
//! Rather than sleeping for a fixed time, the version endpoint is probed
//! until it answers, backing off between attempts.

use crate::error::{Error, Result};
use crate::runtime::Runtime;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Backoff parameters for the readiness probe
#[derive(Debug, Clone, PartialEq)]
pub struct ProbePolicy {
    /// Probes before giving up (at least one is always made)
    pub max_attempts: u32,
    /// Delay after the first failed probe
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Growth factor between delays
    pub multiplier: f64,
    /// Add up to 25% random jitter to each delay
    pub jitter: bool,
}

impl Default for ProbePolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(2),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl ProbePolicy {
    /// Create a policy with default parameters
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum attempts
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set initial delay
    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set maximum delay
    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the growth factor
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Enable or disable jitter
    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay to wait after failed probe number `attempt` (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let grown = self.initial_delay.as_secs_f64() * self.multiplier.max(1.0).powi(exponent);
        let capped = grown.min(self.max_delay.as_secs_f64());
        let base = Duration::from_secs_f64(capped.max(0.0));

        if self.jitter {
            base + base.mul_f64(random_fraction() * 0.25)
        } else {
            base
        }
    }
}

/// Uniform-ish value in `[0, 1)` from the std hasher's random keys
fn random_fraction() -> f64 {
    let mut hasher = RandomState::new().build_hasher();
    hasher.write_u8(0);
    (hasher.finish() >> 11) as f64 / (1u64 << 53) as f64
}

/// Probe `runtime` until it answers or the policy is exhausted.
///
/// Returns the runtime version. Non-transient errors (a server that
/// answers with a client error, an unparsable body) stop probing at once.
pub async fn wait_until_ready(runtime: &dyn Runtime, policy: &ProbePolicy) -> Result<String> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        match runtime.probe().await {
            Ok(version) => {
                info!(%version, attempts = attempt, "Runtime is ready");
                return Ok(version);
            }
            Err(e) if e.is_transient() && attempt < max_attempts => {
                let delay = policy.delay_after(attempt);
                debug!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Runtime not ready yet"
                );
                sleep(delay).await;
            }
            Err(e) => {
                warn!(attempts = attempt, error = %e, "Runtime readiness probe gave up");
                return Err(Error::RuntimeNotReady {
                    base_url: runtime.base_url(),
                    attempts: attempt,
                    last_error: e.to_string(),
                });
            }
        }
    }
}
