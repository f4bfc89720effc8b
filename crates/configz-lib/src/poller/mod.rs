//! Bounded polling of an endpoint until it reports success
//!
//! The first attempt is immediate. Failed attempts are logged and retried
//! after a fixed interval until one succeeds, the deadline passes, or the
//! attempt cap is reached. There is no backoff and no jitter.

mod probe;


use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::error::{AttemptError, PollError};

pub use probe::ConfigzProbe;

/// Polling schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Pause between the end of a failed attempt and the next one
    pub interval: Duration,
    /// No attempt starts after this much time has elapsed
    pub timeout: Duration,
    /// Optional cap on the number of attempts
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(5),
            max_attempts: None,
        }
    }
}

/// One unit of work the poller repeats until it succeeds
#[async_trait]
pub trait Probe: Send + Sync {
    type Output: Send;

    /// Human-readable target, used in diagnostics
    fn target(&self) -> &str;

    /// Perform a single attempt
    async fn attempt(&self) -> Result<Self::Output, AttemptError>;
}

/// Runs a [`Probe`] under a [`PollPolicy`]
#[derive(Debug, Clone, Default)]
pub struct Poller {
    policy: PollPolicy,
}

impl Poller {
    pub fn new(policy: PollPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Attempt `probe` until it succeeds or the budget runs out.
    ///
    /// A timeout never yields a value: the output of a failed attempt is
    /// dropped before the next one starts.
    pub async fn poll<P: Probe + ?Sized>(&self, probe: &P) -> Result<P::Output, PollError> {
        let start = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            let error = match probe.attempt().await {
                Ok(output) => {
                    debug!(endpoint = probe.target(), attempts, "Probe succeeded");
                    return Ok(output);
                }
                Err(error) => error,
            };

            let elapsed = start.elapsed();
            let exhausted = self.attempts_exhausted(attempts) || self.deadline_passed(elapsed);
            log_failure(probe.target(), attempts, &error, exhausted);

            if exhausted {
                return Err(PollError::Timeout {
                    attempts,
                    elapsed,
                    last_error: error,
                });
            }

            sleep(self.policy.interval).await;
        }
    }

    fn attempts_exhausted(&self, attempts: u32) -> bool {
        self.policy.max_attempts.is_some_and(|max| attempts >= max)
    }

    /// True when the next attempt would start after the deadline
    fn deadline_passed(&self, elapsed: Duration) -> bool {
        elapsed + self.policy.interval > self.policy.timeout
    }
}

fn log_failure(endpoint: &str, attempt: u32, error: &AttemptError, exhausted: bool) {
    let outcome = if exhausted { "giving up" } else { "retrying" };
    match error {
        AttemptError::Transport(source) => warn!(
            endpoint,
            attempt,
            error = %source,
            "Request failed, {}",
            outcome
        ),
        AttemptError::Status { status, detail } => warn!(
            endpoint,
            attempt,
            status,
            detail = %detail,
            "Response status not 200, {}",
            outcome
        ),
    }
}
