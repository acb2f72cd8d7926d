//! Polling core shared by every wait
//!
//! Re-evaluates a [`Condition`] at a fixed interval until it is met, the
//! budget runs out, or the driver reports a failure that retrying cannot fix.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace, warn};

use super::constants::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, MIN_POLL_INTERVAL};
use super::{WaitError, WaitResult};
use crate::browser::Driver;
use crate::conditions::Condition;

/// Timing for a single wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    timeout: Duration,
    poll_interval: Duration,
}

impl WaitConfig {
    /// Build a config, clamping the interval into `[MIN_POLL_INTERVAL, timeout]`
    ///
    /// The interval never exceeds a non-zero timeout, even one shorter than
    /// the floor. A zero timeout is allowed and means "check once".
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        let mut poll_interval = poll_interval.max(MIN_POLL_INTERVAL);
        if !timeout.is_zero() {
            poll_interval = poll_interval.min(timeout);
        }
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Custom timeout, default poll interval
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(timeout, DEFAULT_POLL_INTERVAL)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

/// Runs conditions against one driver with one timing config
pub struct PollingWaiter<'d, D: Driver> {
    driver: &'d D,
    config: WaitConfig,
}

impl<'d, D: Driver> PollingWaiter<'d, D> {
    pub fn new(driver: &'d D, config: WaitConfig) -> Self {
        Self { driver, config }
    }

    pub fn config(&self) -> WaitConfig {
        self.config
    }

    /// Wait for `condition` and return what it produced
    ///
    /// # Returns
    /// * `Ok(T)` - The first value the condition produced
    /// * `Err(WaitError::Timeout)` - The budget ran out first
    /// * `Err(WaitError::Driver)` - A non-transient driver failure, returned
    ///   from the attempt that hit it
    ///
    /// # Polling Strategy
    /// - Evaluates immediately, then every `poll_interval`
    /// - The last sleep is cut short at the deadline, so a condition that
    ///   never holds times out between `timeout` and `timeout + poll_interval`
    /// - Lookup misses and stale handles count as "not yet"
    pub async fn until<C>(&self, condition: &C) -> WaitResult<C::Output>
    where
        C: Condition<D> + ?Sized,
    {
        let start = Instant::now();
        let mut attempts: u32 = 0;
        let mut last_error: Option<String> = None;

        loop {
            attempts += 1;

            match condition.check(self.driver).await {
                Ok(Some(value)) => {
                    trace!(
                        "Condition met after {} attempt(s) in {}ms",
                        attempts,
                        start.elapsed().as_millis()
                    );
                    return Ok(value);
                }
                Ok(None) => {
                    trace!("Attempt {}: condition not met yet", attempts);
                }
                Err(err) if err.is_transient() => {
                    trace!("Attempt {}: {}", attempts, err);
                    last_error = Some(err.to_string());
                }
                Err(err) => {
                    warn!(
                        "Driver failure on attempt {} while waiting for {}: {}",
                        attempts,
                        condition.description(),
                        err
                    );
                    return Err(WaitError::Driver(err));
                }
            }

            let elapsed = start.elapsed();
            if elapsed >= self.config.timeout {
                let description = condition.description();
                debug!(
                    "Gave up waiting for {} after {} attempt(s) ({}ms)",
                    description,
                    attempts,
                    elapsed.as_millis()
                );
                return Err(WaitError::Timeout {
                    condition: description,
                    timeout: self.config.timeout,
                    last_error,
                });
            }

            let remaining = self.config.timeout - elapsed;
            tokio::time::sleep(self.config.poll_interval.min(remaining)).await;
        }
    }

    /// Same loop as [`until`](Self::until), reporting a timeout as `Ok(false)`
    pub async fn holds<C>(&self, condition: &C) -> WaitResult<bool>
    where
        C: Condition<D> + ?Sized,
    {
        match self.until(condition).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_timeout() => Ok(false),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_is_clamped_to_floor_and_timeout() {
        let spin = WaitConfig::new(Duration::from_secs(1), Duration::ZERO);
        assert_eq!(spin.poll_interval(), MIN_POLL_INTERVAL);

        let long = WaitConfig::new(Duration::from_millis(200), Duration::from_secs(5));
        assert_eq!(long.poll_interval(), Duration::from_millis(200));

        let tiny = WaitConfig::new(Duration::from_millis(5), Duration::from_millis(500));
        assert_eq!(tiny.poll_interval(), Duration::from_millis(5));
        let tiny = WaitConfig::new(Duration::from_millis(5), Duration::ZERO);
        assert_eq!(tiny.poll_interval(), Duration::from_millis(5));

        let once = WaitConfig::new(Duration::ZERO, Duration::from_millis(500));
        assert_eq!(once.timeout(), Duration::ZERO);
        assert_eq!(once.poll_interval(), Duration::from_millis(500));
    }

    #[test]
    fn defaults_are_fifteen_seconds_every_half_second() {
        let config = WaitConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(
            WaitConfig::with_timeout(Duration::from_secs(3)).poll_interval(),
            Duration::from_millis(500)
        );
    }
}
