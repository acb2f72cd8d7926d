//! Timeout validation for wait settings

use std::time::Duration;

use super::WaitError;

/// Maximum budget for any single wait or implicit lookup (5 minutes)
/// Anything longer is a misconfigured suite, not a slow page
pub const MAX_WAIT_TIMEOUT_MS: u64 = 300_000; // 5 minutes

/// Validate a millisecond setting and turn it into a `Duration`
///
/// # Arguments
/// * `name` - Setting name, used in the error message
/// * `ms` - Value in milliseconds
///
/// # Returns
/// * `Ok(Duration)` - Validated duration
/// * `Err(WaitError::InvalidConfig)` - If the value exceeds MAX_WAIT_TIMEOUT_MS
pub fn validate_wait_timeout(name: &str, ms: u64) -> Result<Duration, WaitError> {
    if ms > MAX_WAIT_TIMEOUT_MS {
        return Err(WaitError::InvalidConfig(format!(
            "{} cannot exceed {}ms ({} minutes). Received: {}ms ({:.1} minutes)",
            name,
            MAX_WAIT_TIMEOUT_MS,
            MAX_WAIT_TIMEOUT_MS / 60_000,
            ms,
            ms as f64 / 60_000.0
        )));
    }

    Ok(Duration::from_millis(ms))
}

/// Validate a poll interval against the timeout it polls within
///
/// Unlike the timeouts, an interval of zero is rejected: the loop would spin.
pub fn validate_poll_interval(name: &str, ms: u64, timeout_ms: u64) -> Result<Duration, WaitError> {
    let interval = validate_wait_timeout(name, ms)?;

    if ms == 0 {
        return Err(WaitError::InvalidConfig(format!("{name} must be positive")));
    }

    if timeout_ms > 0 && ms > timeout_ms {
        return Err(WaitError::InvalidConfig(format!(
            "{name} ({ms}ms) cannot exceed the timeout it polls within ({timeout_ms}ms)"
        )));
    }

    Ok(interval)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_values_up_to_the_cap() {
        assert_eq!(
            validate_wait_timeout("timeout_ms", MAX_WAIT_TIMEOUT_MS).unwrap(),
            Duration::from_secs(300)
        );
        assert_eq!(validate_wait_timeout("timeout_ms", 0).unwrap(), Duration::ZERO);
    }

    #[test]
    fn rejects_values_over_the_cap() {
        let err = validate_wait_timeout("timeout_ms", MAX_WAIT_TIMEOUT_MS + 1).unwrap_err();
        assert!(err.to_string().contains("timeout_ms cannot exceed 300000ms"));
    }

    #[test]
    fn poll_interval_must_be_positive_and_within_timeout() {
        assert!(validate_poll_interval("poll_interval_ms", 0, 1000).is_err());
        assert!(validate_poll_interval("poll_interval_ms", 2000, 1000).is_err());
        assert_eq!(
            validate_poll_interval("poll_interval_ms", 500, 0).unwrap(),
            Duration::from_millis(500)
        );
    }
}
