use std::time::Duration;

use thiserror::Error;

use crate::browser::DriverError;

/// Errors a wait can end with
///
/// A condition that is simply not met yet never shows up here: the polling
/// loop swallows it and tries again.
#[derive(Error, Debug)]
pub enum WaitError {
    #[error(
        "Timed out after {}ms waiting for {condition}{}",
        .timeout.as_millis(),
        last_error_suffix(.last_error)
    )]
    Timeout {
        condition: String,
        timeout: Duration,
        last_error: Option<String>,
    },

    /// The session broke underneath the wait; never retried
    #[error("Driver failure while waiting: {0}")]
    Driver(#[from] DriverError),

    #[error("Invalid wait configuration: {0}")]
    InvalidConfig(String),
}

fn last_error_suffix(last_error: &Option<String>) -> String {
    last_error
        .as_ref()
        .map(|e| format!(" (last error: {e})"))
        .unwrap_or_default()
}

impl WaitError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

pub type WaitResult<T> = Result<T, WaitError>;

/// "Did it happen" view of a raising wait
pub trait WaitResultExt {
    /// `Ok(true)` on success, `Ok(false)` on timeout, other errors unchanged
    fn timed_out_as_false(self) -> WaitResult<bool>;
}

impl<T> WaitResultExt for WaitResult<T> {
    fn timed_out_as_false(self) -> WaitResult<bool> {
        match self {
            Ok(_) => Ok(true),
            Err(err) if err.is_timeout() => Ok(false),
            Err(err) => Err(err),
        }
    }
}
