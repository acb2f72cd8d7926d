//! Polling waits for browser UI tests
//!
//! Wraps a browser session (chromiumoxide out of the box) with waits for
//! element presence, visibility, clickability, attribute and text state,
//! viewport position and URL changes. Every wait shares one polling loop
//! and shrinks the session's implicit lookup budget while it runs.

mod browser;
pub mod conditions;
mod utils;
mod wait;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use crate::utils::constants::{
    DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, IMPLICIT_FAST_FAIL, IMPLICIT_LOOKUP,
    IMPLICIT_SESSION_DEFAULT, REFRESH_POLL_INTERVAL,
};

/// Timing settings for [`Wait`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitSettings {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Poll interval for waits that reload the page on every attempt
    #[serde(default = "default_refresh_poll_interval_ms")]
    pub refresh_poll_interval_ms: u64,

    #[serde(default)]
    pub implicit: ImplicitWaits,
}

/// Implicit lookup budgets applied around waits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplicitWaits {
    /// Restored after every wait, whatever its outcome
    #[serde(default = "default_session_default_ms")]
    pub session_default_ms: u64,

    /// In force while waiting on a locator
    #[serde(default = "default_lookup_ms")]
    pub lookup_ms: u64,

    /// In force for checks that must fail fast (attributes, text, absence)
    #[serde(default = "default_fast_fail_ms")]
    pub fast_fail_ms: u64,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}
fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}
fn default_refresh_poll_interval_ms() -> u64 {
    REFRESH_POLL_INTERVAL.as_millis() as u64
}

fn default_session_default_ms() -> u64 {
    IMPLICIT_SESSION_DEFAULT.as_millis() as u64
}

fn default_lookup_ms() -> u64 {
    IMPLICIT_LOOKUP.as_millis() as u64
}

fn default_fast_fail_ms() -> u64 {
    IMPLICIT_FAST_FAIL.as_millis() as u64
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            refresh_poll_interval_ms: default_refresh_poll_interval_ms(),
            implicit: ImplicitWaits::default(),
        }
    }
}

impl Default for ImplicitWaits {
    fn default() -> Self {
        Self {
            session_default_ms: default_session_default_ms(),
            lookup_ms: default_lookup_ms(),
            fast_fail_ms: default_fast_fail_ms(),
        }
    }
}

static DEFAULT_SETTINGS: OnceLock<WaitSettings> = OnceLock::new();

impl WaitSettings {
    /// Process-wide defaults, for waits built without explicit settings
    pub fn global_default() -> &'static WaitSettings {
        DEFAULT_SETTINGS.get_or_init(WaitSettings::default)
    }

    /// Parse and validate settings from YAML; missing keys take defaults
    pub fn from_yaml_str(contents: &str) -> WaitResult<Self> {
        let settings: WaitSettings = serde_yaml::from_str(contents)
            .map_err(|e| WaitError::InvalidConfig(format!("Failed to parse wait settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a YAML file, falling back to defaults if it does not exist
    pub fn load(path: impl AsRef<Path>) -> WaitResult<Self> {
        let path = path.as_ref();

        if path.exists() {
            let contents = fs::read_to_string(path).map_err(|e| {
                WaitError::InvalidConfig(format!("Failed to read {}: {}", path.display(), e))
            })?;
            Self::from_yaml_str(&contents)
        } else {
            tracing::debug!("No wait settings at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Check every budget against the timeout cap and the interval invariants
    pub fn validate(&self) -> WaitResult<()> {
        validate_wait_timeout("timeout_ms", self.timeout_ms)?;
        validate_poll_interval("poll_interval_ms", self.poll_interval_ms, self.timeout_ms)?;
        validate_poll_interval(
            "refresh_poll_interval_ms",
            self.refresh_poll_interval_ms,
            self.timeout_ms,
        )?;
        validate_wait_timeout("implicit.session_default_ms", self.implicit.session_default_ms)?;
        validate_wait_timeout("implicit.lookup_ms", self.implicit.lookup_ms)?;
        validate_wait_timeout("implicit.fast_fail_ms", self.implicit.fast_fail_ms)?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn refresh_poll_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_poll_interval_ms)
    }

    pub fn wait_config(&self) -> WaitConfig {
        WaitConfig::new(self.timeout(), self.poll_interval())
    }

    pub fn refresh_wait_config(&self) -> WaitConfig {
        WaitConfig::new(self.timeout(), self.refresh_poll_interval())
    }
}

impl ImplicitWaits {
    pub fn session_default(&self) -> Duration {
        Duration::from_millis(self.session_default_ms)
    }

    pub fn lookup(&self) -> Duration {
        Duration::from_millis(self.lookup_ms)
    }

    pub fn fast_fail(&self) -> Duration {
        Duration::from_millis(self.fast_fail_ms)
    }
}

pub use browser::{
    ChromiumDriver, ChromiumElement, Driver, DriverError, DriverResult, ElementHandle, Locator,
    ViewportPosition,
};
pub use conditions::{Condition, condition_fn};
pub use utils::constants;
pub use utils::{
    ImplicitWaitScope, MAX_WAIT_TIMEOUT_MS, PollingWaiter, WaitConfig, WaitError, WaitResult,
    WaitResultExt, validate_poll_interval, validate_wait_timeout, with_implicit_wait,
};
pub use wait::Wait;
