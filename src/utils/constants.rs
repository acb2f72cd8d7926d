//! Shared defaults for wait timing
//!
//! Values match what the UI suites have always run with, so a wait built
//! from defaults behaves the same as the hand-tuned helpers it replaces.

use std::time::Duration;

/// Overall budget for a wait when the caller does not pick one
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Delay between condition evaluations
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Delay between evaluations of conditions that reload the page
///
/// Reloading every half second just keeps the page permanently loading.
pub const REFRESH_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Floor for any poll interval; a wait never busy-spins
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Implicit lookup budget a session returns to after every wait
pub const IMPLICIT_SESSION_DEFAULT: Duration = Duration::from_secs(15);

/// Implicit budget while waiting on a locator
///
/// Short but nonzero so an element attached just after the lookup started is
/// still picked up.
pub const IMPLICIT_LOOKUP: Duration = Duration::from_millis(250);

/// Implicit budget for checks that must fail fast and let the poll loop retry
pub const IMPLICIT_FAST_FAIL: Duration = Duration::ZERO;
