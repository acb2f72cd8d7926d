// Wait plumbing shared by the façade and the conditions
pub mod constants;
mod errors;
mod implicit_wait;
mod polling;
mod timeout;

pub use errors::{WaitError, WaitResult, WaitResultExt};
pub use implicit_wait::{ImplicitWaitScope, with_implicit_wait};
pub use polling::{PollingWaiter, WaitConfig};
pub use timeout::{MAX_WAIT_TIMEOUT_MS, validate_poll_interval, validate_wait_timeout};
