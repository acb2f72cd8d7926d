//! Scoped override of a session's implicit lookup budget
//!
//! The polling loop already retries. Leaving a long implicit budget in place
//! would make every single attempt block for that budget first, so waits
//! shrink it for their duration and put the session default back afterwards.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::browser::Driver;

/// RAII guard for the implicit wait
///
/// Sets the budget on creation and restores `restore_to` on drop: normal
/// return, `?` propagation, panic unwinding, or the enclosing future being
/// dropped mid-wait.
#[must_use = "the implicit wait is restored as soon as the scope is dropped"]
pub struct ImplicitWaitScope<'d, D: Driver> {
    driver: &'d D,
    restore_to: Duration,
}

impl<'d, D: Driver> ImplicitWaitScope<'d, D> {
    pub fn enter(driver: &'d D, budget: Duration, restore_to: Duration) -> Self {
        debug!(
            "Implicit wait set to {}ms (restores to {}ms)",
            budget.as_millis(),
            restore_to.as_millis()
        );
        driver.set_implicit_wait(budget);
        Self { driver, restore_to }
    }
}

impl<D: Driver> Drop for ImplicitWaitScope<'_, D> {
    fn drop(&mut self) {
        self.driver.set_implicit_wait(self.restore_to);
        debug!("Implicit wait restored to {}ms", self.restore_to.as_millis());
    }
}

/// Run `body` with the implicit wait set to `budget`
///
/// # Arguments
/// * `driver` - Session whose implicit wait is overridden
/// * `budget` - Implicit wait in force while `body` runs
/// * `restore_to` - Value put back on every exit path
/// * `body` - Work to run inside the scope
pub async fn with_implicit_wait<D, F, Fut, T>(
    driver: &D,
    budget: Duration,
    restore_to: Duration,
    body: F,
) -> T
where
    D: Driver,
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    let _scope = ImplicitWaitScope::enter(driver, budget, restore_to);
    body().await
}
