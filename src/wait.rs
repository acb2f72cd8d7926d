//! `Wait` façade: one method per thing a UI test usually waits for
//!
//! Each method runs the shared polling loop inside an implicit-wait scope
//! sized for the check it performs, then hands the session its default back.

use std::time::Duration;

use crate::WaitSettings;
use crate::browser::{Driver, Locator};
use crate::conditions::{
    AttributeContains, AttributeLacks, Condition, ElementClickable, ElementHandleClickable,
    ElementHandleInvisible, ElementHandleVisible, ElementInViewport, ElementInvisible,
    ElementNotPresent, ElementPresent, ElementVisible, TextAbsent, TextPresent,
    TextPresentAfterRefresh, UrlContains,
};
use crate::utils::{ImplicitWaitScope, PollingWaiter, WaitConfig, WaitResult};

/// Waits against one driver session
///
/// Cheap to copy; the builders return an adjusted copy and leave the
/// original untouched.
///
/// # Example
/// ```rust,ignore
/// let wait = Wait::new(&driver, &settings);
/// let button = wait.for_element_clickable(&Locator::id("submit")).await?;
/// wait.at_most(Duration::from_secs(30))
///     .for_text_in_element(&Locator::css(".status"), "Done")
///     .await?;
/// ```
pub struct Wait<'d, D: Driver> {
    driver: &'d D,
    settings: &'d WaitSettings,
    config: WaitConfig,
}

impl<D: Driver> Clone for Wait<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: Driver> Copy for Wait<'_, D> {}

impl<'d, D: Driver> Wait<'d, D> {
    pub fn new(driver: &'d D, settings: &'d WaitSettings) -> Self {
        Self {
            driver,
            settings,
            config: settings.wait_config(),
        }
    }

    /// Wait using the built-in defaults (15s timeout, 500ms polling)
    pub fn with_defaults(driver: &'d D) -> Self {
        Self::new(driver, WaitSettings::global_default())
    }

    /// Cap how long each wait may take
    #[must_use]
    pub fn at_most(mut self, timeout: Duration) -> Self {
        self.config = WaitConfig::new(timeout, self.config.poll_interval());
        self
    }

    /// Change how often conditions are re-evaluated
    #[must_use]
    pub fn every(mut self, poll_interval: Duration) -> Self {
        self.config = WaitConfig::new(self.config.timeout(), poll_interval);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: WaitConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> WaitConfig {
        self.config
    }

    pub fn driver(&self) -> &'d D {
        self.driver
    }

    /// Wait for any condition without touching the implicit wait
    pub async fn until<C>(&self, condition: &C) -> WaitResult<C::Output>
    where
        C: Condition<D> + ?Sized,
    {
        PollingWaiter::new(self.driver, self.config).until(condition).await
    }

    /// Like [`until`](Self::until), with the implicit wait set to `implicit`
    /// for the duration
    pub async fn until_with_implicit<C>(
        &self,
        condition: &C,
        implicit: Duration,
    ) -> WaitResult<C::Output>
    where
        C: Condition<D> + ?Sized,
    {
        self.scoped(condition, implicit, self.config).await
    }

    /// Whether `condition` held before the timeout; only driver failures are errors
    pub async fn holds<C>(&self, condition: &C) -> WaitResult<bool>
    where
        C: Condition<D> + ?Sized,
    {
        PollingWaiter::new(self.driver, self.config).holds(condition).await
    }

    /// Like [`holds`](Self::holds), with the implicit wait set to `implicit`
    pub async fn holds_with_implicit<C>(
        &self,
        condition: &C,
        implicit: Duration,
    ) -> WaitResult<bool>
    where
        C: Condition<D> + ?Sized,
    {
        let _scope = self.scope(implicit);
        PollingWaiter::new(self.driver, self.config).holds(condition).await
    }

    fn scope(&self, implicit: Duration) -> ImplicitWaitScope<'d, D> {
        ImplicitWaitScope::enter(self.driver, implicit, self.settings.implicit.session_default())
    }

    async fn scoped<C>(
        &self,
        condition: &C,
        implicit: Duration,
        config: WaitConfig,
    ) -> WaitResult<C::Output>
    where
        C: Condition<D> + ?Sized,
    {
        let _scope = self.scope(implicit);
        PollingWaiter::new(self.driver, config).until(condition).await
    }

    fn lookup(&self) -> Duration {
        self.settings.implicit.lookup()
    }

    fn fast_fail(&self) -> Duration {
        self.settings.implicit.fast_fail()
    }

    /// Element is attached to the DOM
    pub async fn for_element_present(&self, locator: &Locator) -> WaitResult<D::Element> {
        self.until_with_implicit(&ElementPresent::new(locator.clone()), self.lookup())
            .await
    }

    /// Element is displayed and enabled
    pub async fn for_element_clickable(&self, locator: &Locator) -> WaitResult<D::Element> {
        self.until_with_implicit(&ElementClickable::new(locator.clone()), self.lookup())
            .await
    }

    pub async fn for_element_handle_clickable(
        &self,
        element: &D::Element,
    ) -> WaitResult<D::Element> {
        self.until_with_implicit(&ElementHandleClickable::new(element.clone()), self.fast_fail())
            .await
    }

    pub async fn for_element_visible(&self, locator: &Locator) -> WaitResult<D::Element> {
        self.until_with_implicit(&ElementVisible::new(locator.clone()), self.lookup())
            .await
    }

    pub async fn for_element_handle_visible(&self, element: &D::Element) -> WaitResult<D::Element> {
        self.until_with_implicit(&ElementHandleVisible::new(element.clone()), self.lookup())
            .await
    }

    /// Element is hidden or not in the DOM at all
    pub async fn for_element_not_visible(&self, locator: &Locator) -> WaitResult<()> {
        self.until_with_implicit(&ElementInvisible::new(locator.clone()), self.lookup())
            .await
    }

    pub async fn for_element_handle_not_visible(&self, element: &D::Element) -> WaitResult<()> {
        self.until_with_implicit(&ElementHandleInvisible::new(element.clone()), self.lookup())
            .await
    }

    pub async fn for_element_in_viewport(&self, element: &D::Element) -> WaitResult<()> {
        self.until_with_implicit(&ElementInViewport::new(element.clone()), self.lookup())
            .await
    }

    pub async fn for_element_not_present(&self, locator: &Locator) -> WaitResult<()> {
        self.until_with_implicit(&ElementNotPresent::new(locator.clone()), self.fast_fail())
            .await
    }

    pub async fn for_attribute_to_contain(
        &self,
        element: &D::Element,
        attribute: &str,
        value: &str,
    ) -> WaitResult<()> {
        let condition = AttributeContains::new(element.clone(), attribute, value);
        self.until_with_implicit(&condition, self.fast_fail()).await
    }

    pub async fn for_attribute_to_lack(
        &self,
        element: &D::Element,
        attribute: &str,
        value: &str,
    ) -> WaitResult<()> {
        let condition = AttributeLacks::new(element.clone(), attribute, value);
        self.until_with_implicit(&condition, self.fast_fail()).await
    }

    pub async fn for_text_in_element(&self, locator: &Locator, text: &str) -> WaitResult<()> {
        self.until_with_implicit(&TextPresent::new(locator.clone(), text), self.fast_fail())
            .await
    }

    /// Text of the `index`-th match (zero-based) contains `text`
    pub async fn for_text_in_nth_element(
        &self,
        locator: &Locator,
        index: usize,
        text: &str,
    ) -> WaitResult<()> {
        self.until_with_implicit(&TextPresent::nth(locator.clone(), index, text), self.fast_fail())
            .await
    }

    pub async fn for_text_not_in_element(&self, locator: &Locator, text: &str) -> WaitResult<()> {
        self.until_with_implicit(&TextAbsent::new(locator.clone(), text), self.fast_fail())
            .await
    }

    /// Reload until the element's text contains `text`
    ///
    /// Polls at the slower refresh interval regardless of [`every`](Self::every).
    pub async fn for_text_after_refresh(&self, locator: &Locator, text: &str) -> WaitResult<()> {
        let condition = TextPresentAfterRefresh::<D::Element>::by_locator(locator.clone(), text);
        self.scoped(&condition, self.fast_fail(), self.refresh_config())
            .await
    }

    /// Reload until the handle's text contains `text`
    ///
    /// Only useful when the reload keeps the node alive (for example a
    /// frame-scoped refresh); otherwise every attempt sees a stale handle.
    pub async fn for_text_in_handle_after_refresh(
        &self,
        element: &D::Element,
        text: &str,
    ) -> WaitResult<()> {
        let condition = TextPresentAfterRefresh::by_handle(element.clone(), text);
        self.scoped(&condition, self.fast_fail(), self.config).await
    }

    /// URL contains `fragment`; no element lookup, so the implicit wait is left alone
    pub async fn for_url_contains(&self, fragment: &str) -> WaitResult<()> {
        self.until(&UrlContains::new(fragment)).await
    }

    fn refresh_config(&self) -> WaitConfig {
        WaitConfig::new(self.config.timeout(), self.settings.refresh_poll_interval())
    }
}
