//! Text checks, including the variant that reloads the page between reads

use async_trait::async_trait;

use super::{Condition, gone_counts_as_met};
use crate::browser::{Driver, DriverResult, ElementHandle, Locator};

/// Text of the `index`-th element matching the locator contains `text`
#[derive(Debug, Clone)]
pub struct TextPresent {
    locator: Locator,
    index: usize,
    text: String,
}

impl TextPresent {
    pub fn new(locator: Locator, text: impl Into<String>) -> Self {
        Self::nth(locator, 0, text)
    }

    pub fn nth(locator: Locator, index: usize, text: impl Into<String>) -> Self {
        Self {
            locator,
            index,
            text: text.into(),
        }
    }
}

#[async_trait]
impl<D: Driver> Condition<D> for TextPresent {
    type Output = ();

    fn description(&self) -> String {
        if self.index == 0 {
            format!(
                "text \"{}\" to be present in element located by {}",
                self.text, self.locator
            )
        } else {
            format!(
                "text \"{}\" to be present in element {} located by {}",
                self.text, self.index, self.locator
            )
        }
    }

    async fn check(&self, driver: &D) -> DriverResult<Option<()>> {
        let elements = driver.find_elements(&self.locator).await?;
        let Some(element) = elements.get(self.index) else {
            return Ok(None);
        };
        let actual = element.text().await?;
        Ok(actual.contains(&self.text).then_some(()))
    }
}

/// Element matching the locator is gone or its text no longer contains `text`
#[derive(Debug, Clone)]
pub struct TextAbsent {
    locator: Locator,
    text: String,
}

impl TextAbsent {
    pub fn new(locator: Locator, text: impl Into<String>) -> Self {
        Self {
            locator,
            text: text.into(),
        }
    }
}

#[async_trait]
impl<D: Driver> Condition<D> for TextAbsent {
    type Output = ();

    fn description(&self) -> String {
        format!(
            "text \"{}\" to not be present in element located by {}",
            self.text, self.locator
        )
    }

    async fn check(&self, driver: &D) -> DriverResult<Option<()>> {
        let element = match driver.find_element(&self.locator).await {
            Ok(element) => element,
            Err(err) => return gone_counts_as_met(err),
        };
        match element.text().await {
            Ok(actual) => Ok((!actual.contains(&self.text)).then_some(())),
            Err(err) => gone_counts_as_met(err),
        }
    }
}

/// What [`TextPresentAfterRefresh`] reads once the page has reloaded
#[derive(Clone)]
pub enum RefreshTarget<E> {
    /// Re-located on every attempt
    Locator(Locator),
    /// Read through the same handle; goes stale if the reload replaces the node
    Element(E),
}

/// Reload the page, then check that the target's text contains `text`
///
/// For content only a server round-trip updates. Every evaluation reloads,
/// so poll it slowly.
#[derive(Clone)]
pub struct TextPresentAfterRefresh<E> {
    target: RefreshTarget<E>,
    text: String,
}

impl<E: ElementHandle> TextPresentAfterRefresh<E> {
    pub fn by_locator(locator: Locator, text: impl Into<String>) -> Self {
        Self {
            target: RefreshTarget::Locator(locator),
            text: text.into(),
        }
    }

    pub fn by_handle(element: E, text: impl Into<String>) -> Self {
        Self {
            target: RefreshTarget::Element(element),
            text: text.into(),
        }
    }
}

#[async_trait]
impl<D, E> Condition<D> for TextPresentAfterRefresh<E>
where
    D: Driver<Element = E>,
    E: ElementHandle,
{
    type Output = ();

    fn description(&self) -> String {
        let target = match &self.target {
            RefreshTarget::Locator(locator) => format!("element located by {locator}"),
            RefreshTarget::Element(element) => element.describe(),
        };
        format!(
            "text \"{}\" to be present in {} after refresh",
            self.text, target
        )
    }

    async fn check(&self, driver: &D) -> DriverResult<Option<()>> {
        driver.refresh().await?;
        let actual = match &self.target {
            RefreshTarget::Locator(locator) => driver.find_element(locator).await?.text().await?,
            RefreshTarget::Element(element) => element.text().await?,
        };
        Ok(actual.contains(&self.text).then_some(()))
    }
}
