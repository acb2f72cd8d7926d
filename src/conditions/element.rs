//! Element presence, visibility, clickability, position and attribute checks

use async_trait::async_trait;

use super::{Condition, gone_counts_as_met};
use crate::browser::{Driver, DriverResult, ElementHandle, Locator};

/// Element matching the locator is attached to the DOM
#[derive(Debug, Clone)]
pub struct ElementPresent {
    locator: Locator,
}

impl ElementPresent {
    pub fn new(locator: Locator) -> Self {
        Self { locator }
    }
}

#[async_trait]
impl<D: Driver> Condition<D> for ElementPresent {
    type Output = D::Element;

    fn description(&self) -> String {
        format!("presence of element located by {}", self.locator)
    }

    async fn check(&self, driver: &D) -> DriverResult<Option<D::Element>> {
        Ok(Some(driver.find_element(&self.locator).await?))
    }
}

/// Element matching the locator is present and displayed
#[derive(Debug, Clone)]
pub struct ElementVisible {
    locator: Locator,
}

impl ElementVisible {
    pub fn new(locator: Locator) -> Self {
        Self { locator }
    }
}

#[async_trait]
impl<D: Driver> Condition<D> for ElementVisible {
    type Output = D::Element;

    fn description(&self) -> String {
        format!("visibility of element located by {}", self.locator)
    }

    async fn check(&self, driver: &D) -> DriverResult<Option<D::Element>> {
        let element = driver.find_element(&self.locator).await?;
        Ok(element.is_displayed().await?.then_some(element))
    }
}

/// An already-located element is displayed
#[derive(Clone)]
pub struct ElementHandleVisible<E> {
    element: E,
}

impl<E: ElementHandle> ElementHandleVisible<E> {
    pub fn new(element: E) -> Self {
        Self { element }
    }
}

#[async_trait]
impl<D, E> Condition<D> for ElementHandleVisible<E>
where
    D: Driver<Element = E>,
    E: ElementHandle,
{
    type Output = E;

    fn description(&self) -> String {
        format!("visibility of {}", self.element.describe())
    }

    async fn check(&self, _driver: &D) -> DriverResult<Option<E>> {
        Ok(self
            .element
            .is_displayed()
            .await?
            .then(|| self.element.clone()))
    }
}

/// Element matching the locator is displayed and enabled
#[derive(Debug, Clone)]
pub struct ElementClickable {
    locator: Locator,
}

impl ElementClickable {
    pub fn new(locator: Locator) -> Self {
        Self { locator }
    }
}

async fn clickable<E: ElementHandle>(element: &E) -> DriverResult<bool> {
    Ok(element.is_displayed().await? && element.is_enabled().await?)
}

#[async_trait]
impl<D: Driver> Condition<D> for ElementClickable {
    type Output = D::Element;

    fn description(&self) -> String {
        format!("element to be clickable: {}", self.locator)
    }

    async fn check(&self, driver: &D) -> DriverResult<Option<D::Element>> {
        let element = driver.find_element(&self.locator).await?;
        Ok(clickable(&element).await?.then_some(element))
    }
}

/// An already-located element is displayed and enabled
#[derive(Clone)]
pub struct ElementHandleClickable<E> {
    element: E,
}

impl<E: ElementHandle> ElementHandleClickable<E> {
    pub fn new(element: E) -> Self {
        Self { element }
    }
}

#[async_trait]
impl<D, E> Condition<D> for ElementHandleClickable<E>
where
    D: Driver<Element = E>,
    E: ElementHandle,
{
    type Output = E;

    fn description(&self) -> String {
        format!("{} to be clickable", self.element.describe())
    }

    async fn check(&self, _driver: &D) -> DriverResult<Option<E>> {
        Ok(clickable(&self.element)
            .await?
            .then(|| self.element.clone()))
    }
}

/// No element matching the locator is displayed
///
/// Holds when the element is hidden, missing, or went stale between lookup
/// and the visibility check.
#[derive(Debug, Clone)]
pub struct ElementInvisible {
    locator: Locator,
}

impl ElementInvisible {
    pub fn new(locator: Locator) -> Self {
        Self { locator }
    }
}

#[async_trait]
impl<D: Driver> Condition<D> for ElementInvisible {
    type Output = ();

    fn description(&self) -> String {
        format!("element to no longer be visible: {}", self.locator)
    }

    async fn check(&self, driver: &D) -> DriverResult<Option<()>> {
        let element = match driver.find_element(&self.locator).await {
            Ok(element) => element,
            Err(err) => return gone_counts_as_met(err),
        };
        match element.is_displayed().await {
            Ok(displayed) => Ok((!displayed).then_some(())),
            Err(err) => gone_counts_as_met(err),
        }
    }
}

/// An already-located element is hidden or detached
#[derive(Clone)]
pub struct ElementHandleInvisible<E> {
    element: E,
}

impl<E: ElementHandle> ElementHandleInvisible<E> {
    pub fn new(element: E) -> Self {
        Self { element }
    }
}

#[async_trait]
impl<D, E> Condition<D> for ElementHandleInvisible<E>
where
    D: Driver<Element = E>,
    E: ElementHandle,
{
    type Output = ();

    fn description(&self) -> String {
        format!("invisibility of {}", self.element.describe())
    }

    async fn check(&self, _driver: &D) -> DriverResult<Option<()>> {
        match self.element.is_displayed().await {
            Ok(displayed) => Ok((!displayed).then_some(())),
            Err(err) => gone_counts_as_met(err),
        }
    }
}

/// Nothing in the DOM matches the locator
#[derive(Debug, Clone)]
pub struct ElementNotPresent {
    locator: Locator,
}

impl ElementNotPresent {
    pub fn new(locator: Locator) -> Self {
        Self { locator }
    }
}

#[async_trait]
impl<D: Driver> Condition<D> for ElementNotPresent {
    type Output = ();

    fn description(&self) -> String {
        format!("element to not be present: {}", self.locator)
    }

    async fn check(&self, driver: &D) -> DriverResult<Option<()>> {
        let found = driver.find_elements(&self.locator).await?;
        Ok(found.is_empty().then_some(()))
    }
}

/// Element has scrolled into the viewport
///
/// Counts as in view once either its left or top edge is no longer above or
/// left of the viewport origin.
#[derive(Clone)]
pub struct ElementInViewport<E> {
    element: E,
}

impl<E: ElementHandle> ElementInViewport<E> {
    pub fn new(element: E) -> Self {
        Self { element }
    }
}

#[async_trait]
impl<D, E> Condition<D> for ElementInViewport<E>
where
    D: Driver<Element = E>,
    E: ElementHandle,
{
    type Output = ();

    fn description(&self) -> String {
        format!("{} to be in the viewport", self.element.describe())
    }

    async fn check(&self, _driver: &D) -> DriverResult<Option<()>> {
        let position = self.element.viewport_position().await?;
        Ok((position.left > -1.0 || position.top > -1.0).then_some(()))
    }
}

/// Attribute exists and contains the expected value
#[derive(Clone)]
pub struct AttributeContains<E> {
    element: E,
    attribute: String,
    value: String,
}

impl<E: ElementHandle> AttributeContains<E> {
    pub fn new(element: E, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            element,
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

#[async_trait]
impl<D, E> Condition<D> for AttributeContains<E>
where
    D: Driver<Element = E>,
    E: ElementHandle,
{
    type Output = ();

    fn description(&self) -> String {
        format!(
            "value \"{}\" to be present in attribute \"{}\" of {}",
            self.value,
            self.attribute,
            self.element.describe()
        )
    }

    async fn check(&self, _driver: &D) -> DriverResult<Option<()>> {
        let actual = self.element.attribute(&self.attribute).await?;
        Ok(actual
            .is_some_and(|actual| actual.contains(&self.value))
            .then_some(()))
    }
}

/// Attribute is missing or no longer contains the value
///
/// A detached element lacks every attribute value, so staleness satisfies it.
#[derive(Clone)]
pub struct AttributeLacks<E> {
    element: E,
    attribute: String,
    value: String,
}

impl<E: ElementHandle> AttributeLacks<E> {
    pub fn new(element: E, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            element,
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

#[async_trait]
impl<D, E> Condition<D> for AttributeLacks<E>
where
    D: Driver<Element = E>,
    E: ElementHandle,
{
    type Output = ();

    fn description(&self) -> String {
        format!(
            "value \"{}\" to not be present in attribute \"{}\" of {}",
            self.value,
            self.attribute,
            self.element.describe()
        )
    }

    async fn check(&self, _driver: &D) -> DriverResult<Option<()>> {
        match self.element.attribute(&self.attribute).await {
            Ok(actual) => Ok((!actual.is_some_and(|actual| actual.contains(&self.value)))
                .then_some(())),
            Err(err) => gone_counts_as_met(err),
        }
    }
}
