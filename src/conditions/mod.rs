//! Predicates the polling loop evaluates
//!
//! A condition is a read against the current page that either produces a
//! value (the condition holds) or `None` (not yet). Lookup misses and stale
//! handles may be returned as errors: the loop treats them as "not yet" too.
//! Negative conditions (invisible, absent) fold those errors into success
//! themselves, since a vanished node satisfies them.

mod element;
mod page;
mod text;

pub use element::{
    AttributeContains, AttributeLacks, ElementClickable, ElementHandleClickable,
    ElementHandleInvisible, ElementHandleVisible, ElementInViewport, ElementInvisible,
    ElementNotPresent, ElementPresent, ElementVisible,
};
pub use page::UrlContains;
pub use text::{RefreshTarget, TextAbsent, TextPresent, TextPresentAfterRefresh};

use std::marker::PhantomData;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::browser::{Driver, DriverError, DriverResult};

#[async_trait]
pub trait Condition<D: Driver>: Send + Sync {
    type Output: Send;

    /// What is being waited for, as it should read in a timeout message
    fn description(&self) -> String;

    async fn check(&self, driver: &D) -> DriverResult<Option<Self::Output>>;
}

/// Fold a transient driver error into "condition met"
///
/// For conditions that hold once something is gone.
pub(crate) fn gone_counts_as_met(err: DriverError) -> DriverResult<Option<()>> {
    if err.is_transient() {
        Ok(Some(()))
    } else {
        Err(err)
    }
}

/// Condition built from a closure, see [`condition_fn`]
pub struct FnCondition<D, T, F> {
    description: String,
    check: F,
    _marker: PhantomData<fn(&D) -> T>,
}

/// Wrap an async closure as a [`Condition`]
///
/// # Example
/// ```rust,ignore
/// let served_over_https = condition_fn("page to be served over https", |driver: &ChromiumDriver| {
///     Box::pin(async move {
///         let url = driver.current_url().await?;
///         Ok(url.starts_with("https://").then_some(url))
///     })
/// });
/// ```
pub fn condition_fn<D, T, F>(description: impl Into<String>, check: F) -> FnCondition<D, T, F>
where
    D: Driver,
    T: Send,
    F: for<'a> Fn(&'a D) -> BoxFuture<'a, DriverResult<Option<T>>> + Send + Sync,
{
    FnCondition {
        description: description.into(),
        check,
        _marker: PhantomData,
    }
}

#[async_trait]
impl<D, T, F> Condition<D> for FnCondition<D, T, F>
where
    D: Driver,
    T: Send,
    F: for<'a> Fn(&'a D) -> BoxFuture<'a, DriverResult<Option<T>>> + Send + Sync,
{
    type Output = T;

    fn description(&self) -> String {
        self.description.clone()
    }

    async fn check(&self, driver: &D) -> DriverResult<Option<T>> {
        (self.check)(driver).await
    }
}
