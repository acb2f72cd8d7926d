//! Page-level checks

use async_trait::async_trait;

use super::Condition;
use crate::browser::{Driver, DriverResult};

/// Current URL contains a fragment
#[derive(Debug, Clone)]
pub struct UrlContains {
    fragment: String,
}

impl UrlContains {
    pub fn new(fragment: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
        }
    }
}

#[async_trait]
impl<D: Driver> Condition<D> for UrlContains {
    type Output = ();

    fn description(&self) -> String {
        format!("url to contain \"{}\"", self.fragment)
    }

    async fn check(&self, driver: &D) -> DriverResult<Option<()>> {
        let url = driver.current_url().await?;
        Ok(url.contains(&self.fragment).then_some(()))
    }
}
