//! chromiumoxide-backed [`Driver`]
//!
//! CDP has no notion of an implicit wait, so [`ChromiumDriver`] emulates the
//! WebDriver one: a lookup that misses is retried until the session's
//! implicit budget is spent.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::time::Instant;
use tracing::trace;

use super::{Driver, DriverError, DriverResult, ElementHandle, Locator, ViewportPosition};

/// Delay between lookup retries while an implicit budget is running
const LOOKUP_RETRY_INTERVAL: Duration = Duration::from_millis(50);

// Element scripts answer with `JSON.stringify(..)` so object results survive
// `call_js_fn`, which never asks CDP to return by value. A bare `null` means
// the node has been detached.

const IS_DISPLAYED_JS: &str = "function() {
    if (!this.isConnected) { return null; }
    const style = window.getComputedStyle(this);
    if (style.display === 'none' || style.visibility === 'hidden' || style.opacity === '0') {
        return JSON.stringify(false);
    }
    const rect = this.getBoundingClientRect();
    return JSON.stringify(rect.width > 0 && rect.height > 0);
}";

const IS_ENABLED_JS: &str = "function() {
    if (!this.isConnected) { return null; }
    return JSON.stringify(!this.disabled);
}";

const TEXT_JS: &str = "function() {
    if (!this.isConnected) { return null; }
    return JSON.stringify(this.innerText || this.textContent || '');
}";

const VIEWPORT_POSITION_JS: &str = "function() {
    if (!this.isConnected) { return null; }
    const rect = this.getBoundingClientRect();
    return JSON.stringify({ left: rect.left, top: rect.top });
}";

/// Attribute read with the same detached-node guard as the other scripts
fn attribute_js(name: &str) -> String {
    format!(
        "function() {{
    if (!this.isConnected) {{ return null; }}
    return JSON.stringify(this.getAttribute({}));
}}",
        Value::from(name)
    )
}

/// Unwrap the JSON payload an element script sent back
fn decode_script_result(value: Option<Value>, origin: &str) -> DriverResult<Value> {
    match value {
        None | Some(Value::Null) => Err(DriverError::StaleElement(origin.to_string())),
        Some(Value::String(encoded)) => serde_json::from_str(&encoded).map_err(|e| {
            DriverError::Protocol(format!("Malformed element script result for {origin}: {e}"))
        }),
        Some(other) => Err(DriverError::Protocol(format!(
            "Expected encoded element script result for {origin}, got {other}"
        ))),
    }
}

fn decode_attribute(value: Value, origin: &str) -> DriverResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text)),
        other => Err(DriverError::Protocol(format!(
            "Expected attribute string for {origin}, got {other}"
        ))),
    }
}

fn decode_position(value: Value, origin: &str) -> DriverResult<ViewportPosition> {
    serde_json::from_value(value).map_err(|e| {
        DriverError::Protocol(format!("Malformed bounding rect for {origin}: {e}"))
    })
}

/// Which side of the seam an error came from
#[derive(Clone, Copy)]
enum Origin {
    Lookup,
    Element,
}

/// Map a CDP failure onto the wait taxonomy
fn classify(err: CdpError, origin: Origin, what: &str) -> DriverError {
    let message = err.to_string();
    // The last two come from an XPath search that matched nothing
    let missing_node = message.contains("Could not find node")
        || message.contains("No node with given id")
        || message.contains("Cannot find context with specified id")
        || message.contains("Invalid search result range")
        || message.contains("No search session with given id");

    match err {
        CdpError::NotFound => match origin {
            Origin::Lookup => DriverError::NoSuchElement(what.to_string()),
            Origin::Element => DriverError::StaleElement(what.to_string()),
        },
        CdpError::Chrome(_) if missing_node => match origin {
            Origin::Lookup => DriverError::NoSuchElement(what.to_string()),
            Origin::Element => DriverError::StaleElement(format!("{what}: {message}")),
        },
        CdpError::JavascriptException(_) => DriverError::Script(message),
        CdpError::Ws(_)
        | CdpError::ChannelSendError(_)
        | CdpError::NoResponse
        | CdpError::LaunchExit(_, _)
        | CdpError::LaunchTimeout(_)
        | CdpError::LaunchIo(_, _) => DriverError::Session(message),
        _ => DriverError::Protocol(message),
    }
}

/// A chromiumoxide page driven as a wait session
pub struct ChromiumDriver {
    page: Page,
    implicit_wait: Mutex<Duration>,
}

impl ChromiumDriver {
    /// Wrap `page`, starting with `implicit_wait` as the session budget
    pub fn new(page: Page, implicit_wait: Duration) -> Self {
        Self {
            page,
            implicit_wait: Mutex::new(implicit_wait),
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    async fn lookup_once(&self, locator: &Locator) -> DriverResult<Vec<Element>> {
        let what = locator.to_string();
        let found = match locator {
            Locator::XPath(path) => self.page.find_xpaths(path.as_str()).await,
            css => {
                self.page
                    .find_elements(css.to_css().unwrap_or_default())
                    .await
            }
        };

        match found {
            Ok(elements) => Ok(elements),
            Err(err) => match classify(err, Origin::Lookup, &what) {
                // A miss on a list lookup is just an empty list
                DriverError::NoSuchElement(_) => Ok(Vec::new()),
                other => Err(other),
            },
        }
    }

    /// Run a lookup, retrying empty results until the implicit budget is spent
    async fn lookup(&self, locator: &Locator) -> DriverResult<Vec<Element>> {
        let budget = self.implicit_wait();
        let start = Instant::now();

        loop {
            let elements = self.lookup_once(locator).await?;
            if !elements.is_empty() {
                return Ok(elements);
            }

            let remaining = budget.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                return Ok(elements);
            }

            trace!(
                "No match for {} yet, {}ms of implicit wait left",
                locator,
                remaining.as_millis()
            );
            tokio::time::sleep(LOOKUP_RETRY_INTERVAL.min(remaining)).await;
        }
    }
}

#[async_trait]
impl Driver for ChromiumDriver {
    type Element = ChromiumElement;

    async fn find_element(&self, locator: &Locator) -> DriverResult<ChromiumElement> {
        self.lookup(locator)
            .await?
            .into_iter()
            .next()
            .map(|element| ChromiumElement::new(element, locator.to_string()))
            .ok_or_else(|| DriverError::NoSuchElement(locator.to_string()))
    }

    async fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<ChromiumElement>> {
        let what = locator.to_string();
        Ok(self
            .lookup(locator)
            .await?
            .into_iter()
            .map(|element| ChromiumElement::new(element, what.clone()))
            .collect())
    }

    async fn current_url(&self) -> DriverResult<String> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| classify(e, Origin::Lookup, "current url"))?;
        Ok(url.unwrap_or_default())
    }

    async fn refresh(&self) -> DriverResult<()> {
        self.page
            .reload()
            .await
            .map_err(|e| classify(e, Origin::Lookup, "page reload"))?;
        Ok(())
    }

    fn implicit_wait(&self) -> Duration {
        *self.implicit_wait.lock()
    }

    fn set_implicit_wait(&self, budget: Duration) {
        *self.implicit_wait.lock() = budget;
    }
}

/// A chromiumoxide element plus the locator it came from, for messages
#[derive(Clone)]
pub struct ChromiumElement {
    element: Arc<Element>,
    origin: String,
}

impl ChromiumElement {
    fn new(element: Element, origin: String) -> Self {
        Self {
            element: Arc::new(element),
            origin,
        }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Call `function` with `this` bound to the node and decode its payload
    ///
    /// A detached node surfaces as [`DriverError::StaleElement`].
    async fn call(&self, function: &str) -> DriverResult<Value> {
        let returns = self
            .element
            .call_js_fn(function, false)
            .await
            .map_err(|e| classify(e, Origin::Element, &self.origin))?;

        if let Some(details) = returns.exception_details {
            return Err(DriverError::Script(format!(
                "{} (on element located {})",
                details.text, self.origin
            )));
        }

        decode_script_result(returns.result.value, &self.origin)
    }

    async fn call_bool(&self, function: &str) -> DriverResult<bool> {
        match self.call(function).await? {
            Value::Bool(flag) => Ok(flag),
            other => Err(DriverError::Protocol(format!(
                "Expected boolean from element script, got {other}"
            ))),
        }
    }

    async fn call_string(&self, function: &str) -> DriverResult<String> {
        match self.call(function).await? {
            Value::String(text) => Ok(text),
            other => Err(DriverError::Protocol(format!(
                "Expected string from element script, got {other}"
            ))),
        }
    }
}

#[async_trait]
impl ElementHandle for ChromiumElement {
    fn describe(&self) -> String {
        format!("element located by {}", self.origin)
    }

    async fn is_displayed(&self) -> DriverResult<bool> {
        self.call_bool(IS_DISPLAYED_JS).await
    }

    async fn is_enabled(&self) -> DriverResult<bool> {
        self.call_bool(IS_ENABLED_JS).await
    }

    async fn attribute(&self, name: &str) -> DriverResult<Option<String>> {
        let value = self.call(&attribute_js(name)).await?;
        decode_attribute(value, &self.origin)
    }

    async fn text(&self) -> DriverResult<String> {
        self.call_string(TEXT_JS).await
    }

    async fn viewport_position(&self) -> DriverResult<ViewportPosition> {
        let value = self.call(VIEWPORT_POSITION_JS).await?;
        decode_position(value, &self.origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chromiumoxide_cdp::cdp::js_protocol::runtime::ExceptionDetails;

    fn chrome_error(message: &str) -> CdpError {
        CdpError::Chrome(chromiumoxide_types::Error {
            code: -32000,
            message: message.to_string(),
        })
    }

    #[test]
    fn not_found_depends_on_which_side_asked() {
        assert_eq!(
            classify(CdpError::NotFound, Origin::Lookup, "By.id: a"),
            DriverError::NoSuchElement("By.id: a".into())
        );
        assert_eq!(
            classify(CdpError::NotFound, Origin::Element, "By.id: a"),
            DriverError::StaleElement("By.id: a".into())
        );
    }

    #[test]
    fn missing_node_messages_are_transient() {
        let err = classify(
            chrome_error("Could not find node with given id"),
            Origin::Element,
            "By.css: .row",
        );
        assert!(matches!(err, DriverError::StaleElement(_)));

        let err = classify(
            chrome_error("No node with given id found"),
            Origin::Lookup,
            "By.css: .row",
        );
        assert_eq!(err, DriverError::NoSuchElement("By.css: .row".into()));
    }

    #[test]
    fn empty_xpath_search_is_a_miss() {
        for message in ["Invalid search result range", "No search session with given id"] {
            let err = classify(chrome_error(message), Origin::Lookup, "By.xpath: //p");
            assert_eq!(err, DriverError::NoSuchElement("By.xpath: //p".into()));
            assert!(err.is_transient());
        }
    }

    #[test]
    fn other_chrome_errors_are_protocol_failures() {
        let err = classify(chrome_error("Cannot navigate to invalid URL"), Origin::Lookup, "x");
        assert!(matches!(err, DriverError::Protocol(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn lost_connection_is_a_session_failure() {
        let err = classify(CdpError::NoResponse, Origin::Element, "x");
        assert!(matches!(err, DriverError::Session(_)));
    }

    #[test]
    fn page_exceptions_are_script_failures() {
        let details = ExceptionDetails::builder()
            .exception_id(1)
            .text("Uncaught TypeError")
            .line_number(0)
            .column_number(0)
            .build()
            .unwrap();
        let err = classify(
            CdpError::JavascriptException(Box::new(details)),
            Origin::Element,
            "x",
        );
        assert!(matches!(err, DriverError::Script(_)));
    }

    #[test]
    fn detached_node_decodes_as_stale() {
        assert_eq!(
            decode_script_result(Some(Value::Null), "By.id: a"),
            Err(DriverError::StaleElement("By.id: a".into()))
        );
        assert!(matches!(
            decode_script_result(None, "By.id: a"),
            Err(DriverError::StaleElement(_))
        ));
    }

    #[test]
    fn encoded_payloads_are_unwrapped() {
        let flag = decode_script_result(Some(Value::from("true")), "x").unwrap();
        assert_eq!(flag, Value::Bool(true));

        let rect = decode_script_result(Some(Value::from(r#"{"left":-20.5,"top":40}"#)), "x")
            .unwrap();
        assert_eq!(
            decode_position(rect, "x").unwrap(),
            ViewportPosition { left: -20.5, top: 40.0 }
        );

        assert!(matches!(
            decode_script_result(Some(Value::Bool(true)), "x"),
            Err(DriverError::Protocol(_))
        ));
        assert!(matches!(
            decode_script_result(Some(Value::from("{not json")), "x"),
            Err(DriverError::Protocol(_))
        ));
    }

    #[test]
    fn attribute_payload_distinguishes_absent_from_detached() {
        let absent = decode_script_result(Some(Value::from("null")), "x").unwrap();
        assert_eq!(decode_attribute(absent, "x").unwrap(), None);

        let present = decode_script_result(Some(Value::from(r#""tab is-active""#)), "x").unwrap();
        assert_eq!(
            decode_attribute(present, "x").unwrap().as_deref(),
            Some("tab is-active")
        );
    }

    #[test]
    fn attribute_name_is_quoted_into_the_script() {
        let script = attribute_js("data-x\"); alert('y");
        assert!(script.contains(r#"this.getAttribute("data-x\"); alert('y")"#));
        assert!(script.contains("if (!this.isConnected) { return null; }"));
    }
}
