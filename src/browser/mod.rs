//! Driver seam for the polling waits
//!
//! Everything a wait needs from a browser session sits behind [`Driver`] and
//! [`ElementHandle`]. The chromiumoxide-backed implementation lives in
//! [`chromium`]; tests plug in scripted drivers.

mod chromium;

pub use chromium::{ChromiumDriver, ChromiumElement};

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// How to locate elements on the current page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Css(String),
    Id(String),
    Name(String),
    ClassName(String),
    TagName(String),
    XPath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    pub fn class_name(class: impl Into<String>) -> Self {
        Self::ClassName(class.into())
    }

    pub fn tag_name(tag: impl Into<String>) -> Self {
        Self::TagName(tag.into())
    }

    pub fn xpath(path: impl Into<String>) -> Self {
        Self::XPath(path.into())
    }

    /// CSS selector equivalent, `None` for XPath locators
    pub fn to_css(&self) -> Option<String> {
        match self {
            Self::Css(selector) => Some(selector.clone()),
            Self::Id(id) => Some(format!("[id=\"{}\"]", escape_css_string(id))),
            Self::Name(name) => Some(format!("[name=\"{}\"]", escape_css_string(name))),
            Self::ClassName(class) => Some(format!(".{}", escape_css_ident(class))),
            Self::TagName(tag) => Some(tag.clone()),
            Self::XPath(_) => None,
        }
    }
}

fn escape_css_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Escape `value` for use as a CSS identifier, following `CSS.escape`
fn escape_css_ident(value: &str) -> String {
    let first = value.chars().next();
    let mut escaped = String::with_capacity(value.len());

    for (index, c) in value.chars().enumerate() {
        let leading_digit =
            c.is_ascii_digit() && (index == 0 || (index == 1 && first == Some('-')));
        match c {
            '\0' => escaped.push('\u{FFFD}'),
            '\u{1}'..='\u{1f}' | '\u{7f}' => escaped.push_str(&format!("\\{:x} ", c as u32)),
            _ if leading_digit => escaped.push_str(&format!("\\{:x} ", c as u32)),
            '-' if value.len() == 1 => escaped.push_str("\\-"),
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() => {
                escaped.push(c)
            }
            c => {
                escaped.push('\\');
                escaped.push(c);
            }
        }
    }

    escaped
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(selector) => write!(f, "By.css: {selector}"),
            Self::Id(id) => write!(f, "By.id: {id}"),
            Self::Name(name) => write!(f, "By.name: {name}"),
            Self::ClassName(class) => write!(f, "By.className: {class}"),
            Self::TagName(tag) => write!(f, "By.tagName: {tag}"),
            Self::XPath(path) => write!(f, "By.xpath: {path}"),
        }
    }
}

/// Element offset relative to the top-left corner of the viewport, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Deserialize)]
pub struct ViewportPosition {
    pub left: f64,
    pub top: f64,
}

/// Failures reported by a driver
///
/// Lookup misses and stale handles are transient: a wait treats them as
/// "condition not met yet". Everything else means the session itself is in
/// trouble and is surfaced immediately.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("No such element: {0}")]
    NoSuchElement(String),

    #[error("Stale element reference: {0}")]
    StaleElement(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Script error: {0}")]
    Script(String),
}

impl DriverError {
    /// Whether a polling loop may retry after this error
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NoSuchElement(_) | Self::StaleElement(_))
    }
}

pub type DriverResult<T> = Result<T, DriverError>;

/// A browser session the waits can poll against
///
/// The implicit wait is the retry budget a single `find_element` call spends
/// before reporting [`DriverError::NoSuchElement`]. It is session-wide state,
/// so two waits running concurrently on one session will step on each other.
/// Serialising them is up to the caller.
#[async_trait]
pub trait Driver: Send + Sync {
    type Element: ElementHandle;

    async fn find_element(&self, locator: &Locator) -> DriverResult<Self::Element>;

    /// All matches; an empty list is not an error
    async fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<Self::Element>>;

    async fn current_url(&self) -> DriverResult<String>;

    async fn refresh(&self) -> DriverResult<()>;

    fn implicit_wait(&self) -> Duration;

    // Synchronous so a scope guard can restore it from `Drop`.
    fn set_implicit_wait(&self, budget: Duration);
}

/// A located DOM node
///
/// Any call may fail with [`DriverError::StaleElement`] once the node has
/// been detached or replaced.
#[async_trait]
pub trait ElementHandle: Clone + Send + Sync {
    /// Human-readable name for wait descriptions
    fn describe(&self) -> String {
        "element".to_string()
    }

    async fn is_displayed(&self) -> DriverResult<bool>;

    async fn is_enabled(&self) -> DriverResult<bool>;

    async fn attribute(&self, name: &str) -> DriverResult<Option<String>>;

    async fn text(&self) -> DriverResult<String>;

    async fn viewport_position(&self) -> DriverResult<ViewportPosition>;
}
