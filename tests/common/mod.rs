//! Scripted in-memory driver for the integration tests
//!
//! Pages are a list of (locator, element) pairs that tests mutate directly
//! or from spawned tasks running on tokio's paused clock.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use kodegen_browser_wait::{
    Condition, Driver, DriverError, DriverResult, ElementHandle, Locator, ViewportPosition,
};
use parking_lot::Mutex;

pub const SESSION_DEFAULT: Duration = Duration::from_secs(15);

/// Install a test subscriber once; honours RUST_LOG
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug)]
struct ElementState {
    displayed: bool,
    enabled: bool,
    attributes: HashMap<String, String>,
    text: String,
    position: ViewportPosition,
    stale: bool,
}

#[derive(Clone, Debug)]
pub struct FakeElement {
    name: String,
    state: Arc<Mutex<ElementState>>,
}

impl FakeElement {
    /// Displayed, enabled, empty text, at the viewport origin
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: Arc::new(Mutex::new(ElementState {
                displayed: true,
                enabled: true,
                attributes: HashMap::new(),
                text: String::new(),
                position: ViewportPosition::default(),
                stale: false,
            })),
        }
    }

    pub fn hidden(name: &str) -> Self {
        let element = Self::new(name);
        element.set_displayed(false);
        element
    }

    pub fn with_text(self, text: &str) -> Self {
        self.set_text(text);
        self
    }

    pub fn set_displayed(&self, displayed: bool) {
        self.state.lock().displayed = displayed;
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.state.lock().enabled = enabled;
    }

    pub fn set_text(&self, text: &str) {
        self.state.lock().text = text.to_string();
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        self.state
            .lock()
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    pub fn remove_attribute(&self, name: &str) {
        self.state.lock().attributes.remove(name);
    }

    pub fn move_to(&self, left: f64, top: f64) {
        self.state.lock().position = ViewportPosition { left, top };
    }

    /// Every later call on this handle reports a stale reference
    pub fn detach(&self) {
        self.state.lock().stale = true;
    }

    fn read<T>(&self, f: impl FnOnce(&ElementState) -> T) -> DriverResult<T> {
        let state = self.state.lock();
        if state.stale {
            return Err(DriverError::StaleElement(self.name.clone()));
        }
        Ok(f(&state))
    }
}

#[async_trait]
impl ElementHandle for FakeElement {
    fn describe(&self) -> String {
        format!("element {}", self.name)
    }

    async fn is_displayed(&self) -> DriverResult<bool> {
        self.read(|s| s.displayed)
    }

    async fn is_enabled(&self) -> DriverResult<bool> {
        self.read(|s| s.enabled)
    }

    async fn attribute(&self, name: &str) -> DriverResult<Option<String>> {
        self.read(|s| s.attributes.get(name).cloned())
    }

    async fn text(&self) -> DriverResult<String> {
        self.read(|s| s.text.clone())
    }

    async fn viewport_position(&self) -> DriverResult<ViewportPosition> {
        self.read(|s| s.position)
    }
}

type RefreshHook = Box<dyn FnMut(usize) + Send>;

struct PageState {
    elements: Vec<(Locator, FakeElement)>,
    url: String,
    implicit_wait: Duration,
    implicit_seen: Vec<Duration>,
    broken: Option<String>,
}

pub struct FakeDriver {
    page: Mutex<PageState>,
    lookups: AtomicUsize,
    refreshes: AtomicUsize,
    on_refresh: Mutex<Option<RefreshHook>>,
}

impl Default for FakeDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeDriver {
    pub fn new() -> Self {
        Self {
            page: Mutex::new(PageState {
                elements: Vec::new(),
                url: "https://example.test/".to_string(),
                implicit_wait: SESSION_DEFAULT,
                implicit_seen: Vec::new(),
                broken: None,
            }),
            lookups: AtomicUsize::new(0),
            refreshes: AtomicUsize::new(0),
            on_refresh: Mutex::new(None),
        }
    }

    pub fn add(&self, locator: Locator, element: FakeElement) -> FakeElement {
        self.page.lock().elements.push((locator, element.clone()));
        element
    }

    /// Drop every match for `locator` from the DOM, detaching the handles
    pub fn remove(&self, locator: &Locator) {
        self.page.lock().elements.retain(|(l, element)| {
            if l == locator {
                element.detach();
                false
            } else {
                true
            }
        });
    }

    pub fn set_url(&self, url: &str) {
        self.page.lock().url = url.to_string();
    }

    /// Every later driver call fails with a session error
    pub fn break_session(&self, reason: &str) {
        self.page.lock().broken = Some(reason.to_string());
    }

    pub fn on_refresh(&self, hook: impl FnMut(usize) + Send + 'static) {
        *self.on_refresh.lock() = Some(Box::new(hook));
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    /// Implicit wait in force at each lookup, in order
    pub fn implicit_waits_seen(&self) -> Vec<Duration> {
        self.page.lock().implicit_seen.clone()
    }

    fn lookup(&self, locator: &Locator) -> DriverResult<Vec<FakeElement>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let mut page = self.page.lock();
        if let Some(reason) = &page.broken {
            return Err(DriverError::Session(reason.clone()));
        }
        let budget = page.implicit_wait;
        page.implicit_seen.push(budget);
        Ok(page
            .elements
            .iter()
            .filter(|(l, _)| l == locator)
            .map(|(_, element)| element.clone())
            .collect())
    }
}

#[async_trait]
impl Driver for FakeDriver {
    type Element = FakeElement;

    async fn find_element(&self, locator: &Locator) -> DriverResult<FakeElement> {
        self.lookup(locator)?
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::NoSuchElement(locator.to_string()))
    }

    async fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<FakeElement>> {
        self.lookup(locator)
    }

    async fn current_url(&self) -> DriverResult<String> {
        let page = self.page.lock();
        if let Some(reason) = &page.broken {
            return Err(DriverError::Session(reason.clone()));
        }
        Ok(page.url.clone())
    }

    async fn refresh(&self) -> DriverResult<()> {
        if let Some(reason) = &self.page.lock().broken {
            return Err(DriverError::Session(reason.clone()));
        }
        let count = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(hook) = self.on_refresh.lock().as_mut() {
            hook(count);
        }
        Ok(())
    }

    fn implicit_wait(&self) -> Duration {
        self.page.lock().implicit_wait
    }

    fn set_implicit_wait(&self, budget: Duration) {
        self.page.lock().implicit_wait = budget;
    }
}

/// Condition that replays a fixed script of outcomes, then reports "not yet"
pub struct Scripted {
    outcomes: Mutex<Vec<DriverResult<Option<u32>>>>,
    calls: AtomicUsize,
}

impl Scripted {
    pub fn new(mut outcomes: Vec<DriverResult<Option<u32>>>) -> Self {
        outcomes.reverse();
        Self {
            outcomes: Mutex::new(outcomes),
            calls: AtomicUsize::new(0),
        }
    }

    /// Not met `k - 1` times, then met with `k`
    pub fn succeeds_on(k: u32) -> Self {
        let mut outcomes: Vec<_> = (1..k).map(|_| Ok(None)).collect();
        outcomes.push(Ok(Some(k)));
        Self::new(outcomes)
    }

    pub fn never() -> Self {
        Self::new(Vec::new())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Condition<FakeDriver> for Scripted {
    type Output = u32;

    fn description(&self) -> String {
        "scripted condition".to_string()
    }

    async fn check(&self, _driver: &FakeDriver) -> DriverResult<Option<u32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcomes.lock().pop().unwrap_or(Ok(None))
    }
}
