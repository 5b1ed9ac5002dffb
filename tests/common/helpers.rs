//! Scripted fake automation engine
//!
//! A deterministic in-memory stand-in for the browser: a `FakeSite` maps
//! URLs to `FakePage`s, a page maps selectors to elements, and elements can
//! carry text, attributes, and selector-addressed children. Sessions record
//! every navigation so tests can assert on traffic.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use tunecart::error::{PipelineError, PipelineResult};
use tunecart::events::PipelineEvent;
use tunecart::traits::{AutomationEngine, BrowsingSession, ElementHandle, EventSink};
use tunecart::types::SessionId;

/// One scripted page element.
#[derive(Debug, Clone)]
pub struct FakeElement {
    text: String,
    attributes: HashMap<String, String>,
    children: HashMap<String, Vec<FakeElement>>,
    visible: bool,
}

impl FakeElement {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attributes: HashMap::new(),
            children: HashMap::new(),
            visible: true,
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn child(mut self, selector: impl Into<String>, element: FakeElement) -> Self {
        self.children.entry(selector.into()).or_default().push(element);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Selector → elements for one URL.
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    elements: HashMap<String, Vec<FakeElement>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, selector: impl Into<String>, elements: Vec<FakeElement>) -> Self {
        self.elements.insert(selector.into(), elements);
        self
    }
}

/// The whole scripted storefront.
#[derive(Debug, Default)]
pub struct FakeSite {
    pages: HashMap<String, FakePage>,
    failing_urls: HashSet<String>,
    slow_urls: HashMap<String, Duration>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: impl Into<String>, page: FakePage) -> Self {
        self.pages.insert(url.into(), page);
        self
    }

    /// Navigation to this URL fails with a navigation error.
    pub fn failing(mut self, url: impl Into<String>) -> Self {
        self.failing_urls.insert(url.into());
        self
    }

    /// Navigation to this URL stalls for `delay` before completing.
    pub fn slow(mut self, url: impl Into<String>, delay: Duration) -> Self {
        self.slow_urls.insert(url.into(), delay);
        self
    }
}

/// Fake engine handing out sessions against one shared scripted site.
pub struct FakeEngine {
    site: Arc<FakeSite>,
    fail_sessions: bool,
    pub sessions_opened: AtomicUsize,
    pub shutdowns: AtomicUsize,
    pub navigations: Arc<Mutex<Vec<String>>>,
}

impl FakeEngine {
    pub fn new(site: FakeSite) -> Self {
        Self {
            site: Arc::new(site),
            fail_sessions: false,
            sessions_opened: AtomicUsize::new(0),
            shutdowns: AtomicUsize::new(0),
            navigations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// An engine whose sessions never come up (initialization failure).
    pub fn failing() -> Self {
        let mut engine = Self::new(FakeSite::new());
        engine.fail_sessions = true;
        engine
    }

    pub fn session_count(&self) -> usize {
        self.sessions_opened.load(Ordering::SeqCst)
    }

    pub fn shutdown_count(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AutomationEngine for FakeEngine {
    async fn new_session(&self) -> PipelineResult<Arc<dyn BrowsingSession>> {
        if self.fail_sessions {
            return Err(PipelineError::engine("scripted session failure"));
        }
        self.sessions_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(FakeSession {
            id: SessionId::new(),
            site: Arc::clone(&self.site),
            current: Mutex::new(FakePage::default()),
            navigations: Arc::clone(&self.navigations),
        }))
    }

    async fn shutdown(&self) -> PipelineResult<()> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FakeSession {
    id: SessionId,
    site: Arc<FakeSite>,
    current: Mutex<FakePage>,
    navigations: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl BrowsingSession for FakeSession {
    fn id(&self) -> SessionId {
        self.id
    }

    async fn navigate(&self, url: &str) -> PipelineResult<()> {
        self.navigations.lock().unwrap().push(url.to_string());

        if let Some(delay) = self.site.slow_urls.get(url) {
            tokio::time::sleep(*delay).await;
        }
        if self.site.failing_urls.contains(url) {
            return Err(PipelineError::NavigationFailed {
                url: url.to_string(),
                message: "scripted navigation failure".to_string(),
            });
        }

        let page = self.site.pages.get(url).cloned().unwrap_or_default();
        *self.current.lock().unwrap() = page;
        Ok(())
    }

    async fn locate(&self, selector: &str) -> PipelineResult<Vec<Arc<dyn ElementHandle>>> {
        let elements = self
            .current
            .lock()
            .unwrap()
            .elements
            .get(selector)
            .cloned()
            .unwrap_or_default();
        Ok(elements.into_iter().map(wrap).collect())
    }

    async fn wait(&self, _duration: Duration) {
        // Politeness pauses are irrelevant to scripted pages
    }
}

fn wrap(element: FakeElement) -> Arc<dyn ElementHandle> {
    Arc::new(FakeElementHandle { element })
}

struct FakeElementHandle {
    element: FakeElement,
}

#[async_trait]
impl ElementHandle for FakeElementHandle {
    async fn read_text(&self, _timeout: Duration) -> PipelineResult<String> {
        Ok(self.element.text.clone())
    }

    async fn read_attribute(&self, name: &str, _timeout: Duration) -> PipelineResult<Option<String>> {
        Ok(self.element.attributes.get(name).cloned())
    }

    async fn find(&self, selector: &str) -> PipelineResult<Vec<Arc<dyn ElementHandle>>> {
        let children = self
            .element
            .children
            .get(selector)
            .cloned()
            .unwrap_or_default();
        Ok(children.into_iter().map(wrap).collect())
    }

    async fn click(&self) -> PipelineResult<()> {
        Ok(())
    }

    async fn is_visible(&self, _timeout: Duration) -> bool {
        self.element.visible
    }
}

/// Event sink buffering everything for assertions.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<PipelineEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<PipelineEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: PipelineEvent) {
        self.events.lock().unwrap().push(event);
    }
}
