//! Chromium-backed automation engine
//!
//! Production implementation of the capability traits on top of
//! `chromiumoxide`: the engine owns one browser process, each browsing
//! session is an isolated page, and every element operation is bounded by
//! the configured lookup timeout. The CDP handler stream runs on its own
//! task for the lifetime of the engine.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::config::StorefrontConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::traits::{AutomationEngine, BrowsingSession, ElementHandle};
use crate::types::SessionId;

pub struct ChromiumEngine {
    browser: Mutex<Option<Browser>>,
    handler_task: Mutex<Option<JoinHandle<()>>>,
    lookup_timeout: Duration,
}

impl ChromiumEngine {
    /// Launch the browser process.
    ///
    /// Failure here is fatal to the whole run; the caller reports it and
    /// exits non-zero.
    pub async fn launch(
        storefront: &StorefrontConfig,
        headless: bool,
        lookup_timeout: Duration,
    ) -> PipelineResult<Self> {
        let mut builder = BrowserConfig::builder()
            .window_size(1920, 1080)
            .arg(format!("--user-agent={}", storefront.user_agent));
        if !headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(PipelineError::engine)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|error| PipelineError::engine(error.to_string()))?;

        // The handler stream must be drained for the lifetime of the
        // browser; it ends when the browser connection closes.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(error) = event {
                    tracing::debug!(%error, "CDP handler event error");
                }
            }
        });

        tracing::debug!(headless, "browser launched");
        Ok(Self {
            browser: Mutex::new(Some(browser)),
            handler_task: Mutex::new(Some(handler_task)),
            lookup_timeout,
        })
    }
}

#[async_trait]
impl AutomationEngine for ChromiumEngine {
    async fn new_session(&self) -> PipelineResult<Arc<dyn BrowsingSession>> {
        let guard = self.browser.lock().await;
        let browser = guard
            .as_ref()
            .ok_or_else(|| PipelineError::engine("engine already shut down"))?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|error| PipelineError::engine(error.to_string()))?;

        Ok(Arc::new(ChromiumSession {
            id: SessionId::new(),
            page,
            lookup_timeout: self.lookup_timeout,
        }))
    }

    async fn shutdown(&self) -> PipelineResult<()> {
        // The handler must keep pumping CDP messages until close completes
        let close_result = match self.browser.lock().await.take() {
            Some(mut browser) => {
                let result = browser.close().await.map(|_| ());
                let _ = browser.wait().await;
                result
            }
            None => Ok(()),
        };

        if let Some(task) = self.handler_task.lock().await.take() {
            task.abort();
        }

        close_result.map_err(|error| PipelineError::engine(error.to_string()))?;
        tracing::debug!("browser closed");
        Ok(())
    }
}

struct ChromiumSession {
    id: SessionId,
    page: Page,
    lookup_timeout: Duration,
}

#[async_trait]
impl BrowsingSession for ChromiumSession {
    fn id(&self) -> SessionId {
        self.id
    }

    async fn navigate(&self, url: &str) -> PipelineResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|error| PipelineError::NavigationFailed {
                url: url.to_string(),
                message: error.to_string(),
            })?;
        // Best effort: a page that never fires load still rendered results
        if let Err(error) = self.page.wait_for_navigation().await {
            tracing::debug!(%error, url, "load event not observed");
        }
        Ok(())
    }

    async fn locate(&self, selector: &str) -> PipelineResult<Vec<Arc<dyn ElementHandle>>> {
        match timeout(self.lookup_timeout, self.page.find_elements(selector)).await {
            Ok(Ok(elements)) => Ok(elements
                .into_iter()
                .map(|element| wrap_element(element, self.lookup_timeout))
                .collect()),
            // Missing selectors and slow lookups are cascade misses, not errors
            Ok(Err(_)) | Err(_) => Ok(Vec::new()),
        }
    }

    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

fn wrap_element(element: Element, lookup_timeout: Duration) -> Arc<dyn ElementHandle> {
    Arc::new(ChromiumElement {
        inner: element,
        lookup_timeout,
    })
}

struct ChromiumElement {
    inner: Element,
    lookup_timeout: Duration,
}

#[async_trait]
impl ElementHandle for ChromiumElement {
    async fn read_text(&self, bound: Duration) -> PipelineResult<String> {
        match timeout(bound, self.inner.inner_text()).await {
            Ok(Ok(text)) => Ok(text.unwrap_or_default()),
            Ok(Err(error)) => Err(PipelineError::fault(format!("text read failed: {error}"))),
            Err(_) => Err(PipelineError::fault("text read timed out")),
        }
    }

    async fn read_attribute(&self, name: &str, bound: Duration) -> PipelineResult<Option<String>> {
        match timeout(bound, self.inner.attribute(name)).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => Err(PipelineError::fault(format!(
                "attribute read failed: {error}"
            ))),
            Err(_) => Err(PipelineError::fault("attribute read timed out")),
        }
    }

    async fn find(&self, selector: &str) -> PipelineResult<Vec<Arc<dyn ElementHandle>>> {
        match timeout(self.lookup_timeout, self.inner.find_elements(selector)).await {
            Ok(Ok(elements)) => Ok(elements
                .into_iter()
                .map(|element| wrap_element(element, self.lookup_timeout))
                .collect()),
            Ok(Err(_)) | Err(_) => Ok(Vec::new()),
        }
    }

    async fn click(&self) -> PipelineResult<()> {
        self.inner
            .click()
            .await
            .map(|_| ())
            .map_err(|error| PipelineError::fault(format!("click failed: {error}")))
    }

    async fn is_visible(&self, bound: Duration) -> bool {
        // An element with a clickable point is rendered on screen
        matches!(timeout(bound, self.inner.clickable_point()).await, Ok(Ok(_)))
    }
}
