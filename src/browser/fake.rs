//! Scriptable in-memory browser for tests.
//!
//! Each site is keyed by the navigation URL (`https://{domain}`) and replays
//! a fixed set of requests through the installed interceptor. The shared
//! [`FakeStats`] counts page opens and closes so tests can check how many
//! pages were alive at once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{BrowserError, BrowserIdentity, BrowserLauncher, BrowserSession, PageHandle};
use crate::collector::{RequestInterceptor, ResourceKind};

/// Behaviour of one fake site.
#[derive(Debug, Clone, Default)]
pub struct FakeSite {
    pub requests: Vec<(String, ResourceKind)>,
    pub final_url: Option<String>,
    pub html: String,
    pub navigation_error: Option<String>,
    pub navigation_delay: Duration,
    pub content_error: bool,
    pub panic_on_navigate: bool,
}

impl FakeSite {
    pub fn html(html: &str) -> Self {
        Self {
            html: html.to_string(),
            ..Default::default()
        }
    }

    pub fn with_request(mut self, url: &str, kind: ResourceKind) -> Self {
        self.requests.push((url.to_string(), kind));
        self
    }

    pub fn with_final_url(mut self, url: &str) -> Self {
        self.final_url = Some(url.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.navigation_delay = delay;
        self
    }

    pub fn unreachable(error: &str) -> Self {
        Self {
            navigation_error: Some(error.to_string()),
            ..Default::default()
        }
    }
}

/// Counters shared by a launcher and everything it creates.
#[derive(Debug, Default)]
pub struct FakeStats {
    pub launches: AtomicUsize,
    pub sessions_closed: AtomicUsize,
    pub pages_opened: AtomicUsize,
    pub pages_closed: AtomicUsize,
    pub open_pages: AtomicUsize,
    pub max_open_pages: AtomicUsize,
    pub identities: Mutex<Vec<BrowserIdentity>>,
}

impl FakeStats {
    fn page_opened(&self) {
        self.pages_opened.fetch_add(1, Ordering::SeqCst);
        let now = self.open_pages.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_open_pages.fetch_max(now, Ordering::SeqCst);
    }

    fn page_closed(&self) {
        self.pages_closed.fetch_add(1, Ordering::SeqCst);
        self.open_pages.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn max_open(&self) -> usize {
        self.max_open_pages.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct FakeLauncher {
    sites: Arc<HashMap<String, FakeSite>>,
    pub stats: Arc<FakeStats>,
    pub fail_launch: bool,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_site(mut self, domain: &str, site: FakeSite) -> Self {
        Arc::make_mut(&mut self.sites).insert(format!("https://{}", domain), site);
        self
    }

    pub fn failing() -> Self {
        Self {
            fail_launch: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        if self.fail_launch {
            return Err(BrowserError::Launch("no display".to_string()));
        }
        self.stats.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            sites: self.sites.clone(),
            stats: self.stats.clone(),
            closed: AtomicBool::new(false),
        }))
    }
}

pub struct FakeSession {
    sites: Arc<HashMap<String, FakeSite>>,
    stats: Arc<FakeStats>,
    closed: AtomicBool,
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn new_page(&self) -> Result<Box<dyn PageHandle>, BrowserError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(BrowserError::Protocol("browser closed".to_string()));
        }
        self.stats.page_opened();
        Ok(Box::new(FakePage {
            sites: self.sites.clone(),
            stats: self.stats.clone(),
            interceptor: None,
            current_url: Mutex::new(None),
            closed: false,
        }))
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.closed.store(true, Ordering::SeqCst);
        self.stats.sessions_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakePage {
    sites: Arc<HashMap<String, FakeSite>>,
    stats: Arc<FakeStats>,
    interceptor: Option<RequestInterceptor>,
    current_url: Mutex<Option<String>>,
    closed: bool,
}

impl FakePage {
    fn site(&self) -> Option<FakeSite> {
        let url = self.current_url.lock().ok()?.clone()?;
        self.sites
            .values()
            .find(|s| s.final_url.as_deref() == Some(url.as_str()))
            .or_else(|| self.sites.get(&url))
            .cloned()
    }
}

#[async_trait]
impl PageHandle for FakePage {
    async fn set_identity(&self, identity: &BrowserIdentity) -> Result<(), BrowserError> {
        if let Ok(mut identities) = self.stats.identities.lock() {
            identities.push(identity.clone());
        }
        Ok(())
    }

    async fn install_interceptor(
        &mut self,
        interceptor: RequestInterceptor,
    ) -> Result<(), BrowserError> {
        self.interceptor = Some(interceptor);
        Ok(())
    }

    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        if self.closed {
            return Err(BrowserError::PageClosed);
        }
        let site = self.sites.get(url).cloned().unwrap_or_else(|| {
            FakeSite::unreachable(&format!("net::ERR_NAME_NOT_RESOLVED at {}", url))
        });

        tokio::time::sleep(site.navigation_delay).await;
        if site.panic_on_navigate {
            panic!("renderer crashed on {}", url);
        }
        if let Some(interceptor) = &self.interceptor {
            for (request_url, kind) in &site.requests {
                interceptor.on_request(request_url, *kind);
            }
        }
        if let Some(error) = site.navigation_error {
            return Err(BrowserError::Navigation(error));
        }

        if let Ok(mut current) = self.current_url.lock() {
            *current = Some(site.final_url.clone().unwrap_or_else(|| url.to_string()));
        }
        Ok(())
    }

    async fn final_url(&self) -> Result<Option<String>, BrowserError> {
        Ok(self.current_url.lock().ok().and_then(|u| u.clone()))
    }

    async fn content(&self) -> Result<String, BrowserError> {
        let site = self.site().ok_or(BrowserError::PageClosed)?;
        if site.content_error {
            return Err(BrowserError::Protocol("Execution context was destroyed".into()));
        }
        Ok(site.html)
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        if !self.closed {
            self.closed = true;
            self.stats.page_closed();
        }
        Ok(())
    }
}

/// Page double with a fixed URL and HTML, for classifier tests.
pub struct StaticPage {
    pub url: Option<String>,
    pub html: Result<String, String>,
}

impl StaticPage {
    pub fn new(url: &str, html: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            html: Ok(html.to_string()),
        }
    }

    pub fn broken(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            html: Err("Execution context was destroyed".to_string()),
        }
    }
}

#[async_trait]
impl PageHandle for StaticPage {
    async fn set_identity(&self, _identity: &BrowserIdentity) -> Result<(), BrowserError> {
        Ok(())
    }

    async fn install_interceptor(
        &mut self,
        _interceptor: RequestInterceptor,
    ) -> Result<(), BrowserError> {
        Ok(())
    }

    async fn navigate(&self, _url: &str) -> Result<(), BrowserError> {
        Ok(())
    }

    async fn final_url(&self) -> Result<Option<String>, BrowserError> {
        Ok(self.url.clone())
    }

    async fn content(&self) -> Result<String, BrowserError> {
        self.html.clone().map_err(BrowserError::Protocol)
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        Ok(())
    }
}
