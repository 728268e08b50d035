//! Chromium implementation of the browser traits over the DevTools protocol.

use super::{BrowserEngineConfig, BrowserError, BrowserLauncher, BrowserSession};

#[cfg(feature = "browser")]
use std::path::PathBuf;
#[cfg(feature = "browser")]
use std::time::Duration;

use async_trait::async_trait;
#[cfg(feature = "browser")]
use tracing::{debug, info, warn};

#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::fetch::{
    self, ContinueRequestParams, EventRequestPaused, FailRequestParams, RequestPattern,
    RequestStage,
};
#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::network::{
    ErrorReason, ResourceType, SetUserAgentOverrideParams,
};
#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
#[cfg(feature = "browser")]
use chromiumoxide::handler::HandlerConfig;
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig, Page};
#[cfg(feature = "browser")]
use futures::StreamExt;
#[cfg(feature = "browser")]
use tokio::task::JoinHandle;

#[cfg(feature = "browser")]
use super::{BrowserIdentity, PageHandle};
#[cfg(feature = "browser")]
use crate::collector::{RequestInterceptor, RequestLog, ResourceKind, Verdict};

/// How long the network must stay quiet before a page counts as loaded.
#[cfg(feature = "browser")]
const NETWORK_IDLE_QUIET: Duration = Duration::from_millis(500);

/// Launches Chrome, or attaches to one already running when a remote
/// DevTools URL is configured.
pub struct ChromeLauncher {
    #[cfg_attr(not(feature = "browser"), allow(dead_code))]
    config: BrowserEngineConfig,
}

impl ChromeLauncher {
    pub fn new(config: BrowserEngineConfig) -> Self {
        Self { config }
    }
}

#[cfg(feature = "browser")]
impl ChromeLauncher {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        // Common install locations
        "/opt/google/chrome/google-chrome",
    ];

    const CHROME_COMMANDS: &'static [&'static str] = &[
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
    ];

    /// Find the Chrome executable: configured path, well-known paths, then PATH.
    fn find_chrome(&self) -> Result<PathBuf, BrowserError> {
        if let Some(ref path) = self.config.chrome_path {
            if path.exists() {
                return Ok(path.clone());
            }
            warn!(
                "Configured chrome_path {} does not exist, searching instead",
                path.display()
            );
        }

        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                info!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        for cmd in Self::CHROME_COMMANDS {
            if let Ok(path) = which::which(cmd) {
                info!("Found Chrome in PATH: {}", path.display());
                return Ok(path);
            }
        }

        Err(BrowserError::ChromeNotFound)
    }

    async fn launch_local(&self) -> Result<ChromeSession, BrowserError> {
        info!("Launching browser (headless={})", self.config.headless);

        let chrome_path = self.find_chrome()?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .request_timeout(Duration::from_secs(self.config.timeout));

        // with_head means NOT headless
        if !self.config.headless {
            builder = builder.with_head();
        }

        if let Some(ref proxy) = self.config.proxy {
            builder = builder.arg(format!("--proxy-server={}", proxy));
        }

        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--disable-translate")
            .arg("--mute-audio")
            .arg("--no-sandbox") // Often needed for headless in containers
            .arg("--disable-setuid-sandbox")
            .arg("--disable-gpu");

        for arg in &self.config.chrome_args {
            builder = builder.arg(arg);
        }

        let config = builder.build().map_err(BrowserError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(ChromeSession {
            browser,
            handler_task,
            owned: true,
        })
    }

    /// Connect to a remote Chrome instance.
    async fn connect_remote(&self, url: &str) -> Result<ChromeSession, BrowserError> {
        info!(
            "Connecting to remote browser at {} (timeout: {}s)",
            url, self.config.timeout
        );

        // Get WebSocket URL from the /json/version endpoint
        let http_url = url
            .replace("ws://", "http://")
            .replace("wss://", "https://");
        let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

        let resp: serde_json::Value = reqwest::Client::new()
            .get(&version_url)
            .send()
            .await
            .map_err(|e| BrowserError::Remote(e.to_string()))?
            .json()
            .await
            .map_err(|e| BrowserError::Remote(format!("invalid version info: {}", e)))?;

        let ws_url = resp
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| BrowserError::Remote("No webSocketDebuggerUrl in response".into()))?;

        info!("Connecting to WebSocket: {}", ws_url);

        let handler_config = HandlerConfig {
            request_timeout: Duration::from_secs(self.config.timeout),
            ..Default::default()
        };

        let (browser, mut handler) = Browser::connect_with_config(ws_url, handler_config)
            .await
            .map_err(|e| BrowserError::Remote(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(ChromeSession {
            browser,
            handler_task,
            owned: false,
        })
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        let session = match self.config.remote_url.clone() {
            Some(remote_url) => self.connect_remote(&remote_url).await?,
            None => self.launch_local().await?,
        };
        Ok(Box::new(session))
    }
}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        Err(BrowserError::NotCompiled)
    }
}

/// A launched or attached Chrome instance.
#[cfg(feature = "browser")]
pub struct ChromeSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    /// Launched by us, as opposed to attached through `remote_url`.
    owned: bool,
}

#[cfg(feature = "browser")]
#[async_trait]
impl BrowserSession for ChromeSession {
    async fn new_page(&self) -> Result<Box<dyn PageHandle>, BrowserError> {
        let page = self.browser.new_page("about:blank").await?;
        Ok(Box::new(ChromePage {
            page: Some(page),
            log: None,
            listener: None,
        }))
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        // An attached browser belongs to someone else; only drop the connection.
        let result = if self.owned {
            let closed = self.browser.close().await.map(|_| ());
            if let Err(e) = self.browser.wait().await {
                debug!("Waiting for browser process failed: {}", e);
            }
            closed.map_err(BrowserError::from)
        } else {
            Ok(())
        };
        self.handler_task.abort();
        result
    }
}

/// One Chrome tab.
#[cfg(feature = "browser")]
struct ChromePage {
    page: Option<Page>,
    log: Option<RequestLog>,
    listener: Option<JoinHandle<()>>,
}

#[cfg(feature = "browser")]
impl ChromePage {
    fn page(&self) -> Result<&Page, BrowserError> {
        self.page.as_ref().ok_or(BrowserError::PageClosed)
    }
}

#[cfg(feature = "browser")]
fn resource_kind(resource_type: &ResourceType) -> ResourceKind {
    match resource_type {
        ResourceType::Document => ResourceKind::Document,
        ResourceType::Stylesheet => ResourceKind::Stylesheet,
        ResourceType::Image => ResourceKind::Image,
        ResourceType::Media => ResourceKind::Media,
        ResourceType::Font => ResourceKind::Font,
        ResourceType::Script => ResourceKind::Script,
        ResourceType::Xhr => ResourceKind::Xhr,
        ResourceType::Fetch => ResourceKind::Fetch,
        ResourceType::WebSocket => ResourceKind::WebSocket,
        _ => ResourceKind::Other,
    }
}

/// Resolve one paused request according to the interceptor's verdict.
#[cfg(feature = "browser")]
async fn resolve_paused_request(
    page: &Page,
    interceptor: &RequestInterceptor,
    event: &EventRequestPaused,
) -> Result<(), BrowserError> {
    let kind = resource_kind(&event.resource_type);
    match interceptor.on_request(&event.request.url, kind) {
        Verdict::Continue => {
            page.execute(ContinueRequestParams::new(event.request_id.clone()))
                .await?;
        }
        Verdict::Abort => {
            page.execute(FailRequestParams::new(
                event.request_id.clone(),
                ErrorReason::BlockedByClient,
            ))
            .await?;
        }
    }
    Ok(())
}

#[cfg(feature = "browser")]
#[async_trait]
impl PageHandle for ChromePage {
    async fn set_identity(&self, identity: &BrowserIdentity) -> Result<(), BrowserError> {
        let params = SetUserAgentOverrideParams::builder()
            .user_agent(identity.user_agent.clone())
            .platform(identity.platform.clone())
            .build()
            .map_err(BrowserError::Protocol)?;
        self.page()?.execute(params).await?;
        Ok(())
    }

    async fn install_interceptor(
        &mut self,
        interceptor: RequestInterceptor,
    ) -> Result<(), BrowserError> {
        let page = self.page()?.clone();

        // Subscribe before enabling interception so no paused request is missed.
        let mut events = page.event_listener::<EventRequestPaused>().await?;

        let log = interceptor.log().clone();
        let listener_page = page.clone();
        let listener = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = resolve_paused_request(&listener_page, &interceptor, &event).await
                {
                    debug!("Failed to resolve request {}: {}", event.request.url, e);
                }
            }
        });

        let enable = fetch::EnableParams::builder()
            .pattern(
                RequestPattern::builder()
                    .url_pattern("*")
                    .request_stage(RequestStage::Request)
                    .build(),
            )
            .build();
        if let Err(e) = page.execute(enable).await {
            listener.abort();
            return Err(e.into());
        }

        self.log = Some(log);
        self.listener = Some(listener);
        Ok(())
    }

    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        let page = self.page()?;

        info!("Navigating to {}", url);
        let nav_params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| BrowserError::Navigation(format!("Invalid URL: {}", e)))?;

        let response = page
            .execute(nav_params)
            .await
            .map_err(|e| BrowserError::Navigation(e.to_string()))?;
        if let Some(error_text) = response.result.error_text.clone() {
            return Err(BrowserError::Navigation(format!("{} at {}", error_text, url)));
        }

        page.wait_for_navigation()
            .await
            .map_err(|e| BrowserError::Navigation(e.to_string()))?;

        if let Some(ref log) = self.log {
            log.wait_for_idle(NETWORK_IDLE_QUIET).await;
            debug!("Network idle for {} ({} requests observed)", url, log.len());
        }

        Ok(())
    }

    async fn final_url(&self) -> Result<Option<String>, BrowserError> {
        Ok(self.page()?.url().await?)
    }

    async fn content(&self) -> Result<String, BrowserError> {
        Ok(self.page()?.content().await?)
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
        match self.page.take() {
            Some(page) => Ok(page.close().await?),
            None => Ok(()),
        }
    }
}
