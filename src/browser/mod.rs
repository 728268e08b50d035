//! Browser control layer.
//!
//! The collector talks to the browser only through the [`BrowserLauncher`],
//! [`BrowserSession`] and [`PageHandle`] traits. The chromiumoxide (CDP)
//! implementation lives in [`chrome`]; it is compiled with the `browser`
//! feature and replaced by a stub that refuses to launch otherwise.

mod chrome;
mod config;
mod error;
#[cfg(test)]
pub(crate) mod fake;

pub use chrome::ChromeLauncher;
pub use config::BrowserEngineConfig;
pub use error::BrowserError;

use async_trait::async_trait;

use crate::collector::RequestInterceptor;

/// Desktop Chrome on Windows. Headless Chrome advertises itself in its default
/// user agent, which some sites answer with a stripped-down page.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0.0.0 Safari/537.36";

/// `navigator.platform` value matching [`DEFAULT_USER_AGENT`].
pub const DEFAULT_PLATFORM: &str = "Win32";

/// Browser identity presented by every page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserIdentity {
    pub user_agent: String,
    pub platform: String,
}

impl Default for BrowserIdentity {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            platform: DEFAULT_PLATFORM.to_string(),
        }
    }
}

/// Opens the single browser session used by a collection run.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError>;
}

/// A running browser. Pages are children of the session and become invalid
/// once it is closed.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Open a fresh blank page.
    async fn new_page(&self) -> Result<Box<dyn PageHandle>, BrowserError>;

    /// Shut the browser down.
    async fn close(&mut self) -> Result<(), BrowserError>;
}

/// One browser tab, owned by a single analysis for its whole lifetime.
#[async_trait]
pub trait PageHandle: Send + Sync {
    /// Override the user agent and platform for all subsequent requests.
    async fn set_identity(&self, identity: &BrowserIdentity) -> Result<(), BrowserError>;

    /// Route every outgoing request of this page through `interceptor`.
    /// Must be called before [`PageHandle::navigate`].
    async fn install_interceptor(
        &mut self,
        interceptor: RequestInterceptor,
    ) -> Result<(), BrowserError>;

    /// Navigate and wait until the load event fired and network activity
    /// has settled. The caller bounds the wait.
    async fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    /// URL of the page after redirects.
    async fn final_url(&self) -> Result<Option<String>, BrowserError>;

    /// Serialized HTML of the rendered document.
    async fn content(&self) -> Result<String, BrowserError>;

    /// Close the tab. Further calls on this handle fail.
    async fn close(&mut self) -> Result<(), BrowserError>;
}
