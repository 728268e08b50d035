//! Streaming and ad classifiers.
//!
//! Both classifiers check the page's request log first and fall back to
//! inspecting the rendered page only when the network is inconclusive.
//! Errors while inspecting the page are logged and count as "not detected":
//! an unknown signal is treated as absent.

mod ads;
mod dom;
mod streaming;

pub use ads::{detect_ads, has_ads, AD_IFRAME_ID_MARKERS, AD_IFRAME_SRC_MARKERS, AD_NETWORK_MARKERS};
pub use dom::{DomSnapshot, FrameInfo};
pub use streaming::{
    detect_streaming, is_streaming, EMBED_SOURCES, MANIFEST_MARKERS, STREAMING_PLATFORMS,
};

use crate::browser::{BrowserError, PageHandle};

/// Which check produced a positive classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// A recorded request URL matched.
    Network,
    /// The page's final URL belongs to a known platform.
    Platform,
    /// The rendered element tree matched.
    Dom,
}

/// Fetch and parse the page's current HTML.
async fn snapshot(page: &dyn PageHandle) -> Result<DomSnapshot, BrowserError> {
    let html = page.content().await?;
    Ok(DomSnapshot::parse(&html))
}
