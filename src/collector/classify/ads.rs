//! Google ad-network detection.

use tracing::{debug, warn};

use super::{snapshot, Signal};
use crate::browser::{BrowserError, PageHandle};
use crate::collector::RequestLog;

/// Domains serving AdSense and DoubleClick ads.
pub const AD_NETWORK_MARKERS: &[&str] = &["googlesyndication.com", "doubleclick.net"];

/// GPT ad slots render into iframes with ids like `google_ads_iframe_/1234/slot_0`.
pub const AD_IFRAME_ID_MARKERS: &[&str] = &["google_ads_iframe"];

pub const AD_IFRAME_SRC_MARKERS: &[&str] = &["googleads"];

pub async fn detect_ads(
    log: &RequestLog,
    page: &dyn PageHandle,
) -> Result<Option<Signal>, BrowserError> {
    if log.any_contains(AD_NETWORK_MARKERS) {
        return Ok(Some(Signal::Network));
    }

    let dom = snapshot(page).await?;
    if dom.has_ad_container
        || dom.iframe_id_contains(AD_IFRAME_ID_MARKERS)
        || dom.iframe_src_contains(AD_IFRAME_SRC_MARKERS)
    {
        return Ok(Some(Signal::Dom));
    }

    Ok(None)
}

/// Whether the page serves Google ads. Same error policy as streaming
/// detection: a failed page inspection yields `false`.
pub async fn has_ads(log: &RequestLog, page: &dyn PageHandle) -> bool {
    match detect_ads(log, page).await {
        Ok(Some(signal)) => {
            debug!("Ads detected via {:?} signal", signal);
            true
        }
        Ok(None) => false,
        Err(e) => {
            let url = page.final_url().await.ok().flatten().unwrap_or_default();
            warn!("Error checking ads for {}: {}", url, e);
            false
        }
    }
}
