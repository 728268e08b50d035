//! Streaming video detection.

use tracing::{debug, warn};

use super::{snapshot, Signal};
use crate::browser::{BrowserError, PageHandle};
use crate::collector::RequestLog;

/// Adaptive streaming manifests (HLS, DASH).
pub const MANIFEST_MARKERS: &[&str] = &[".m3u8", ".mpd"];

/// Public streaming platforms recognised from the page URL alone.
pub const STREAMING_PLATFORMS: &[&str] = &[
    "youtube.com",
    "netflix.com",
    "twitch.tv",
    "hulu.com",
    "disneyplus.com",
    "primevideo.com",
    "hbomax.com",
];

/// Iframe sources of common video embed players.
pub const EMBED_SOURCES: &[&str] = &["youtube.com/embed", "player.vimeo.com", "dailymotion.com/embed"];

/// Run the streaming checks in order of reliability and report which one
/// matched, if any.
pub async fn detect_streaming(
    log: &RequestLog,
    page: &dyn PageHandle,
) -> Result<Option<Signal>, BrowserError> {
    // Modern players fetch a manifest even when the media itself is blocked.
    if log.any_contains(MANIFEST_MARKERS) {
        return Ok(Some(Signal::Network));
    }

    if let Some(url) = page.final_url().await? {
        if STREAMING_PLATFORMS.iter().any(|p| url.contains(p)) {
            return Ok(Some(Signal::Platform));
        }
    }

    let dom = snapshot(page).await?;
    if dom.has_video_element || dom.iframe_src_contains(EMBED_SOURCES) || dom.has_video_meta {
        return Ok(Some(Signal::Dom));
    }

    Ok(None)
}

/// Whether the page serves streaming video. Never fails: an error while
/// inspecting the page yields `false`.
pub async fn is_streaming(log: &RequestLog, page: &dyn PageHandle) -> bool {
    match detect_streaming(log, page).await {
        Ok(Some(signal)) => {
            debug!("Streaming detected via {:?} signal", signal);
            true
        }
        Ok(None) => false,
        Err(e) => {
            let url = page.final_url().await.ok().flatten().unwrap_or_default();
            warn!("Error checking streaming for {}: {}", url, e);
            false
        }
    }
}
