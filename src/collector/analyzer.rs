//! Single-domain analysis.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tracing::{debug, info, warn};

use super::classify::{has_ads, is_streaming};
use super::{RequestInterceptor, RequestLog};
use crate::browser::{BrowserError, BrowserIdentity, BrowserSession, PageHandle};
use crate::models::AnalysisResult;

/// Default bound on navigation plus network settling.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Error recorded for a domain whose analysis panicked.
pub const ANALYSIS_PANICKED: &str = "analysis panicked";

/// Per-domain analysis settings.
#[derive(Debug, Clone)]
pub struct AnalyzerOptions {
    pub navigation_timeout: Duration,
    pub identity: BrowserIdentity,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            identity: BrowserIdentity::default(),
        }
    }
}

/// Analyze one domain in a fresh page of `session`.
///
/// Always returns a result: navigation failures and panics become an error
/// entry with both flags false. The page is closed before returning.
pub async fn analyze(
    session: &dyn BrowserSession,
    domain: &str,
    options: &AnalyzerOptions,
) -> AnalysisResult {
    info!("Analyzing {}", domain);

    let mut page = match session.new_page().await {
        Ok(page) => page,
        Err(e) => {
            warn!("Could not open a page for {}: {}", domain, e);
            return AnalysisResult::failure(domain, e.to_string());
        }
    };

    let outcome = AssertUnwindSafe(visit(page.as_mut(), domain, options))
        .catch_unwind()
        .await;

    if let Err(e) = page.close().await {
        debug!("Failed to close page for {}: {}", domain, e);
    }

    match outcome {
        Ok(Ok((has_streaming, has_ads))) => {
            info!(
                "{}: streaming={}, ads={}",
                domain, has_streaming, has_ads
            );
            AnalysisResult::success(domain, has_streaming, has_ads)
        }
        Ok(Err(e)) => {
            warn!("Error analyzing {}: {}", domain, e);
            AnalysisResult::failure(domain, e.to_string())
        }
        Err(_) => {
            warn!("Analysis of {} panicked", domain);
            AnalysisResult::failure(domain, ANALYSIS_PANICKED)
        }
    }
}

async fn visit(
    page: &mut dyn PageHandle,
    domain: &str,
    options: &AnalyzerOptions,
) -> Result<(bool, bool), BrowserError> {
    page.set_identity(&options.identity).await?;

    let log = RequestLog::new();
    page.install_interceptor(RequestInterceptor::new(log.clone()))
        .await?;

    let url = format!("https://{}", domain);
    let timeout = options.navigation_timeout;
    match tokio::time::timeout(timeout, page.navigate(&url)).await {
        Ok(result) => result?,
        Err(_) => return Err(BrowserError::NavigationTimeout(timeout.as_millis())),
    }
    debug!("{}: {} requests observed", domain, log.len());

    let has_streaming = is_streaming(&log, &*page).await;
    let has_ads = has_ads(&log, &*page).await;
    Ok((has_streaming, has_ads))
}
