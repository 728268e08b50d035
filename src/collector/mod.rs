//! Concurrent domain collection.
//!
//! One browser session is launched per run and shared by every analysis.
//! Each domain gets its own page; at most `concurrency` pages are open at
//! once.

mod analyzer;
pub mod classify;
mod interceptor;
mod limiter;

pub use analyzer::{analyze, AnalyzerOptions, ANALYSIS_PANICKED, DEFAULT_NAVIGATION_TIMEOUT};
pub use interceptor::{RequestInterceptor, RequestLog, ResourceKind, Verdict};
pub use limiter::ConcurrencyLimiter;

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tracing::{info, warn};

use crate::browser::{BrowserError, BrowserIdentity, BrowserLauncher};
use crate::models::AnalysisResult;

/// Default number of domains analyzed in parallel.
pub const DEFAULT_CONCURRENCY: usize = 5;

#[derive(Debug, Clone)]
pub struct CollectorOptions {
    pub concurrency: usize,
    pub navigation_timeout: Duration,
    pub identity: BrowserIdentity,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            identity: BrowserIdentity::default(),
        }
    }
}

pub struct Collector {
    limiter: ConcurrencyLimiter,
    analyzer: AnalyzerOptions,
}

impl Collector {
    pub fn new(options: CollectorOptions) -> Self {
        Self {
            limiter: ConcurrencyLimiter::new(options.concurrency),
            analyzer: AnalyzerOptions {
                navigation_timeout: options.navigation_timeout,
                identity: options.identity,
            },
        }
    }

    pub fn concurrency(&self) -> usize {
        self.limiter.ceiling()
    }

    /// Analyze every domain and return one result per domain, in input order.
    ///
    /// Fails only if the browser cannot be launched. Per-domain failures are
    /// reported inside the results.
    pub async fn run(
        &self,
        launcher: &dyn BrowserLauncher,
        domains: &[String],
    ) -> Result<Vec<AnalysisResult>, BrowserError> {
        self.run_with_progress(launcher, domains, |_| {}).await
    }

    /// Like [`Collector::run`], calling `on_result` as each domain finishes.
    pub async fn run_with_progress<F>(
        &self,
        launcher: &dyn BrowserLauncher,
        domains: &[String],
        on_result: F,
    ) -> Result<Vec<AnalysisResult>, BrowserError>
    where
        F: Fn(&AnalysisResult) + Sync,
    {
        info!(
            "Collecting {} domains with concurrency {}",
            domains.len(),
            self.limiter.ceiling()
        );
        let mut session = launcher.launch().await?;

        let tasks = domains.iter().map(|domain| {
            let session = session.as_ref();
            let on_result = &on_result;
            async move {
                // Panics inside a page are handled by `analyze`; this covers the rest.
                let result = AssertUnwindSafe(analyze(session, domain, &self.analyzer))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| {
                        warn!("Analysis of {} panicked", domain);
                        AnalysisResult::failure(domain.as_str(), ANALYSIS_PANICKED)
                    });
                on_result(&result);
                result
            }
        });
        let results = self.limiter.run_all(tasks).await;

        if let Err(e) = session.close().await {
            warn!("Failed to close browser: {}", e);
        }

        let failed = results.iter().filter(|r| r.is_failure()).count();
        info!(
            "Collection finished: {} domains, {} failed",
            results.len(),
            failed
        );
        Ok(results)
    }
}
