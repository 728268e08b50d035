//! Per-page request interception.
//!
//! Every outgoing request is recorded into the page's [`RequestLog`] before
//! a verdict is reached, so a request that ends up blocked still counts as
//! classification signal (a blocked `.m3u8` fetch still means streaming).

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

/// Resource type of an outgoing request, as reported by the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Document,
    Stylesheet,
    Image,
    Media,
    Font,
    Script,
    Xhr,
    Fetch,
    WebSocket,
    Other,
}

impl ResourceKind {
    /// Types that only cost load time and never carry classification signal
    /// beyond their URL.
    pub fn is_blocked(self) -> bool {
        matches!(
            self,
            ResourceKind::Image | ResourceKind::Stylesheet | ResourceKind::Font | ResourceKind::Media
        )
    }
}

/// What to do with an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Abort,
}

#[derive(Debug, Default)]
struct LogState {
    urls: HashSet<String>,
    last_activity: Option<Instant>,
}

/// Set of request URLs observed while one page loads.
///
/// Cloning yields another handle to the same set. The interceptor writes to
/// it while the page navigates; classifiers only read it afterwards.
#[derive(Debug, Clone, Default)]
pub struct RequestLog {
    state: Arc<Mutex<LogState>>,
}

impl RequestLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a request URL. Repeated URLs are kept once but still count as
    /// network activity.
    pub fn record(&self, url: &str) {
        let mut state = self.lock();
        state.last_activity = Some(Instant::now());
        if !state.urls.contains(url) {
            state.urls.insert(url.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.lock().urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().urls.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.lock().urls.contains(url)
    }

    /// True if any recorded URL contains any of `markers` as a substring.
    pub fn any_contains(&self, markers: &[&str]) -> bool {
        self.lock()
            .urls
            .iter()
            .any(|url| markers.iter().any(|marker| url.contains(marker)))
    }

    /// Snapshot of the recorded URLs, in no particular order.
    pub fn urls(&self) -> Vec<String> {
        self.lock().urls.iter().cloned().collect()
    }

    fn last_activity(&self) -> Option<Instant> {
        self.lock().last_activity
    }

    /// Resolve once no request has been observed for `quiet`.
    ///
    /// When nothing was ever recorded the quiet window starts at the call.
    /// This never gives up on its own; callers bound it with a timeout.
    pub async fn wait_for_idle(&self, quiet: Duration) {
        let started = Instant::now();
        loop {
            let since = self.last_activity().unwrap_or(started).elapsed();
            if since >= quiet {
                return;
            }
            tokio::time::sleep(quiet - since).await;
        }
    }
}

/// Records every request into a [`RequestLog`] and blocks heavy resource
/// types.
#[derive(Debug, Clone)]
pub struct RequestInterceptor {
    log: RequestLog,
}

impl RequestInterceptor {
    pub fn new(log: RequestLog) -> Self {
        Self { log }
    }

    pub fn log(&self) -> &RequestLog {
        &self.log
    }

    /// Handle one outgoing request.
    pub fn on_request(&self, url: &str, kind: ResourceKind) -> Verdict {
        self.log.record(url);
        if kind.is_blocked() {
            debug!("Blocking {:?} request: {}", kind, url);
            Verdict::Abort
        } else {
            Verdict::Continue
        }
    }
}
