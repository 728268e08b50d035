//! Structural facts extracted from a rendered page's HTML.

use scraper::{Html, Selector};

/// An `<iframe>` with the attributes the classifiers look at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameInfo {
    pub id: String,
    pub src: String,
}

/// The parts of the element tree used as DOM signal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomSnapshot {
    /// A native `<video>` element is present.
    pub has_video_element: bool,
    /// `<meta property="og:video">` is present.
    pub has_video_meta: bool,
    /// An AdSense container (`.adsbygoogle`) is present.
    pub has_ad_container: bool,
    pub iframes: Vec<FrameInfo>,
}

impl DomSnapshot {
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);

        let iframes = match Selector::parse("iframe") {
            Ok(selector) => document
                .select(&selector)
                .map(|frame| FrameInfo {
                    id: frame.value().attr("id").unwrap_or_default().to_string(),
                    src: frame.value().attr("src").unwrap_or_default().to_string(),
                })
                .collect(),
            Err(_) => Vec::new(),
        };

        Self {
            has_video_element: matches_any(&document, "video"),
            has_video_meta: matches_any(&document, r#"meta[property="og:video"]"#),
            has_ad_container: matches_any(&document, ".adsbygoogle"),
            iframes,
        }
    }

    /// True if any iframe `src` contains one of `markers`.
    pub fn iframe_src_contains(&self, markers: &[&str]) -> bool {
        self.iframes
            .iter()
            .any(|f| markers.iter().any(|m| f.src.contains(m)))
    }

    /// True if any iframe `id` contains one of `markers`.
    pub fn iframe_id_contains(&self, markers: &[&str]) -> bool {
        self.iframes
            .iter()
            .any(|f| markers.iter().any(|m| f.id.contains(m)))
    }
}

fn matches_any(document: &Html, selector: &str) -> bool {
    if let Ok(selector) = Selector::parse(selector) {
        document.select(&selector).next().is_some()
    } else {
        false
    }
}
