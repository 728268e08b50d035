//! Per-domain analysis outcome.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Domains analyzed when no list is configured.
pub const DEFAULT_DOMAINS: &[&str] = &[
    "twitch.tv",
    "forbes.com",
    "vimeo.com",
    "rottentomatoes.com",
    "techcrunch.com",
    "netflix.com",
    "nonexistentdomain12345.com",
    "youtube.com",
    "hulu.com",
    "imdb.com",
    "metacritic.com",
    "primevideo.com",
    "disneyplus.com",
    "hbomax.com",
    "peacocktv.com",
    "crunchyroll.com",
    "funimation.com",
    "dailymotion.com",
    "variety.com",
    "deadline.com",
];

/// Outcome of analyzing a single domain.
///
/// Serialized with the column names used by the stored CSV and the HTTP API:
/// `domain`, `hasStreaming`, `hasAds`, `error`. A missing error is written as
/// an empty string and an empty string reads back as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub domain: String,
    #[serde(deserialize_with = "bool_from_text")]
    pub has_streaming: bool,
    #[serde(deserialize_with = "bool_from_text")]
    pub has_ads: bool,
    #[serde(
        default,
        serialize_with = "error_to_text",
        deserialize_with = "error_from_text"
    )]
    pub error: Option<String>,
}

impl AnalysisResult {
    /// Result for a domain whose visit completed.
    pub fn success(domain: impl Into<String>, has_streaming: bool, has_ads: bool) -> Self {
        Self {
            domain: domain.into(),
            has_streaming,
            has_ads,
            error: None,
        }
    }

    /// Result for a domain whose visit failed. Both flags are forced to false:
    /// an unknown signal is treated as absent.
    pub fn failure(domain: impl Into<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            domain: domain.into(),
            has_streaming: false,
            has_ads: false,
            error: Some(if error.is_empty() {
                "unknown error".to_string()
            } else {
                error
            }),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Accepts a native bool or the strings `true`/`false` in any case.
fn bool_from_text<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrText {
        Bool(bool),
        Text(String),
    }

    match BoolOrText::deserialize(deserializer)? {
        BoolOrText::Bool(b) => Ok(b),
        BoolOrText::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected 'true' or 'false', got '{}'",
                other
            ))),
        },
    }
}

fn error_to_text<S>(error: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(error.as_deref().unwrap_or(""))
}

fn error_from_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}
