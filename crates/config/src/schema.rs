/// Config schema types (remote inference endpoint, fallback lexicon).
use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Default Gradio Space serving the Turkish sentiment model.
pub const DEFAULT_BASE_URL: &str = "https://jaxfel-sentiment-analysis-turkish.hf.space";

/// Upper bound for the whole submit + fetch sequence. Free Spaces can take
/// tens of seconds to wake up.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Positive fallback lexicon.
pub const DEFAULT_POSITIVE_WORDS: &[&str] = &[
    "harika",
    "muhteşem",
    "güzel",
    "mutlu",
    "seviyorum",
    "mükemmel",
    "süper",
    "iyi",
    "hoş",
    "keyifli",
    "güler",
    "başarılı",
    "heyecanlı",
    "sevinçli",
    "havalı",
];

/// Negative fallback lexicon. "berbat" is listed twice and therefore
/// weighs double.
pub const DEFAULT_NEGATIVE_WORDS: &[&str] = &[
    "kötü",
    "berbat",
    "üzgün",
    "nefret",
    "mutsuz",
    "korkunç",
    "rezalet",
    "üzücü",
    "sinir",
    "iğrenç",
    "berbat",
    "sıkıcı",
    "bıktım",
    "tiksiniyorum",
    "pis",
];

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TonalityConfig {
    pub remote: RemoteConfig,
    pub lexicon: LexiconConfig,
}

/// Remote inference endpoint (a Gradio Space exposing `predict`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// When false the resolver never touches the network.
    pub enabled: bool,
    /// Space base URL, without the `/gradio_api/...` suffix.
    pub base_url: String,
    /// Deadline for submit + fetch together, in seconds.
    pub timeout_secs: u64,
    /// Hugging Face token for private Spaces.
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub api_token: Option<Secret<String>>,
    pub user_agent: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_token: None,
            user_agent: None,
        }
    }
}

impl RemoteConfig {
    #[must_use]
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }

    /// Base URL with any trailing slash removed.
    #[must_use]
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// Word lists used by the local fallback classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconConfig {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            positive: DEFAULT_POSITIVE_WORDS.iter().map(|w| (*w).into()).collect(),
            negative: DEFAULT_NEGATIVE_WORDS.iter().map(|w| (*w).into()).collect(),
        }
    }
}

// ── Serde helpers for Secret<String> ────────────────────────────────────────

fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}
