//! Configuration validation engine.
//!
//! Validates configuration files against the known schema, detects
//! unknown/misspelled fields, and reports settings that will make the remote
//! sentiment path useless (zero timeouts, bad URLs, empty lexicons).

use std::{collections::HashMap, path::Path};

use url::Url;

use crate::schema::TonalityConfig;

/// Timeouts above this are accepted but hold chat-send requests open for a
/// long time.
const LONG_TIMEOUT_SECS: u64 = 120;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "syntax", "unknown-field", "type-error", "remote",
    /// "lexicon", "security", "file-ref"
    pub category: &'static str,
    /// Dotted path, e.g. "remote.timeout_secs"
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{} [{}] {}", self.severity, self.category, self.message)
        } else {
            write!(
                f,
                "{} [{}] {}: {}",
                self.severity, self.category, self.path, self.message
            )
        }
    }
}

/// Result of validating a configuration file.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<std::path::PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

// ── Schema tree for unknown-field detection ─────────────────────────────────

/// Represents the expected shape of the configuration schema.
enum KnownKeys {
    /// A struct with fixed field names.
    Struct(HashMap<&'static str, KnownKeys>),
    /// Scalar or list of scalars; stop recursion.
    Leaf,
}

/// Build the schema map mirroring every field in `schema.rs`.
fn build_schema_map() -> KnownKeys {
    use KnownKeys::{Leaf, Struct};

    Struct(HashMap::from([
        (
            "remote",
            Struct(HashMap::from([
                ("enabled", Leaf),
                ("base_url", Leaf),
                ("timeout_secs", Leaf),
                ("api_token", Leaf),
                ("user_agent", Leaf),
            ])),
        ),
        (
            "lexicon",
            Struct(HashMap::from([("positive", Leaf), ("negative", Leaf)])),
        ),
    ]))
}

// ── Levenshtein distance ────────────────────────────────────────────────────

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_chars.len()]
}

/// Find the best match for `needle` among `candidates` using Levenshtein
/// distance. Returns `Some(best)` if the distance is <= `max_distance`.
fn suggest<'a>(needle: &str, candidates: &[&'a str], max_distance: usize) -> Option<&'a str> {
    let mut best: Option<(&'a str, usize)> = None;
    for &candidate in candidates {
        let d = levenshtein(needle, candidate);
        if d > 0 && d <= max_distance && best.as_ref().is_none_or(|(_, bd)| d < *bd) {
            best = Some((candidate, d));
        }
    }
    best.map(|(s, _)| s)
}

// ── Core validation ─────────────────────────────────────────────────────────

/// Validate a config file at the given path, or discover the default config
/// file location if `path` is `None`.
#[must_use]
pub fn validate(path: Option<&Path>) -> ValidationResult {
    let config_path = if let Some(p) = path {
        Some(p.to_path_buf())
    } else {
        crate::loader::find_config_file()
    };

    let Some(ref actual_path) = config_path else {
        return ValidationResult {
            diagnostics: vec![Diagnostic {
                severity: Severity::Info,
                category: "file-ref",
                path: String::new(),
                message: "no config file found; using defaults".into(),
            }],
            config_path: None,
        };
    };

    let content = match std::fs::read_to_string(actual_path) {
        Ok(content) => crate::env_subst::substitute_env(&content),
        Err(e) => {
            return ValidationResult {
                diagnostics: vec![Diagnostic {
                    severity: Severity::Error,
                    category: "syntax",
                    path: String::new(),
                    message: format!("failed to read config file: {e}"),
                }],
                config_path: Some(actual_path.clone()),
            };
        },
    };

    let ext = actual_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("toml");
    let mut result = match ext {
        "yaml" | "yml" => validate_structured(serde_yaml::from_str::<serde_json::Value>(&content)),
        "json" => validate_structured(serde_json::from_str::<serde_json::Value>(&content)),
        _ => validate_toml_str(&content),
    };
    result.config_path = Some(actual_path.clone());
    result
}

/// Validate a TOML string without file-system side effects.
#[must_use]
pub fn validate_toml_str(toml_str: &str) -> ValidationResult {
    match toml::from_str::<toml::Value>(toml_str) {
        Ok(value) => validate_value(&value),
        Err(e) => syntax_error(format!("TOML syntax error: {e}")),
    }
}

/// Validate a YAML/JSON document by converting it into the TOML value model.
fn validate_structured<E: std::fmt::Display>(
    parsed: Result<serde_json::Value, E>,
) -> ValidationResult {
    let json = match parsed {
        Ok(v) => v,
        Err(e) => return syntax_error(format!("syntax error: {e}")),
    };
    match toml::Value::try_from(json) {
        Ok(value) => validate_value(&value),
        Err(e) => syntax_error(format!("unsupported value: {e}")),
    }
}

fn syntax_error(message: String) -> ValidationResult {
    ValidationResult {
        diagnostics: vec![Diagnostic {
            severity: Severity::Error,
            category: "syntax",
            path: String::new(),
            message,
        }],
        config_path: None,
    }
}

fn validate_value(value: &toml::Value) -> ValidationResult {
    let mut diagnostics = Vec::new();

    // 1. Unknown fields: walk the tree against KnownKeys
    let schema = build_schema_map();
    check_unknown_fields(value, &schema, "", &mut diagnostics);

    // 2. Type check: attempt full deserialization, then semantic checks
    match value.clone().try_into::<TonalityConfig>() {
        Ok(config) => check_semantic_warnings(&config, &mut diagnostics),
        Err(e) => diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "type-error",
            path: String::new(),
            message: format!("type error: {e}"),
        }),
    }

    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

/// Walk the value tree against the schema tree and flag unknown keys.
fn check_unknown_fields(
    value: &toml::Value,
    schema: &KnownKeys,
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let (toml::Value::Table(table), KnownKeys::Struct(fields)) = (value, schema) else {
        // Leaf or type mismatch: stop recursion (type errors caught later)
        return;
    };

    let known_keys: Vec<&str> = fields.keys().copied().collect();
    for (key, child_value) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        if let Some(child_schema) = fields.get(key.as_str()) {
            check_unknown_fields(child_value, child_schema, &path, diagnostics);
            continue;
        }
        let level = if prefix.is_empty() {
            "at top level "
        } else {
            ""
        };
        let msg = match suggest(key, &known_keys, 3) {
            Some(s) => format!("unknown field {level}(did you mean \"{s}\"?)"),
            None => format!("unknown field {level}"),
        };
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "unknown-field",
            path,
            message: msg.trim().to_string(),
        });
    }
}

/// Run semantic checks on a successfully parsed config.
fn check_semantic_warnings(config: &TonalityConfig, diagnostics: &mut Vec<Diagnostic>) {
    let remote = &config.remote;
    let raw_url = remote.base_url.trim();
    let parsed = Url::parse(raw_url).ok().filter(|u| {
        matches!(u.scheme(), "http" | "https") && u.host_str().is_some_and(|h| !h.is_empty())
    });

    if remote.enabled && parsed.is_none() {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "remote",
            path: "remote.base_url".into(),
            message: format!("base URL must be an http:// or https:// URL with a host (got \"{raw_url}\")"),
        });
    }

    if remote.enabled && remote.timeout_secs == 0 {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "remote",
            path: "remote.timeout_secs".into(),
            message: "timeout must be greater than zero; every remote call would time out".into(),
        });
    } else if remote.timeout_secs > LONG_TIMEOUT_SECS {
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            category: "remote",
            path: "remote.timeout_secs".into(),
            message: format!(
                "timeout of {}s holds message sends open for a long time",
                remote.timeout_secs
            ),
        });
    }

    let plaintext_remote = parsed
        .as_ref()
        .is_some_and(|u| u.scheme() == "http" && !is_local_host(u));
    if remote.api_token.is_some() && plaintext_remote {
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            category: "security",
            path: "remote.api_token".into(),
            message: "API token is sent over plaintext http to a non-local host".into(),
        });
    }

    for (name, words) in [
        ("positive", &config.lexicon.positive),
        ("negative", &config.lexicon.negative),
    ] {
        if words.is_empty() {
            diagnostics.push(Diagnostic {
                severity: Severity::Warning,
                category: "lexicon",
                path: format!("lexicon.{name}"),
                message: "word list is empty; fallback can never pick this polarity".into(),
            });
        }
        if let Some(i) = words.iter().position(|w| w.trim().is_empty()) {
            diagnostics.push(Diagnostic {
                severity: Severity::Warning,
                category: "lexicon",
                path: format!("lexicon.{name}[{i}]"),
                message: "blank entry is ignored".into(),
            });
        }
    }

    if !remote.enabled {
        diagnostics.push(Diagnostic {
            severity: Severity::Info,
            category: "remote",
            path: "remote.enabled".into(),
            message: "remote analysis disabled; all messages use the local lexicon".into(),
        });
    }
}

fn is_local_host(url: &Url) -> bool {
    matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"))
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levenshtein_identical() {
        assert_eq!(levenshtein("remote", "remote"), 0);
    }

    #[test]
    fn levenshtein_empty() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("", ""), 0);
    }

    #[test]
    fn levenshtein_counts_chars_not_bytes() {
        assert_eq!(levenshtein("güzel", "guzel"), 1);
    }

    #[test]
    fn empty_config_is_clean() {
        let result = validate_toml_str("");
        assert!(!result.has_errors(), "{:?}", result.diagnostics);
        assert_eq!(result.count(Severity::Warning), 0);
    }

    #[test]
    fn syntax_error_is_reported() {
        let result = validate_toml_str("[remote\nbase_url = 1");
        assert!(result.has_errors());
        assert_eq!(result.diagnostics[0].category, "syntax");
    }

    #[test]
    fn unknown_top_level_key_with_suggestion() {
        let result = validate_toml_str("[remot]\nenabled = true\n");
        let d = result
            .diagnostics
            .iter()
            .find(|d| d.category == "unknown-field" && d.path == "remot")
            .expect("expected unknown-field diagnostic for 'remot'");
        assert_eq!(d.severity, Severity::Error);
        assert!(d.message.contains("remote"), "{}", d.message);
    }

    #[test]
    fn unknown_nested_key_with_suggestion() {
        let result = validate_toml_str("[remote]\ntimeout_sec = 5\n");
        let d = result
            .diagnostics
            .iter()
            .find(|d| d.path == "remote.timeout_sec")
            .expect("expected unknown-field for 'remote.timeout_sec'");
        assert!(d.message.contains("timeout_secs"));
    }

    #[test]
    fn wrong_type_is_type_error() {
        let result = validate_toml_str("[remote]\ntimeout_secs = \"thirty\"\n");
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.category == "type-error")
        );
    }

    #[test]
    fn zero_timeout_is_error() {
        let result = validate_toml_str("[remote]\ntimeout_secs = 0\n");
        assert!(result.has_errors());
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.path == "remote.timeout_secs")
        );
    }

    #[test]
    fn long_timeout_is_warning() {
        let result = validate_toml_str("[remote]\ntimeout_secs = 600\n");
        assert!(!result.has_errors());
        assert_eq!(result.count(Severity::Warning), 1);
    }

    #[test]
    fn non_http_base_url_is_error() {
        let result = validate_toml_str("[remote]\nbase_url = \"ftp://example.com\"\n");
        assert!(result.has_errors());
    }

    #[test]
    fn disabled_remote_skips_url_checks() {
        let result = validate_toml_str("[remote]\nenabled = false\nbase_url = \"\"\n");
        assert!(!result.has_errors());
        assert_eq!(result.count(Severity::Info), 1);
    }

    #[test]
    fn token_over_plain_http_warns_unless_local() {
        let remote = validate_toml_str(
            "[remote]\nbase_url = \"http://space.example.com\"\napi_token = \"hf_x\"\n",
        );
        assert!(remote.diagnostics.iter().any(|d| d.category == "security"));

        for local_url in ["http://localhost:7860", "http://127.0.0.1:7860", "http://[::1]:7860"] {
            let local = validate_toml_str(&format!(
                "[remote]\nbase_url = \"{local_url}\"\napi_token = \"hf_x\"\n"
            ));
            assert!(!local.diagnostics.iter().any(|d| d.category == "security"), "{local_url}");
        }

        for lookalike in ["http://localhost.evil.example", "http://127.0.0.1.attacker.io"] {
            let result = validate_toml_str(&format!(
                "[remote]\nbase_url = \"{lookalike}\"\napi_token = \"hf_x\"\n"
            ));
            assert!(
                result.diagnostics.iter().any(|d| d.category == "security"),
                "{lookalike}"
            );
        }
    }

    #[test]
    fn base_url_without_host_is_an_error() {
        for url in ["https://", "http://", "ftp://space.example.com", "space.example.com"] {
            let result = validate_toml_str(&format!("[remote]\nbase_url = \"{url}\"\n"));
            assert!(
                result
                    .diagnostics
                    .iter()
                    .any(|d| d.severity == Severity::Error && d.path == "remote.base_url"),
                "{url}"
            );
        }
        let ok = validate_toml_str("[remote]\nbase_url = \"https://jaxfel-sentiment-analysis-turkish.hf.space\"\n");
        assert!(!ok.has_errors());
    }

    #[test]
    fn empty_and_blank_lexicon_entries_warn() {
        let result = validate_toml_str("[lexicon]\npositive = []\nnegative = [\"kötü\", \" \"]\n");
        let paths: Vec<&str> = result
            .diagnostics
            .iter()
            .filter(|d| d.category == "lexicon")
            .map(|d| d.path.as_str())
            .collect();
        assert_eq!(paths, vec!["lexicon.positive", "lexicon.negative[1]"]);
    }

    #[test]
    fn validate_reads_json_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tonality.json");
        std::fs::write(&path, r#"{"remote": {"timeout_secs": 0}, "extra": 1}"#).unwrap();

        let result = validate(Some(&path));
        assert_eq!(result.config_path.as_deref(), Some(path.as_path()));
        assert!(result.diagnostics.iter().any(|d| d.path == "extra"));
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.path == "remote.timeout_secs")
        );
    }

    #[test]
    fn validate_missing_file_is_error() {
        let result = validate(Some(Path::new("/nonexistent/tonality.toml")));
        assert!(result.has_errors());
    }

    #[test]
    fn diagnostic_display_includes_path() {
        let d = Diagnostic {
            severity: Severity::Warning,
            category: "remote",
            path: "remote.timeout_secs".into(),
            message: "slow".into(),
        };
        assert_eq!(d.to_string(), "warning [remote] remote.timeout_secs: slow");
    }
}
