use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{
    env_subst::substitute_env,
    error::{Context, Error, Result},
    schema::TonalityConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "tonality.toml",
    "tonality.yaml",
    "tonality.yml",
    "tonality.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<TonalityConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./tonality.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/tonality/tonality.{toml,yaml,yml,json}` (user-global)
///
/// Returns `TonalityConfig::default()` if no config file is found or the
/// file fails to parse. Environment overrides are applied in both cases.
pub fn discover_and_load() -> TonalityConfig {
    let mut config = if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
                TonalityConfig::default()
            },
        }
    } else {
        debug!("no config file found, using defaults");
        TonalityConfig::default()
    };
    apply_env_overrides(&mut config);
    config
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    // Project-local
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    // User-global: ~/.config/tonality/
    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/tonality/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "tonality").map(|d| d.config_dir().to_path_buf())
}

/// Apply `TONALITY_REMOTE_*` environment variables on top of `config`.
pub fn apply_env_overrides(config: &mut TonalityConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

fn apply_env_overrides_with(config: &mut TonalityConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup("TONALITY_REMOTE_BASE_URL") {
        config.remote.base_url = url;
    }
    if let Some(raw) = lookup("TONALITY_REMOTE_TIMEOUT_SECS") {
        match raw.trim().parse::<u64>() {
            Ok(secs) => config.remote.timeout_secs = secs,
            Err(e) => warn!(value = %raw, error = %e, "ignoring invalid TONALITY_REMOTE_TIMEOUT_SECS"),
        }
    }
    if let Some(token) = lookup("TONALITY_REMOTE_API_TOKEN")
        && !token.is_empty()
    {
        config.remote.api_token = Some(Secret::new(token));
    }
    if let Some(raw) = lookup("TONALITY_REMOTE_ENABLED") {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => config.remote.enabled = true,
            "0" | "false" | "no" | "off" => config.remote.enabled = false,
            _ => warn!(value = %raw, "ignoring invalid TONALITY_REMOTE_ENABLED"),
        }
    }
}

fn parse_config(raw: &str, path: &Path) -> Result<TonalityConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => Err(Error::UnsupportedFormat(ext.into())),
    }
}
