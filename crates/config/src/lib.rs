//! Configuration loading, validation, and env substitution.
//!
//! Config files: `tonality.toml`, `tonality.yaml`, or `tonality.json`
//! Searched in `./` then `~/.config/tonality/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values, and
//! `TONALITY_REMOTE_*` environment overrides applied after parsing.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{apply_env_overrides, config_dir, discover_and_load, find_config_file, load_config},
    schema::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, LexiconConfig, RemoteConfig, TonalityConfig},
    validate::{Diagnostic, Severity, ValidationResult},
};
