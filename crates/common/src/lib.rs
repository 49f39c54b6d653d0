//! Shared sentiment types and error helpers used across all tonality crates.

pub mod error;
pub mod types;

pub use {
    error::FromMessage,
    types::{AnnotatedMessage, SentimentLabel, SentimentResult},
};
