//! Metric name and label definitions.
//!
//! This module defines all metric names and common label keys used throughout tonality.
//! Centralizing these definitions ensures consistency and makes it easier to document
//! what metrics are available.

/// Sentiment pipeline metrics
pub mod sentiment {
    /// Total number of analyses, labelled by `source` (remote / fallback)
    pub const RESOLUTIONS_TOTAL: &str = "tonality_sentiment_resolutions_total";
    /// Total number of remote submit + fetch attempts
    pub const REMOTE_ATTEMPTS_TOTAL: &str = "tonality_sentiment_remote_attempts_total";
    /// Remote failures, labelled by `error_type`
    pub const REMOTE_FAILURES_TOTAL: &str = "tonality_sentiment_remote_failures_total";
    /// Duration of the remote submit + fetch sequence in seconds
    pub const REMOTE_DURATION_SECONDS: &str = "tonality_sentiment_remote_duration_seconds";
    /// Extraction attempts, labelled by `outcome` (found / not_found) and `format`
    pub const EXTRACTIONS_TOTAL: &str = "tonality_sentiment_extractions_total";
}

/// Common label keys
pub mod labels {
    pub const SOURCE: &str = "source";
    pub const ERROR_TYPE: &str = "error_type";
    pub const OUTCOME: &str = "outcome";
    pub const FORMAT: &str = "format";
    pub const LABEL: &str = "label";
}

/// Standard histogram buckets for different metric types
pub mod buckets {
    use once_cell::sync::Lazy;

    /// Remote inference duration buckets (in seconds)
    /// Covers 50ms to 2 minutes; sleeping Spaces sit in the long tail
    pub static REMOTE_DURATION: Lazy<Vec<f64>> = Lazy::new(|| {
        vec![
            0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0,
        ]
    });
}
