//! Metrics collection and export for tonality.
//!
//! This crate provides a unified metrics interface using the `metrics` crate facade.
//! When the `prometheus` feature is enabled, metrics are exported in Prometheus format.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tonality_metrics::{counter, histogram, labels, sentiment};
//!
//! counter!(sentiment::RESOLUTIONS_TOTAL, labels::SOURCE => "remote").increment(1);
//! histogram!(sentiment::REMOTE_DURATION_SECONDS).record(0.8);
//! ```
//!
//! # Features
//!
//! - `prometheus`: Enable Prometheus text export through [`MetricsHandle::render`]

mod definitions;
mod recorder;

pub use {
    definitions::*,
    recorder::{MetricsHandle, MetricsRecorderConfig, init_metrics},
};

// Re-export metrics macros for convenience
pub use metrics::{counter, histogram};
