//! Observation hooks for the analysis pipeline.
//!
//! Every step of an analysis reports a [`DiagnosticEvent`] to a
//! [`DiagnosticSink`]. Sinks only observe; nothing they do can change the
//! result of an analysis.

use {
    std::{
        sync::{Arc, Mutex},
        time::Duration,
    },
    tonality_common::SentimentResult,
    tracing::{debug, info, warn},
};

use crate::{
    extract::PayloadFormat,
    outcome::{AnalysisOutcome, FallbackReason},
    remote::ContentKind,
};

const PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEvent {
    /// The Space accepted the job.
    Submitted { event_id: String },
    /// The submit reply had no event id.
    SubmissionRejected { status: u16, body_preview: String },
    /// The result body was read.
    Fetched {
        status: u16,
        bytes: usize,
        content_kind: ContentKind,
    },
    RemoteFailed {
        reason: FallbackReason,
        message: String,
        elapsed: Duration,
    },
    RemoteSucceeded { elapsed: Duration },
    Extracted {
        result: SentimentResult,
        format: PayloadFormat,
        malformed: Vec<&'static str>,
    },
    NothingExtracted { bytes: usize },
    /// Final answer for one analysis.
    Resolved { outcome: AnalysisOutcome },
}

pub trait DiagnosticSink: Send + Sync {
    fn record(&self, event: &DiagnosticEvent);
}

/// Default sink: one `tracing` event per diagnostic.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, event: &DiagnosticEvent) {
        match event {
            DiagnosticEvent::Submitted { event_id } => {
                debug!(event_id = %event_id, "sentiment job submitted");
            },
            DiagnosticEvent::SubmissionRejected {
                status,
                body_preview,
            } => {
                warn!(status, body = %body_preview, "submit reply carried no event id");
            },
            DiagnosticEvent::Fetched {
                status,
                bytes,
                content_kind,
            } => {
                debug!(status, bytes, content_kind = content_kind.as_str(), "sentiment result fetched");
            },
            DiagnosticEvent::RemoteFailed {
                reason: FallbackReason::TimedOut,
                elapsed,
                ..
            } => {
                warn!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    "remote sentiment timed out, the Space may be asleep"
                );
            },
            DiagnosticEvent::RemoteFailed {
                reason,
                message,
                elapsed,
            } => {
                warn!(
                    reason = reason.as_str(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %message,
                    "remote sentiment failed"
                );
            },
            DiagnosticEvent::RemoteSucceeded { elapsed } => {
                debug!(elapsed_ms = elapsed.as_millis() as u64, "remote sentiment completed");
            },
            DiagnosticEvent::Extracted {
                result,
                format,
                malformed,
            } => {
                if !malformed.is_empty() {
                    warn!(fields = ?malformed, "sentiment reply had wrong-typed fields, using defaults");
                }
                debug!(
                    label = result.label.as_str(),
                    score = result.score,
                    format = format.as_str(),
                    "sentiment extracted"
                );
            },
            DiagnosticEvent::NothingExtracted { bytes } => {
                warn!(bytes, "no sentiment found in remote reply");
            },
            DiagnosticEvent::Resolved { outcome } => {
                info!(
                    label = outcome.result.label.as_str(),
                    score = outcome.result.score,
                    path = outcome.source.as_str(),
                    reason = outcome.fallback_reason.map(FallbackReason::as_str),
                    "sentiment resolved"
                );
            },
        }
    }
}

/// Keeps every event in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    #[must_use]
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl DiagnosticSink for RecordingSink {
    fn record(&self, event: &DiagnosticEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// First [`PREVIEW_CHARS`] characters of a body, for logging.
pub(crate) fn preview(body: &str) -> String {
    match body.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, tonality_common::SentimentLabel};

    #[test]
    fn preview_truncates_on_char_boundary() {
        let long = "ü".repeat(300);
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 1);
        assert!(p.ends_with('…'));
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        sink.record(&DiagnosticEvent::Submitted {
            event_id: "abc".into(),
        });
        sink.record(&DiagnosticEvent::NothingExtracted { bytes: 3 });
        assert_eq!(
            sink.events(),
            vec![
                DiagnosticEvent::Submitted {
                    event_id: "abc".into()
                },
                DiagnosticEvent::NothingExtracted { bytes: 3 },
            ]
        );
    }

    #[test]
    fn tracing_sink_accepts_every_event() {
        let outcome = AnalysisOutcome::fallback(
            SentimentResult::new(SentimentLabel::Negative, 0.25),
            FallbackReason::TimedOut,
        );
        for event in [
            DiagnosticEvent::RemoteFailed {
                reason: FallbackReason::TimedOut,
                message: "timed out".into(),
                elapsed: Duration::from_secs(30),
            },
            DiagnosticEvent::Extracted {
                result: SentimentResult::neutral(),
                format: PayloadFormat::EventStream,
                malformed: vec!["score"],
            },
            DiagnosticEvent::Resolved { outcome },
        ] {
            TracingSink.record(&event);
        }
    }
}
