//! Sentiment annotation for chat messages.
//!
//! [`SentimentResolver`] asks a Gradio Space for a label and score, and
//! answers from a small word-list classifier whenever the Space is asleep,
//! unreachable, or replies with something unreadable. Callers always get a
//! [`SentimentResult`].
//!
//! ```rust,ignore
//! let config = tonality_config::discover_and_load();
//! let resolver = SentimentResolver::from_config(&config);
//! let result = resolver.analyze("harika bir gün").await;
//! ```

pub mod diagnostics;
pub mod error;
pub mod extract;
pub mod lexicon;
pub mod outcome;
pub mod remote;
pub mod resolver;

pub use {
    diagnostics::{DiagnosticEvent, DiagnosticSink, RecordingSink, TracingSink},
    error::{Phase, RemoteError},
    extract::{Extraction, PayloadFormat, extract},
    lexicon::{Lexicon, LexiconCounts},
    outcome::{AnalysisOutcome, FallbackReason, Source},
    remote::{ContentKind, GradioClient, JobSubmission, RawReplyPayload, RemoteJobClient},
    resolver::{SentimentAnalyzer, SentimentResolver},
    tonality_common::{AnnotatedMessage, SentimentLabel, SentimentResult},
};
