//! Turns a chat message into a sentiment, whatever the remote model does.

use {
    async_trait::async_trait,
    std::{
        sync::Arc,
        time::{Duration, Instant},
    },
    tonality_common::{AnnotatedMessage, SentimentResult},
    tonality_config::TonalityConfig,
};

#[cfg(feature = "metrics")]
use tonality_metrics::{counter, histogram, labels, sentiment as sentiment_metrics};

use crate::{
    diagnostics::{DiagnosticEvent, DiagnosticSink, TracingSink},
    error::RemoteError,
    extract::{Extraction, extract},
    lexicon::Lexicon,
    outcome::{AnalysisOutcome, FallbackReason},
    remote::{GradioClient, RawReplyPayload, RemoteJobClient},
};

/// Something that can annotate a chat message.
#[async_trait]
pub trait SentimentAnalyzer: Send + Sync {
    /// Never fails; the worst case is a lexicon guess.
    async fn analyze(&self, text: &str) -> SentimentResult;

    async fn annotate(&self, text: &str) -> AnnotatedMessage {
        let result = self.analyze(text).await;
        AnnotatedMessage::new(text, result)
    }
}

/// Remote model first, lexicon when that yields nothing usable.
///
/// Holds no per-request state, so one instance can serve many tasks behind an
/// `Arc`.
pub struct SentimentResolver {
    remote: Option<Arc<dyn RemoteJobClient>>,
    lexicon: Lexicon,
    timeout: Duration,
    sink: Arc<dyn DiagnosticSink>,
}

impl std::fmt::Debug for SentimentResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentimentResolver")
            .field("remote", &self.remote.is_some())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl SentimentResolver {
    #[must_use]
    pub fn new(remote: Arc<dyn RemoteJobClient>, lexicon: Lexicon, timeout: Duration) -> Self {
        Self {
            remote: Some(remote),
            lexicon,
            timeout,
            sink: Arc::new(TracingSink),
        }
    }

    /// Lexicon only; never touches the network.
    #[must_use]
    pub fn offline(lexicon: Lexicon) -> Self {
        Self {
            remote: None,
            lexicon,
            timeout: Duration::ZERO,
            sink: Arc::new(TracingSink),
        }
    }

    #[must_use]
    pub fn from_config(config: &TonalityConfig) -> Self {
        Self::from_config_with_sink(config, Arc::new(TracingSink))
    }

    /// Build from config, routing client and resolver diagnostics to `sink`.
    #[must_use]
    pub fn from_config_with_sink(config: &TonalityConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        let lexicon = Lexicon::from_config(&config.lexicon);
        let resolver = if config.remote.enabled {
            let client = GradioClient::from_config(&config.remote).with_sink(Arc::clone(&sink));
            Self::new(Arc::new(client), lexicon, config.remote.timeout())
        } else {
            Self::offline(lexicon)
        };
        resolver.with_sink(sink)
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub fn is_offline(&self) -> bool {
        self.remote.is_none()
    }

    pub async fn analyze(&self, text: &str) -> SentimentResult {
        self.analyze_detailed(text).await.result
    }

    /// Like [`analyze`](Self::analyze) but reports which path answered.
    pub async fn analyze_detailed(&self, text: &str) -> AnalysisOutcome {
        let outcome = self.resolve(text).await;

        #[cfg(feature = "metrics")]
        counter!(
            sentiment_metrics::RESOLUTIONS_TOTAL,
            labels::SOURCE => outcome.source.as_str(),
            labels::LABEL => outcome.result.label.as_str()
        )
        .increment(1);

        self.sink.record(&DiagnosticEvent::Resolved { outcome });
        outcome
    }

    async fn resolve(&self, text: &str) -> AnalysisOutcome {
        if text.trim().is_empty() {
            return AnalysisOutcome::fallback(SentimentResult::neutral(), FallbackReason::EmptyText);
        }
        let Some(remote) = &self.remote else {
            return self.fall_back(text, FallbackReason::RemoteDisabled);
        };

        let payload = match self.attempt_remote(remote.as_ref(), text).await {
            Ok(payload) => payload,
            Err(err) => return self.fall_back(text, err.fallback_reason()),
        };

        match extract(&payload.body) {
            Extraction::Found {
                result,
                format,
                malformed,
            } => {
                #[cfg(feature = "metrics")]
                counter!(
                    sentiment_metrics::EXTRACTIONS_TOTAL,
                    labels::OUTCOME => "found",
                    labels::FORMAT => format.as_str()
                )
                .increment(1);

                self.sink.record(&DiagnosticEvent::Extracted {
                    result,
                    format,
                    malformed,
                });
                AnalysisOutcome::remote(result.clamped())
            },
            Extraction::NotFound => {
                #[cfg(feature = "metrics")]
                counter!(
                    sentiment_metrics::EXTRACTIONS_TOTAL,
                    labels::OUTCOME => "not_found",
                    labels::FORMAT => payload.content_kind.as_str()
                )
                .increment(1);

                self.sink.record(&DiagnosticEvent::NothingExtracted {
                    bytes: payload.body.len(),
                });
                self.fall_back(text, FallbackReason::ParseNotFound)
            },
        }
    }

    /// One submit/fetch round trip, bounded by the configured timeout even
    /// if the client ignores it.
    async fn attempt_remote(
        &self,
        remote: &dyn RemoteJobClient,
        text: &str,
    ) -> Result<RawReplyPayload, RemoteError> {
        #[cfg(feature = "metrics")]
        counter!(sentiment_metrics::REMOTE_ATTEMPTS_TOTAL).increment(1);

        let started = Instant::now();
        let result = tokio::time::timeout(self.timeout, remote.submit_and_fetch(text, self.timeout))
            .await
            .unwrap_or_else(|_| Err(RemoteError::TimedOut(self.timeout)));
        let elapsed = started.elapsed();

        #[cfg(feature = "metrics")]
        histogram!(sentiment_metrics::REMOTE_DURATION_SECONDS).record(elapsed.as_secs_f64());

        match &result {
            Ok(_) => self.sink.record(&DiagnosticEvent::RemoteSucceeded { elapsed }),
            Err(err) => {
                #[cfg(feature = "metrics")]
                counter!(
                    sentiment_metrics::REMOTE_FAILURES_TOTAL,
                    labels::ERROR_TYPE => err.kind()
                )
                .increment(1);

                self.sink.record(&DiagnosticEvent::RemoteFailed {
                    reason: err.fallback_reason(),
                    message: err.to_string(),
                    elapsed,
                });
            },
        }
        result
    }

    fn fall_back(&self, text: &str, reason: FallbackReason) -> AnalysisOutcome {
        AnalysisOutcome::fallback(self.lexicon.classify(text), reason)
    }
}

#[async_trait]
impl SentimentAnalyzer for SentimentResolver {
    async fn analyze(&self, text: &str) -> SentimentResult {
        SentimentResolver::analyze(self, text).await
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            diagnostics::RecordingSink,
            error::Phase,
            outcome::Source,
            remote::ContentKind,
        },
        std::sync::atomic::{AtomicUsize, Ordering},
        tonality_common::SentimentLabel,
    };

    /// Replies with a canned outcome and counts calls.
    struct CannedClient {
        reply: fn() -> Result<RawReplyPayload, RemoteError>,
        calls: AtomicUsize,
    }

    impl CannedClient {
        fn new(reply: fn() -> Result<RawReplyPayload, RemoteError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RemoteJobClient for CannedClient {
        async fn submit_and_fetch(
            &self,
            _text: &str,
            _timeout: Duration,
        ) -> Result<RawReplyPayload, RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.reply)()
        }
    }

    /// Ignores the timeout it is handed.
    struct HangingClient;

    #[async_trait]
    impl RemoteJobClient for HangingClient {
        async fn submit_and_fetch(
            &self,
            _text: &str,
            _timeout: Duration,
        ) -> Result<RawReplyPayload, RemoteError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(RemoteError::transport(Phase::Fetch, "unreachable"))
        }
    }

    fn body(text: &str) -> Result<RawReplyPayload, RemoteError> {
        Ok(RawReplyPayload {
            body: text.into(),
            content_kind: ContentKind::Unknown,
        })
    }

    fn resolver(client: Arc<dyn RemoteJobClient>) -> SentimentResolver {
        SentimentResolver::new(client, Lexicon::default(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn remote_result_is_accepted() {
        let client = CannedClient::new(|| body(r#"[{"sentiment":"negatif","score":0.1}]"#));
        let outcome = resolver(client.clone())
            .analyze_detailed("harika ve mükemmel")
            .await;
        assert_eq!(
            outcome,
            AnalysisOutcome::remote(SentimentResult::new(SentimentLabel::Negative, 0.1))
        );
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn remote_score_is_clamped() {
        let client = CannedClient::new(|| body(r#"{"sentiment":"pozitif","score":1.8}"#));
        let result = resolver(client).analyze("x").await;
        assert_eq!(result, SentimentResult::new(SentimentLabel::Positive, 1.0));
    }

    #[tokio::test]
    async fn unparsable_reply_falls_back() {
        let client = CannedClient::new(|| body("not json at all"));
        let outcome = resolver(client)
            .analyze_detailed("harika ve mükemmel bir gün")
            .await;
        assert_eq!(outcome.source, Source::Fallback);
        assert_eq!(outcome.fallback_reason, Some(FallbackReason::ParseNotFound));
        assert_eq!(
            outcome.result,
            SentimentResult::new(SentimentLabel::Positive, 0.75)
        );
    }

    #[tokio::test]
    async fn each_remote_failure_falls_back_with_its_reason() {
        let cases: [(fn() -> Result<RawReplyPayload, RemoteError>, FallbackReason); 3] = [
            (
                || Err(RemoteError::SubmissionFailed { status: 200 }),
                FallbackReason::SubmissionFailed,
            ),
            (
                || Err(RemoteError::TimedOut(Duration::from_secs(30))),
                FallbackReason::TimedOut,
            ),
            (
                || Err(RemoteError::transport(Phase::Submit, "refused")),
                FallbackReason::Transport,
            ),
        ];
        for (reply, reason) in cases {
            let outcome = resolver(CannedClient::new(reply))
                .analyze_detailed("çok kötü")
                .await;
            assert_eq!(
                outcome,
                AnalysisOutcome::fallback(
                    SentimentResult::new(SentimentLabel::Negative, 0.25),
                    reason
                )
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_client_is_cut_off() {
        let resolver =
            SentimentResolver::new(Arc::new(HangingClient), Lexicon::default(), Duration::from_secs(30));
        let outcome = resolver.analyze_detailed("Merhaba, nasılsın?").await;
        assert_eq!(
            outcome,
            AnalysisOutcome::fallback(SentimentResult::neutral(), FallbackReason::TimedOut)
        );
    }

    #[tokio::test]
    async fn blank_text_skips_remote() {
        let client = CannedClient::new(|| body(r#"[{"sentiment":"pozitif","score":0.9}]"#));
        let outcome = resolver(client.clone()).analyze_detailed("   \n").await;
        assert_eq!(
            outcome,
            AnalysisOutcome::fallback(SentimentResult::neutral(), FallbackReason::EmptyText)
        );
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn offline_uses_lexicon() {
        let resolver = SentimentResolver::offline(Lexicon::default());
        assert!(resolver.is_offline());
        let outcome = resolver.analyze_detailed("mutlu ve keyifli").await;
        assert_eq!(outcome.fallback_reason, Some(FallbackReason::RemoteDisabled));
        assert_eq!(outcome.result.label, SentimentLabel::Positive);
    }

    #[test]
    fn disabled_config_is_offline() {
        let mut config = TonalityConfig::default();
        config.remote.enabled = false;
        assert!(SentimentResolver::from_config(&config).is_offline());
        config.remote.enabled = true;
        assert!(!SentimentResolver::from_config(&config).is_offline());
    }

    #[tokio::test]
    async fn diagnostics_trace_the_path() {
        let sink = RecordingSink::new();
        let client = CannedClient::new(|| body("{}"));
        let resolver = resolver(client).with_sink(sink.clone());
        resolver.analyze("iyi").await;

        let events = sink.events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], DiagnosticEvent::RemoteSucceeded { .. }));
        assert_eq!(events[1], DiagnosticEvent::NothingExtracted { bytes: 2 });
        assert!(matches!(
            events[2],
            DiagnosticEvent::Resolved {
                outcome: AnalysisOutcome {
                    source: Source::Fallback,
                    fallback_reason: Some(FallbackReason::ParseNotFound),
                    ..
                }
            }
        ));
    }

    #[tokio::test]
    async fn annotate_through_trait_object() {
        let analyzer: Arc<dyn SentimentAnalyzer> =
            Arc::new(SentimentResolver::offline(Lexicon::default()));
        let message = analyzer.annotate("berbat bir gün").await;
        assert_eq!(message.text, "berbat bir gün");
        assert_eq!(message.sentiment, SentimentLabel::Negative);
        assert_eq!(message.sentiment_score, 0.25);
    }
}
