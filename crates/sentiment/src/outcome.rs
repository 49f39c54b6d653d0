use {serde::Serialize, tonality_common::SentimentResult};

/// Which path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Remote,
    Fallback,
}

impl Source {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Fallback => "fallback",
        }
    }
}

/// Why the lexicon was consulted instead of the remote model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    RemoteDisabled,
    EmptyText,
    SubmissionFailed,
    TimedOut,
    Transport,
    ParseNotFound,
}

impl FallbackReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RemoteDisabled => "remote_disabled",
            Self::EmptyText => "empty_text",
            Self::SubmissionFailed => "submission_failed",
            Self::TimedOut => "timed_out",
            Self::Transport => "transport",
            Self::ParseNotFound => "parse_not_found",
        }
    }
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A result together with where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnalysisOutcome {
    #[serde(flatten)]
    pub result: SentimentResult,
    pub source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
}

impl AnalysisOutcome {
    #[must_use]
    pub fn remote(result: SentimentResult) -> Self {
        Self {
            result,
            source: Source::Remote,
            fallback_reason: None,
        }
    }

    #[must_use]
    pub fn fallback(result: SentimentResult, reason: FallbackReason) -> Self {
        Self {
            result,
            source: Source::Fallback,
            fallback_reason: Some(reason),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, tonality_common::SentimentLabel};

    #[test]
    fn serializes_flat() {
        let outcome = AnalysisOutcome::fallback(
            SentimentResult::new(SentimentLabel::Positive, 0.75),
            FallbackReason::TimedOut,
        );
        let json = serde_json::to_value(outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "label": "positive",
                "score": 0.75,
                "source": "fallback",
                "fallback_reason": "timed_out",
            })
        );
    }

    #[test]
    fn remote_outcome_omits_reason() {
        let json = serde_json::to_value(AnalysisOutcome::remote(SentimentResult::neutral())).unwrap();
        assert_eq!(json["source"], "remote");
        assert!(json.get("fallback_reason").is_none());
    }
}
