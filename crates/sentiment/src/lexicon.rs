//! Fixed-lexicon fallback classifier.
//!
//! Counts how many entries of a positive and a negative word list occur in
//! the lower-cased message. Matching is plain substring containment, so
//! "iyi" also hits "iyiyim" and every duplicated list entry counts again.

use {
    once_cell::sync::Lazy,
    tonality_common::{SentimentLabel, SentimentResult},
    tonality_config::{
        LexiconConfig,
        schema::{DEFAULT_NEGATIVE_WORDS, DEFAULT_POSITIVE_WORDS},
    },
};

/// Score reported when positive hits outnumber negative ones.
pub const POSITIVE_SCORE: f64 = 0.75;
/// Score reported when negative hits outnumber positive ones.
pub const NEGATIVE_SCORE: f64 = 0.25;

static DEFAULT_LEXICON: Lazy<Lexicon> = Lazy::new(Lexicon::default);

/// Classify `text` with the built-in Turkish lexicon.
#[must_use]
pub fn classify(text: &str) -> SentimentResult {
    DEFAULT_LEXICON.classify(text)
}

/// Number of list entries found in a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexiconCounts {
    pub positive: usize,
    pub negative: usize,
}

impl LexiconCounts {
    #[must_use]
    pub fn verdict(self) -> SentimentResult {
        use std::cmp::Ordering;

        match self.positive.cmp(&self.negative) {
            Ordering::Greater => SentimentResult::new(SentimentLabel::Positive, POSITIVE_SCORE),
            Ordering::Less => SentimentResult::new(SentimentLabel::Negative, NEGATIVE_SCORE),
            Ordering::Equal => SentimentResult::neutral(),
        }
    }
}

/// Positive and negative word lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexicon {
    positive: Vec<String>,
    negative: Vec<String>,
}

impl Lexicon {
    /// Build a lexicon from arbitrary word lists. Entries are lower-cased
    /// and blank entries are dropped.
    #[must_use]
    pub fn new<P, N>(positive: P, negative: N) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        N: IntoIterator,
        N::Item: AsRef<str>,
    {
        Self {
            positive: normalize(positive),
            negative: normalize(negative),
        }
    }

    #[must_use]
    pub fn from_config(config: &LexiconConfig) -> Self {
        Self::new(&config.positive, &config.negative)
    }

    #[must_use]
    pub fn counts(&self, text: &str) -> LexiconCounts {
        let lower = text.to_lowercase();
        LexiconCounts {
            positive: hits(&self.positive, &lower),
            negative: hits(&self.negative, &lower),
        }
    }

    #[must_use]
    pub fn classify(&self, text: &str) -> SentimentResult {
        self.counts(text).verdict()
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new(DEFAULT_POSITIVE_WORDS, DEFAULT_NEGATIVE_WORDS)
    }
}

fn normalize<I>(words: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    words
        .into_iter()
        .map(|w| w.as_ref().trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

fn hits(words: &[String], lower: &str) -> usize {
    words.iter().filter(|w| lower.contains(w.as_str())).count()
}
