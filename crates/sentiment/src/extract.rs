//! Pull a sentiment label and score out of a Gradio reply body.
//!
//! Replies arrive either as a bare JSON document or as a server-sent event
//! stream whose `data:` lines carry the JSON. Extraction tries the body as
//! JSON first and only scans for `data:` lines when that parse fails.
//!
//! Recognised shapes:
//!
//! ```text
//! [{"sentiment": "pozitif", "score": 0.93}]   first element object
//! ["LABEL: negative"]                           first element string
//! {"sentiment": "nötr", "score": 0.5}           bare object
//! ```

use {
    serde_json::{Map, Value},
    tonality_common::{SentimentLabel, SentimentResult, types::NEUTRAL_SCORE},
};

const SENTIMENT_FIELD: &str = "sentiment";
const SCORE_FIELD: &str = "score";

/// Which framing the sentiment was recovered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    PlainJson,
    EventStream,
}

impl PayloadFormat {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PlainJson => "json",
            Self::EventStream => "event_stream",
        }
    }
}

/// Outcome of one extraction attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Found {
        result: SentimentResult,
        format: PayloadFormat,
        /// Fields that were present with the wrong JSON type and fell back
        /// to their defaults.
        malformed: Vec<&'static str>,
    },
    NotFound,
}

impl Extraction {
    #[must_use]
    pub fn result(&self) -> Option<SentimentResult> {
        match self {
            Self::Found { result, .. } => Some(*result),
            Self::NotFound => None,
        }
    }

    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

/// Extract a sentiment from a raw reply body. Never fails: malformed or
/// partial input yields [`Extraction::NotFound`].
#[must_use]
pub fn extract(payload: &str) -> Extraction {
    if let Ok(doc) = serde_json::from_str::<Value>(payload) {
        return interpret(&doc, PayloadFormat::PlainJson);
    }

    let Some(joined) = event_stream_data(payload) else {
        return Extraction::NotFound;
    };
    match serde_json::from_str::<Value>(&joined) {
        Ok(doc) => interpret(&doc, PayloadFormat::EventStream),
        Err(_) => Extraction::NotFound,
    }
}

/// Concatenate the trimmed contents of every `data:` line, in order and with
/// no separator. `None` when the payload has no non-empty `data:` line.
fn event_stream_data(payload: &str) -> Option<String> {
    let mut joined = String::new();
    let mut matched = false;
    for line in payload.lines() {
        let Some(content) = line.strip_prefix("data:").map(str::trim) else {
            continue;
        };
        if content.is_empty() {
            continue;
        }
        matched = true;
        joined.push_str(content);
    }
    matched.then_some(joined)
}

fn interpret(doc: &Value, format: PayloadFormat) -> Extraction {
    match doc {
        Value::Array(items) => match items.first() {
            Some(Value::Object(fields)) => read_fields(fields, format),
            Some(Value::String(raw)) => Extraction::Found {
                result: SentimentResult::new(SentimentLabel::from_label_text(raw), NEUTRAL_SCORE),
                format,
                malformed: Vec::new(),
            },
            _ => Extraction::NotFound,
        },
        Value::Object(fields)
            if fields.contains_key(SENTIMENT_FIELD) || fields.contains_key(SCORE_FIELD) =>
        {
            read_fields(fields, format)
        },
        _ => Extraction::NotFound,
    }
}

fn read_fields(fields: &Map<String, Value>, format: PayloadFormat) -> Extraction {
    let mut result = SentimentResult::neutral();
    let mut malformed = Vec::new();

    match fields.get(SENTIMENT_FIELD) {
        Some(Value::String(raw)) => result.label = SentimentLabel::from_label_text(raw),
        Some(_) => malformed.push(SENTIMENT_FIELD),
        None => {},
    }
    match fields.get(SCORE_FIELD).map(Value::as_f64) {
        Some(Some(score)) => result.score = score,
        Some(None) => malformed.push(SCORE_FIELD),
        None => {},
    }

    Extraction::Found {
        result,
        format,
        malformed,
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn found(payload: &str) -> SentimentResult {
        extract(payload)
            .result()
            .unwrap_or_else(|| panic!("expected a sentiment in {payload:?}"))
    }

    #[test]
    fn array_of_objects() {
        let r = found(r#"[{"sentiment":"pozitif","score":0.9}]"#);
        assert_eq!(r, SentimentResult::new(SentimentLabel::Positive, 0.9));
    }

    #[test]
    fn bare_object() {
        let r = found(r#"{"sentiment":"negatif","score":0.1}"#);
        assert_eq!(r, SentimentResult::new(SentimentLabel::Negative, 0.1));
    }

    #[test]
    fn event_stream_matches_direct_form() {
        let direct = extract(r#"[{"sentiment":"negatif","score":0.2}]"#);
        let streamed = extract("data: [{\"sentiment\":\"negatif\",\"score\":0.2}]\n\n");
        assert_eq!(streamed.result(), direct.result());
        assert_eq!(
            streamed.result(),
            Some(SentimentResult::new(SentimentLabel::Negative, 0.2))
        );
        assert!(matches!(
            streamed,
            Extraction::Found {
                format: PayloadFormat::EventStream,
                ..
            }
        ));
    }

    #[test]
    fn gradio_complete_event() {
        let body = "event: complete\r\ndata: [{\"sentiment\": \"pozitif\", \"score\": 0.97, \"confidence\": 0.97}]\r\n\r\n";
        assert_eq!(
            found(body),
            SentimentResult::new(SentimentLabel::Positive, 0.97)
        );
    }

    #[test]
    fn data_lines_are_concatenated_in_order() {
        let body = "event: generating\ndata: [{\"sentiment\":\ndata:   \"negatif\", \"score\": 0.3}]  \n\n";
        assert_eq!(
            found(body),
            SentimentResult::new(SentimentLabel::Negative, 0.3)
        );
    }

    #[test]
    fn first_string_element_is_scanned() {
        assert_eq!(
            found(r#"["Sonuç: POZİTİF değil, positive"]"#).label,
            SentimentLabel::Positive
        );
        let r = found(r#"["label: Negative"]"#);
        assert_eq!(r, SentimentResult::new(SentimentLabel::Negative, 0.5));
        assert_eq!(found(r#"["nötr"]"#), SentimentResult::neutral());
    }

    #[test]
    fn missing_fields_default() {
        assert_eq!(found(r#"[{"score":0.8}]"#), SentimentResult::new(SentimentLabel::Neutral, 0.8));
        assert_eq!(found(r#"[{"sentiment":"pozitif"}]"#).score, 0.5);
        assert_eq!(found(r#"[{}]"#), SentimentResult::neutral());
    }

    #[test]
    fn wrong_typed_fields_are_reported_and_defaulted() {
        let extraction = extract(r#"{"sentiment": 1, "score": "high"}"#);
        assert_eq!(
            extraction,
            Extraction::Found {
                result: SentimentResult::neutral(),
                format: PayloadFormat::PlainJson,
                malformed: vec!["sentiment", "score"],
            }
        );
    }

    #[test]
    fn score_is_not_clamped() {
        assert_eq!(found(r#"{"sentiment":"pozitif","score":3}"#).score, 3.0);
    }

    #[test]
    fn unrecognised_shapes_are_not_found() {
        for payload in [
            "[]",
            "[42]",
            "[null]",
            "null",
            "0.5",
            "\"pozitif\"",
            r#"{"error": "Space is sleeping"}"#,
        ] {
            assert_eq!(extract(payload), Extraction::NotFound, "{payload}");
        }
    }

    #[test]
    fn garbage_is_not_found() {
        assert_eq!(extract("not json at all"), Extraction::NotFound);
        assert_eq!(extract(""), Extraction::NotFound);
        assert_eq!(extract("data: {broken"), Extraction::NotFound);
        assert_eq!(extract("event: error\ndata: null\n\n"), Extraction::NotFound);
        assert_eq!(extract("event: heartbeat\ndata:\n\n"), Extraction::NotFound);
    }

    #[test]
    fn data_prefix_must_start_the_line() {
        assert_eq!(
            extract("  data: {\"sentiment\":\"pozitif\"}"),
            Extraction::NotFound
        );
    }
}
