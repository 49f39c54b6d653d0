//! Two-phase client for a Gradio Space's queued `predict` endpoint.
//!
//! 1. `POST {base}/gradio_api/call/predict` with `{"data": [text]}` returns
//!    an `event_id`.
//! 2. `GET {base}/gradio_api/call/predict/{event_id}` returns the result,
//!    usually as a server-sent event stream.

use {
    async_trait::async_trait,
    once_cell::sync::Lazy,
    regex::Regex,
    reqwest::{
        Client, RequestBuilder, Response,
        header::{CONTENT_TYPE, USER_AGENT},
    },
    secrecy::{ExposeSecret, Secret},
    serde_json::Value,
    std::{sync::Arc, time::Duration},
    tonality_config::RemoteConfig,
};

use crate::{
    diagnostics::{DiagnosticEvent, DiagnosticSink, TracingSink, preview},
    error::{Phase, RemoteError},
};

const PREDICT_PATH: &str = "/gradio_api/call/predict";

#[allow(clippy::expect_used)]
static EVENT_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""event_id"\s*:\s*"([^"]+)""#).expect("valid regex"));

/// Handle correlating a submitted job with its result. Used once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSubmission {
    event_id: String,
}

impl JobSubmission {
    #[must_use]
    pub fn event_id(&self) -> &str {
        &self.event_id
    }
}

/// Framing advertised by the result response. Extraction never relies on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentKind {
    #[default]
    Unknown,
    PlainJson,
    EventStream,
}

impl ContentKind {
    #[must_use]
    pub fn from_content_type(value: &str) -> Self {
        let mime = value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match mime.as_str() {
            "text/event-stream" => Self::EventStream,
            "application/json" => Self::PlainJson,
            m if m.ends_with("+json") => Self::PlainJson,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::PlainJson => "json",
            Self::EventStream => "event_stream",
        }
    }
}

/// Body of the result response, read as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReplyPayload {
    pub body: String,
    pub content_kind: ContentKind,
}

/// Runs one remote inference job.
#[async_trait]
pub trait RemoteJobClient: Send + Sync {
    /// Submit `text` and fetch its reply, all within `timeout`.
    async fn submit_and_fetch(
        &self,
        text: &str,
        timeout: Duration,
    ) -> Result<RawReplyPayload, RemoteError>;
}

/// [`RemoteJobClient`] for Hugging Face / Gradio Spaces.
#[derive(Clone)]
pub struct GradioClient {
    client: Client,
    base_url: String,
    api_token: Option<Secret<String>>,
    user_agent: Option<String>,
    sink: Arc<dyn DiagnosticSink>,
}

impl std::fmt::Debug for GradioClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GradioClient")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl GradioClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: None,
            user_agent: None,
            sink: Arc::new(TracingSink),
        }
    }

    #[must_use]
    pub fn from_config(config: &RemoteConfig) -> Self {
        Self {
            api_token: config.api_token.clone(),
            user_agent: config.user_agent.clone(),
            ..Self::new(config.normalized_base_url())
        }
    }

    #[must_use]
    pub fn with_api_token(mut self, token: Secret<String>) -> Self {
        self.api_token = Some(token);
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token.expose_secret());
        }
        if let Some(agent) = &self.user_agent {
            request = request.header(USER_AGENT, agent);
        }
        request
    }

    async fn submit(&self, text: &str) -> Result<JobSubmission, RemoteError> {
        let url = format!("{}{PREDICT_PATH}", self.base_url);
        let response = self
            .authorize(self.client.post(&url))
            .json(&serde_json::json!({ "data": [text] }))
            .send()
            .await
            .map_err(|e| RemoteError::transport(Phase::Submit, e.to_string()))?;

        let status = response.status().as_u16();
        let body = read_body(response, Phase::Submit).await?;

        match find_event_id(&body) {
            Some(event_id) => {
                self.sink.record(&DiagnosticEvent::Submitted {
                    event_id: event_id.clone(),
                });
                Ok(JobSubmission { event_id })
            },
            None => {
                self.sink.record(&DiagnosticEvent::SubmissionRejected {
                    status,
                    body_preview: preview(&body),
                });
                Err(RemoteError::SubmissionFailed { status })
            },
        }
    }

    async fn fetch(&self, job: &JobSubmission) -> Result<RawReplyPayload, RemoteError> {
        let url = format!(
            "{}{PREDICT_PATH}/{}",
            self.base_url,
            urlencoding::encode(job.event_id())
        );
        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| RemoteError::transport(Phase::Fetch, e.to_string()))?;

        let status = response.status().as_u16();
        let content_kind = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ContentKind::from_content_type)
            .unwrap_or_default();
        let body = read_body(response, Phase::Fetch).await?;

        self.sink.record(&DiagnosticEvent::Fetched {
            status,
            bytes: body.len(),
            content_kind,
        });
        Ok(RawReplyPayload { body, content_kind })
    }
}

#[async_trait]
impl RemoteJobClient for GradioClient {
    async fn submit_and_fetch(
        &self,
        text: &str,
        timeout: Duration,
    ) -> Result<RawReplyPayload, RemoteError> {
        let round_trip = async {
            let job = self.submit(text).await?;
            self.fetch(&job).await
        };
        tokio::time::timeout(timeout, round_trip)
            .await
            .map_err(|_| RemoteError::TimedOut(timeout))?
    }
}

/// Read the body as text. An error status is only fatal when it came with
/// nothing to look at.
async fn read_body(response: Response, phase: Phase) -> Result<String, RemoteError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| RemoteError::transport(phase, e.to_string()))?;
    if !status.is_success() && body.trim().is_empty() {
        return Err(RemoteError::transport(
            phase,
            format!("HTTP {status} with empty body"),
        ));
    }
    Ok(body)
}

/// Locate the job id: a top-level `event_id` string first, then a textual
/// scan for bodies that are not JSON or carry it elsewhere.
fn find_event_id(body: &str) -> Option<String> {
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body)
        && let Some(Value::String(id)) = fields.get("event_id")
        && !id.is_empty()
    {
        return Some(id.clone());
    }
    EVENT_ID_RE
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
