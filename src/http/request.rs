use std::sync::Arc;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: "user".to_owned(),
            content: content.into(),
        }
    }
}

/// Body of a `POST /v1/chat/completions` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestSpec {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl RequestSpec {
    #[must_use]
    pub fn prompt<M, P>(model: M, prompt: P, stream: bool) -> Self
    where
        M: Into<String>,
        P: Into<String>,
    {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::user(prompt)],
            stream,
            max_tokens: None,
            temperature: None,
        }
    }

    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// What the caller expects the server to do with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expectation {
    /// Normal traffic; the body is decoded as a completion or stream.
    #[default]
    Accept,
    /// Deliberately invalid input; the raw body is scanned for an error marker.
    Reject,
}

/// One logical request of a load plan.
#[derive(Debug, Clone)]
pub struct PlannedRequest {
    pub id: u64,
    pub name: String,
    pub spec: Arc<RequestSpec>,
    pub expectation: Expectation,
}

impl PlannedRequest {
    #[must_use]
    pub fn new<S: Into<String>>(id: u64, name: S, spec: Arc<RequestSpec>) -> Self {
        Self {
            id,
            name: name.into(),
            spec,
            expectation: Expectation::Accept,
        }
    }

    #[must_use]
    pub const fn expecting(mut self, expectation: Expectation) -> Self {
        self.expectation = expectation;
        self
    }
}
