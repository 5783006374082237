use std::error::Error as StdError;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::OutcomeError;
use crate::metrics::{Outcome, OutcomeKind};
use crate::stream::{CompletionBody, LineDecoder, StreamEvent};

use super::client::Target;
use super::request::{Expectation, PlannedRequest};

/// Issues one request and always returns an [`Outcome`], never an error.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, request: &PlannedRequest) -> Outcome;
}

#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
    completions: Url,
}

impl HttpExecutor {
    #[must_use]
    pub fn new(client: Client, target: &Target) -> Self {
        Self {
            client,
            completions: target.completions().clone(),
        }
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self, request: &PlannedRequest) -> Outcome {
        let mut progress = Progress::start(request);
        let sent = self
            .client
            .post(self.completions.clone())
            .json(request.spec.as_ref())
            .send()
            .await;
        let response = match sent {
            Ok(response) => response,
            Err(err) => return progress.transport_failure(&err),
        };
        let status = response.status();
        progress.status = status.as_u16();

        match request.expectation {
            Expectation::Reject => read_rejection(progress, response).await,
            Expectation::Accept if status != StatusCode::OK => {
                read_server_error(progress, response).await
            }
            Expectation::Accept if request.spec.stream => read_stream(progress, response).await,
            Expectation::Accept => read_completion(progress, response).await,
        }
    }
}

/// Counters accumulated while a request is in flight.
struct Progress {
    id: u64,
    name: String,
    kind: OutcomeKind,
    started: Instant,
    status: u16,
    chunks_received: u64,
    bytes_received: u64,
    malformed_chunks: u64,
    content: String,
    error_indicator: bool,
}

impl Progress {
    fn start(request: &PlannedRequest) -> Self {
        Self {
            id: request.id,
            name: request.name.clone(),
            kind: if request.spec.stream {
                OutcomeKind::Streaming
            } else {
                OutcomeKind::NonStreaming
            },
            started: Instant::now(),
            status: 0,
            chunks_received: 0,
            bytes_received: 0,
            malformed_chunks: 0,
            content: String::new(),
            error_indicator: false,
        }
    }

    fn finish(self, error: Option<OutcomeError>) -> Outcome {
        let duration: Duration = self.started.elapsed();
        Outcome {
            id: self.id,
            name: self.name,
            kind: self.kind,
            status: self.status,
            success: error.is_none(),
            duration,
            chunks_received: self.chunks_received,
            bytes_received: self.bytes_received,
            malformed_chunks: self.malformed_chunks,
            content: self.content,
            error_indicator: self.error_indicator,
            error,
        }
    }

    fn succeed(self) -> Outcome {
        self.finish(None)
    }

    fn fail(self, error: OutcomeError) -> Outcome {
        self.finish(Some(error))
    }

    /// Status drops to 0 even mid-stream; counters are kept.
    fn transport_failure(mut self, err: &reqwest::Error) -> Outcome {
        debug!("Request {} failed: {}", self.name, err);
        self.status = 0;
        self.fail(OutcomeError::Transport {
            message: error_chain(err),
            timed_out: err.is_timeout(),
        })
    }
}

fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Message of an error object such as `{"error": {"message": ".."}}`.
fn error_object_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = value.get("error");
    let message = error
        .and_then(|error| error.get("message"))
        .or(error)
        .or_else(|| value.get("message"))?;
    match message {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_owned()),
        Value::Null | Value::String(_) => None,
        Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => {
            Some(message.to_string())
        }
    }
}

fn server_error(status: u16, body: &str) -> OutcomeError {
    error_object_message(body).map_or(OutcomeError::ServerOpaque { status }, |message| {
        OutcomeError::Server { status, message }
    })
}

async fn read_server_error(progress: Progress, response: Response) -> Outcome {
    let status = progress.status;
    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => return progress.transport_failure(&err),
    };
    progress.fail(server_error(status, &body))
}

async fn read_completion(mut progress: Progress, response: Response) -> Outcome {
    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => return progress.transport_failure(&err),
    };
    progress.bytes_received = body.len() as u64;
    match serde_json::from_str::<CompletionBody>(&body) {
        Ok(completion) => {
            progress.content = completion.into_content();
            progress.succeed()
        }
        Err(err) => progress.fail(OutcomeError::InvalidBody {
            message: err.to_string(),
        }),
    }
}

fn apply_event(progress: &mut Progress, event: StreamEvent) -> bool {
    match event {
        StreamEvent::Delta { content, bytes } => {
            progress.chunks_received = progress.chunks_received.saturating_add(1);
            progress.bytes_received = progress.bytes_received.saturating_add(bytes);
            progress.content.push_str(&content);
            false
        }
        StreamEvent::Malformed { .. } => {
            progress.malformed_chunks = progress.malformed_chunks.saturating_add(1);
            false
        }
        StreamEvent::Done => true,
    }
}

async fn read_stream(mut progress: Progress, response: Response) -> Outcome {
    let mut decoder = LineDecoder::new();
    let mut body = response.bytes_stream();
    'read: while let Some(chunk) = body.next().await {
        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(err) => return progress.transport_failure(&err),
        };
        for event in decoder.push(&bytes) {
            if apply_event(&mut progress, event) {
                break 'read;
            }
        }
    }
    if let Some(event) = decoder.finish() {
        apply_event(&mut progress, event);
    }
    if progress.malformed_chunks > 0 {
        debug!(
            "Stream {} skipped {} malformed chunks",
            progress.name, progress.malformed_chunks
        );
    }
    progress.succeed()
}

/// Reads the raw body and records whether it carries an error marker.
async fn read_rejection(mut progress: Progress, response: Response) -> Outcome {
    let status = progress.status;
    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => return progress.transport_failure(&err),
    };
    progress.bytes_received = body.len() as u64;
    progress.error_indicator = body.to_lowercase().contains("error");
    if status == StatusCode::OK.as_u16() {
        progress.content = body;
        return progress.succeed();
    }
    progress.fail(server_error(status, &body))
}
