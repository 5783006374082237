use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;

use crate::error::{AppError, AppResult};

pub(crate) fn run_async_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::validation(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}

#[derive(Debug, Clone)]
pub(crate) struct StubRequest {
    pub(crate) path: String,
    pub(crate) body: Value,
}

#[derive(Debug, Clone)]
pub(crate) enum StubResponse {
    Json { status: u16, body: String },
    Stream { lines: Vec<String>, line_delay: Duration },
    /// Accepts the request and never answers.
    Hang,
}

impl StubResponse {
    pub(crate) fn json(status: u16, body: &Value) -> Self {
        Self::Json {
            status,
            body: body.to_string(),
        }
    }

    pub(crate) fn raw(status: u16, body: &str) -> Self {
        Self::Json {
            status,
            body: body.to_owned(),
        }
    }

    pub(crate) fn stream(lines: &[&str]) -> Self {
        Self::Stream {
            lines: lines.iter().map(|line| (*line).to_owned()).collect(),
            line_delay: Duration::ZERO,
        }
    }
}

pub(crate) type StubRoutes = Arc<dyn Fn(&StubRequest) -> StubResponse + Send + Sync>;

pub(crate) fn delta_line(content: &str) -> String {
    format!(
        "data: {}",
        json!({"choices": [{"index": 0, "delta": {"content": content}}]})
    )
}

pub(crate) fn sample_metrics() -> Value {
    json!({
        "uptime": {"human": "1h 2m", "hours": 1.03},
        "streams": {
            "active": 2, "maxConcurrent": 10, "peakConcurrent": 4,
            "total": 120, "successful": 118, "failed": 2, "successRate": "98.33"
        },
        "performance": {
            "totalChunks": 4800, "totalBytes": 192000, "averageStreamDuration": 850.5,
            "chunksPerSecond": 12.5, "bytesPerSecond": 500.0
        },
        "memory": {"heapUsed": 104857600, "heapTotal": 209715200, "rss": 262144000, "external": 1024},
        "rateLimiting": {"activeClients": 1, "intervalMs": 1000},
        "connectionPool": {
            "activeConnections": 3, "pendingRequests": 0, "totalRequests": 130,
            "totalErrors": 1, "averageResponseTime": 420.0
        }
    })
}

/// Health, metrics, and chat routes of a well-behaved server.
///
/// Chat requests with an empty model answer 400 and `invalid-model` answers
/// 404; streams carry three deltas and the sentinel.
pub(crate) fn default_routes() -> StubRoutes {
    Arc::new(|request: &StubRequest| match request.path.as_str() {
        "/" => StubResponse::json(
            200,
            &json!({"status": "ok", "message": "Stub server", "version": "1.2.3"}),
        ),
        "/metrics" => StubResponse::json(200, &sample_metrics()),
        "/v1/chat/completions" => chat_route(&request.body),
        _ => StubResponse::json(404, &json!({"error": {"message": "not found"}})),
    })
}

fn chat_route(body: &Value) -> StubResponse {
    let model = body.get("model").and_then(Value::as_str).unwrap_or_default();
    if model.is_empty() {
        return StubResponse::json(400, &json!({"error": {"message": "model is required"}}));
    }
    if model == "invalid-model" {
        return StubResponse::json(404, &json!({"error": {"message": "model not found"}}));
    }
    if body.get("stream").and_then(Value::as_bool).unwrap_or(false) {
        let lines = [delta_line("Hel"), delta_line("lo"), delta_line(" there")];
        let mut all: Vec<&str> = lines.iter().map(String::as_str).collect();
        all.push("data: [DONE]");
        return StubResponse::stream(&all);
    }
    StubResponse::json(
        200,
        &json!({"choices": [{"index": 0, "message": {"role": "assistant", "content": "pong"}}]}),
    )
}

/// In-process HTTP/1.1 server; stops when dropped.
pub(crate) struct StubServer {
    pub(crate) url: String,
    hits: Arc<AtomicU64>,
    shutdown: watch::Sender<bool>,
}

impl StubServer {
    pub(crate) async fn start(routes: StubRoutes) -> AppResult<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|err| AppError::validation(format!("Failed to bind stub server: {}", err)))?;
        let addr = listener
            .local_addr()
            .map_err(|err| AppError::validation(format!("Failed to read stub addr: {}", err)))?;
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let hits = Arc::new(AtomicU64::new(0));
        let server_hits = Arc::clone(&hits);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    accept = listener.accept() => {
                        let Ok((socket, _)) = accept else {
                            break;
                        };
                        server_hits.fetch_add(1, Ordering::SeqCst);
                        tokio::spawn(handle_connection(socket, Arc::clone(&routes)));
                    }
                }
            }
        });

        Ok(Self {
            url: format!("http://{}", addr),
            hits,
            shutdown,
        })
    }

    pub(crate) fn hits(&self) -> u64 {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        drop(self.shutdown.send(true));
    }
}

fn header_end(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(4)
        .position(|window| window == b"\r\n\r\n")
        .map(|index| index.saturating_add(4))
}

fn content_length(head: &str) -> usize {
    head.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}

async fn read_request(socket: &mut TcpStream) -> Option<StubRequest> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    let body_start = loop {
        let read = socket.read(&mut chunk).await.ok()?;
        if read == 0 {
            return None;
        }
        buffer.extend_from_slice(chunk.get(..read)?);
        if let Some(end) = header_end(&buffer) {
            break end;
        }
    };
    let head = String::from_utf8_lossy(buffer.get(..body_start)?).into_owned();
    let wanted = content_length(&head);
    while buffer.len().saturating_sub(body_start) < wanted {
        let read = socket.read(&mut chunk).await.ok()?;
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(chunk.get(..read)?);
    }
    let path = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_owned();
    let body = serde_json::from_slice(buffer.get(body_start..)?).unwrap_or(Value::Null);
    Some(StubRequest { path, body })
}

async fn handle_connection(mut socket: TcpStream, routes: StubRoutes) {
    let Some(request) = read_request(&mut socket).await else {
        return;
    };
    match routes(&request) {
        StubResponse::Json { status, body } => {
            let head = format!(
                "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                body.len()
            );
            if socket.write_all(head.as_bytes()).await.is_err() {
                return;
            }
            if socket.write_all(body.as_bytes()).await.is_err() {
                return;
            }
        }
        StubResponse::Stream { lines, line_delay } => {
            let head = "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nConnection: close\r\n\r\n";
            if socket.write_all(head.as_bytes()).await.is_err() {
                return;
            }
            for line in lines {
                if !line_delay.is_zero() {
                    tokio::time::sleep(line_delay).await;
                }
                let framed = format!("{}\n\n", line);
                if socket.write_all(framed.as_bytes()).await.is_err() {
                    return;
                }
            }
        }
        StubResponse::Hang => {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
    }
    drop(socket.shutdown().await);
}
