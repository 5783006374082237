use std::ffi::OsStr;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::process::{Command, Output};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use serde_json::{Value, json};

pub struct ServerHandle {
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

/// Spawn a chat-completion server stub with `/`, `/metrics` and a streaming
/// `/v1/chat/completions`.
///
/// # Errors
///
/// Returns an error if the listener cannot be created or configured.
pub fn spawn_chat_server() -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            match listener.accept() {
                Ok((stream, _)) => {
                    thread::spawn(move || handle_client(stream));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(_) => break,
            }
        }
    });

    Ok((
        format!("http://{}", addr),
        ServerHandle {
            shutdown: shutdown_tx,
            thread: Some(handle),
        },
    ))
}

pub fn spawn_chat_server_or_skip() -> Result<Option<(String, ServerHandle)>, String> {
    match spawn_chat_server() {
        Ok(result) => Ok(Some(result)),
        Err(err) if err.contains("Operation not permitted") => {
            eprintln!("Skipping e2e test: {}", err);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn read_request(stream: &mut TcpStream) -> Option<(String, Value)> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    let head_end = loop {
        let read = stream.read(&mut chunk).ok()?;
        if read == 0 {
            return None;
        }
        buffer.extend_from_slice(chunk.get(..read)?);
        if let Some(position) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            break position.saturating_add(4);
        }
    };
    let head = String::from_utf8_lossy(buffer.get(..head_end)?).into_owned();
    let wanted: usize = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0);
    while buffer.len().saturating_sub(head_end) < wanted {
        let read = stream.read(&mut chunk).ok()?;
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
    let body = serde_json::from_slice(buffer.get(head_end..)?).unwrap_or(Value::Null);
    Some((path, body))
}

fn json_response(status: u16, body: &Value) -> Vec<u8> {
    let body = body.to_string();
    format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    )
    .into_bytes()
}

fn stream_response() -> Vec<u8> {
    let mut response =
        String::from("HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nConnection: close\r\n\r\n");
    for content in ["Hel", "lo"] {
        let chunk = json!({"choices": [{"index": 0, "delta": {"content": content}}]});
        response.push_str("data: ");
        response.push_str(&chunk.to_string());
        response.push_str("\n\n");
    }
    response.push_str("data: [DONE]\n\n");
    response.into_bytes()
}

fn chat_response(body: &Value) -> Vec<u8> {
    let model = body.get("model").and_then(Value::as_str).unwrap_or_default();
    if model.is_empty() {
        return json_response(400, &json!({"error": {"message": "model is required"}}));
    }
    if model == "invalid-model" {
        return json_response(404, &json!({"error": {"message": "model not found"}}));
    }
    if body.get("stream").and_then(Value::as_bool).unwrap_or(false) {
        return stream_response();
    }
    json_response(
        200,
        &json!({"choices": [{"index": 0, "message": {"role": "assistant", "content": "pong"}}]}),
    )
}

fn handle_client(mut stream: TcpStream) {
    if stream.set_nonblocking(false).is_err() {
        return;
    }
    let Some((path, body)) = read_request(&mut stream) else {
        return;
    };
    let response = match path.as_str() {
        "/" => json_response(200, &json!({"status": "ok", "version": "0.0.1"})),
        "/metrics" => json_response(
            200,
            &json!({"streams": {"active": 0, "maxConcurrent": 10, "total": 3}}),
        ),
        "/v1/chat/completions" => chat_response(&body),
        _ => json_response(404, &json!({"error": {"message": "not found"}})),
    };
    if stream.write_all(&response).is_err() {
        return;
    }
    if stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}

/// Run the `streamprobe` binary and capture output.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_streamprobe<I, S>(args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = streamprobe_bin()?;
    Command::new(bin)
        .args(args)
        .env("RUST_LOG", "error")
        .env_remove("STREAMPROBE_LOG")
        .env_remove("NO_COLOR")
        .output()
        .map_err(|err| format!("run streamprobe failed: {}", err))
}

fn streamprobe_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_streamprobe").map_or_else(
        || Err("CARGO_BIN_EXE_streamprobe missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}

pub fn describe(output: &Output) -> String {
    format!(
        "status: {}\nstdout: {}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}
