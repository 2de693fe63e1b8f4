//! Minimal HTTP/1.1 servers that misbehave on purpose
//!
//! Wiremock always sends complete bodies. These servers script the response
//! byte by byte so tests can pace chunks, stall mid-body or hang up early.

use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// One step of a scripted response
#[derive(Debug, Clone)]
pub enum Step {
    /// Write these bytes and flush
    Send(Vec<u8>),

    /// Pause before the next step
    Sleep(Duration),
}

/// Running scripted server; aborted on drop
pub struct ScriptedServer {
    url: String,
    handle: JoinHandle<()>,
}

impl ScriptedServer {
    /// Serve `steps` to every connection, closing it afterwards
    pub async fn start(steps: Vec<Step>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind scripted server");
        let addr = listener.local_addr().expect("scripted server address");

        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let steps = steps.clone();
                tokio::spawn(async move {
                    let _ = serve(stream, steps).await;
                });
            }
        });

        Self {
            url: format!("http://{}/artifact", addr),
            handle,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for ScriptedServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(mut stream: TcpStream, steps: Vec<Step>) -> std::io::Result<()> {
    read_request_head(&mut stream).await?;
    for step in steps {
        match step {
            Step::Send(bytes) => {
                stream.write_all(&bytes).await?;
                stream.flush().await?;
            }
            Step::Sleep(duration) => tokio::time::sleep(duration).await,
        }
    }
    stream.shutdown().await
}

async fn read_request_head(stream: &mut TcpStream) -> std::io::Result<()> {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        head.extend_from_slice(&buf[..n]);
    }
    Ok(())
}

/// Response head declaring `content_length` bytes
pub fn head_with_length(content_length: usize) -> Vec<u8> {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: {}\r\n\r\n",
        content_length
    )
    .into_bytes()
}

/// Response head without a length; the body ends when the connection closes
pub fn head_without_length() -> Vec<u8> {
    b"HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n\r\n"
        .to_vec()
}

/// Declares `declared` bytes but sends only `body`, then hangs up
pub fn truncated_response(declared: usize, body: &[u8]) -> Vec<Step> {
    let mut bytes = head_with_length(declared);
    bytes.extend_from_slice(body);
    vec![Step::Send(bytes), Step::Sleep(Duration::from_millis(50))]
}

/// Sends `body` in `chunk_size` pieces, pausing `delay` between them
pub fn paced_response(body: &[u8], chunk_size: usize, delay: Duration) -> Vec<Step> {
    let mut steps = vec![Step::Send(head_with_length(body.len()))];
    for chunk in body.chunks(chunk_size) {
        steps.push(Step::Send(chunk.to_vec()));
        steps.push(Step::Sleep(delay));
    }
    steps
}

/// Sends the first `sent` bytes of `body`, then stalls for `stall` before the rest
pub fn stalled_response(body: &[u8], sent: usize, stall: Duration) -> Vec<Step> {
    let mut head = head_with_length(body.len());
    head.extend_from_slice(&body[..sent]);
    vec![
        Step::Send(head),
        Step::Sleep(stall),
        Step::Send(body[sent..].to_vec()),
    ]
}

/// Sends `body` without a Content-Length header
pub fn unsized_response(body: &[u8], chunk_size: usize) -> Vec<Step> {
    let mut steps = vec![Step::Send(head_without_length())];
    for chunk in body.chunks(chunk_size) {
        steps.push(Step::Send(chunk.to_vec()));
        steps.push(Step::Sleep(Duration::from_millis(5)));
    }
    steps
}
