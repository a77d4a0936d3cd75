//! Shared helpers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use medrag::embedding::Embedder;
use medrag::errors::{EmbeddingError, RagError, Result};
use medrag::generation::Generator;

/// Request bodies received by a stub server
pub type Received = Arc<Mutex<Vec<String>>>;

/// Serve every request with the same status and JSON body
///
/// Returns the base URL and the request bodies seen so far.
pub async fn spawn_stub(status: u16, body: &'static str) -> (String, Received) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let seen = received.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let seen = seen.clone();
            tokio::spawn(async move {
                let request_body = read_request(&mut socket).await;
                seen.lock().unwrap().push(request_body);

                let response = format!(
                    concat!(
                        "HTTP/1.1 {} Stub\r\n",
                        "Content-Type: application/json\r\n",
                        "Content-Length: {}\r\n",
                        "Connection: close\r\n\r\n{}"
                    ),
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{}", addr), received)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        if let Some(header_end) = find(&buf, b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
            let length = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + length {
                return String::from_utf8_lossy(&buf[header_end + 4..header_end + 4 + length])
                    .into_owned();
            }
        }
    }

    String::new()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Embedder returning canned vectors keyed by text
pub struct MapEmbedder {
    pub vectors: Vec<(&'static str, Vec<f64>)>,
}

#[async_trait]
impl Embedder for MapEmbedder {
    async fn embed(&self, text: &str) -> std::result::Result<Vec<f64>, EmbeddingError> {
        self.vectors
            .iter()
            .find(|(key, _)| *key == text)
            .map(|(_, v)| v.clone())
            .ok_or(EmbeddingError::Status {
                status: 500,
                body: format!("no vector for {:?}", text),
            })
    }

    fn model(&self) -> &str {
        "map"
    }
}

/// Generator that echoes how many context lines the prompt carried
pub struct EchoGenerator;

#[async_trait]
impl Generator for EchoGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        Ok(format!("answered with {} records", prompt.matches("Disease: ").count()))
    }

    fn model(&self) -> &str {
        "echo"
    }
}

/// Generator that always fails
pub struct DownGenerator;

#[async_trait]
impl Generator for DownGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(RagError::Generation("connection refused".to_string()))
    }

    fn model(&self) -> &str {
        "down"
    }
}
