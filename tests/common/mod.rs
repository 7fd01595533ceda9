//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use gemini_relay::config::ProxyConfig;
use gemini_relay::http::HttpServer;
use gemini_relay::lifecycle::Shutdown;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

/// A relay running on an ephemeral port.
pub struct RunningRelay {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl RunningRelay {
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }
}

impl Drop for RunningRelay {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Config pointing the default upstream at `base_url`, with env proxies off.
pub fn config_for(base_url: &str) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.default_base_url = base_url.to_string();
    config.upstream.use_env_proxy = false;
    config
}

/// Start the relay and wait until it accepts connections.
pub async fn spawn_relay(config: ProxyConfig) -> RunningRelay {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config).unwrap();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    for _ in 0..50 {
        if TcpStream::connect(addr).await.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    RunningRelay { addr, shutdown }
}

/// A test client that never goes through an environment proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// An address nothing is listening on.
pub async fn closed_port_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Read one HTTP/1.1 request (head plus body) from `socket`.
async fn read_request(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_ascii_lowercase();
    if head.contains("transfer-encoding: chunked") {
        while find(&buf[head_end..], b"0\r\n\r\n").is_none() {
            let n = socket.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
    } else if let Some(len) = content_length(&head) {
        while buf.len() < head_end + len {
            let n = socket.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn content_length(head: &str) -> Option<usize> {
    head.lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse().ok())
}

async fn write_chunk(socket: &mut TcpStream, data: &[u8]) -> std::io::Result<()> {
    socket.write_all(format!("{:x}\r\n", data.len()).as_bytes()).await?;
    socket.write_all(data).await?;
    socket.write_all(b"\r\n").await?;
    socket.flush().await
}

const STREAM_HEAD: &str = "HTTP/1.1 200 OK\r\n\
    Content-Type: text/event-stream\r\n\
    Transfer-Encoding: chunked\r\n\
    Access-Control-Allow-Origin: https://upstream.example\r\n\
    X-Upstream: mock\r\n\
    Connection: close\r\n\r\n";

/// Start a backend that answers every request with `chunks` as a chunked
/// body, pausing `delay` between chunks.
pub async fn start_chunked_backend(chunks: Vec<Vec<u8>>, delay: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let chunks = chunks.clone();
            tokio::spawn(async move {
                read_request(&mut socket).await;
                if socket.write_all(STREAM_HEAD.as_bytes()).await.is_err() {
                    return;
                }
                for chunk in &chunks {
                    if write_chunk(&mut socket, chunk).await.is_err() {
                        return;
                    }
                    tokio::time::sleep(delay).await;
                }
                let _ = socket.write_all(b"0\r\n\r\n").await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Start a single-use backend that sends `first`, waits for `release`, then
/// sends `second`. Proves the relay does not hold back early bytes.
pub async fn start_gated_backend(
    first: &'static [u8],
    second: &'static [u8],
    release: oneshot::Receiver<()>,
) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        read_request(&mut socket).await;
        if socket.write_all(STREAM_HEAD.as_bytes()).await.is_err() {
            return;
        }
        if write_chunk(&mut socket, first).await.is_err() {
            return;
        }
        let _ = release.await;
        let _ = write_chunk(&mut socket, second).await;
        let _ = socket.write_all(b"0\r\n\r\n").await;
        let _ = socket.shutdown().await;
    });

    addr
}

/// Assert the full default CORS header set is present.
pub fn assert_cors(headers: &reqwest::header::HeaderMap) {
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-methods"], "GET, POST, OPTIONS");
    assert_eq!(headers["access-control-allow-headers"], "Content-Type, x-api-key");
}
