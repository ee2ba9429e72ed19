//! A tiny HTTP/1.1 server for exercising the fetchers against canned responses.

use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Clone)]
struct Route {
    method: &'static str,
    path: &'static str,
    status: u16,
    content_type: &'static str,
    body: String,
}

/// A request the server received: request line target plus body
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub target: String,
    pub body: String,
}

/// Serves fixed responses on a random loopback port until the test ends
pub struct StubServer {
    base_url: String,
    routes: Arc<Mutex<Vec<Route>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl StubServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let routes: Arc<Mutex<Vec<Route>>> = Arc::default();
        let requests: Arc<Mutex<Vec<Recorded>>> = Arc::default();

        let (r, q) = (routes.clone(), requests.clone());
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(handle(socket, r.clone(), q.clone()));
            }
        });

        Self {
            base_url,
            routes,
            requests,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Answer requests whose target starts with `path`; unmatched requests get a 404
    pub fn route(
        &self,
        method: &'static str,
        path: &'static str,
        status: u16,
        content_type: &'static str,
        body: impl Into<String>,
    ) {
        self.routes.lock().unwrap().push(Route {
            method,
            path,
            status,
            content_type,
            body: body.into(),
        });
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

/// A client that never routes loopback traffic through a system proxy
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

async fn handle(
    mut socket: TcpStream,
    routes: Arc<Mutex<Vec<Route>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let target = request_line.next().unwrap_or_default().to_string();
    let body = String::from_utf8_lossy(&buf[header_end..]).into_owned();

    let route = routes
        .lock()
        .unwrap()
        .iter()
        .find(|r| r.method == method && target.starts_with(r.path))
        .cloned();
    requests.lock().unwrap().push(Recorded {
        method,
        target,
        body,
    });

    let (status, content_type, body) = match route {
        Some(r) => (r.status, r.content_type, r.body),
        None => (404, "text/plain", "not found".to_string()),
    };
    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        429 => "Too Many Requests",
        _ => "Error",
    };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}
