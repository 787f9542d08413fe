//! Test helpers: a local WebSocket server, scripted connectors and a
//! scripted HTTP transport.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::time::timeout;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use url::Url;

use crate::api::{HttpRequest, HttpResponse, HttpTransport};
use crate::error::{Error, Result};
use crate::transport::{BoxSocket, Connector, LifecycleEvent};

// ============================================================================
// Constants
// ============================================================================

/// Upper bound for any single wait in tests.
pub(crate) const TEST_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// TestServer
// ============================================================================

/// WebSocket server bound to a random localhost port.
pub(crate) struct TestServer {
    listener: TcpListener,
    url: Url,
}

impl TestServer {
    pub(crate) async fn bind() -> Self {
        let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
            .await
            .expect("bind should succeed");
        let port = listener.local_addr().expect("local addr").port();
        let url = Url::parse(&format!("ws://127.0.0.1:{port}/ws")).expect("valid url");
        Self { listener, url }
    }

    pub(crate) fn url(&self) -> &Url {
        &self.url
    }

    /// Accepts one client; returns the stream and the requested URI.
    pub(crate) async fn accept(&self) -> (TestPeer, String) {
        let (stream, _) = timeout(TEST_TIMEOUT, self.listener.accept())
            .await
            .expect("client should connect")
            .expect("accept should succeed");

        let mut uri = String::new();
        let callback = |request: &Request, response: Response| -> std::result::Result<Response, ErrorResponse> {
            uri = request.uri().to_string();
            Ok(response)
        };

        let ws = tokio_tungstenite::accept_hdr_async(stream, callback)
            .await
            .expect("upgrade should succeed");

        (TestPeer { ws }, uri)
    }
}

// ============================================================================
// TestPeer
// ============================================================================

/// Server side of one accepted connection.
pub(crate) struct TestPeer {
    ws: WebSocketStream<TcpStream>,
}

impl TestPeer {
    pub(crate) async fn send_text(&mut self, text: &str) {
        self.ws
            .send(Message::Text(text.to_string().into()))
            .await
            .expect("send should succeed");
    }

    pub(crate) async fn close(&mut self, code: CloseCode) {
        let _ = self
            .ws
            .close(Some(CloseFrame {
                code,
                reason: "test".into(),
            }))
            .await;
    }

    /// Returns the next text frame, or `None` once the client closed.
    pub(crate) async fn next_text(&mut self) -> Option<String> {
        loop {
            match timeout(TEST_TIMEOUT, self.ws.next()).await.ok()?? {
                Ok(Message::Text(text)) => return Some(text.as_str().to_string()),
                Ok(Message::Close(_)) | Err(_) => return None,
                Ok(_) => {}
            }
        }
    }
}

// ============================================================================
// Connectors
// ============================================================================

/// Connector whose handshakes always fail; counts attempts.
#[derive(Debug, Default, Clone)]
pub(crate) struct RefusingConnector {
    attempts: Arc<AtomicUsize>,
}

impl RefusingConnector {
    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for RefusingConnector {
    async fn connect(&self, url: &Url) -> Result<BoxSocket> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(Error::connection(format!("refused: {url}")))
    }
}

// ============================================================================
// HTTP
// ============================================================================

/// HTTP transport that replays queued replies and records requests.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedTransport {
    replies: Arc<Mutex<VecDeque<Result<HttpResponse>>>>,
    seen: Arc<Mutex<Vec<HttpRequest>>>,
}

impl ScriptedTransport {
    pub(crate) fn replying(status: u16, body: Value) -> Self {
        let transport = Self::default();
        transport.push(status, body);
        transport
    }

    pub(crate) fn failing(error: Error) -> Self {
        let transport = Self::default();
        transport.replies.lock().push_back(Err(error));
        transport
    }

    pub(crate) fn push(&self, status: u16, body: Value) {
        self.push_raw(status, body.to_string());
    }

    pub(crate) fn push_raw(&self, status: u16, body: impl Into<String>) {
        self.replies.lock().push_back(Ok(HttpResponse {
            status,
            body: body.into(),
        }));
    }

    pub(crate) fn last(&self) -> HttpRequest {
        self.seen.lock().last().cloned().expect("a request was sent")
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.seen.lock().push(request);
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(Error::http("no scripted reply")))
    }
}

// ============================================================================
// Lifecycle Helpers
// ============================================================================

/// Waits for the next lifecycle event.
pub(crate) async fn next_event(rx: &mut broadcast::Receiver<LifecycleEvent>) -> LifecycleEvent {
    timeout(TEST_TIMEOUT, rx.recv())
        .await
        .expect("lifecycle event should arrive")
        .expect("lifecycle channel open")
}

/// Skips events until `predicate` matches.
pub(crate) async fn wait_for_event<F>(
    rx: &mut broadcast::Receiver<LifecycleEvent>,
    predicate: F,
) -> LifecycleEvent
where
    F: Fn(&LifecycleEvent) -> bool,
{
    loop {
        let event = next_event(rx).await;
        if predicate(&event) {
            return event;
        }
    }
}
