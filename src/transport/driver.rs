//! Realtime channel event loop.
//!
//! One driver task per channel owns the socket, the [`Session`] state
//! machine and the single reconnect timer. Commands from the public handle,
//! inbound frames, handshake completion and timer expiry are all handled on
//! this task, one at a time.
//!
//! # Event Loop
//!
//! - Commands from [`RealtimeClient`](crate::RealtimeClient) (connect, disconnect, send)
//! - Handshake results from the [`Connector`]
//! - Inbound frames, decoded and dispatched to the [`EventRegistry`]
//! - Reconnect timer expiry

// ============================================================================
// Imports
// ============================================================================

use std::future::{Future, pending};
use std::pin::Pin;
use std::result::Result as StdResult;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::{Sleep, sleep, timeout};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, error, info, trace, warn};
use url::Url;

use crate::error::{Result, millis};
use crate::identifiers::ConnectionId;
use crate::protocol::Envelope;
use crate::registry::EventRegistry;
use crate::storage::TokenSupplier;

use super::connector::{BoxSocket, Connector, target_url};
use super::lifecycle::LifecycleEvent;
use super::session::{CloseOutcome, ConnectionState, Session};

// ============================================================================
// Constants
// ============================================================================

/// Time allowed for a graceful close before the socket is dropped.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Types
// ============================================================================

/// In-flight handshake.
type DialFuture = Pin<Box<dyn Future<Output = Result<BoxSocket>> + Send>>;

/// Commands sent from the public handle to the driver.
pub(crate) enum Command {
    /// Start connecting unless already connecting or open.
    Connect,
    /// Tear down the connection and acknowledge.
    Disconnect {
        /// Completed once nothing is left running.
        ack: oneshot::Sender<()>,
    },
    /// Transmit an encoded envelope if open.
    Send(String),
}

// ============================================================================
// Driver
// ============================================================================

/// State owned by the driver task.
pub(crate) struct Driver {
    session: Session,
    base_url: Url,
    connector: Arc<dyn Connector>,
    tokens: Arc<dyn TokenSupplier>,
    registry: EventRegistry,
    commands: mpsc::UnboundedReceiver<Command>,
    state_tx: watch::Sender<ConnectionState>,
    lifecycle_tx: broadcast::Sender<LifecycleEvent>,
    dial: Option<(ConnectionId, DialFuture)>,
    socket: Option<(ConnectionId, BoxSocket)>,
    reconnect: Option<Pin<Box<Sleep>>>,
}

impl Driver {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        session: Session,
        base_url: Url,
        connector: Arc<dyn Connector>,
        tokens: Arc<dyn TokenSupplier>,
        registry: EventRegistry,
        commands: mpsc::UnboundedReceiver<Command>,
        state_tx: watch::Sender<ConnectionState>,
        lifecycle_tx: broadcast::Sender<LifecycleEvent>,
    ) -> Self {
        Self {
            session,
            base_url,
            connector,
            tokens,
            registry,
            commands,
            state_tx,
            lifecycle_tx,
            dial: None,
            socket: None,
            reconnect: None,
        }
    }

    /// Runs until every handle is dropped.
    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => {
                        debug!("All handles dropped");
                        break;
                    }
                },

                (id, result) = next_dial(&mut self.dial) => {
                    self.dial = None;
                    self.handle_dial_result(id, result);
                }

                (id, frame) = next_frame(&mut self.socket) => {
                    self.handle_frame(id, frame);
                }

                () = next_timer(&mut self.reconnect) => {
                    self.reconnect = None;
                    self.handle_reconnect_due();
                }
            }
        }

        self.teardown().await;
        debug!("Driver terminated");
    }

    // ========================================================================
    // Commands
    // ========================================================================

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Connect => match self.session.connect() {
                Some(id) => {
                    self.reconnect = None;
                    self.start_dial(id);
                }
                None => debug!(state = %self.session.state(), "Connect ignored"),
            },

            Command::Disconnect { ack } => {
                self.shutdown_connection().await;
                self.session.disconnect();
                self.publish_state();
                self.emit(LifecycleEvent::Disconnected);
                info!("Disconnected");
                let _ = ack.send(());
            }

            Command::Send(text) => match self.socket.as_mut() {
                Some((id, socket)) => {
                    if let Err(e) = socket.send(Message::Text(text.into())).await {
                        warn!(connection_id = %id, error = %e, "Failed to send message");
                    } else {
                        trace!(connection_id = %id, "Message sent");
                    }
                }
                None => warn!("Connection not open; message dropped"),
            },
        }
    }

    // ========================================================================
    // Connection Lifecycle
    // ========================================================================

    fn start_dial(&mut self, id: ConnectionId) {
        let token = self.tokens.token();
        let url = target_url(&self.base_url, token.as_deref());
        let connector = Arc::clone(&self.connector);

        debug!(connection_id = %id, has_token = token.is_some(), "Connecting");

        self.dial = Some((id, Box::pin(async move { connector.connect(&url).await })));
        self.publish_state();
        self.emit(LifecycleEvent::Connecting { connection_id: id });
    }

    fn handle_dial_result(&mut self, id: ConnectionId, result: Result<BoxSocket>) {
        match result {
            Ok(socket) => {
                if !self.session.on_open(id) {
                    debug!(connection_id = %id, "Dropping socket from superseded attempt");
                    return;
                }
                self.socket = Some((id, socket));
                self.reconnect = None;
                self.publish_state();
                self.emit(LifecycleEvent::Connected { connection_id: id });
                info!(connection_id = %id, "Realtime channel connected");
            }
            Err(e) => {
                warn!(connection_id = %id, error = %e, "Connection attempt failed");
                let outcome = self.session.on_failure(id);
                self.apply(outcome);
            }
        }
    }

    fn handle_frame(&mut self, id: ConnectionId, frame: Option<StdResult<Message, WsError>>) {
        let code = match frame {
            Some(Ok(Message::Text(text))) => {
                self.handle_text(text.as_str());
                return;
            }
            Some(Ok(Message::Close(frame))) => {
                let code = frame.map(|f| u16::from(f.code));
                debug!(connection_id = %id, ?code, "Closed by remote");
                code
            }
            Some(Ok(_)) => {
                trace!(connection_id = %id, "Ignoring non-text frame");
                return;
            }
            Some(Err(e)) => {
                warn!(connection_id = %id, error = %e, "WebSocket error");
                None
            }
            None => {
                debug!(connection_id = %id, "WebSocket stream ended");
                None
            }
        };

        self.socket = None;
        self.emit(LifecycleEvent::Closed {
            connection_id: id,
            code,
        });
        let outcome = self.session.on_close(id, code);
        self.apply(outcome);
    }

    fn handle_reconnect_due(&mut self) {
        if let Some(id) = self.session.reconnect_due() {
            self.start_dial(id);
        }
    }

    fn apply(&mut self, outcome: CloseOutcome) {
        match outcome {
            CloseOutcome::Stale => trace!("Ignoring notification for superseded connection"),
            CloseOutcome::Idle => {
                self.publish_state();
                info!("Realtime channel closed normally");
            }
            CloseOutcome::Reconnect { attempt, delay } => {
                self.reconnect = Some(Box::pin(sleep(delay)));
                self.publish_state();
                self.emit(LifecycleEvent::ReconnectScheduled { attempt, delay });
                info!(
                    attempt,
                    delay_ms = millis(delay),
                    "Scheduling reconnect"
                );
            }
            CloseOutcome::Exhausted { attempts } => {
                self.reconnect = None;
                self.publish_state();
                self.emit(LifecycleEvent::ReconnectsExhausted { attempts });
                error!(attempts, "Max reconnection attempts reached");
            }
        }
    }

    // ========================================================================
    // Inbound Messages
    // ========================================================================

    fn handle_text(&self, text: &str) {
        match Envelope::decode(text) {
            Ok(envelope) => {
                let delivered = self.registry.dispatch(&envelope.event, &envelope.data);
                trace!(event = %envelope.event, delivered, "Dispatched message");
            }
            Err(e) => warn!(error = %e, "Dropping malformed message"),
        }
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    async fn shutdown_connection(&mut self) {
        self.reconnect = None;
        self.dial = None;

        if let Some((id, mut socket)) = self.socket.take() {
            match timeout(CLOSE_TIMEOUT, socket.close()).await {
                Ok(Ok(())) => debug!(connection_id = %id, "Socket closed"),
                Ok(Err(e)) => debug!(connection_id = %id, error = %e, "Socket close failed"),
                Err(_) => debug!(connection_id = %id, "Socket close timed out"),
            }
        }
    }

    async fn teardown(&mut self) {
        self.shutdown_connection().await;
        self.session.disconnect();
        self.registry.clear();
        self.publish_state();
    }

    fn publish_state(&self) {
        self.state_tx.send_replace(self.session.state());
    }

    fn emit(&self, event: LifecycleEvent) {
        let _ = self.lifecycle_tx.send(event);
    }
}

// ============================================================================
// Select Helpers
// ============================================================================

async fn next_dial(
    dial: &mut Option<(ConnectionId, DialFuture)>,
) -> (ConnectionId, Result<BoxSocket>) {
    match dial {
        Some((id, future)) => {
            let result = future.await;
            (*id, result)
        }
        None => pending().await,
    }
}

async fn next_frame(
    socket: &mut Option<(ConnectionId, BoxSocket)>,
) -> (ConnectionId, Option<StdResult<Message, WsError>>) {
    match socket {
        Some((id, socket)) => {
            let frame = socket.next().await;
            (*id, frame)
        }
        None => pending().await,
    }
}

async fn next_timer(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => pending().await,
    }
}
