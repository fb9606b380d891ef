//! WebSocket connection and event loop.
//!
//! This module handles the WebSocket connection to the remote debugging
//! endpoint, including request/response correlation and event routing.
//!
//! # Event Loop
//!
//! The connection spawns a tokio task that handles:
//!
//! - Incoming messages from the endpoint (responses, events)
//! - Outgoing commands from the session API
//! - Request/response correlation by integer id
//! - One-shot event waiters (e.g. `Page.loadEventFired`)
//!
//! # Timeout Semantics
//!
//! [`Connection::send_with_timeout`] races the response against a timer.
//! Losing the race removes the correlation entry and returns
//! [`Error::Timeout`]; the command itself is **not** cancelled and may still
//! complete on the remote side. A late response for an abandoned request is
//! dropped with a trace log.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::{from_str, to_string};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, trace, warn};

use crate::error::{Error, Result};
use crate::protocol::{Command, Event, Incoming, Request, Response};

// ============================================================================
// Constants
// ============================================================================

/// Default timeout for command execution.
const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum pending requests before rejecting new ones.
const MAX_PENDING_REQUESTS: usize = 100;

// ============================================================================
// Types
// ============================================================================

/// WebSocket stream to the debugging endpoint.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Map of request ids to response channels.
type CorrelationMap = FxHashMap<u64, oneshot::Sender<Result<Response>>>;

/// Registered one-shot event waiters, keyed by event method name.
type EventWaiters = Vec<(String, oneshot::Sender<Event>)>;

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Send a request and wait for response.
    Send {
        request: Request,
        response_tx: oneshot::Sender<Result<Response>>,
    },
    /// Remove a timed-out correlation entry.
    RemoveCorrelation(u64),
    /// Shutdown the connection.
    Shutdown,
}

// ============================================================================
// Connection
// ============================================================================

/// WebSocket connection to a remote debugging endpoint.
///
/// Handles request/response correlation and event routing.
/// The connection spawns an internal event loop task.
///
/// # Thread Safety
///
/// `Connection` is `Send + Sync` and cheap to clone; clones share the same
/// underlying socket and event loop.
#[derive(Clone)]
pub struct Connection {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    /// Correlation map (shared with event loop).
    correlation: Arc<Mutex<CorrelationMap>>,
    /// One-shot event waiters (shared with event loop).
    waiters: Arc<Mutex<EventWaiters>>,
    /// Monotonic request id source.
    next_id: Arc<AtomicU64>,
}

impl Connection {
    /// Opens a WebSocket connection to the given debugger URL.
    ///
    /// Spawns the event loop task internally.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the transport cannot be established.
    pub async fn connect(ws_url: &str) -> Result<Self> {
        debug!(url = %ws_url, "Connecting to debugging endpoint");

        let (ws_stream, _) = connect_async(ws_url)
            .await
            .map_err(|e| Error::connection(format!("{ws_url}: {e}")))?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let correlation = Arc::new(Mutex::new(CorrelationMap::default()));
        let waiters: Arc<Mutex<EventWaiters>> = Arc::new(Mutex::new(Vec::new()));

        tokio::spawn(Self::run_event_loop(
            ws_stream,
            command_rx,
            Arc::clone(&correlation),
            Arc::clone(&waiters),
        ));

        Ok(Self {
            command_tx,
            correlation,
            waiters,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Registers a one-shot waiter for the next event with the given method.
    ///
    /// Register **before** issuing the command that triggers the event, or
    /// the event may be missed. The receiver resolves with the event, or
    /// fails if the connection shuts down first.
    pub fn wait_for_event(&self, method: &str) -> oneshot::Receiver<Event> {
        let (tx, rx) = oneshot::channel();
        self.waiters.lock().push((method.to_string(), tx));
        rx
    }

    /// Sends a command and waits for its response with the default timeout.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the connection is closed
    /// - [`Error::Timeout`] if no response arrives within the timeout
    /// - [`Error::Protocol`] if too many requests are pending
    pub async fn send(&self, command: Command) -> Result<Response> {
        self.send_with_timeout(command, DEFAULT_COMMAND_TIMEOUT)
            .await
    }

    /// Sends a command and waits for its response with a custom timeout.
    ///
    /// On timeout the correlation entry is removed so a late response is
    /// dropped; the remote operation is not cancelled.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the connection is closed
    /// - [`Error::Timeout`] if no response arrives within the timeout
    /// - [`Error::Protocol`] if too many requests are pending
    pub async fn send_with_timeout(
        &self,
        command: Command,
        request_timeout: Duration,
    ) -> Result<Response> {
        // Check pending request limit
        {
            let correlation = self.correlation.lock();
            if correlation.len() >= MAX_PENDING_REQUESTS {
                warn!(
                    pending = correlation.len(),
                    max = MAX_PENDING_REQUESTS,
                    "Too many pending requests"
                );
                return Err(Error::protocol(format!(
                    "Too many pending requests: {}/{}",
                    correlation.len(),
                    MAX_PENDING_REQUESTS
                )));
            }
        }

        let operation = command.method();
        let request = Request::new(self.next_id.fetch_add(1, Ordering::Relaxed), command);
        let request_id = request.id;

        // Create response channel
        let (response_tx, response_rx) = oneshot::channel();

        // Send command to event loop
        self.command_tx
            .send(ConnectionCommand::Send {
                request,
                response_tx,
            })
            .map_err(|_| Error::ConnectionClosed)?;

        // Wait for response with timeout
        match timeout(request_timeout, response_rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => {
                // Timeout - abandon the in-flight request
                let _ = self
                    .command_tx
                    .send(ConnectionCommand::RemoveCorrelation(request_id));

                Err(Error::timeout(
                    operation,
                    request_timeout.as_millis() as u64,
                ))
            }
        }
    }

    /// Returns the number of pending requests.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.correlation.lock().len()
    }

    /// Shuts down the connection gracefully.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(ConnectionCommand::Shutdown);
    }

    /// Event loop that handles WebSocket I/O.
    async fn run_event_loop(
        ws_stream: WsStream,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        correlation: Arc<Mutex<CorrelationMap>>,
        waiters: Arc<Mutex<EventWaiters>>,
    ) {
        let (mut ws_write, mut ws_read) = ws_stream.split();

        loop {
            tokio::select! {
                // Incoming messages from the endpoint
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            Self::handle_incoming_message(&text, &correlation, &waiters);
                        }

                        Some(Ok(Message::Close(_))) => {
                            debug!("WebSocket closed by remote");
                            break;
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            break;
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            break;
                        }

                        // Ignore Binary, Ping, Pong
                        _ => {}
                    }
                }

                // Commands from the session API
                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Send { request, response_tx }) => {
                            Self::handle_send_command(
                                request,
                                response_tx,
                                &mut ws_write,
                                &correlation,
                            ).await;
                        }

                        Some(ConnectionCommand::RemoveCorrelation(request_id)) => {
                            correlation.lock().remove(&request_id);
                            debug!(request_id, "Removed timed-out correlation");
                        }

                        Some(ConnectionCommand::Shutdown) => {
                            debug!("Shutdown command received");
                            let _ = ws_write.close().await;
                            break;
                        }

                        None => {
                            debug!("Command channel closed");
                            break;
                        }
                    }
                }
            }
        }

        // Fail all pending requests and drop waiters on shutdown
        Self::fail_pending_requests(&correlation);
        waiters.lock().clear();

        debug!("Event loop terminated");
    }

    /// Handles an incoming text message from the endpoint.
    fn handle_incoming_message(
        text: &str,
        correlation: &Arc<Mutex<CorrelationMap>>,
        waiters: &Arc<Mutex<EventWaiters>>,
    ) {
        match from_str::<Incoming>(text) {
            Ok(Incoming::Response(response)) => {
                let tx = correlation.lock().remove(&response.id);

                if let Some(tx) = tx {
                    let _ = tx.send(Ok(response));
                } else {
                    trace!(id = response.id, "Dropping response for abandoned request");
                }
            }

            Ok(Incoming::Event(event)) => {
                trace!(method = %event.method, "Event received");

                let mut matched = Vec::new();
                {
                    let mut waiters = waiters.lock();
                    let mut i = 0;
                    while i < waiters.len() {
                        if waiters[i].0 == event.method {
                            matched.push(waiters.swap_remove(i).1);
                        } else {
                            i += 1;
                        }
                    }
                }

                for tx in matched {
                    let _ = tx.send(event.clone());
                }
            }

            Err(_) => {
                warn!(text = %text, "Failed to parse incoming message");
            }
        }
    }

    /// Handles a send command from the session API.
    async fn handle_send_command(
        request: Request,
        response_tx: oneshot::Sender<Result<Response>>,
        ws_write: &mut SplitSink<WsStream, Message>,
        correlation: &Arc<Mutex<CorrelationMap>>,
    ) {
        let request_id = request.id;

        // Serialize request
        let json = match to_string(&request) {
            Ok(j) => j,
            Err(e) => {
                let _ = response_tx.send(Err(Error::Json(e)));
                return;
            }
        };

        // Store correlation before sending
        correlation.lock().insert(request_id, response_tx);

        // Send over WebSocket
        if let Err(e) = ws_write.send(Message::Text(json.into())).await {
            // Remove correlation and notify caller
            if let Some(tx) = correlation.lock().remove(&request_id) {
                let _ = tx.send(Err(Error::connection(e.to_string())));
            }
        }

        trace!(request_id, "Request sent");
    }

    /// Fails all pending requests with ConnectionClosed error.
    fn fail_pending_requests(correlation: &Arc<Mutex<CorrelationMap>>) {
        let pending: Vec<_> = correlation.lock().drain().collect();
        let count = pending.len();

        for (_, tx) in pending {
            let _ = tx.send(Err(Error::ConnectionClosed));
        }

        if count > 0 {
            debug!(count, "Failed pending requests on shutdown");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
