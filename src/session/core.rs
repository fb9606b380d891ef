//! Core BrowserSession struct, options, lifecycle and throttle.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::time::sleep;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::protocol::{Command, DomCommand, NetworkCommand, PageCommand, Response, RuntimeCommand};
use crate::transport::{ConnectOptions, Connection, discover};

// ============================================================================
// SessionOptions
// ============================================================================

/// Construction-time options for a [`BrowserSession`].
///
/// There is no environment or file based configuration; both knobs are fixed
/// per instance at construction.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Minimum interval between actions in milliseconds.
    pub rate_limit_ms: u64,
    /// Default timeout for actions in milliseconds.
    pub default_timeout_ms: u64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            rate_limit_ms: 400,
            default_timeout_ms: 30_000,
        }
    }
}

// ============================================================================
// BrowserSession
// ============================================================================

/// A single-session browser remote-control facade.
///
/// Owns one connection to one debugging target and exposes navigation,
/// interaction, extraction and DOM-domain queries over it. Every
/// action-issuing method passes through a shared rate-limit gate before
/// touching the wire.
///
/// Operations are meant to be issued sequentially; concurrent invocation on
/// one session has undefined interleaving at the rate limiter and is not a
/// supported usage pattern. For parallel automation, use independent
/// sessions against independent targets.
///
/// # Example
///
/// ```no_run
/// use cdp_session::{BrowserSession, ConnectOptions, Result};
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let session = BrowserSession::default();
///     session.connect(ConnectOptions::default()).await?;
///
///     session.open("https://example.com", None).await?;
///     let title = session.title().await?;
///     println!("Page title: {title}");
///
///     session.disconnect().await;
///     Ok(())
/// }
/// ```
pub struct BrowserSession {
    /// Construction-time options.
    options: SessionOptions,
    /// Live connection handle (None before connect / after disconnect).
    connection: Mutex<Option<Connection>>,
    /// Timestamp of the last issued action, for the throttle.
    last_action: Mutex<Option<Instant>>,
    /// Document generation, bumped on every successful navigation.
    generation: AtomicU64,
}

impl Default for BrowserSession {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}

impl fmt::Debug for BrowserSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserSession")
            .field("options", &self.options)
            .field("connected", &self.connection.lock().is_some())
            .field("generation", &self.generation.load(Ordering::Relaxed))
            .finish()
    }
}

impl BrowserSession {
    /// Creates a disconnected session with the given options.
    #[must_use]
    pub fn new(options: SessionOptions) -> Self {
        Self {
            options,
            connection: Mutex::new(None),
            last_action: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Returns the session options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> SessionOptions {
        self.options
    }

    /// Returns `true` if the session holds a live connection.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connection.lock().is_some()
    }
}

// ============================================================================
// BrowserSession - Lifecycle
// ============================================================================

impl BrowserSession {
    /// Connects to a debugging target and enables the required domains.
    ///
    /// Resolves the target per `options` (HTTP discovery unless a direct
    /// WebSocket URL is given), opens the WebSocket, then enables the
    /// `Network`, `Page`, `Runtime` and `DOM` domains. The session is
    /// unusable before this succeeds. Reconnecting an already connected
    /// session shuts the previous connection down first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the endpoint is unreachable or any
    /// domain cannot be enabled.
    pub async fn connect(&self, options: ConnectOptions) -> Result<()> {
        let ws_url = discover(&options).await?;
        let connection = Connection::connect(&ws_url).await?;

        let domains = [
            Command::Network(NetworkCommand::Enable {}),
            Command::Page(PageCommand::Enable {}),
            Command::Runtime(RuntimeCommand::Enable {}),
            Command::Dom(DomCommand::Enable {}),
        ];

        for command in domains {
            let method = command.method();
            let result = connection.send(command).await.and_then(Response::into_result);
            if let Err(e) = result {
                connection.shutdown();
                return Err(Error::connection(format!("failed to enable {method}: {e}")));
            }
        }

        if let Some(previous) = self.connection.lock().replace(connection) {
            debug!("Replacing existing connection");
            previous.shutdown();
        }

        debug!(url = %ws_url, "Session connected");
        Ok(())
    }

    /// Disconnects from the debugging target.
    ///
    /// Idempotent: safe to call on an already-disconnected or
    /// never-connected session.
    pub async fn disconnect(&self) {
        if let Some(connection) = self.connection.lock().take() {
            connection.shutdown();
            debug!("Session disconnected");
        }
    }
}

// ============================================================================
// BrowserSession - Internal
// ============================================================================

impl BrowserSession {
    /// Returns the live connection or [`Error::NotConnected`].
    pub(crate) fn conn(&self) -> Result<Connection> {
        self.connection.lock().clone().ok_or(Error::NotConnected)
    }

    /// Returns the session default timeout.
    #[inline]
    pub(crate) fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.options.default_timeout_ms)
    }

    /// Resolves an optional per-call timeout against the session default.
    #[inline]
    pub(crate) fn resolve_timeout(&self, timeout: Option<Duration>) -> Duration {
        timeout.unwrap_or_else(|| self.default_timeout())
    }

    /// Rate-limit gate: suspends until at least `rate_limit_ms` has elapsed
    /// since the previous action, then stamps the new last-action time.
    ///
    /// Cooperative, single-session throttle; it does not coordinate across
    /// sessions hitting the same target.
    pub(crate) async fn throttle(&self) {
        let limit = Duration::from_millis(self.options.rate_limit_ms);

        let wait = {
            let last_action = self.last_action.lock();
            match *last_action {
                Some(last) => limit.saturating_sub(last.elapsed()),
                None => Duration::ZERO,
            }
        };

        if !wait.is_zero() {
            trace!(wait_ms = wait.as_millis() as u64, "Throttling action");
            sleep(wait).await;
        }

        *self.last_action.lock() = Some(Instant::now());
    }

    /// Throttles, then sends a command with the session default timeout.
    pub(crate) async fn command(&self, command: Command) -> Result<Response> {
        self.throttle().await;
        let connection = self.conn()?;
        connection.send_with_timeout(command, self.default_timeout()).await
    }

    /// Returns the current document generation.
    #[inline]
    pub(crate) fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Bumps the document generation, invalidating outstanding node refs.
    pub(crate) fn bump_generation(&self) {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        trace!(generation, "Document generation bumped");
    }
}

// ============================================================================
// Tests
// ============================================================================
