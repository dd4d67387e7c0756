//! Hub event stream with auto-reconnect.
//!
//! Keeps exactly one WebSocket open to a hub's `/api/event_ws` endpoint for
//! as long as the stream is alive, handing every text frame to a
//! [`StreamObserver`] in wire order. Drops are retried forever with a
//! linear backoff (`floor`, `floor + step`, ... capped at `max_delay`) that
//! resets as soon as a connection opens.
//!
//! # Example
//!
//! ```rust,ignore
//! use camect_api::websocket::{EventStream, ReconnectConfig, StreamTarget};
//!
//! let target = StreamTarget::new(&endpoint, &TransportConfig::default())?;
//! let stream = EventStream::spawn(target, ReconnectConfig::default(), observer);
//!
//! // ... later
//! stream.shutdown().await;
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder, Message};
use tokio_tungstenite::{Connector, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::auth::HubEndpoint;
use crate::error::Error;
use crate::transport::TransportConfig;

/// A connection is declared dead after this many heartbeat intervals
/// without any inbound frame.
const MISSED_HEARTBEATS: u32 = 3;

/// Upper bound on the close handshake during shutdown.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

type HubSocket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

// ── ConnectionState ──────────────────────────────────────────────────

/// Lifecycle of the event-stream connection. Exactly one value is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
    /// Terminal: the stream was shut down and will not reconnect.
    Stopped,
}

/// Diagnostic snapshot published by the supervisor on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamStatus {
    pub state: ConnectionState,
    /// Delay that the next reconnection would wait.
    pub backoff: Duration,
    /// Consecutive failures since the last successful open.
    pub failures: u32,
}

// ── ReconnectConfig / Backoff ────────────────────────────────────────

/// Reconnection and liveness tuning.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay after the first failure, and after every successful open. Default: 2s.
    pub floor: Duration,
    /// Added for each further consecutive failure. Default: 10s.
    pub step: Duration,
    /// Upper bound on the delay. Default: 60s.
    pub max_delay: Duration,
    /// Interval between outbound pings. Default: 5s.
    pub heartbeat_interval: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            floor: Duration::from_secs(2),
            step: Duration::from_secs(10),
            max_delay: Duration::from_secs(60),
            heartbeat_interval: Duration::from_secs(5),
        }
    }
}

/// Linear, capped backoff.
///
/// `next_delay()` yields `floor`, `floor + step`, `floor + 2*step`, ...
/// never exceeding `max_delay`; `reset()` returns to `floor`.
#[derive(Debug, Clone)]
pub struct Backoff {
    floor: Duration,
    step: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(config: &ReconnectConfig) -> Self {
        let max = config.max_delay.max(config.floor);
        Self {
            floor: config.floor,
            step: config.step,
            max,
            current: config.floor,
        }
    }

    /// The delay the next failure will wait.
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Consume the current delay and advance to the next one.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_add(self.step).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.floor;
    }
}

// ── Observer ─────────────────────────────────────────────────────────

/// Receives everything the supervisor learns about a stream.
///
/// Called inline from the supervisor task, so implementations must be
/// quick; hand work off to a channel if it can block.
pub trait StreamObserver: Send + Sync + 'static {
    fn on_state(&self, state: ConnectionState);

    /// One inbound event payload, in wire order.
    fn on_message(&self, payload: String);

    /// The connection failed or dropped; a retry follows after `retry_in`.
    fn on_failure(&self, error: &Error, retry_in: Duration);
}

// ── StreamTarget ─────────────────────────────────────────────────────

/// Everything needed to (re)open the stream. Built once, reused for every
/// attempt so credentials are never re-derived mid-session.
#[derive(Clone)]
pub struct StreamTarget {
    url: Url,
    authorization: SecretString,
    connector: Option<Connector>,
    connect_timeout: Duration,
}

impl StreamTarget {
    pub fn new(endpoint: &HubEndpoint, transport: &TransportConfig) -> Result<Self, Error> {
        let url = endpoint.event_stream_url()?;
        let connector = if url.scheme() == "wss" {
            transport.websocket_connector()?
        } else {
            None
        };
        Ok(Self {
            url,
            authorization: endpoint.authorization_header(),
            connector,
            connect_timeout: transport.timeout,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

// ── EventStream ──────────────────────────────────────────────────────

/// Handle to a running event-stream supervisor.
///
/// Owns the background task. [`shutdown`](Self::shutdown) cancels any
/// in-flight connect, open socket or armed backoff timer and waits for the
/// task to finish, so the observer is never called after it returns.
/// Dropping the handle cancels the task without waiting for it.
pub struct EventStream {
    cancel: CancellationToken,
    task: JoinHandle<()>,
    status: watch::Receiver<StreamStatus>,
}

impl EventStream {
    /// Spawn the supervisor. Returns immediately; the first connection
    /// attempt happens on the background task.
    pub fn spawn(
        target: StreamTarget,
        reconnect: ReconnectConfig,
        observer: Arc<dyn StreamObserver>,
    ) -> Self {
        let backoff = Backoff::new(&reconnect);
        let (status_tx, status) = watch::channel(StreamStatus {
            state: ConnectionState::Disconnected,
            backoff: backoff.current(),
            failures: 0,
        });
        let cancel = CancellationToken::new();

        let supervisor = Supervisor {
            target,
            reconnect,
            observer,
            status: status_tx,
            cancel: cancel.clone(),
            backoff,
            failures: 0,
        };
        let task = tokio::spawn(supervisor.run());

        Self {
            cancel,
            task,
            status,
        }
    }

    /// Watch connection state and backoff transitions.
    pub fn status(&self) -> watch::Receiver<StreamStatus> {
        self.status.clone()
    }

    /// Whether the supervisor task is still running.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Cancel the supervisor and wait for it to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Err(e) = (&mut self.task).await {
            tracing::warn!(error = %e, "event stream task ended abnormally");
        }
    }
}

// Dropping the handle without `shutdown` still stops the supervisor; the
// task observes the cancellation at its next await point.
impl Drop for EventStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Supervisor loop ──────────────────────────────────────────────────

struct Supervisor {
    target: StreamTarget,
    reconnect: ReconnectConfig,
    observer: Arc<dyn StreamObserver>,
    status: watch::Sender<StreamStatus>,
    cancel: CancellationToken,
    backoff: Backoff,
    failures: u32,
}

impl Supervisor {
    /// Main loop: connect → read → on drop, back off → reconnect.
    async fn run(mut self) {
        loop {
            self.transition(ConnectionState::Connecting);

            // `Ok` only when cancelled; every way a live connection can end
            // comes back as an error.
            let Err(error) = self.connect_and_read().await else {
                break;
            };

            let delay = self.backoff.next_delay();
            self.failures = self.failures.saturating_add(1);
            let state = if matches!(error, Error::WebSocketClosed { .. }) {
                ConnectionState::Disconnected
            } else {
                ConnectionState::Error
            };

            tracing::warn!(
                url = %self.target.url,
                error = %error,
                failures = self.failures,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "event stream lost, reconnecting after backoff"
            );
            self.observer.on_failure(&error, delay);
            self.transition(state);

            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                () = tokio::time::sleep(delay) => {}
            }
        }

        self.publish(ConnectionState::Stopped);
        tracing::debug!(url = %self.target.url, "event stream supervisor exiting");
    }

    fn publish(&self, state: ConnectionState) {
        self.status.send_replace(StreamStatus {
            state,
            backoff: self.backoff.current(),
            failures: self.failures,
        });
    }

    fn transition(&self, state: ConnectionState) {
        self.publish(state);
        self.observer.on_state(state);
    }

    /// Open one connection and pump frames until it ends.
    async fn connect_and_read(&mut self) -> Result<(), Error> {
        tracing::info!(url = %self.target.url, "connecting to event stream");

        let socket = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Ok(()),
            result = open(&self.target) => result?,
        };

        self.backoff.reset();
        self.failures = 0;
        tracing::info!(url = %self.target.url, "event stream connected");
        self.transition(ConnectionState::Connected);

        self.read_frames(socket).await
    }

    async fn read_frames(&self, socket: HubSocket) -> Result<(), Error> {
        let (mut write, mut read) = socket.split();

        let period = self.reconnect.heartbeat_interval.max(Duration::from_millis(10));
        let idle_limit = period.saturating_mul(MISSED_HEARTBEATS);
        let mut heartbeat = tokio::time::interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_seen = Instant::now();

        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => {
                    let _ = tokio::time::timeout(CLOSE_GRACE, write.send(Message::Close(None))).await;
                    return Ok(());
                }
                _ = heartbeat.tick() => {
                    if last_seen.elapsed() >= idle_limit {
                        return Err(Error::WebSocketConnect(format!(
                            "no frames received for {}s",
                            idle_limit.as_secs()
                        )));
                    }
                    write
                        .send(Message::Ping(Vec::new().into()))
                        .await
                        .map_err(|e| Error::WebSocketConnect(e.to_string()))?;
                }
                frame = read.next() => {
                    last_seen = Instant::now();
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            tracing::trace!(len = text.len(), "event frame");
                            self.observer.on_message(text.as_str().to_owned());
                        }
                        Some(Ok(Message::Binary(data))) => match String::from_utf8(data.to_vec()) {
                            Ok(text) => self.observer.on_message(text),
                            Err(e) => {
                                tracing::warn!(error = %e, "dropping non-UTF-8 binary frame");
                            }
                        },
                        Some(Ok(Message::Ping(_))) => {
                            // tungstenite queues the pong reply itself
                            tracing::trace!("event stream ping");
                        }
                        Some(Ok(Message::Close(frame))) => {
                            let (code, reason) = frame.map_or_else(
                                || (1005, String::new()),
                                |cf| (u16::from(cf.code), cf.reason.as_str().to_owned()),
                            );
                            tracing::info!(code, reason = %reason, "event stream close frame received");
                            return Err(Error::WebSocketClosed { code, reason });
                        }
                        Some(Ok(_)) => {
                            // Pong, raw Frame -- liveness only
                        }
                        Some(Err(e)) => {
                            return Err(Error::WebSocketConnect(e.to_string()));
                        }
                        None => {
                            return Err(Error::WebSocketClosed {
                                code: 1006,
                                reason: "stream ended without close frame".into(),
                            });
                        }
                    }
                }
            }
        }
    }
}

/// Perform the WebSocket handshake with the authorization header attached.
async fn open(target: &StreamTarget) -> Result<HubSocket, Error> {
    let uri: tungstenite::http::Uri = target
        .url
        .as_str()
        .parse()
        .map_err(|e: tungstenite::http::uri::InvalidUri| Error::WebSocketConnect(e.to_string()))?;

    let request = ClientRequestBuilder::new(uri)
        .with_header("Authorization", target.authorization.expose_secret());

    let handshake = tokio_tungstenite::connect_async_tls_with_config(
        request,
        None,
        false,
        target.connector.clone(),
    );

    let (socket, _response) = tokio::time::timeout(target.connect_timeout, handshake)
        .await
        .map_err(|_| Error::Timeout {
            timeout_secs: target.connect_timeout.as_secs(),
        })?
        .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

    Ok(socket)
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(floor: u64, step: u64, max: u64) -> ReconnectConfig {
        ReconnectConfig {
            floor: Duration::from_secs(floor),
            step: Duration::from_secs(step),
            max_delay: Duration::from_secs(max),
            heartbeat_interval: Duration::from_secs(5),
        }
    }

    #[test]
    fn default_reconnect_config() {
        let config = ReconnectConfig::default();
        assert_eq!(config.floor, Duration::from_secs(2));
        assert_eq!(config.step, Duration::from_secs(10));
        assert_eq!(config.max_delay, Duration::from_secs(60));
        assert_eq!(config.heartbeat_interval, Duration::from_secs(5));
    }

    #[test]
    fn backoff_steps_linearly_from_floor() {
        let mut backoff = Backoff::new(&config(2, 10, 60));
        assert_eq!(backoff.next_delay(), Duration::from_secs(2));
        assert_eq!(backoff.next_delay(), Duration::from_secs(12));
        assert_eq!(backoff.next_delay(), Duration::from_secs(22));
    }

    #[test]
    fn backoff_is_monotone_and_capped() {
        let mut backoff = Backoff::new(&config(2, 10, 60));
        let mut previous = Duration::ZERO;
        for _ in 0..50 {
            let delay = backoff.next_delay();
            assert!(delay >= previous, "{delay:?} < {previous:?}");
            assert!(delay <= Duration::from_secs(60));
            previous = delay;
        }
        assert_eq!(previous, Duration::from_secs(60));
    }

    #[test]
    fn backoff_resets_to_floor() {
        let mut backoff = Backoff::new(&config(2, 10, 60));
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.current(), Duration::from_secs(2));
        assert_eq!(backoff.next_delay(), Duration::from_secs(2));
    }

    #[test]
    fn backoff_max_below_floor_clamps_to_floor() {
        let mut backoff = Backoff::new(&config(5, 10, 1));
        assert_eq!(backoff.next_delay(), Duration::from_secs(5));
        assert_eq!(backoff.next_delay(), Duration::from_secs(5));
    }

    #[test]
    fn plain_target_has_no_connector() {
        let endpoint = HubEndpoint::new(
            "127.0.0.1",
            9000,
            "admin",
            SecretString::from("pw".to_string()),
        )
        .with_scheme(crate::auth::Scheme::Plain);
        let target = StreamTarget::new(&endpoint, &TransportConfig::default()).unwrap();
        assert!(target.connector.is_none());
        assert_eq!(target.url().as_str(), "ws://127.0.0.1:9000/api/event_ws");
    }
}
