// ── Session facade ──
//
// One `Session` per hub. Composes the REST client and the event-stream
// supervisor, and owns the delegate relationship. REST calls run on the
// caller's task; the stream runs on its own spawned task.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use camect_api::{
    Camera, ConnectionState, EventStream, HomeInfo, HubClient, StreamObserver, StreamStatus,
    StreamTarget,
};

use crate::config::SessionConfig;
use crate::delegate::{HubStatus, SessionDelegate};
use crate::error::CoreError;

// ── Session ──────────────────────────────────────────────────────────

/// Entry point for a single hub.
///
/// Cheaply cloneable via `Arc<SessionInner>`. Creating a session does not
/// touch the network; call [`start()`](Self::start) to open the event stream.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: SessionConfig,
    client: HubClient,
    target: StreamTarget,
    delegate: Arc<dyn SessionDelegate>,
    state: Arc<watch::Sender<ConnectionState>>,
    lifecycle: Mutex<Lifecycle>,
}

enum Lifecycle {
    Idle,
    Running(EventStream),
    Stopped,
}

impl Session {
    /// Build a session. Derives URLs, the authorization header and TLS
    /// settings once; they never change afterwards.
    pub fn new(config: SessionConfig, delegate: Arc<dyn SessionDelegate>) -> Result<Self, CoreError> {
        let client = HubClient::new(&config.endpoint, &config.transport)?;
        let target = StreamTarget::new(&config.endpoint, &config.transport)?;
        let (state, _) = watch::channel(ConnectionState::Disconnected);

        Ok(Self {
            inner: Arc::new(SessionInner {
                config,
                client,
                target,
                delegate,
                state: Arc::new(state),
                lifecycle: Mutex::new(Lifecycle::Idle),
            }),
        })
    }

    pub fn hub_id(&self) -> &str {
        &self.inner.config.hub_id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// The underlying REST client.
    pub fn client(&self) -> &HubClient {
        &self.inner.client
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    /// Subscribe to connection state changes.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    /// Supervisor diagnostics (state, pending backoff, failure count) while
    /// the stream is running.
    pub async fn stream_status(&self) -> Option<StreamStatus> {
        let lifecycle = self.inner.lifecycle.lock().await;
        let Lifecycle::Running(stream) = &*lifecycle else {
            return None;
        };
        let status = stream.status();
        let current = *status.borrow();
        Some(current)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Start supervising the event stream.
    ///
    /// Emits `Started`, then spawns the supervisor. Calling `start()` on a
    /// running session does nothing, so one session never holds two sockets.
    pub async fn start(&self) -> Result<(), CoreError> {
        let mut lifecycle = self.inner.lifecycle.lock().await;
        match *lifecycle {
            Lifecycle::Running(_) => {
                debug!(hub = %self.hub_id(), "session already running");
                return Ok(());
            }
            Lifecycle::Stopped => {
                return Err(CoreError::SessionStopped {
                    hub_id: self.hub_id().to_owned(),
                });
            }
            Lifecycle::Idle => {}
        }

        info!(hub = %self.hub_id(), url = %self.inner.target.url(), "starting hub session");
        self.inner.delegate.on_status(self.hub_id(), HubStatus::Started);

        let observer = Arc::new(SessionObserver {
            hub_id: self.inner.config.hub_id.clone(),
            delegate: Arc::clone(&self.inner.delegate),
            state: Arc::clone(&self.inner.state),
        });
        let stream = EventStream::spawn(
            self.inner.target.clone(),
            self.inner.config.reconnect.clone(),
            observer,
        );
        *lifecycle = Lifecycle::Running(stream);
        Ok(())
    }

    /// Tear the session down.
    ///
    /// Cancels any in-flight connect, open socket or armed backoff timer,
    /// waits for the supervisor to exit, then emits a final `Stopped`. No
    /// notification follows. Stopping twice is a no-op.
    pub async fn stop(&self) {
        let mut lifecycle = self.inner.lifecycle.lock().await;
        match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
            Lifecycle::Stopped => return,
            Lifecycle::Running(stream) => stream.shutdown().await,
            Lifecycle::Idle => {}
        }

        self.inner.state.send_replace(ConnectionState::Stopped);
        self.inner.delegate.on_status(self.hub_id(), HubStatus::Stopped);
        info!(hub = %self.hub_id(), "hub session stopped");
    }

    /// Whether the supervisor is currently running.
    pub async fn is_running(&self) -> bool {
        matches!(*self.inner.lifecycle.lock().await, Lifecycle::Running(_))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Hub metadata (`GetHomeInfo`).
    pub async fn get_info(&self) -> Result<HomeInfo, CoreError> {
        self.report("get_info", self.inner.client.get_info().await)
    }

    /// Switch the operation mode. Echoes `mode` on success.
    pub async fn set_mode(&self, mode: &str) -> Result<String, CoreError> {
        self.report("set_mode", self.inner.client.set_mode(mode).await)
    }

    pub async fn list_cameras(&self) -> Result<Vec<Camera>, CoreError> {
        self.report("list_cameras", self.inner.client.list_cameras().await)
    }

    /// JPEG still from a camera, or `None` on any failure (already logged).
    pub async fn snapshot_camera(&self, camera_id: &str, width: u32, height: u32) -> Option<Vec<u8>> {
        self.inner.client.snapshot_camera(camera_id, width, height).await
    }

    pub async fn ptz(&self, camera_id: &str, action: &str) -> Result<(), CoreError> {
        self.report("ptz", self.inner.client.ptz(camera_id, action).await)
    }

    /// Suppress alerts for `camera_ids`, or hub-wide when empty.
    pub async fn disable_alert<S: AsRef<str>>(
        &self,
        camera_ids: &[S],
        reason: &str,
    ) -> Result<(), CoreError> {
        self.report(
            "disable_alert",
            self.inner.client.disable_alert(camera_ids, reason).await,
        )
    }

    /// Undo a `disable_alert` made with the same `reason`.
    pub async fn enable_alert<S: AsRef<str>>(
        &self,
        camera_ids: &[S],
        reason: &str,
    ) -> Result<(), CoreError> {
        self.report(
            "enable_alert",
            self.inner.client.enable_alert(camera_ids, reason).await,
        )
    }

    /// REST failures are returned to the caller and logged, never fatal.
    fn report<T>(&self, operation: &'static str, result: Result<T, camect_api::Error>) -> Result<T, CoreError> {
        result.map_err(|e| {
            warn!(hub = %self.hub_id(), operation, error = %e, "hub command failed");
            CoreError::from(e)
        })
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("hub_id", &self.inner.config.hub_id)
            .field("endpoint", &self.inner.config.endpoint)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

// ── Supervisor → delegate bridge ─────────────────────────────────────

struct SessionObserver {
    hub_id: String,
    delegate: Arc<dyn SessionDelegate>,
    state: Arc<watch::Sender<ConnectionState>>,
}

impl StreamObserver for SessionObserver {
    fn on_state(&self, state: ConnectionState) {
        self.state.send_replace(state);
        let status = match state {
            ConnectionState::Connected => HubStatus::Connected,
            ConnectionState::Disconnected => HubStatus::Disconnected,
            ConnectionState::Error => HubStatus::Error,
            ConnectionState::Stopped => HubStatus::Stopped,
            // covered by `Started` from `Session::start`
            ConnectionState::Connecting => return,
        };
        self.delegate.on_status(&self.hub_id, status);
    }

    fn on_message(&self, payload: String) {
        self.delegate.on_message(&self.hub_id, payload);
    }

    fn on_failure(&self, error: &camect_api::Error, retry_in: Duration) {
        debug!(hub = %self.hub_id, retry_in_ms = u64::try_from(retry_in.as_millis()).unwrap_or(u64::MAX), "stream failure");
        self.delegate.on_error(&self.hub_id, &error.to_string());
    }
}
