// ── Core error types ──
//
// User-facing errors from camect-core. Consumers never see raw HTTP or
// WebSocket details; the `From<camect_api::Error>` impl translates
// transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to hub at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Hub request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Lookup errors ────────────────────────────────────────────────
    #[error("Hub not found: {hub_id}")]
    HubNotFound { hub_id: String },

    #[error("Camera not found on hub {hub_id}: {camera}")]
    CameraNotFound { hub_id: String, camera: String },

    #[error("Camera {camera} is disabled")]
    CameraDisabled { camera: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Hub rejected the request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Protocol error: {message}")]
    Protocol { message: String },

    #[error("No snapshot available for camera {camera}")]
    SnapshotUnavailable { camera: String },

    #[error("Session for hub {hub_id} has been stopped")]
    SessionStopped { hub_id: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether retrying the same call later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::Timeout { .. } | Self::SnapshotUnavailable { .. }
        ) || matches!(self, Self::Rejected { status, .. } if *status >= 500)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<camect_api::Error> for CoreError {
    fn from(err: camect_api::Error) -> Self {
        match err {
            camect_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                }
            }
            camect_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid hub address: {e}"),
            },
            camect_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            camect_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            camect_api::Error::Remote { status, message } if status == 401 || status == 403 => {
                CoreError::AuthenticationFailed { message }
            }
            camect_api::Error::Remote { status, message } => {
                CoreError::Rejected { status, message }
            }
            camect_api::Error::WebSocketConnect(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("WebSocket connection failed: {reason}"),
            },
            camect_api::Error::WebSocketClosed { code, reason } => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("WebSocket closed (code {code}): {reason}"),
            },
            camect_api::Error::Deserialization { message, body: _ } => CoreError::Protocol {
                message: format!("unexpected response body: {message}"),
            },
            camect_api::Error::Protocol(message) => CoreError::Protocol { message },
        }
    }
}
