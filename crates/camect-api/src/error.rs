use thiserror::Error;

/// Top-level error type for the `camect-api` crate.
///
/// Covers every failure mode across both hub surfaces: the REST command
/// API and the event-stream WebSocket. `camect-core` maps these into
/// user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, reset, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request exceeded the configured deadline.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS configuration or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Hub REST API ────────────────────────────────────────────────
    /// The hub answered with a non-success status. `message` is the
    /// hub's `err_msg` field when the body carried one.
    #[error("Hub returned HTTP {status}: {message}")]
    Remote { status: u16, message: String },

    // ── WebSocket ───────────────────────────────────────────────────
    /// WebSocket connection failed.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),

    /// WebSocket closed by the hub.
    #[error("WebSocket closed (code {code}): {reason}")]
    WebSocketClosed { code: u16, reason: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A frame or payload that does not follow the hub protocol.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl Error {
    /// Map a `reqwest` failure, folding deadline expiry into [`Error::Timeout`].
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: std::time::Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                timeout_secs: timeout.as_secs(),
            }
        } else {
            Self::Transport(err)
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::WebSocketConnect(_) | Self::WebSocketClosed { .. } => true,
            Self::Remote { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the hub rejected the credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Remote { status: 401 | 403, .. })
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_5xx_is_transient() {
        let err = Error::Remote {
            status: 503,
            message: "busy".into(),
        };
        assert!(err.is_transient());
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn remote_401_is_unauthorized_not_transient() {
        let err = Error::Remote {
            status: 401,
            message: "bad password".into(),
        };
        assert!(err.is_unauthorized());
        assert!(!err.is_transient());
    }

    #[test]
    fn protocol_error_display() {
        let err = Error::Protocol("binary frame is not UTF-8".into());
        assert_eq!(err.to_string(), "Protocol error: binary frame is not UTF-8");
    }
}
