// ── Runtime session configuration ──
//
// Describes *how* to reach one hub: endpoint, credentials and connection
// tuning. Never touches disk; the CLI (or any other host) builds a
// `SessionConfig` and hands it to `Session::new`.

use std::time::Duration;

use camect_api::{HubEndpoint, ReconnectConfig, TransportConfig};

/// Configuration for supervising a single hub.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Host-chosen identifier passed back on every delegate notification.
    pub hub_id: String,
    /// Address and credentials. Immutable for the lifetime of the session.
    pub endpoint: HubEndpoint,
    /// TLS policy and REST request timeout.
    pub transport: TransportConfig,
    /// Event-stream backoff and heartbeat tuning.
    pub reconnect: ReconnectConfig,
}

impl SessionConfig {
    /// A config with default transport and reconnect settings.
    pub fn new(hub_id: impl Into<String>, endpoint: HubEndpoint) -> Self {
        Self {
            hub_id: hub_id.into(),
            endpoint,
            transport: TransportConfig::default(),
            reconnect: ReconnectConfig::default(),
        }
    }

    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// REST request deadline.
    pub fn timeout(&self) -> Duration {
        self.transport.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn new_uses_defaults() {
        let endpoint = HubEndpoint::new("10.0.0.5", 443, "admin", SecretString::from("pw".to_string()));
        let config = SessionConfig::new("garage", endpoint);
        assert_eq!(config.hub_id, "garage");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.reconnect.floor, Duration::from_secs(2));
    }
}
