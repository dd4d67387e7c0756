use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::error::Error;

/// Default HTTPS port a Camect hub listens on.
pub const DEFAULT_PORT: u16 = 443;

/// Path of the event-stream WebSocket, relative to the hub root.
const EVENT_STREAM_PATH: &str = "api/event_ws";

/// Wire scheme used to reach the hub.
///
/// Hubs only speak TLS; [`Plain`](Self::Plain) exists for local reverse
/// proxies and in-process test servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    /// `https://` for REST, `wss://` for the event stream.
    #[default]
    Secure,
    /// `http://` for REST, `ws://` for the event stream.
    Plain,
}

impl Scheme {
    fn http(self) -> &'static str {
        match self {
            Self::Secure => "https",
            Self::Plain => "http",
        }
    }

    fn ws(self) -> &'static str {
        match self {
            Self::Secure => "wss",
            Self::Plain => "ws",
        }
    }
}

/// Address and credentials of a single hub.
///
/// Immutable once a session is created. Every URL and the `Authorization`
/// header are derived from it, so a session never re-reads credentials.
#[derive(Clone)]
pub struct HubEndpoint {
    address: String,
    port: u16,
    username: String,
    password: SecretString,
    scheme: Scheme,
}

impl HubEndpoint {
    pub fn new(
        address: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self {
            address: address.into(),
            port,
            username: username.into(),
            password,
            scheme: Scheme::Secure,
        }
    }

    /// Override the wire scheme (see [`Scheme::Plain`]).
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Root of the REST command API: `https://{address}:{port}/api/`.
    pub fn api_base(&self) -> Result<Url, Error> {
        let raw = format!("{}://{}/api/", self.scheme.http(), self.authority());
        Ok(Url::parse(&raw)?)
    }

    /// Event-stream URL: `wss://{address}:{port}/api/event_ws`.
    pub fn event_stream_url(&self) -> Result<Url, Error> {
        let raw = format!(
            "{}://{}/{EVENT_STREAM_PATH}",
            self.scheme.ws(),
            self.authority()
        );
        Ok(Url::parse(&raw)?)
    }

    /// `host:port`, with IPv6 literals bracketed.
    fn authority(&self) -> String {
        if self.address.contains(':') && !self.address.starts_with('[') {
            format!("[{}]:{}", self.address, self.port)
        } else {
            format!("{}:{}", self.address, self.port)
        }
    }

    /// Value for the `Authorization` header: `Basic base64(user:pass)`.
    pub fn authorization_header(&self) -> SecretString {
        let pair = format!("{}:{}", self.username, self.password.expose_secret());
        SecretString::from(format!("Basic {}", STANDARD.encode(pair)))
    }
}

impl fmt::Debug for HubEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HubEndpoint")
            .field("address", &self.address)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"****")
            .field("scheme", &self.scheme)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn endpoint() -> HubEndpoint {
        HubEndpoint::new(
            "192.168.1.20",
            DEFAULT_PORT,
            "admin",
            SecretString::from("hunter2".to_string()),
        )
    }

    #[test]
    fn derives_secure_urls() {
        let ep = endpoint();
        assert_eq!(
            ep.api_base().unwrap().as_str(),
            "https://192.168.1.20/api/"
        );
        assert_eq!(
            ep.event_stream_url().unwrap().as_str(),
            "wss://192.168.1.20/api/event_ws"
        );
    }

    #[test]
    fn non_default_port_is_kept() {
        let ep = HubEndpoint::new("hub.local", 8443, "admin", SecretString::from(String::new()));
        assert_eq!(ep.api_base().unwrap().as_str(), "https://hub.local:8443/api/");
    }

    #[test]
    fn ipv6_literal_is_bracketed() {
        let ep = HubEndpoint::new("fe80::1", 8443, "admin", SecretString::from(String::new()));
        assert_eq!(ep.api_base().unwrap().as_str(), "https://[fe80::1]:8443/api/");
        assert_eq!(
            ep.event_stream_url().unwrap().as_str(),
            "wss://[fe80::1]:8443/api/event_ws"
        );

        let bracketed = HubEndpoint::new("[::1]", 8443, "admin", SecretString::from(String::new()));
        assert_eq!(bracketed.api_base().unwrap().as_str(), "https://[::1]:8443/api/");
    }

    #[test]
    fn plain_scheme_switches_both_urls() {
        let ep = endpoint().with_scheme(Scheme::Plain);
        assert!(ep.api_base().unwrap().as_str().starts_with("http://"));
        assert!(ep.event_stream_url().unwrap().as_str().starts_with("ws://"));
    }

    #[test]
    fn basic_authorization_header() {
        // base64("admin:hunter2")
        assert_eq!(
            endpoint().authorization_header().expose_secret(),
            "Basic YWRtaW46aHVudGVyMg=="
        );
    }

    #[test]
    fn debug_redacts_password() {
        let rendered = format!("{:?}", endpoint());
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("****"));
    }
}
