// Hub REST client
//
// Wraps `reqwest::Client` with hub URL construction, Basic auth, status
// normalization and error-body parsing. Endpoint groups (home, cameras,
// alerts) are implemented as inherent methods in separate files so this
// module stays focused on transport mechanics.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::HubEndpoint;
use crate::error::Error;
use crate::models::ErrorBody;
use crate::transport::TransportConfig;

/// Raw HTTP client for a hub's command API.
///
/// Stateless apart from the pre-built connection pool: every call is a
/// single authenticated `GET` bounded by the transport timeout.
#[derive(Clone)]
pub struct HubClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl HubClient {
    /// Create a client for `endpoint` using `transport` settings.
    pub fn new(endpoint: &HubEndpoint, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client(&endpoint.authorization_header())?;
        Ok(Self {
            http,
            base_url: endpoint.api_base()?,
            timeout: transport.timeout,
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    ///
    /// The caller is responsible for attaching authorization.
    pub fn with_client(http: reqwest::Client, base_url: Url, timeout: Duration) -> Self {
        Self {
            http,
            base_url,
            timeout,
        }
    }

    /// The API root, e.g. `https://192.168.1.20/api/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Per-request deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build the URL for a named API call: `{base}/api/{name}`.
    pub(crate) fn api_url(&self, name: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(name)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET with query parameters and deserialize the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        name: &str,
        params: &[(String, String)],
    ) -> Result<T, Error> {
        let body = self.get_text(name, params).await?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    /// Send a GET and discard the body after checking the status.
    pub(crate) async fn get_unit(
        &self,
        name: &str,
        params: &[(String, String)],
    ) -> Result<(), Error> {
        self.get_text(name, params).await.map(drop)
    }

    async fn get_text(&self, name: &str, params: &[(String, String)]) -> Result<String, Error> {
        let url = self.api_url(name)?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| Error::from_reqwest(e, self.timeout))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::from_reqwest(e, self.timeout))?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(remote_error(status.as_u16(), &body))
        }
    }
}

/// Build [`Error::Remote`] from a non-success answer, preferring the
/// hub's `err_msg` over the raw body.
fn remote_error(status: u16, body: &str) -> Error {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.err_msg)
        .unwrap_or_else(|| {
            if body.is_empty() {
                format!("HTTP {status}")
            } else {
                body.to_owned()
            }
        });
    Error::Remote { status, message }
}
