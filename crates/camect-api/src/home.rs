// Hub-level endpoints
//
// Home metadata and operation mode.

use tracing::debug;

use crate::client::HubClient;
use crate::error::Error;
use crate::models::HomeInfo;

impl HubClient {
    /// Get hub metadata.
    ///
    /// `GET /api/GetHomeInfo`
    pub async fn get_info(&self) -> Result<HomeInfo, Error> {
        debug!("fetching home info");
        self.get("GetHomeInfo", &[]).await
    }

    /// Switch the hub's operation mode. Echoes `mode` on success.
    ///
    /// `GET /api/SetOperationMode?Mode={mode}`
    pub async fn set_mode(&self, mode: &str) -> Result<String, Error> {
        debug!(mode, "setting operation mode");
        self.get_unit("SetOperationMode", &[("Mode".into(), mode.into())])
            .await?;
        Ok(mode.to_owned())
    }
}
