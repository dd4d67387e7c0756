// Alert suppression endpoints
//
// Both directions share the `EnableAlert` call; only the `Enable` flag
// differs. Suppression state lives on the hub, keyed by `Reason`.

use tracing::debug;

use crate::client::HubClient;
use crate::error::Error;

impl HubClient {
    /// Suppress alerts for the given cameras, or for the whole hub when
    /// `camera_ids` is empty.
    pub async fn disable_alert<S: AsRef<str>>(
        &self,
        camera_ids: &[S],
        reason: &str,
    ) -> Result<(), Error> {
        self.set_alert(camera_ids, false, reason).await
    }

    /// Undo a prior [`disable_alert`](Self::disable_alert).
    ///
    /// Has no effect unless alerts were disabled before, and `reason` must
    /// match the one passed to `disable_alert` for the hub to correlate them.
    pub async fn enable_alert<S: AsRef<str>>(
        &self,
        camera_ids: &[S],
        reason: &str,
    ) -> Result<(), Error> {
        self.set_alert(camera_ids, true, reason).await
    }

    /// `GET /api/EnableAlert?Reason={r}[&Enable=1][&CamId[0]=..&CamId[1]=..]`
    async fn set_alert<S: AsRef<str>>(
        &self,
        camera_ids: &[S],
        enable: bool,
        reason: &str,
    ) -> Result<(), Error> {
        debug!(enable, reason, cameras = camera_ids.len(), "updating alert state");
        self.get_unit("EnableAlert", &alert_params(camera_ids, enable, reason))
            .await
    }
}

/// Query parameters for `EnableAlert`.
pub(crate) fn alert_params<S: AsRef<str>>(
    camera_ids: &[S],
    enable: bool,
    reason: &str,
) -> Vec<(String, String)> {
    let mut params = vec![("Reason".to_owned(), reason.to_owned())];
    if enable {
        params.push(("Enable".to_owned(), "1".to_owned()));
    }
    params.extend(
        camera_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (format!("CamId[{i}]"), id.as_ref().to_owned())),
    );
    params
}
