// Camera endpoints
//
// Listing, still snapshots and pan-tilt-zoom.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, warn};

use crate::client::HubClient;
use crate::error::Error;
use crate::models::{Camera, CameraList, SnapshotPayload};

impl HubClient {
    /// List every camera attached to the hub.
    ///
    /// `GET /api/ListCameras`
    pub async fn list_cameras(&self) -> Result<Vec<Camera>, Error> {
        debug!("listing cameras");
        let list: CameraList = self.get("ListCameras", &[]).await?;
        Ok(list.camera)
    }

    /// Grab a JPEG still from a camera.
    ///
    /// `GET /api/SnapshotCamera?CamId={id}&Width={w}&Height={h}`
    ///
    /// A width/height of `0` lets the hub pick the native resolution.
    /// Snapshot failures are routine and never fatal to the caller, so
    /// every failure kind collapses to `None` after being logged.
    pub async fn snapshot_camera(&self, camera_id: &str, width: u32, height: u32) -> Option<Vec<u8>> {
        match self.try_snapshot_camera(camera_id, width, height).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(camera_id, error = %e, "snapshot failed");
                None
            }
        }
    }

    /// Fallible form of [`snapshot_camera`](Self::snapshot_camera).
    pub async fn try_snapshot_camera(
        &self,
        camera_id: &str,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, Error> {
        debug!(camera_id, width, height, "requesting snapshot");
        let params = [
            ("CamId".to_owned(), camera_id.to_owned()),
            ("Width".to_owned(), width.to_string()),
            ("Height".to_owned(), height.to_string()),
        ];
        let payload: SnapshotPayload = self.get("SnapshotCamera", &params).await?;
        STANDARD
            .decode(payload.jpeg_data.as_bytes())
            .map_err(|e| Error::Protocol(format!("jpeg_data is not valid base64: {e}")))
    }

    /// Send a pan-tilt-zoom action (e.g. `"left"`, `"zoom_in"`) to a camera.
    ///
    /// `GET /api/PTZ?CamId={id}&Action={action}`
    pub async fn ptz(&self, camera_id: &str, action: &str) -> Result<(), Error> {
        debug!(camera_id, action, "sending PTZ action");
        let params = [
            ("CamId".to_owned(), camera_id.to_owned()),
            ("Action".to_owned(), action.to_owned()),
        ];
        self.get_unit("PTZ", &params).await
    }
}
