// Hub REST payloads
//
// The hub's JSON shapes are loosely versioned, so every record keeps the
// fields we rely on as typed members and captures the rest in `extra`.

use serde::{Deserialize, Serialize};

/// Hub metadata from `GetHomeInfo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeInfo {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Current operation mode, e.g. `"DEFAULT"` or `"HOME"`.
    #[serde(default)]
    pub mode: String,

    #[serde(default)]
    pub cloud_url: Option<String>,

    #[serde(default)]
    pub local_https_url: Option<String>,

    /// Object classes the hub's detector can report (`"person"`, `"car"`, ...).
    #[serde(default)]
    pub object_name: Vec<String>,

    /// All remaining fields the hub sends.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A camera attached to a hub, from `ListCameras`.
///
/// `id` uniquely identifies the camera within its hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub make: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub width: u32,

    #[serde(default)]
    pub height: u32,

    #[serde(default)]
    pub disabled: bool,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// `ListCameras` envelope: `{ "camera": [...] }`.
#[derive(Debug, Deserialize)]
pub(crate) struct CameraList {
    #[serde(default)]
    pub camera: Vec<Camera>,
}

/// `SnapshotCamera` envelope: `{ "jpeg_data": "<base64>" }`.
#[derive(Debug, Deserialize)]
pub(crate) struct SnapshotPayload {
    pub jpeg_data: String,
}

/// Error body the hub attaches to non-200 answers.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub err_msg: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn home_info_keeps_unknown_fields() {
        let json = serde_json::json!({
            "id": "hub-1",
            "name": "Garage",
            "mode": "DEFAULT",
            "cloud_url": "https://home.camect.com/home/hub-1",
            "local_https_url": "https://192.168.1.20/",
            "object_name": ["person", "car", "cat"],
            "firmware": "1.2.3"
        });

        let info: HomeInfo = serde_json::from_value(json).unwrap();
        assert_eq!(info.name, "Garage");
        assert_eq!(info.object_name, vec!["person", "car", "cat"]);
        assert_eq!(info.extra["firmware"], "1.2.3");
    }

    #[test]
    fn camera_defaults_missing_fields() {
        let cam: Camera = serde_json::from_str(r#"{"id":"c1","name":"Porch"}"#).unwrap();
        assert_eq!(cam.width, 0);
        assert!(!cam.disabled);
        assert!(cam.make.is_none());
    }

    #[test]
    fn camera_list_envelope() {
        let list: CameraList = serde_json::from_str(
            r#"{"camera":[{"id":"a","name":"A","width":1920,"height":1080,"disabled":true}]}"#,
        )
        .unwrap();
        assert_eq!(list.camera.len(), 1);
        assert!(list.camera[0].disabled);
        assert_eq!(list.camera[0].width, 1920);
    }
}
