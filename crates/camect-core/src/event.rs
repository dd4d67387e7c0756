// ── Hub events ──
//
// Typed view over the JSON payloads the event stream delivers. Sessions
// pass payloads through untouched; hosts that want structure decode them
// here.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::CoreError;

/// The `type` field of a hub event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Object detection alert (`desc`, `cam_id`, `detected_obj`, `url`).
    Alert,
    /// Operation mode change; `desc` carries the new mode.
    Mode,
    CameraOnline,
    CameraOffline,
    AlertEnabled,
    AlertDisabled,
    /// Any type this crate does not know yet.
    Other(String),
}

impl EventKind {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "alert" => Self::Alert,
            "mode" => Self::Mode,
            "camera_online" => Self::CameraOnline,
            "camera_offline" => Self::CameraOffline,
            "alert_enabled" => Self::AlertEnabled,
            "alert_disabled" => Self::AlertDisabled,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Alert => "alert",
            Self::Mode => "mode",
            Self::CameraOnline => "camera_online",
            Self::CameraOffline => "camera_offline",
            Self::AlertEnabled => "alert_enabled",
            Self::AlertDisabled => "alert_disabled",
            Self::Other(other) => other,
        }
    }

    /// Camera availability changes.
    pub fn is_camera_status(&self) -> bool {
        matches!(self, Self::CameraOnline | Self::CameraOffline)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A decoded event-stream payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HubEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub desc: Option<String>,
    pub cam_id: Option<String>,
    pub cam_name: Option<String>,
    pub detected_obj: Vec<String>,
    pub url: Option<String>,
    /// Local receive time.
    pub received_at: DateTime<Utc>,
    /// The full payload, including fields not modelled above.
    #[serde(skip)]
    pub raw: serde_json::Value,
}

#[derive(Deserialize)]
struct WireEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    desc: Option<String>,
    #[serde(default)]
    cam_id: Option<String>,
    #[serde(default)]
    cam_name: Option<String>,
    #[serde(default)]
    detected_obj: Vec<String>,
    #[serde(default)]
    url: Option<String>,
}

impl HubEvent {
    /// Decode a payload. Anything that is not a JSON object with a string
    /// `type` is a [`CoreError::Protocol`].
    pub fn parse(payload: &str) -> Result<Self, CoreError> {
        let raw: serde_json::Value =
            serde_json::from_str(payload).map_err(|e| CoreError::Protocol {
                message: format!("event is not valid JSON: {e}"),
            })?;
        let wire: WireEvent =
            serde_json::from_value(raw.clone()).map_err(|e| CoreError::Protocol {
                message: format!("unexpected event shape: {e}"),
            })?;

        Ok(Self {
            kind: EventKind::from_wire(&wire.kind),
            desc: wire.desc,
            cam_id: wire.cam_id,
            cam_name: wire.cam_name,
            detected_obj: wire.detected_obj,
            url: wire.url,
            received_at: Utc::now(),
            raw,
        })
    }

    /// Detected object classes joined by single spaces, e.g. `"person car"`.
    pub fn detected_text(&self) -> String {
        self.detected_obj.join(" ")
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        match (&self.kind, &self.cam_name, &self.desc) {
            (EventKind::Mode, _, Some(mode)) => format!("mode changed to {mode}"),
            (EventKind::Alert, _, Some(desc)) => desc.clone(),
            (kind, Some(cam), _) => format!("{kind}: {cam}"),
            (kind, None, Some(desc)) => format!("{kind}: {desc}"),
            (kind, None, None) => kind.to_string(),
        }
    }
}
