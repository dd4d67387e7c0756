// ── Event rules ──
//
// Host-side trigger matching. A rule names the hub, camera and detected
// objects it cares about; the session itself never filters events.

use serde::{Deserialize, Serialize};

use crate::event::{EventKind, HubEvent};

/// Matches either anything or one specific id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    #[default]
    Any,
    Only(String),
}

impl Selector {
    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Self::Any => true,
            Self::Only(want) => value == Some(want.as_str()),
        }
    }
}

impl From<Option<String>> for Selector {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Any, Self::Only)
    }
}

/// Which detected objects an alert rule fires on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectFilter {
    #[default]
    Any,
    /// Fires when any listed name occurs as a substring of the space-joined
    /// `detected_obj` list, so `"car"` also matches `"carriage"`.
    AnyOf(Vec<String>),
}

impl ObjectFilter {
    pub fn matches(&self, event: &HubEvent) -> bool {
        match self {
            Self::Any => true,
            Self::AnyOf(objects) => {
                let detected = event.detected_text();
                objects.iter().any(|obj| detected.contains(obj.as_str()))
            }
        }
    }
}

/// Camera availability transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraTransition {
    Online,
    Offline,
    Either,
}

impl CameraTransition {
    fn matches(self, kind: &EventKind) -> bool {
        match self {
            Self::Online => *kind == EventKind::CameraOnline,
            Self::Offline => *kind == EventKind::CameraOffline,
            Self::Either => kind.is_camera_status(),
        }
    }
}

/// What family of event a rule listens for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Alert,
    Camera(CameraTransition),
    /// Mode changes are hub-wide; camera and object selectors are ignored.
    Mode,
    /// Every event, subject to the hub and camera selectors.
    All,
}

/// A named trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRule {
    pub name: String,
    pub kind: RuleKind,
    #[serde(default)]
    pub hub: Selector,
    #[serde(default)]
    pub camera: Selector,
    #[serde(default)]
    pub objects: ObjectFilter,
}

impl EventRule {
    pub fn new(name: impl Into<String>, kind: RuleKind) -> Self {
        Self {
            name: name.into(),
            kind,
            hub: Selector::Any,
            camera: Selector::Any,
            objects: ObjectFilter::Any,
        }
    }

    pub fn on_hub(mut self, hub_id: impl Into<String>) -> Self {
        self.hub = Selector::Only(hub_id.into());
        self
    }

    pub fn on_camera(mut self, camera_id: impl Into<String>) -> Self {
        self.camera = Selector::Only(camera_id.into());
        self
    }

    pub fn objects<I, S>(mut self, objects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let objects: Vec<String> = objects.into_iter().map(Into::into).collect();
        self.objects = if objects.is_empty() {
            ObjectFilter::Any
        } else {
            ObjectFilter::AnyOf(objects)
        };
        self
    }

    /// Whether `event`, received from `hub_id`, fires this rule.
    pub fn matches(&self, hub_id: &str, event: &HubEvent) -> bool {
        if !self.hub.matches(Some(hub_id)) {
            return false;
        }
        let camera = event.cam_id.as_deref();
        match &self.kind {
            RuleKind::Mode => event.kind == EventKind::Mode,
            RuleKind::Alert => {
                event.kind == EventKind::Alert
                    && self.camera.matches(camera)
                    && self.objects.matches(event)
            }
            RuleKind::Camera(transition) => {
                transition.matches(&event.kind) && self.camera.matches(camera)
            }
            RuleKind::All => self.camera.matches(camera),
        }
    }
}

/// Names of every rule in `rules` that `event` fires, in order.
pub fn matching<'a>(rules: &'a [EventRule], hub_id: &str, event: &HubEvent) -> Vec<&'a str> {
    rules
        .iter()
        .filter(|rule| rule.matches(hub_id, event))
        .map(|rule| rule.name.as_str())
        .collect()
}
