// ── Hub registry ──
//
// Host-owned map of sessions keyed by hub id, with the hub metadata and
// camera list cached from the last refresh. Lives outside `Session` so a
// session never carries host bookkeeping.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use camect_api::{Camera, HomeInfo};

use crate::error::CoreError;
use crate::session::Session;

/// Cached view of one hub, as of `refreshed_at`.
#[derive(Debug, Clone, Serialize)]
pub struct HubState {
    pub info: HomeInfo,
    pub cameras: Vec<Camera>,
    pub refreshed_at: DateTime<Utc>,
}

impl HubState {
    /// Find a camera by id, falling back to a case-insensitive name match.
    pub fn camera(&self, key: &str) -> Option<&Camera> {
        self.cameras
            .iter()
            .find(|c| c.id == key)
            .or_else(|| self.cameras.iter().find(|c| c.name.eq_ignore_ascii_case(key)))
    }
}

struct HubEntry {
    session: Session,
    state: Option<HubState>,
}

/// Sessions for every hub the host manages.
#[derive(Default)]
pub struct HubRegistry {
    hubs: DashMap<String, HubEntry>,
}

impl HubRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session under its hub id. Returns the session it replaced.
    pub fn insert(&self, session: Session) -> Option<Session> {
        let hub_id = session.hub_id().to_owned();
        self.hubs
            .insert(hub_id, HubEntry { session, state: None })
            .map(|old| old.session)
    }

    /// Forget a hub. The caller is responsible for stopping the session.
    pub fn remove(&self, hub_id: &str) -> Option<Session> {
        self.hubs.remove(hub_id).map(|(_, entry)| entry.session)
    }

    pub fn session(&self, hub_id: &str) -> Result<Session, CoreError> {
        self.hubs
            .get(hub_id)
            .map(|entry| entry.session.clone())
            .ok_or_else(|| CoreError::HubNotFound {
                hub_id: hub_id.to_owned(),
            })
    }

    /// Registered hub ids, sorted.
    pub fn hub_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.hubs.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.hubs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hubs.is_empty()
    }

    // ── Cache ────────────────────────────────────────────────────────

    /// Re-read hub metadata and cameras and cache them.
    pub async fn refresh(&self, hub_id: &str) -> Result<HubState, CoreError> {
        let session = self.session(hub_id)?;
        let (info, cameras) = tokio::try_join!(session.get_info(), session.list_cameras())?;
        debug!(hub = %hub_id, cameras = cameras.len(), "hub refreshed");

        let state = HubState {
            info,
            cameras,
            refreshed_at: Utc::now(),
        };
        if let Some(mut entry) = self.hubs.get_mut(hub_id) {
            entry.state = Some(state.clone());
        }
        Ok(state)
    }

    /// Cached state, refreshing first if the hub was never read.
    pub async fn state(&self, hub_id: &str) -> Result<HubState, CoreError> {
        let cached = self
            .hubs
            .get(hub_id)
            .ok_or_else(|| CoreError::HubNotFound {
                hub_id: hub_id.to_owned(),
            })?
            .state
            .clone();
        match cached {
            Some(state) => Ok(state),
            None => self.refresh(hub_id).await,
        }
    }

    /// Look up a camera by id or name.
    pub async fn camera(&self, hub_id: &str, camera: &str) -> Result<Camera, CoreError> {
        let state = self.state(hub_id).await?;
        state
            .camera(camera)
            .cloned()
            .ok_or_else(|| CoreError::CameraNotFound {
                hub_id: hub_id.to_owned(),
                camera: camera.to_owned(),
            })
    }

    /// Snapshot a camera at its native resolution.
    ///
    /// Disabled cameras are refused without a request.
    pub async fn snapshot(&self, hub_id: &str, camera: &str) -> Result<Vec<u8>, CoreError> {
        let camera = self.camera(hub_id, camera).await?;
        if camera.disabled {
            return Err(CoreError::CameraDisabled { camera: camera.name });
        }
        let session = self.session(hub_id)?;
        session
            .snapshot_camera(&camera.id, camera.width, camera.height)
            .await
            .ok_or(CoreError::SnapshotUnavailable { camera: camera.id })
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Start every registered session. Returns the hubs that refused.
    pub async fn start_all(&self) -> Vec<(String, CoreError)> {
        let sessions = self.sessions();
        let results = join_all(sessions.iter().map(|s| s.start())).await;
        sessions
            .iter()
            .zip(results)
            .filter_map(|(session, result)| {
                result.err().map(|e| {
                    warn!(hub = %session.hub_id(), error = %e, "session did not start");
                    (session.hub_id().to_owned(), e)
                })
            })
            .collect()
    }

    /// Stop every registered session and wait for all of them.
    pub async fn stop_all(&self) {
        let sessions = self.sessions();
        join_all(sessions.iter().map(|s| s.stop())).await;
    }

    fn sessions(&self) -> Vec<Session> {
        self.hubs.iter().map(|e| e.session.clone()).collect()
    }

    /// JSON dump of every cached hub, keyed by hub id. Hubs never
    /// refreshed appear as `null`.
    pub fn dump(&self) -> serde_json::Value {
        let map: BTreeMap<String, Option<HubState>> = self
            .hubs
            .iter()
            .map(|e| (e.key().clone(), e.state.clone()))
            .collect();
        serde_json::to_value(map).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use camect_api::HubEndpoint;
    use secrecy::SecretString;

    use super::*;
    use crate::config::SessionConfig;
    use crate::delegate::ChannelDelegate;

    fn session(hub_id: &str) -> Session {
        let endpoint = HubEndpoint::new("127.0.0.1", 1, "admin", SecretString::from("pw".to_string()));
        let (delegate, _rx) = ChannelDelegate::new();
        Session::new(SessionConfig::new(hub_id, endpoint), Arc::new(delegate)).unwrap()
    }

    fn camera(id: &str, name: &str) -> Camera {
        serde_json::from_value(serde_json::json!({ "id": id, "name": name })).unwrap()
    }

    #[test]
    fn insert_lookup_remove() {
        let registry = HubRegistry::new();
        assert!(registry.insert(session("b")).is_none());
        assert!(registry.insert(session("a")).is_none());
        assert!(registry.insert(session("a")).is_some());

        assert_eq!(registry.hub_ids(), vec!["a", "b"]);
        assert_eq!(registry.session("a").unwrap().hub_id(), "a");
        assert!(matches!(
            registry.session("zzz"),
            Err(CoreError::HubNotFound { .. })
        ));

        assert!(registry.remove("a").is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn state_camera_lookup_by_id_then_name() {
        let state = HubState {
            info: serde_json::from_value(serde_json::json!({ "id": "hub" })).unwrap(),
            cameras: vec![camera("c1", "Porch"), camera("c2", "Yard")],
            refreshed_at: Utc::now(),
        };
        assert_eq!(state.camera("c2").unwrap().name, "Yard");
        assert_eq!(state.camera("porch").unwrap().id, "c1");
        assert!(state.camera("garage").is_none());
    }

    #[test]
    fn dump_lists_unrefreshed_hubs_as_null() {
        let registry = HubRegistry::new();
        registry.insert(session("garage"));
        let dump = registry.dump();
        assert!(dump["garage"].is_null());
    }

    #[tokio::test]
    async fn stop_all_stops_idle_sessions() {
        let registry = HubRegistry::new();
        registry.insert(session("a"));
        registry.stop_all().await;
        assert_eq!(
            registry.session("a").unwrap().state(),
            camect_api::ConnectionState::Stopped
        );
    }
}
