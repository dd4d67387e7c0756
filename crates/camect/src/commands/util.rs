//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::sync::Arc;

use camect_config::Config;
use camect_core::{HubRegistry, HubStatus, Session, SessionDelegate};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;

/// Delegate for one-shot commands: no stream runs, so anything reported
/// only goes to the log.
pub struct LogDelegate;

impl SessionDelegate for LogDelegate {
    fn on_status(&self, hub_id: &str, status: HubStatus) {
        tracing::debug!(hub = %hub_id, %status, "hub status");
    }

    fn on_error(&self, hub_id: &str, detail: &str) {
        tracing::warn!(hub = %hub_id, detail, "hub error");
    }

    fn on_message(&self, hub_id: &str, payload: String) {
        tracing::trace!(hub = %hub_id, %payload, "hub event");
    }
}

/// Open a session for the selected hub. Does not start the event stream.
pub fn open_session(global: &GlobalOpts, cfg: &Config) -> Result<Session, CliError> {
    let session_config = config::session_config(global, cfg, None)?;
    Ok(Session::new(session_config, Arc::new(LogDelegate))?)
}

/// Registry holding a single session for the selected hub.
pub fn single_hub_registry(global: &GlobalOpts, cfg: &Config) -> Result<(HubRegistry, String), CliError> {
    let session = open_session(global, cfg)?;
    let hub_id = session.hub_id().to_owned();
    let registry = HubRegistry::new();
    registry.insert(session);
    Ok((registry, hub_id))
}

/// Resolve camera ids or names to ids using the hub's camera list.
pub async fn resolve_camera_ids(
    registry: &HubRegistry,
    hub_id: &str,
    cameras: &[String],
) -> Result<Vec<String>, CliError> {
    let mut ids = Vec::with_capacity(cameras.len());
    for camera in cameras {
        ids.push(registry.camera(hub_id, camera).await?.id);
    }
    Ok(ids)
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(std::io::Error::other)?;
    Ok(confirmed)
}
