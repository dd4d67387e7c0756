//! Camera command handlers: list, snapshot, PTZ.

use std::io::Write;
use std::path::PathBuf;

use tabled::Tabled;

use camect_config::Config;
use camect_core::Camera;

use crate::cli::{GlobalOpts, SnapshotArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CameraRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Make")]
    make: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Resolution")]
    resolution: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
}

impl From<&Camera> for CameraRow {
    fn from(c: &Camera) -> Self {
        Self {
            id: c.id.clone(),
            name: c.name.clone(),
            make: c.make.clone().unwrap_or_default(),
            model: c.model.clone().unwrap_or_default(),
            resolution: format!("{}x{}", c.width, c.height),
            enabled: if c.disabled { "no" } else { "yes" }.into(),
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn list(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let session = util::open_session(global, cfg)?;
    let cameras = session.list_cameras().await?;
    let out = output::render_list(&global.output, &cameras, |c| CameraRow::from(c), |c| c.id.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn snapshot(cfg: &Config, args: SnapshotArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (registry, hub_id) = util::single_hub_registry(global, cfg)?;

    let camera = registry.camera(&hub_id, &args.camera).await?;

    let jpeg = match (args.width, args.height) {
        (Some(width), Some(height)) => {
            if camera.disabled {
                return Err(CliError::CameraDisabled { camera: camera.name });
            }
            registry
                .session(&hub_id)?
                .snapshot_camera(&camera.id, width, height)
                .await
                .ok_or_else(|| CliError::SnapshotUnavailable {
                    camera: camera.id.clone(),
                })?
        }
        _ => registry.snapshot(&hub_id, &camera.id).await?,
    };

    let path = args
        .file
        .unwrap_or_else(|| PathBuf::from(format!("snapshot-{}.jpg", camera.id)));

    if path.as_os_str() == "-" {
        std::io::stdout().lock().write_all(&jpeg)?;
        return Ok(());
    }

    std::fs::write(&path, &jpeg)?;
    if !global.quiet {
        eprintln!("✓ Saved {} bytes to {}", jpeg.len(), path.display());
    }
    Ok(())
}

pub async fn ptz(cfg: &Config, global: &GlobalOpts, camera: &str, action: &str) -> Result<(), CliError> {
    let (registry, hub_id) = util::single_hub_registry(global, cfg)?;
    let camera = registry.camera(&hub_id, camera).await?;
    registry.session(&hub_id)?.ptz(&camera.id, action).await?;
    if !global.quiet {
        eprintln!("✓ Sent '{action}' to {}", camera.name);
    }
    Ok(())
}
