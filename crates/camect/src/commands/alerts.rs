//! Alert suppression handlers.

use camect_config::Config;

use crate::cli::{AlertTarget, AlertsArgs, AlertsCommand, GlobalOpts};
use crate::error::CliError;

use super::util;

pub async fn handle(cfg: &Config, args: AlertsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (registry, hub_id) = util::single_hub_registry(global, cfg)?;

    let (target, enable) = match args.command {
        AlertsCommand::Disable(target) => (target, false),
        AlertsCommand::Enable(target) => (target, true),
    };
    let AlertTarget { camera, reason } = target;

    if camera.is_empty()
        && !enable
        && !util::confirm(
            &format!("Disable alerts for every camera on '{hub_id}'?"),
            global.yes,
        )?
    {
        return Ok(());
    }

    let ids = util::resolve_camera_ids(&registry, &hub_id, &camera).await?;
    let session = registry.session(&hub_id)?;
    if enable {
        session.enable_alert(&ids, &reason).await?;
    } else {
        session.disable_alert(&ids, &reason).await?;
    }

    if !global.quiet {
        let scope = if ids.is_empty() {
            "all cameras".to_owned()
        } else {
            ids.join(", ")
        };
        let verb = if enable { "enabled" } else { "disabled" };
        eprintln!("✓ Alerts {verb} for {scope} (reason: {reason})");
    }
    Ok(())
}
