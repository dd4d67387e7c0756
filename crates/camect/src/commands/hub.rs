//! Hub-level command handlers: info, mode, dump.

use std::sync::Arc;

use camect_config::Config;
use camect_core::{HomeInfo, HubRegistry, Session};

use crate::cli::{DumpArgs, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

fn info_detail(info: &HomeInfo) -> String {
    output::detail_lines(&[
        ("ID", info.id.clone()),
        ("Name", info.name.clone()),
        ("Mode", info.mode.clone()),
        (
            "Local URL",
            info.local_https_url.clone().unwrap_or_default(),
        ),
        ("Cloud URL", info.cloud_url.clone().unwrap_or_default()),
        ("Objects", info.object_name.join(", ")),
    ])
}

pub async fn info(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let session = util::open_session(global, cfg)?;
    let info = session.get_info().await?;
    let out = output::render_single(&global.output, &info, info_detail, |i| i.id.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn set_mode(cfg: &Config, global: &GlobalOpts, mode: &str) -> Result<(), CliError> {
    let session = util::open_session(global, cfg)?;
    let mode = session.set_mode(mode).await?;
    if !global.quiet {
        eprintln!("✓ Hub '{}' switched to {mode}", session.hub_id());
    }
    Ok(())
}

/// Refresh every requested hub, then print the cached state as one
/// document keyed by hub id.
pub async fn dump(cfg: &Config, args: DumpArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let registry = HubRegistry::new();
    if args.all {
        for name in config::all_hub_names(cfg)? {
            let session_config = config::session_config(global, cfg, Some(&name))?;
            registry.insert(Session::new(session_config, Arc::new(util::LogDelegate))?);
        }
    } else {
        registry.insert(util::open_session(global, cfg)?);
    }

    for hub_id in registry.hub_ids() {
        if let Err(e) = registry.refresh(&hub_id).await {
            if !args.all {
                return Err(e.into());
            }
            tracing::warn!(hub = %hub_id, error = %e, "skipping unreachable hub");
        }
    }

    let dump = registry.dump();
    let out = match global.output {
        OutputFormat::Yaml => output::render_yaml(&dump),
        OutputFormat::JsonCompact => output::render_json_compact(&dump),
        _ => output::render_json_pretty(&dump),
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
