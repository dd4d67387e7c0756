//! `camect watch`: supervise one or more hubs and print their events.
//!
//! Every hub gets its own session; all of them report into a single
//! channel so output from different hubs interleaves in arrival order.

use std::sync::Arc;

use tokio::sync::mpsc;

use camect_config::Config;
use camect_core::{
    CameraTransition, ChannelDelegate, EventRule, HubEvent, HubNotification, HubRegistry,
    HubStatus, RuleKind, Session,
};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs, WatchKind};
use crate::config;
use crate::error::CliError;
use crate::output::{self, Painter};

/// Build the single filter rule described by the watch flags.
fn rule_from_args(args: &WatchArgs) -> EventRule {
    let kind = match args.kind {
        WatchKind::All => RuleKind::All,
        WatchKind::Alert => RuleKind::Alert,
        WatchKind::Mode => RuleKind::Mode,
        WatchKind::Camera => RuleKind::Camera(CameraTransition::Either),
    };
    let mut rule = EventRule::new("watch", kind).objects(args.objects.iter().cloned());
    if let Some(ref camera) = args.camera {
        rule = rule.on_camera(camera.clone());
    }
    rule
}

fn hub_names(cfg: &Config, args: &WatchArgs) -> Result<Vec<Option<String>>, CliError> {
    if args.all {
        return Ok(config::all_hub_names(cfg)?.into_iter().map(Some).collect());
    }
    if args.hubs.is_empty() {
        return Ok(vec![None]);
    }
    Ok(args.hubs.iter().cloned().map(Some).collect())
}

pub async fn handle(cfg: &Config, args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (delegate, rx) = ChannelDelegate::new();
    let delegate = Arc::new(delegate);

    let registry = HubRegistry::new();
    for name in hub_names(cfg, &args)? {
        let session_config = config::session_config(global, cfg, name.as_deref())?;
        registry.insert(Session::new(session_config, Arc::<ChannelDelegate>::clone(&delegate))?);
    }
    drop(delegate);

    let failed = registry.start_all().await;
    if failed.len() == registry.len() {
        if let Some((_, err)) = failed.into_iter().next() {
            return Err(err.into());
        }
    }

    let printer = EventPrinter {
        rule: rule_from_args(&args),
        painter: Painter::new(output::should_color(&global.color)),
        format: global.output.clone(),
        raw: args.raw,
        quiet: global.quiet,
    };

    let result = pump(rx, &printer, args.count).await;
    registry.stop_all().await;
    result
}

/// Read notifications until Ctrl-C, the channel closes, or `limit`
/// matching events have been printed.
async fn pump(
    mut rx: mpsc::UnboundedReceiver<HubNotification>,
    printer: &EventPrinter,
    limit: Option<usize>,
) -> Result<(), CliError> {
    let mut printed = 0usize;
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal?;
                tracing::debug!("interrupted, stopping sessions");
                return Ok(());
            }
            notification = rx.recv() => {
                let Some(notification) = notification else {
                    return Ok(());
                };
                if printer.handle(notification) {
                    printed += 1;
                    if limit.is_some_and(|n| printed >= n) {
                        return Ok(());
                    }
                }
            }
        }
    }
}

struct EventPrinter {
    rule: EventRule,
    painter: Painter,
    format: OutputFormat,
    raw: bool,
    quiet: bool,
}

impl EventPrinter {
    /// Print one notification. Returns `true` when an event passed the
    /// filter and was printed.
    fn handle(&self, notification: HubNotification) -> bool {
        match notification {
            HubNotification::Status { hub_id, status } => {
                if !self.quiet {
                    eprintln!("{}", self.status_line(&hub_id, status));
                }
                false
            }
            HubNotification::Error { hub_id, detail } => {
                if !self.quiet {
                    eprintln!(
                        "{} {}",
                        self.painter.muted(&format!("[{hub_id}]")),
                        self.painter.warning(&detail)
                    );
                }
                false
            }
            HubNotification::Message { hub_id, payload } => self.event(&hub_id, &payload),
        }
    }

    fn status_line(&self, hub_id: &str, status: HubStatus) -> String {
        let label = status.to_string();
        let label = match status {
            HubStatus::Connected => self.painter.success(&label),
            HubStatus::Error => self.painter.error(&label),
            HubStatus::Disconnected => self.painter.warning(&label),
            HubStatus::Started | HubStatus::Stopped => self.painter.muted(&label),
        };
        format!("{} {label}", self.painter.muted(&format!("[{hub_id}]")))
    }

    fn event(&self, hub_id: &str, payload: &str) -> bool {
        let event = match HubEvent::parse(payload) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(hub = %hub_id, error = %e, "skipping undecodable event");
                return false;
            }
        };
        if !self.rule.matches(hub_id, &event) {
            return false;
        }
        println!("{}", self.render(hub_id, payload, &event));
        true
    }

    fn render(&self, hub_id: &str, payload: &str, event: &HubEvent) -> String {
        if self.raw {
            return payload.to_owned();
        }
        match self.format {
            OutputFormat::Json | OutputFormat::JsonCompact => {
                output::render_json_compact(&serde_json::json!({ "hub": hub_id, "event": event }))
            }
            OutputFormat::Yaml => {
                output::render_yaml(&serde_json::json!({ "hub": hub_id, "event": event }))
            }
            OutputFormat::Plain => format!("{hub_id}\t{}\t{}", event.kind, event.summary()),
            OutputFormat::Table => format!(
                "{} {} {} {}",
                self.painter
                    .muted(&event.received_at.format("%H:%M:%S").to_string()),
                self.painter.muted(&format!("[{hub_id}]")),
                self.painter.value(event.kind.as_str()),
                event.summary()
            ),
        }
    }
}
