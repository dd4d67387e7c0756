//! Clap derive structures for the `camect` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// camect -- supervise and control Camect hubs from the command line
#[derive(Debug, Parser)]
#[command(
    name = "camect",
    version,
    about = "Supervise and control Camect camera hubs from the command line",
    long_about = "Talks to Camect hubs over their local HTTPS API.\n\n\
        Runs one-shot commands (mode, snapshots, alerts, PTZ) and keeps a\n\
        self-healing event stream open with `camect watch`.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Hub profile to use
    #[arg(long = "hub", short = 'H', env = "CAMECT_HUB", global = true)]
    pub hub: Option<String>,

    /// Hub address (overrides profile)
    #[arg(long, short = 'a', env = "CAMECT_ADDRESS", global = true)]
    pub address: Option<String>,

    /// Hub port (overrides profile)
    #[arg(long, env = "CAMECT_PORT", global = true)]
    pub port: Option<u16>,

    /// Hub username (overrides profile)
    #[arg(long, short = 'u', env = "CAMECT_USERNAME", global = true)]
    pub username: Option<String>,

    /// Hub password (prefer the keyring or CAMECT_PASSWORD)
    #[arg(long, global = true, hide = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CAMECT_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "CAMECT_INSECURE", global = true)]
    pub insecure: bool,

    /// Talk plain http/ws instead of https/wss (local proxies)
    #[arg(long, global = true, hide = true)]
    pub http: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "CAMECT_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show hub metadata
    Info,

    /// List cameras attached to the hub
    #[command(alias = "cams")]
    Cameras,

    /// Switch the hub's operation mode (e.g. DEFAULT, HOME)
    Mode {
        /// New mode
        mode: String,
    },

    /// Save a JPEG snapshot from a camera
    #[command(alias = "snap")]
    Snapshot(SnapshotArgs),

    /// Enable or disable alerts
    Alerts(AlertsArgs),

    /// Send a pan-tilt-zoom action to a camera
    Ptz {
        /// Camera ID or name
        camera: String,

        /// Action understood by the hub (e.g. left, right, up, down, zoom_in)
        action: String,
    },

    /// Stream hub events until interrupted
    Watch(WatchArgs),

    /// Dump hub info and camera lists as JSON
    Dump(DumpArgs),

    /// Manage CLI configuration and hub profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SNAPSHOT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// Camera ID or name
    pub camera: String,

    /// Output file (default: snapshot-<camera id>.jpg, `-` for stdout)
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// Width in pixels (default: camera native)
    #[arg(long, requires = "height")]
    pub width: Option<u32>,

    /// Height in pixels (default: camera native)
    #[arg(long, requires = "width")]
    pub height: Option<u32>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ALERTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AlertsArgs {
    #[command(subcommand)]
    pub command: AlertsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AlertsCommand {
    /// Suppress alerts for cameras (or the whole hub)
    Disable(AlertTarget),

    /// Re-enable alerts suppressed with the same reason
    Enable(AlertTarget),
}

#[derive(Debug, Args)]
pub struct AlertTarget {
    /// Camera ID or name (repeatable; omit for the whole hub)
    #[arg(long, short = 'c')]
    pub camera: Vec<String>,

    /// Reason tag; enable must reuse the reason given to disable
    #[arg(long, short = 'r')]
    pub reason: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WATCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Hub profiles to watch (default: the selected hub)
    pub hubs: Vec<String>,

    /// Watch every configured hub
    #[arg(long, conflicts_with = "hubs")]
    pub all: bool,

    /// Only show events of this kind
    #[arg(long, short = 'K', default_value = "all")]
    pub kind: WatchKind,

    /// Only show events from this camera ID
    #[arg(long, short = 'c')]
    pub camera: Option<String>,

    /// Only show alerts that detected one of these objects (repeatable)
    #[arg(long = "object")]
    pub objects: Vec<String>,

    /// Print raw event payloads instead of decoded events
    #[arg(long)]
    pub raw: bool,

    /// Exit after this many events
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum WatchKind {
    /// Every event
    All,
    /// Object detection alerts
    Alert,
    /// Operation mode changes
    Mode,
    /// Cameras going online or offline
    Camera,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DUMP
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DumpArgs {
    /// Dump every configured hub
    #[arg(long)]
    pub all: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Set a value on the selected hub profile
    Set {
        /// Profile key (address, port, username, password_env, scheme, insecure, timeout, ca_cert)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured hubs
    Hubs,

    /// Set the default hub
    Use {
        /// Hub profile name
        name: String,
    },

    /// Store a hub password in the system keyring
    SetPassword {
        /// Hub profile name
        #[arg(long = "for")]
        hub: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
