//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use camect_config::ConfigError;
use camect_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to hub at {url}")]
    #[diagnostic(
        code(camect::connection_failed),
        help(
            "Check that the hub is powered on and reachable on the local network.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(camect::auth_failed),
        help(
            "The hub rejected the username or password.\n\
             Accept the terms of use at https://local.home.camect.com first,\n\
             then run: camect config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("No password configured for hub '{hub}'")]
    #[diagnostic(
        code(camect::no_credentials),
        help(
            "Store one with: camect config set-password --for {hub}\n\
             Or set the CAMECT_PASSWORD environment variable."
        )
    )]
    NoCredentials { hub: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(camect::not_found),
        help("Run: camect {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Camera '{camera}' is disabled")]
    #[diagnostic(
        code(camect::camera_disabled),
        help("Enable the camera in the Camect app before requesting snapshots.")
    )]
    CameraDisabled { camera: String },

    #[error("No snapshot available for camera '{camera}'")]
    #[diagnostic(
        code(camect::snapshot_unavailable),
        help("The camera may be offline. Re-run with -v for details.")
    )]
    SnapshotUnavailable { camera: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("Hub rejected the request (HTTP {status}): {message}")]
    #[diagnostic(code(camect::api_error))]
    ApiError { status: u16, message: String },

    #[error("Unexpected hub response: {message}")]
    #[diagnostic(
        code(camect::protocol),
        help("The hub firmware may be newer than this client. Re-run with -vv for details.")
    )]
    Protocol { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(camect::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Hub '{name}' not found in configuration")]
    #[diagnostic(
        code(camect::hub_not_found),
        help(
            "Available hubs: {available}\n\
             Create one with: camect config init"
        )
    )]
    HubNotFound { name: String, available: String },

    #[error("No hub configured")]
    #[diagnostic(
        code(camect::no_config),
        help(
            "Create a profile with: camect config init\n\
             Or pass --address for a one-off command.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(camect::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────

    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(camect::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(camect::timeout),
        help("Increase timeout with --timeout or check hub responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    #[diagnostic(code(camect::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::HubNotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::HubNotFound { hub_id } => CliError::HubNotFound {
                name: hub_id,
                available: "see `camect config hubs`".into(),
            },

            CoreError::CameraNotFound { hub_id: _, camera } => CliError::NotFound {
                resource_type: "camera".into(),
                identifier: camera,
                list_command: "cameras".into(),
            },

            CoreError::CameraDisabled { camera } => CliError::CameraDisabled { camera },

            CoreError::SnapshotUnavailable { camera } => CliError::SnapshotUnavailable { camera },

            CoreError::Rejected { status, message } => CliError::ApiError { status, message },

            CoreError::Protocol { message } => CliError::Protocol { message },

            CoreError::Config { message } => CliError::Config { message },

            CoreError::SessionStopped { hub_id } => CliError::Config {
                message: format!("session for hub '{hub_id}' was already stopped"),
            },

            CoreError::Internal(message) => CliError::Protocol { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { hub } => CliError::NoCredentials { hub },
            ConfigError::UnknownHub { hub } => CliError::HubNotFound {
                name: hub,
                available: "see `camect config hubs`".into(),
            },
            ConfigError::NoHub => CliError::NoConfig {
                path: camect_config::config_path().display().to_string(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_maps_to_auth_exit_code() {
        let err = CliError::from(CoreError::AuthenticationFailed {
            message: "bad password".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn missing_camera_points_at_listing() {
        let err = CliError::from(CoreError::CameraNotFound {
            hub_id: "home".into(),
            camera: "Porch".into(),
        });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        assert!(matches!(err, CliError::NotFound { ref list_command, .. } if list_command == "cameras"));
    }

    #[test]
    fn config_validation_is_usage_error() {
        let err = CliError::from(ConfigError::Validation {
            field: "scheme".into(),
            reason: "ftp".into(),
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }

    #[test]
    fn timeouts_and_connection_failures_have_distinct_codes() {
        assert_eq!(
            CliError::from(CoreError::Timeout { timeout_secs: 3 }).exit_code(),
            exit_code::TIMEOUT
        );
        assert_eq!(
            CliError::from(CoreError::ConnectionFailed {
                url: "https://hub/".into(),
                reason: "refused".into(),
            })
            .exit_code(),
            exit_code::CONNECTION
        );
    }
}
