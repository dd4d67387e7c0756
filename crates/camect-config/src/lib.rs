//! Shared configuration for camect tools.
//!
//! TOML hub profiles, password resolution (env + keyring + plaintext),
//! and translation to `camect_core::SessionConfig`. The CLI adds
//! flag-aware wrappers on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use camect_core::{HubEndpoint, ReconnectConfig, Scheme, SessionConfig, TlsMode, TransportConfig};

/// Keyring service name; entries are keyed `<hub>/password`.
pub const KEYRING_SERVICE: &str = "camect";

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "CAMECT_CONFIG";

/// Global password fallback when a profile names no variable of its own.
pub const PASSWORD_ENV: &str = "CAMECT_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for hub '{hub}'")]
    NoCredentials { hub: String },

    #[error("hub '{hub}' not found in config")]
    UnknownHub { hub: String },

    #[error("no hub selected and no default_hub configured")]
    NoHub,

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Hub used when none is given on the command line.
    pub default_hub: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named hub profiles.
    #[serde(default)]
    pub hubs: BTreeMap<String, HubProfile>,
}

impl Config {
    /// Pick a hub profile: the explicit name, else `default_hub`, else the
    /// only configured hub.
    pub fn select(&self, name: Option<&str>) -> Result<(&str, &HubProfile), ConfigError> {
        let name = match name.or(self.default_hub.as_deref()) {
            Some(name) => name,
            None if self.hubs.len() == 1 => self
                .hubs
                .keys()
                .next()
                .map(String::as_str)
                .ok_or(ConfigError::NoHub)?,
            None => return Err(ConfigError::NoHub),
        };
        self.hubs
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| ConfigError::UnknownHub { hub: name.into() })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Accept self-signed hub certificates.
    #[serde(default = "default_insecure")]
    pub insecure: bool,

    /// REST request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Event-stream heartbeat interval (seconds).
    #[serde(default = "default_heartbeat")]
    pub heartbeat: u64,

    /// Reconnect delay after the first failure (seconds).
    #[serde(default = "default_backoff_floor")]
    pub backoff_floor: u64,

    /// Added per consecutive failure (seconds).
    #[serde(default = "default_backoff_step")]
    pub backoff_step: u64,

    /// Reconnect delay cap (seconds).
    #[serde(default = "default_backoff_max")]
    pub backoff_max: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: default_insecure(),
            timeout: default_timeout(),
            heartbeat: default_heartbeat(),
            backoff_floor: default_backoff_floor(),
            backoff_step: default_backoff_step(),
            backoff_max: default_backoff_max(),
        }
    }
}

impl Defaults {
    pub fn reconnect(&self) -> ReconnectConfig {
        ReconnectConfig {
            floor: Duration::from_secs(self.backoff_floor),
            step: Duration::from_secs(self.backoff_step),
            max_delay: Duration::from_secs(self.backoff_max),
            heartbeat_interval: Duration::from_secs(self.heartbeat.max(1)),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_insecure() -> bool {
    true
}
fn default_timeout() -> u64 {
    10
}
fn default_heartbeat() -> u64 {
    5
}
fn default_backoff_floor() -> u64 {
    2
}
fn default_backoff_step() -> u64 {
    10
}
fn default_backoff_max() -> u64 {
    60
}

/// A named hub profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HubProfile {
    /// Hub address (IP or hostname, no scheme).
    pub address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_username")]
    pub username: String,

    /// Password in plaintext. Prefer the keyring or an env var.
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// "https" (default) or "http" for a local reverse proxy.
    pub scheme: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

impl HubProfile {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port: default_port(),
            username: default_username(),
            password: None,
            password_env: None,
            scheme: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
        }
    }
}

fn default_port() -> u16 {
    camect_core::DEFAULT_PORT
}
fn default_username() -> String {
    "admin".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `$CAMECT_CONFIG`, else the platform
/// config dir.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "camect", "camect").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("camect");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load defaults → TOML file at `path` → `CAMECT_` environment.
///
/// Nested keys use a double underscore, e.g. `CAMECT_DEFAULTS__TIMEOUT=30`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(
            Env::prefixed("CAMECT_")
                .ignore(&["CONFIG", "PASSWORD"])
                .split("__"),
        );

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(hub: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(KEYRING_SERVICE, &format!("{hub}/password"))?)
}

/// Store a hub password in the system keyring.
pub fn store_password(hub: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(hub)?.set_password(password)?;
    Ok(())
}

/// Resolve the hub password without CLI flags.
///
/// Order: the profile's `password_env` variable, `CAMECT_PASSWORD`, the
/// system keyring, then plaintext in the file.
pub fn resolve_password(profile: &HubProfile, hub: &str) -> Result<SecretString, ConfigError> {
    resolve_password_with(
        profile,
        hub,
        |name| std::env::var(name).ok(),
        |hub| keyring_entry(hub).ok()?.get_password().ok(),
    )
}

/// [`resolve_password`] with injectable environment and keyring lookups.
pub fn resolve_password_with(
    profile: &HubProfile,
    hub: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(val) = profile.password_env.as_deref().and_then(&env) {
        return Ok(SecretString::from(val));
    }

    // 2. Global env var
    if let Some(val) = env(PASSWORD_ENV) {
        return Ok(SecretString::from(val));
    }

    // 3. System keyring
    if let Some(pw) = keyring(hub) {
        return Ok(SecretString::from(pw));
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials { hub: hub.into() })
}

/// Parse the profile's `scheme` field.
pub fn resolve_scheme(profile: &HubProfile) -> Result<Scheme, ConfigError> {
    match profile.scheme.as_deref() {
        None | Some("https" | "wss") => Ok(Scheme::Secure),
        Some("http" | "ws") => Ok(Scheme::Plain),
        Some(other) => Err(ConfigError::Validation {
            field: "scheme".into(),
            reason: format!("expected 'https' or 'http', got '{other}'"),
        }),
    }
}

/// TLS policy from the profile, falling back to `defaults.insecure`.
pub fn resolve_tls(profile: &HubProfile, defaults: &Defaults) -> TlsMode {
    if profile.insecure == Some(true) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else if profile.insecure.unwrap_or(defaults.insecure) {
        // hubs ship self-signed certificates
        TlsMode::DangerAcceptInvalid
    } else {
        TlsMode::System
    }
}

/// Build a `SessionConfig` from a profile with no flag overrides.
pub fn profile_to_session_config(
    profile: &HubProfile,
    hub: &str,
    defaults: &Defaults,
) -> Result<SessionConfig, ConfigError> {
    let password = resolve_password(profile, hub)?;
    build_session_config(profile, hub, defaults, password)
}

/// Build a `SessionConfig` from a profile and an already-resolved password.
pub fn build_session_config(
    profile: &HubProfile,
    hub: &str,
    defaults: &Defaults,
    password: SecretString,
) -> Result<SessionConfig, ConfigError> {
    if profile.address.trim().is_empty() || profile.address.contains("://") {
        return Err(ConfigError::Validation {
            field: "address".into(),
            reason: format!("expected a host name or IP, got '{}'", profile.address),
        });
    }

    let endpoint = HubEndpoint::new(
        profile.address.clone(),
        profile.port,
        profile.username.clone(),
        password,
    )
    .with_scheme(resolve_scheme(profile)?);

    let timeout = profile.timeout.unwrap_or(defaults.timeout);
    if timeout == 0 {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let transport = TransportConfig {
        tls: resolve_tls(profile, defaults),
        timeout: Duration::from_secs(timeout),
    };

    Ok(SessionConfig::new(hub, endpoint)
        .with_transport(transport)
        .with_reconnect(defaults.reconnect()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    const SAMPLE: &str = r#"
default_hub = "garage"

[defaults]
timeout = 20
backoff_floor = 3

[hubs.garage]
address = "192.168.1.20"
password = "from-file"

[hubs.cabin]
address = "cabin.local"
port = 8443
username = "owner"
insecure = false
ca_cert = "/etc/camect/ca.pem"
timeout = 5
"#;

    fn sample() -> Config {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        load_config_from(&path).unwrap()
    }

    #[test]
    fn loads_profiles_with_defaults() {
        let cfg = sample();
        assert_eq!(cfg.default_hub.as_deref(), Some("garage"));
        assert_eq!(cfg.defaults.timeout, 20);
        assert_eq!(cfg.defaults.backoff_floor, 3);
        assert_eq!(cfg.defaults.backoff_max, 60);
        assert!(cfg.defaults.insecure);

        let garage = &cfg.hubs["garage"];
        assert_eq!(garage.port, 443);
        assert_eq!(garage.username, "admin");
        assert_eq!(cfg.hubs["cabin"].port, 8443);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert!(cfg.hubs.is_empty());
        assert_eq!(cfg.defaults.output, "table");
    }

    #[test]
    fn save_then_load_keeps_hubs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");
        let mut cfg = Config::default();
        cfg.hubs.insert("attic".into(), HubProfile::new("10.0.0.9"));
        cfg.default_hub = Some("attic".into());
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.hubs["attic"].address, "10.0.0.9");
        assert_eq!(loaded.default_hub.as_deref(), Some("attic"));
    }

    #[test]
    fn select_prefers_explicit_then_default() {
        let cfg = sample();
        assert_eq!(cfg.select(Some("cabin")).unwrap().0, "cabin");
        assert_eq!(cfg.select(None).unwrap().0, "garage");
        assert!(matches!(
            cfg.select(Some("nope")),
            Err(ConfigError::UnknownHub { .. })
        ));
    }

    #[test]
    fn select_single_hub_without_default() {
        let mut cfg = Config::default();
        cfg.hubs.insert("only".into(), HubProfile::new("10.0.0.1"));
        assert_eq!(cfg.select(None).unwrap().0, "only");

        cfg.hubs.insert("other".into(), HubProfile::new("10.0.0.2"));
        assert!(matches!(cfg.select(None), Err(ConfigError::NoHub)));
    }

    #[test]
    fn tls_resolution_order() {
        let cfg = sample();
        assert!(matches!(
            resolve_tls(&cfg.hubs["garage"], &cfg.defaults),
            TlsMode::DangerAcceptInvalid
        ));
        assert!(matches!(
            resolve_tls(&cfg.hubs["cabin"], &cfg.defaults),
            TlsMode::CustomCa(_)
        ));

        let strict = Defaults {
            insecure: false,
            ..Defaults::default()
        };
        assert!(matches!(
            resolve_tls(&HubProfile::new("h"), &strict),
            TlsMode::System
        ));
    }

    #[test]
    fn scheme_parsing() {
        let mut profile = HubProfile::new("h");
        assert_eq!(resolve_scheme(&profile).unwrap(), Scheme::Secure);
        profile.scheme = Some("http".into());
        assert_eq!(resolve_scheme(&profile).unwrap(), Scheme::Plain);
        profile.scheme = Some("gopher".into());
        assert!(matches!(
            resolve_scheme(&profile),
            Err(ConfigError::Validation { .. })
        ));
    }

    fn no_keyring(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn password_chain_order() {
        let mut profile = HubProfile::new("h");
        profile.password = Some("plaintext".into());
        profile.password_env = Some("GARAGE_PW".into());

        let env = |name: &str| match name {
            "GARAGE_PW" => Some("from-profile-env".to_owned()),
            PASSWORD_ENV => Some("from-global-env".to_owned()),
            _ => None,
        };
        let pw = resolve_password_with(&profile, "garage", env, no_keyring).unwrap();
        assert_eq!(pw.expose_secret(), "from-profile-env");

        let global_only = |name: &str| (name == PASSWORD_ENV).then(|| "from-global-env".to_owned());
        let pw = resolve_password_with(&profile, "garage", global_only, no_keyring).unwrap();
        assert_eq!(pw.expose_secret(), "from-global-env");

        let keyring = |hub: &str| (hub == "garage").then(|| "from-keyring".to_owned());
        let pw = resolve_password_with(&profile, "garage", |_| None, keyring).unwrap();
        assert_eq!(pw.expose_secret(), "from-keyring");

        let pw = resolve_password_with(&profile, "garage", |_| None, no_keyring).unwrap();
        assert_eq!(pw.expose_secret(), "plaintext");
    }

    #[test]
    fn missing_password_is_no_credentials() {
        let profile = HubProfile::new("h");
        assert!(matches!(
            resolve_password_with(&profile, "garage", |_| None, no_keyring),
            Err(ConfigError::NoCredentials { ref hub }) if hub == "garage"
        ));
    }

    #[test]
    fn session_config_from_profile() {
        let cfg = sample();
        let session = build_session_config(
            &cfg.hubs["cabin"],
            "cabin",
            &cfg.defaults,
            SecretString::from("pw".to_owned()),
        )
        .unwrap();
        assert_eq!(session.hub_id, "cabin");
        assert_eq!(session.endpoint.port(), 8443);
        assert_eq!(session.endpoint.username(), "owner");
        assert_eq!(session.timeout(), Duration::from_secs(5));
        assert_eq!(session.reconnect.floor, Duration::from_secs(3));
        assert!(matches!(session.transport.tls, TlsMode::CustomCa(_)));
    }

    #[test]
    fn address_with_scheme_is_rejected() {
        let profile = HubProfile::new("https://192.168.1.20");
        assert!(matches!(
            build_session_config(&profile, "h", &Defaults::default(), SecretString::from(String::new())),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut profile = HubProfile::new("192.168.1.20");
        profile.timeout = Some(0);
        assert!(matches!(
            build_session_config(&profile, "h", &Defaults::default(), SecretString::from(String::new())),
            Err(ConfigError::Validation { ref field, .. }) if field == "timeout"
        ));

        let defaults = Defaults {
            timeout: 0,
            ..Defaults::default()
        };
        let profile = HubProfile::new("192.168.1.20");
        assert!(matches!(
            build_session_config(&profile, "h", &defaults, SecretString::from(String::new())),
            Err(ConfigError::Validation { ref field, .. }) if field == "timeout"
        ));
    }
}
