//! Hub selection and flag overrides.
//!
//! The TOML profiles live in `camect-config`; this module only layers the
//! global command-line flags on top and produces a `SessionConfig`.

use secrecy::SecretString;

use camect_config::{Config, HubProfile};
use camect_core::SessionConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Resolve the `SessionConfig` for hub `name` (or the selected hub when
/// `None`) with global flag overrides applied.
///
/// `--address` without a named hub builds a one-off profile, so commands
/// work with no config file at all.
pub fn session_config(
    global: &GlobalOpts,
    cfg: &Config,
    name: Option<&str>,
) -> Result<SessionConfig, CliError> {
    let name = name.or(global.hub.as_deref());

    let (hub, mut profile) = match (name, global.address.as_deref()) {
        (None, Some(address)) => (address.to_owned(), HubProfile::new(address)),
        _ => {
            let (hub, profile) = cfg.select(name)?;
            (hub.to_owned(), profile.clone())
        }
    };

    apply_overrides(&mut profile, global);

    let password = match global.password.as_deref() {
        Some(pw) => SecretString::from(pw.to_owned()),
        None => camect_config::resolve_password(&profile, &hub)?,
    };

    Ok(camect_config::build_session_config(
        &profile,
        &hub,
        &cfg.defaults,
        password,
    )?)
}

/// Every hub the `--all` flag should cover, in name order.
pub fn all_hub_names(cfg: &Config) -> Result<Vec<String>, CliError> {
    if cfg.hubs.is_empty() {
        return Err(CliError::NoConfig {
            path: camect_config::config_path().display().to_string(),
        });
    }
    Ok(cfg.hubs.keys().cloned().collect())
}

fn apply_overrides(profile: &mut HubProfile, global: &GlobalOpts) {
    if let Some(ref address) = global.address {
        profile.address.clone_from(address);
    }
    if let Some(port) = global.port {
        profile.port = port;
    }
    if let Some(ref username) = global.username {
        profile.username.clone_from(username);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    if global.http {
        profile.scheme = Some("http".into());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["camect"];
        argv.extend_from_slice(args);
        argv.push("info");
        Cli::try_parse_from(argv).unwrap().global
    }

    fn config_with(names: &[&str]) -> Config {
        let mut cfg = Config::default();
        for name in names {
            let mut profile = HubProfile::new(format!("{name}.lan"));
            profile.password = Some("pw".into());
            cfg.hubs.insert((*name).to_owned(), profile);
        }
        cfg
    }

    #[test]
    fn address_flag_builds_adhoc_profile() {
        let g = global(&["--address", "10.0.0.5", "--password", "pw", "--port", "8443"]);
        let session = session_config(&g, &Config::default(), None).unwrap();
        assert_eq!(session.hub_id, "10.0.0.5");
        assert_eq!(session.endpoint.port(), 8443);
    }

    #[test]
    fn single_profile_is_selected_implicitly() {
        let g = global(&["--password", "pw"]);
        let session = session_config(&g, &config_with(&["garage"]), None).unwrap();
        assert_eq!(session.hub_id, "garage");
    }

    #[test]
    fn named_hub_keeps_profile_but_applies_overrides() {
        let g = global(&["--hub", "porch", "--timeout", "3", "--http", "--password", "pw"]);
        let session = session_config(&g, &config_with(&["garage", "porch"]), None).unwrap();
        assert_eq!(session.hub_id, "porch");
        assert_eq!(session.endpoint.address(), "porch.lan");
        assert_eq!(session.timeout().as_secs(), 3);
        assert!(session.endpoint.api_base().unwrap().as_str().starts_with("http://"));
    }

    #[test]
    fn ambiguous_selection_reports_missing_config() {
        let g = global(&[]);
        let err = session_config(&g, &config_with(&["a", "b"]), None).unwrap_err();
        assert!(matches!(err, CliError::NoConfig { .. }));
    }

    #[test]
    fn unknown_hub_is_not_found() {
        let g = global(&["--hub", "attic"]);
        let err = session_config(&g, &config_with(&["garage"]), None).unwrap_err();
        assert!(matches!(err, CliError::HubNotFound { ref name, .. } if name == "attic"));
    }

    #[test]
    fn all_hubs_requires_config() {
        assert!(all_hub_names(&Config::default()).is_err());
        assert_eq!(
            all_hub_names(&config_with(&["b", "a"])).unwrap(),
            vec!["a".to_owned(), "b".to_owned()]
        );
    }
}
