//! Config subcommand handlers.

use dialoguer::{Input, Select};

use camect_config::{Config, HubProfile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Config as a TOML value with every plaintext password masked.
fn redacted(cfg: &Config) -> Result<toml::Value, CliError> {
    let mut value = toml::Value::try_from(cfg).map_err(|e| CliError::Config {
        message: format!("failed to render config: {e}"),
    })?;
    if let Some(hubs) = value.get_mut("hubs").and_then(toml::Value::as_table_mut) {
        for (_, hub) in hubs.iter_mut() {
            if let Some(password) = hub.get_mut("password") {
                *password = toml::Value::String("****".into());
            }
        }
    }
    Ok(value)
}

fn hub_names(cfg: &Config) -> String {
    if cfg.hubs.is_empty() {
        "(none)".into()
    } else {
        cfg.hubs.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: key.into(),
        reason: format!("must be {expected}"),
    })
}

/// Apply `key = value` to a hub profile.
fn set_profile_key(profile: &mut HubProfile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "address" => profile.address = value,
        "port" => profile.port = parse_value(key, &value, "a port number")?,
        "username" => profile.username = value,
        "password" => profile.password = Some(value),
        "password_env" | "password-env" => profile.password_env = Some(value),
        "scheme" => {
            if !matches!(value.as_str(), "https" | "http") {
                return Err(CliError::Validation {
                    field: "scheme".into(),
                    reason: "must be 'https' or 'http'".into(),
                });
            }
            profile.scheme = Some(value);
        }
        "insecure" => profile.insecure = Some(parse_value(key, &value, "'true' or 'false'")?),
        "timeout" => profile.timeout = Some(parse_value(key, &value, "a number (seconds)")?),
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: address, port, username, \
                     password, password_env, scheme, insecure, timeout, ca_cert"
                ),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = camect_config::load_config()?;
            let value = redacted(&cfg)?;
            let out = match global.output {
                OutputFormat::Json => output::render_json_pretty(&value),
                OutputFormat::JsonCompact => output::render_json_compact(&value),
                OutputFormat::Yaml => output::render_yaml(&value),
                OutputFormat::Table | OutputFormat::Plain => {
                    toml::to_string_pretty(&value).map_err(|e| CliError::Config {
                        message: format!("failed to render config: {e}"),
                    })?
                }
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", camect_config::config_path().display());
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = camect_config::load_config()?;
            let hub = cfg.select(global.hub.as_deref())?.0.to_owned();
            if let Some(profile) = cfg.hubs.get_mut(&hub) {
                set_profile_key(profile, &key, value)?;
            }
            camect_config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Set {key} on hub '{hub}'");
            }
            Ok(())
        }

        // ── Hubs ────────────────────────────────────────────────────
        ConfigCommand::Hubs => {
            let cfg = camect_config::load_config()?;
            if cfg.hubs.is_empty() {
                eprintln!("No hubs configured. Run: camect config init");
            } else {
                let default = cfg.default_hub.as_deref();
                for (name, profile) in &cfg.hubs {
                    let marker = if Some(name.as_str()) == default { " *" } else { "" };
                    println!("{name}{marker}\t{}:{}", profile.address, profile.port);
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = camect_config::load_config()?;
            if !cfg.hubs.contains_key(&name) {
                return Err(CliError::HubNotFound {
                    available: hub_names(&cfg),
                    name,
                });
            }
            cfg.default_hub = Some(name.clone());
            camect_config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Default hub set to '{name}'");
            }
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword { hub } => {
            let cfg = camect_config::load_config()?;
            let name = hub.or_else(|| global.hub.clone());
            let hub = match cfg.select(name.as_deref()) {
                Ok((hub, _)) => hub.to_owned(),
                Err(_) => {
                    return Err(CliError::HubNotFound {
                        name: name.unwrap_or_else(|| "(default)".into()),
                        available: hub_names(&cfg),
                    });
                }
            };

            let secret = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "value cannot be empty".into(),
                });
            }

            camect_config::store_password(&hub, &secret)?;
            eprintln!("✓ Password stored in system keyring for hub '{hub}'");
            Ok(())
        }
    }
}

// ── Init: interactive wizard ────────────────────────────────────────

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let config_path = camect_config::config_path();
    let mut cfg = camect_config::load_config_or_default();

    eprintln!("Camect CLI configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    // 1. Hub name
    let name: String = Input::new()
        .with_prompt("Hub name")
        .default("home".into())
        .interact_text()
        .map_err(prompt_err)?;

    if cfg.hubs.contains_key(&name)
        && !util::confirm(&format!("Hub '{name}' exists. Overwrite?"), global.yes)?
    {
        return Ok(());
    }

    // 2. Address
    let address: String = Input::new()
        .with_prompt("Hub address (IP or hostname)")
        .interact_text()
        .map_err(prompt_err)?;

    let mut profile = HubProfile::new(address.trim());

    // 3. Username
    profile.username = Input::new()
        .with_prompt("Username")
        .default(profile.username.clone())
        .interact_text()
        .map_err(prompt_err)?;

    // 4. Password
    let password = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }

    let store_choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let store_selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(store_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if store_selection == 0 {
        camect_config::store_password(&name, &password)?;
        eprintln!("   ✓ Password stored in system keyring");
    } else {
        profile.password = Some(password);
    }

    // 5. Write config
    cfg.hubs.insert(name.clone(), profile);
    if cfg.default_hub.is_none() {
        cfg.default_hub = Some(name.clone());
    }
    camect_config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Hub: {name}");
    eprintln!("\n  Test it: camect --hub {name} info");
    Ok(())
}
