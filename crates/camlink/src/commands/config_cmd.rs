//! Config subcommand handlers.

use camlink_core::{DeviceConfig, DeviceConfigPatch};

use crate::cli::{ConfigAddArgs, ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, DeviceProfile};
use crate::error::CliError;

use super::util;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_device {
        let _ = writeln!(out, "default_device = \"{default}\"");
        let _ = writeln!(out);
    }
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);

    let _ = writeln!(out);
    let _ = writeln!(out, "[discovery]");
    let _ = writeln!(out, "port = {}", cfg.discovery.port);
    let candidates: Vec<String> = cfg
        .discovery
        .candidates
        .iter()
        .map(|c| format!("\"{c}\""))
        .collect();
    let _ = writeln!(out, "candidates = [{}]", candidates.join(", "));

    for name in cfg.device_names() {
        let Some(d) = cfg.devices.get(&name) else {
            continue;
        };
        let _ = writeln!(out);
        let _ = writeln!(out, "[devices.{name}]");
        let _ = writeln!(out, "address = \"{}\"", d.address);
        if let Some(port) = d.port {
            let _ = writeln!(out, "port = {port}");
        }
        if let Some(ref path) = d.stream_path {
            let _ = writeln!(out, "stream_path = \"{path}\"");
        }
        if let Some(ref u) = d.username {
            let _ = writeln!(out, "username = \"{u}\"");
        }
        if d.password.is_some() {
            let _ = writeln!(out, "password = \"****\"");
        }
        if let Some(ref env) = d.password_env {
            let _ = writeln!(out, "password_env = \"{env}\"");
        }
    }

    out
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Reject profiles the client would refuse to connect with.
fn validate_profile(profile: &DeviceProfile) -> Result<(), CliError> {
    let patch: DeviceConfigPatch = camlink_config::profile_to_patch_with(profile, |_| None)?;
    patch.apply_to(&DeviceConfig::default()).validate()?;
    Ok(())
}

fn build_profile(args: &ConfigAddArgs, global: &GlobalOpts) -> Result<DeviceProfile, CliError> {
    let address = global.address.clone().ok_or_else(|| CliError::Validation {
        field: "address".into(),
        reason: "`config add` needs --address <ip>".into(),
    })?;

    let mut profile = DeviceProfile::new(address);
    profile.port = global.port;
    profile.stream_path.clone_from(&global.stream_path);
    profile.username.clone_from(&args.username);
    profile.password_env.clone_from(&args.password_env);

    if args.ask_password {
        let password =
            rpassword::prompt_password("Password (stored in plaintext): ").map_err(prompt_err)?;
        if password.is_empty() {
            return Err(CliError::Validation {
                field: "password".into(),
                reason: "password cannot be empty".into(),
            });
        }
        profile.password = Some(password);
    }

    validate_profile(&profile)?;
    Ok(profile)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            print!("{}", format_config_redacted(&cfg));
            Ok(())
        }

        // ── Add <name> ──────────────────────────────────────────────
        ConfigCommand::Add(add) => {
            let profile = build_profile(&add, global)?;
            let mut cfg = config::load_config()?;

            let replaced = cfg.devices.insert(add.name.clone(), profile).is_some();
            if add.default || cfg.default_device.is_none() {
                cfg.default_device = Some(add.name.clone());
            }
            config::save_config(&cfg)?;

            let verb = if replaced { "Updated" } else { "Added" };
            util::note(&format!("✓ {verb} device '{}'", add.name), global.quiet);
            Ok(())
        }

        // ── Remove <name> ───────────────────────────────────────────
        ConfigCommand::Remove { name } => {
            let mut cfg = config::load_config()?;
            cfg.device(&name)?;

            if !util::confirm(&format!("Remove device '{name}'?"), global.yes)? {
                util::note("Aborted", global.quiet);
                return Ok(());
            }

            cfg.devices.remove(&name);
            if cfg.default_device.as_deref() == Some(name.as_str()) {
                cfg.default_device = None;
            }
            config::save_config(&cfg)?;
            util::note(&format!("✓ Removed device '{name}'"), global.quiet);
            Ok(())
        }

        // ── Use <name> ──────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;
            cfg.device(&name)?;

            cfg.default_device = Some(name.clone());
            config::save_config(&cfg)?;
            util::note(&format!("✓ Default device set to '{name}'"), global.quiet);
            Ok(())
        }
    }
}
