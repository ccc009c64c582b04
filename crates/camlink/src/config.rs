//! CLI configuration: thin wrapper around `camlink_config` shared types.
//!
//! Adds the resolution steps that respect `GlobalOpts` flag overrides
//! (--device, --address, --port, --stream-path, --output, --color).

use clap::ValueEnum;

use camlink_core::DeviceConfigPatch;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use camlink_config::{
    Config, DeviceProfile, config_path, load_config, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active device name from CLI flags and config.
pub fn active_device_name(global: &GlobalOpts, config: &Config) -> Option<String> {
    global
        .device
        .clone()
        .or_else(|| config.default_device.clone())
}

/// Build the connect patch for this invocation.
///
/// Precedence per field: flag (or its env var) > device profile > client
/// default. With no profile selected, flags alone describe the device.
pub fn resolve_device(global: &GlobalOpts, config: &Config) -> Result<DeviceConfigPatch, CliError> {
    let mut patch = match active_device_name(global, config) {
        Some(name) => camlink_config::profile_to_patch(config.device(&name)?)?,
        None => DeviceConfigPatch::new(),
    };

    if let Some(ref address) = global.address {
        patch.address = Some(address.clone());
    }
    if let Some(port) = global.port {
        patch.port = Some(port);
    }
    if let Some(ref path) = global.stream_path {
        patch.stream_path = Some(path.clone());
    }
    Ok(patch)
}

/// `--output`, else `[defaults] output`, else table.
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    global.output.unwrap_or_else(|| {
        <OutputFormat as ValueEnum>::from_str(&config.defaults.output, true).unwrap_or(OutputFormat::Table)
    })
}

/// `--color`, else `[defaults] color`, else auto.
pub fn color_mode(global: &GlobalOpts, config: &Config) -> ColorMode {
    global.color.unwrap_or_else(|| {
        <ColorMode as ValueEnum>::from_str(&config.defaults.color, true).unwrap_or(ColorMode::Auto)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let argv = ["camlink"].iter().chain(args).chain(&["status"]);
        Cli::try_parse_from(argv).unwrap().global
    }

    fn config_with_porch() -> Config {
        let mut cfg = Config::default();
        let mut porch = DeviceProfile::new("192.168.1.100");
        porch.stream_path = Some("/mjpeg/1".into());
        cfg.devices.insert("porch".into(), porch);
        cfg.default_device = Some("porch".into());
        cfg
    }

    #[test]
    fn flags_override_profile() {
        let cfg = config_with_porch();
        let patch = resolve_device(&global(&["--port", "8080"]), &cfg).unwrap();

        assert_eq!(patch.address.as_deref(), Some("192.168.1.100"));
        assert_eq!(patch.port, Some(8080));
        assert_eq!(patch.stream_path.as_deref(), Some("/mjpeg/1"));
    }

    #[test]
    fn no_profile_uses_flags_alone() {
        let patch = resolve_device(&global(&["-a", "10.0.0.5"]), &Config::default()).unwrap();
        assert_eq!(patch.address.as_deref(), Some("10.0.0.5"));
        assert_eq!(patch.port, None);
    }

    #[test]
    fn unknown_device_is_an_error() {
        let cfg = config_with_porch();
        let result = resolve_device(&global(&["-d", "attic"]), &cfg);
        assert!(matches!(result, Err(CliError::DeviceNotFound { .. })));
    }

    #[test]
    fn output_falls_back_to_config() {
        let mut cfg = Config::default();
        cfg.defaults.output = "yaml".into();
        assert_eq!(output_format(&global(&[]), &cfg), OutputFormat::Yaml);
        assert_eq!(
            output_format(&global(&["-o", "plain"]), &cfg),
            OutputFormat::Plain
        );

        cfg.defaults.output = "json-compact".into();
        assert_eq!(output_format(&global(&[]), &cfg), OutputFormat::JsonCompact);

        cfg.defaults.output = "bogus".into();
        assert_eq!(output_format(&global(&[]), &cfg), OutputFormat::Table);
    }
}
