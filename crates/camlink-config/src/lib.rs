//! Shared configuration for camlink.
//!
//! TOML device profiles, credential resolution (env + plaintext), and
//! translation to `camlink_core::DeviceConfigPatch`. The CLI adds
//! `GlobalOpts`-aware overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use camlink_core::DeviceConfigPatch;
use camlink_core::discovery::{DEFAULT_DISCOVERY_PORT, default_candidates};

/// Shared fallback for every device's password.
pub const PASSWORD_ENV: &str = "CAMLINK_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("device '{name}' not found in configuration")]
    DeviceNotFound { name: String, available: Vec<String> },

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
    /// Device used when `--device` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_device: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub discovery: Discovery,

    /// Named device profiles.
    #[serde(default)]
    pub devices: HashMap<String, DeviceProfile>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

/// Where `camlink scan` looks.
#[derive(Debug, Deserialize, Serialize)]
pub struct Discovery {
    /// Port for candidates without an explicit `:port`.
    #[serde(default = "default_discovery_port")]
    pub port: u16,

    /// Addresses probed in order; `host:port` entries override `port`.
    #[serde(default = "default_candidates")]
    pub candidates: Vec<String>,
}

impl Default for Discovery {
    fn default() -> Self {
        Self {
            port: default_discovery_port(),
            candidates: default_candidates(),
        }
    }
}

fn default_discovery_port() -> u16 {
    DEFAULT_DISCOVERY_PORT
}

/// A named camera.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceProfile {
    /// Host name or IP address.
    pub address: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_path: Option<String>,

    /// Stored for the profile; the camera protocol never receives it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Plaintext password (prefer `password_env`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Environment variable holding the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,
}

impl DeviceProfile {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port: None,
            stream_path: None,
            username: None,
            password: None,
            password_env: None,
        }
    }
}

impl Config {
    /// Look up a device profile by name.
    pub fn device(&self, name: &str) -> Result<&DeviceProfile, ConfigError> {
        self.devices
            .get(name)
            .ok_or_else(|| ConfigError::DeviceNotFound {
                name: name.into(),
                available: self.device_names(),
            })
    }

    /// Profile names, sorted.
    pub fn device_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.devices.keys().cloned().collect();
        names.sort();
        names
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "camlink").map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let home = std::env::var_os("HOME").map_or_else(|| PathBuf::from("."), PathBuf::from);
    home.join(".config").join("camlink")
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, layered the same way as [`load_config`].
///
/// Environment keys nest on a double underscore, e.g.
/// `CAMLINK_DEFAULTS__OUTPUT=json` or `CAMLINK_DEFAULT_DEVICE=porch`.
/// A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CAMLINK_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is invalid.
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

/// Resolve a device password from the process environment.
pub fn resolve_password(profile: &DeviceProfile) -> Option<SecretString> {
    resolve_password_with(profile, |name| std::env::var(name).ok())
}

/// Resolve a device password with a caller-supplied variable lookup.
///
/// Order: the profile's `password_env`, then [`PASSWORD_ENV`], then the
/// plaintext `password`.
pub fn resolve_password_with(
    profile: &DeviceProfile,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<SecretString> {
    // 1. Profile's password_env → env var lookup
    if let Some(val) = profile.password_env.as_deref().and_then(&lookup) {
        return Some(SecretString::from(val));
    }

    // 2. Shared env var
    if let Some(val) = lookup(PASSWORD_ENV) {
        return Some(SecretString::from(val));
    }

    // 3. Plaintext in config
    profile.password.clone().map(SecretString::from)
}

/// Build a `DeviceConfigPatch` from a profile, without CLI flag overrides.
pub fn profile_to_patch(profile: &DeviceProfile) -> Result<DeviceConfigPatch, ConfigError> {
    profile_to_patch_with(profile, |name| std::env::var(name).ok())
}

pub fn profile_to_patch_with(
    profile: &DeviceProfile,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<DeviceConfigPatch, ConfigError> {
    if profile.address.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "address".into(),
            reason: "must not be empty".into(),
        });
    }

    let mut patch = DeviceConfigPatch::new().address(profile.address.trim());
    patch.port = profile.port;
    patch.stream_path.clone_from(&profile.stream_path);
    patch.username.clone_from(&profile.username);
    patch.password = resolve_password_with(profile, lookup);
    Ok(patch)
}
