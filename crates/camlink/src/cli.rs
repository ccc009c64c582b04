//! Clap derive structures for the `camlink` CLI.
//!
//! Defines the command tree, global flags, and shared types. Only depends
//! on clap, clap_complete and humantime so `build.rs` can include it.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// camlink -- find and drive ESP32-CAM style cameras on the local network
#[derive(Debug, Parser)]
#[command(
    name = "camlink",
    version,
    about = "Discover and control networked cameras from the command line",
    long_about = "Discover and control ESP32-CAM style cameras that expose the\n\
        /status, /start-stream, /stop-stream and /capture HTTP endpoints.\n\n\
        Device commands connect, run, and disconnect in a single invocation.",
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
    /// Device profile to use
    #[arg(long, short = 'd', env = "CAMLINK_DEVICE", global = true)]
    pub device: Option<String>,

    /// Camera address (overrides profile)
    #[arg(long, short = 'a', env = "CAMLINK_ADDRESS", global = true)]
    pub address: Option<String>,

    /// Camera HTTP port (overrides profile)
    #[arg(long, short = 'P', env = "CAMLINK_PORT", global = true)]
    pub port: Option<u16>,

    /// Path of the video stream (overrides profile)
    #[arg(long, env = "CAMLINK_STREAM_PATH", global = true)]
    pub stream_path: Option<String>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "CAMLINK_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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
    /// Probe likely addresses for cameras
    #[command(alias = "discover")]
    Scan(ScanArgs),

    /// Connect and show connection status
    #[command(alias = "st")]
    Status,

    /// Start or stop the video stream
    Stream(StreamArgs),

    /// Take a still photo
    #[command(alias = "snap")]
    Capture(CaptureArgs),

    /// Poll connectivity until interrupted
    Watch(WatchArgs),

    /// Manage CLI configuration and device profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Scan ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Addresses to probe (host or host:port) [default: from config]
    ///
    /// `--port` sets the port for candidates without an explicit one.
    pub candidates: Vec<String>,
}

// ── Stream ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StreamArgs {
    #[command(subcommand)]
    pub command: StreamCommand,
}

#[derive(Debug, Subcommand)]
pub enum StreamCommand {
    /// Ask the camera to start streaming and print the stream URL
    Start,
    /// Ask the camera to stop streaming
    Stop,
    /// Print the stream URL without changing the stream
    Url,
}

// ── Capture ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CaptureArgs {
    /// Download the image and print it as a data URI
    #[arg(long)]
    pub embed: bool,

    /// Download the image and write it to PATH
    #[arg(long, value_name = "PATH", conflicts_with = "embed")]
    pub save: Option<PathBuf>,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Time between connectivity checks (e.g. "5s", "1m")
    #[arg(long, short = 'i', default_value = "5s", value_parser = humantime::parse_duration)]
    pub interval: Duration,

    /// Stop after N checks
    #[arg(long, short = 'n')]
    pub count: Option<u32>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display current resolved configuration
    Show,

    /// Add or replace a device profile from --address, --port and --stream-path
    Add(ConfigAddArgs),

    /// Remove a device profile
    #[command(alias = "rm")]
    Remove {
        /// Profile name
        name: String,
    },

    /// Set the default device
    Use {
        /// Profile name to set as default
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct ConfigAddArgs {
    /// Profile name
    pub name: String,

    /// Username stored with the profile
    #[arg(long)]
    pub username: Option<String>,

    /// Environment variable holding the password
    #[arg(long)]
    pub password_env: Option<String>,

    /// Prompt for a password and store it in the config file (plaintext)
    #[arg(long, conflicts_with = "password_env")]
    pub ask_password: bool,

    /// Make this the default device
    #[arg(long)]
    pub default: bool,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
