//! CLI arguments and subcommands for procio.
//!
//! This module defines the command-line interface structure using the clap
//! library, including all flags, positionals, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "procio",
    about = "Per-process storage I/O monitor for Linux",
    long_about = "Per-process storage I/O monitor for Linux.\n\n\
                  Samples the cumulative I/O counters of every running process each \
                  polling interval and prints the per-interval change: characters and \
                  bytes read and written, read/write syscall counts, and cancelled \
                  writeback bytes.",
    version,
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Seconds to sleep between passes; a single pass runs when omitted
    pub delay: Option<u64>,

    /// Number of passes to run; unlimited when omitted
    pub count: Option<u64>,

    /// Show the full command line instead of the short command name
    #[arg(short = 'c', long)]
    pub full_command: bool,

    /// Hide processes with no I/O activity during the interval
    #[arg(short = 'i', long)]
    pub hide_idle: bool,

    /// Display counters in kibibytes
    #[arg(short = 'k', long, conflicts_with = "megabytes")]
    pub kilobytes: bool,

    /// Display counters in mebibytes
    #[arg(short = 'm', long, conflicts_with = "kilobytes")]
    pub megabytes: bool,

    /// Log level (overrides the config file)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Alternate proc filesystem root
    #[arg(long)]
    pub proc_root: Option<PathBuf>,

    /// Print the column header once instead of before every pass
    #[arg(long)]
    pub no_repeat_header: bool,

    /// Drop registry entries for pids not seen in N consecutive passes
    #[arg(long, value_name = "PASSES")]
    pub evict_after: Option<u64>,

    /// Detect pid reuse via process start times instead of reporting a
    /// negative delta for the recycled pid
    #[arg(long)]
    pub detect_reuse: bool,

    /// Maximum number of processes to scan per pass
    #[arg(long)]
    pub max_processes: Option<usize>,

    /// Config file (YAML/JSON/TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate proc filesystem access and kernel I/O accounting support
    Check {
        /// Check the proc filesystem
        #[arg(long)]
        proc: bool,

        /// Check I/O accounting records
        #[arg(long)]
        io: bool,

        /// Check all system requirements
        #[arg(long)]
        all: bool,
    },

    /// Generate configuration files
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },
}
