//! Configuration management for procio.
//!
//! This module handles loading, merging, and validating configuration from
//! files and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat};
use crate::delta::Unit;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_PROC_ROOT: &str = "/proc";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Effective configuration, every field optional so file and CLI layers can
/// be merged field by field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Seconds between passes; a single pass when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<u64>,

    /// Number of passes to run; unlimited when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,

    // Row content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_command: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_idle: Option<bool>,

    /// "bytes" | "kb" | "mb" (binary scaling)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    // Sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proc_root: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,

    // Output shape
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_header: Option<bool>,

    // Registry behavior
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evict_after: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detect_reuse: Option<bool>,

    // Logging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delay: None,
            count: None,
            full_command: Some(false),
            hide_idle: Some(false),
            unit: Some("bytes".into()),
            proc_root: Some(PathBuf::from(DEFAULT_PROC_ROOT)),
            max_processes: None,
            repeat_header: Some(true),
            evict_after: None,
            detect_reuse: Some(false),
            log_level: Some(DEFAULT_LOG_LEVEL.into()),
        }
    }
}

impl Config {
    /// Effective unit scale; defaults to raw bytes.
    pub fn effective_unit(&self) -> Unit {
        match self.unit.as_deref() {
            Some("kb") => Unit::Kibibytes,
            Some("mb") => Unit::Mebibytes,
            _ => Unit::Bytes,
        }
    }

    pub fn effective_proc_root(&self) -> PathBuf {
        self.proc_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROC_ROOT))
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<()> {
    if let Some(unit) = cfg.unit.as_deref() {
        match unit {
            "bytes" | "kb" | "mb" => {}
            other => bail!("invalid unit '{}', expected 'bytes', 'kb' or 'mb'", other),
        }
    }

    if let Some(level) = cfg.log_level.as_deref() {
        match level {
            "off" | "error" | "warn" | "info" | "debug" | "trace" => {}
            other => bail!(
                "invalid log_level '{}', expected off/error/warn/info/debug/trace",
                other
            ),
        }
    }

    if cfg.delay == Some(0) {
        bail!("delay must be at least one second");
    }
    if cfg.count == Some(0) {
        bail!("count must be at least one pass");
    }
    if cfg.count.is_some() && cfg.delay.is_none() {
        bail!("count requires a delay between passes");
    }
    if cfg.evict_after == Some(0) {
        bail!("evict_after must be at least one pass");
    }
    if cfg.max_processes == Some(0) {
        bail!("max_processes must be at least one");
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if args.delay.is_some() {
        config.delay = args.delay;
    }
    if args.count.is_some() {
        config.count = args.count;
    }
    if args.full_command {
        config.full_command = Some(true);
    }
    if args.hide_idle {
        config.hide_idle = Some(true);
    }
    if args.kilobytes {
        config.unit = Some("kb".into());
    }
    if args.megabytes {
        config.unit = Some("mb".into());
    }
    if let Some(root) = &args.proc_root {
        config.proc_root = Some(root.clone());
    }
    if args.no_repeat_header {
        config.repeat_header = Some(false);
    }
    if args.evict_after.is_some() {
        config.evict_after = args.evict_after;
    }
    if args.detect_reuse {
        config.detect_reuse = Some(true);
    }
    if args.max_processes.is_some() {
        config.max_processes = args.max_processes;
    }
    if let Some(level) = &args.log_level {
        config.log_level = Some(level.as_str().into());
    }

    Ok(config)
}

/// Configuration loading with multiple format support.
///
/// An explicit path must exist; the default locations are probed and fall
/// back to the built-in defaults when absent.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = if let Some(p) = path {
        p.to_path_buf()
    } else {
        let defaults = [
            "/etc/procio/procio.yaml",
            "/etc/procio/procio.yml",
            "/etc/procio/procio.json",
            "./procio.yaml",
            "./procio.yml",
            "./procio.json",
        ];

        match defaults.iter().find(|p| Path::new(p).exists()) {
            Some(p) => PathBuf::from(p),
            None => return Ok(Config::default()),
        }
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("cannot read config file {}", path.display()))?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("invalid JSON config {}", path.display()))?;
            info!("Loaded JSON configuration from: {}", path.display());
            Ok(config)
        }
        Some("toml") => {
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("invalid TOML config {}", path.display()))?;
            info!("Loaded TOML configuration from: {}", path.display());
            Ok(config)
        }
        _ => {
            // Default to YAML
            let config: Config = serde_yaml::from_str(&content)
                .with_context(|| format!("invalid YAML config {}", path.display()))?;
            info!("Loaded YAML configuration from: {}", path.display());
            Ok(config)
        }
    }
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<()> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };

    println!("{output}");
    Ok(())
}
