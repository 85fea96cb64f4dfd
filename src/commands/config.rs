//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::cli::ConfigFormat;
use crate::config::Config;

/// Generates configuration files.
pub fn command_config(output: Option<PathBuf>, format: ConfigFormat, commented: bool) -> Result<()> {
    let config = Config::default();
    let output = match output {
        Some(path) => path,
        None => PathBuf::from("procio.yaml"),
    };

    let content = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(&config)?,
        ConfigFormat::Toml => toml::to_string_pretty(&config)?,
        ConfigFormat::Yaml => {
            let mut content = serde_yaml::to_string(&config)?;
            if commented {
                content = add_config_comments(content);
            }
            content
        }
    };

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# procio configuration
# ====================
#
# Polling
# -------
# delay: null            # Seconds between passes (null = single pass)
# count: null            # Number of passes (null = unlimited)
#
# Row Content
# -----------
# full_command: false    # Show the full command line instead of the short name
# hide_idle: false       # Suppress rows with no I/O activity in the interval
# unit: "bytes"          # Column scale: "bytes", "kb" or "mb" (binary)
#
# Sampling
# --------
# proc_root: "/proc"     # Proc filesystem root
# max_processes: null    # Cap on processes scanned per pass (null = all)
#
# Output Shape
# ------------
# repeat_header: true    # Reprint the column header before every pass
#
# Registry Behavior
# -----------------
# evict_after: null      # Drop pids not seen in N passes (null = keep forever)
# detect_reuse: false    # Treat a changed start time as a new process
#
# Logging
# -------
# log_level: "warn"      # off, error, warn, info, debug, trace
"#;

    format!("{comments}\n{yaml}")
}
