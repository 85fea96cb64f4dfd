//! procio - per-process storage I/O monitor for Linux.
//!
//! This is the main entry point: it resolves configuration, dispatches
//! subcommands, and runs the polling loop around the scan driver.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{error, Level};

use procio::cli::{Args, Commands};
use procio::commands::{command_check, command_config};
use procio::config::{
    resolve_config, show_config, validate_effective_config, Config, DEFAULT_LOG_LEVEL,
};
use procio::monitor::{run_loop, Monitor, MonitorOptions};
use procio::startup_checks;

/// Initializes tracing logging subsystem with configured log level.
///
/// Logging goes to stderr; stdout is reserved for the data rows.
fn setup_logging(config: &Config) {
    let log_level = match config.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL) {
        "off" | "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::WARN,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.config_format.clone());
    }

    let config = resolve_config(&args)?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }

    // Handle subcommands
    if let Some(command) = &args.command {
        return match command {
            Commands::Check { proc, io, all } => {
                // Bare `check` behaves like `check --all`.
                let everything = *all || !(*proc || *io);
                command_check(*proc, *io, everything, &config)
            }
            Commands::Config {
                output,
                format,
                commented,
            } => command_config(output.clone(), format.clone(), *commented),
        };
    }

    setup_logging(&config);

    let proc_root = config.effective_proc_root();
    if let Err(e) = startup_checks::validate_requirements(&proc_root) {
        error!("startup validation failed: {}", e);
        std::process::exit(1);
    }

    let options = MonitorOptions {
        proc_root,
        full_command: config.full_command.unwrap_or(false),
        hide_idle: config.hide_idle.unwrap_or(false),
        unit: config.effective_unit(),
        repeat_header: config.repeat_header.unwrap_or(true),
        evict_after: config.evict_after,
        detect_reuse: config.detect_reuse.unwrap_or(false),
        max_processes: config.max_processes,
    };
    let mut monitor = Monitor::new(options);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_loop(
        &mut monitor,
        config.delay.map(Duration::from_secs),
        config.count,
        &mut out,
    )
}
