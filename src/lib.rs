//! Per-process storage I/O monitoring for Linux.
//!
//! Each pass the engine enumerates the process table under a proc root,
//! reads every process's cumulative I/O counters, diffs them against the
//! previous pass, and prints one fixed-width row per process. The binary in
//! `main.rs` is a thin CLI over [`monitor::Monitor`].

pub mod cli;
pub mod commands;
pub mod config;
pub mod delta;
pub mod monitor;
pub mod output;
pub mod process;
pub mod registry;
pub mod startup_checks;

// Re-export main types for convenience
pub use delta::{IoDelta, Unit};
pub use monitor::{run_loop, Monitor, MonitorOptions, PassStats};
pub use process::{IoCounters, Sample};
pub use registry::CounterRegistry;
