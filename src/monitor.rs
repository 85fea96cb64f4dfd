//! Scan driver: one pass over the process table, and the polling loop.
//!
//! A pass enumerates the proc root, reads a fresh sample per pid, diffs it
//! against the registry, writes the surviving rows, and absorbs every
//! successfully read sample back into the registry. Passes run strictly
//! sequentially; the loop sleeps between them and never interrupts one.

use std::io::Write;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use crate::delta::{IoDelta, Unit};
use crate::output;
use crate::process::sample::read_sample;
use crate::process::scanner::collect_proc_entries;
use crate::registry::CounterRegistry;

/// Resolved knobs for one monitor run.
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    pub proc_root: PathBuf,
    /// Show the full command line instead of the short `stat` name.
    pub full_command: bool,
    /// Suppress rows whose seven scaled deltas are all zero.
    pub hide_idle: bool,
    pub unit: Unit,
    /// Reprint the column header before every pass, not just the first.
    pub repeat_header: bool,
    /// Drop registry entries not refreshed within this many passes.
    pub evict_after: Option<u64>,
    /// Compare process start times so a recycled pid reads as a new
    /// process instead of a negative delta.
    pub detect_reuse: bool,
    pub max_processes: Option<usize>,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            proc_root: PathBuf::from("/proc"),
            full_command: false,
            hide_idle: false,
            unit: Unit::Bytes,
            repeat_header: true,
            evict_after: None,
            detect_reuse: false,
            max_processes: None,
        }
    }
}

/// Counters for one completed pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Pids enumerated at the start of the pass.
    pub scanned: usize,
    pub emitted: usize,
    pub suppressed: usize,
    /// Pids that vanished or yielded malformed records mid-pass.
    pub skipped: usize,
    pub evicted: usize,
}

/// Owns the registry and drives enumerate/read/delta/emit passes.
pub struct Monitor {
    options: MonitorOptions,
    registry: CounterRegistry,
    passes: u64,
}

impl Monitor {
    pub fn new(options: MonitorOptions) -> Self {
        Self {
            options,
            registry: CounterRegistry::new(),
            passes: 0,
        }
    }

    pub fn registry(&self) -> &CounterRegistry {
        &self.registry
    }

    /// Runs one full pass, writing the header and rows to `out`.
    ///
    /// Per-process failures are skipped; only an unreadable proc root or a
    /// broken writer fails the pass.
    pub fn run_pass(&mut self, out: &mut impl Write) -> Result<PassStats> {
        let entries = collect_proc_entries(&self.options.proc_root, self.options.max_processes)
            .with_context(|| {
                format!(
                    "cannot enumerate processes under {}",
                    self.options.proc_root.display()
                )
            })?;

        self.registry.begin_pass();
        if self.options.repeat_header || self.passes == 0 {
            output::write_header(out, self.options.unit).context("writing header")?;
        }

        let mut stats = PassStats {
            scanned: entries.len(),
            ..PassStats::default()
        };

        for entry in &entries {
            let sample =
                match read_sample(entry, self.options.full_command, self.options.detect_reuse) {
                    Ok(sample) => sample,
                    Err(err) => {
                        debug!("skipping pid {}: {}", entry.pid, err);
                        stats.skipped += 1;
                        continue;
                    }
                };

            // A changed start time means the pid was recycled; the stored
            // entry belongs to a dead process and must not seed the delta.
            let prior = self
                .registry
                .lookup(sample.pid)
                .filter(|prior| !self.options.detect_reuse || prior.start_time == sample.start_time);
            let delta = IoDelta::between(&sample, prior).scaled(self.options.unit);

            let (pid, command) = (sample.pid, sample.command.clone());
            self.registry.upsert(sample);

            if self.options.hide_idle && delta.is_idle() {
                stats.suppressed += 1;
                continue;
            }
            output::write_row(out, pid, &delta, &command).context("writing row")?;
            stats.emitted += 1;
        }

        if let Some(max_age) = self.options.evict_after {
            stats.evicted = self.registry.sweep(max_age);
        }

        self.passes += 1;
        debug!(
            "pass {} complete: {} scanned, {} emitted, {} suppressed, {} skipped, {} evicted",
            self.passes,
            stats.scanned,
            stats.emitted,
            stats.suppressed,
            stats.skipped,
            stats.evicted
        );
        Ok(stats)
    }
}

/// Runs passes until `count` is exhausted, sleeping `delay` between them.
///
/// The first pass runs immediately. Without a delay exactly one pass runs;
/// without a count the loop runs until the process is terminated. The sleep
/// sits strictly between passes, so termination never lands mid-pass.
pub fn run_loop(
    monitor: &mut Monitor,
    delay: Option<Duration>,
    count: Option<u64>,
    out: &mut impl Write,
) -> Result<()> {
    monitor.run_pass(out)?;

    let Some(delay) = delay else {
        return Ok(());
    };

    let mut remaining = count.map(|c| c.saturating_sub(1));
    while remaining.map_or(true, |r| r > 0) {
        thread::sleep(delay);
        monitor.run_pass(out)?;
        if let Some(r) = remaining.as_mut() {
            *r -= 1;
        }
    }
    Ok(())
}
