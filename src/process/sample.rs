//! Per-process sample acquisition from the proc filesystem.
//!
//! This module reads one process's command name and cumulative I/O counters
//! into a [`Sample`]. The process table is under constant churn, so every
//! failure here is classified per pid and never fails the surrounding pass.

use std::fs;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

use crate::process::scanner::ProcEntry;

/// Upper bound for one `stat` or `io` record read. Both records keep the
/// fields we need near the start.
const RECORD_READ_CAP: u64 = 255;

/// Longest command name kept from the `stat` record.
const COMMAND_MAX_CHARS: usize = 63;

/// Labels of the `io` record in the order the kernel writes them. The order
/// is a contract; the parser refuses records that deviate from it.
const IO_FIELD_LABELS: [&str; 7] = [
    "rchar",
    "wchar",
    "syscr",
    "syscw",
    "read_bytes",
    "write_bytes",
    "cancelled_write_bytes",
];

/// Why a pid could not be sampled this pass. Both variants are expected and
/// frequent; callers skip the pid and move on.
#[derive(Debug, Error)]
pub enum SampleError {
    /// The process exited (or denies access) between enumeration and read.
    #[error("process {pid} vanished before its records could be read: {source}")]
    Vanished {
        pid: u32,
        #[source]
        source: std::io::Error,
    },

    /// A record was readable but empty or not in the expected shape.
    #[error("process {pid} has a malformed {record} record: {reason}")]
    Malformed {
        pid: u32,
        record: &'static str,
        reason: String,
    },
}

impl SampleError {
    fn malformed(pid: u32, record: &'static str, reason: impl Into<String>) -> Self {
        SampleError::Malformed {
            pid,
            record,
            reason: reason.into(),
        }
    }
}

/// Cumulative I/O counters of one process, as exposed by its `io` record.
///
/// Non-decreasing within one process lifetime; a recycled pid restarts them
/// from zero, which the delta layer tolerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IoCounters {
    pub rchar: i64,
    pub wchar: i64,
    pub syscr: i64,
    pub syscw: i64,
    pub read_bytes: i64,
    pub write_bytes: i64,
    pub cancelled_write_bytes: i64,
}

/// One process's command name and I/O counters at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub pid: u32,
    pub command: String,
    pub counters: IoCounters,
    /// Start time in clock ticks since boot (`stat` field 22), read only
    /// when pid-reuse detection is enabled.
    pub start_time: Option<u64>,
}

/// Reads a full [`Sample`] for one enumerated process.
///
/// With `full_command` set, the command comes from the `cmdline` record,
/// falling back to the short `stat` name for kernel threads whose `cmdline`
/// is empty. With `detect_reuse` set, the process start time is read as
/// well.
pub fn read_sample(
    entry: &ProcEntry,
    full_command: bool,
    detect_reuse: bool,
) -> Result<Sample, SampleError> {
    let pid = entry.pid;

    let stat = read_record_capped(&entry.proc_path.join("stat"))
        .map_err(|source| SampleError::Vanished { pid, source })?;
    let mut command = short_name_from_stat(&stat)
        .ok_or_else(|| SampleError::malformed(pid, "stat", "command name not parenthesized"))?;

    if full_command {
        if let Some(cmdline) = read_cmdline(pid, &entry.proc_path)? {
            command = cmdline;
        }
    }

    let io = read_record_capped(&entry.proc_path.join("io"))
        .map_err(|source| SampleError::Vanished { pid, source })?;
    let counters = parse_io_counters(pid, &io)?;

    let start_time = if detect_reuse {
        Some(read_start_time(pid, &entry.proc_path)?)
    } else {
        None
    };

    Ok(Sample {
        pid,
        command,
        counters,
        start_time,
    })
}

/// Reads at most [`RECORD_READ_CAP`] bytes of one record. Proc records can
/// contain arbitrary bytes in the command field, so decoding is lossy.
fn read_record_capped(path: &Path) -> std::io::Result<String> {
    let file = File::open(path)?;
    let mut buf = Vec::with_capacity(RECORD_READ_CAP as usize);
    file.take(RECORD_READ_CAP).read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Extracts the command name from a `stat` record: the substring between the
/// first `(` and the first `)` after it. The name may itself contain spaces
/// or a stray parenthesis and is capped at [`COMMAND_MAX_CHARS`].
pub(crate) fn short_name_from_stat(stat: &str) -> Option<String> {
    let open = stat.find('(')?;
    let rest = &stat[open + 1..];
    let close = rest.find(')')?;
    Some(rest[..close].chars().take(COMMAND_MAX_CHARS).collect())
}

/// Reads the full command line from the `cmdline` record, NUL separators
/// replaced by single spaces. Returns `None` for a zero-length record (the
/// normal state for kernel threads), letting the caller fall back to the
/// short name.
fn read_cmdline(pid: u32, proc_path: &Path) -> Result<Option<String>, SampleError> {
    let raw = fs::read(proc_path.join("cmdline"))
        .map_err(|source| SampleError::Vanished { pid, source })?;

    let joined = raw
        .split(|&b| b == 0u8)
        .filter(|part| !part.is_empty())
        .map(|part| String::from_utf8_lossy(part).into_owned())
        .collect::<Vec<_>>()
        .join(" ");

    if joined.is_empty() {
        Ok(None)
    } else {
        Ok(Some(joined))
    }
}

/// Parses the seven `label: integer` lines of an `io` record.
///
/// The labels are matched positionally against [`IO_FIELD_LABELS`]; a short
/// record, an unexpected label or a bad integer is malformed.
pub fn parse_io_counters(pid: u32, record: &str) -> Result<IoCounters, SampleError> {
    if record.is_empty() {
        return Err(SampleError::malformed(pid, "io", "empty record"));
    }

    let mut values = [0i64; 7];
    let mut lines = record.lines();
    for (slot, label) in values.iter_mut().zip(IO_FIELD_LABELS) {
        let line = lines
            .next()
            .ok_or_else(|| SampleError::malformed(pid, "io", format!("missing `{label}` line")))?;
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| SampleError::malformed(pid, "io", format!("no `:` in `{line}`")))?;
        if name != label {
            return Err(SampleError::malformed(
                pid,
                "io",
                format!("expected `{label}`, found `{name}`"),
            ));
        }
        *slot = value.trim().parse().map_err(|_| {
            SampleError::malformed(pid, "io", format!("bad integer for `{label}`: `{value}`"))
        })?;
    }

    Ok(IoCounters {
        rchar: values[0],
        wchar: values[1],
        syscr: values[2],
        syscw: values[3],
        read_bytes: values[4],
        write_bytes: values[5],
        cancelled_write_bytes: values[6],
    })
}

/// Reads the process start time (`stat` field 22, clock ticks since boot),
/// used to tell a recycled pid from a surviving process.
pub fn read_start_time(pid: u32, proc_path: &Path) -> Result<u64, SampleError> {
    let content = fs::read_to_string(proc_path.join("stat"))
        .map_err(|source| SampleError::Vanished { pid, source })?;
    parse_start_time(pid, &content)
}

fn parse_start_time(pid: u32, stat: &str) -> Result<u64, SampleError> {
    // The command may contain spaces and parentheses; the numeric fields
    // resume after the last `)`.
    let after_comm = stat
        .rfind(')')
        .ok_or_else(|| SampleError::malformed(pid, "stat", "command name not parenthesized"))?
        + 1;
    let fields: Vec<&str> = stat[after_comm..].split_whitespace().collect();

    // starttime is the 20th field after the command (field 22 overall).
    fields
        .get(19)
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| SampleError::malformed(pid, "stat", "missing starttime field"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    const IO_RECORD: &str = "rchar: 500\nwchar: 0\nsyscr: 5\nsyscw: 0\nread_bytes: 0\nwrite_bytes: 0\ncancelled_write_bytes: 0\n";

    fn entry_for(dir: &Path, pid: u32) -> ProcEntry {
        ProcEntry {
            pid,
            proc_path: dir.join(pid.to_string()),
        }
    }

    fn write_proc_files(dir: &Path, pid: u32, comm: &str, io: &str) -> ProcEntry {
        let proc_path = dir.join(pid.to_string());
        fs::create_dir_all(&proc_path).unwrap();
        let stat = format!(
            "{pid} ({comm}) S 1 {pid} {pid} 0 -1 4194304 100 0 0 0 1000 500 0 0 20 0 1 0 12345 12345678 1234 18446744073709551615 4194304 4238788 0 0 0 0 0 0 0 0 0 0 17 1 0 0 0 0 0"
        );
        fs::write(proc_path.join("stat"), stat).unwrap();
        fs::write(proc_path.join("io"), io).unwrap();
        ProcEntry { pid, proc_path }
    }

    // -------------------------------------------------------------------------
    // Tests for short_name_from_stat
    // -------------------------------------------------------------------------

    #[test]
    fn test_short_name_plain() {
        let stat = "1234 (bash) S 1 1234 1234 0 -1";
        assert_eq!(short_name_from_stat(stat), Some("bash".to_string()));
    }

    #[test]
    fn test_short_name_with_spaces() {
        let stat = "77 (tmux: server) S 1 77 77 0 -1";
        assert_eq!(short_name_from_stat(stat), Some("tmux: server".to_string()));
    }

    #[test]
    fn test_short_name_stops_at_first_close_paren() {
        // A name like `((sd-pam))` is cut at the first `)`, matching the
        // bounded extraction the record format allows.
        let stat = "90 (((sd-pam))) S 1 90 90 0 -1";
        assert_eq!(short_name_from_stat(stat), Some("((sd-pam".to_string()));
    }

    #[test]
    fn test_short_name_missing_parens() {
        assert_eq!(short_name_from_stat("1234 bash S 1"), None);
        assert_eq!(short_name_from_stat(""), None);
        assert_eq!(short_name_from_stat("1234 (bash S 1"), None);
    }

    #[test]
    fn test_short_name_truncated_to_cap() {
        let long = "x".repeat(200);
        let stat = format!("5 ({long}) S 1");
        let name = short_name_from_stat(&stat).unwrap();
        assert_eq!(name.chars().count(), 63);
    }

    // -------------------------------------------------------------------------
    // Tests for parse_io_counters
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_io_counters_well_formed() {
        let record = "rchar: 323934931\nwchar: 323929600\nsyscr: 632687\nsyscw: 632675\nread_bytes: 12288\nwrite_bytes: 323932160\ncancelled_write_bytes: 4096\n";
        let counters = parse_io_counters(1, record).unwrap();
        assert_eq!(counters.rchar, 323934931);
        assert_eq!(counters.wchar, 323929600);
        assert_eq!(counters.syscr, 632687);
        assert_eq!(counters.syscw, 632675);
        assert_eq!(counters.read_bytes, 12288);
        assert_eq!(counters.write_bytes, 323932160);
        assert_eq!(counters.cancelled_write_bytes, 4096);
    }

    #[test]
    fn test_parse_io_counters_no_trailing_newline() {
        let record = "rchar: 1\nwchar: 2\nsyscr: 3\nsyscw: 4\nread_bytes: 5\nwrite_bytes: 6\ncancelled_write_bytes: 7";
        let counters = parse_io_counters(1, record).unwrap();
        assert_eq!(counters.cancelled_write_bytes, 7);
    }

    #[test]
    fn test_parse_io_counters_empty_record() {
        let err = parse_io_counters(9, "").unwrap_err();
        assert!(matches!(err, SampleError::Malformed { pid: 9, .. }));
    }

    #[test]
    fn test_parse_io_counters_truncated_record() {
        let record = "rchar: 1\nwchar: 2\n";
        assert!(parse_io_counters(9, record).is_err());
    }

    #[test]
    fn test_parse_io_counters_wrong_label_order() {
        let record = "wchar: 2\nrchar: 1\nsyscr: 3\nsyscw: 4\nread_bytes: 5\nwrite_bytes: 6\ncancelled_write_bytes: 7\n";
        assert!(parse_io_counters(9, record).is_err());
    }

    #[test]
    fn test_parse_io_counters_bad_integer() {
        let record = "rchar: lots\nwchar: 2\nsyscr: 3\nsyscw: 4\nread_bytes: 5\nwrite_bytes: 6\ncancelled_write_bytes: 7\n";
        assert!(parse_io_counters(9, record).is_err());
    }

    // -------------------------------------------------------------------------
    // Tests for parse_start_time
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_start_time() {
        let stat = "1234 (test_process) S 1 1234 1234 0 -1 4194304 100 0 0 0 1000 500 0 0 20 0 1 0 12345 12345678 1234";
        assert_eq!(parse_start_time(1234, stat).unwrap(), 12345);
    }

    #[test]
    fn test_parse_start_time_comm_with_parens_and_spaces() {
        let stat = "55 (evil ) name) S 1 55 55 0 -1 4194304 100 0 0 0 1000 500 0 0 20 0 1 0 777 12345678 1234";
        assert_eq!(parse_start_time(55, stat).unwrap(), 777);
    }

    #[test]
    fn test_parse_start_time_short_record() {
        let stat = "55 (x) S 1 55";
        assert!(parse_start_time(55, stat).is_err());
    }

    // -------------------------------------------------------------------------
    // Tests for read_sample
    // -------------------------------------------------------------------------

    #[test]
    fn test_read_sample_short_name() {
        let dir = tempdir().expect("Failed to create temp dir");
        let entry = write_proc_files(dir.path(), 100, "worker", IO_RECORD);

        let sample = read_sample(&entry, false, false).unwrap();
        assert_eq!(sample.pid, 100);
        assert_eq!(sample.command, "worker");
        assert_eq!(sample.counters.rchar, 500);
        assert_eq!(sample.counters.syscr, 5);
        assert_eq!(sample.start_time, None);
    }

    #[test]
    fn test_read_sample_full_command() {
        let dir = tempdir().expect("Failed to create temp dir");
        let entry = write_proc_files(dir.path(), 101, "worker", IO_RECORD);
        fs::write(entry.proc_path.join("cmdline"), b"/usr/bin/worker\0--jobs\04\0").unwrap();

        let sample = read_sample(&entry, true, false).unwrap();
        assert_eq!(sample.command, "/usr/bin/worker --jobs 4");
    }

    #[test]
    fn test_read_sample_empty_cmdline_falls_back_to_short_name() {
        let dir = tempdir().expect("Failed to create temp dir");
        let entry = write_proc_files(dir.path(), 102, "kswapd0", IO_RECORD);
        fs::write(entry.proc_path.join("cmdline"), b"").unwrap();

        let sample = read_sample(&entry, true, false).unwrap();
        assert_eq!(sample.command, "kswapd0");
    }

    #[test]
    fn test_read_sample_with_start_time() {
        let dir = tempdir().expect("Failed to create temp dir");
        let entry = write_proc_files(dir.path(), 103, "worker", IO_RECORD);

        let sample = read_sample(&entry, false, true).unwrap();
        assert_eq!(sample.start_time, Some(12345));
    }

    #[test]
    fn test_read_sample_vanished_process() {
        let dir = tempdir().expect("Failed to create temp dir");
        let entry = entry_for(dir.path(), 104);

        let err = read_sample(&entry, false, false).unwrap_err();
        assert!(matches!(err, SampleError::Vanished { pid: 104, .. }));
    }

    #[test]
    fn test_read_sample_empty_io_record() {
        let dir = tempdir().expect("Failed to create temp dir");
        let entry = write_proc_files(dir.path(), 105, "worker", "");

        let err = read_sample(&entry, false, false).unwrap_err();
        assert!(matches!(
            err,
            SampleError::Malformed {
                pid: 105,
                record: "io",
                ..
            }
        ));
    }

    #[test]
    fn test_read_sample_missing_io_record() {
        let dir = tempdir().expect("Failed to create temp dir");
        let proc_path: PathBuf = dir.path().join("106");
        fs::create_dir_all(&proc_path).unwrap();
        fs::write(proc_path.join("stat"), "106 (worker) S 1 106").unwrap();

        let err = read_sample(&entry_for(dir.path(), 106), false, false).unwrap_err();
        assert!(matches!(err, SampleError::Vanished { pid: 106, .. }));
    }
}
