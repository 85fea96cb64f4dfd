//! Process discovery on the proc filesystem.
//!
//! Pids are published as all-digit directory names directly under the proc
//! root; everything else under the root is kernel metadata and is skipped.

use std::fs;
use std::path::{Path, PathBuf};

/// Process entry representing a directory under the proc root.
#[derive(Debug, Clone)]
pub struct ProcEntry {
    pub pid: u32,
    pub proc_path: PathBuf,
}

/// Lists the numeric entries under `root`: the process table snapshot at the
/// moment of the call, in no particular order.
///
/// An unreadable `root` fails the whole pass. Entries that other processes
/// race to remove after listing are the reader's problem, not ours.
pub fn collect_proc_entries(root: &Path, max: Option<usize>) -> std::io::Result<Vec<ProcEntry>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        let p = entry.path();
        let name = match p.file_name().and_then(|s| s.to_str()) {
            Some(v) => v,
            None => continue,
        };
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        let pid: u32 = match name.parse() {
            Ok(v) => v,
            Err(_) => continue,
        };
        out.push(ProcEntry { pid, proc_path: p });
        if let Some(maxp) = max {
            if out.len() >= maxp {
                break;
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_collect_proc_entries_filters_non_numeric() {
        let dir = tempdir().expect("Failed to create temp dir");
        for name in ["1", "42", "31337"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        for name in ["self", "cpuinfo", "12abc", "sys"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }

        let mut pids: Vec<u32> = collect_proc_entries(dir.path(), None)
            .unwrap()
            .iter()
            .map(|e| e.pid)
            .collect();
        pids.sort_unstable();
        assert_eq!(pids, vec![1, 42, 31337]);
    }

    #[test]
    fn test_collect_proc_entries_paths_point_into_root() {
        let dir = tempdir().expect("Failed to create temp dir");
        fs::create_dir(dir.path().join("7")).unwrap();

        let entries = collect_proc_entries(dir.path(), None).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].proc_path, dir.path().join("7"));
    }

    #[test]
    fn test_collect_proc_entries_respects_max() {
        let dir = tempdir().expect("Failed to create temp dir");
        for pid in 1..=10 {
            fs::create_dir(dir.path().join(pid.to_string())).unwrap();
        }

        let entries = collect_proc_entries(dir.path(), Some(3)).unwrap();
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn test_collect_proc_entries_missing_root_is_an_error() {
        let dir = tempdir().expect("Failed to create temp dir");
        let gone = dir.path().join("no-such-root");
        assert!(collect_proc_entries(&gone, None).is_err());
    }

    #[test]
    fn test_collect_proc_entries_skips_oversized_names() {
        let dir = tempdir().expect("Failed to create temp dir");
        // All digits but too large for a pid.
        fs::create_dir(dir.path().join("99999999999999999999")).unwrap();
        fs::create_dir(dir.path().join("8")).unwrap();

        let entries = collect_proc_entries(dir.path(), None).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].pid, 8);
    }
}
