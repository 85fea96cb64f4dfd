//! Fixed-width table output for scan passes.
//!
//! Rows are written to an injected writer so the binary can hand in locked
//! stdout while tests capture a buffer.

use std::io::{self, Write};

use crate::delta::{IoDelta, Unit};

/// Writes the column header preceding one pass's rows. The three
/// byte-metric labels follow the active unit scale.
pub fn write_header(out: &mut impl Write, unit: Unit) -> io::Result<()> {
    let [rb, wb, cwb] = unit.byte_labels();
    writeln!(
        out,
        "{:>5} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {}",
        "pid", "rchar", "wchar", "syscr", "syscw", rb, wb, cwb, "command"
    )
}

/// Writes one process row: pid, the seven scaled deltas, and the command.
pub fn write_row(out: &mut impl Write, pid: u32, delta: &IoDelta, command: &str) -> io::Result<()> {
    writeln!(
        out,
        "{:>5} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {}",
        pid,
        delta.rchar,
        delta.wchar,
        delta.syscr,
        delta.syscw,
        delta.read_bytes,
        delta.write_bytes,
        delta.cancelled_write_bytes,
        command
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_header(unit: Unit) -> String {
        let mut buf = Vec::new();
        write_header(&mut buf, unit).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_header_labels_per_unit() {
        assert_eq!(
            render_header(Unit::Bytes),
            "  pid    rchar    wchar    syscr    syscw   rbytes   wbytes  cwbytes command\n"
        );
        assert!(render_header(Unit::Kibibytes).contains("  rkb"));
        assert!(render_header(Unit::Mebibytes).contains("  rmb"));
    }

    #[test]
    fn test_row_is_space_padded() {
        let delta = IoDelta {
            rchar: 1000,
            syscr: 3,
            ..IoDelta::default()
        };
        let mut buf = Vec::new();
        write_row(&mut buf, 100, &delta, "worker").unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "  100     1000        0        3        0        0        0        0 worker\n"
        );
    }

    #[test]
    fn test_row_negative_values_render() {
        let delta = IoDelta {
            rchar: -9800,
            ..IoDelta::default()
        };
        let mut buf = Vec::new();
        write_row(&mut buf, 42, &delta, "reborn").unwrap();
        let line = String::from_utf8(buf).unwrap();
        assert!(line.contains("-9800"));
    }

    #[test]
    fn test_wide_fields_overflow_column_without_truncation() {
        let delta = IoDelta {
            rchar: 123_456_789_012,
            ..IoDelta::default()
        };
        let mut buf = Vec::new();
        write_row(&mut buf, 1, &delta, "hog").unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("123456789012"));
    }
}
