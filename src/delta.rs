//! Delta computation and unit scaling between two samples of one pid.

use crate::process::sample::Sample;

/// Scale applied to the displayed delta columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unit {
    #[default]
    Bytes,
    Kibibytes,
    Mebibytes,
}

impl Unit {
    /// Arithmetic right shift applied to every delta field.
    pub fn shift(self) -> u32 {
        match self {
            Unit::Bytes => 0,
            Unit::Kibibytes => 10,
            Unit::Mebibytes => 20,
        }
    }

    /// Header labels for the three byte-metric columns.
    pub fn byte_labels(self) -> [&'static str; 3] {
        match self {
            Unit::Bytes => ["rbytes", "wbytes", "cwbytes"],
            Unit::Kibibytes => ["rkb", "wkb", "cwkb"],
            Unit::Mebibytes => ["rmb", "wmb", "cwmb"],
        }
    }
}

/// Per-field change of one pid across one polling interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IoDelta {
    pub rchar: i64,
    pub wchar: i64,
    pub syscr: i64,
    pub syscw: i64,
    pub read_bytes: i64,
    pub write_bytes: i64,
    pub cancelled_write_bytes: i64,
}

impl IoDelta {
    /// Raw field-by-field difference against the prior sample.
    ///
    /// A pid seen for the first time reports zero activity, not its
    /// cumulative totals. A recycled pid whose counters restarted below the
    /// stale prior produces negative fields; they pass through unclamped.
    pub fn between(new: &Sample, prior: Option<&Sample>) -> Self {
        let Some(prior) = prior else {
            return IoDelta::default();
        };
        let n = &new.counters;
        let p = &prior.counters;
        IoDelta {
            rchar: n.rchar - p.rchar,
            wchar: n.wchar - p.wchar,
            syscr: n.syscr - p.syscr,
            syscw: n.syscw - p.syscw,
            read_bytes: n.read_bytes - p.read_bytes,
            write_bytes: n.write_bytes - p.write_bytes,
            cancelled_write_bytes: n.cancelled_write_bytes - p.cancelled_write_bytes,
        }
    }

    /// Applies `unit` to every field. `>>` on `i64` is an arithmetic shift:
    /// negative fields round toward negative infinity, so a counter
    /// regression never scales away to zero.
    pub fn scaled(self, unit: Unit) -> Self {
        let s = unit.shift();
        IoDelta {
            rchar: self.rchar >> s,
            wchar: self.wchar >> s,
            syscr: self.syscr >> s,
            syscw: self.syscw >> s,
            read_bytes: self.read_bytes >> s,
            write_bytes: self.write_bytes >> s,
            cancelled_write_bytes: self.cancelled_write_bytes >> s,
        }
    }

    /// True when every field is zero; with idle hiding enabled such a row
    /// is suppressed.
    pub fn is_idle(self) -> bool {
        self == IoDelta::default()
    }
}
