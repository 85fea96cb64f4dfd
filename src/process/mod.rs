//! Process-related modules for discovery and sampling.
//!
//! This module provides:
//! - `scanner`: pid enumeration over the proc root
//! - `sample`: per-process command and I/O counter acquisition

pub mod sample;
pub mod scanner;

// Re-export commonly used types
pub use sample::{parse_io_counters, read_sample, IoCounters, Sample, SampleError};
pub use scanner::{collect_proc_entries, ProcEntry};
