//! Check command implementation.
//!
//! Validates proc filesystem access and kernel I/O accounting support.

use anyhow::Result;

use crate::config::{validate_effective_config, Config};
use crate::process::{collect_proc_entries, parse_io_counters};

/// Validates system requirements and configuration.
pub fn command_check(proc: bool, io: bool, all: bool, config: &Config) -> Result<()> {
    println!("procio - System Check");
    println!("=====================");

    let mut all_ok = true;
    let root = config.effective_proc_root();

    if proc || all {
        println!("\nChecking proc filesystem...");
        match collect_proc_entries(&root, Some(5)) {
            Ok(entries) if !entries.is_empty() => {
                println!("   ✅ Can list process entries under {}", root.display());
            }
            Ok(_) => {
                println!("   ❌ No process entries under {}", root.display());
                all_ok = false;
            }
            Err(e) => {
                println!("   ❌ Cannot list {}: {}", root.display(), e);
                all_ok = false;
            }
        }
    }

    if io || all {
        println!("\nChecking I/O accounting records...");
        let pid = std::process::id();
        let io_path = root.join(pid.to_string()).join("io");
        match std::fs::read_to_string(&io_path) {
            Ok(content) => match parse_io_counters(pid, &content) {
                Ok(counters) => {
                    println!(
                        "   ✅ Parsed own record: rchar={}, wchar={}",
                        counters.rchar, counters.wchar
                    );
                }
                Err(e) => {
                    println!("   ❌ Own record unparseable: {}", e);
                    all_ok = false;
                }
            },
            Err(e) => {
                println!("   ❌ Cannot read {}: {}", io_path.display(), e);
                println!("      The kernel may have been built without task I/O accounting");
                all_ok = false;
            }
        }
    }

    println!("\nChecking configuration...");
    match validate_effective_config(config) {
        Ok(_) => {
            println!("   ✅ Configuration is valid");
        }
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }

    println!("\nSummary:");
    if all_ok {
        println!("   ✅ All checks passed");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review warnings");
        std::process::exit(1);
    }
}
