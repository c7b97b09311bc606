//! Memory and timing profiling utilities
//!
//! - Memory: Reads RSS (Resident Set Size) from /proc/self/status (0 elsewhere)
//! - Timing: Uses std::time::Instant, reported at debug level

use log::debug;
use std::fs;
use std::time::Instant;

/// Get current RSS (Resident Set Size) in bytes from /proc/self/status
pub fn get_rss_bytes() -> u64 {
    if let Ok(status) = fs::read_to_string("/proc/self/status") {
        for line in status.lines() {
            if let Some(rest) = line.strip_prefix("VmRSS:") {
                // Format: "VmRSS:    123456 kB"
                if let Some(Ok(kb)) = rest.split_whitespace().next().map(str::parse::<u64>) {
                    return kb * 1024;
                }
            }
        }
    }
    0
}

/// Get current RSS in megabytes
pub fn get_rss_mb() -> f64 {
    get_rss_bytes() as f64 / (1024.0 * 1024.0)
}

/// Memory checkpoint that returns the value for comparison
pub fn checkpoint(label: &str) -> f64 {
    let rss = get_rss_mb();
    debug!("MEMPROF [{:.2} MB]: {}", rss, label);
    rss
}

/// Calculate delta from a previous checkpoint
pub fn delta(label: &str, previous: f64) -> f64 {
    let current = get_rss_mb();
    debug!(
        "MEMPROF [{:.2} MB] (delta: {:+.2} MB): {}",
        current,
        current - previous,
        label
    );
    current
}

/// Start a new timing checkpoint, returns the Instant
pub fn time_start(label: &str) -> Instant {
    debug!("TIMEPROF: {} ...", label);
    Instant::now()
}

/// Print elapsed time from a previous checkpoint, returns new Instant for chaining
pub fn time_elapsed(label: &str, start: Instant) -> Instant {
    debug!(
        "TIMEPROF: {} [{:.3}ms]",
        label,
        start.elapsed().as_secs_f64() * 1000.0
    );
    Instant::now()
}
