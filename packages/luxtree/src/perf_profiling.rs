//! Frame profiling for the particle update.
//!
//! Per-group update timings are logged at debug level, and instance buffer
//! sizes are sampled every few seconds so a buffer that reallocates mid-run
//! shows up in the log. Off unless `set_profiling_enabled(true)` is called.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

/// Global flag to enable/disable performance profiling.
static PROFILING_ENABLED: AtomicBool = AtomicBool::new(false);

/// Frame counter for periodic logging (every N frames).
static FRAME_COUNTER: AtomicU64 = AtomicU64::new(0);

/// How often to log buffer stats (every N frames).
const STATS_LOG_INTERVAL: u64 = 300; // ~5 seconds at 60fps

/// Check if profiling is currently enabled.
pub fn is_profiling_enabled() -> bool {
    PROFILING_ENABLED.load(Ordering::Relaxed)
}

/// Enable or disable performance profiling.
pub fn set_profiling_enabled(enabled: bool) {
    PROFILING_ENABLED.store(enabled, Ordering::Relaxed);
    if enabled {
        log::info!("Performance profiling ENABLED");
    } else {
        log::info!("Performance profiling DISABLED");
    }
}

/// Increment frame counter and return true if we should log this frame.
pub fn should_log_stats() -> bool {
    if !is_profiling_enabled() {
        return false;
    }
    let frame = FRAME_COUNTER.fetch_add(1, Ordering::Relaxed);
    frame % STATS_LOG_INTERVAL == 0
}

/// Restart the sampling cadence for a freshly built scene.
pub fn reset_frame_counter() {
    FRAME_COUNTER.store(0, Ordering::Relaxed);
}

/// Run `f`, logging how long it took when profiling is on.
pub fn timed<T, F: FnOnce() -> T>(label: &str, f: F) -> T {
    if is_profiling_enabled() {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();
        log::debug!("[PERF] {}: {:.3}ms", label, elapsed.as_secs_f64() * 1000.0);
        result
    } else {
        f()
    }
}

/// Per-group instance buffer sizes, sampled periodically.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BufferStats {
    /// `(group name, particle count, buffer capacity)`; capacity is 0 when detached.
    pub groups: Vec<(&'static str, usize, usize)>,
    pub active_particles: usize,
}

impl BufferStats {
    /// Log the current buffer sizes.
    pub fn log(&self, frame: u64) {
        let groups = self
            .groups
            .iter()
            .map(|(name, count, capacity)| format!("{}={}/{}", name, count, capacity))
            .collect::<Vec<_>>()
            .join(", ");
        log::info!(
            "[PERF] Frame {} Buffers: {} (active particles: {})",
            frame,
            groups,
            self.active_particles
        );
    }

    /// Check whether any buffer changed size since `prev`.
    /// Buffers are sized once at attach time, so any change points at a leak.
    pub fn check_growth(&self, prev: &BufferStats) -> Option<String> {
        let warnings = self
            .groups
            .iter()
            .zip(&prev.groups)
            .filter(|((name, _, cap), (prev_name, _, prev_cap))| {
                name == prev_name && *prev_cap > 0 && cap != prev_cap
            })
            .map(|((name, _, cap), (_, _, prev_cap))| format!("{}: {} -> {}", name, prev_cap, cap))
            .collect::<Vec<_>>();

        if warnings.is_empty() {
            None
        } else {
            Some(format!("[PERF WARNING] Buffers resized: {}", warnings.join(", ")))
        }
    }
}

/// Macro to easily time a block of code.
/// Usage: `perf_time!("label", { expensive_operation() })`
#[macro_export]
macro_rules! perf_time {
    ($label:expr, $body:expr) => {
        $crate::perf_profiling::timed($label, || $body)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_returns_value() {
        assert_eq!(timed("answer", || 42), 42);
        assert_eq!(crate::perf_time!("sum", { 40 + 2 }), 42);
    }

    #[test]
    fn test_growth_detection() {
        let prev = BufferStats {
            groups: vec![("foliage", 10, 10), ("hearts", 5, 0)],
            active_particles: 15,
        };
        let same = prev.clone();
        assert!(same.check_growth(&prev).is_none());

        let grown = BufferStats {
            groups: vec![("foliage", 10, 20), ("hearts", 5, 5)],
            active_particles: 15,
        };
        let warning = grown.check_growth(&prev).unwrap();
        assert!(warning.contains("foliage: 10 -> 20"));
        // Attaching a previously detached buffer is not growth.
        assert!(!warning.contains("hearts"));
    }
}
