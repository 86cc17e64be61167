//! Environment-sourced tuning for the bridge.
//!
//! All process-wide knobs are read once — at registration — into a
//! [`BridgeTuning`] value that is passed explicitly into every adapter.
//! Adapters never read the environment themselves.

use std::time::Duration;

/// Environment variable overriding the row-batch high-water mark.
pub const STREAM_HIGH_WATER_MARK_ENV: &str = "SQLBRIDGE_STREAM_HIGH_WATER_MARK";

/// Environment variable enabling verbose resolve/reject/chunk tracing.
pub const INTERNAL_DEBUG_ENV: &str = "SQLBRIDGE_INTERNAL_DEBUG";

/// Default number of rows accumulated before a batch is flushed.
pub const DEFAULT_STREAM_HIGH_WATER_MARK: usize = 8192;

/// Default settle-grace period observed after native shutdown.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Tuning knobs for the bridge adapters.
///
/// # Example
///
/// ```rust
/// use sqlbridge::BridgeTuning;
///
/// let tuning = BridgeTuning::from_env().with_high_water_mark(1024);
/// assert_eq!(tuning.high_water_mark, 1024);
/// ```
#[derive(Debug, Clone)]
pub struct BridgeTuning {
    /// Maximum rows per batch handed to the native writer.
    ///
    /// Batch boundaries carry no semantics for the consumer; this is a
    /// throughput/latency knob only.
    pub high_water_mark: usize,
    /// When `true`, every resolve/reject/chunk transition is traced.
    /// Has no effect on behavior, only on diagnostic output.
    pub debug_trace: bool,
    /// How long [`shutdown_interface`](crate::shutdown_interface) waits
    /// after the native teardown call so in-flight terminal calls can land.
    pub shutdown_grace: Duration,
}

impl Default for BridgeTuning {
    fn default() -> Self {
        Self {
            high_water_mark: DEFAULT_STREAM_HIGH_WATER_MARK,
            debug_trace: false,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

impl BridgeTuning {
    /// Read tuning from the process environment.
    ///
    /// Absent or non-numeric values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Override the row-batch high-water mark (clamped to at least 1).
    pub fn with_high_water_mark(mut self, rows: usize) -> Self {
        self.high_water_mark = rows.max(1);
        self
    }

    /// Override the post-shutdown settle-grace period.
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Enable or disable verbose transition tracing.
    pub fn with_debug_trace(mut self, enabled: bool) -> Self {
        self.debug_trace = enabled;
        self
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let high_water_mark = lookup(STREAM_HIGH_WATER_MARK_ENV)
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_STREAM_HIGH_WATER_MARK)
            .max(1);

        let debug_trace = lookup(INTERNAL_DEBUG_ENV)
            .map(|raw| {
                let raw = raw.trim();
                !raw.is_empty() && raw != "0" && !raw.eq_ignore_ascii_case("false")
            })
            .unwrap_or(false);

        Self {
            high_water_mark,
            debug_trace,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn defaults_when_unset() {
        let tuning = BridgeTuning::from_lookup(env(&[]));
        assert_eq!(tuning.high_water_mark, DEFAULT_STREAM_HIGH_WATER_MARK);
        assert!(!tuning.debug_trace);
        assert_eq!(tuning.shutdown_grace, DEFAULT_SHUTDOWN_GRACE);
    }

    #[test]
    fn high_water_mark_override() {
        let tuning = BridgeTuning::from_lookup(env(&[(STREAM_HIGH_WATER_MARK_ENV, "256")]));
        assert_eq!(tuning.high_water_mark, 256);
    }

    #[test]
    fn non_numeric_high_water_mark_falls_back() {
        let tuning = BridgeTuning::from_lookup(env(&[(STREAM_HIGH_WATER_MARK_ENV, "plenty")]));
        assert_eq!(tuning.high_water_mark, DEFAULT_STREAM_HIGH_WATER_MARK);
    }

    #[test]
    fn zero_high_water_mark_is_clamped() {
        let tuning = BridgeTuning::from_lookup(env(&[(STREAM_HIGH_WATER_MARK_ENV, "0")]));
        assert_eq!(tuning.high_water_mark, 1);
    }

    #[test]
    fn debug_flag_parsing() {
        assert!(BridgeTuning::from_lookup(env(&[(INTERNAL_DEBUG_ENV, "1")])).debug_trace);
        assert!(BridgeTuning::from_lookup(env(&[(INTERNAL_DEBUG_ENV, "true")])).debug_trace);
        assert!(!BridgeTuning::from_lookup(env(&[(INTERNAL_DEBUG_ENV, "")])).debug_trace);
        assert!(!BridgeTuning::from_lookup(env(&[(INTERNAL_DEBUG_ENV, "0")])).debug_trace);
        assert!(!BridgeTuning::from_lookup(env(&[(INTERNAL_DEBUG_ENV, "false")])).debug_trace);
    }

    #[test]
    fn builder_overrides() {
        let tuning = BridgeTuning::default()
            .with_high_water_mark(0)
            .with_shutdown_grace(Duration::from_millis(10))
            .with_debug_trace(true);
        assert_eq!(tuning.high_water_mark, 1);
        assert_eq!(tuning.shutdown_grace, Duration::from_millis(10));
        assert!(tuning.debug_trace);
    }
}
