//! Logging facilities for Horizon Shortcuts.
//!
//! Horizon Shortcuts uses the `tracing` crate for instrumentation. The
//! library never installs a subscriber; to see logs, install one in your
//! application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_shortcuts=debug")
//!         .init();
//! }
//! ```
//!
//! Every subsystem logs under its own target (see [`targets`]), so chain
//! building can be traced without drowning in hook dispatch noise.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Front crate target.
    pub const CORE: &str = "horizon_shortcuts";
    /// Chain-building state machine target.
    pub const ENGINE: &str = "horizon_shortcuts::engine";
    /// Match/trigger resolver target.
    pub const RESOLVER: &str = "horizon_shortcuts::resolver";
    /// Mutation gateway target.
    pub const MUTATION: &str = "horizon_shortcuts::mutation";
    /// Hook channel target.
    pub const SIGNAL: &str = "horizon_shortcuts_core::signal";
    /// Performance spans.
    pub const PERF: &str = "horizon_shortcuts::perf";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Macros for common tracing patterns.
///
/// These are thin wrappers around the `tracing` macros with a consistent
/// target.
#[macro_export]
macro_rules! shortcuts_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}

#[macro_export]
macro_rules! shortcuts_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}

#[macro_export]
macro_rules! shortcuts_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        // Just ensure it doesn't panic with a subscriber installed
        let _span = PerfSpan::new("test_operation");
        shortcuts_debug!(operation = "test_operation", "inside perf span");
    }

    #[test]
    fn test_targets_share_prefix() {
        for target in [targets::ENGINE, targets::RESOLVER, targets::MUTATION, targets::PERF] {
            assert!(target.starts_with(targets::CORE));
        }
    }
}
