pub mod game;

// ============================================================================
// Profiling Macros
// ============================================================================

/// Conditionally log messages based on a query counter when the perf_stats feature is enabled.
///
/// This macro logs a message every 100 queries. When the perf_stats feature is disabled,
/// this macro compiles to nothing - zero runtime cost.
///
/// # Example
/// ```ignore
/// profile_log!(self.queries_served, "Served {} path queries", self.queries_served);
/// ```
///
/// # Zero-Cost Abstraction
/// When compiled without the `perf_stats` feature, this expands to an empty block.
/// Even the arguments are not evaluated.
#[macro_export]
#[cfg(feature = "perf_stats")]
macro_rules! profile_log {
    ($count:expr, $($arg:tt)*) => {
        if $count % 100 == 0 {
            bevy::log::info!($($arg)*);
        }
    };
}

#[macro_export]
#[cfg(not(feature = "perf_stats"))]
macro_rules! profile_log {
    ($count:expr, $($arg:tt)*) => {};
}
