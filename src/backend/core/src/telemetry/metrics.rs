//! Metric names and descriptions.
//!
//! Counters are emitted through the `metrics` facade. Without an installed
//! recorder they are no-ops, so library callers pay nothing unless their
//! binary wires up an exporter.

use metrics::describe_counter;

/// Jobs resolved by the schedule handler, labelled by `job` and `mode`.
pub const SCHEDULES_RESOLVED_TOTAL: &str = "cadence_schedules_resolved_total";

/// Random macros expanded into concrete cron expressions, labelled by `macro`.
pub const MACROS_EXPANDED_TOTAL: &str = "cadence_macros_expanded_total";

/// Errors raised, labelled by `category`.
pub const ERRORS_TOTAL: &str = "cadence_errors_total";

/// Register descriptions for every metric this crate emits.
///
/// Call once after installing a recorder.
pub fn describe_metrics() {
    describe_counter!(
        SCHEDULES_RESOLVED_TOTAL,
        "Total number of schedule jobs resolved"
    );
    describe_counter!(
        MACROS_EXPANDED_TOTAL,
        "Total number of random schedule macros expanded"
    );
    describe_counter!(ERRORS_TOTAL, "Total number of errors by category");
}
