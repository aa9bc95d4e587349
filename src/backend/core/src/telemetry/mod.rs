//! Telemetry: structured logging and metric descriptions.

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    describe_metrics, ERRORS_TOTAL, MACROS_EXPANDED_TOTAL, SCHEDULES_RESOLVED_TOTAL,
};
