#![allow(clippy::result_large_err)]
//! # Cadence Core
//!
//! Deterministic schedule and resource resolution for backup schedules.
//!
//! ## Architecture
//!
//! - **Schedule Resolver**: expands `@hourly-random` style macros into concrete
//!   cron expressions with jitter derived from the object identity
//! - **Resource Merge Engine**: resolves limits and requests per axis from the
//!   job, the schedule template and the global defaults
//! - **Schedule Handler**: applies both to every job a Schedule declares
//! - **Config**: environment and file configuration, validated at startup
//! - **Telemetry**: structured logging and metric descriptions

pub mod config;
pub mod error;
pub mod handler;
pub mod resources;
pub mod schedule;
pub mod telemetry;

pub use error::{CadenceError, ErrorCode, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, GlobalResourceConfig};
    pub use crate::error::{CadenceError, ErrorCode, Result};
    pub use crate::handler::{
        EffectiveSchedule, JobKind, JobSchedule, ResolutionMode, ResolvedJob, ResolvedSchedule,
        Schedule, ScheduleHandler, ScheduleSpec, ScheduleStatus,
    };
    pub use crate::resources::{
        merge, merge_with_sources, AxisSource, DefaultsStore, GlobalDefaults, MergeSource,
        Quantity, QuantityError, ResourceAxis, ResourceList, ResourceRequirements,
    };
    pub use crate::schedule::{
        CronExpression, JitterScheme, JitterSlots, ObjectIdentity, RandomMacro,
        ScheduleExpression, ScheduleResolver,
    };
}
