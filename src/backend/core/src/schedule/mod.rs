//! Schedule expressions and deterministic jitter.
//!
//! A schedule written as `@daily-random` is expanded into a concrete cron
//! expression whose minute and hour are derived from the object's identity.
//! The same object always resolves to the same expression, and many objects
//! spread across the day instead of all firing at midnight.

mod cooked;
pub mod expression;
pub mod jitter;
pub mod resolver;
mod source;

pub use expression::{CronExpression, ObjectIdentity, RandomMacro, ScheduleExpression};
pub use jitter::{JitterScheme, JitterSlots};
pub use resolver::{resolve, ScheduleResolver};
