//! Schedule resolution: macros in, concrete cron expressions out.

use metrics::counter;
use tracing::trace;

use super::{CronExpression, JitterScheme, JitterSlots, ObjectIdentity, RandomMacro, ScheduleExpression};
use crate::telemetry::metrics::MACROS_EXPANDED_TOTAL;

/// Expands random macros with jitter derived from the object identity.
///
/// Pure: no clock, no randomness, no shared state. Literal expressions are
/// returned unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleResolver {
    scheme: JitterScheme,
}

impl ScheduleResolver {
    pub fn new(scheme: JitterScheme) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> JitterScheme {
        self.scheme
    }

    pub fn resolve(&self, identity: &ObjectIdentity, expr: &ScheduleExpression) -> CronExpression {
        match expr {
            ScheduleExpression::Literal(literal) => CronExpression::new(literal.as_str()),
            ScheduleExpression::Random(random) => {
                let slots = self.scheme.derive(identity);
                let cron = expand(*random, &slots);
                trace!(
                    identity = %identity,
                    schedule = random.as_str(),
                    scheme = self.scheme.as_str(),
                    cron = %cron,
                    "Expanded random schedule"
                );
                counter!(MACROS_EXPANDED_TOTAL, "macro" => random.as_str()).increment(1);
                cron
            }
        }
    }

    pub fn resolve_str(&self, identity: &ObjectIdentity, expr: &str) -> CronExpression {
        self.resolve(identity, &ScheduleExpression::parse(expr))
    }
}

/// Resolve with the default scheme.
pub fn resolve(identity: &ObjectIdentity, expr: &ScheduleExpression) -> CronExpression {
    ScheduleResolver::default().resolve(identity, expr)
}

// Fields: minute hour day-of-month month day-of-week.
fn expand(random: RandomMacro, slots: &JitterSlots) -> CronExpression {
    let JitterSlots { minute, hour, day_of_week, day_of_month } = *slots;
    let cron = match random {
        RandomMacro::Hourly => format!("{} * * * *", minute),
        RandomMacro::Daily => format!("{} {} * * *", minute, hour),
        RandomMacro::Weekly => format!("{} {} * * {}", minute, hour, day_of_week),
        RandomMacro::Monthly => format!("{} {} {} * *", minute, hour, day_of_month),
    };
    CronExpression::new(cron)
}
