//! Schedule handler: resolves every job a Schedule declares.
//!
//! For each declared job the handler resolves its schedule expression and
//! merges its resources against the schedule's template and the global
//! defaults. It keeps no state between calls apart from the defaults snapshot
//! it was built with, so one handler can serve any number of threads.

pub mod object;

pub use object::{
    EffectiveSchedule, JobKind, JobSchedule, ObjectMeta, Schedule, ScheduleSpec, ScheduleStatus,
};

use std::fmt;
use std::sync::Arc;

use metrics::counter;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::resources::{
    merge_with_sources, AxisSource, DefaultsStore, GlobalDefaults, ResourceRequirements,
};
use crate::schedule::{CronExpression, ObjectIdentity, ScheduleExpression, ScheduleResolver};
use crate::telemetry::metrics::SCHEDULES_RESOLVED_TOTAL;

/// How a job's cron expression was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMode {
    /// A literal expression, passed through.
    Literal,
    /// Expanded from a random macro on this call.
    Generated,
    /// Reused from the object's recorded effective schedules.
    Recorded,
}

impl ResolutionMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Literal => "literal",
            Self::Generated => "generated",
            Self::Recorded => "recorded",
        }
    }
}

impl fmt::Display for ResolutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One job, fully resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedJob {
    pub kind: JobKind,
    pub original: ScheduleExpression,
    pub schedule: CronExpression,
    pub mode: ResolutionMode,
    pub resources: ResourceRequirements,
    pub resource_sources: Vec<AxisSource>,
    pub concurrent_runs_allowed: bool,
}

/// Everything the reconciler needs to write CronJobs for one Schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSchedule {
    pub identity: ObjectIdentity,
    pub jobs: Vec<ResolvedJob>,
    /// One record per job declared with a random macro.
    pub effective_schedules: Vec<EffectiveSchedule>,
}

impl ResolvedSchedule {
    pub fn job(&self, kind: JobKind) -> Option<&ResolvedJob> {
        self.jobs.iter().find(|job| job.kind == kind)
    }

    /// Status to persist so later passes reuse the same expressions.
    pub fn status(&self) -> ScheduleStatus {
        ScheduleStatus {
            effective_schedules: self.effective_schedules.clone(),
        }
    }
}

/// Resolves Schedule objects against a fixed set of global defaults.
#[derive(Debug, Clone)]
pub struct ScheduleHandler {
    defaults: Arc<GlobalDefaults>,
    resolver: ScheduleResolver,
}

impl ScheduleHandler {
    pub fn new(defaults: Arc<GlobalDefaults>) -> Self {
        Self {
            defaults,
            resolver: ScheduleResolver::default(),
        }
    }

    /// Build a handler over the store's current snapshot.
    pub fn from_store(store: &DefaultsStore) -> Self {
        Self::new(store.snapshot())
    }

    pub fn with_resolver(mut self, resolver: ScheduleResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn defaults(&self) -> &GlobalDefaults {
        &self.defaults
    }

    #[instrument(
        skip(self, schedule),
        fields(namespace = %schedule.metadata.namespace, name = %schedule.metadata.name)
    )]
    pub fn handle(&self, schedule: &Schedule) -> ResolvedSchedule {
        let identity = schedule.identity();
        let template = &schedule.spec.resource_requirements_template;

        let mut jobs = Vec::new();
        let mut effective_schedules = Vec::new();

        for (kind, job) in schedule.spec.jobs() {
            let (cron, mode) = self.resolve_schedule(schedule, &identity, kind, &job.schedule);

            if let Some(random) = job.schedule.random_macro() {
                effective_schedules.push(EffectiveSchedule {
                    job_type: kind,
                    original_schedule: random.as_str().to_string(),
                    generated_schedule: cron.clone(),
                });
            }

            let (resources, resource_sources) =
                merge_with_sources(&job.resources, template, self.defaults.requirements());

            debug!(
                job = kind.as_str(),
                original = job.schedule.as_str(),
                cron = %cron,
                mode = mode.as_str(),
                resources = ?resource_sources,
                "Resolved job"
            );
            counter!(SCHEDULES_RESOLVED_TOTAL, "job" => kind.as_str(), "mode" => mode.as_str())
                .increment(1);

            jobs.push(ResolvedJob {
                kind,
                original: job.schedule.clone(),
                schedule: cron,
                mode,
                resources,
                resource_sources,
                concurrent_runs_allowed: job.concurrent_runs_allowed,
            });
        }

        ResolvedSchedule {
            identity,
            jobs,
            effective_schedules,
        }
    }

    fn resolve_schedule(
        &self,
        schedule: &Schedule,
        identity: &ObjectIdentity,
        kind: JobKind,
        expr: &ScheduleExpression,
    ) -> (CronExpression, ResolutionMode) {
        let Some(random) = expr.random_macro() else {
            return (self.resolver.resolve(identity, expr), ResolutionMode::Literal);
        };

        match schedule.recorded_schedule(kind, random.as_str()) {
            Some(recorded) => (recorded.clone(), ResolutionMode::Recorded),
            None => (self.resolver.resolve(identity, expr), ResolutionMode::Generated),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{MergeSource, Quantity, ResourceAxis};

    fn q(s: &str) -> Quantity {
        s.parse().unwrap()
    }

    #[test]
    fn test_handler_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ScheduleHandler>();
        assert_send_sync::<DefaultsStore>();
    }

    #[test]
    fn test_only_declared_jobs_are_resolved() {
        let schedule = Schedule::new(
            "k8up-system",
            "my-scheduled-backup",
            ScheduleSpec {
                backup: Some(JobSchedule::new("@daily-random")),
                prune: Some(JobSchedule::new("0 4 * * *")),
                ..Default::default()
            },
        );

        let resolved = ScheduleHandler::new(Arc::new(GlobalDefaults::none())).handle(&schedule);

        assert_eq!(resolved.jobs.len(), 2);
        assert_eq!(resolved.job(JobKind::Backup).unwrap().schedule, "2 14 * * *");
        assert_eq!(resolved.job(JobKind::Backup).unwrap().mode, ResolutionMode::Generated);
        assert_eq!(resolved.job(JobKind::Prune).unwrap().schedule, "0 4 * * *");
        assert_eq!(resolved.job(JobKind::Prune).unwrap().mode, ResolutionMode::Literal);
        assert!(resolved.job(JobKind::Check).is_none());

        assert_eq!(resolved.effective_schedules.len(), 1);
        assert_eq!(resolved.effective_schedules[0].job_type, JobKind::Backup);
    }

    #[test]
    fn test_resources_use_template_and_defaults() {
        let defaults = GlobalDefaults::from_requirements(
            ResourceRequirements::default().with(ResourceAxis::RequestsMemory, q("10Mi")),
        );
        let schedule = Schedule::new(
            "default",
            "schedule-test",
            ScheduleSpec {
                resource_requirements_template: ResourceRequirements::default()
                    .with(ResourceAxis::LimitsCpu, q("200m")),
                check: Some(JobSchedule::new("@weekly-random")),
                ..Default::default()
            },
        );

        let resolved = ScheduleHandler::new(Arc::new(defaults)).handle(&schedule);
        let check = resolved.job(JobKind::Check).unwrap();

        assert_eq!(check.resources.get(ResourceAxis::LimitsCpu), Some(&q("200m")));
        assert_eq!(check.resources.get(ResourceAxis::RequestsMemory), Some(&q("10Mi")));
        assert_eq!(
            check.resource_sources.iter().map(|s| s.source).collect::<Vec<_>>(),
            vec![MergeSource::Template, MergeSource::Global]
        );
    }
}
