//! Tests for the schedule handler.
//!
//! Tests cover:
//! - Resolving a manifest end to end
//! - Reuse of recorded effective schedules
//! - Concurrent use of one handler
//! - Swapping global defaults between passes

use std::sync::Arc;
use std::thread;

use cadence_core::config::Config;
use cadence_core::handler::{
    EffectiveSchedule, JobKind, JobSchedule, ResolutionMode, Schedule, ScheduleHandler,
    ScheduleSpec, ScheduleStatus,
};
use cadence_core::resources::{
    DefaultsStore, GlobalDefaults, MergeSource, Quantity, ResourceAxis, ResourceRequirements,
};
use cadence_core::schedule::CronExpression;

const MANIFEST: &str = r#"
apiVersion: k8up.io/v1
kind: Schedule
metadata:
  name: my-scheduled-backup
  namespace: k8up-system
spec:
  resourceRequirementsTemplate:
    limits:
      cpu: 200m
    requests:
      cpu: 100m
  backup:
    schedule: '@daily-random'
    resources:
      requests:
        cpu: 50m
  check:
    schedule: '@weekly-random'
  prune:
    schedule: '@monthly-random'
    concurrentRunsAllowed: true
  archive:
    schedule: '15 2 * * *'
"#;

fn q(s: &str) -> Quantity {
    s.parse().unwrap()
}

fn handler_with(env: &[(&str, &str)]) -> ScheduleHandler {
    let config = Config::from_env_map(env.iter().copied()).unwrap();
    let defaults = config.validate_syntax().unwrap();
    ScheduleHandler::new(Arc::new(defaults))
}

#[test]
fn test_manifest_end_to_end() {
    let schedule = Schedule::from_yaml(MANIFEST).unwrap();
    let handler = handler_with(&[("BACKUP_GLOBAL_MEMORY_REQUEST", "10Mi")]);

    let resolved = handler.handle(&schedule);
    assert_eq!(resolved.identity.as_str(), "k8up-system/my-scheduled-backup");

    let schedules: Vec<_> = resolved
        .jobs
        .iter()
        .map(|job| (job.kind, job.schedule.to_string()))
        .collect();
    assert_eq!(
        schedules,
        vec![
            (JobKind::Backup, "2 14 * * *".to_string()),
            (JobKind::Check, "2 14 * * 5".to_string()),
            (JobKind::Prune, "2 14 3 * *".to_string()),
            (JobKind::Archive, "15 2 * * *".to_string()),
        ]
    );

    let backup = resolved.job(JobKind::Backup).unwrap();
    assert_eq!(
        backup.resources,
        ResourceRequirements::default()
            .with(ResourceAxis::LimitsCpu, q("200m"))
            .with(ResourceAxis::RequestsCpu, q("50m"))
            .with(ResourceAxis::RequestsMemory, q("10Mi"))
    );
    let sources: Vec<_> = backup.resource_sources.iter().map(|s| s.source).collect();
    assert_eq!(
        sources,
        vec![MergeSource::Template, MergeSource::Explicit, MergeSource::Global]
    );

    let check = resolved.job(JobKind::Check).unwrap();
    assert_eq!(check.resources.get(ResourceAxis::RequestsCpu), Some(&q("100m")));
    assert!(!check.concurrent_runs_allowed);
    assert!(resolved.job(JobKind::Prune).unwrap().concurrent_runs_allowed);

    // Literal schedules produce no effective-schedule record.
    let recorded: Vec<_> = resolved.effective_schedules.iter().map(|e| e.job_type).collect();
    assert_eq!(recorded, vec![JobKind::Backup, JobKind::Check, JobKind::Prune]);
}

#[test]
fn test_recorded_schedule_is_reused() {
    let mut schedule = Schedule::from_yaml(MANIFEST).unwrap();
    schedule.status = Some(ScheduleStatus {
        effective_schedules: vec![
            EffectiveSchedule {
                job_type: JobKind::Backup,
                original_schedule: "@daily-random".to_string(),
                generated_schedule: CronExpression::new("7 3 * * *"),
            },
            // Recorded for a different macro: must be ignored.
            EffectiveSchedule {
                job_type: JobKind::Check,
                original_schedule: "@daily-random".to_string(),
                generated_schedule: CronExpression::new("7 3 * * *"),
            },
        ],
    });

    let resolved = handler_with(&[]).handle(&schedule);

    let backup = resolved.job(JobKind::Backup).unwrap();
    assert_eq!(backup.schedule, "7 3 * * *");
    assert_eq!(backup.mode, ResolutionMode::Recorded);

    let check = resolved.job(JobKind::Check).unwrap();
    assert_eq!(check.schedule, "2 14 * * 5");
    assert_eq!(check.mode, ResolutionMode::Generated);

    assert_eq!(resolved.job(JobKind::Archive).unwrap().mode, ResolutionMode::Literal);
}

#[test]
fn test_status_round_trips_into_next_pass() {
    let mut schedule = Schedule::from_yaml(MANIFEST).unwrap();
    let handler = handler_with(&[]);

    let first = handler.handle(&schedule);
    schedule.status = Some(first.status());
    let second = handler.handle(&schedule);

    for job in &second.jobs {
        let previous = first.job(job.kind).unwrap();
        assert_eq!(job.schedule, previous.schedule);
        if job.original.is_random() {
            assert_eq!(job.mode, ResolutionMode::Recorded);
        }
    }
    assert_eq!(second.effective_schedules, first.effective_schedules);
}

#[test]
fn test_concurrent_handling() {
    let handler = handler_with(&[("BACKUP_GLOBAL_CPU_LIMIT", "1")]);
    let schedules: Vec<_> = (0..16)
        .map(|i| {
            Schedule::new(
                &format!("tenant-{}", i),
                "backup",
                ScheduleSpec {
                    backup: Some(JobSchedule::new("@hourly-random")),
                    ..Default::default()
                },
            )
        })
        .collect();

    let sequential: Vec<_> = schedules.iter().map(|s| handler.handle(s)).collect();

    let concurrent: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = schedules
            .iter()
            .map(|schedule| {
                let handler = &handler;
                scope.spawn(move || handler.handle(schedule))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(concurrent, sequential);
    for resolved in &concurrent {
        let backup = resolved.job(JobKind::Backup).unwrap();
        assert_eq!(backup.resources.get(ResourceAxis::LimitsCpu), Some(&q("1")));
    }
}

#[test]
fn test_defaults_swap_is_visible_to_new_handlers_only() {
    let store = DefaultsStore::new(GlobalDefaults::none());
    let schedule = Schedule::from_yaml(MANIFEST).unwrap();

    let before = ScheduleHandler::from_store(&store);

    store.replace(GlobalDefaults::from_requirements(
        ResourceRequirements::default().with(ResourceAxis::LimitsMemory, q("512Mi")),
    ));
    let after = ScheduleHandler::from_store(&store);

    let old = before.handle(&schedule);
    let new = after.handle(&schedule);

    assert_eq!(old.job(JobKind::Check).unwrap().resources.get(ResourceAxis::LimitsMemory), None);
    assert_eq!(
        new.job(JobKind::Check).unwrap().resources.get(ResourceAxis::LimitsMemory),
        Some(&q("512Mi"))
    );
}

#[test]
fn test_invalid_global_default_fails_before_handling() {
    let config = Config::from_env_map([("BACKUP_GLOBAL_CPU_REQUEST", "fast")]).unwrap();
    let err = config.validate_syntax().unwrap_err();
    assert!(err.is_fatal());
    assert!(err.user_message().contains("global_cpu_request"));
}
