//! Resolve Schedule manifests into concrete cron expressions and resources.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use cadence_core::handler::{ResolvedSchedule, Schedule, ScheduleHandler, ScheduleStatus};
use cadence_core::resources::GlobalDefaults;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use tracing::info;

use super::format_group;
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct ResolveArgs {
    /// Schedule manifests (YAML, multiple documents allowed)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Print the status block to persist instead of the resolved jobs
    #[arg(long)]
    status: bool,
}

#[derive(Tabled)]
struct JobRow {
    #[tabled(rename = "Schedule")]
    schedule: String,
    #[tabled(rename = "Job")]
    job: String,
    #[tabled(rename = "Original")]
    original: String,
    #[tabled(rename = "Cron")]
    cron: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Limits")]
    limits: String,
    #[tabled(rename = "Requests")]
    requests: String,
    #[tabled(rename = "Sources")]
    sources: String,
}

#[derive(Serialize)]
struct StatusReport<'a> {
    schedule: &'a str,
    status: ScheduleStatus,
}

fn load(files: &[PathBuf]) -> Result<Vec<Schedule>> {
    let mut schedules = Vec::new();
    for path in files {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let parsed = Schedule::from_yaml_documents(&yaml)
            .with_context(|| format!("Invalid manifest {}", path.display()))?;
        schedules.extend(parsed);
    }
    Ok(schedules)
}

fn rows(resolved: &[ResolvedSchedule]) -> Vec<JobRow> {
    resolved
        .iter()
        .flat_map(|schedule| {
            schedule.jobs.iter().map(move |job| JobRow {
                schedule: schedule.identity.to_string(),
                job: job.kind.to_string(),
                original: job.original.to_string(),
                cron: job.schedule.to_string(),
                mode: job.mode.to_string(),
                limits: format_group(job.resources.limits.as_ref()),
                requests: format_group(job.resources.requests.as_ref()),
                sources: job
                    .resource_sources
                    .iter()
                    .map(|s| format!("{}<-{}", s.axis, s.source))
                    .collect::<Vec<_>>()
                    .join(" "),
            })
        })
        .collect()
}

pub fn execute(args: ResolveArgs, defaults: GlobalDefaults, format: OutputFormat) -> Result<()> {
    let schedules = load(&args.files)?;
    let handler = ScheduleHandler::new(Arc::new(defaults));

    let resolved: Vec<ResolvedSchedule> = schedules.iter().map(|s| handler.handle(s)).collect();
    info!(
        schedules = resolved.len(),
        jobs = resolved.iter().map(|r| r.jobs.len()).sum::<usize>(),
        "Resolved manifests"
    );

    if args.status {
        let reports: Vec<_> = resolved
            .iter()
            .map(|r| StatusReport {
                schedule: r.identity.as_str(),
                status: r.status(),
            })
            .collect();
        return output::print_item(&reports, format);
    }

    match format {
        OutputFormat::Table => {
            output::print_table(&rows(&resolved));
            Ok(())
        }
        _ => output::print_item(&resolved, format),
    }
}
