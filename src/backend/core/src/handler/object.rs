//! The `Schedule` object as it appears in a manifest.

use serde::{Deserialize, Serialize};

use crate::error::{CadenceError, Result};
use crate::resources::ResourceRequirements;
use crate::schedule::{CronExpression, ObjectIdentity, ScheduleExpression};

pub const API_VERSION: &str = "k8up.io/v1";
pub const KIND: &str = "Schedule";

fn default_api_version() -> String {
    API_VERSION.to_string()
}

fn default_kind() -> String {
    KIND.to_string()
}

fn default_namespace() -> String {
    "default".to_string()
}

/// A Schedule object: job schedules plus a shared resource template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_kind")]
    pub kind: String,

    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: ScheduleSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ScheduleStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: String,

    #[serde(default = "default_namespace")]
    pub namespace: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSpec {
    /// Applied to every job unless the job sets the axis itself
    #[serde(default, skip_serializing_if = "ResourceRequirements::is_empty")]
    pub resource_requirements_template: ResourceRequirements,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup: Option<JobSchedule>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<JobSchedule>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prune: Option<JobSchedule>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive: Option<JobSchedule>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub garbage_collect: Option<JobSchedule>,
}

/// One job kind's schedule and resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSchedule {
    pub schedule: ScheduleExpression,

    #[serde(default)]
    pub concurrent_runs_allowed: bool,

    #[serde(default, skip_serializing_if = "ResourceRequirements::is_empty")]
    pub resources: ResourceRequirements,
}

impl JobSchedule {
    pub fn new(schedule: impl Into<ScheduleExpression>) -> Self {
        Self {
            schedule: schedule.into(),
            concurrent_runs_allowed: false,
            resources: ResourceRequirements::default(),
        }
    }

    pub fn with_resources(mut self, resources: ResourceRequirements) -> Self {
        self.resources = resources;
        self
    }
}

/// Job kinds a Schedule can declare, in resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobKind {
    Backup,
    Check,
    Prune,
    Archive,
    GarbageCollect,
}

impl JobKind {
    pub const ALL: [JobKind; 5] = [
        JobKind::Backup,
        JobKind::Check,
        JobKind::Prune,
        JobKind::Archive,
        JobKind::GarbageCollect,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Backup => "backup",
            Self::Check => "check",
            Self::Prune => "prune",
            Self::Archive => "archive",
            Self::GarbageCollect => "garbageCollect",
        }
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Schedules generated on earlier passes, persisted by the reconciler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleStatus {
    #[serde(default)]
    pub effective_schedules: Vec<EffectiveSchedule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveSchedule {
    pub job_type: JobKind,
    pub original_schedule: String,
    pub generated_schedule: CronExpression,
}

impl ScheduleSpec {
    pub fn job(&self, kind: JobKind) -> Option<&JobSchedule> {
        match kind {
            JobKind::Backup => self.backup.as_ref(),
            JobKind::Check => self.check.as_ref(),
            JobKind::Prune => self.prune.as_ref(),
            JobKind::Archive => self.archive.as_ref(),
            JobKind::GarbageCollect => self.garbage_collect.as_ref(),
        }
    }

    /// Declared jobs in [`JobKind::ALL`] order.
    pub fn jobs(&self) -> impl Iterator<Item = (JobKind, &JobSchedule)> + '_ {
        JobKind::ALL
            .into_iter()
            .filter_map(move |kind| self.job(kind).map(|job| (kind, job)))
    }
}

impl Schedule {
    pub fn new(namespace: &str, name: &str, spec: ScheduleSpec) -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            metadata: ObjectMeta {
                name: name.to_string(),
                namespace: namespace.to_string(),
            },
            spec,
            status: None,
        }
    }

    /// Parse a single-document manifest.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let schedule: Schedule = serde_yaml::from_str(yaml)?;
        schedule.validate()?;
        Ok(schedule)
    }

    /// Parse every Schedule in a multi-document stream. Empty documents are
    /// skipped.
    pub fn from_yaml_documents(yaml: &str) -> Result<Vec<Self>> {
        let mut schedules = Vec::new();
        for document in serde_yaml::Deserializer::from_str(yaml) {
            let value = serde_yaml::Value::deserialize(document)?;
            if value.is_null() {
                continue;
            }
            let schedule: Schedule = serde_yaml::from_value(value)?;
            schedule.validate()?;
            schedules.push(schedule);
        }
        Ok(schedules)
    }

    fn validate(&self) -> Result<()> {
        if self.kind != KIND {
            return Err(CadenceError::validation(format!(
                "expected kind '{}', found '{}'",
                KIND, self.kind
            )));
        }
        if self.metadata.name.is_empty() || self.metadata.namespace.is_empty() {
            return Err(CadenceError::validation(
                "metadata.name and metadata.namespace must not be empty",
            ));
        }
        Ok(())
    }

    pub fn identity(&self) -> ObjectIdentity {
        ObjectIdentity::new(&self.metadata.namespace, &self.metadata.name)
    }

    /// A schedule recorded for `kind` on an earlier pass, provided it was
    /// generated from the same original expression.
    pub fn recorded_schedule(&self, kind: JobKind, original: &str) -> Option<&CronExpression> {
        self.status
            .as_ref()?
            .effective_schedules
            .iter()
            .find(|effective| {
                effective.job_type == kind
                    && effective.original_schedule == original
                    && !effective.generated_schedule.is_empty()
            })
            .map(|effective| &effective.generated_schedule)
    }
}
