//! Three-tier resource merge.
//!
//! Each [`ResourceAxis`] is resolved on its own: the job's explicit value wins,
//! then the schedule-level template, then the global defaults. Groups that end
//! up with no resolved axis are left out of the result.

use std::fmt;

use serde::Serialize;

use super::{Quantity, ResourceAxis, ResourceRequirements};

/// Which tier supplied a merged axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeSource {
    Explicit,
    Template,
    Global,
}

impl MergeSource {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::Template => "template",
            Self::Global => "global",
        }
    }
}

impl fmt::Display for MergeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The winning tier for one resolved axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AxisSource {
    pub axis: ResourceAxis,
    pub source: MergeSource,
}

fn resolve_axis<'a>(
    axis: ResourceAxis,
    explicit: &'a ResourceRequirements,
    template: &'a ResourceRequirements,
    global: &'a ResourceRequirements,
) -> Option<(&'a Quantity, MergeSource)> {
    explicit
        .get(axis)
        .map(|q| (q, MergeSource::Explicit))
        .or_else(|| template.get(axis).map(|q| (q, MergeSource::Template)))
        .or_else(|| global.get(axis).map(|q| (q, MergeSource::Global)))
}

/// Merge explicit, template and global requirements axis by axis.
pub fn merge(
    explicit: &ResourceRequirements,
    template: &ResourceRequirements,
    global: &ResourceRequirements,
) -> ResourceRequirements {
    merge_with_sources(explicit, template, global).0
}

/// Like [`merge`], also reporting which tier won each resolved axis.
pub fn merge_with_sources(
    explicit: &ResourceRequirements,
    template: &ResourceRequirements,
    global: &ResourceRequirements,
) -> (ResourceRequirements, Vec<AxisSource>) {
    let mut merged = ResourceRequirements::default();
    let mut sources = Vec::with_capacity(ResourceAxis::ALL.len());

    for axis in ResourceAxis::ALL {
        if let Some((quantity, source)) = resolve_axis(axis, explicit, template, global) {
            merged.set(axis, Some(quantity.clone()));
            sources.push(AxisSource { axis, source });
        }
    }

    (merged, sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(s: &str) -> Quantity {
        s.parse().unwrap()
    }

    #[test]
    fn test_all_empty_stays_empty() {
        let empty = ResourceRequirements::default();
        let merged = merge(&empty, &empty, &empty);
        assert_eq!(merged, ResourceRequirements::default());
        assert!(merged.limits.is_none());
        assert!(merged.requests.is_none());
    }

    #[test]
    fn test_sources_are_reported_per_axis() {
        let explicit = ResourceRequirements::default().with(ResourceAxis::RequestsCpu, q("50m"));
        let template = ResourceRequirements::default()
            .with(ResourceAxis::LimitsCpu, q("200m"))
            .with(ResourceAxis::RequestsCpu, q("100m"));
        let global = ResourceRequirements::default().with(ResourceAxis::RequestsMemory, q("10Mi"));

        let (merged, sources) = merge_with_sources(&explicit, &template, &global);

        assert_eq!(merged.get(ResourceAxis::RequestsCpu), Some(&q("50m")));
        assert_eq!(
            sources,
            vec![
                AxisSource { axis: ResourceAxis::LimitsCpu, source: MergeSource::Template },
                AxisSource { axis: ResourceAxis::RequestsCpu, source: MergeSource::Explicit },
                AxisSource { axis: ResourceAxis::RequestsMemory, source: MergeSource::Global },
            ]
        );
    }

    #[test]
    fn test_empty_group_in_explicit_does_not_shadow_template() {
        let explicit = ResourceRequirements {
            limits: Some(Default::default()),
            requests: None,
        };
        let template = ResourceRequirements::default().with(ResourceAxis::LimitsMemory, q("1Gi"));

        let merged = merge(&explicit, &template, &ResourceRequirements::default());
        assert_eq!(merged.get(ResourceAxis::LimitsMemory), Some(&q("1Gi")));
    }
}
