//! Tests for the three-tier resource merge.
//!
//! Tests cover:
//! - Global defaults, schedule template and explicit job resources in every combination
//! - Per-axis precedence
//! - Group omission
//! - Idempotence and input immutability

use cadence_core::config::GlobalResourceConfig;
use cadence_core::resources::{
    merge, GlobalDefaults, Quantity, ResourceAxis, ResourceRequirements,
};
use proptest::prelude::*;

fn q(s: &str) -> Quantity {
    s.parse().unwrap()
}

fn req(axes: &[(ResourceAxis, &str)]) -> ResourceRequirements {
    axes.iter()
        .fold(ResourceRequirements::default(), |acc, (axis, value)| acc.with(*axis, q(value)))
}

// ============================================================================
// Table-driven cases
// ============================================================================

struct Case {
    name: &'static str,
    global_cpu_limit: &'static str,
    global_memory_request: &'static str,
    template: ResourceRequirements,
    resources: ResourceRequirements,
    expected: ResourceRequirements,
}

fn cases() -> Vec<Case> {
    use ResourceAxis::*;

    vec![
        Case {
            name: "no defaults, no template, no resources: empty",
            global_cpu_limit: "",
            global_memory_request: "",
            template: req(&[]),
            resources: req(&[]),
            expected: req(&[]),
        },
        Case {
            name: "no defaults, no template, resources: use resources",
            global_cpu_limit: "",
            global_memory_request: "",
            template: req(&[]),
            resources: req(&[(RequestsCpu, "50m")]),
            expected: req(&[(RequestsCpu, "50m")]),
        },
        Case {
            name: "no defaults, template, no resources: use template",
            global_cpu_limit: "",
            global_memory_request: "",
            template: req(&[(LimitsCpu, "200m")]),
            resources: req(&[]),
            expected: req(&[(LimitsCpu, "200m")]),
        },
        Case {
            name: "no defaults, template, resources: resources win",
            global_cpu_limit: "",
            global_memory_request: "",
            template: req(&[(LimitsCpu, "200m")]),
            resources: req(&[(LimitsCpu, "50m")]),
            expected: req(&[(LimitsCpu, "50m")]),
        },
        Case {
            name: "defaults, template on another axis, no resources: both apply",
            global_cpu_limit: "",
            global_memory_request: "10Mi",
            template: req(&[(LimitsCpu, "200m")]),
            resources: req(&[]),
            expected: req(&[(LimitsCpu, "200m"), (RequestsMemory, "10Mi")]),
        },
        Case {
            name: "defaults, no template, resources on same axis: resources win",
            global_cpu_limit: "",
            global_memory_request: "10Mi",
            template: req(&[]),
            resources: req(&[(RequestsMemory, "20Mi")]),
            expected: req(&[(RequestsMemory, "20Mi")]),
        },
        Case {
            name: "defaults, template on same axis, no resources: template wins",
            global_cpu_limit: "10m",
            global_memory_request: "",
            template: req(&[(LimitsCpu, "200m")]),
            resources: req(&[]),
            expected: req(&[(LimitsCpu, "200m")]),
        },
        Case {
            name: "defaults, template, resources on same axis: resources win",
            global_cpu_limit: "10m",
            global_memory_request: "",
            template: req(&[(LimitsCpu, "100m")]),
            resources: req(&[(LimitsCpu, "200m")]),
            expected: req(&[(LimitsCpu, "200m")]),
        },
    ]
}

#[test]
fn test_merge_table() {
    for case in cases() {
        let defaults = GlobalDefaults::from_config(&GlobalResourceConfig {
            cpu_limit: Some(case.global_cpu_limit.to_string()),
            memory_request: Some(case.global_memory_request.to_string()),
            ..Default::default()
        })
        .unwrap();

        let merged = merge(&case.resources, &case.template, defaults.requirements());
        assert_eq!(merged, case.expected, "{}", case.name);
    }
}

#[test]
fn test_merged_values_keep_their_text() {
    let merged = merge(
        &req(&[]),
        &req(&[(ResourceAxis::LimitsMemory, "1024Mi")]),
        &req(&[(ResourceAxis::LimitsMemory, "1Gi")]),
    );
    assert_eq!(
        merged.get(ResourceAxis::LimitsMemory).map(|q| q.to_string()),
        Some("1024Mi".to_string())
    );
}

#[test]
fn test_limits_group_omitted_when_only_requests_resolve() {
    let merged = merge(
        &req(&[]),
        &req(&[(ResourceAxis::RequestsCpu, "100m")]),
        &req(&[]),
    );
    assert!(merged.limits.is_none());
    assert!(merged.requests.is_some());
    assert_eq!(merged.requests.as_ref().unwrap().memory, None);
}

// ============================================================================
// Properties
// ============================================================================

fn any_quantity() -> impl Strategy<Value = Quantity> {
    prop::sample::select(vec!["10m", "50m", "200m", "1", "2", "10Mi", "64Mi", "1Gi", "0"])
        .prop_map(q)
}

fn any_requirements() -> impl Strategy<Value = ResourceRequirements> {
    prop::array::uniform4(prop::option::of(any_quantity())).prop_map(|values| {
        let mut requirements = ResourceRequirements::default();
        for (axis, value) in ResourceAxis::ALL.into_iter().zip(values) {
            requirements.set(axis, value);
        }
        requirements
    })
}

proptest! {
    #[test]
    fn prop_merge_is_idempotent(e in any_requirements(), t in any_requirements(), g in any_requirements()) {
        let once = merge(&e, &t, &g);
        let twice = merge(&once, &t, &g);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn prop_inputs_are_not_mutated(e in any_requirements(), t in any_requirements(), g in any_requirements()) {
        let (e0, t0, g0) = (e.clone(), t.clone(), g.clone());
        let _ = merge(&e, &t, &g);
        prop_assert_eq!(e, e0);
        prop_assert_eq!(t, t0);
        prop_assert_eq!(g, g0);
    }

    #[test]
    fn prop_precedence_per_axis(e in any_requirements(), t in any_requirements(), g in any_requirements()) {
        let merged = merge(&e, &t, &g);
        for axis in ResourceAxis::ALL {
            let expected = e.get(axis).or_else(|| t.get(axis)).or_else(|| g.get(axis));
            prop_assert_eq!(merged.get(axis), expected);
        }
    }

    #[test]
    fn prop_explicit_always_wins(e in any_requirements(), t1 in any_requirements(), t2 in any_requirements(), g in any_requirements()) {
        let a = merge(&e, &t1, &g);
        let b = merge(&e, &t2, &g);
        for (axis, quantity) in e.iter() {
            prop_assert_eq!(a.get(axis), Some(quantity));
            prop_assert_eq!(b.get(axis), Some(quantity));
        }
    }

    #[test]
    fn prop_no_empty_groups(e in any_requirements(), t in any_requirements(), g in any_requirements()) {
        let merged = merge(&e, &t, &g);
        if let Some(limits) = &merged.limits {
            prop_assert!(!limits.is_empty());
        }
        if let Some(requests) = &merged.requests {
            prop_assert!(!requests.is_empty());
        }
        prop_assert_eq!(merged.normalized(), merged.clone());
    }
}
