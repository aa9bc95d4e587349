//! Resource requirement sets (limits and requests for CPU and memory).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Quantity;

/// One requirement group: a CPU and a memory quantity, each optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceList {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<Quantity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<Quantity>,
}

impl ResourceList {
    pub fn is_empty(&self) -> bool {
        self.cpu.is_none() && self.memory.is_none()
    }
}

/// Limits and requests for a job's pod.
///
/// A group is `None` when none of its axes is set; [`ResourceRequirements::set`]
/// keeps that invariant, values built by hand may still carry empty groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRequirements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<ResourceList>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests: Option<ResourceList>,
}

/// One independently resolved resource axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceAxis {
    #[serde(rename = "limits.cpu")]
    LimitsCpu,
    #[serde(rename = "limits.memory")]
    LimitsMemory,
    #[serde(rename = "requests.cpu")]
    RequestsCpu,
    #[serde(rename = "requests.memory")]
    RequestsMemory,
}

impl ResourceAxis {
    pub const ALL: [ResourceAxis; 4] = [
        ResourceAxis::LimitsCpu,
        ResourceAxis::LimitsMemory,
        ResourceAxis::RequestsCpu,
        ResourceAxis::RequestsMemory,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LimitsCpu => "limits.cpu",
            Self::LimitsMemory => "limits.memory",
            Self::RequestsCpu => "requests.cpu",
            Self::RequestsMemory => "requests.memory",
        }
    }

    fn group<'a>(&self, requirements: &'a ResourceRequirements) -> Option<&'a ResourceList> {
        match self {
            Self::LimitsCpu | Self::LimitsMemory => requirements.limits.as_ref(),
            Self::RequestsCpu | Self::RequestsMemory => requirements.requests.as_ref(),
        }
    }

    fn group_mut<'a>(
        &self,
        requirements: &'a mut ResourceRequirements,
    ) -> &'a mut Option<ResourceList> {
        match self {
            Self::LimitsCpu | Self::LimitsMemory => &mut requirements.limits,
            Self::RequestsCpu | Self::RequestsMemory => &mut requirements.requests,
        }
    }

    fn slot<'a>(&self, list: &'a ResourceList) -> Option<&'a Quantity> {
        match self {
            Self::LimitsCpu | Self::RequestsCpu => list.cpu.as_ref(),
            Self::LimitsMemory | Self::RequestsMemory => list.memory.as_ref(),
        }
    }

    fn slot_mut<'a>(&self, list: &'a mut ResourceList) -> &'a mut Option<Quantity> {
        match self {
            Self::LimitsCpu | Self::RequestsCpu => &mut list.cpu,
            Self::LimitsMemory | Self::RequestsMemory => &mut list.memory,
        }
    }
}

impl fmt::Display for ResourceAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ResourceRequirements {
    /// Get the quantity set on an axis.
    pub fn get(&self, axis: ResourceAxis) -> Option<&Quantity> {
        axis.group(self).and_then(|list| axis.slot(list))
    }

    /// Set or clear an axis, creating or dropping its group as needed.
    pub fn set(&mut self, axis: ResourceAxis, value: Option<Quantity>) {
        let group = axis.group_mut(self);
        match value {
            Some(quantity) => {
                *axis.slot_mut(group.get_or_insert_with(ResourceList::default)) = Some(quantity);
            }
            None => {
                let now_empty = match group.as_mut() {
                    Some(list) => {
                        *axis.slot_mut(list) = None;
                        list.is_empty()
                    }
                    None => false,
                };
                if now_empty {
                    *group = None;
                }
            }
        }
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, axis: ResourceAxis, quantity: Quantity) -> Self {
        self.set(axis, Some(quantity));
        self
    }

    pub fn is_empty(&self) -> bool {
        ResourceAxis::ALL.iter().all(|axis| self.get(*axis).is_none())
    }

    /// Iterate over the populated axes in [`ResourceAxis::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceAxis, &Quantity)> + '_ {
        ResourceAxis::ALL
            .into_iter()
            .filter_map(move |axis| self.get(axis).map(|quantity| (axis, quantity)))
    }

    /// Copy with empty groups dropped.
    pub fn normalized(&self) -> Self {
        let mut normalized = Self::default();
        for (axis, quantity) in self.iter() {
            normalized.set(axis, Some(quantity.clone()));
        }
        normalized
    }
}
