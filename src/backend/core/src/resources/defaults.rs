//! Operator-level global resource defaults.
//!
//! Defaults are parsed once at startup and shared read-only afterwards. A
//! replacement swaps the whole value, so a reader either sees the old
//! defaults or the new ones, never a mix.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use super::{Quantity, ResourceAxis, ResourceRequirements};
use crate::config::GlobalResourceConfig;
use crate::error::{CadenceError, Result};

/// Validated global defaults: the lowest tier of the resource merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalDefaults {
    requirements: ResourceRequirements,
}

impl GlobalDefaults {
    /// No defaults at all; every axis falls through to absent.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_requirements(requirements: ResourceRequirements) -> Self {
        Self {
            requirements: requirements.normalized(),
        }
    }

    /// Parse the raw settings. Empty strings count as unset; the first
    /// malformed value is reported with the name of its setting.
    pub fn from_config(config: &GlobalResourceConfig) -> Result<Self> {
        let settings = [
            ("global_cpu_limit", ResourceAxis::LimitsCpu, &config.cpu_limit),
            ("global_memory_limit", ResourceAxis::LimitsMemory, &config.memory_limit),
            ("global_cpu_request", ResourceAxis::RequestsCpu, &config.cpu_request),
            ("global_memory_request", ResourceAxis::RequestsMemory, &config.memory_request),
        ];

        let mut requirements = ResourceRequirements::default();
        for (setting, axis, raw) in settings {
            let Some(raw) = raw.as_deref().filter(|raw| !raw.is_empty()) else {
                continue;
            };
            let quantity = Quantity::parse(raw)
                .map_err(|e| CadenceError::invalid_global_default(setting, raw, e))?;
            requirements.set(axis, Some(quantity));
        }

        Ok(Self { requirements })
    }

    pub fn requirements(&self) -> &ResourceRequirements {
        &self.requirements
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }
}

/// Shared holder for the current [`GlobalDefaults`].
#[derive(Debug, Default)]
pub struct DefaultsStore {
    current: RwLock<Arc<GlobalDefaults>>,
}

impl DefaultsStore {
    pub fn new(defaults: GlobalDefaults) -> Self {
        Self {
            current: RwLock::new(Arc::new(defaults)),
        }
    }

    /// The defaults in effect right now. The returned value never changes,
    /// even if the store is replaced afterwards.
    pub fn snapshot(&self) -> Arc<GlobalDefaults> {
        Arc::clone(&self.current.read())
    }

    /// Swap in a new set of defaults.
    pub fn replace(&self, defaults: GlobalDefaults) {
        let axes = defaults.requirements().iter().count();
        *self.current.write() = Arc::new(defaults);
        info!(axes, "Global resource defaults replaced");
    }
}
