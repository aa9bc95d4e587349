//! Resource quantities, requirement sets and the three-tier merge.

pub mod defaults;
pub mod merge;
pub mod quantity;
pub mod requirements;

pub use defaults::{DefaultsStore, GlobalDefaults};
pub use merge::{merge, merge_with_sources, AxisSource, MergeSource};
pub use quantity::{Quantity, QuantityError};
pub use requirements::{ResourceAxis, ResourceList, ResourceRequirements};
