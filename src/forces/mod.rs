//! Own forces: unit groups and the structure census

pub mod census;
pub mod group;
pub mod registry;

pub use census::{ForceCensus, OwnStructures};
pub use group::UnitGroup;
pub use registry::GroupRegistry;
