//! Unit classification: target types, categories, movement and the catalog seam

pub mod catalog;
pub mod category;
pub mod movement;
pub mod target_type;

pub use catalog::{StaticCatalog, UnitCatalog, UnitProfile};
pub use category::{CombatCategory, CombatCategoryValues, UnitCategory, UnitRole};
pub use movement::MovementType;
pub use target_type::{TargetType, TargetTypeValues};
