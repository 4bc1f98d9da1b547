//! Unit groups
//!
//! A group is a cluster of units of the same definition, formed and
//! moved by the host's unit layer. The strategic core only sees the
//! aggregate: definition, movement, size and where the group stands.

use serde::{Deserialize, Serialize};

use crate::core::types::{AttackId, ContinentId, GroupId, SectorIndex, UnitDefId};
use crate::units::{
    CombatCategory, MovementType, TargetType, TargetTypeValues, UnitCatalog, UnitCategory,
    UnitRole,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitGroup {
    pub id: GroupId,
    pub def_id: UnitDefId,
    pub category: UnitCategory,
    pub role: UnitRole,
    pub movement: MovementType,
    /// Number of units currently in the group
    pub size: u32,
    /// Continent the group is bound to; `None` for units that cross water or fly
    pub continent: Option<ContinentId>,
    /// Sector the group currently stands in
    pub sector: Option<SectorIndex>,
    /// Attack the group is committed to
    pub attack: Option<AttackId>,
}

impl UnitGroup {
    /// Build a group, reading category, role and movement from the catalog
    pub fn new(
        id: GroupId,
        def_id: UnitDefId,
        size: u32,
        continent: ContinentId,
        catalog: &dyn UnitCatalog,
    ) -> Self {
        let movement = catalog.movement_type(def_id);
        Self {
            id,
            def_id,
            category: catalog.category(def_id),
            role: catalog.role(def_id),
            movement,
            size,
            continent: movement
                .cannot_move_to_other_continents()
                .then_some(continent),
            sector: None,
            attack: None,
        }
    }

    pub fn with_sector(mut self, sector: SectorIndex) -> Self {
        self.sector = Some(sector);
        self
    }

    pub fn combat_category(&self) -> Option<CombatCategory> {
        self.category.combat_category()
    }

    /// Target type the group presents to enemy weapons
    pub fn target_type(&self) -> TargetType {
        self.movement.target_type()
    }

    /// Summed combat power of all units in the group
    pub fn combat_power(&self, catalog: &dyn UnitCatalog) -> TargetTypeValues {
        catalog.combat_power(self.def_id) * self.size as f32
    }

    pub fn is_combat_group(&self) -> bool {
        self.category.is_combat_unit() && self.size > 0
    }

    pub fn is_anti_air(&self) -> bool {
        self.role.is_anti_air()
    }

    /// Idle combat group not committed to any attack
    pub fn is_available(&self) -> bool {
        self.is_combat_group() && self.attack.is_none()
    }
}
