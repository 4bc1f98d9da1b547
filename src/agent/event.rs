//! Events reported by the host engine

use serde::{Deserialize, Serialize};

use crate::brain::EconomySample;
use crate::core::types::{ContinentId, GroupId, SectorIndex, UnitDefId, Vec2};
use crate::units::{CombatCategoryValues, TargetTypeValues};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// One of our units (or buildings) was killed
    UnitDestroyed {
        destroyed: UnitDefId,
        attacker: UnitDefId,
        position: Vec2,
    },
    /// Fresh enemy sightings for a sector, replacing the previous ones
    SectorScouted {
        sector: SectorIndex,
        combat_units: CombatCategoryValues,
        structures: f32,
        on_radar: u32,
    },
    EconomySample(EconomySample),
    ConstructionStarted {
        def: UnitDefId,
    },
    /// A mobile unit left the factory
    UnitCompleted {
        def: UnitDefId,
    },
    StructureCompleted {
        def: UnitDefId,
        position: Vec2,
    },
    StructureDestroyed {
        def: UnitDefId,
        position: Vec2,
    },
    ExtractorBuilt {
        unit: u32,
        def: UnitDefId,
        position: Vec2,
    },
    ExtractorDestroyed {
        position: Vec2,
    },
    GroupCreated {
        group: GroupId,
        def: UnitDefId,
        size: u32,
        continent: ContinentId,
        sector: Option<SectorIndex>,
    },
    GroupDestroyed {
        group: GroupId,
    },
    GroupResized {
        group: GroupId,
        size: u32,
    },
    GroupMoved {
        group: GroupId,
        sector: SectorIndex,
    },
    /// A group reached its destination or lost its target
    GroupIdle {
        group: GroupId,
    },
    /// Estimated enemy combat power in a sector, replacing the previous estimate
    EnemyCombatPowerSpotted {
        sector: SectorIndex,
        static_power: TargetTypeValues,
        mobile_power: TargetTypeValues,
    },
}

impl EngineEvent {
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::UnitDestroyed { .. } => "unit destroyed",
            EngineEvent::SectorScouted { .. } => "sector scouted",
            EngineEvent::EconomySample(_) => "economy sample",
            EngineEvent::ConstructionStarted { .. } => "construction started",
            EngineEvent::UnitCompleted { .. } => "unit completed",
            EngineEvent::StructureCompleted { .. } => "structure completed",
            EngineEvent::StructureDestroyed { .. } => "structure destroyed",
            EngineEvent::ExtractorBuilt { .. } => "extractor built",
            EngineEvent::ExtractorDestroyed { .. } => "extractor destroyed",
            EngineEvent::GroupCreated { .. } => "group created",
            EngineEvent::GroupDestroyed { .. } => "group destroyed",
            EngineEvent::GroupResized { .. } => "group resized",
            EngineEvent::GroupMoved { .. } => "group moved",
            EngineEvent::GroupIdle { .. } => "group idle",
            EngineEvent::EnemyCombatPowerSpotted { .. } => "enemy combat power spotted",
        }
    }
}
