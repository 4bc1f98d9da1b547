//! Unit categories, combat categories and roles

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use crate::units::target_type::TargetType;

/// Broad category of a unit definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitCategory {
    Unknown,
    StaticDefence,
    StaticArtillery,
    Storage,
    PowerPlant,
    MetalExtractor,
    MetalMaker,
    StaticSensor,
    StaticSupport,
    StaticConstructor,
    Commander,
    GroundCombat,
    AirCombat,
    HoverCombat,
    SeaCombat,
    SubmarineCombat,
    MobileArtillery,
    Scout,
    Transport,
    MobileConstructor,
    MobileSupport,
}

impl UnitCategory {
    pub fn is_building(&self) -> bool {
        matches!(
            self,
            UnitCategory::StaticDefence
                | UnitCategory::StaticArtillery
                | UnitCategory::Storage
                | UnitCategory::PowerPlant
                | UnitCategory::MetalExtractor
                | UnitCategory::MetalMaker
                | UnitCategory::StaticSensor
                | UnitCategory::StaticSupport
                | UnitCategory::StaticConstructor
        )
    }

    pub fn is_combat_unit(&self) -> bool {
        self.combat_category().is_some()
    }

    pub fn combat_category(&self) -> Option<CombatCategory> {
        match self {
            UnitCategory::GroundCombat => Some(CombatCategory::Ground),
            UnitCategory::HoverCombat => Some(CombatCategory::Hover),
            UnitCategory::AirCombat => Some(CombatCategory::Air),
            UnitCategory::SeaCombat => Some(CombatCategory::Sea),
            UnitCategory::SubmarineCombat => Some(CombatCategory::Submarine),
            _ => None,
        }
    }

    pub fn is_static_defence(&self) -> bool {
        matches!(self, UnitCategory::StaticDefence)
    }

    pub fn is_power_plant(&self) -> bool {
        matches!(self, UnitCategory::PowerPlant)
    }

    pub fn is_metal_extractor(&self) -> bool {
        matches!(self, UnitCategory::MetalExtractor)
    }

    pub fn is_factory(&self) -> bool {
        matches!(self, UnitCategory::StaticConstructor)
    }
}

/// Category of a mobile combat unit, used to attribute attacks and sightings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CombatCategory {
    Ground,
    Hover,
    Air,
    Sea,
    Submarine,
}

impl CombatCategory {
    pub const COUNT: usize = 5;

    pub const ALL: [CombatCategory; 5] = [
        CombatCategory::Ground,
        CombatCategory::Hover,
        CombatCategory::Air,
        CombatCategory::Sea,
        CombatCategory::Submarine,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Target type a unit of this category presents to enemy weapons
    pub fn target_type(&self) -> TargetType {
        match self {
            CombatCategory::Ground | CombatCategory::Hover => TargetType::Surface,
            CombatCategory::Air => TargetType::Air,
            CombatCategory::Sea => TargetType::Floater,
            CombatCategory::Submarine => TargetType::Submerged,
        }
    }
}

/// One value per combat category
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CombatCategoryValues([f32; CombatCategory::COUNT]);

impl CombatCategoryValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill(&mut self, value: f32) {
        self.0 = [value; CombatCategory::COUNT];
    }

    pub fn sum(&self) -> f32 {
        self.0.iter().sum()
    }

    pub fn multiply_values(&mut self, factor: f32) {
        self.0.iter_mut().for_each(|v| *v *= factor);
    }

    /// Fold the per-category values onto the target types they present
    pub fn by_target_type(&self) -> crate::units::TargetTypeValues {
        let mut values = crate::units::TargetTypeValues::new();
        for category in CombatCategory::ALL {
            values[category.target_type()] += self[category];
        }
        values
    }
}

impl Index<CombatCategory> for CombatCategoryValues {
    type Output = f32;
    fn index(&self, category: CombatCategory) -> &f32 {
        &self.0[category.index()]
    }
}

impl IndexMut<CombatCategory> for CombatCategoryValues {
    fn index_mut(&mut self, category: CombatCategory) -> &mut f32 {
        &mut self.0[category.index()]
    }
}

/// Combat role of a unit type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitRole {
    Assault,
    AntiAir,
    Artillery,
    Support,
}

impl UnitRole {
    pub fn is_assault(&self) -> bool {
        matches!(self, UnitRole::Assault)
    }

    pub fn is_anti_air(&self) -> bool {
        matches!(self, UnitRole::AntiAir)
    }
}
