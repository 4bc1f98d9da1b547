//! Movement type bitmask

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::units::target_type::TargetType;

bitflags! {
    /// How a unit type moves; a mask may combine several elementary types
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct MovementType: u32 {
        /// Land only
        const GROUND = 0x0001;
        /// Land and under water
        const AMPHIBIOUS = 0x0002;
        /// Land and above water
        const HOVER = 0x0004;
        /// Above water (ships)
        const SEA_FLOATER = 0x0008;
        /// Below water (submarines)
        const SEA_SUBMERGED = 0x0010;
        const AIR = 0x0020;
        /// Building on solid ground
        const STATIC_LAND = 0x0040;
        /// Building floating on water
        const STATIC_SEA_FLOATER = 0x0080;
        /// Building on the sea floor
        const STATIC_SEA_SUBMERGED = 0x0100;
    }
}

impl MovementType {
    const CONTINENT_BOUND: MovementType = MovementType::GROUND
        .union(MovementType::SEA_FLOATER)
        .union(MovementType::SEA_SUBMERGED);
    const LAND: MovementType = MovementType::GROUND
        .union(MovementType::AMPHIBIOUS)
        .union(MovementType::HOVER);
    const SEA: MovementType = MovementType::SEA_FLOATER
        .union(MovementType::SEA_SUBMERGED)
        .union(MovementType::AMPHIBIOUS)
        .union(MovementType::HOVER);
    const STATIC: MovementType = MovementType::STATIC_LAND
        .union(MovementType::STATIC_SEA_FLOATER)
        .union(MovementType::STATIC_SEA_SUBMERGED);
    const STATIC_SEA: MovementType =
        MovementType::STATIC_SEA_FLOATER.union(MovementType::STATIC_SEA_SUBMERGED);
    const SEA_UNIT: MovementType = MovementType::SEA_FLOATER.union(MovementType::SEA_SUBMERGED);

    /// Ground and sea units stay on the continent they were built on
    pub fn cannot_move_to_other_continents(&self) -> bool {
        self.intersects(Self::CONTINENT_BOUND)
    }

    pub fn can_move_on_land(&self) -> bool {
        self.intersects(Self::LAND)
    }

    pub fn can_move_on_sea(&self) -> bool {
        self.intersects(Self::SEA)
    }

    pub fn is_static(&self) -> bool {
        self.intersects(Self::STATIC)
    }

    pub fn is_static_land(&self) -> bool {
        *self == MovementType::STATIC_LAND
    }

    pub fn is_static_sea(&self) -> bool {
        self.intersects(Self::STATIC_SEA)
    }

    pub fn is_ground(&self) -> bool {
        *self == MovementType::GROUND
    }

    pub fn is_hover(&self) -> bool {
        *self == MovementType::HOVER
    }

    pub fn is_air(&self) -> bool {
        *self == MovementType::AIR
    }

    pub fn is_amphibious(&self) -> bool {
        *self == MovementType::AMPHIBIOUS
    }

    /// Floating or submerged mobile unit
    pub fn is_sea_unit(&self) -> bool {
        self.intersects(Self::SEA_UNIT)
    }

    /// Sea unit or sea building
    pub fn is_sea(&self) -> bool {
        self.is_sea_unit() || self.is_static_sea()
    }

    /// Target type a unit moving this way presents to enemy weapons
    pub fn target_type(&self) -> TargetType {
        if self.contains(MovementType::AIR) {
            TargetType::Air
        } else if self.is_static() {
            TargetType::Static
        } else if self.contains(MovementType::SEA_SUBMERGED) {
            TargetType::Submerged
        } else if self.contains(MovementType::SEA_FLOATER) {
            TargetType::Floater
        } else {
            TargetType::Surface
        }
    }

    /// Whether a group moving this way can fight alongside groups moving `other`
    ///
    /// Air only joins air; everything else needs a shared land or sea capability.
    pub fn can_operate_with(&self, other: MovementType) -> bool {
        if other.is_empty() {
            return true;
        }
        let self_air = self.contains(MovementType::AIR);
        let other_air = other.contains(MovementType::AIR);
        if self_air || other_air {
            return self_air && other_air;
        }
        (self.can_move_on_land() && other.can_move_on_land())
            || (self.can_move_on_sea() && other.can_move_on_sea())
    }
}
