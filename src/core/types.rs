//! Core type definitions used throughout the codebase

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Simulation frame counter (the host engine runs at 30 frames per second)
pub type Tick = u64;

/// Continent identifier as assigned by the terrain analysis layer
pub type ContinentId = u32;

/// Identifier of a unit definition in the unit catalog
///
/// Zero is reserved as "no unit type".
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[display(fmt = "def#{}", _0)]
pub struct UnitDefId(pub u32);

impl UnitDefId {
    pub fn is_valid(&self) -> bool {
        self.0 > 0
    }
}

/// Opaque handle of a unit group owned by the group registry
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[display(fmt = "group#{}", _0)]
pub struct GroupId(pub u32);

/// Handle of an attack owned by the attack manager
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[display(fmt = "attack#{}", _0)]
pub struct AttackId(pub u32);

/// Team (player slot) identifier
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[display(fmt = "team {}", _0)]
pub struct TeamId(pub u32);

/// Grid coordinates of a sector
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[display(fmt = "({},{})", x, y)]
pub struct SectorIndex {
    pub x: usize,
    pub y: usize,
}

impl SectorIndex {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Squared grid distance, used where only the ordering matters
    pub fn distance_squared(&self, other: &Self) -> usize {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx * dx + dy * dy
    }

    /// Manhattan distance in sectors
    pub fn grid_distance(&self, other: &Self) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// 2D world position (x, z plane of the host engine)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self { x: self.x * rhs, y: self.y * rhs }
    }
}

/// Broad terrain classification of the whole map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MapType {
    Land,
    LandWater,
    Water,
}

impl MapType {
    pub const ALL: [MapType; 3] = [MapType::Land, MapType::LandWater, MapType::Water];

    pub fn is_land(&self) -> bool {
        matches!(self, MapType::Land)
    }

    pub fn is_land_water(&self) -> bool {
        matches!(self, MapType::LandWater)
    }

    pub fn is_water(&self) -> bool {
        matches!(self, MapType::Water)
    }

    pub fn name(&self) -> &'static str {
        match self {
            MapType::Land => "land",
            MapType::LandWater => "land-water",
            MapType::Water => "water",
        }
    }
}

/// Coarse phase of the game derived from the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GamePhase {
    Starting,
    Early,
    Mid,
    Late,
}

impl GamePhase {
    pub const ALL: [GamePhase; 4] = [
        GamePhase::Starting,
        GamePhase::Early,
        GamePhase::Mid,
        GamePhase::Late,
    ];

    /// First frame of each phase (6, 15 and 40 minutes at 30 fps)
    const START_TICKS: [Tick; 4] = [0, 10_800, 27_000, 72_000];

    pub fn from_tick(tick: Tick) -> Self {
        let mut phase = GamePhase::Starting;
        for (i, start) in Self::START_TICKS.iter().enumerate() {
            if tick >= *start {
                phase = Self::ALL[i];
            }
        }
        phase
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn is_starting_phase(&self) -> bool {
        matches!(self, GamePhase::Starting)
    }
}
