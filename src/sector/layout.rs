//! Static description of the map handed over by terrain analysis

use serde::{Deserialize, Serialize};

use crate::core::types::{ContinentId, MapType, SectorIndex, Vec2};

/// Terrain facts of one sector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectorTerrain {
    pub continent: ContinentId,
    /// Share of tiles flat enough to build on
    pub flat_ratio: f32,
    /// Share of water tiles
    pub water_ratio: f32,
    /// Sector lies on a water body large enough to count as ocean
    #[serde(default)]
    pub connected_to_ocean: bool,
}

impl Default for SectorTerrain {
    fn default() -> Self {
        Self {
            continent: 0,
            flat_ratio: 1.0,
            water_ratio: 0.0,
            connected_to_ocean: false,
        }
    }
}

/// Grid dimensions, terrain and metal spots of a map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapLayout {
    pub name: String,
    pub map_type: MapType,
    /// Number of sectors along x
    pub width: usize,
    /// Number of sectors along y
    pub height: usize,
    /// Size of one sector in world units
    pub sector_size: Vec2,
    /// Terrain per sector, row-major
    pub terrain: Vec<SectorTerrain>,
    /// Metal spot positions and amounts
    #[serde(default)]
    pub metal_spots: Vec<(Vec2, f32)>,
}

impl MapLayout {
    /// Flat land map with a single continent
    pub fn uniform(name: &str, width: usize, height: usize, sector_size: f32) -> Self {
        Self {
            name: name.to_string(),
            map_type: MapType::Land,
            width,
            height,
            sector_size: Vec2::new(sector_size, sector_size),
            terrain: vec![SectorTerrain::default(); width * height],
            metal_spots: Vec::new(),
        }
    }

    pub fn with_map_type(mut self, map_type: MapType) -> Self {
        self.map_type = map_type;
        self
    }

    pub fn with_metal_spot(mut self, pos: Vec2, amount: f32) -> Self {
        self.metal_spots.push((pos, amount));
        self
    }

    pub fn terrain_mut(&mut self, index: SectorIndex) -> Option<&mut SectorTerrain> {
        if index.x < self.width && index.y < self.height {
            self.terrain.get_mut(index.y * self.width + index.x)
        } else {
            None
        }
    }

    /// Share of water over the whole map
    pub fn water_ratio(&self) -> f32 {
        if self.terrain.is_empty() {
            return 0.0;
        }
        self.terrain.iter().map(|t| t.water_ratio).sum::<f32>() / self.terrain.len() as f32
    }
}
