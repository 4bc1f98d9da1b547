//! Row-major grid of sectors

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::core::config::SectorConfig;
use crate::core::decisions::DecisionSource;
use crate::core::error::{Result, StrategosError};
use crate::core::types::{MapType, SectorIndex, TeamId, Vec2};
use crate::sector::layout::MapLayout;
use crate::sector::spot::MetalSpot;
use crate::sector::state::{Sector, SectorBounds};
use crate::units::TargetType;

/// All sectors of the map
///
/// A map belongs to one team. Base ownership is tracked per team so rival
/// claims are rejected, but distance-to-base and interior flags describe the
/// base of the team that last called
/// [`update_distances_to_base`](Self::update_distances_to_base). Each agent
/// builds its own map from the shared layout.
#[derive(Debug, Clone)]
pub struct SectorMap {
    pub name: String,
    pub map_type: MapType,
    width: usize,
    height: usize,
    sector_size: Vec2,
    water_ratio: f32,
    /// Cap on the importance a sector reaches when claimed for a base
    max_sector_importance: f32,
    sectors: Vec<Sector>,
}

impl SectorMap {
    /// Build the grid from a layout
    ///
    /// Every sector starts with an importance of 1 plus a random bonus of up
    /// to `importance_jitter` in five steps.
    pub fn from_layout(
        layout: &MapLayout,
        config: &SectorConfig,
        decisions: &mut dyn DecisionSource,
    ) -> Self {
        let mut sectors = Vec::with_capacity(layout.width * layout.height);
        for y in 0..layout.height {
            for x in 0..layout.width {
                let index = SectorIndex::new(x, y);
                let bounds = SectorBounds {
                    left: x as f32 * layout.sector_size.x,
                    right: (x + 1) as f32 * layout.sector_size.x,
                    top: y as f32 * layout.sector_size.y,
                    bottom: (y + 1) as f32 * layout.sector_size.y,
                };
                let terrain = layout
                    .terrain
                    .get(y * layout.width + x)
                    .copied()
                    .unwrap_or_default();
                let edge_distance = x
                    .min(layout.width - 1 - x)
                    .min(y.min(layout.height - 1 - y));
                let importance =
                    1.0 + config.importance_jitter * decisions.step(5) as f32 / 4.0;
                sectors.push(Sector::new(index, bounds, terrain, edge_distance, importance));
            }
        }

        let mut map = Self {
            name: layout.name.clone(),
            map_type: layout.map_type,
            width: layout.width,
            height: layout.height,
            sector_size: layout.sector_size,
            water_ratio: layout.water_ratio(),
            max_sector_importance: config.max_sector_importance,
            sectors,
        };

        for (pos, amount) in &layout.metal_spots {
            match map.sector_at_mut(*pos) {
                Some(sector) => sector.add_metal_spot(MetalSpot::new(*pos, *amount)),
                None => warn!("Metal spot at {:?} lies outside the map", pos),
            }
        }

        map
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    /// Share of water tiles over the whole map
    pub fn water_ratio(&self) -> f32 {
        self.water_ratio
    }

    pub fn land_ratio(&self) -> f32 {
        1.0 - self.water_ratio
    }

    pub fn max_sector_importance(&self) -> f32 {
        self.max_sector_importance
    }

    #[inline]
    pub fn get(&self, index: SectorIndex) -> Option<&Sector> {
        if index.x < self.width && index.y < self.height {
            Some(&self.sectors[index.y * self.width + index.x])
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, index: SectorIndex) -> Option<&mut Sector> {
        if index.x < self.width && index.y < self.height {
            Some(&mut self.sectors[index.y * self.width + index.x])
        } else {
            None
        }
    }

    pub fn sector(&self, index: SectorIndex) -> Result<&Sector> {
        self.get(index).ok_or(StrategosError::SectorOutOfBounds(index))
    }

    pub fn sector_mut(&mut self, index: SectorIndex) -> Result<&mut Sector> {
        self.get_mut(index)
            .ok_or(StrategosError::SectorOutOfBounds(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sector> {
        self.sectors.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Sector> {
        self.sectors.iter_mut()
    }

    /// Sector containing a world position
    pub fn sector_index_at(&self, pos: Vec2) -> Option<SectorIndex> {
        if pos.x < 0.0 || pos.y < 0.0 {
            return None;
        }
        let x = (pos.x / self.sector_size.x).floor() as usize;
        let y = (pos.y / self.sector_size.y).floor() as usize;
        // positions on the far edge belong to the last sector
        let index = SectorIndex::new(
            x.min(self.width.saturating_sub(1)),
            y.min(self.height.saturating_sub(1)),
        );
        self.get(index)
            .filter(|s| s.contains(pos))
            .map(|s| s.index)
    }

    pub fn sector_at_mut(&mut self, pos: Vec2) -> Option<&mut Sector> {
        let index = self.sector_index_at(pos)?;
        self.get_mut(index)
    }

    /// The up to four grid-adjacent sectors
    pub fn neighbours(&self, index: SectorIndex) -> impl Iterator<Item = SectorIndex> {
        let (width, height) = (self.width, self.height);
        let SectorIndex { x, y } = index;
        let candidates = [
            (x > 0).then(|| SectorIndex::new(x - 1, y)),
            (x + 1 < width).then(|| SectorIndex::new(x + 1, y)),
            (y > 0).then(|| SectorIndex::new(x, y - 1)),
            (y + 1 < height).then(|| SectorIndex::new(x, y + 1)),
        ];
        candidates.into_iter().flatten()
    }

    /// Enemy mobile power vs `target_type` in a sector plus a damped share from its neighbours
    pub fn enemy_area_combat_power_vs(
        &self,
        index: SectorIndex,
        target_type: TargetType,
        neighbour_importance: f32,
    ) -> f32 {
        let Some(sector) = self.get(index) else {
            return 0.0;
        };
        let neighbours: f32 = self
            .neighbours(index)
            .filter_map(|n| self.get(n))
            .map(|s| s.enemy_mobile_power[target_type])
            .sum();
        sector.enemy_mobile_power[target_type] + neighbour_importance * neighbours
    }

    // --- base territory ---------------------------------------------------

    /// Claim a sector as base territory of `team`
    ///
    /// Fails if any team already owns the sector; the earlier claim stays.
    /// Returns whether the sector holds a free metal spot. Distances are not
    /// refreshed here; call [`update_distances_to_base`](Self::update_distances_to_base).
    pub fn claim_for_base(
        &mut self,
        index: SectorIndex,
        team: TeamId,
        max_importance: f32,
    ) -> Result<bool> {
        let sector = self.sector_mut(index)?;
        if let Some(owner) = sector.base_owner {
            warn!(
                "{} could not add sector {} to base, already claimed by {}",
                team, index, owner
            );
            return Err(StrategosError::SectorAlreadyClaimed {
                sector: index,
                team: owner,
            });
        }

        sector.base_owner = Some(team);
        sector.distance_to_base = Some(0);
        sector.importance_this_game = (sector.importance_this_game + 1.0).min(max_importance);
        Ok(sector.has_free_metal_spot())
    }

    /// Give up a base sector of `team`
    ///
    /// Only the owning team may release a sector; foreign or unclaimed
    /// sectors are left untouched.
    pub fn release_from_base(&mut self, index: SectorIndex, team: TeamId) -> Result<()> {
        let sector = self.sector_mut(index)?;
        match sector.base_owner {
            Some(owner) if owner == team => {}
            Some(owner) => {
                warn!(
                    "{} could not release sector {} from base, it belongs to {}",
                    team, index, owner
                );
                return Err(StrategosError::SectorAlreadyClaimed {
                    sector: index,
                    team: owner,
                });
            }
            None => {
                warn!("{} could not release sector {}, it is not a base sector", team, index);
                return Err(StrategosError::SectorNotInBase {
                    sector: index,
                    team,
                });
            }
        }
        sector.base_owner = None;
        sector.distance_to_base = Some(1);
        sector.interior = false;
        Ok(())
    }

    /// Base sectors of `team`, in row-major order
    pub fn base_sectors(&self, team: TeamId) -> Vec<SectorIndex> {
        self.sectors
            .iter()
            .filter(|s| s.base_owner == Some(team))
            .map(|s| s.index)
            .collect()
    }

    /// Recompute distance-to-base and interior flags from the base sectors of `team`
    ///
    /// Breadth-first over the 4-neighbourhood; without any base sector all
    /// distances are cleared. Sectors owned by other teams get ordinary
    /// distances and are never interior.
    pub fn update_distances_to_base(&mut self, team: TeamId) {
        let mut queue = VecDeque::new();
        for sector in &mut self.sectors {
            if sector.base_owner == Some(team) {
                sector.distance_to_base = Some(0);
                queue.push_back(sector.index);
            } else {
                sector.distance_to_base = None;
            }
        }

        while let Some(index) = queue.pop_front() {
            let distance = self.get(index).and_then(|s| s.distance_to_base).unwrap_or(0);
            let neighbours: Vec<SectorIndex> = self.neighbours(index).collect();
            for neighbour in neighbours {
                if let Some(sector) = self.get_mut(neighbour) {
                    if sector.distance_to_base.is_none() {
                        sector.distance_to_base = Some(distance + 1);
                        queue.push_back(neighbour);
                    }
                }
            }
        }

        let interior: Vec<bool> = self
            .sectors
            .iter()
            .map(|s| {
                s.base_owner == Some(team)
                    && self
                        .neighbours(s.index)
                        .filter_map(|n| self.get(n))
                        .all(|n| n.base_owner == Some(team))
            })
            .collect();
        for (sector, interior) in self.sectors.iter_mut().zip(interior) {
            sector.interior = interior;
        }

        debug!("Updated distances to base for {}", team);
    }

    /// Sectors at exactly `distance` from the base
    pub fn sectors_in_distance(&self, distance: u32) -> Vec<SectorIndex> {
        self.sectors
            .iter()
            .filter(|s| s.distance_to_base == Some(distance))
            .map(|s| s.index)
            .collect()
    }

    // --- per-tick ---------------------------------------------------------

    pub fn reset_local_combat_power(&mut self) {
        self.sectors
            .iter_mut()
            .for_each(|s| s.reset_local_combat_power());
    }

    pub fn update(&mut self, lost_unit_decay: f32) {
        self.sectors.iter_mut().for_each(|s| s.update(lost_unit_decay));
    }

    /// Spotted enemy structures on land and on water sectors
    pub fn spotted_enemy_buildings_by_terrain(&self) -> (f32, f32) {
        self.sectors.iter().fold((0.0, 0.0), |(land, sea), s| {
            if s.water_ratio > 0.5 {
                (land, sea + s.enemy_structures)
            } else {
                (land + s.enemy_structures, sea)
            }
        })
    }
}
