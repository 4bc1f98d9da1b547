//! Base territory: claiming sectors and growing the base

use tracing::{info, warn};

use crate::brain::Brain;
use crate::core::error::StrategosError;
use crate::core::types::{MapType, SectorIndex, Vec2};
use crate::sector::{Sector, SectorMap};
use crate::stats::StatisticalData;

/// Bases below this size let the commander build next to them
const SMALL_BASE_SIZE: usize = 3;

struct ExpansionCandidate {
    index: SectorIndex,
    distance: f32,
    total_attacks: f32,
}

impl Brain {
    /// Add a sector to the base or give it up
    ///
    /// Returns false if the sector lies outside the map, another team
    /// already owns it, or (when releasing) it is not one of our base sectors. On success distances, terrain ratios and the center
    /// of the base are refreshed.
    pub fn assign_sector_to_base(&mut self, map: &mut SectorMap, index: SectorIndex, add: bool) -> bool {
        let result = if add {
            let max_importance = map.max_sector_importance();
            map.claim_for_base(index, self.team, max_importance)
                .map(|_| ())
        } else {
            map.release_from_base(index, self.team)
        };
        if result.is_err() {
            return false;
        }

        self.refresh_base(map);
        true
    }

    /// Recompute distance buckets, terrain ratios, center and free metal spots of the base
    fn refresh_base(&mut self, map: &mut SectorMap) {
        map.update_distances_to_base(self.team);
        for (distance, bucket) in self.sectors_in_distance.iter_mut().enumerate() {
            *bucket = map.sectors_in_distance(distance as u32);
        }

        let base: Vec<&Sector> = self.sectors_in_distance[0]
            .iter()
            .filter_map(|index| map.get(*index))
            .collect();

        self.base_flat_land_ratio = 0.0;
        self.base_water_ratio = 0.0;
        self.center_of_base = Vec2::ZERO;
        if !base.is_empty() {
            let count = base.len() as f32;
            let mut center = Vec2::ZERO;
            for sector in &base {
                self.base_flat_land_ratio += sector.flat_ratio;
                self.base_water_ratio += sector.water_ratio;
                center = center + sector.center();
            }
            self.base_flat_land_ratio /= count;
            self.base_water_ratio /= count;
            self.center_of_base = center * (1.0 / count);
        }
        self.free_metal_spots_in_base = base.iter().any(|s| s.has_free_metal_spot());
    }

    /// Refresh the free metal spot flag of the base after extractors changed
    pub fn update_free_metal_spots_in_base(&mut self, map: &SectorMap) {
        self.free_metal_spots_in_base = self.sectors_in_distance[0]
            .iter()
            .filter_map(|index| map.get(*index))
            .any(|s| s.has_free_metal_spot());
    }

    /// First expansion after the start sector was claimed
    ///
    /// Start sectors away from the map edge prefer safe neighbours.
    pub fn expand_base_at_startup(&mut self, map: &mut SectorMap) -> Option<SectorIndex> {
        let Some(start) = self.sectors_in_distance[0].first().copied() else {
            warn!(
                "Failed to expand initial base for {}: {}",
                self.team,
                StrategosError::NoBaseSectors
            );
            return None;
        };
        let prefer_safe = map.get(start).map(|s| s.edge_distance() > 0).unwrap_or(false);
        let map_type = map.map_type;
        self.expand_base(map, map_type, prefer_safe)
    }

    /// Add the best rated neighbouring sector to the base
    ///
    /// Candidates are suitable sectors next to the base, or up to three
    /// sectors away when a land base looks for water. Ratings favour metal
    /// spots and compact bases, then either safe sectors (few past attacks,
    /// far from the map edge) or sectors near the edge, then flat land or
    /// open water depending on `sector_type`.
    pub fn expand_base(
        &mut self,
        map: &mut SectorMap,
        sector_type: MapType,
        prefer_safe: bool,
    ) -> Option<SectorIndex> {
        if self.sectors_in_distance[0].is_empty() {
            warn!("{} could not expand base: {}", self.team, StrategosError::NoBaseSectors);
            return None;
        }
        if self.sectors_in_distance[0].len() >= self.config.max_base_size {
            return None;
        }

        let into_water = sector_type.is_water() && self.base_water_ratio < 0.1;
        let max_search_distance = if into_water { 3 } else { 1 };

        let mut candidates = Vec::new();
        let mut distances = StatisticalData::new();
        let mut attacks = StatisticalData::new();
        for search_distance in 1..=max_search_distance {
            for index in self.sectors_in_distance(search_distance) {
                let Some(sector) = map.get(*index) else {
                    continue;
                };
                if !sector.is_suitable_for_base_expansion() {
                    continue;
                }
                let distance: f32 = self.sectors_in_distance[0]
                    .iter()
                    .map(|base| index.distance_squared(base) as f32)
                    .sum();
                let total_attacks =
                    sector.total_attacks_this_game() + sector.total_attacks_in_previous_games();
                distances.add_value(distance);
                attacks.add_value(total_attacks);
                candidates.push(ExpansionCandidate {
                    index: *index,
                    distance,
                    total_attacks,
                });
            }
        }
        distances.finalize();
        attacks.finalize();

        let mut selected = None;
        let mut highest_rating = 0.0;
        for candidate in &candidates {
            let Some(sector) = map.get(candidate.index) else {
                continue;
            };
            let edge_distance = sector.edge_distance() as f32;

            let mut rating = sector.number_of_metal_spots() as f32
                + 4.0 * distances.deviation_from_max(candidate.distance);
            if prefer_safe {
                rating += 4.0 * attacks.deviation_from_max(candidate.total_attacks);
                rating += 4.0 / (edge_distance + 1.0);
            } else {
                rating += edge_distance.min(4.0);
            }

            rating += match sector_type {
                MapType::Land => 3.0 * sector.flat_ratio,
                MapType::Water if sector.connected_to_ocean => 3.0 * sector.water_ratio,
                MapType::Water => 0.0,
                MapType::LandWater => 3.0 * (sector.flat_ratio + sector.water_ratio),
            };

            if rating > highest_rating {
                highest_rating = rating;
                selected = Some(candidate.index);
            }
        }

        let index = selected?;
        if !self.assign_sector_to_base(map, index, true) {
            return None;
        }
        info!(
            "Adding {} sector {} to base of {}; base size {}, flat/water ratio {:.2}/{:.2}",
            sector_type.name(),
            index,
            self.team,
            self.sectors_in_distance[0].len(),
            self.base_flat_land_ratio,
            self.base_water_ratio
        );
        Some(index)
    }

    /// Whether the commander may leave the base to build in `sector`
    ///
    /// Never into enemy-occupied sectors; anywhere before a base exists;
    /// next to the base while it is small.
    pub fn is_commander_allowed_for_construction_in_sector(&self, sector: &Sector) -> bool {
        if sector.is_occupied_by_enemies() {
            return false;
        }
        match sector.distance_to_base {
            None | Some(0) => true,
            Some(1) => self.sectors_in_distance[0].len() < SMALL_BASE_SIZE,
            Some(_) => false,
        }
    }
}
