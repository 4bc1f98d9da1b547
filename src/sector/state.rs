//! Per-sector bookkeeping

use ahash::AHashMap;
use tracing::debug;

use crate::core::types::{ContinentId, SectorIndex, TeamId, UnitDefId, Vec2};
use crate::sector::layout::SectorTerrain;
use crate::sector::spot::{Extractor, MetalSpot};
use crate::units::{
    CombatCategory, CombatCategoryValues, MovementType, TargetType, TargetTypeValues, UnitCatalog,
    UnitCategory,
};

/// Allied structures above which a sector no longer counts as free land
const MAX_ALLIED_STRUCTURES_FOR_EXPANSION: f32 = 3.0;

/// World-space rectangle covered by a sector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectorBounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl SectorBounds {
    pub fn center(&self) -> Vec2 {
        Vec2::new((self.left + self.right) / 2.0, (self.top + self.bottom) / 2.0)
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= self.left && pos.x <= self.right && pos.y >= self.top && pos.y <= self.bottom
    }
}

/// One cell of the strategic grid
#[derive(Debug, Clone)]
pub struct Sector {
    pub index: SectorIndex,
    pub bounds: SectorBounds,
    pub continent: ContinentId,
    pub flat_ratio: f32,
    pub water_ratio: f32,
    pub connected_to_ocean: bool,
    /// Distance to the nearest base sector in sectors; `None` while no base exists
    pub distance_to_base: Option<u32>,
    /// Team that claimed this sector as base territory
    pub base_owner: Option<TeamId>,
    /// Base sector whose neighbours all belong to the base too
    pub interior: bool,
    pub metal_spots: Vec<MetalSpot>,
    pub free_metal_spots: bool,

    pub enemy_structures: f32,
    pub allied_structures: f32,
    pub enemies_on_radar: u32,

    pub importance_this_game: f32,
    pub importance_learned: f32,

    /// Building losses attributed to each attacker category
    pub attacked_by_this_game: CombatCategoryValues,
    pub attacked_by_learned: CombatCategoryValues,
    /// Unit losses attributed to each attacker category
    pub combats_this_game: CombatCategoryValues,
    pub combats_learned: CombatCategoryValues,

    /// Own static defence power vs each target type, recomputed every tick
    pub my_static_power: TargetTypeValues,
    /// Own mobile combat power vs each target type, recomputed every tick
    pub my_mobile_power: TargetTypeValues,
    pub enemy_static_power: TargetTypeValues,
    pub enemy_mobile_power: TargetTypeValues,

    edge_distance: usize,
    enemy_combat_units: CombatCategoryValues,
    buildings: AHashMap<UnitCategory, u32>,
    lost_units: f32,
    lost_air_units: f32,
}

impl Sector {
    pub fn new(
        index: SectorIndex,
        bounds: SectorBounds,
        terrain: SectorTerrain,
        edge_distance: usize,
        importance: f32,
    ) -> Self {
        Self {
            index,
            bounds,
            continent: terrain.continent,
            flat_ratio: terrain.flat_ratio,
            water_ratio: terrain.water_ratio,
            connected_to_ocean: terrain.connected_to_ocean,
            distance_to_base: None,
            base_owner: None,
            interior: false,
            metal_spots: Vec::new(),
            free_metal_spots: false,
            enemy_structures: 0.0,
            allied_structures: 0.0,
            enemies_on_radar: 0,
            importance_this_game: importance,
            importance_learned: 1.0,
            attacked_by_this_game: CombatCategoryValues::new(),
            attacked_by_learned: CombatCategoryValues::new(),
            combats_this_game: CombatCategoryValues::new(),
            combats_learned: CombatCategoryValues::new(),
            my_static_power: TargetTypeValues::new(),
            my_mobile_power: TargetTypeValues::new(),
            enemy_static_power: TargetTypeValues::new(),
            enemy_mobile_power: TargetTypeValues::new(),
            edge_distance,
            enemy_combat_units: CombatCategoryValues::new(),
            buildings: AHashMap::new(),
            lost_units: 0.0,
            lost_air_units: 0.0,
        }
    }

    // --- metal spots -------------------------------------------------------

    pub fn add_metal_spot(&mut self, spot: MetalSpot) {
        self.metal_spots.push(spot);
        self.free_metal_spots = true;
    }

    pub fn number_of_metal_spots(&self) -> usize {
        self.metal_spots.len()
    }

    /// First unoccupied metal spot
    pub fn free_metal_spot(&self) -> Option<&MetalSpot> {
        self.metal_spots.iter().find(|s| !s.occupied)
    }

    pub fn has_free_metal_spot(&self) -> bool {
        self.metal_spots.iter().any(|s| !s.occupied)
    }

    /// Mark the spot at `pos` as taken; returns false if no free spot lies there
    pub fn occupy_metal_spot(&mut self, pos: Vec2) -> bool {
        let Some(spot) = self
            .metal_spots
            .iter_mut()
            .find(|s| !s.occupied && s.is_at(pos))
        else {
            return false;
        };
        spot.occupied = true;
        self.free_metal_spots = self.has_free_metal_spot();
        true
    }

    /// Associate an extractor with the occupied spot at `pos`
    pub fn add_extractor(&mut self, unit: u32, def: UnitDefId, pos: Vec2) -> bool {
        match self.metal_spots.iter_mut().find(|s| s.is_at(pos)) {
            Some(spot) => {
                spot.occupied = true;
                spot.extractor = Some(Extractor { unit, def });
                self.free_metal_spots = self.has_free_metal_spot();
                true
            }
            None => {
                debug!("No metal spot at {:?} in sector {}", pos, self.index);
                false
            }
        }
    }

    /// Release the occupied spot at `pos`; returns whether a spot was freed
    pub fn release_metal_spot(&mut self, pos: Vec2) -> bool {
        match self
            .metal_spots
            .iter_mut()
            .find(|s| s.occupied && s.is_at(pos))
        {
            Some(spot) => {
                spot.release();
                self.free_metal_spots = true;
                true
            }
            None => false,
        }
    }

    // --- per-tick bookkeeping ---------------------------------------------

    /// Zero own static/mobile power and the allied-structure counter
    pub fn reset_local_combat_power(&mut self) {
        self.allied_structures = 0.0;
        self.my_static_power.fill(0.0);
        self.my_mobile_power.fill(0.0);
    }

    /// Let recent losses fade
    pub fn update(&mut self, lost_unit_decay: f32) {
        self.lost_units *= lost_unit_decay;
        self.lost_air_units *= lost_unit_decay;
    }

    /// Forget all enemy sightings (units, structures and radar contacts)
    pub fn reset_spotted_enemies_data(&mut self) {
        self.enemy_combat_units.fill(0.0);
        self.enemy_structures = 0.0;
        self.enemies_on_radar = 0;
    }

    pub fn add_enemy_combat_unit(&mut self, category: CombatCategory, value: f32) {
        self.enemy_combat_units[category] += value;
    }

    pub fn enemy_combat_units(&self, category: CombatCategory) -> f32 {
        self.enemy_combat_units[category]
    }

    pub fn spotted_enemy_combat_units(&self) -> &CombatCategoryValues {
        &self.enemy_combat_units
    }

    pub fn total_enemy_combat_units(&self) -> f32 {
        self.enemy_combat_units.sum()
    }

    pub fn is_occupied_by_enemies(&self) -> bool {
        self.total_enemy_combat_units() > 0.1
            || self.enemy_structures > 0.01
            || self.enemies_on_radar > 0
    }

    /// Attribute a loss in this sector to the attacker's category
    ///
    /// Building losses count as attacks (damped in interior sectors), unit
    /// losses count as combats and feed the decaying lost-unit tallies.
    pub fn update_threat_values(
        &mut self,
        destroyed: UnitDefId,
        attacker: UnitDefId,
        catalog: &dyn UnitCatalog,
        interior_weight: f32,
    ) {
        let destroyed_category = catalog.category(destroyed);
        let attacker_category = catalog.category(attacker).combat_category();

        if destroyed_category.is_building() {
            if let Some(category) = attacker_category {
                let increment = if self.interior { interior_weight } else { 1.0 };
                self.attacked_by_this_game[category] += increment;
            }
        } else {
            if let Some(category) = attacker_category {
                self.combats_this_game[category] += 1.0;
            }

            if catalog.movement_type(destroyed).is_air() {
                self.lost_air_units += 1.0;
            } else {
                self.lost_units += 1.0;
            }
        }
    }

    pub fn lost_units(&self) -> f32 {
        self.lost_units + self.lost_air_units
    }

    pub fn lost_air_units(&self) -> f32 {
        self.lost_air_units
    }

    // --- buildings --------------------------------------------------------

    pub fn add_building(&mut self, category: UnitCategory) {
        *self.buildings.entry(category).or_insert(0) += 1;
    }

    pub fn remove_building(&mut self, category: UnitCategory) {
        if let Some(count) = self.buildings.get_mut(&category) {
            *count = count.saturating_sub(1);
        }
    }

    pub fn number_of_buildings(&self, category: UnitCategory) -> u32 {
        self.buildings.get(&category).copied().unwrap_or(0)
    }

    // --- threat -----------------------------------------------------------

    /// `1 + ` the learned/current blend of attacks by `category`
    pub fn threat_by(&self, category: CombatCategory, learned: f32, current: f32) -> f32 {
        1.0 + self.attack_rate_by(category, learned, current)
    }

    /// Learned/current blend of attacks by `category`
    pub fn attack_rate_by(&self, category: CombatCategory, learned: f32, current: f32) -> f32 {
        (learned * self.attacked_by_learned[category] + current * self.attacked_by_this_game[category])
            / (learned + current)
    }

    /// Learned/current blend of attacks by units of the catalog entry `def`
    ///
    /// Non-combat and unknown definitions pose no threat.
    pub fn threat_by_id(
        &self,
        def: UnitDefId,
        catalog: &dyn UnitCatalog,
        learned: f32,
        current: f32,
    ) -> f32 {
        match catalog.category(def).combat_category() {
            Some(category) => self.attack_rate_by(category, learned, current),
            None => {
                debug!("No combat category for {} in sector {}", def, self.index);
                0.0
            }
        }
    }

    /// Blend of attacks by ground, air, hover and sea units
    pub fn overall_threat(&self, learned: f32, current: f32) -> f32 {
        let main = [
            CombatCategory::Ground,
            CombatCategory::Air,
            CombatCategory::Hover,
            CombatCategory::Sea,
        ];
        let learned_sum: f32 = main.iter().map(|c| self.attacked_by_learned[*c]).sum();
        let current_sum: f32 = main.iter().map(|c| self.attacked_by_this_game[*c]).sum();
        (learned * learned_sum + current * current_sum) / (learned + current)
    }

    /// Attacker category with the highest threat relative to own static defence
    ///
    /// Early in the game learned attacks weigh more; the weight shifts to
    /// this game's attacks as time passes. Interior sectors can only be
    /// reached from the air.
    pub fn weakest_category(&self, tick: u64) -> Option<CombatCategory> {
        if self.interior {
            return Some(CombatCategory::Air);
        }

        let learned = 60_000.0 / (tick as f32 + 30_000.0) + 0.5;
        let current = 2.5 - learned;

        let mut weakest = None;
        let mut most_important = 0.0;
        for category in CombatCategory::ALL {
            let importance = self.threat_by(category, learned, current)
                / (0.1 + self.my_static_power[category.target_type()]);
            if importance > most_important {
                most_important = importance;
                weakest = Some(category);
            }
        }
        weakest
    }

    /// Attacks by ground, hover and sea units this game
    pub fn total_attacks_this_game(&self) -> f32 {
        self.attacked_by_this_game[CombatCategory::Ground]
            + self.attacked_by_this_game[CombatCategory::Hover]
            + self.attacked_by_this_game[CombatCategory::Sea]
    }

    /// Attacks by ground, hover and sea units remembered from previous games
    pub fn total_attacks_in_previous_games(&self) -> f32 {
        self.attacked_by_learned[CombatCategory::Ground]
            + self.attacked_by_learned[CombatCategory::Hover]
            + self.attacked_by_learned[CombatCategory::Sea]
    }

    // --- combat power -----------------------------------------------------

    /// Own mobile power weighted by `weights`
    pub fn my_combat_power(&self, weights: &TargetTypeValues) -> f32 {
        self.my_mobile_power.weighted_sum(weights)
    }

    /// Own static defence power weighted by `weights`
    pub fn my_defence_power(&self, weights: &TargetTypeValues) -> f32 {
        self.my_static_power.weighted_sum(weights)
    }

    /// Own static defence power vs one target type
    pub fn friendly_static_defence_power(&self, target_type: TargetType) -> f32 {
        self.my_static_power[target_type]
    }

    /// Spotted enemy mobile power weighted by `weights`
    pub fn enemy_combat_power(&self, weights: &TargetTypeValues) -> f32 {
        self.enemy_mobile_power.weighted_sum(weights)
    }

    /// Spotted enemy static plus mobile power weighted by `weights`
    pub fn enemy_defence_power(&self, weights: &TargetTypeValues) -> f32 {
        (self.enemy_static_power + self.enemy_mobile_power).weighted_sum(weights)
    }

    pub fn enemy_static_power_vs(&self, target_type: TargetType) -> f32 {
        self.enemy_static_power[target_type]
    }

    pub fn enemy_mobile_power_vs(&self, target_type: TargetType) -> f32 {
        self.enemy_mobile_power[target_type]
    }

    pub fn enemy_combined_power_vs(&self, target_type: TargetType) -> f32 {
        self.enemy_static_power[target_type] + self.enemy_mobile_power[target_type]
    }

    /// Enemy static plus mobile power against units moving as `movement`
    pub fn enemy_threat_to_movement_type(&self, movement: MovementType) -> f32 {
        if movement.is_static() || movement.is_empty() {
            return 0.0;
        }
        self.enemy_combined_power_vs(movement.target_type())
    }

    /// Replace the enemy power estimate with a fresh sighting
    pub fn set_enemy_combat_power(&mut self, static_power: TargetTypeValues, mobile_power: TargetTypeValues) {
        self.enemy_static_power = static_power;
        self.enemy_mobile_power = mobile_power;
    }

    // --- geometry and base ------------------------------------------------

    pub fn center(&self) -> Vec2 {
        self.bounds.center()
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        self.bounds.contains(pos)
    }

    /// Minimum distance to a map edge in sectors
    pub fn edge_distance(&self) -> usize {
        self.edge_distance
    }

    pub fn is_base(&self) -> bool {
        self.distance_to_base == Some(0)
    }

    /// Free neighbour land no one else builds on
    pub fn is_suitable_for_base_expansion(&self) -> bool {
        !self.is_base()
            && self.base_owner.is_none()
            && !self.is_occupied_by_enemies()
            && self.allied_structures < MAX_ALLIED_STRUCTURES_FOR_EXPANSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{StaticCatalog, UnitProfile, UnitRole};

    fn sector() -> Sector {
        Sector::new(
            SectorIndex::new(1, 1),
            SectorBounds {
                left: 100.0,
                right: 200.0,
                top: 100.0,
                bottom: 200.0,
            },
            SectorTerrain::default(),
            1,
            1.0,
        )
    }

    fn profile(id: u32, category: UnitCategory, movement: MovementType) -> UnitProfile {
        UnitProfile {
            id: UnitDefId(id),
            name: format!("unit{}", id),
            category,
            role: UnitRole::Assault,
            movement,
            combat_power: TargetTypeValues::new(),
            primary_ability: 0.0,
            cost: 100.0,
            buildtime: 10.0,
            builds: vec![],
        }
    }

    fn catalog() -> StaticCatalog {
        let mut catalog = StaticCatalog::new();
        catalog.insert(profile(1, UnitCategory::GroundCombat, MovementType::GROUND)).unwrap();
        catalog.insert(profile(2, UnitCategory::AirCombat, MovementType::AIR)).unwrap();
        catalog.insert(profile(3, UnitCategory::PowerPlant, MovementType::STATIC_LAND)).unwrap();
        catalog
    }

    #[test]
    fn test_building_loss_counts_as_attack() {
        let catalog = catalog();
        let mut sector = sector();
        sector.update_threat_values(UnitDefId(3), UnitDefId(1), &catalog, 0.3);
        assert_eq!(sector.attacked_by_this_game[CombatCategory::Ground], 1.0);
        assert_eq!(sector.lost_units(), 0.0);

        sector.interior = true;
        sector.update_threat_values(UnitDefId(3), UnitDefId(1), &catalog, 0.3);
        assert!((sector.attacked_by_this_game[CombatCategory::Ground] - 1.3).abs() < 1e-6);
    }

    #[test]
    fn test_unit_loss_counts_as_combat() {
        let catalog = catalog();
        let mut sector = sector();
        sector.update_threat_values(UnitDefId(1), UnitDefId(2), &catalog, 0.3);
        sector.update_threat_values(UnitDefId(2), UnitDefId(2), &catalog, 0.3);
        assert_eq!(sector.combats_this_game[CombatCategory::Air], 2.0);
        assert_eq!(sector.lost_units(), 2.0);
        assert_eq!(sector.lost_air_units(), 1.0);
        assert_eq!(sector.attacked_by_this_game.sum(), 0.0);
    }

    #[test]
    fn test_unknown_attacker_only_counts_loss() {
        let catalog = catalog();
        let mut sector = sector();
        sector.update_threat_values(UnitDefId(1), UnitDefId(99), &catalog, 0.3);
        assert_eq!(sector.combats_this_game.sum(), 0.0);
        assert_eq!(sector.lost_units(), 1.0);
    }

    #[test]
    fn test_occupied_by_enemies() {
        let mut sector = sector();
        assert!(!sector.is_occupied_by_enemies());
        sector.add_enemy_combat_unit(CombatCategory::Hover, 0.05);
        assert!(!sector.is_occupied_by_enemies());
        sector.add_enemy_combat_unit(CombatCategory::Hover, 0.1);
        assert!(sector.is_occupied_by_enemies());
        sector.reset_spotted_enemies_data();
        assert!(!sector.is_occupied_by_enemies());
        sector.enemies_on_radar = 1;
        assert!(sector.is_occupied_by_enemies());
    }

    #[test]
    fn test_threat_blend() {
        let mut sector = sector();
        sector.attacked_by_learned[CombatCategory::Sea] = 4.0;
        sector.attacked_by_this_game[CombatCategory::Sea] = 2.0;
        assert!((sector.threat_by(CombatCategory::Sea, 1.0, 1.0) - 4.0).abs() < 1e-6);
        assert!((sector.attack_rate_by(CombatCategory::Sea, 1.0, 3.0) - 2.5).abs() < 1e-6);
        assert_eq!(sector.total_attacks_this_game(), 2.0);
        assert_eq!(sector.total_attacks_in_previous_games(), 4.0);
    }

    #[test]
    fn test_threat_by_unit_definition() {
        let catalog = catalog();
        let mut sector = sector();
        sector.attacked_by_learned[CombatCategory::Ground] = 6.0;
        sector.attacked_by_this_game[CombatCategory::Ground] = 2.0;
        sector.attacked_by_this_game[CombatCategory::Air] = 4.0;

        assert!((sector.threat_by_id(UnitDefId(1), &catalog, 1.0, 3.0) - 3.0).abs() < 1e-6);
        assert!((sector.threat_by_id(UnitDefId(2), &catalog, 1.0, 1.0) - 2.0).abs() < 1e-6);
        assert_eq!(sector.threat_by_id(UnitDefId(3), &catalog, 1.0, 1.0), 0.0);
        assert_eq!(sector.threat_by_id(UnitDefId(99), &catalog, 1.0, 1.0), 0.0);
    }

    #[test]
    fn test_weakest_category() {
        let mut sector = sector();
        sector.attacked_by_this_game[CombatCategory::Hover] = 5.0;
        assert_eq!(sector.weakest_category(300_000), Some(CombatCategory::Hover));

        sector.my_static_power[TargetType::Surface] = 100.0;
        sector.attacked_by_this_game[CombatCategory::Air] = 1.0;
        assert_eq!(sector.weakest_category(300_000), Some(CombatCategory::Air));

        sector.interior = true;
        sector.attacked_by_this_game[CombatCategory::Air] = 0.0;
        assert_eq!(sector.weakest_category(300_000), Some(CombatCategory::Air));
    }

    #[test]
    fn test_power_accessors() {
        let mut sector = sector();
        let mut static_power = TargetTypeValues::new();
        static_power[TargetType::Surface] = 3.0;
        let mut mobile_power = TargetTypeValues::new();
        mobile_power[TargetType::Surface] = 2.0;
        mobile_power[TargetType::Air] = 5.0;
        sector.set_enemy_combat_power(static_power, mobile_power);

        assert_eq!(sector.enemy_static_power_vs(TargetType::Surface), 3.0);
        assert_eq!(sector.enemy_mobile_power_vs(TargetType::Surface), 2.0);
        assert_eq!(sector.enemy_combined_power_vs(TargetType::Surface), 5.0);
        assert_eq!(sector.enemy_threat_to_movement_type(MovementType::GROUND), 5.0);
        assert_eq!(sector.enemy_threat_to_movement_type(MovementType::AIR), 5.0);
        assert_eq!(sector.enemy_threat_to_movement_type(MovementType::STATIC_LAND), 0.0);

        let weights = TargetTypeValues::filled(1.0);
        assert_eq!(sector.enemy_combat_power(&weights), 7.0);
        assert_eq!(sector.enemy_defence_power(&weights), 10.0);
    }

    #[test]
    fn test_buildings_and_geometry() {
        let mut sector = sector();
        sector.add_building(UnitCategory::StaticDefence);
        sector.add_building(UnitCategory::StaticDefence);
        sector.remove_building(UnitCategory::StaticDefence);
        sector.remove_building(UnitCategory::Storage);
        assert_eq!(sector.number_of_buildings(UnitCategory::StaticDefence), 1);
        assert_eq!(sector.number_of_buildings(UnitCategory::Storage), 0);

        assert_eq!(sector.center(), Vec2::new(150.0, 150.0));
        assert!(sector.contains(Vec2::new(120.0, 180.0)));
        assert!(!sector.contains(Vec2::new(20.0, 180.0)));
    }
}
