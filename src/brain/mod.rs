//! Strategic brain
//!
//! Owns the cross-sector aggregates: economy trend buffers, own mobile
//! combat power, attacked-by rates, peak enemy sightings and the estimated
//! pressure by enemies. The scoring functions built on them live in
//! [`selection`] and [`threat`]; base growth lives in [`expansion`].

pub mod expansion;
pub mod knowledge;
pub mod selection;
pub mod threat;

pub use knowledge::{AttackedByRates, MapMemory, PersistentKnowledge, SectorMemory};
pub use threat::CombatUnitRequest;
pub use selection::{
    income_factor, CombatUnitSelectionCriteria, ExtractorSelectionCriteria,
    PowerPlantSelectionCriteria, ScoutSelectionCriteria, StaticDefenceSelectionCriteria,
    StorageSelectionCriteria,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::config::BrainConfig;
use crate::core::types::{GamePhase, MapType, SectorIndex, TeamId, UnitDefId, Vec2};
use crate::forces::{ForceCensus, GroupRegistry};
use crate::sector::SectorMap;
use crate::stats::SampleBuffer;
use crate::units::{TargetType, TargetTypeValues, UnitCatalog, UnitCategory, UnitRole};

/// One sample of the economy as reported by the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EconomySample {
    pub metal_income: f32,
    pub energy_income: f32,
    pub metal_usage: f32,
    pub energy_usage: f32,
    pub stored_metal: f32,
    pub stored_energy: f32,
    #[serde(default)]
    pub metal_storage: f32,
    #[serde(default)]
    pub energy_storage: f32,
}

#[derive(Debug, Clone)]
pub struct Brain {
    config: BrainConfig,
    team: TeamId,
    map_type: MapType,
    map_water_ratio: f32,
    map_land_ratio: f32,

    /// Sector indices per distance to base, `[0]` being the base itself
    sectors_in_distance: Vec<Vec<SectorIndex>>,
    base_flat_land_ratio: f32,
    base_water_ratio: f32,
    center_of_base: Vec2,
    /// Base has at least one unoccupied metal spot
    pub free_metal_spots_in_base: bool,

    metal_available: SampleBuffer,
    energy_available: SampleBuffer,
    metal_income: SampleBuffer,
    energy_income: SampleBuffer,
    metal_surplus: SampleBuffer,
    energy_surplus: SampleBuffer,
    last_sample: EconomySample,

    /// Base threat per mobile target type derived from the map
    enemy_threat_by_map: TargetTypeValues,
    max_spotted_combat_units: TargetTypeValues,
    recently_attacked_by: TargetTypeValues,
    total_mobile_combat_power: TargetTypeValues,
    pressure: f32,
}

impl Brain {
    pub fn new(config: &BrainConfig, team: TeamId, map: &SectorMap) -> Self {
        let samples = config.income_sample_points;
        let water = map.water_ratio();

        let mut enemy_threat_by_map = TargetTypeValues::new();
        for target_type in TargetType::MOBILE {
            enemy_threat_by_map[target_type] = config.enemy_threat_by_terrain;
        }
        enemy_threat_by_map[TargetType::Surface] *= 1.0 - water;
        enemy_threat_by_map[TargetType::Floater] *= water;
        enemy_threat_by_map[TargetType::Submerged] *= water;

        let by_map_type = config.enemy_threat_by_map_type;
        match map.map_type {
            MapType::Land => {
                enemy_threat_by_map[TargetType::Surface] += by_map_type;
            }
            MapType::LandWater => {
                enemy_threat_by_map[TargetType::Surface] += by_map_type;
                enemy_threat_by_map[TargetType::Floater] += by_map_type;
                enemy_threat_by_map[TargetType::Submerged] += by_map_type;
            }
            MapType::Water => {
                enemy_threat_by_map[TargetType::Floater] += by_map_type;
                enemy_threat_by_map[TargetType::Submerged] += by_map_type;
            }
        }

        Self {
            config: config.clone(),
            team,
            map_type: map.map_type,
            map_water_ratio: water,
            map_land_ratio: map.land_ratio(),
            sectors_in_distance: vec![Vec::new(); config.max_sector_distance_to_base.max(3) + 1],
            base_flat_land_ratio: 0.0,
            base_water_ratio: 0.0,
            center_of_base: Vec2::ZERO,
            free_metal_spots_in_base: false,
            metal_available: SampleBuffer::new(samples),
            energy_available: SampleBuffer::new(samples),
            metal_income: SampleBuffer::new(samples),
            energy_income: SampleBuffer::new(samples),
            metal_surplus: SampleBuffer::new(samples),
            energy_surplus: SampleBuffer::new(samples),
            last_sample: EconomySample::default(),
            enemy_threat_by_map,
            max_spotted_combat_units: TargetTypeValues::new(),
            recently_attacked_by: TargetTypeValues::new(),
            total_mobile_combat_power: TargetTypeValues::new(),
            pressure: 0.0,
        }
    }

    pub fn team(&self) -> TeamId {
        self.team
    }

    pub fn map_type(&self) -> MapType {
        self.map_type
    }

    pub fn config(&self) -> &BrainConfig {
        &self.config
    }

    // --- economy ----------------------------------------------------------

    /// Record one economy sample; negative surpluses count as zero
    pub fn update_resources(&mut self, sample: EconomySample) {
        let energy_surplus = (sample.energy_income - sample.energy_usage).max(0.0);
        let metal_surplus = (sample.metal_income - sample.metal_usage).max(0.0);

        self.metal_available.add_value(sample.stored_metal);
        self.energy_available.add_value(sample.stored_energy);
        self.energy_income.add_value(sample.energy_income);
        self.metal_income.add_value(sample.metal_income);
        self.energy_surplus.add_value(energy_surplus);
        self.metal_surplus.add_value(metal_surplus);
        self.last_sample = sample;
    }

    /// Credit a finished power plant to the energy buffers at once
    ///
    /// Without the refill the new output would take a whole buffer length to
    /// show up in the averages and more plants would be ordered meanwhile.
    pub fn power_plant_finished(&mut self, power_plant: UnitDefId, catalog: &dyn UnitCatalog) {
        let output = catalog.primary_ability(power_plant);
        let energy_income = self.energy_income.average_value() + output;
        let energy_surplus = self.energy_surplus.average_value() + 0.5 * output;
        self.energy_income.fill(energy_income);
        self.energy_surplus.fill(energy_surplus);
    }

    pub fn average_metal_income(&self) -> f32 {
        self.metal_income.average_value()
    }

    pub fn average_energy_income(&self) -> f32 {
        self.energy_income.average_value()
    }

    pub fn average_metal_surplus(&self) -> f32 {
        self.metal_surplus.average_value()
    }

    pub fn average_energy_surplus(&self) -> f32 {
        self.energy_surplus.average_value()
    }

    pub fn average_metal_available(&self) -> f32 {
        self.metal_available.average_value()
    }

    pub fn average_energy_available(&self) -> f32 {
        self.energy_available.average_value()
    }

    pub fn last_economy_sample(&self) -> &EconomySample {
        &self.last_sample
    }

    /// Energy surplus plus a share of stored energy, minus twice the smallest plant's output
    pub fn average_power_surplus(&self, catalog: &dyn UnitCatalog) -> f32 {
        (self.energy_surplus.average_value() + 0.03 * self.energy_available.average_value()
            - 2.0 * catalog.min_power_plant_output())
        .max(1.0)
    }

    pub fn energy_urgency(&self, catalog: &dyn UnitCatalog) -> f32 {
        let surplus = self.average_power_surplus(catalog);
        if surplus > self.config.power_surplus_stop_threshold {
            0.0
        } else {
            (0.04 * self.energy_income.average_value() + 5.0) / surplus
        }
    }

    pub fn metal_urgency(&self, census: &ForceCensus) -> f32 {
        if census.active(UnitCategory::MetalExtractor) > 0 {
            4.0 / (2.0 * self.metal_surplus.average_value() + 0.5)
        } else {
            8.0
        }
    }

    fn storage_wanted(&self, census: &ForceCensus) -> bool {
        census.active(UnitCategory::Storage) < self.config.max_storage
            && census.under_construction(UnitCategory::Storage) == 0
            && census.active_factories() >= self.config.min_factories_for_storage
    }

    /// 0 (nothing stored) to 0.3 (energy storage full)
    pub fn energy_storage_urgency(&self, census: &ForceCensus) -> f32 {
        if self.storage_wanted(census) {
            let storage = self.last_sample.energy_storage.max(1.0);
            0.3 * self.energy_available.average_value() / storage
        } else {
            0.0
        }
    }

    /// 0 (nothing stored) to 1 (metal storage full)
    pub fn metal_storage_urgency(&self, census: &ForceCensus) -> f32 {
        if self.storage_wanted(census) {
            let storage = self.last_sample.metal_storage.max(1.0);
            self.metal_available.average_value() / storage
        } else {
            0.0
        }
    }

    /// Relative cost of spending on anything right now
    pub fn affordable(&self) -> f32 {
        25.0 / (self.last_sample.metal_income + 5.0)
    }

    /// Economy buildings are always worth assisting, everything else needs a surplus
    pub fn sufficient_resources_to_assist_construction(
        &self,
        def: UnitDefId,
        catalog: &dyn UnitCatalog,
    ) -> bool {
        let category = catalog.category(def);
        if category.is_metal_extractor() || category.is_power_plant() {
            return true;
        }
        self.metal_surplus.average_value() > self.config.min_metal_surplus_for_assist
            && self.energy_surplus.average_value() > self.config.min_energy_surplus_for_assist
    }

    // --- enemy sightings and attacks --------------------------------------

    /// Decay the peak sightings, then raise them to any higher fresh value
    pub fn update_max_combat_units_spotted(&mut self, spotted: &TargetTypeValues) {
        self.max_spotted_combat_units
            .multiply_values(self.config.spotted_units_decay);
        for target_type in TargetType::MOBILE {
            if spotted[target_type] > self.max_spotted_combat_units[target_type] {
                self.max_spotted_combat_units[target_type] = spotted[target_type];
            }
        }
    }

    pub fn max_spotted_combat_units(&self) -> &TargetTypeValues {
        &self.max_spotted_combat_units
    }

    pub fn update_attacked_by_values(&mut self) {
        self.recently_attacked_by
            .multiply_values(self.config.attacked_by_decay);
    }

    /// Count an attack by units presenting `target_type`, this game and in memory
    pub fn attacked_by(
        &mut self,
        target_type: TargetType,
        phase: GamePhase,
        knowledge: &mut PersistentKnowledge,
    ) {
        self.recently_attacked_by[target_type] += 1.0;
        knowledge.add_attack(self.map_type, phase, target_type);
    }

    pub fn recently_attacked_by(&self) -> &TargetTypeValues {
        &self.recently_attacked_by
    }

    /// Blend of the learned rate and this game's decaying rate
    pub fn attacks_by(
        &self,
        target_type: TargetType,
        phase: GamePhase,
        knowledge: &PersistentKnowledge,
    ) -> f32 {
        self.config.learned_attack_weight
            * knowledge.attacked_by_rate(self.map_type, phase, target_type)
            + self.config.current_attack_weight * self.recently_attacked_by[target_type]
    }

    // --- own forces -------------------------------------------------------

    /// Recompute total mobile combat power from the live groups
    pub fn update_defence_capabilities(&mut self, groups: &GroupRegistry, catalog: &dyn UnitCatalog) {
        self.total_mobile_combat_power.fill(0.0);
        for group in groups.iter().filter(|g| g.is_combat_group()) {
            let power = group.combat_power(catalog);
            add_to_mobile_combat_power(
                &mut self.total_mobile_combat_power,
                &power,
                group.role,
                group.category,
            );
        }
    }

    /// Add one finished unit to the total mobile combat power
    pub fn add_defence_capabilities(&mut self, def: UnitDefId, catalog: &dyn UnitCatalog) {
        let power = catalog.combat_power(def);
        add_to_mobile_combat_power(
            &mut self.total_mobile_combat_power,
            &power,
            catalog.role(def),
            catalog.category(def),
        );
    }

    pub fn total_mobile_combat_power(&self) -> &TargetTypeValues {
        &self.total_mobile_combat_power
    }

    // --- pressure ---------------------------------------------------------

    /// Estimate pressure from the share of enemy-occupied sectors
    ///
    /// `2 * (occupied share of the map) + 2 * (occupied share of base and
    /// adjacent sectors)`, clamped to `[0, 1]`.
    pub fn update_pressure_by_enemy(&mut self, map: &SectorMap) {
        let mut occupied = 0usize;
        let mut occupied_near_base = 0usize;
        for sector in map.iter().filter(|s| s.is_occupied_by_enemies()) {
            occupied += 1;
            if matches!(sector.distance_to_base, Some(d) if d < 2) {
                occupied_near_base += 1;
            }
        }

        let near_base = self.sectors_in_distance[0].len() + self.sectors_in_distance[1].len();
        let map_ratio = if map.is_empty() {
            0.0
        } else {
            occupied as f32 / map.len() as f32
        };
        let near_base_ratio = if near_base == 0 {
            0.0
        } else {
            occupied_near_base as f32 / near_base as f32
        };

        self.pressure = (2.0 * map_ratio + 2.0 * near_base_ratio).clamp(0.0, 1.0);
        debug!(
            "Enemy pressure {:.2} (map {}/{}, near base {}/{})",
            self.pressure,
            occupied,
            map.len(),
            occupied_near_base,
            near_base
        );
    }

    /// Estimated pressure by enemies in `[0, 1]`
    pub fn pressure(&self) -> f32 {
        self.pressure
    }

    // --- base -------------------------------------------------------------

    pub fn base_sectors(&self) -> &[SectorIndex] {
        &self.sectors_in_distance[0]
    }

    pub fn sectors_in_distance(&self, distance: usize) -> &[SectorIndex] {
        self.sectors_in_distance
            .get(distance)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn center_of_base(&self) -> Vec2 {
        self.center_of_base
    }

    pub fn base_flat_land_ratio(&self) -> f32 {
        self.base_flat_land_ratio
    }

    pub fn base_water_ratio(&self) -> f32 {
        self.base_water_ratio
    }

    pub fn map_water_ratio(&self) -> f32 {
        self.map_water_ratio
    }

    pub fn map_land_ratio(&self) -> f32 {
        self.map_land_ratio
    }

    pub fn enemy_threat_by_map(&self) -> &TargetTypeValues {
        &self.enemy_threat_by_map
    }
}

/// Credit combat power to the target types the unit is meant to fight
///
/// Assault units count against what their hull can reach, anti-air units
/// only against air; artillery and support units add nothing.
fn add_to_mobile_combat_power(
    total: &mut TargetTypeValues,
    power: &TargetTypeValues,
    role: UnitRole,
    category: UnitCategory,
) {
    match role {
        UnitRole::Assault => {
            let targets: &[TargetType] = match category {
                UnitCategory::GroundCombat => &[TargetType::Surface],
                UnitCategory::HoverCombat => &[TargetType::Surface, TargetType::Floater],
                UnitCategory::SeaCombat => &[
                    TargetType::Surface,
                    TargetType::Floater,
                    TargetType::Submerged,
                ],
                UnitCategory::SubmarineCombat => &[TargetType::Floater, TargetType::Submerged],
                _ => &[],
            };
            for target_type in targets {
                total[*target_type] += power[*target_type];
            }
        }
        UnitRole::AntiAir => {
            total[TargetType::Air] += power[TargetType::Air];
        }
        UnitRole::Artillery | UnitRole::Support => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SectorConfig;
    use crate::core::decisions::FixedDecisions;
    use crate::forces::UnitGroup;
    use crate::sector::MapLayout;
    use crate::units::{MovementType, StaticCatalog, UnitProfile};

    pub(crate) fn land_map(width: usize, height: usize) -> SectorMap {
        let layout = MapLayout::uniform("brain-test", width, height, 100.0);
        SectorMap::from_layout(&layout, &SectorConfig::default(), &mut FixedDecisions::default())
    }

    fn catalog() -> StaticCatalog {
        let mut catalog = StaticCatalog::new();
        let mut power = TargetTypeValues::new();
        power[TargetType::Surface] = 2.0;
        power[TargetType::Floater] = 1.0;
        power[TargetType::Air] = 0.5;
        catalog
            .insert(UnitProfile {
                id: UnitDefId(1),
                name: "hovertank".into(),
                category: UnitCategory::HoverCombat,
                role: UnitRole::Assault,
                movement: MovementType::HOVER,
                combat_power: power,
                primary_ability: 0.0,
                cost: 150.0,
                buildtime: 10.0,
                builds: vec![],
            })
            .unwrap();
        catalog
            .insert(UnitProfile {
                id: UnitDefId(2),
                name: "flak".into(),
                category: UnitCategory::GroundCombat,
                role: UnitRole::AntiAir,
                movement: MovementType::GROUND,
                combat_power: TargetTypeValues::single(TargetType::Air, 3.0),
                primary_ability: 0.0,
                cost: 150.0,
                buildtime: 10.0,
                builds: vec![],
            })
            .unwrap();
        catalog
            .insert(UnitProfile {
                id: UnitDefId(3),
                name: "solar".into(),
                category: UnitCategory::PowerPlant,
                role: UnitRole::Support,
                movement: MovementType::STATIC_LAND,
                combat_power: TargetTypeValues::new(),
                primary_ability: 20.0,
                cost: 50.0,
                buildtime: 10.0,
                builds: vec![],
            })
            .unwrap();
        catalog
    }

    #[test]
    fn test_map_threat_on_land_map() {
        let brain = Brain::new(&BrainConfig::default(), TeamId(0), &land_map(4, 4));
        let threat = brain.enemy_threat_by_map();
        assert!((threat[TargetType::Surface] - 0.3).abs() < 1e-6);
        assert!((threat[TargetType::Air] - 0.2).abs() < 1e-6);
        assert_eq!(threat[TargetType::Floater], 0.0);
        assert_eq!(threat[TargetType::Static], 0.0);
    }

    #[test]
    fn test_surplus_is_clamped_at_zero() {
        let mut brain = Brain::new(&BrainConfig::default(), TeamId(0), &land_map(2, 2));
        brain.update_resources(EconomySample {
            metal_income: 8.0,
            energy_income: 40.0,
            metal_usage: 16.0,
            energy_usage: 0.0,
            ..EconomySample::default()
        });
        assert_eq!(brain.average_metal_surplus(), 0.0);
        assert_eq!(brain.average_energy_surplus(), 40.0 / 8.0);
        assert_eq!(brain.average_metal_income(), 1.0);
    }

    #[test]
    fn test_power_plant_refills_energy_buffers() {
        let catalog = catalog();
        let mut brain = Brain::new(&BrainConfig::default(), TeamId(0), &land_map(2, 2));
        brain.power_plant_finished(UnitDefId(3), &catalog);
        assert_eq!(brain.average_energy_income(), 20.0);
        assert_eq!(brain.average_energy_surplus(), 10.0);
    }

    #[test]
    fn test_defence_capabilities_by_role() {
        let catalog = catalog();
        let mut groups = GroupRegistry::new();
        groups.insert(UnitGroup::new(crate::core::types::GroupId(1), UnitDefId(1), 2, 0, &catalog));
        groups.insert(UnitGroup::new(crate::core::types::GroupId(2), UnitDefId(2), 1, 0, &catalog));

        let mut brain = Brain::new(&BrainConfig::default(), TeamId(0), &land_map(2, 2));
        brain.update_defence_capabilities(&groups, &catalog);
        let power = brain.total_mobile_combat_power();
        assert_eq!(power[TargetType::Surface], 4.0);
        assert_eq!(power[TargetType::Floater], 2.0);
        // hover assault air power is not credited, only the flak's
        assert_eq!(power[TargetType::Air], 3.0);

        brain.add_defence_capabilities(UnitDefId(2), &catalog);
        assert_eq!(brain.total_mobile_combat_power()[TargetType::Air], 6.0);
    }

    #[test]
    fn test_attacks_by_blend() {
        let mut knowledge = PersistentKnowledge::new();
        let mut brain = Brain::new(&BrainConfig::default(), TeamId(0), &land_map(2, 2));
        knowledge.set_attacked_by_rate(MapType::Land, GamePhase::Early, TargetType::Surface, 10.0);
        let attacks = brain.attacks_by(TargetType::Surface, GamePhase::Early, &knowledge);
        assert!((attacks - 3.0).abs() < 1e-5);

        knowledge.set_attacked_by_rate(MapType::Land, GamePhase::Early, TargetType::Surface, 0.0);
        for _ in 0..10 {
            brain.attacked_by(TargetType::Surface, GamePhase::Early, &mut knowledge);
        }
        let attacks = brain.attacks_by(TargetType::Surface, GamePhase::Early, &knowledge);
        assert!((attacks - 7.0).abs() < 1e-5);
        assert_eq!(
            knowledge.attacks_this_game(MapType::Land, GamePhase::Early, TargetType::Surface),
            10.0
        );
    }

    #[test]
    fn test_spotted_maximum_decays() {
        let mut brain = Brain::new(&BrainConfig::default(), TeamId(0), &land_map(2, 2));
        brain.update_max_combat_units_spotted(&TargetTypeValues::single(TargetType::Air, 10.0));
        brain.update_max_combat_units_spotted(&TargetTypeValues::new());
        assert!((brain.max_spotted_combat_units()[TargetType::Air] - 9.96).abs() < 1e-4);
        brain.update_max_combat_units_spotted(&TargetTypeValues::single(TargetType::Air, 12.0));
        assert_eq!(brain.max_spotted_combat_units()[TargetType::Air], 12.0);
    }

    #[test]
    fn test_pressure_is_clamped() {
        let mut map = land_map(3, 3);
        let mut brain = Brain::new(&BrainConfig::default(), TeamId(0), &map);
        brain.assign_sector_to_base(&mut map, SectorIndex::new(1, 1), true);
        for sector in map.iter_mut() {
            sector.enemy_structures = 1.0;
        }
        brain.update_pressure_by_enemy(&map);
        assert_eq!(brain.pressure(), 1.0);
    }

    #[test]
    fn test_pressure_without_base() {
        let mut map = land_map(4, 4);
        let mut brain = Brain::new(&BrainConfig::default(), TeamId(0), &map);
        map.get_mut(SectorIndex::new(0, 0)).unwrap().enemies_on_radar = 2;
        brain.update_pressure_by_enemy(&map);
        assert!((brain.pressure() - 0.125).abs() < 1e-6);
    }

    #[test]
    fn test_storage_urgency_needs_factories() {
        let mut brain = Brain::new(&BrainConfig::default(), TeamId(0), &land_map(2, 2));
        brain.update_resources(EconomySample {
            stored_metal: 800.0,
            metal_storage: 1000.0,
            ..EconomySample::default()
        });
        let mut census = ForceCensus::new();
        assert_eq!(brain.metal_storage_urgency(&census), 0.0);

        census.construction_finished(UnitCategory::StaticConstructor);
        census.construction_finished(UnitCategory::StaticConstructor);
        assert!((brain.metal_storage_urgency(&census) - 0.1).abs() < 1e-6);
        assert_eq!(brain.metal_urgency(&census), 8.0);
    }
}
