//! Strategic agent facade
//!
//! Owns every piece of strategic state for one team. The host feeds
//! [`EngineEvent`]s as they happen and calls [`StrategicAgent::update`]
//! once per strategic tick; orders come back as plain values.

pub mod event;

pub use event::EngineEvent;

use std::path::Path;

use tracing::{debug, info, warn};

use crate::attack::{AttackManager, Order};
use crate::brain::{Brain, CombatUnitRequest, PersistentKnowledge};
use crate::core::config::StrategyConfig;
use crate::core::decisions::{DecisionSource, SeededDecisions};
use crate::core::error::Result;
use crate::core::types::{GamePhase, SectorIndex, TeamId, Tick, UnitDefId, Vec2};
use crate::forces::{ForceCensus, GroupRegistry, OwnStructures, UnitGroup};
use crate::sector::{MapLayout, SectorMap};
use crate::units::{TargetType, TargetTypeValues, UnitCatalog};

pub struct StrategicAgent<C: UnitCatalog> {
    config: StrategyConfig,
    catalog: C,
    map: SectorMap,
    brain: Brain,
    knowledge: PersistentKnowledge,
    groups: GroupRegistry,
    census: ForceCensus,
    structures: OwnStructures,
    attacks: AttackManager,
    decisions: Box<dyn DecisionSource>,
    tick: Tick,
}

impl<C: UnitCatalog> StrategicAgent<C> {
    /// Set up the sector grid from `layout` and apply what was learned on this map before
    pub fn new(
        config: StrategyConfig,
        team: TeamId,
        layout: &MapLayout,
        catalog: C,
        knowledge: PersistentKnowledge,
        mut decisions: Box<dyn DecisionSource>,
    ) -> Self {
        let mut map = SectorMap::from_layout(layout, &config.sectors, decisions.as_mut());
        knowledge.apply_to_map(&mut map);
        let brain = Brain::new(&config.brain, team, &map);
        let attacks = AttackManager::new(&config.attack, config.sectors.neighbour_importance);

        info!(
            "Strategic agent for {} on {} ({}x{} sectors, {})",
            team,
            map.name,
            map.width(),
            map.height(),
            map.map_type.name()
        );

        Self {
            config,
            catalog,
            map,
            brain,
            knowledge,
            groups: GroupRegistry::new(),
            census: ForceCensus::new(),
            structures: OwnStructures::new(),
            attacks,
            decisions,
            tick: 0,
        }
    }

    /// Agent with fresh knowledge and seeded randomness
    pub fn with_seed(config: StrategyConfig, team: TeamId, layout: &MapLayout, catalog: C, seed: u64) -> Self {
        Self::new(
            config,
            team,
            layout,
            catalog,
            PersistentKnowledge::new(),
            Box::new(SeededDecisions::new(seed)),
        )
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn map(&self) -> &SectorMap {
        &self.map
    }

    pub fn brain(&self) -> &Brain {
        &self.brain
    }

    pub fn knowledge(&self) -> &PersistentKnowledge {
        &self.knowledge
    }

    pub fn groups(&self) -> &GroupRegistry {
        &self.groups
    }

    pub fn census(&self) -> &ForceCensus {
        &self.census
    }

    pub fn structures(&self) -> &OwnStructures {
        &self.structures
    }

    pub fn attacks(&self) -> &AttackManager {
        &self.attacks
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn phase(&self) -> GamePhase {
        GamePhase::from_tick(self.tick)
    }

    // --- base -------------------------------------------------------------

    /// Claim the sector of the start position and grow the base once
    ///
    /// Returns false when the start lies outside the map or another team
    /// already holds the sector.
    pub fn set_start_position(&mut self, position: Vec2) -> bool {
        let Some(index) = self.map.sector_index_at(position) else {
            warn!("Start position {:?} lies outside the map", position);
            return false;
        };
        if !self.brain.assign_sector_to_base(&mut self.map, index, true) {
            warn!("Start sector {} is already taken, {} starts without a base", index, self.brain.team());
            return false;
        }
        self.brain.expand_base_at_startup(&mut self.map);
        true
    }

    /// Grow the base by one sector suited to the map
    pub fn expand_base(&mut self, prefer_safe: bool) -> Option<SectorIndex> {
        let map_type = self.map.map_type;
        self.brain.expand_base(&mut self.map, map_type, prefer_safe)
    }

    // --- events -----------------------------------------------------------

    /// Apply an engine event; only idle groups produce orders right away
    pub fn handle(&mut self, event: EngineEvent) -> Vec<Order> {
        debug!("Handling {}", event.name());
        match event {
            EngineEvent::UnitDestroyed {
                destroyed,
                attacker,
                position,
            } => self.unit_destroyed(destroyed, attacker, position),
            EngineEvent::SectorScouted {
                sector,
                combat_units,
                structures,
                on_radar,
            } => match self.map.get_mut(sector) {
                Some(s) => {
                    s.reset_spotted_enemies_data();
                    for category in crate::units::CombatCategory::ALL {
                        s.add_enemy_combat_unit(category, combat_units[category]);
                    }
                    s.enemy_structures = structures;
                    s.enemies_on_radar = on_radar;
                }
                None => warn!("Scouted sector {} lies outside the map", sector),
            },
            EngineEvent::EconomySample(sample) => self.brain.update_resources(sample),
            EngineEvent::ConstructionStarted { def } => {
                self.census.construction_started(self.catalog.category(def))
            }
            EngineEvent::UnitCompleted { def } => {
                self.census.construction_finished(self.catalog.category(def));
                self.brain.add_defence_capabilities(def, &self.catalog);
            }
            EngineEvent::StructureCompleted { def, position } => self.structure_completed(def, position),
            EngineEvent::StructureDestroyed { def, position } => {
                let category = self.catalog.category(def);
                match self.map.sector_at_mut(position) {
                    Some(sector) => {
                        sector.remove_building(category);
                        if !self.structures.remove(def, sector.index) {
                            debug!("{:?} at {:?} was not registered", def, position);
                        }
                    }
                    None => warn!("Destroyed structure at {:?} lies outside the map", position),
                }
            }
            EngineEvent::ExtractorBuilt { unit, def, position } => {
                if let Some(sector) = self.map.sector_at_mut(position) {
                    sector.add_extractor(unit, def, position);
                }
                self.brain.update_free_metal_spots_in_base(&self.map);
            }
            EngineEvent::ExtractorDestroyed { position } => {
                if let Some(sector) = self.map.sector_at_mut(position) {
                    sector.release_metal_spot(position);
                }
                self.brain.update_free_metal_spots_in_base(&self.map);
            }
            EngineEvent::GroupCreated {
                group,
                def,
                size,
                continent,
                sector,
            } => {
                let mut created = UnitGroup::new(group, def, size, continent, &self.catalog);
                created.sector = sector;
                self.groups.insert(created);
            }
            EngineEvent::GroupDestroyed { group } => {
                self.attacks.remove_group(group);
                if self.groups.remove(group).is_none() {
                    debug!("Destroyed {} was not registered", group);
                }
            }
            EngineEvent::GroupResized { group, size } => {
                if let Err(err) = self.groups.resize(group, size) {
                    warn!("Cannot resize: {}", err);
                }
            }
            EngineEvent::GroupMoved { group, sector } => {
                if let Err(err) = self.groups.move_to(group, sector) {
                    warn!("Cannot move: {}", err);
                }
            }
            EngineEvent::GroupIdle { group } => return self.attacks.group_idle(group, self.tick),
            EngineEvent::EnemyCombatPowerSpotted {
                sector,
                static_power,
                mobile_power,
            } => match self.map.get_mut(sector) {
                Some(s) => s.set_enemy_combat_power(static_power, mobile_power),
                None => warn!("Enemy power spotted outside the map at {}", sector),
            },
        }
        Vec::new()
    }

    fn unit_destroyed(&mut self, destroyed: UnitDefId, attacker: UnitDefId, position: Vec2) {
        let category = self.catalog.category(destroyed);
        self.census.unit_lost(category);

        let interior_weight = self.config.sectors.interior_attack_weight;
        match self.map.sector_at_mut(position) {
            Some(sector) => {
                sector.update_threat_values(destroyed, attacker, &self.catalog, interior_weight)
            }
            None => warn!("Unit lost outside the map at {:?}", position),
        }

        if category.is_building() {
            if let Some(attacker_category) = self.catalog.category(attacker).combat_category() {
                let phase = self.phase();
                self.brain
                    .attacked_by(attacker_category.target_type(), phase, &mut self.knowledge);
            }
        }
    }

    fn structure_completed(&mut self, def: UnitDefId, position: Vec2) {
        let category = self.catalog.category(def);
        self.census.construction_finished(category);

        let Some(sector) = self.map.sector_at_mut(position) else {
            warn!("Structure completed outside the map at {:?}", position);
            return;
        };
        sector.add_building(category);
        self.structures.add(def, sector.index);

        if category.is_power_plant() {
            self.brain.power_plant_finished(def, &self.catalog);
        }
    }

    // --- per tick ---------------------------------------------------------

    /// Run one strategic tick
    ///
    /// Decays sector statistics, recomputes own combat power from the live
    /// groups and structures, decays the brain's rates, refreshes pressure and
    /// finally lets the attack manager monitor and launch attacks.
    pub fn update(&mut self, tick: Tick) -> Vec<Order> {
        self.tick = tick;

        self.map.update(self.config.sectors.lost_unit_decay);
        self.map.reset_local_combat_power();

        self.recompute_own_power();
        self.brain.update_defence_capabilities(&self.groups, &self.catalog);

        self.brain.update_attacked_by_values();
        let mut spotted = TargetTypeValues::new();
        for sector in self.map.iter() {
            spotted += sector.spotted_enemy_combat_units().by_target_type();
        }
        self.brain.update_max_combat_units_spotted(&spotted);

        self.brain.update_pressure_by_enemy(&self.map);

        self.attacks
            .update(tick, &self.map, &mut self.groups, &self.catalog)
    }

    fn recompute_own_power(&mut self) {
        for (def, index, count) in self.structures.iter() {
            let Some(sector) = self.map.get_mut(index) else {
                continue;
            };
            sector.allied_structures += count as f32;
            if self.catalog.category(def).is_static_defence() {
                sector.my_static_power += self.catalog.combat_power(def) * count as f32;
            }
        }

        for group in self.groups.iter().filter(|g| g.is_combat_group()) {
            let Some(sector) = group.sector.and_then(|s| self.map.get_mut(s)) else {
                continue;
            };
            sector.my_mobile_power += group.combat_power(&self.catalog);
        }
    }

    /// What combat unit to order next
    ///
    /// `bomb_targets` is the share of worthwhile bombing targets in `[0, 1]`.
    pub fn build_units(&mut self, bomb_targets: f32) -> CombatUnitRequest {
        let phase = self.phase();
        self.brain.combat_unit_request(
            phase,
            bomb_targets.clamp(0.0, 1.0),
            &self.map,
            &self.knowledge,
            self.decisions.as_mut(),
        )
    }

    /// Current threat score per target type
    pub fn threat(&self) -> TargetTypeValues {
        self.brain.threat_by_target_type(self.phase(), &self.knowledge)
    }

    /// Fold this game into the knowledge and write it to `path`
    pub fn finish_game(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.knowledge
            .merge_game(&self.map, self.config.knowledge.learning_rate);
        self.knowledge.save(path)?;
        info!(
            "Saved knowledge after game on {}; threat vs air was {:.2}",
            self.map.name,
            self.threat()[TargetType::Air]
        );
        Ok(())
    }
}
