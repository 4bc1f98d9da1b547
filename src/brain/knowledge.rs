//! Memory carried from one game to the next
//!
//! Holds the learned attacked-by rates per map type and game phase, and the
//! learned per-sector attack history of every map played so far. Load it
//! before the first tick, apply it to the sector map, then merge the
//! finished game back in and save it after the last tick.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::error::Result;
use crate::core::types::{GamePhase, MapType};
use crate::sector::SectorMap;
use crate::units::{CombatCategoryValues, TargetType, TargetTypeValues};

/// Attacked-by rates for each game phase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackedByRates {
    rates: [TargetTypeValues; 4],
}

impl AttackedByRates {
    pub fn rate(&self, phase: GamePhase, target_type: TargetType) -> f32 {
        self.rates[phase.index()][target_type]
    }

    pub fn rates(&self, phase: GamePhase) -> &TargetTypeValues {
        &self.rates[phase.index()]
    }

    pub fn set_rate(&mut self, phase: GamePhase, target_type: TargetType, value: f32) {
        self.rates[phase.index()][target_type] = value;
    }

    pub fn add_attack(&mut self, phase: GamePhase, target_type: TargetType) {
        self.rates[phase.index()][target_type] += 1.0;
    }

    fn blend_in(&mut self, game: &AttackedByRates, learning_rate: f32) {
        for (learned, current) in self.rates.iter_mut().zip(game.rates.iter()) {
            *learned = TargetTypeValues::blend(1.0 - learning_rate, learned, learning_rate, current);
        }
    }
}

/// Learned history of one sector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorMemory {
    pub attacked_by: CombatCategoryValues,
    pub combats: CombatCategoryValues,
    pub importance: f32,
}

impl Default for SectorMemory {
    fn default() -> Self {
        Self {
            attacked_by: CombatCategoryValues::new(),
            combats: CombatCategoryValues::new(),
            importance: 1.0,
        }
    }
}

/// Learned history of one map, row-major
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapMemory {
    pub width: usize,
    pub height: usize,
    pub games: u32,
    pub sectors: Vec<SectorMemory>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistentKnowledge {
    #[serde(default)]
    attacked_by_rates: BTreeMap<MapType, AttackedByRates>,
    #[serde(default)]
    maps: BTreeMap<String, MapMemory>,
    /// Attacks counted in the running game, merged on [`merge_game`](Self::merge_game)
    #[serde(skip)]
    this_game: BTreeMap<MapType, AttackedByRates>,
}

impl PersistentKnowledge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load knowledge from a JSON file; a missing file yields fresh knowledge
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No learned knowledge at {}, starting fresh", path.display());
            return Ok(Self::new());
        }
        let contents = fs::read_to_string(path)?;
        let knowledge: PersistentKnowledge = serde_json::from_str(&contents)?;
        debug!(
            "Loaded knowledge for {} map types and {} maps",
            knowledge.attacked_by_rates.len(),
            knowledge.maps.len()
        );
        Ok(knowledge)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Learned rate of attacks by `target_type` in `phase` on maps of `map_type`
    pub fn attacked_by_rate(&self, map_type: MapType, phase: GamePhase, target_type: TargetType) -> f32 {
        self.attacked_by_rates
            .get(&map_type)
            .map(|r| r.rate(phase, target_type))
            .unwrap_or(0.0)
    }

    pub fn attacked_by_rates(&self, map_type: MapType) -> Option<&AttackedByRates> {
        self.attacked_by_rates.get(&map_type)
    }

    pub fn set_attacked_by_rate(
        &mut self,
        map_type: MapType,
        phase: GamePhase,
        target_type: TargetType,
        value: f32,
    ) {
        self.attacked_by_rates
            .entry(map_type)
            .or_default()
            .set_rate(phase, target_type, value);
    }

    /// Count an attack in the running game
    pub fn add_attack(&mut self, map_type: MapType, phase: GamePhase, target_type: TargetType) {
        self.this_game
            .entry(map_type)
            .or_default()
            .add_attack(phase, target_type);
    }

    /// Attacks counted so far in the running game
    pub fn attacks_this_game(&self, map_type: MapType, phase: GamePhase, target_type: TargetType) -> f32 {
        self.this_game
            .get(&map_type)
            .map(|r| r.rate(phase, target_type))
            .unwrap_or(0.0)
    }

    pub fn map_memory(&self, map_name: &str) -> Option<&MapMemory> {
        self.maps.get(map_name)
    }

    /// Copy the learned sector history of this map into the sector map
    ///
    /// Memory recorded for a grid of a different size is ignored.
    pub fn apply_to_map(&self, map: &mut SectorMap) {
        let Some(memory) = self.maps.get(&map.name) else {
            debug!("No learned sector data for map {}", map.name);
            return;
        };
        if memory.width != map.width() || memory.height != map.height() {
            debug!(
                "Learned sector data for {} has size {}x{}, map is {}x{}; ignoring",
                map.name,
                memory.width,
                memory.height,
                map.width(),
                map.height()
            );
            return;
        }
        for (sector, learned) in map.iter_mut().zip(memory.sectors.iter()) {
            sector.attacked_by_learned = learned.attacked_by;
            sector.combats_learned = learned.combats;
            sector.importance_learned = learned.importance;
        }
    }

    /// Blend the finished game into the learned values
    ///
    /// `learned = (1 - rate) * learned + rate * this game`, for the
    /// attacked-by rates of every map type seen this game and for every
    /// sector of the map.
    pub fn merge_game(&mut self, map: &SectorMap, learning_rate: f32) {
        let this_game = std::mem::take(&mut self.this_game);
        for (map_type, game_rates) in &this_game {
            self.attacked_by_rates
                .entry(*map_type)
                .or_default()
                .blend_in(game_rates, learning_rate);
        }

        let memory = self
            .maps
            .entry(map.name.clone())
            .or_insert_with(|| MapMemory {
                width: map.width(),
                height: map.height(),
                games: 0,
                sectors: Vec::new(),
            });
        if memory.width != map.width()
            || memory.height != map.height()
            || memory.sectors.len() != map.len()
        {
            memory.width = map.width();
            memory.height = map.height();
            memory.games = 0;
            memory.sectors = vec![SectorMemory::default(); map.len()];
        }

        let keep = 1.0 - learning_rate;
        for (learned, sector) in memory.sectors.iter_mut().zip(map.iter()) {
            let mut attacked_by = learned.attacked_by;
            attacked_by.multiply_values(keep);
            let mut combats = learned.combats;
            combats.multiply_values(keep);
            for category in crate::units::CombatCategory::ALL {
                attacked_by[category] += learning_rate * sector.attacked_by_this_game[category];
                combats[category] += learning_rate * sector.combats_this_game[category];
            }
            learned.attacked_by = attacked_by;
            learned.combats = combats;
            learned.importance = keep * learned.importance + learning_rate * sector.importance_this_game;
        }
        memory.games += 1;

        info!("Merged game on {} into learned knowledge ({} games)", map.name, memory.games);
    }
}
