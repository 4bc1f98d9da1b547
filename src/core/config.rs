//! Strategy configuration with documented constants
//!
//! All tuning constants used by the sector map, the brain and the attack
//! manager live here. Profiles are stored as TOML under `data/strategy/`
//! and every section falls back to its defaults when omitted.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::core::error::{Result, StrategosError};

/// Per-sector bookkeeping constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SectorConfig {
    /// Multiplier applied to the lost-unit counters every tick
    ///
    /// At 0.95 a loss fades to a third of its weight in about 20 ticks.
    pub lost_unit_decay: f32,

    /// Weight of a building loss in an interior sector
    ///
    /// Losses at the border of the base say more about where the enemy
    /// comes from than losses deep inside it.
    pub interior_attack_weight: f32,

    /// Weight of the four adjacent sectors in area combat power queries
    pub neighbour_importance: f32,

    /// Upper bound of a sector's importance for this game
    pub max_sector_importance: f32,

    /// Maximum random bonus added to the initial importance (0.0 - 0.2)
    pub importance_jitter: f32,
}

impl Default for SectorConfig {
    fn default() -> Self {
        Self {
            lost_unit_decay: 0.95,
            interior_attack_weight: 0.3,
            neighbour_importance: 0.25,
            max_sector_importance: 6.0,
            importance_jitter: 0.2,
        }
    }
}

/// Threat assessment and economy constants of the brain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrainConfig {
    /// Number of samples kept per economy buffer
    pub income_sample_points: usize,

    /// Per-tick decay of the recently-attacked-by rates
    pub attacked_by_decay: f32,

    /// Per-tick decay of the peak spotted enemy combat units
    pub spotted_units_decay: f32,

    /// Weight of cross-game memory when blending attacked-by rates
    pub learned_attack_weight: f32,

    /// Weight of this game's decaying rates when blending attacked-by rates
    pub current_attack_weight: f32,

    /// Base threat per target type before terrain scaling
    pub enemy_threat_by_terrain: f32,

    /// Additional threat for the target types the map type favours
    pub enemy_threat_by_map_type: f32,

    /// Largest number of sectors the base may grow to
    pub max_base_size: usize,

    /// How far (in sectors) base distance buckets are kept
    pub max_sector_distance_to_base: usize,

    /// Probability of ordering aircraft once the opening is over
    pub aircraft_ratio: f32,

    /// Probability of drawing speed from the fast band
    pub fast_units_ratio: f32,

    /// Probability of drawing range from the long-range band
    pub high_range_units_ratio: f32,

    /// Maximum number of storage buildings
    pub max_storage: u32,

    /// Active factories required before storage is considered
    pub min_factories_for_storage: u32,

    /// Average power surplus above which no more power plants are wanted
    pub power_surplus_stop_threshold: f32,

    /// Metal surplus required before assisting non-economy construction
    pub min_metal_surplus_for_assist: f32,

    /// Energy surplus required before assisting non-economy construction
    pub min_energy_surplus_for_assist: f32,
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            income_sample_points: 8,
            attacked_by_decay: 0.985,
            spotted_units_decay: 0.996,
            learned_attack_weight: 0.3,
            current_attack_weight: 0.7,
            enemy_threat_by_terrain: 0.2,
            enemy_threat_by_map_type: 0.1,
            max_base_size: 10,
            max_sector_distance_to_base: 3,
            aircraft_ratio: 0.15,
            fast_units_ratio: 0.25,
            high_range_units_ratio: 0.25,
            max_storage: 1,
            min_factories_for_storage: 2,
            power_surplus_stop_threshold: 2000.0,
            min_metal_surplus_for_assist: 0.5,
            min_energy_surplus_for_assist: 5.0,
        }
    }
}

/// Attack launch and monitoring constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackConfig {
    /// Aggressiveness used when deciding whether to launch an attack
    pub launch_aggressiveness: f32,

    /// Aggressiveness used while an attack is running
    ///
    /// Higher than the launch value so a committed attack is not called
    /// off at the first setback.
    pub continue_aggressiveness: f32,

    /// Ticks without a fresh order after which an attack counts as stuck
    pub max_idle_ticks: u64,

    /// Minimum ticks between two order waves of the same attack
    pub min_order_interval: u64,

    /// Ticks between two launch attempts
    pub launch_interval: u64,

    /// Maximum number of attacks in flight
    pub max_concurrent_attacks: usize,

    /// Maximum number of anti-air groups escorting one attack
    pub max_anti_air_groups_per_attack: usize,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            launch_aggressiveness: 1.0,
            continue_aggressiveness: 2.0,
            max_idle_ticks: 1800,
            min_order_interval: 30,
            launch_interval: 300,
            max_concurrent_attacks: 4,
            max_anti_air_groups_per_attack: 2,
        }
    }
}

/// Cross-game learning constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// Share of this game's statistics merged into the learned values
    pub learning_rate: f32,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self { learning_rate: 0.25 }
    }
}

/// Complete strategy profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Name of this profile (set from filename)
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sectors: SectorConfig,
    #[serde(default)]
    pub brain: BrainConfig,
    #[serde(default)]
    pub attack: AttackConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
}

impl StrategyConfig {
    pub fn new() -> Self {
        Self {
            name: "default".to_string(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: StrategyConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let ratios = [
            ("aircraft_ratio", self.brain.aircraft_ratio),
            ("fast_units_ratio", self.brain.fast_units_ratio),
            ("high_range_units_ratio", self.brain.high_range_units_ratio),
            ("interior_attack_weight", self.sectors.interior_attack_weight),
            ("learning_rate", self.knowledge.learning_rate),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(StrategosError::InvalidConfig(format!(
                    "{} ({}) must lie in [0, 1]",
                    name, value
                )));
            }
        }

        let decays = [
            ("lost_unit_decay", self.sectors.lost_unit_decay),
            ("attacked_by_decay", self.brain.attacked_by_decay),
            ("spotted_units_decay", self.brain.spotted_units_decay),
        ];
        for (name, value) in decays {
            if value <= 0.0 || value > 1.0 {
                return Err(StrategosError::InvalidConfig(format!(
                    "{} ({}) must lie in (0, 1]",
                    name, value
                )));
            }
        }

        if self.brain.learned_attack_weight < 0.0
            || self.brain.current_attack_weight < 0.0
            || self.brain.learned_attack_weight + self.brain.current_attack_weight <= 0.0
        {
            return Err(StrategosError::InvalidConfig(
                "attacked-by blend weights must be non-negative and not both zero".into(),
            ));
        }

        if self.attack.launch_aggressiveness < 1.0 || self.attack.continue_aggressiveness < 1.0 {
            return Err(StrategosError::InvalidConfig(
                "aggressiveness must be at least 1.0".into(),
            ));
        }

        if self.brain.income_sample_points == 0 {
            return Err(StrategosError::InvalidConfig(
                "income_sample_points must be positive".into(),
            ));
        }

        Ok(())
    }
}

/// Load a strategy profile from TOML
///
/// Loads from `data/strategy/{name}.toml`
pub fn load_profile(name: &str) -> Result<StrategyConfig> {
    let path = profile_path(name);
    let contents = fs::read_to_string(&path)?;

    let mut config = StrategyConfig::from_toml_str(&contents)?;
    config.name = name.to_string();
    Ok(config)
}

fn profile_path(name: &str) -> PathBuf {
    PathBuf::from("data/strategy").join(format!("{}.toml", name))
}
