//! Unit catalog seam
//!
//! The strategic core never reads unit properties directly; it asks a
//! [`UnitCatalog`]. The host wires in its own catalog, the demo binary and
//! the tests use [`StaticCatalog`] loaded from TOML.

use ahash::AHashMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::core::error::{Result, StrategosError};
use crate::core::types::UnitDefId;
use crate::stats::StatisticalData;
use crate::units::category::{UnitCategory, UnitRole};
use crate::units::movement::MovementType;
use crate::units::target_type::TargetTypeValues;

/// Properties of one unit definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitProfile {
    pub id: UnitDefId,
    pub name: String,
    pub category: UnitCategory,
    pub role: UnitRole,
    pub movement: MovementType,
    /// Combat power against each target type
    #[serde(default)]
    pub combat_power: TargetTypeValues,
    /// Energy output, extraction rate or storage capacity, depending on category
    #[serde(default)]
    pub primary_ability: f32,
    pub cost: f32,
    #[serde(default)]
    pub buildtime: f32,
    /// Unit definitions this unit can construct (factories and constructors)
    #[serde(default)]
    pub builds: Vec<UnitDefId>,
}

/// Read access to unit properties
pub trait UnitCatalog {
    fn profile(&self, def: UnitDefId) -> Option<&UnitProfile>;

    fn category(&self, def: UnitDefId) -> UnitCategory {
        self.profile(def)
            .map(|p| p.category)
            .unwrap_or(UnitCategory::Unknown)
    }

    fn role(&self, def: UnitDefId) -> UnitRole {
        self.profile(def).map(|p| p.role).unwrap_or(UnitRole::Support)
    }

    fn movement_type(&self, def: UnitDefId) -> MovementType {
        self.profile(def)
            .map(|p| p.movement)
            .unwrap_or(MovementType::empty())
    }

    /// Combat power of one unit; zero for unknown definitions
    fn combat_power(&self, def: UnitDefId) -> TargetTypeValues {
        match self.profile(def) {
            Some(profile) => profile.combat_power,
            None => {
                debug!("No combat power for unknown unit definition {}", def);
                TargetTypeValues::new()
            }
        }
    }

    fn primary_ability(&self, def: UnitDefId) -> f32 {
        self.profile(def).map(|p| p.primary_ability).unwrap_or(0.0)
    }

    fn total_cost(&self, def: UnitDefId) -> f32 {
        self.profile(def).map(|p| p.cost).unwrap_or(0.0)
    }

    /// Smallest energy output among the known power plants
    fn min_power_plant_output(&self) -> f32;

    /// Cost statistics over all factories
    fn factory_cost_statistics(&self) -> StatisticalData;

    /// Summed combat rating of the combat units a factory can build
    fn factory_rating(&self, factory: UnitDefId, weights: &TargetTypeValues) -> f32 {
        let Some(profile) = self.profile(factory) else {
            return 0.0;
        };
        profile
            .builds
            .iter()
            .filter_map(|def| self.profile(*def))
            .filter(|p| p.category.is_combat_unit())
            .map(|p| p.combat_power.weighted_sum(weights))
            .sum()
    }
}

/// Catalog backed by an in-memory table
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    units: AHashMap<UnitDefId, UnitProfile>,
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    unit: Vec<UnitProfile>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from TOML `[[unit]]` tables
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(contents)?;
        let mut catalog = Self::new();
        for profile in file.unit {
            catalog.insert(profile)?;
        }
        Ok(catalog)
    }

    /// Load a catalog from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn insert(&mut self, profile: UnitProfile) -> Result<()> {
        if !profile.id.is_valid() {
            return Err(StrategosError::InvalidUnitDef(profile.id));
        }
        self.units.insert(profile.id, profile);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Definitions of the given category, in id order
    pub fn defs_of_category(&self, category: UnitCategory) -> Vec<UnitDefId> {
        let mut defs: Vec<UnitDefId> = self
            .units
            .iter()
            .filter(|(_, p)| p.category == category)
            .map(|(def, _)| *def)
            .collect();
        defs.sort();
        defs
    }

    /// Best combat unit moving as `movement` for the requested power profile
    ///
    /// Rates each candidate by weighted combat power per unit of cost; ties
    /// go to the lower id.
    pub fn best_combat_unit(
        &self,
        movement: MovementType,
        weights: &TargetTypeValues,
    ) -> Option<UnitDefId> {
        self.units
            .iter()
            .filter(|(_, p)| p.category.is_combat_unit() && p.movement.intersects(movement))
            .map(|(def, p)| {
                let rating = p.combat_power.weighted_sum(weights) / p.cost.max(1.0);
                (OrderedFloat(rating), std::cmp::Reverse(*def))
            })
            .max()
            .map(|(_, std::cmp::Reverse(def))| def)
    }
}

impl UnitCatalog for StaticCatalog {
    fn profile(&self, def: UnitDefId) -> Option<&UnitProfile> {
        self.units.get(&def)
    }

    fn min_power_plant_output(&self) -> f32 {
        self.units
            .values()
            .filter(|p| p.category.is_power_plant())
            .map(|p| OrderedFloat(p.primary_ability))
            .min()
            .map(|v| v.0)
            .unwrap_or(0.0)
    }

    fn factory_cost_statistics(&self) -> StatisticalData {
        StatisticalData::from_values(
            self.units
                .values()
                .filter(|p| p.category.is_factory())
                .map(|p| p.cost),
        )
    }
}
