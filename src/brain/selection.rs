//! Selection criteria for the catalog ranking routine
//!
//! Each function turns the brain's aggregates into a bundle of weights.
//! The host ranks its catalog entries with them; the core never sees
//! which unit wins. Most weights scale with the [`income_factor`] and the
//! estimated pressure by enemies. Speed and range bands are randomized
//! once the opening is over so the build order does not lock into one path.

use serde::{Deserialize, Serialize};

use crate::brain::Brain;
use crate::core::decisions::DecisionSource;
use crate::core::types::{GamePhase, UnitDefId};
use crate::forces::{ForceCensus, OwnStructures};
use crate::sector::Sector;
use crate::units::{TargetType, TargetTypeValues, UnitCatalog, UnitCategory};

/// Maps metal income to `1.0` (no income) falling towards `0.0` (high income)
pub fn income_factor(metal_income: f32) -> f32 {
    1.0 / (0.01 * metal_income * metal_income + 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatUnitSelectionCriteria {
    pub cost: f32,
    pub power: f32,
    pub efficiency: f32,
    pub speed: f32,
    pub range: f32,
    pub factory_utilization: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoutSelectionCriteria {
    pub cost: f32,
    pub speed: f32,
    pub sight_range: f32,
    pub cloakable: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerPlantSelectionCriteria {
    pub cost: f32,
    pub buildtime: f32,
    pub generated_power: f32,
    /// Average energy income at the time of the decision
    pub current_energy_income: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StorageSelectionCriteria {
    pub cost: f32,
    pub buildtime: f32,
    pub stored_metal: f32,
    pub stored_energy: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtractorSelectionCriteria {
    pub cost: f32,
    pub extracted_metal: f32,
    pub distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaticDefenceSelectionCriteria {
    pub target_type: TargetType,
    pub combat_power: f32,
    pub range: f32,
    pub cost: f32,
    pub buildtime: f32,
    /// Weight of the buildsite's terrain when placing the defence
    pub terrain: f32,
    /// Number of top-rated candidates the host picks from at random
    pub randomness: u32,
}

/// Speed or range drawn from the long band `0.5..=1.5` or the short band `0.1..=0.5`
fn draw_band(long_band: bool, decisions: &mut dyn DecisionSource) -> f32 {
    if long_band {
        0.5 + 0.2 * decisions.step(6) as f32
    } else {
        0.1 + 0.1 * decisions.step(5) as f32
    }
}

impl Brain {
    fn current_income_factor(&self) -> f32 {
        income_factor(self.average_metal_income())
    }

    pub fn combat_unit_selection_criteria(
        &self,
        phase: GamePhase,
        decisions: &mut dyn DecisionSource,
    ) -> CombatUnitSelectionCriteria {
        let income = self.current_income_factor();
        let pressure = self.pressure();

        let (speed, range) = if phase.is_starting_phase() {
            (0.35, 0.25)
        } else {
            let fast = decisions.chance_below(self.config().fast_units_ratio);
            let speed = draw_band(fast, decisions);
            let long_range = decisions.chance_below(self.config().high_range_units_ratio);
            let range = draw_band(long_range, decisions);
            (speed, range)
        };

        CombatUnitSelectionCriteria {
            cost: 0.5 + 2.0 * income,
            power: 1.0 + (1.0 - income) + 0.5 * pressure,
            efficiency: 0.25 + 0.5 * pressure + 0.75 * income,
            speed,
            range,
            factory_utilization: 1.5,
        }
    }

    pub fn scout_selection_criteria(
        &self,
        phase: GamePhase,
        decisions: &mut dyn DecisionSource,
    ) -> ScoutSelectionCriteria {
        let cost = 0.5 + 2.5 * self.current_income_factor();
        if phase.is_starting_phase() {
            ScoutSelectionCriteria {
                cost,
                speed: 1.0,
                sight_range: 0.6,
                cloakable: 0.0,
            }
        } else {
            ScoutSelectionCriteria {
                cost,
                speed: 0.5 + 0.2 * decisions.step(6) as f32,
                sight_range: 0.5 + 0.3 * decisions.step(6) as f32,
                cloakable: 0.25 * decisions.step(4) as f32,
            }
        }
    }

    /// Buildtime matters while energy is short; output and cheapness shift with plant count
    pub fn power_plant_selection_criteria(
        &self,
        census: &ForceCensus,
        catalog: &dyn UnitCatalog,
    ) -> PowerPlantSelectionCriteria {
        let plants = census.total(UnitCategory::PowerPlant) as f32;
        let buildings_factor = (0.2 * plants - 2.0).tanh();

        let urgency =
            (0.04 * self.average_energy_income() + 0.1) / self.average_power_surplus(catalog);

        PowerPlantSelectionCriteria {
            cost: 1.25 - 0.75 * buildings_factor,
            buildtime: (urgency + 0.25).min(1.75 - 1.25 * buildings_factor),
            generated_power: 1.25 + buildings_factor,
            current_energy_income: self.average_energy_income(),
        }
    }

    pub fn storage_selection_criteria(&self, census: &ForceCensus) -> StorageSelectionCriteria {
        let storages = census.total(UnitCategory::Storage) as f32;
        let buildings_factor = (storages - 2.0).tanh();
        let sample = self.last_economy_sample();

        let used_metal =
            (1.1 * self.average_metal_available() / sample.metal_storage.max(1.0)).min(1.0);
        let used_energy = self.average_energy_available() / sample.energy_storage.max(1.0);
        let cost = 1.25 - 0.75 * buildings_factor;

        StorageSelectionCriteria {
            cost,
            buildtime: cost,
            stored_metal: (1.5 + buildings_factor) * used_metal,
            stored_energy: (1.25 + 0.75 * buildings_factor) * used_energy,
        }
    }

    pub fn extractor_selection_criteria(&self) -> ExtractorSelectionCriteria {
        let income = self.current_income_factor();
        ExtractorSelectionCriteria {
            cost: 0.5 + 1.5 * income,
            extracted_metal: 0.2 + 1.8 * (1.0 - income),
            distance: 0.0,
        }
    }

    /// Weights for a static defence against `target_type` in `sector`
    ///
    /// Both existing defence power and the number of defences in the sector
    /// damp the weights through `exp(-x / 6)` and `exp(-count / 3)`.
    pub fn static_defence_selection_criteria(
        &self,
        sector: &Sector,
        target_type: TargetType,
        decisions: &mut dyn DecisionSource,
    ) -> StaticDefenceSelectionCriteria {
        let defence_factor = (-sector.friendly_static_defence_power(target_type) / 6.0).exp();
        let defences = sector.number_of_buildings(UnitCategory::StaticDefence);
        let number_factor = (-(defences as f32) / 3.0).exp();
        let income = self.current_income_factor();
        let pressure = self.pressure();

        let long_range =
            decisions.chance_below(self.config().high_range_units_ratio) && defences > 1;
        let range = draw_band(long_range, decisions);

        let mut terrain = 0.1 + 1.25 * range;
        if matches!(sector.distance_to_base, Some(d) if d > 1) {
            terrain += 1.0;
        }

        StaticDefenceSelectionCriteria {
            target_type,
            combat_power: 1.5
                + 0.25 * (1.0 - income)
                + 0.75 * (1.0 - number_factor)
                + 0.5 * pressure,
            range,
            cost: 0.5 + 2.75 * income + 0.75 * defence_factor,
            buildtime: 0.25 + 0.25 * pressure + 1.5 * defence_factor,
            terrain,
            randomness: 3,
        }
    }

    /// Rating of building another factory of type `factory`
    ///
    /// Scales the factory's combat rating, its relative cheapness and a bonus
    /// for not having one yet by how well its movement fits the terrain.
    pub fn construction_urgency_of_factory(
        &self,
        factory: UnitDefId,
        combat_power_vs: &TargetTypeValues,
        structures: &OwnStructures,
        catalog: &dyn UnitCatalog,
    ) -> f32 {
        let movement = catalog.movement_type(factory);
        let terrain_modifier = if movement.is_sea() {
            0.3 + 0.35 * (self.map_water_ratio() + self.base_water_ratio())
        } else if movement.is_ground() || movement.is_static_land() {
            0.3 + 0.35 * (self.map_land_ratio() + self.base_flat_land_ratio())
        } else {
            1.0
        };

        let metal_income = self.average_metal_income();
        let cost_factor = 1.5 * income_factor(metal_income) + 0.5;
        let cost_rating = cost_factor
            * catalog
                .factory_cost_statistics()
                .deviation_from_max(catalog.total_cost(factory));

        let existing_rating = 3.0 / (structures.count_of(factory) as f32 + 1.0);

        terrain_modifier
            * (catalog.factory_rating(factory, combat_power_vs) + cost_rating + existing_rating)
    }
}
