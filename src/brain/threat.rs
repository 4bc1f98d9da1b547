//! Threat assessment and the combat unit production request

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::brain::{Brain, CombatUnitSelectionCriteria, PersistentKnowledge};
use crate::core::decisions::DecisionSource;
use crate::core::types::GamePhase;
use crate::sector::SectorMap;
use crate::stats::StatisticalData;
use crate::units::{MovementType, TargetType, TargetTypeValues};

/// What kind of combat unit to build next
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatUnitRequest {
    pub movement: MovementType,
    /// Desired combat power per target type
    pub combat_power: TargetTypeValues,
    pub criteria: CombatUnitSelectionCriteria,
}

impl Brain {
    /// Urgency to counter each mobile target type, about 0 to 25
    ///
    /// Map threat, attacked-by rate and peak spotted units are summed, the
    /// latter two as deviation from zero over the mobile target types. Own
    /// mobile power against a type divides the sum.
    pub fn threat_by_target_type(
        &self,
        phase: GamePhase,
        knowledge: &PersistentKnowledge,
    ) -> TargetTypeValues {
        let mut attacked_by = TargetTypeValues::new();
        for target_type in TargetType::MOBILE {
            attacked_by[target_type] = self.attacks_by(target_type, phase, knowledge);
        }

        let spotted = self.max_spotted_combat_units();
        let defence = self.total_mobile_combat_power();

        let attacked_stats = StatisticalData::from_values(TargetType::MOBILE.map(|t| attacked_by[t]));
        let spotted_stats = StatisticalData::from_values(TargetType::MOBILE.map(|t| spotted[t]));
        let defence_stats = StatisticalData::from_values(TargetType::MOBILE.map(|t| defence[t]));

        let mut threat = TargetTypeValues::new();
        for target_type in TargetType::MOBILE {
            let sum = self.enemy_threat_by_map()[target_type]
                + 1.1 * attacked_stats.deviation_from_zero(attacked_by[target_type])
                + 1.1 * spotted_stats.deviation_from_zero(spotted[target_type]);
            threat[target_type] = sum / (0.1 + defence_stats.deviation_from_zero(defence[target_type]));
        }
        threat
    }

    /// Desired combat power, all of it against the most threatening target type
    ///
    /// Floaters and submerged units are countered together. Power against
    /// static targets follows surface and floater power and shrinks with
    /// pressure. An all-zero result means no combat unit is wanted.
    pub fn combat_power_vs_target_type(
        &self,
        phase: GamePhase,
        knowledge: &PersistentKnowledge,
    ) -> TargetTypeValues {
        let threat = self.threat_by_target_type(phase, knowledge);
        let mut power = TargetTypeValues::new();

        match threat.highest_mobile() {
            Some((TargetType::Floater | TargetType::Submerged, _)) => {
                power[TargetType::Floater] = threat[TargetType::Floater];
                power[TargetType::Submerged] = threat[TargetType::Submerged];
            }
            Some((target_type, value)) => power[target_type] = value,
            None => return power,
        }

        power[TargetType::Static] =
            (power[TargetType::Surface] + power[TargetType::Floater]) * (1.0 - self.pressure());
        power
    }

    /// Movement type of the next combat unit
    ///
    /// Aircraft are drawn with the configured ratio, boosted by available
    /// bombing targets, once the opening is over. Otherwise hover units are
    /// always acceptable and the water unit ratio (40% map water, 60% share
    /// of enemy buildings offshore) picks sea or land hulls.
    pub fn movement_type_for_combat_unit_construction(
        &self,
        phase: GamePhase,
        bomb_targets: f32,
        map: &SectorMap,
        decisions: &mut dyn DecisionSource,
    ) -> MovementType {
        let aircraft_ratio = self.config().aircraft_ratio * 0.75 * (1.0 + bomb_targets);
        if decisions.chance_below(aircraft_ratio) && !phase.is_starting_phase() {
            return MovementType::AIR;
        }

        let mut movement = MovementType::HOVER;
        let (on_land, on_sea) = map.spotted_enemy_buildings_by_terrain();
        let total = on_land + on_sea;
        let offshore_ratio = if total > 0.0 { on_sea / total } else { 0.5 };
        let water_unit_ratio = 0.4 * self.map_water_ratio() + 0.6 * offshore_ratio;

        if decisions.chance_below(water_unit_ratio) {
            movement |= MovementType::SEA_FLOATER | MovementType::SEA_SUBMERGED;
        } else {
            movement |= MovementType::AMPHIBIOUS;
            if decisions.chance_below(1.0 - water_unit_ratio) {
                movement |= MovementType::GROUND;
            }
        }
        movement
    }

    /// Combat unit production request for this tick
    ///
    /// `bomb_targets` is the air layer's count of worthwhile bombing targets,
    /// normalized to `[0, 1]`. Aircraft never aim at submerged units, and
    /// with few enemies about they may be switched to bombers against static
    /// targets only.
    pub fn combat_unit_request(
        &self,
        phase: GamePhase,
        bomb_targets: f32,
        map: &SectorMap,
        knowledge: &PersistentKnowledge,
        decisions: &mut dyn DecisionSource,
    ) -> CombatUnitRequest {
        let mut combat_power = self.combat_power_vs_target_type(phase, knowledge);
        let criteria = self.combat_unit_selection_criteria(phase, decisions);
        let movement = self.movement_type_for_combat_unit_construction(phase, bomb_targets, map, decisions);

        if movement.is_air() {
            combat_power[TargetType::Submerged] = 0.0;
            let bomber_ratio = (bomb_targets - self.pressure() - 0.1).max(0.0);
            if decisions.chance_below(bomber_ratio) {
                debug!("Bomber selected (bomber ratio {:.2})", bomber_ratio);
                combat_power[TargetType::Surface] = 0.0;
                combat_power[TargetType::Floater] = 0.0;
                combat_power[TargetType::Air] = 0.0;
                combat_power[TargetType::Static] = 1.0;
            }
        }

        CombatUnitRequest {
            movement,
            combat_power,
            criteria,
        }
    }
}
