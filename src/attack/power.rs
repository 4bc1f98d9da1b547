//! Combat power comparisons between own groups and a destination sector

use crate::core::types::SectorIndex;
use crate::forces::UnitGroup;
use crate::sector::SectorMap;
use crate::units::{TargetType, TargetTypeValues, UnitCatalog};

/// Summed power and target type mix of a set of groups
#[derive(Debug, Clone, Default)]
pub struct ForceProfile {
    /// Combat power against each target type
    pub power: TargetTypeValues,
    /// Share of units presenting each target type, summing to 1 (or all zero)
    pub composition: TargetTypeValues,
}

impl ForceProfile {
    pub fn of<'a>(groups: impl IntoIterator<Item = &'a UnitGroup>, catalog: &dyn UnitCatalog) -> Self {
        let mut profile = Self::default();
        for group in groups {
            profile.power += group.combat_power(catalog);
            profile.composition[group.target_type()] += group.size as f32;
        }
        normalize(&mut profile.composition);
        profile
    }

    pub fn is_empty(&self) -> bool {
        self.composition.is_zero()
    }

    /// Whether the force beats the enemy mobile units around `sector`
    ///
    /// Enemy power counts against our unit mix, including a damped share
    /// from the neighbouring sectors. Our power counts against the mix of
    /// enemy units spotted there, or against our own mix if none were seen.
    pub fn sufficient_vs_mobile(
        &self,
        map: &SectorMap,
        sector: SectorIndex,
        aggressiveness: f32,
        neighbour_importance: f32,
    ) -> bool {
        let enemy_power: f32 = TargetType::MOBILE
            .iter()
            .map(|tt| {
                self.composition[*tt] * map.enemy_area_combat_power_vs(sector, *tt, neighbour_importance)
            })
            .sum();

        let mut enemy_mix = spotted_enemy_mix(map, sector);
        if enemy_mix.is_zero() {
            enemy_mix = self.composition;
        }
        let own_power = self.power.weighted_sum(&enemy_mix);

        aggressiveness * own_power > enemy_power
    }

    /// Whether the force can break the static defences of `sector`
    pub fn sufficient_vs_static(&self, map: &SectorMap, sector: SectorIndex, aggressiveness: f32) -> bool {
        let Some(target) = map.get(sector) else {
            return false;
        };
        let defence_power: f32 = TargetType::MOBILE
            .iter()
            .map(|tt| self.composition[*tt] * target.enemy_static_power_vs(*tt))
            .sum();
        aggressiveness * self.power[TargetType::Static] > defence_power
    }

    /// Enemy static defence power against this force's unit mix
    pub fn static_defence_at(&self, map: &SectorMap, sector: SectorIndex) -> f32 {
        map.get(sector)
            .map(|s| {
                TargetType::MOBILE
                    .iter()
                    .map(|tt| self.composition[*tt] * s.enemy_static_power_vs(*tt))
                    .sum()
            })
            .unwrap_or(0.0)
    }
}

fn normalize(values: &mut TargetTypeValues) {
    let total = values.sum();
    if total > 0.0 {
        values.multiply_values(1.0 / total);
    }
}

/// Target type mix of the enemy units spotted in and around `sector`
fn spotted_enemy_mix(map: &SectorMap, sector: SectorIndex) -> TargetTypeValues {
    let mut mix = TargetTypeValues::new();
    for index in std::iter::once(sector).chain(map.neighbours(sector)) {
        if let Some(s) = map.get(index) {
            mix += s.spotted_enemy_combat_units().by_target_type();
        }
    }
    normalize(&mut mix);
    mix
}
