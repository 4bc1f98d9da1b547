//! Property tests for the statistics, decay and scoring invariants

use proptest::prelude::*;

use strategos::brain::{income_factor, Brain, PersistentKnowledge};
use strategos::core::config::{BrainConfig, SectorConfig};
use strategos::core::decisions::FixedDecisions;
use strategos::core::types::{GamePhase, GroupId, SectorIndex, TeamId, UnitDefId};
use strategos::forces::{GroupRegistry, UnitGroup};
use strategos::sector::{MapLayout, SectorMap};
use strategos::stats::StatisticalData;
use strategos::units::{StaticCatalog, TargetType};

const CATALOG: &str = r#"
[[unit]]
id = 1
name = "raider"
category = "GroundCombat"
role = "Assault"
movement = "GROUND"
combat_power = [2.0, 0.0, 0.5, 0.0, 1.0]
cost = 110.0

[[unit]]
id = 2
name = "gunship"
category = "AirCombat"
role = "Assault"
movement = "AIR"
combat_power = [2.0, 0.0, 1.0, 0.0, 1.0]
cost = 300.0

[[unit]]
id = 3
name = "flak"
category = "GroundCombat"
role = "AntiAir"
movement = "GROUND"
combat_power = [0.0, 5.0, 0.0, 0.0, 0.0]
cost = 150.0
"#;

fn grid(width: usize, height: usize) -> SectorMap {
    let layout = MapLayout::uniform("props", width, height, 100.0);
    SectorMap::from_layout(&layout, &SectorConfig::default(), &mut FixedDecisions::default())
}

proptest! {
    #[test]
    fn test_deviations_stay_in_unit_range(values in prop::collection::vec(0.0f32..1000.0, 1..20)) {
        let data = StatisticalData::from_values(values.iter().copied());
        for value in &values {
            let from_max = data.deviation_from_max(*value);
            let from_zero = data.deviation_from_zero(*value);
            prop_assert!((0.0..=1.0 + 1e-5).contains(&from_max));
            prop_assert!((0.0..=1.0 + 1e-5).contains(&from_zero));
        }
    }

    #[test]
    fn test_deviation_from_zero_is_monotonic(
        values in prop::collection::vec(0.0f32..1000.0, 2..20),
        a in 0.0f32..1000.0,
        b in 0.0f32..1000.0,
    ) {
        let data = StatisticalData::from_values(values);
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(data.deviation_from_zero(low) <= data.deviation_from_zero(high));
        prop_assert!(data.deviation_from_max(low) >= data.deviation_from_max(high));
    }

    #[test]
    fn test_income_factor_saturates(low in 0.0f32..500.0, extra in 0.0f32..500.0) {
        let a = income_factor(low);
        let b = income_factor(low + extra);
        prop_assert!(a > 0.0 && a <= 1.0);
        prop_assert!(b <= a);
    }

    #[test]
    fn test_loss_decay_is_geometric(losses in 1u32..10, ticks in 0i32..60) {
        let catalog = StaticCatalog::from_toml_str(CATALOG).unwrap();
        let mut map = grid(2, 2);
        let index = SectorIndex::new(1, 1);
        for _ in 0..losses {
            map.get_mut(index)
                .unwrap()
                .update_threat_values(UnitDefId(1), UnitDefId(2), &catalog, 0.3);
        }
        for _ in 0..ticks {
            map.update(0.95);
        }
        let expected = losses as f32 * 0.95f32.powi(ticks);
        let lost = map.get(index).unwrap().lost_units();
        prop_assert!((lost - expected).abs() <= 1e-4 * losses as f32);
    }

    #[test]
    fn test_pressure_is_clamped(
        occupied in prop::collection::vec((0usize..6, 0usize..6, 0u32..4), 0..36),
        base in (0usize..6, 0usize..6),
    ) {
        let mut map = grid(6, 6);
        let mut brain = Brain::new(&BrainConfig::default(), TeamId(0), &map);
        brain.assign_sector_to_base(&mut map, SectorIndex::new(base.0, base.1), true);
        for (x, y, radar) in occupied {
            map.get_mut(SectorIndex::new(x, y)).unwrap().enemies_on_radar = radar;
        }
        brain.update_pressure_by_enemy(&map);
        prop_assert!((0.0..=1.0).contains(&brain.pressure()));
    }

    #[test]
    fn test_threat_is_never_negative(
        air_attacks in 0u32..20,
        surface_attacks in 0u32..20,
        raiders in 0u32..40,
        flak in 0u32..40,
        tick in 0u64..100_000,
    ) {
        let catalog = StaticCatalog::from_toml_str(CATALOG).unwrap();
        let map = grid(4, 4);
        let mut brain = Brain::new(&BrainConfig::default(), TeamId(0), &map);
        let mut knowledge = PersistentKnowledge::new();
        let phase = GamePhase::from_tick(tick);
        for _ in 0..air_attacks {
            brain.attacked_by(TargetType::Air, phase, &mut knowledge);
        }
        for _ in 0..surface_attacks {
            brain.attacked_by(TargetType::Surface, phase, &mut knowledge);
        }

        let mut groups = GroupRegistry::new();
        groups.insert(UnitGroup::new(GroupId(1), UnitDefId(1), raiders, 0, &catalog));
        groups.insert(UnitGroup::new(GroupId(2), UnitDefId(3), flak, 0, &catalog));
        brain.update_defence_capabilities(&groups, &catalog);

        let threat = brain.threat_by_target_type(phase, &knowledge);
        for target_type in TargetType::ALL {
            prop_assert!(threat[target_type] >= 0.0);
            prop_assert!(threat[target_type].is_finite());
        }
        let power = brain.combat_power_vs_target_type(phase, &knowledge);
        prop_assert!(power[TargetType::Static] >= 0.0);
    }
}
