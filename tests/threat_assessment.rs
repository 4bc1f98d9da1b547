//! Threat assessment integration tests
//!
//! Learned and recent attacks, own defence and map terrain flowing into
//! the threat scores and the combat power the brain asks for.

use strategos::brain::{Brain, PersistentKnowledge};
use strategos::core::config::{BrainConfig, SectorConfig};
use strategos::core::decisions::FixedDecisions;
use strategos::core::types::{GamePhase, GroupId, MapType, SectorIndex, TeamId, UnitDefId};
use strategos::forces::{GroupRegistry, UnitGroup};
use strategos::sector::{MapLayout, SectorMap};
use strategos::units::{StaticCatalog, TargetType};

const CATALOG: &str = r#"
[[unit]]
id = 1
name = "tank"
category = "GroundCombat"
role = "Assault"
movement = "GROUND"
combat_power = [4.0, 0.0, 1.0, 0.0, 2.0]
cost = 250.0
"#;

fn land_map() -> SectorMap {
    let layout = MapLayout::uniform("land", 4, 4, 100.0);
    SectorMap::from_layout(&layout, &SectorConfig::default(), &mut FixedDecisions::default())
}

fn water_map() -> SectorMap {
    let mut layout = MapLayout::uniform("sea", 4, 4, 100.0).with_map_type(MapType::Water);
    for terrain in layout.terrain.iter_mut() {
        terrain.water_ratio = 1.0;
        terrain.flat_ratio = 0.0;
        terrain.connected_to_ocean = true;
    }
    SectorMap::from_layout(&layout, &SectorConfig::default(), &mut FixedDecisions::default())
}

#[test]
fn test_learned_air_attacks_dominate() {
    let map = land_map();
    let brain = Brain::new(&BrainConfig::default(), TeamId(0), &map);
    let mut knowledge = PersistentKnowledge::new();
    knowledge.set_attacked_by_rate(MapType::Land, GamePhase::Mid, TargetType::Air, 2.0);

    let threat = brain.threat_by_target_type(GamePhase::Mid, &knowledge);
    // (0.2 map threat + 1.1 attacked-by) / 0.1
    assert!((threat[TargetType::Air] - 13.0).abs() < 1e-3);
    assert!((threat[TargetType::Surface] - 3.0).abs() < 1e-3);

    // rates learned for another phase do not count
    let early = brain.threat_by_target_type(GamePhase::Early, &knowledge);
    assert!((early[TargetType::Air] - 2.0).abs() < 1e-3);
}

#[test]
fn test_own_defence_suppresses_threat() {
    let catalog = StaticCatalog::from_toml_str(CATALOG).unwrap();
    let map = land_map();
    let mut brain = Brain::new(&BrainConfig::default(), TeamId(0), &map);
    let mut groups = GroupRegistry::new();
    groups.insert(UnitGroup::new(GroupId(1), UnitDefId(1), 5, 0, &catalog));
    brain.update_defence_capabilities(&groups, &catalog);
    assert_eq!(brain.total_mobile_combat_power()[TargetType::Surface], 20.0);

    let knowledge = PersistentKnowledge::new();
    let threat = brain.threat_by_target_type(GamePhase::Mid, &knowledge);
    assert!((threat[TargetType::Surface] - 0.3 / 1.1).abs() < 1e-4);
    assert!(threat[TargetType::Air] > threat[TargetType::Surface]);

    let power = brain.combat_power_vs_target_type(GamePhase::Mid, &knowledge);
    assert!(power[TargetType::Air] > 0.0);
    assert_eq!(power[TargetType::Surface], 0.0);
    // static power follows surface and floater power only
    assert_eq!(power[TargetType::Static], 0.0);
}

#[test]
fn test_water_map_asks_for_naval_power() {
    let map = water_map();
    let brain = Brain::new(&BrainConfig::default(), TeamId(0), &map);
    assert_eq!(brain.map_type(), MapType::Water);
    assert_eq!(brain.enemy_threat_by_map()[TargetType::Surface], 0.0);

    let power = brain.combat_power_vs_target_type(GamePhase::Mid, &PersistentKnowledge::new());
    assert!((power[TargetType::Floater] - 3.0).abs() < 1e-4);
    assert!((power[TargetType::Submerged] - 3.0).abs() < 1e-4);
    assert!((power[TargetType::Static] - 3.0).abs() < 1e-4);
    assert_eq!(power[TargetType::Air], 0.0);
}

#[test]
fn test_pressure_reduces_static_power() {
    let mut map = land_map();
    let mut brain = Brain::new(&BrainConfig::default(), TeamId(0), &map);
    brain.assign_sector_to_base(&mut map, SectorIndex::new(0, 0), true);
    map.get_mut(SectorIndex::new(1, 0)).unwrap().enemy_structures = 1.0;
    brain.update_pressure_by_enemy(&map);

    // 2 * 1/16 over the map + 2 * 1/3 around the base
    let expected = 2.0 / 16.0 + 2.0 / 3.0;
    assert!((brain.pressure() - expected).abs() < 1e-5);

    let power = brain.combat_power_vs_target_type(GamePhase::Mid, &PersistentKnowledge::new());
    let surface = power[TargetType::Surface];
    assert!((power[TargetType::Static] - surface * (1.0 - expected)).abs() < 1e-4);

    for x in 0..4 {
        map.get_mut(SectorIndex::new(x, 1)).unwrap().enemies_on_radar = 2;
    }
    brain.update_pressure_by_enemy(&map);
    assert_eq!(brain.pressure(), 1.0);
}

#[test]
fn test_threat_never_negative() {
    let catalog = StaticCatalog::from_toml_str(CATALOG).unwrap();
    let map = water_map();
    let mut brain = Brain::new(&BrainConfig::default(), TeamId(0), &map);
    let mut groups = GroupRegistry::new();
    groups.insert(UnitGroup::new(GroupId(1), UnitDefId(1), 50, 0, &catalog));
    brain.update_defence_capabilities(&groups, &catalog);

    let mut knowledge = PersistentKnowledge::new();
    for phase in [GamePhase::Starting, GamePhase::Early, GamePhase::Mid, GamePhase::Late] {
        brain.attacked_by(TargetType::Submerged, phase, &mut knowledge);
        let threat = brain.threat_by_target_type(phase, &knowledge);
        for target_type in TargetType::ALL {
            assert!(threat[target_type] >= 0.0);
            assert!(threat[target_type].is_finite());
        }
    }
}
