//! Strategic agent integration tests
//!
//! Drives the agent with engine events over many ticks using the skirmish
//! catalog from `data/catalog/`.

use std::path::PathBuf;

use strategos::brain::{EconomySample, PersistentKnowledge};
use strategos::core::decisions::FixedDecisions;
use strategos::core::types::{GamePhase, GroupId, MapType, SectorIndex, TeamId, UnitDefId, Vec2};
use strategos::sector::MapLayout;
use strategos::units::{CombatCategory, CombatCategoryValues, StaticCatalog, TargetType};
use strategos::{EngineEvent, Order, StrategicAgent, StrategyConfig};

const TANK: UnitDefId = UnitDefId(3);
const RAIDER: UnitDefId = UnitDefId(2);
const SOLAR: UnitDefId = UnitDefId(10);
const EXTRACTOR: UnitDefId = UnitDefId(11);
const BOMBER: UnitDefId = UnitDefId(7);

fn catalog() -> StaticCatalog {
    StaticCatalog::load("data/catalog/skirmish.toml").expect("skirmish catalog should load")
}

fn layout() -> MapLayout {
    MapLayout::uniform("integration", 8, 8, 100.0).with_metal_spot(Vec2::new(150.0, 150.0), 2.0)
}

fn agent_with(knowledge: PersistentKnowledge) -> StrategicAgent<StaticCatalog> {
    StrategicAgent::new(
        StrategyConfig::new(),
        TeamId(1),
        &layout(),
        catalog(),
        knowledge,
        Box::new(FixedDecisions::default()),
    )
}

fn scout_enemy(agent: &mut StrategicAgent<StaticCatalog>, sector: SectorIndex, structures: f32) {
    agent.handle(EngineEvent::SectorScouted {
        sector,
        combat_units: CombatCategoryValues::new(),
        structures,
        on_radar: 0,
    });
}

fn temp_knowledge_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("strategos-{}-{}.json", name, std::process::id()))
}

#[test]
fn test_base_setup_and_metal_spots() {
    let mut agent = agent_with(PersistentKnowledge::new());
    assert!(agent.set_start_position(Vec2::new(150.0, 150.0)));
    let base = agent.brain().base_sectors().to_vec();
    assert_eq!(base.len(), 2);
    assert!(base.contains(&SectorIndex::new(1, 1)));
    // the start sector holds the only metal spot
    assert!(agent.brain().free_metal_spots_in_base);

    agent.handle(EngineEvent::ExtractorBuilt {
        unit: 501,
        def: EXTRACTOR,
        position: Vec2::new(150.0, 150.0),
    });
    assert!(!agent.brain().free_metal_spots_in_base);
    agent.handle(EngineEvent::ExtractorDestroyed {
        position: Vec2::new(150.0, 150.0),
    });
    assert!(agent.brain().free_metal_spots_in_base);

    let grown = agent.expand_base(true);
    assert!(grown.is_some());
    assert_eq!(agent.brain().base_sectors().len(), 3);
}

#[test]
fn test_economy_samples_reach_the_brain() {
    let mut agent = agent_with(PersistentKnowledge::new());
    for _ in 0..8 {
        agent.handle(EngineEvent::EconomySample(EconomySample {
            metal_income: 10.0,
            energy_income: 100.0,
            metal_usage: 4.0,
            energy_usage: 140.0,
            stored_metal: 300.0,
            stored_energy: 500.0,
            ..EconomySample::default()
        }));
    }
    assert_eq!(agent.brain().average_metal_income(), 10.0);
    assert_eq!(agent.brain().average_metal_surplus(), 6.0);
    // usage above income never shows up as a negative surplus
    assert_eq!(agent.brain().average_energy_surplus(), 0.0);
}

#[test]
fn test_attack_launch_and_retreat() {
    let mut agent = agent_with(PersistentKnowledge::new());
    agent.set_start_position(Vec2::new(50.0, 50.0));
    for id in 1..=2 {
        agent.handle(EngineEvent::GroupCreated {
            group: GroupId(id),
            def: TANK,
            size: 4,
            continent: 0,
            sector: Some(SectorIndex::new(0, 0)),
        });
    }
    scout_enemy(&mut agent, SectorIndex::new(7, 7), 3.0);

    let mut launched = Vec::new();
    for tick in (30..=300).step_by(30) {
        launched.extend(agent.update(tick));
    }
    assert_eq!(launched.len(), 2);
    assert!(launched
        .iter()
        .all(|o| matches!(o, Order::MoveTo { sector, .. } if *sector == SectorIndex::new(7, 7))));
    assert_eq!(agent.attacks().len(), 1);

    // the enemy shows up in force at the destination
    let mut mobile = strategos::units::TargetTypeValues::new();
    mobile[TargetType::Surface] = 500.0;
    agent.handle(EngineEvent::EnemyCombatPowerSpotted {
        sector: SectorIndex::new(7, 7),
        static_power: strategos::units::TargetTypeValues::new(),
        mobile_power: mobile,
    });
    let orders = agent.update(330);
    assert_eq!(
        orders,
        vec![Order::Halt { group: GroupId(1) }, Order::Halt { group: GroupId(2) }]
    );
    assert!(agent.attacks().is_empty());
    assert!(agent.groups().available_groups().count() == 2);
}

#[test]
fn test_destroyed_group_leaves_attack() {
    let mut agent = agent_with(PersistentKnowledge::new());
    agent.handle(EngineEvent::GroupCreated {
        group: GroupId(1),
        def: TANK,
        size: 4,
        continent: 0,
        sector: Some(SectorIndex::new(0, 0)),
    });
    scout_enemy(&mut agent, SectorIndex::new(3, 3), 1.0);
    assert_eq!(agent.update(300).len(), 1);

    agent.handle(EngineEvent::GroupDestroyed { group: GroupId(1) });
    agent.handle(EngineEvent::GroupDestroyed { group: GroupId(1) });
    assert!(agent.update(330).is_empty());
    assert!(agent.attacks().is_empty());
}

#[test]
fn test_bomber_losses_shift_production_to_anti_air() {
    let mut agent = agent_with(PersistentKnowledge::new());
    agent.set_start_position(Vec2::new(150.0, 150.0));
    for _ in 0..3 {
        agent.handle(EngineEvent::UnitDestroyed {
            destroyed: SOLAR,
            attacker: BOMBER,
            position: Vec2::new(150.0, 150.0),
        });
    }
    agent.update(30_000);
    assert_eq!(agent.phase(), GamePhase::Mid);

    let request = agent.build_units(0.0);
    assert!(request.combat_power[TargetType::Air] > 0.0);
    assert_eq!(request.combat_power[TargetType::Surface], 0.0);

    let sector = agent.map().get(SectorIndex::new(1, 1)).unwrap();
    assert_eq!(sector.attacked_by_this_game[CombatCategory::Air], 3.0);
}

#[test]
fn test_knowledge_survives_between_games() {
    let path = temp_knowledge_path("learning");
    let _ = std::fs::remove_file(&path);

    let mut first = agent_with(PersistentKnowledge::load(&path).unwrap());
    first.set_start_position(Vec2::new(150.0, 150.0));
    for _ in 0..4 {
        first.handle(EngineEvent::UnitDestroyed {
            destroyed: SOLAR,
            attacker: RAIDER,
            position: Vec2::new(150.0, 150.0),
        });
    }
    first.update(30);
    first.finish_game(&path).unwrap();

    let knowledge = PersistentKnowledge::load(&path).unwrap();
    let rate = knowledge.attacked_by_rate(MapType::Land, GamePhase::Starting, TargetType::Surface);
    assert!(rate > 0.0);
    let memory = knowledge.map_memory("integration").expect("map memory recorded");
    assert_eq!(memory.games, 1);

    let second = agent_with(knowledge);
    let sector = second.map().get(SectorIndex::new(1, 1)).unwrap();
    assert!(sector.attacked_by_learned[CombatCategory::Ground] > 0.0);
    assert_eq!(sector.attacked_by_this_game[CombatCategory::Ground], 0.0);

    let _ = std::fs::remove_file(&path);
}
