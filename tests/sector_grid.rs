//! Sector grid integration tests
//!
//! Base claims, distances to base, metal spot bookkeeping and loss decay
//! on maps built from a layout.

use strategos::core::config::SectorConfig;
use strategos::core::decisions::{FixedDecisions, SeededDecisions};
use strategos::core::types::{SectorIndex, TeamId, UnitDefId, Vec2};
use strategos::sector::{MapLayout, SectorMap};
use strategos::units::{CombatCategory, StaticCatalog, UnitCatalog};
use strategos::StrategosError;

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
name = "solar"
category = "PowerPlant"
role = "Support"
movement = "STATIC_LAND"
primary_ability = 20.0
cost = 150.0

[[unit]]
id = 3
name = "gunship"
category = "AirCombat"
role = "Assault"
movement = "AIR"
combat_power = [2.0, 0.0, 1.0, 0.0, 1.0]
cost = 300.0
"#;

fn map(width: usize, height: usize) -> SectorMap {
    let layout = MapLayout::uniform("grid", width, height, 100.0);
    SectorMap::from_layout(&layout, &SectorConfig::default(), &mut FixedDecisions::default())
}

#[test]
fn test_seeded_importance_is_repeatable() {
    let layout = MapLayout::uniform("grid", 6, 6, 100.0);
    let config = SectorConfig::default();
    let a = SectorMap::from_layout(&layout, &config, &mut SeededDecisions::new(3));
    let b = SectorMap::from_layout(&layout, &config, &mut SeededDecisions::new(3));

    for (x, y) in a.iter().zip(b.iter()) {
        assert_eq!(x.importance_this_game, y.importance_this_game);
        assert!((1.0..=1.0 + config.importance_jitter).contains(&x.importance_this_game));
    }
}

#[test]
fn test_positions_map_to_sectors() {
    let map = map(4, 3);
    assert_eq!(map.sector_index_at(Vec2::new(0.0, 0.0)), Some(SectorIndex::new(0, 0)));
    assert_eq!(map.sector_index_at(Vec2::new(399.0, 299.0)), Some(SectorIndex::new(3, 2)));
    assert_eq!(map.sector_index_at(Vec2::new(-1.0, 10.0)), None);
    assert_eq!(map.sector_index_at(Vec2::new(1000.0, 10.0)), None);
}

#[test]
fn test_corner_has_two_neighbours() {
    let map = map(3, 3);
    assert_eq!(map.neighbours(SectorIndex::new(0, 0)).count(), 2);
    assert_eq!(map.neighbours(SectorIndex::new(1, 1)).count(), 4);
    assert_eq!(map.neighbours(SectorIndex::new(2, 1)).count(), 3);
}

#[test]
fn test_contended_claim_keeps_first_owner() {
    let mut map = map(3, 3);
    let index = SectorIndex::new(1, 1);
    assert!(map.claim_for_base(index, TeamId(0), 6.0).is_ok());

    let second = map.claim_for_base(index, TeamId(1), 6.0);
    assert!(matches!(
        second,
        Err(StrategosError::SectorAlreadyClaimed { team: TeamId(0), .. })
    ));
    assert_eq!(map.get(index).unwrap().base_owner, Some(TeamId(0)));
    assert!(matches!(
        map.claim_for_base(SectorIndex::new(5, 5), TeamId(0), 6.0),
        Err(StrategosError::SectorOutOfBounds(_))
    ));
}

#[test]
fn test_only_owner_releases_base_sector() {
    let mut map = map(3, 3);
    let index = SectorIndex::new(1, 1);
    map.claim_for_base(index, TeamId(1), 6.0).unwrap();

    assert!(matches!(
        map.release_from_base(index, TeamId(2)),
        Err(StrategosError::SectorAlreadyClaimed { team: TeamId(1), .. })
    ));
    assert_eq!(map.get(index).unwrap().base_owner, Some(TeamId(1)));
    assert!(matches!(
        map.release_from_base(SectorIndex::new(0, 0), TeamId(1)),
        Err(StrategosError::SectorNotInBase { .. })
    ));

    map.release_from_base(index, TeamId(1)).unwrap();
    assert_eq!(map.get(index).unwrap().base_owner, None);
}

#[test]
fn test_distances_spread_from_base() {
    let mut map = map(5, 5);
    map.claim_for_base(SectorIndex::new(0, 0), TeamId(0), 6.0).unwrap();
    map.claim_for_base(SectorIndex::new(1, 0), TeamId(0), 6.0).unwrap();
    map.update_distances_to_base(TeamId(0));

    assert_eq!(map.get(SectorIndex::new(4, 4)).unwrap().distance_to_base, Some(7));
    assert_eq!(map.get(SectorIndex::new(2, 0)).unwrap().distance_to_base, Some(1));
    assert_eq!(map.sectors_in_distance(0).len(), 2);
    assert_eq!(map.sectors_in_distance(1).len(), 3);
    // neither base sector is surrounded by base sectors
    assert!(map.iter().all(|s| !s.interior));

    map.release_from_base(SectorIndex::new(0, 0), TeamId(0)).unwrap();
    map.release_from_base(SectorIndex::new(1, 0), TeamId(0)).unwrap();
    map.update_distances_to_base(TeamId(0));
    assert!(map.iter().all(|s| s.distance_to_base.is_none()));
}

#[test]
fn test_distances_describe_refreshing_team() {
    let mut map = map(3, 1);
    map.claim_for_base(SectorIndex::new(0, 0), TeamId(0), 6.0).unwrap();
    map.claim_for_base(SectorIndex::new(2, 0), TeamId(1), 6.0).unwrap();
    map.update_distances_to_base(TeamId(0));

    assert_eq!(map.sectors_in_distance(0), vec![SectorIndex::new(0, 0)]);
    assert_eq!(map.get(SectorIndex::new(2, 0)).unwrap().distance_to_base, Some(2));
    assert_eq!(map.base_sectors(TeamId(1)), vec![SectorIndex::new(2, 0)]);
}

#[test]
fn test_extractor_occupies_and_frees_spot() {
    let spot = Vec2::new(150.0, 150.0);
    let layout = MapLayout::uniform("spots", 3, 3, 100.0).with_metal_spot(spot, 2.5);
    let mut map = SectorMap::from_layout(&layout, &SectorConfig::default(), &mut FixedDecisions::default());

    let sector = map.sector_at_mut(spot).unwrap();
    assert_eq!(sector.number_of_metal_spots(), 1);
    assert!(sector.free_metal_spots);

    assert!(sector.add_extractor(77, UnitDefId(5), spot));
    assert!(!sector.free_metal_spots);
    assert!(sector.free_metal_spot().is_none());

    assert!(sector.release_metal_spot(spot));
    assert!(!sector.release_metal_spot(spot));
    assert!(sector.free_metal_spots);
    assert!(sector.metal_spots[0].extractor.is_none());
}

#[test]
fn test_free_spot_lookup_with_two_spots() {
    let taken = Vec2::new(120.0, 120.0);
    let open = Vec2::new(180.0, 170.0);
    let layout = MapLayout::uniform("spots", 3, 3, 100.0)
        .with_metal_spot(taken, 2.0)
        .with_metal_spot(open, 2.0);
    let mut map = SectorMap::from_layout(&layout, &SectorConfig::default(), &mut FixedDecisions::default());

    let sector = map.sector_at_mut(taken).unwrap();
    assert_eq!(sector.number_of_metal_spots(), 2);
    assert!(sector.occupy_metal_spot(taken));
    assert_eq!(sector.free_metal_spot().map(|s| s.pos), Some(open));

    assert!(sector.release_metal_spot(taken));
    assert!(sector.metal_spots.iter().all(|s| !s.occupied));
    assert!(sector.free_metal_spots);
}

#[test]
fn test_losses_decay() {
    let catalog = StaticCatalog::from_toml_str(CATALOG).unwrap();
    let mut map = map(2, 2);
    let index = SectorIndex::new(0, 0);
    {
        let sector = map.get_mut(index).unwrap();
        sector.update_threat_values(UnitDefId(1), UnitDefId(3), &catalog, 0.3);
        sector.update_threat_values(UnitDefId(2), UnitDefId(3), &catalog, 0.3);
        assert_eq!(sector.combats_this_game[CombatCategory::Air], 1.0);
        assert_eq!(sector.attacked_by_this_game[CombatCategory::Air], 1.0);
        assert_eq!(sector.lost_units(), 1.0);
    }

    for _ in 0..10 {
        map.update(0.95);
    }
    let lost = map.get(index).unwrap().lost_units();
    assert!((lost - 0.95f32.powi(10)).abs() < 1e-5);
    assert_eq!(catalog.category(UnitDefId(99)), strategos::units::UnitCategory::Unknown);
}

#[test]
fn test_interior_losses_are_damped() {
    let catalog = StaticCatalog::from_toml_str(CATALOG).unwrap();
    let mut map = map(3, 3);
    for sector in map.iter().map(|s| s.index).collect::<Vec<_>>() {
        map.claim_for_base(sector, TeamId(0), 6.0).unwrap();
    }
    map.update_distances_to_base(TeamId(0));

    let center = map.get_mut(SectorIndex::new(1, 1)).unwrap();
    assert!(center.interior);
    center.update_threat_values(UnitDefId(2), UnitDefId(1), &catalog, 0.3);
    assert!((center.attacked_by_this_game[CombatCategory::Ground] - 0.3).abs() < 1e-6);
    assert_eq!(center.weakest_category(0), Some(CombatCategory::Air));
}
