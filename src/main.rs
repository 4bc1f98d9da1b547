//! Strategos - skirmish demo
//!
//! Drives one strategic agent through a scripted skirmish against a
//! passive enemy base in the far corner of the map. Groups are produced at
//! a fixed rate, the enemy raids the base now and then, and every order the
//! agent issues is carried out instantly.

use std::path::PathBuf;

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;

use strategos::brain::{EconomySample, PersistentKnowledge};
use strategos::core::decisions::SeededDecisions;
use strategos::core::types::{GroupId, SectorIndex, TeamId, UnitDefId, Vec2};
use strategos::sector::MapLayout;
use strategos::units::{CombatCategoryValues, StaticCatalog, TargetType, TargetTypeValues};
use strategos::{load_profile, EngineEvent, Order, Result, StrategicAgent};

const SECTOR_SIZE: f32 = 512.0;
const TANK: UnitDefId = UnitDefId(3);
const RAIDER: UnitDefId = UnitDefId(2);
const SOLAR: UnitDefId = UnitDefId(10);
const TOWER: UnitDefId = UnitDefId(30);

/// Scripted skirmish driver for the strategic core
#[derive(Parser, Debug)]
#[command(name = "strategos")]
#[command(about = "Run the strategic core through a scripted skirmish")]
struct Args {
    /// Strategy profile name (loaded from data/strategy/)
    #[arg(long, default_value = "default")]
    profile: String,

    /// Unit catalog in TOML
    #[arg(long, default_value = "data/catalog/skirmish.toml")]
    catalog: PathBuf,

    /// Map width in sectors
    #[arg(long, default_value_t = 12)]
    width: usize,

    /// Map height in sectors
    #[arg(long, default_value_t = 12)]
    height: usize,

    /// Game length in frames
    #[arg(long, default_value_t = 30_000)]
    ticks: u64,

    /// Frames between two strategic updates
    #[arg(long, default_value_t = 30)]
    tick_step: u64,

    /// Random seed for deterministic runs
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Knowledge file to learn from and update after the game
    #[arg(long)]
    knowledge: Option<PathBuf>,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,
}

#[derive(Serialize)]
struct Summary {
    profile: String,
    ticks: u64,
    orders: usize,
    attacks_launched: usize,
    enemy_sectors_left: usize,
    base_sectors: usize,
    pressure: f32,
    threat: [f32; 4],
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("strategos=info")),
        )
        .init();

    let args = Args::parse();
    let config = load_profile(&args.profile)?;
    let catalog = StaticCatalog::load(&args.catalog)?;
    let knowledge = match &args.knowledge {
        Some(path) => PersistentKnowledge::load(path)?,
        None => PersistentKnowledge::new(),
    };

    let layout = skirmish_layout(args.width, args.height);
    let mut agent = StrategicAgent::new(
        config,
        TeamId(0),
        &layout,
        catalog,
        knowledge,
        Box::new(SeededDecisions::new(args.seed)),
    );
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    agent.set_start_position(Vec2::new(1.5 * SECTOR_SIZE, 1.5 * SECTOR_SIZE));
    let base = sector_center(SectorIndex::new(1, 1));
    agent.handle(EngineEvent::StructureCompleted {
        def: SOLAR,
        position: base,
    });
    agent.handle(EngineEvent::StructureCompleted {
        def: TOWER,
        position: base,
    });

    let enemy_sectors = scout_enemy_base(&mut agent, args.width, args.height);

    let mut next_group = 1;
    let mut orders_issued = 0;
    let mut attacks_launched = 0;
    let mut tick = 0;
    while tick < args.ticks {
        tick += args.tick_step;

        agent.handle(EngineEvent::EconomySample(EconomySample {
            metal_income: 4.0 + tick as f32 / 2000.0,
            energy_income: 40.0,
            metal_usage: 3.5,
            energy_usage: 30.0,
            stored_metal: 200.0,
            stored_energy: 800.0,
            ..EconomySample::default()
        }));

        if tick % 900 == 0 {
            agent.handle(EngineEvent::GroupCreated {
                group: GroupId(next_group),
                def: TANK,
                size: 4,
                continent: 0,
                sector: Some(SectorIndex::new(1, 1)),
            });
            next_group += 1;
        }

        if rng.gen_bool(0.01) {
            agent.handle(EngineEvent::UnitDestroyed {
                destroyed: SOLAR,
                attacker: RAIDER,
                position: base,
            });
        }

        let before = agent.attacks().len();
        let orders = agent.update(tick);
        if agent.attacks().len() > before {
            attacks_launched += 1;
        }
        orders_issued += orders.len();
        for order in orders {
            execute(&mut agent, order);
        }
    }

    if let Some(path) = &args.knowledge {
        agent.finish_game(path)?;
    }

    let threat = agent.threat();
    let summary = Summary {
        profile: args.profile.clone(),
        ticks: args.ticks,
        orders: orders_issued,
        attacks_launched,
        enemy_sectors_left: enemy_sectors
            .iter()
            .filter_map(|s| agent.map().get(*s))
            .filter(|s| s.is_occupied_by_enemies())
            .count(),
        base_sectors: agent.brain().base_sectors().len(),
        pressure: agent.brain().pressure(),
        threat: TargetType::MOBILE.map(|t| threat[t]),
    };

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("=== STRATEGOS SKIRMISH ({}) ===", summary.profile);
        println!("Frames:             {}", summary.ticks);
        println!("Orders issued:      {}", summary.orders);
        println!("Attacks launched:   {}", summary.attacks_launched);
        println!(
            "Enemy sectors left: {}/{}",
            summary.enemy_sectors_left,
            enemy_sectors.len()
        );
        println!("Base sectors:       {}", summary.base_sectors);
        println!("Pressure:           {:.2}", summary.pressure);
        for (target_type, value) in TargetType::MOBILE.iter().zip(summary.threat) {
            println!("Threat vs {:<10}{:.2}", target_type.name(), value);
        }
    }

    Ok(())
}

fn sector_center(index: SectorIndex) -> Vec2 {
    Vec2::new(
        (index.x as f32 + 0.5) * SECTOR_SIZE,
        (index.y as f32 + 0.5) * SECTOR_SIZE,
    )
}

fn skirmish_layout(width: usize, height: usize) -> MapLayout {
    let mut layout = MapLayout::uniform("skirmish", width, height, SECTOR_SIZE);
    for y in (0..height).step_by(2) {
        for x in (0..width).step_by(3) {
            let center = sector_center(SectorIndex::new(x, y));
            layout = layout.with_metal_spot(center, 2.0);
        }
    }
    layout
}

/// Report the enemy base (three by three sectors in the far corner) as scouted
fn scout_enemy_base(agent: &mut StrategicAgent<StaticCatalog>, width: usize, height: usize) -> Vec<SectorIndex> {
    let mut sectors = Vec::new();
    for y in height.saturating_sub(3)..height {
        for x in width.saturating_sub(3)..width {
            let sector = SectorIndex::new(x, y);
            let mut units = CombatCategoryValues::new();
            units[strategos::units::CombatCategory::Ground] = 1.0;
            agent.handle(EngineEvent::SectorScouted {
                sector,
                combat_units: units,
                structures: 2.0,
                on_radar: 0,
            });
            agent.handle(EngineEvent::EnemyCombatPowerSpotted {
                sector,
                static_power: TargetTypeValues::single(TargetType::Surface, 2.0),
                mobile_power: TargetTypeValues::single(TargetType::Surface, 1.0),
            });
            sectors.push(sector);
        }
    }
    info!("Scouted {} enemy base sectors", sectors.len());
    sectors
}

/// Carry out an order at once: arriving groups clear the sector and lose a unit
fn execute(agent: &mut StrategicAgent<StaticCatalog>, order: Order) {
    match order {
        Order::MoveTo { group, sector } => {
            agent.handle(EngineEvent::GroupMoved { group, sector });
            agent.handle(EngineEvent::SectorScouted {
                sector,
                combat_units: CombatCategoryValues::new(),
                structures: 0.0,
                on_radar: 0,
            });
            agent.handle(EngineEvent::EnemyCombatPowerSpotted {
                sector,
                static_power: TargetTypeValues::new(),
                mobile_power: TargetTypeValues::new(),
            });
            let size = agent.groups().get(group).map(|g| g.size).unwrap_or(0);
            if size > 1 {
                agent.handle(EngineEvent::GroupResized {
                    group,
                    size: size - 1,
                });
            } else {
                agent.handle(EngineEvent::GroupDestroyed { group });
            }
        }
        Order::Halt { group } => {
            agent.handle(EngineEvent::GroupMoved {
                group,
                sector: SectorIndex::new(1, 1),
            });
        }
    }
}
