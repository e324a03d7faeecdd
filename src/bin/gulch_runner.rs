//! Headless town runner
//!
//! Builds a small frontier town from the content tables and runs the
//! simulation for a fixed number of ticks, logging messages as they happen
//! and the bounty ledger at the end. Deterministic for a given seed.

use clap::Parser;
use std::collections::VecDeque;
use std::path::PathBuf;

use red_gulch::ai::roles::AiState;
use red_gulch::ai::waypoints::WaypointSelector;
use red_gulch::core::context::SimulationContext;
use red_gulch::core::error::Result;
use red_gulch::core::types::{Area, CreatureId, Position};
use red_gulch::data::ContentCatalog;
use red_gulch::law::SheriffOffice;
use red_gulch::simulation::tick;
use red_gulch::world::snapshot;
use red_gulch::world::tile::Terrain;
use red_gulch::world::World;

#[derive(Parser, Debug)]
#[command(name = "gulch_runner")]
#[command(about = "Run a headless Red Gulch town simulation")]
struct Args {
    /// Random seed for deterministic runs
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 200)]
    ticks: u64,

    /// Content directory (items.toml, creatures.toml, terrain.toml,
    /// world.toml); compiled-in tables are used when omitted
    #[arg(long)]
    data: Option<PathBuf>,

    /// Write a world snapshot to this path when the run ends
    #[arg(long)]
    save: Option<PathBuf>,

    /// Verbose logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let default_filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    let content = match &args.data {
        Some(dir) => ContentCatalog::load(dir)?,
        None => ContentCatalog::builtin(),
    };
    let mut ctx = SimulationContext::new(args.seed, content);
    let mut world = build_town(&mut ctx)?;
    tracing::info!(seed = args.seed, ticks = args.ticks, "starting run");

    let mut player_queue = VecDeque::new();
    for _ in 0..args.ticks {
        let outcome = tick(&mut world, &mut ctx, &mut player_queue);
        for message in ctx.messages.drain() {
            tracing::info!(tick = outcome.tick, "{}", message);
        }
    }

    for office in &world.offices {
        if office.ledger.is_empty() {
            tracing::info!(sheriff = %office.sheriff, "ledger is clean");
        }
        for entry in office.ledger.entries() {
            tracing::info!(
                criminal = %entry.criminal,
                crimes = ?entry.crimes,
                cents = entry.value,
                "wanted"
            );
        }
    }
    tracing::info!(
        survivors = world.creatures().count(),
        tick = world.tick,
        "run complete"
    );

    if let Some(path) = &args.save {
        std::fs::write(path, snapshot::save(&world)?)?;
        tracing::info!(path = %path.display(), "snapshot written");
    }
    Ok(())
}

/// One street, one general store, law, townsfolk, and trouble at the edges.
fn build_town(ctx: &mut SimulationContext) -> Result<World> {
    let dims = ctx.content.world_config();
    let mut world = World::new(dims.width, dims.height);

    // Main street.
    let street = ctx.content.terrain("main_street")?;
    for x in 4..=34 {
        world.set_tile_kind(Position::new(x, 12), street)?;
    }

    // The general store: four walls, a window onto the street, a counter
    // with its flap, and a door.
    let wall = ctx.content.terrain("plank_wall")?;
    for x in 8..=14 {
        world.set_tile_kind(Position::new(x, 6), wall)?;
        world.set_tile_kind(Position::new(x, 10), wall)?;
    }
    for y in 6..=10 {
        world.set_tile_kind(Position::new(8, y), wall)?;
        world.set_tile_kind(Position::new(14, y), wall)?;
    }
    world.set_tile_kind(Position::new(9, 10), Terrain::Window)?;
    world.set_tile_kind(Position::new(11, 10), Terrain::Door)?;
    for x in 9..=12 {
        world.set_tile_kind(Position::new(x, 8), Terrain::Counter)?;
    }
    world.set_tile_kind(Position::new(13, 8), Terrain::CounterFlap)?;

    // Stock and street clutter.
    world.place_item(Position::new(10, 9), ctx.content.spawn_item("whiskey")?)?;
    world.place_item(Position::new(11, 9), ctx.content.spawn_item("beans")?)?;
    world.place_item(Position::new(12, 9), ctx.content.spawn_item("snake_oil_tonic")?)?;
    world.place_item(Position::new(16, 11), ctx.content.spawn_item("barrel")?)?;
    world.place_item(Position::new(22, 13), ctx.content.spawn_item("barrel")?)?;
    world.place_item(Position::new(25, 12), ctx.content.spawn_item("stick")?)?;
    world.place_item(Position::new(7, 13), ctx.content.spawn_item("wanted_poster")?)?;

    // The player idles on the street; an empty action queue means they
    // stand there, which is all the bandits need.
    let player = ctx
        .content
        .spawn_creature("player", CreatureId::new("player"), Position::new(18, 13))?;
    world.place_creature(player)?;

    let town_bounds = Area::new(Position::new(0, 0), Position::new(40, 24));
    let mut sheriff = ctx
        .content
        .spawn_creature("sheriff", CreatureId::new("sheriff"), Position::new(6, 13))?;
    sheriff.ai = AiState::Sheriff { office: 0 };
    world.place_creature(sheriff)?;
    world
        .offices
        .push(SheriffOffice::new(town_bounds, CreatureId::new("sheriff")));

    let mut shopkeeper = ctx.content.spawn_creature(
        "shopkeeper",
        CreatureId::new("shopkeeper"),
        Position::new(10, 7),
    )?;
    if let AiState::Shopkeeper { waypoints, .. } = &mut shopkeeper.ai {
        // The strip behind the counter.
        *waypoints =
            WaypointSelector::within(Area::new(Position::new(9, 7), Position::new(13, 7)));
    }
    world.place_creature(shopkeeper)?;

    let street_area = Area::new(Position::new(4, 11), Position::new(34, 14));
    for (id, at) in [("townsman-1", Position::new(20, 11)), ("townsman-2", Position::new(28, 13))] {
        let mut townsman = ctx
            .content
            .spawn_creature("townsman", CreatureId::new(id), at)?;
        if let AiState::Townsman { waypoints, .. } = &mut townsman.ai {
            *waypoints = WaypointSelector::within(street_area);
        }
        world.place_creature(townsman)?;
    }

    let horse = ctx
        .content
        .spawn_creature("horse", CreatureId::new("horse"), Position::new(26, 15))?;
    world.place_creature(horse)?;

    for (id, at) in [("bandit-1", Position::new(44, 16)), ("bandit-2", Position::new(48, 8))] {
        let mut bandit = ctx.content.spawn_creature("bandit", CreatureId::new(id), at)?;
        let mut revolver = ctx.content.spawn_item("revolver")?;
        if let Some(weapon) = revolver.components.weapon.as_mut() {
            if let Some(magazine) = weapon.magazine.as_mut() {
                magazine.loaded = magazine.capacity;
            }
        }
        revolver.owner = Some(CreatureId::new(id));
        bandit.weapon = Some(revolver);
        world.place_creature(bandit)?;
    }

    let coyote = ctx
        .content
        .spawn_creature("coyote", CreatureId::new("coyote"), Position::new(56, 30))?;
    world.place_creature(coyote)?;

    tracing::info!(
        creatures = world.creatures().count(),
        width = dims.width,
        height = dims.height,
        "town built"
    );
    Ok(world)
}
