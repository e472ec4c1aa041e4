#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Path Defence session.

mod orders;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use path_defence_core::{CellCoord, Command, Event, GameStatus, TowerKind, UpgradeTarget};
use path_defence_system_bootstrap::Bootstrap;
use path_defence_world::{apply, query, World};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

use orders::{CellArg, TowerOrder};

/// Command-line arguments accepted by the Path Defence session runner.
#[derive(Debug, Parser)]
#[command(name = "path-defence", about = "Runs a headless Path Defence session")]
struct CliArgs {
    /// TOML session file; built-in defaults are used when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Tower to build before the first tick, as `kind@column,row`.
    #[arg(long = "tower", value_name = "ORDER")]
    towers: Vec<TowerOrder>,
    /// Cell whose tower is upgraded once after placement, as `column,row`.
    #[arg(long = "upgrade", value_name = "CELL")]
    upgrades: Vec<CellArg>,
    /// Number of additional towers placed on random free cells.
    #[arg(long, default_value_t = 0)]
    auto_towers: u32,
    /// Seed for random tower placement.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: u64,
    /// Upper bound on simulated ticks.
    #[arg(long, default_value_t = 100_000)]
    max_ticks: u64,
    /// Writes the final session snapshot as JSON to this path.
    #[arg(long, value_name = "PATH")]
    snapshot: Option<PathBuf>,
}

/// Running totals of the events observed during a session.
#[derive(Debug, Default)]
struct Tally {
    spawned: u32,
    shots: u32,
    kills: u32,
    escapes: u32,
    waves_cleared: u32,
}

impl Tally {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EnemySpawned { .. } => self.spawned += 1,
                Event::ProjectileFired { .. } => self.shots += 1,
                Event::EnemyKilled { .. } => self.kills += 1,
                Event::EnemyEscaped { .. } => self.escapes += 1,
                Event::WaveCleared { wave } => {
                    self.waves_cleared += 1;
                    info!("wave {wave} cleared");
                }
                _ => {}
            }
        }
    }
}

/// Entry point for the Path Defence command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = CliArgs::parse();

    let bootstrap = match &args.config {
        Some(path) => Bootstrap::from_path(path)
            .with_context(|| format!("failed to load session from {}", path.display()))?,
        None => Bootstrap::new(),
    };
    println!("{}", bootstrap.welcome_banner());

    let mut world = bootstrap.world().context("failed to build world")?;
    let mut events = Vec::new();
    place_ordered_towers(&mut world, &args.towers, &mut events);
    place_random_towers(&mut world, args.auto_towers, args.seed, &mut events);
    upgrade_towers(&mut world, &args.upgrades, &mut events);

    let dt = Duration::from_millis(args.tick_ms);
    let mut tally = Tally::default();
    let mut ticks = 0;
    while ticks < args.max_ticks && !query::status(&world).is_terminal() {
        events.clear();
        apply(&mut world, Command::Tick { dt }, &mut events)
            .context("tick was rejected")?;
        tally.record(&events);
        ticks += 1;
    }

    print_summary(&world, &tally, ticks, dt);

    if let Some(path) = &args.snapshot {
        let json = serde_json::to_string_pretty(&query::snapshot(&world))
            .context("failed to serialize session snapshot")?;
        fs::write(path, json)
            .with_context(|| format!("failed to write snapshot to {}", path.display()))?;
        println!("snapshot written to {}", path.display());
    }

    Ok(())
}

fn place_ordered_towers(world: &mut World, orders: &[TowerOrder], events: &mut Vec<Event>) {
    for order in orders {
        let command = Command::PlaceTower {
            kind: order.kind,
            cell: order.cell,
        };
        if let Err(error) = apply(world, command, events) {
            warn!("skipping {} tower: {error}", order.kind.name());
        }
    }
}

fn place_random_towers(world: &mut World, count: u32, seed: u64, events: &mut Vec<Event>) {
    if count == 0 {
        return;
    }

    let grid = query::grid(world);
    let mut free: Vec<CellCoord> = (0..grid.rows())
        .flat_map(|row| (0..grid.columns()).map(move |column| CellCoord::new(column, row)))
        .filter(|cell| grid.is_walkable(*cell))
        .collect();

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    free.shuffle(&mut rng);

    for cell in free.into_iter().take(usize::try_from(count).unwrap_or(usize::MAX)) {
        let Some(kind) = TowerKind::ALL.choose(&mut rng).copied() else {
            continue;
        };
        if let Err(error) = apply(world, Command::PlaceTower { kind, cell }, events) {
            warn!("skipping random {} tower: {error}", kind.name());
        }
    }
}

fn upgrade_towers(world: &mut World, cells: &[CellArg], events: &mut Vec<Event>) {
    for CellArg(cell) in cells {
        let target = UpgradeTarget::Cell(*cell);
        if let Err(error) = apply(world, Command::UpgradeTower { target }, events) {
            warn!("skipping upgrade: {error}");
        }
    }
}

fn print_summary(world: &World, tally: &Tally, ticks: u64, dt: Duration) {
    let outcome = match query::status(world) {
        GameStatus::Running => "still running",
        GameStatus::GameOver => "game over",
        GameStatus::GameWon => "victory",
    };
    let economy = query::economy(world);
    let progress = query::wave_progress(world);
    let elapsed = dt.saturating_mul(u32::try_from(ticks).unwrap_or(u32::MAX));

    println!(
        "{outcome} after {ticks} ticks ({:.1}s simulated)",
        elapsed.as_secs_f64()
    );
    println!(
        "wave {}/{} ({} cleared)",
        progress.wave, progress.total_waves, tally.waves_cleared
    );
    println!(
        "spawned {} enemies, fired {} shots, killed {}, {} escaped",
        tally.spawned, tally.shots, tally.kills, tally.escapes
    );
    println!(
        "money {}, score {}, lives {}",
        economy.money, economy.score, economy.lives
    );
    println!("{} towers standing", query::tower_view(world).iter().count());
}
