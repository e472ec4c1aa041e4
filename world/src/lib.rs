#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Path Defence.
//!
//! The world owns the grid, towers, enemies, projectiles, the wave scheduler
//! and the session economy. Adapters mutate it exclusively through [`apply`]
//! and observe it through the [`query`] module.

mod enemies;
mod grid;
mod projectiles;
mod snapshot;
mod towers;

use std::time::Duration;

use log::{debug, info, warn};
use path_defence_core::{
    CellCoord, Command, CommandError, ConfigError, Economy, Event, GameStatus, SessionConfig,
    TowerId, TowerKind, UpgradeTarget,
};
use path_defence_system_tower_targeting::{ReadyTower, TowerTargeting};
use path_defence_system_waves::{self as waves, WaveScheduler};

use enemies::{EnemyRoster, EnemyState, Fate};
pub use grid::{Grid, GridCell};
use projectiles::Projectile;
pub use snapshot::{RestoreError, SessionSnapshot};
use towers::{TowerRegistry, TowerState};

/// Represents the authoritative Path Defence world state.
#[derive(Debug)]
pub struct World {
    config: SessionConfig,
    grid: Grid,
    towers: TowerRegistry,
    enemies: EnemyRoster,
    projectiles: Vec<Projectile>,
    scheduler: WaveScheduler,
    targeting: TowerTargeting,
    economy: Economy,
    status: GameStatus,
    tick_index: u64,
}

impl World {
    /// Creates a world using the default session configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from_valid_config(SessionConfig::default())
    }

    /// Creates a world from `config` after validating it.
    pub fn with_config(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    /// Rebuilds a world from a snapshot captured by [`query::snapshot`].
    pub fn restore(snapshot: SessionSnapshot) -> Result<Self, RestoreError> {
        Self::rebuild(snapshot).map_err(|error| {
            warn!("rejected session snapshot: {error}");
            error
        })
    }

    fn from_valid_config(config: SessionConfig) -> Self {
        let grid = Grid::new(config.columns, config.rows, config.cell_size);
        let scheduler = WaveScheduler::new(
            waves::Config::new(
                config.first_wave_delay,
                config.wave_interval,
                config.spawn_interval,
            ),
            config.waves.clone(),
        );
        let economy = Economy {
            money: config.starting_money,
            score: 0,
            lives: config.starting_lives,
        };

        Self {
            grid,
            towers: TowerRegistry::new(),
            enemies: EnemyRoster::new(),
            projectiles: Vec::new(),
            scheduler,
            targeting: TowerTargeting::new(),
            economy,
            status: GameStatus::Running,
            tick_index: 0,
            config,
        }
    }

    fn rebuild(snapshot: SessionSnapshot) -> Result<Self, RestoreError> {
        snapshot.config.validate()?;
        let mut grid = Grid::new(
            snapshot.config.columns,
            snapshot.config.rows,
            snapshot.config.cell_size,
        );

        let mut towers: Vec<TowerState> = Vec::with_capacity(snapshot.towers.len());
        for tower in &snapshot.towers {
            let ordered = towers.last().map_or(true, |previous| previous.id < tower.id);
            if !ordered || tower.id >= snapshot.next_tower_id {
                return Err(RestoreError::UnallocatedTower(tower.id));
            }
            if let Err(reason) = grid.occupy(tower.cell, tower.id) {
                return Err(RestoreError::TowerPlacement {
                    tower: tower.id,
                    cell: tower.cell,
                    reason,
                });
            }
            towers.push(TowerState::from_snapshot(tower));
        }

        let mut enemies: Vec<EnemyState> = Vec::with_capacity(snapshot.enemies.len());
        for enemy in &snapshot.enemies {
            let ordered = enemies.last().map_or(true, |previous| previous.id < enemy.id);
            if !ordered || enemy.id >= snapshot.next_enemy_id {
                return Err(RestoreError::UnallocatedEnemy(enemy.id));
            }
            if enemy.path_index >= grid.path().len() {
                return Err(RestoreError::PathIndexOutOfRange {
                    enemy: enemy.id,
                    path_index: enemy.path_index,
                });
            }
            if enemy.health > enemy.max_health {
                return Err(RestoreError::HealthAboveMaximum {
                    enemy: enemy.id,
                    health: enemy.health,
                    max_health: enemy.max_health,
                });
            }
            enemies.push(EnemyState::from_snapshot(enemy));
        }

        let projectiles = snapshot
            .projectiles
            .iter()
            .map(Projectile::from_snapshot)
            .collect();

        Ok(Self {
            grid,
            towers: TowerRegistry::restored(towers, snapshot.next_tower_id),
            enemies: EnemyRoster::restored(enemies, snapshot.next_enemy_id),
            projectiles,
            scheduler: snapshot.scheduler,
            targeting: TowerTargeting::new(),
            economy: snapshot.economy,
            status: snapshot.status,
            tick_index: snapshot.tick_index,
            config: snapshot.config,
        })
    }

    fn spawn_wave_enemies(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let mut spawns = Vec::new();
        self.scheduler
            .handle(dt, self.enemies.live_count(), &mut spawns, out_events);

        let Some(start) = self.grid.path().first().copied() else {
            return;
        };
        for kind in spawns {
            let stats = *self.config.enemies.stats(kind);
            let enemy = self.enemies.spawn(kind, &stats, start);
            debug!("spawned {} enemy {}", kind.name(), enemy.get());
            out_events.push(Event::EnemySpawned { enemy, kind });
        }
    }

    fn move_enemies(&mut self, seconds: f32) {
        let path = self.grid.path();
        let exit = self.grid.exit_heading();
        let cell_size = self.grid.cell_size();
        let boundary = self.grid.width();

        for enemy in self.enemies.iter_mut() {
            if enemy.health == 0 && enemy.fate.is_none() {
                enemy.fate = Some(Fate::Killed);
            }
            if enemy.is_live() {
                enemy.advance(path, exit, cell_size, seconds, boundary);
            }
        }
    }

    fn fire_towers(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let mut ready = Vec::new();
        for tower in self.towers.iter_mut() {
            if tower.cool_down(dt) {
                ready.push(ReadyTower {
                    id: tower.id,
                    position: tower.position,
                    range: tower.range,
                });
            }
        }
        if ready.is_empty() {
            return;
        }

        let mut targets = Vec::new();
        self.targeting
            .handle(&ready, &self.enemies.live_view(), &mut targets);

        for target in targets {
            let Some(tower) = self.towers.get_mut(target.tower) else {
                continue;
            };
            self.projectiles.push(Projectile::launch(tower, target.enemy));
            tower.rearm();
            out_events.push(Event::ProjectileFired {
                tower: tower.id,
                target: target.enemy,
                damage: tower.damage,
            });
        }
    }

    fn move_projectiles(&mut self, seconds: f32, out_events: &mut Vec<Event>) {
        for projectile in &mut self.projectiles {
            if let Some(hit) = projectile.advance(&mut self.enemies, seconds) {
                out_events.push(Event::EnemyHit {
                    enemy: hit.enemy,
                    damage: hit.damage,
                    remaining: hit.remaining,
                });
            }
        }
    }

    fn reconcile(&mut self, out_events: &mut Vec<Event>) {
        let mut departed = Vec::new();
        self.enemies.drain_fated(&mut departed);

        for enemy in departed {
            match enemy.fate {
                Some(Fate::Killed) => {
                    self.economy.money = self.economy.money.saturating_add(enemy.reward);
                    self.economy.score = self.economy.score.saturating_add(enemy.reward);
                    debug!("enemy {} killed for {}", enemy.id.get(), enemy.reward);
                    out_events.push(Event::EnemyKilled {
                        enemy: enemy.id,
                        kind: enemy.kind,
                        reward: enemy.reward,
                    });
                }
                Some(Fate::Escaped) => {
                    self.economy.lives = self.economy.lives.saturating_sub(1);
                    debug!(
                        "enemy {} escaped, {} lives left",
                        enemy.id.get(),
                        self.economy.lives
                    );
                    out_events.push(Event::EnemyEscaped {
                        enemy: enemy.id,
                        kind: enemy.kind,
                        lives_remaining: self.economy.lives,
                    });
                }
                None => {}
            }
        }

        self.projectiles.retain(|projectile| !projectile.is_expired());
    }

    fn settle_status(&mut self, out_events: &mut Vec<Event>) {
        let score = self.economy.score;
        if self.economy.lives == 0 {
            info!("game over after {} ticks with score {score}", self.tick_index);
            self.status = GameStatus::GameOver;
            out_events.push(Event::GameOver { score });
        } else if self.scheduler.is_complete() && self.enemies.is_empty() {
            info!("all waves defeated after {} ticks with score {score}", self.tick_index);
            self.status = GameStatus::GameWon;
            out_events.push(Event::GameWon { score });
        }
    }

    fn resolve_tower(&self, target: UpgradeTarget) -> Option<TowerId> {
        match target {
            UpgradeTarget::Tower(id) => self.towers.get(id).map(|tower| tower.id),
            UpgradeTarget::Cell(cell) => self.grid.occupant(cell),
            UpgradeTarget::Point(point) => self
                .grid
                .cell_at(point)
                .and_then(|cell| self.grid.occupant(cell)),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Rejected commands leave the world untouched.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), CommandError> {
    match command {
        Command::PlaceTower { kind, cell } => {
            place_tower(world, kind, cell, out_events).map(|_| ())
        }
        Command::UpgradeTower { target } => upgrade_tower(world, target, out_events).map(|_| ()),
        Command::Tick { dt } => {
            tick(world, dt, out_events);
            Ok(())
        }
    }
}

/// Builds a tower of `kind` on `cell` and returns its identifier.
///
/// The cell is checked before funds, so an invalid cell is reported even
/// when the player could not afford the tower either.
pub fn place_tower(
    world: &mut World,
    kind: TowerKind,
    cell: CellCoord,
    out_events: &mut Vec<Event>,
) -> Result<TowerId, CommandError> {
    let invalid = |reason| CommandError::InvalidPlacement { cell, reason };
    world.grid.check_placement(cell).map_err(invalid)?;

    let stats = *world.config.towers.stats(kind);
    if world.economy.money < stats.cost {
        return Err(CommandError::InsufficientFunds {
            required: stats.cost,
            available: world.economy.money,
        });
    }

    world.grid.occupy(cell, world.towers.next_id()).map_err(invalid)?;
    let position = world.grid.center_of(cell);
    let tower = world.towers.insert(kind, cell, position, &stats);
    world.economy.money -= stats.cost;

    debug!(
        "placed {} tower {} at ({}, {})",
        kind.name(),
        tower.get(),
        cell.column(),
        cell.row()
    );
    out_events.push(Event::TowerPlaced {
        tower,
        kind,
        cell,
        cost: stats.cost,
    });
    Ok(tower)
}

/// Raises the tower named by `target` one level and returns the new level.
pub fn upgrade_tower(
    world: &mut World,
    target: UpgradeTarget,
    out_events: &mut Vec<Event>,
) -> Result<u32, CommandError> {
    let missing = || CommandError::NoSuchTower { target };
    let id = world.resolve_tower(target).ok_or_else(missing)?;
    let tower = world.towers.get_mut(id).ok_or_else(missing)?;

    let cost = tower.upgrade_cost;
    if world.economy.money < cost {
        return Err(CommandError::InsufficientFunds {
            required: cost,
            available: world.economy.money,
        });
    }

    world.economy.money -= cost;
    let level = tower.upgrade();
    debug!("upgraded tower {} to level {level}", id.get());
    out_events.push(Event::TowerUpgraded {
        tower: id,
        level,
        cost,
    });
    Ok(level)
}

/// Advances the simulation by `dt`.
///
/// Within a tick the scheduler spawns first, then enemies move, towers fire,
/// projectiles fly, and finally kills and escapes are settled against the
/// economy. Ticks after the session ended do nothing.
pub fn tick(world: &mut World, dt: Duration, out_events: &mut Vec<Event>) {
    if world.status.is_terminal() {
        return;
    }

    world.tick_index = world.tick_index.saturating_add(1);
    out_events.push(Event::TimeAdvanced { dt });

    let seconds = dt.as_secs_f32();
    world.spawn_wave_enemies(dt, out_events);
    world.move_enemies(seconds);
    world.fire_towers(dt, out_events);
    world.move_projectiles(seconds, out_events);
    world.reconcile(out_events);
    world.settle_status(out_events);
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use path_defence_core::{
        CellCoord, Economy, EnemyView, GameStatus, ProjectileSnapshot, SessionConfig, TowerId,
        TowerView, WaveProgress, WorldPoint,
    };

    use super::{Grid, SessionSnapshot, World};
    use crate::{enemies::EnemyState, towers::TowerState};

    /// Configuration the session runs with.
    #[must_use]
    pub fn config(world: &World) -> &SessionConfig {
        &world.config
    }

    /// Provides read-only access to the grid and its corridor.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Ordered corridor waypoints.
    #[must_use]
    pub fn path(world: &World) -> &[WorldPoint] {
        world.grid.path()
    }

    /// Reports whether a tower may be placed on `cell`.
    #[must_use]
    pub fn is_walkable(world: &World, cell: CellCoord) -> bool {
        world.grid.is_walkable(cell)
    }

    /// Tower standing on `cell`, if any.
    #[must_use]
    pub fn tower_at(world: &World, cell: CellCoord) -> Option<TowerId> {
        world.grid.occupant(cell)
    }

    /// Captures a read-only view of every placed tower.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(TowerState::snapshot).collect())
    }

    /// Captures a read-only view of the enemies on the field, in spawn order.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(EnemyState::snapshot).collect())
    }

    /// Projectiles in flight, in firing order.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .projectiles
            .iter()
            .map(|projectile| projectile.snapshot())
            .collect()
    }

    /// Money, score and lives.
    #[must_use]
    pub fn economy(world: &World) -> Economy {
        world.economy
    }

    /// Lifecycle state of the session.
    #[must_use]
    pub fn status(world: &World) -> GameStatus {
        world.status
    }

    /// Progress through the wave schedule.
    #[must_use]
    pub fn wave_progress(world: &World) -> WaveProgress {
        world.scheduler.progress()
    }

    /// Number of ticks simulated so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Captures everything needed to restore the session later.
    #[must_use]
    pub fn snapshot(world: &World) -> SessionSnapshot {
        SessionSnapshot {
            config: world.config.clone(),
            economy: world.economy,
            status: world.status,
            wave_progress: world.scheduler.progress(),
            towers: tower_view(world).into_vec(),
            enemies: enemy_view(world).into_vec(),
            projectiles: projectiles(world),
            scheduler: world.scheduler.clone(),
            next_tower_id: world.towers.next_id(),
            next_enemy_id: world.enemies.next_id(),
            tick_index: world.tick_index,
        }
    }
}
