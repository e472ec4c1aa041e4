//! Serializable capture of a complete session.

use path_defence_core::{
    CellCoord, ConfigError, Economy, EnemyId, EnemySnapshot, GameStatus, PlacementError,
    ProjectileSnapshot, SessionConfig, TowerId, TowerSnapshot, WaveProgress,
};
use path_defence_system_waves::WaveScheduler;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Everything needed to resume a session exactly where it left off.
///
/// Captured between ticks, so every enemy listed is alive and every
/// projectile is still in flight. Restoring a snapshot and replaying the
/// same commands reproduces the same events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Configuration the session was started with.
    pub config: SessionConfig,
    /// Money, score and lives.
    pub economy: Economy,
    /// Lifecycle state.
    pub status: GameStatus,
    /// Display summary of the scheduler. Derived; ignored on restore.
    pub wave_progress: WaveProgress,
    /// Towers in identifier order.
    pub towers: Vec<TowerSnapshot>,
    /// Live enemies in spawn order.
    pub enemies: Vec<EnemySnapshot>,
    /// Projectiles in flight, in firing order.
    pub projectiles: Vec<ProjectileSnapshot>,
    /// Full scheduler state including unspawned enemies.
    pub scheduler: WaveScheduler,
    /// Identifier the next placed tower receives.
    pub next_tower_id: TowerId,
    /// Identifier the next spawned enemy receives.
    pub next_enemy_id: EnemyId,
    /// Number of ticks simulated so far.
    pub tick_index: u64,
}

impl SessionSnapshot {
    /// Reports whether lives ran out.
    #[must_use]
    pub fn game_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }

    /// Reports whether every wave was defeated.
    #[must_use]
    pub fn game_won(&self) -> bool {
        self.status == GameStatus::GameWon
    }
}

/// Reasons a [`SessionSnapshot`] cannot be turned back into a world.
#[derive(Debug, Error)]
pub enum RestoreError {
    /// The embedded configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// A tower sits on a cell it could not have been placed on.
    #[error("tower {} cannot occupy ({}, {}): {reason}", tower.get(), cell.column(), cell.row())]
    TowerPlacement {
        /// Offending tower.
        tower: TowerId,
        /// Cell the tower claims.
        cell: CellCoord,
        /// Why the cell is unavailable.
        reason: PlacementError,
    },
    /// Tower identifiers are duplicated, unordered, or not below the saved counter.
    #[error("tower {} is out of order or was never allocated", .0.get())]
    UnallocatedTower(TowerId),
    /// Enemy identifiers are duplicated, unordered, or not below the saved counter.
    #[error("enemy {} is out of order or was never allocated", .0.get())]
    UnallocatedEnemy(EnemyId),
    /// An enemy claims a waypoint beyond the end of the corridor.
    #[error("enemy {} references waypoint {path_index} beyond the corridor", enemy.get())]
    PathIndexOutOfRange {
        /// Offending enemy.
        enemy: EnemyId,
        /// Waypoint index it claims to have reached.
        path_index: usize,
    },
    /// An enemy has more health than its archetype maximum.
    #[error("enemy {} has {health} health, above its maximum of {max_health}", enemy.get())]
    HealthAboveMaximum {
        /// Offending enemy.
        enemy: EnemyId,
        /// Health it claims.
        health: u32,
        /// Maximum it was spawned with.
        max_health: u32,
    },
}
