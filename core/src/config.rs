//! Static session configuration: grid layout, economy, archetypes and waves.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{EnemyKind, TowerKind};

/// Base statistics of a tower archetype.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerStats {
    /// Money required to place the tower.
    pub cost: u32,
    /// Damage dealt by each projectile.
    pub damage: u32,
    /// Targeting radius in world units.
    pub range: f32,
    /// Shots per second.
    pub fire_rate: f32,
}

/// Base statistics of an enemy archetype.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    /// Health the enemy spawns with.
    pub health: u32,
    /// Movement speed in cells per second.
    pub speed: f32,
    /// Money and score awarded when killed.
    pub reward: u32,
    /// Drawing radius in world units.
    pub size: f32,
}

/// Stat table covering every tower archetype.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerArchetypes {
    /// Statistics of [`TowerKind::Basic`].
    pub basic: TowerStats,
    /// Statistics of [`TowerKind::Sniper`].
    pub sniper: TowerStats,
    /// Statistics of [`TowerKind::Splash`].
    pub splash: TowerStats,
}

impl TowerArchetypes {
    /// Looks up the statistics for `kind`.
    #[must_use]
    pub const fn stats(&self, kind: TowerKind) -> &TowerStats {
        match kind {
            TowerKind::Basic => &self.basic,
            TowerKind::Sniper => &self.sniper,
            TowerKind::Splash => &self.splash,
        }
    }
}

impl Default for TowerArchetypes {
    fn default() -> Self {
        Self {
            basic: TowerStats {
                cost: 50,
                damage: 10,
                range: 100.0,
                fire_rate: 1.0,
            },
            sniper: TowerStats {
                cost: 100,
                damage: 50,
                range: 200.0,
                fire_rate: 0.5,
            },
            splash: TowerStats {
                cost: 75,
                damage: 15,
                range: 80.0,
                fire_rate: 0.8,
            },
        }
    }
}

/// Stat table covering every enemy archetype.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyArchetypes {
    /// Statistics of [`EnemyKind::Basic`].
    pub basic: EnemyStats,
    /// Statistics of [`EnemyKind::Fast`].
    pub fast: EnemyStats,
    /// Statistics of [`EnemyKind::Tank`].
    pub tank: EnemyStats,
}

impl EnemyArchetypes {
    /// Looks up the statistics for `kind`.
    #[must_use]
    pub const fn stats(&self, kind: EnemyKind) -> &EnemyStats {
        match kind {
            EnemyKind::Basic => &self.basic,
            EnemyKind::Fast => &self.fast,
            EnemyKind::Tank => &self.tank,
        }
    }
}

impl Default for EnemyArchetypes {
    fn default() -> Self {
        Self {
            basic: EnemyStats {
                health: 50,
                speed: 1.0,
                reward: 10,
                size: 10.0,
            },
            fast: EnemyStats {
                health: 30,
                speed: 2.0,
                reward: 15,
                size: 8.0,
            },
            tank: EnemyStats {
                health: 200,
                speed: 0.5,
                reward: 30,
                size: 15.0,
            },
        }
    }
}

/// Complete configuration loaded once at session start.
///
/// Every field has a default, so configuration files only need to name the
/// values they override.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of grid columns.
    pub columns: u32,
    /// Number of grid rows.
    pub rows: u32,
    /// Side length of a square cell in world units.
    pub cell_size: f32,
    /// Money available at session start.
    pub starting_money: u32,
    /// Lives available at session start.
    pub starting_lives: u32,
    /// Delay before the first wave starts.
    #[serde(with = "seconds")]
    pub first_wave_delay: Duration,
    /// Cooldown between a cleared wave and the next one.
    #[serde(with = "seconds")]
    pub wave_interval: Duration,
    /// Time between consecutive spawns within a wave.
    #[serde(with = "seconds")]
    pub spawn_interval: Duration,
    /// Tower archetype statistics.
    pub towers: TowerArchetypes,
    /// Enemy archetype statistics.
    pub enemies: EnemyArchetypes,
    /// Waves in order, each listing its enemies in spawn order.
    pub waves: Vec<Vec<EnemyKind>>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        use EnemyKind::{Basic, Fast, Tank};

        Self {
            columns: 20,
            rows: 15,
            cell_size: 40.0,
            starting_money: 200,
            starting_lives: 20,
            first_wave_delay: Duration::from_secs(5),
            wave_interval: Duration::from_secs(5),
            spawn_interval: Duration::from_secs(1),
            towers: TowerArchetypes::default(),
            enemies: EnemyArchetypes::default(),
            waves: vec![
                vec![Basic; 5],
                [vec![Basic; 5], vec![Fast; 3]].concat(),
                [vec![Fast; 5], vec![Tank; 2]].concat(),
                [vec![Basic; 5], vec![Fast; 5], vec![Tank; 3]].concat(),
                [vec![Tank; 5], vec![Fast; 8]].concat(),
            ],
        }
    }
}

impl SessionConfig {
    /// Checks that the configuration describes a playable session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns < MIN_GRID_EDGE || self.rows < MIN_GRID_EDGE {
            return Err(ConfigError::GridTooSmall {
                columns: self.columns,
                rows: self.rows,
            });
        }

        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }

        if self.spawn_interval.is_zero() {
            return Err(ConfigError::ZeroSpawnInterval);
        }

        for kind in TowerKind::ALL {
            let stats = self.towers.stats(kind);
            if !(stats.fire_rate.is_finite() && stats.fire_rate > 0.0) {
                return Err(ConfigError::InvalidFireRate {
                    kind,
                    fire_rate: stats.fire_rate,
                });
            }
            if !(stats.range.is_finite() && stats.range >= 0.0) {
                return Err(ConfigError::InvalidRange {
                    kind,
                    range: stats.range,
                });
            }
        }

        for kind in EnemyKind::ALL {
            let stats = self.enemies.stats(kind);
            if stats.health == 0 {
                return Err(ConfigError::ZeroHealth(kind));
            }
            if !(stats.speed.is_finite() && stats.speed > 0.0) {
                return Err(ConfigError::InvalidSpeed {
                    kind,
                    speed: stats.speed,
                });
            }
        }

        Ok(())
    }
}

const MIN_GRID_EDGE: u32 = 3;

/// Reasons a [`SessionConfig`] is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The grid must be at least three cells along each edge.
    #[error("grid of {columns}x{rows} cells is too small, need at least 3x3")]
    GridTooSmall {
        /// Configured column count.
        columns: u32,
        /// Configured row count.
        rows: u32,
    },
    /// Cells must have a positive, finite size.
    #[error("cell size {0} must be positive")]
    InvalidCellSize(f32),
    /// Waves cannot spawn with a zero interval.
    #[error("spawn interval must be greater than zero")]
    ZeroSpawnInterval,
    /// Towers must fire at a positive rate.
    #[error("{} tower fire rate {fire_rate} must be positive", kind.name())]
    InvalidFireRate {
        /// Offending archetype.
        kind: TowerKind,
        /// Configured fire rate.
        fire_rate: f32,
    },
    /// Towers need a finite, non-negative range.
    #[error("{} tower range {range} must be non-negative", kind.name())]
    InvalidRange {
        /// Offending archetype.
        kind: TowerKind,
        /// Configured range.
        range: f32,
    },
    /// Enemies must spawn alive.
    #[error("{} enemy health must be greater than zero", .0.name())]
    ZeroHealth(EnemyKind),
    /// Enemies must move forward.
    #[error("{} enemy speed {speed} must be positive", kind.name())]
    InvalidSpeed {
        /// Offending archetype.
        kind: EnemyKind,
        /// Configured speed.
        speed: f32,
    },
}

/// Serialises durations as fractional seconds so configuration files stay readable.
mod seconds {
    use std::time::Duration;

    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(seconds).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_is_valid() {
        assert_eq!(SessionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn default_basic_archetypes_match_reference_stats() {
        let config = SessionConfig::default();
        let tower = config.towers.stats(TowerKind::Basic);
        assert_eq!(tower.damage, 10);
        assert_eq!(tower.fire_rate, 1.0);

        let enemy = config.enemies.stats(EnemyKind::Basic);
        assert_eq!(enemy.health, 50);
        assert_eq!(enemy.reward, 10);
    }

    #[test]
    fn degenerate_grid_is_rejected() {
        let config = SessionConfig {
            columns: 2,
            ..SessionConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::GridTooSmall {
                columns: 2,
                rows: 15
            })
        );
    }

    #[test]
    fn non_positive_fire_rate_is_rejected() {
        let mut config = SessionConfig::default();
        config.towers.sniper.fire_rate = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFireRate {
                kind: TowerKind::Sniper,
                ..
            })
        ));
    }

    #[test]
    fn zero_health_enemy_is_rejected() {
        let mut config = SessionConfig::default();
        config.enemies.fast.health = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroHealth(EnemyKind::Fast))
        );
    }

    #[test]
    fn configuration_round_trips_through_bincode() {
        let config = SessionConfig::default();
        let bytes = bincode::serialize(&config).expect("serialize");
        let restored: SessionConfig = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, config);
    }
}
