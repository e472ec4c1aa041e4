#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Path Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then reports [`Event`] values describing what
//! happened. Rendering collaborators read the snapshot types defined here and
//! never touch world internals.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod config;

pub use config::{
    ConfigError, EnemyArchetypes, EnemyStats, SessionConfig, TowerArchetypes, TowerStats,
};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Path Defence.";

/// Distance in world units below which an enemy counts as having reached a waypoint.
pub const WAYPOINT_EPSILON: f32 = 1.0;

/// Speed of every projectile measured in world units per second.
pub const PROJECTILE_SPEED: f32 = 300.0;

/// Distance in world units at which a projectile strikes its target.
pub const PROJECTILE_HIT_RADIUS: f32 = 5.0;

/// Range bonus, in world units, granted by every tower upgrade.
pub const UPGRADE_RANGE_BONUS: f32 = 10.0;

/// Multiplier applied to a tower's damage on every upgrade (result is floored).
pub const UPGRADE_DAMAGE_FACTOR: f32 = 1.5;

/// Multiplier applied to a tower's fire rate on every upgrade.
pub const UPGRADE_FIRE_RATE_FACTOR: f32 = 1.1;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Requests placement of a tower centred on the provided cell.
    PlaceTower {
        /// Archetype of the tower to construct.
        kind: TowerKind,
        /// Grid cell the tower should occupy.
        cell: CellCoord,
    },
    /// Requests an upgrade of an existing tower.
    UpgradeTower {
        /// Tower, cell or world position identifying the tower to upgrade.
        target: UpgradeTarget,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Ways an upgrade request may identify its tower.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum UpgradeTarget {
    /// The tower with this identifier.
    Tower(TowerId),
    /// The tower occupying this grid cell.
    Cell(CellCoord),
    /// The tower whose cell contains this world-space position.
    Point(WorldPoint),
}

impl fmt::Display for UpgradeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tower(tower) => write!(f, "tower #{}", tower.get()),
            Self::Cell(cell) => write!(f, "cell ({}, {})", cell.column(), cell.row()),
            Self::Point(point) => write!(f, "point ({:.1}, {:.1})", point.x(), point.y()),
        }
    }
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a wave began spawning enemies.
    WaveStarted {
        /// One-based number of the wave.
        wave: u32,
    },
    /// Announces that a wave finished spawning and every enemy left the field.
    WaveCleared {
        /// One-based number of the wave.
        wave: u32,
    },
    /// Announces that the final wave was cleared and no more enemies will spawn.
    AllWavesCleared,
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Archetype of the enemy.
        kind: EnemyKind,
    },
    /// Confirms that a tower launched a projectile.
    ProjectileFired {
        /// Tower that fired.
        tower: TowerId,
        /// Enemy the projectile is homing on.
        target: EnemyId,
        /// Damage carried by the projectile.
        damage: u32,
    },
    /// Confirms that a projectile struck its target.
    EnemyHit {
        /// Enemy that was struck.
        enemy: EnemyId,
        /// Damage applied by the hit.
        damage: u32,
        /// Health left after the hit.
        remaining: u32,
    },
    /// Confirms that an enemy was destroyed by tower fire.
    EnemyKilled {
        /// Enemy that was destroyed.
        enemy: EnemyId,
        /// Archetype of the destroyed enemy.
        kind: EnemyKind,
        /// Money and score awarded for the kill.
        reward: u32,
    },
    /// Confirms that an enemy left the play area through the path's end.
    EnemyEscaped {
        /// Enemy that escaped.
        enemy: EnemyId,
        /// Archetype of the escaped enemy.
        kind: EnemyKind,
        /// Lives remaining after the escape.
        lives_remaining: u32,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Archetype of the tower.
        kind: TowerKind,
        /// Cell occupied by the tower.
        cell: CellCoord,
        /// Money spent on the placement.
        cost: u32,
    },
    /// Confirms that a tower was upgraded.
    TowerUpgraded {
        /// Tower that was upgraded.
        tower: TowerId,
        /// Level reached by the upgrade.
        level: u32,
        /// Money spent on the upgrade.
        cost: u32,
    },
    /// Announces that the player ran out of lives.
    GameOver {
        /// Final score.
        score: u32,
    },
    /// Announces that every wave was defeated.
    GameWon {
        /// Final score.
        score: u32,
    },
}

/// RGB color used to tint towers and their projectiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    red: u8,
    green: u8,
    blue: u8,
}

impl Rgb {
    /// Creates a new color from byte RGB components.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an enemy.
///
/// Identifiers increase monotonically over a session and are never reused, so
/// a projectile holding the id of a removed enemy can never resolve to a
/// different, later enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Continuous position expressed in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    x: f32,
    y: f32,
}

impl WorldPoint {
    /// Creates a new point from its coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate, growing downwards.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Squared Euclidean distance to `other`.
    #[must_use]
    pub fn distance_squared(self, other: WorldPoint) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: WorldPoint) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Moves toward `destination` by at most `step` units without overshooting.
    ///
    /// A zero distance returns the destination unchanged instead of
    /// normalising a zero-length vector.
    #[must_use]
    pub fn step_toward(self, destination: WorldPoint, step: f32) -> WorldPoint {
        let distance = self.distance(destination);
        if distance <= step || distance == 0.0 {
            return destination;
        }

        let scale = step / distance;
        WorldPoint::new(
            self.x + (destination.x - self.x) * scale,
            self.y + (destination.y - self.y) * scale,
        )
    }

    /// Translates the point along `heading` scaled by `length`.
    #[must_use]
    pub fn offset(self, heading: Heading, length: f32) -> WorldPoint {
        WorldPoint::new(self.x + heading.dx * length, self.y + heading.dy * length)
    }
}

/// Unit-length direction of travel in world space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    dx: f32,
    dy: f32,
}

impl Heading {
    /// Heading pointing toward increasing x.
    pub const EAST: Heading = Heading { dx: 1.0, dy: 0.0 };

    /// Normalised heading from `from` toward `to`, or `None` when they coincide.
    #[must_use]
    pub fn between(from: WorldPoint, to: WorldPoint) -> Option<Self> {
        let distance = from.distance(to);
        if distance == 0.0 {
            return None;
        }

        Some(Self {
            dx: (to.x() - from.x()) / distance,
            dy: (to.y() - from.y()) / distance,
        })
    }

    /// Horizontal component.
    #[must_use]
    pub const fn dx(&self) -> f32 {
        self.dx
    }

    /// Vertical component.
    #[must_use]
    pub const fn dy(&self) -> f32 {
        self.dy
    }
}

/// Archetypes of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// Cheap all-rounder.
    Basic,
    /// Long range, heavy hits, slow fire.
    Sniper,
    /// Short range medium hitter. Deals single-target damage.
    Splash,
}

impl TowerKind {
    /// Every tower archetype in declaration order.
    pub const ALL: [TowerKind; 3] = [Self::Basic, Self::Sniper, Self::Splash];

    /// Lowercase name used in configuration files and the CLI.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Sniper => "sniper",
            Self::Splash => "splash",
        }
    }

    /// Color applied to the tower and its projectiles.
    #[must_use]
    pub const fn color(self) -> Rgb {
        match self {
            Self::Basic => Rgb::new(0x4c, 0xaf, 0x50),
            Self::Sniper => Rgb::new(0x21, 0x96, 0xf3),
            Self::Splash => Rgb::new(0xff, 0x98, 0x00),
        }
    }
}

impl FromStr for TowerKind {
    type Err = UnknownArchetype;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownArchetype(value.to_owned()))
    }
}

/// Archetypes of enemies that waves are composed of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Baseline enemy.
    Basic,
    /// Fragile but quick.
    Fast,
    /// Slow with a large health pool.
    Tank,
}

impl EnemyKind {
    /// Every enemy archetype in declaration order.
    pub const ALL: [EnemyKind; 3] = [Self::Basic, Self::Fast, Self::Tank];

    /// Lowercase name used in configuration files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Fast => "fast",
            Self::Tank => "tank",
        }
    }
}

impl FromStr for EnemyKind {
    type Err = UnknownArchetype;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownArchetype(value.to_owned()))
    }
}

/// Error returned when parsing an archetype name fails.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown archetype '{0}'")]
pub struct UnknownArchetype(pub String);

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The requested cell lies outside the grid.
    #[error("cell is outside the grid")]
    OutOfBounds,
    /// The requested cell is part of the enemy path.
    #[error("cell is not walkable")]
    Unwalkable,
    /// The requested cell already holds a tower.
    #[error("cell is already occupied")]
    Occupied,
}

/// Reasons a command may be rejected. Rejected commands never mutate state.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum CommandError {
    /// The target cell is out of bounds, on the path, or occupied.
    #[error("cannot place tower at ({}, {}): {reason}", cell.column(), cell.row())]
    InvalidPlacement {
        /// Cell named by the rejected request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// The command costs more money than is available.
    #[error("insufficient funds: {required} required, {available} available")]
    InsufficientFunds {
        /// Money the command would cost.
        required: u32,
        /// Money currently available.
        available: u32,
    },
    /// The upgrade target does not resolve to a tower.
    #[error("no tower found for {target}")]
    NoSuchTower {
        /// Target named by the rejected request.
        target: UpgradeTarget,
    },
}

/// Money, score and lives tracked for the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Economy {
    /// Money available for placements and upgrades.
    pub money: u32,
    /// Accumulated score.
    pub score: u32,
    /// Lives remaining before the game is lost.
    pub lives: u32,
}

/// Lifecycle of a session. Both terminal states freeze the simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// The simulation advances on every tick.
    #[default]
    Running,
    /// Lives ran out.
    GameOver,
    /// Every wave was defeated.
    GameWon,
}

impl GameStatus {
    /// Reports whether the session reached a terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Coarse phase of the wave scheduler for display purposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaveStage {
    /// Waiting for the inter-wave cooldown to elapse.
    Idle,
    /// Spawning or waiting for the current wave to be cleared.
    Spawning,
    /// Every wave has been cleared.
    AllComplete,
}

/// Progress through the wave schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WaveProgress {
    /// One-based number of the current (or next) wave, capped at `total_waves`.
    pub wave: u32,
    /// Number of waves in the schedule.
    pub total_waves: u32,
    /// Current scheduler phase.
    pub stage: WaveStage,
    /// Enemies of the current wave that have not spawned yet.
    pub remaining_in_wave: u32,
    /// Time left before the next wave starts while idle.
    pub cooldown_remaining: Duration,
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Archetype of the tower.
    pub kind: TowerKind,
    /// Cell occupied by the tower.
    pub cell: CellCoord,
    /// Center of the occupied cell in world units.
    pub position: WorldPoint,
    /// Damage dealt by each projectile.
    pub damage: u32,
    /// Targeting radius in world units.
    pub range: f32,
    /// Shots per second.
    pub fire_rate: f32,
    /// Upgrade level, starting at one.
    pub level: u32,
    /// Time left before the tower may fire again.
    pub fire_cooldown: Duration,
    /// Money required for the next upgrade.
    pub upgrade_cost: u32,
}

/// Read-only snapshot describing all towers placed in the world.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Archetype of the enemy.
    pub kind: EnemyKind,
    /// Health left.
    pub health: u32,
    /// Health the enemy spawned with.
    pub max_health: u32,
    /// Movement speed in cells per second.
    pub speed: f32,
    /// Money and score awarded when killed.
    pub reward: u32,
    /// Drawing radius in world units.
    pub size: f32,
    /// Index of the last waypoint reached.
    pub path_index: usize,
    /// Current position in world units.
    pub position: WorldPoint,
}

/// Read-only snapshot describing the live enemies, ordered by spawn.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view contains no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    /// Current position in world units.
    pub position: WorldPoint,
    /// Enemy the projectile is homing on.
    pub target: EnemyId,
    /// Damage applied on impact.
    pub damage: u32,
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Tint inherited from the firing tower.
    pub color: Rgb,
}

/// Target assignment produced by the targeting system for a ready tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerTarget {
    /// Tower that should fire.
    pub tower: TowerId,
    /// Enemy selected as the target.
    pub enemy: EnemyId,
}

#[cfg(test)]
mod tests {
    use super::{
        CellCoord, CommandError, EnemyId, EnemyKind, Heading, PlacementError, TowerId, TowerKind,
        UpgradeTarget, WorldPoint,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn identifiers_round_trip_through_bincode() {
        assert_round_trip(&TowerId::new(42));
        assert_round_trip(&EnemyId::new(7));
    }

    #[test]
    fn placement_error_round_trips_through_bincode() {
        assert_round_trip(&PlacementError::Occupied);
    }

    #[test]
    fn upgrade_target_round_trips_through_bincode() {
        assert_round_trip(&UpgradeTarget::Point(WorldPoint::new(12.5, 80.0)));
    }

    #[test]
    fn archetype_names_parse_case_insensitively() {
        assert_eq!("Sniper".parse::<TowerKind>(), Ok(TowerKind::Sniper));
        assert_eq!(" tank ".parse::<EnemyKind>(), Ok(EnemyKind::Tank));
        assert!("cannon".parse::<TowerKind>().is_err());
    }

    #[test]
    fn step_toward_never_overshoots() {
        let start = WorldPoint::new(0.0, 0.0);
        let destination = WorldPoint::new(3.0, 4.0);

        let partial = start.step_toward(destination, 2.5);
        assert!((partial.x() - 1.5).abs() < 1e-5);
        assert!((partial.y() - 2.0).abs() < 1e-5);

        assert_eq!(start.step_toward(destination, 50.0), destination);
        assert_eq!(destination.step_toward(destination, 1.0), destination);
    }

    #[test]
    fn heading_between_coincident_points_is_none() {
        let point = WorldPoint::new(5.0, 5.0);
        assert!(Heading::between(point, point).is_none());

        let heading = Heading::between(point, WorldPoint::new(5.0, 9.0)).expect("heading");
        assert_eq!(heading.dx(), 0.0);
        assert_eq!(heading.dy(), 1.0);
    }

    #[test]
    fn command_errors_describe_the_failure() {
        let error = CommandError::InvalidPlacement {
            cell: CellCoord::new(3, 4),
            reason: PlacementError::Unwalkable,
        };
        assert_eq!(
            error.to_string(),
            "cannot place tower at (3, 4): cell is not walkable"
        );

        let error = CommandError::NoSuchTower {
            target: UpgradeTarget::Tower(TowerId::new(9)),
        };
        assert_eq!(error.to_string(), "no tower found for tower #9");
    }
}
