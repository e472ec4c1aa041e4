//! Enemies walking the corridor and the roster that owns them.

use path_defence_core::{
    EnemyId, EnemyKind, EnemySnapshot, EnemyStats, EnemyView, Heading, WorldPoint,
    WAYPOINT_EPSILON,
};

/// How an enemy left play. Fated enemies stay in the roster until the
/// reconciliation step credits or charges the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Fate {
    Killed,
    Escaped,
}

#[derive(Clone, Debug)]
pub(crate) struct EnemyState {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    pub(crate) health: u32,
    pub(crate) max_health: u32,
    /// Cells per second.
    pub(crate) speed: f32,
    pub(crate) reward: u32,
    pub(crate) size: f32,
    /// Index of the last waypoint reached.
    pub(crate) path_index: usize,
    pub(crate) position: WorldPoint,
    pub(crate) fate: Option<Fate>,
}

impl EnemyState {
    fn spawn(id: EnemyId, kind: EnemyKind, stats: &EnemyStats, start: WorldPoint) -> Self {
        Self {
            id,
            kind,
            health: stats.health,
            max_health: stats.health,
            speed: stats.speed,
            reward: stats.reward,
            size: stats.size,
            path_index: 0,
            position: start,
            fate: None,
        }
    }

    /// Alive and still inside the play area.
    pub(crate) fn is_live(&self) -> bool {
        self.fate.is_none() && self.health > 0
    }

    /// Walks toward the waypoint after `path_index`.
    ///
    /// Reaching a waypoint consumes the tick without moving. Past the final
    /// waypoint the enemy keeps going along `exit`, and crossing `boundary`
    /// on the x axis marks it as escaped.
    pub(crate) fn advance(
        &mut self,
        path: &[WorldPoint],
        exit: Heading,
        cell_size: f32,
        seconds: f32,
        boundary: f32,
    ) {
        let step = self.speed * cell_size * seconds;

        match path.get(self.path_index.saturating_add(1)) {
            Some(next) => {
                if self.position.distance(*next) < WAYPOINT_EPSILON {
                    self.path_index += 1;
                } else {
                    self.position = self.position.step_toward(*next, step);
                }
            }
            None => self.position = self.position.offset(exit, step),
        }

        if self.position.x() > boundary {
            self.fate = Some(Fate::Escaped);
        }
    }

    /// Subtracts `damage` from health and returns what is left.
    pub(crate) fn apply_damage(&mut self, damage: u32) -> u32 {
        self.health = self.health.saturating_sub(damage);
        if self.health == 0 && self.fate.is_none() {
            self.fate = Some(Fate::Killed);
        }
        self.health
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            health: self.health,
            max_health: self.max_health,
            speed: self.speed,
            reward: self.reward,
            size: self.size,
            path_index: self.path_index,
            position: self.position,
        }
    }

    pub(crate) fn from_snapshot(snapshot: &EnemySnapshot) -> Self {
        Self {
            id: snapshot.id,
            kind: snapshot.kind,
            health: snapshot.health,
            max_health: snapshot.max_health,
            speed: snapshot.speed,
            reward: snapshot.reward,
            size: snapshot.size,
            path_index: snapshot.path_index,
            position: snapshot.position,
            fate: None,
        }
    }
}

/// Enemies ordered by identifier, which is also spawn order.
#[derive(Debug)]
pub(crate) struct EnemyRoster {
    enemies: Vec<EnemyState>,
    next_enemy_id: EnemyId,
}

impl EnemyRoster {
    pub(crate) fn new() -> Self {
        Self {
            enemies: Vec::new(),
            next_enemy_id: EnemyId::new(0),
        }
    }

    /// Rebuilds the roster from enemies already sorted by identifier.
    pub(crate) fn restored(enemies: Vec<EnemyState>, next_enemy_id: EnemyId) -> Self {
        Self {
            enemies,
            next_enemy_id,
        }
    }

    pub(crate) fn next_id(&self) -> EnemyId {
        self.next_enemy_id
    }

    /// Adds an enemy at `start` and returns its identifier. Identifiers are never reused.
    pub(crate) fn spawn(
        &mut self,
        kind: EnemyKind,
        stats: &EnemyStats,
        start: WorldPoint,
    ) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().saturating_add(1));
        self.enemies.push(EnemyState::spawn(id, kind, stats, start));
        id
    }

    pub(crate) fn get_mut(&mut self, id: EnemyId) -> Option<&mut EnemyState> {
        let index = self
            .enemies
            .binary_search_by_key(&id, |enemy| enemy.id)
            .ok()?;
        self.enemies.get_mut(index)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &EnemyState> {
        self.enemies.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut EnemyState> {
        self.enemies.iter_mut()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    pub(crate) fn live_count(&self) -> usize {
        self.enemies.iter().filter(|enemy| enemy.is_live()).count()
    }

    /// Snapshots of the enemies towers may still target.
    pub(crate) fn live_view(&self) -> EnemyView {
        EnemyView::from_snapshots(
            self.enemies
                .iter()
                .filter(|enemy| enemy.is_live())
                .map(EnemyState::snapshot)
                .collect(),
        )
    }

    /// Moves every killed or escaped enemy into `out`, preserving spawn order.
    pub(crate) fn drain_fated(&mut self, out: &mut Vec<EnemyState>) {
        let (fated, remaining): (Vec<_>, Vec<_>) = std::mem::take(&mut self.enemies)
            .into_iter()
            .partition(|enemy| enemy.fate.is_some());
        self.enemies = remaining;
        out.extend(fated);
    }
}
