//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use path_defence_core::{
    CellCoord, TowerId, TowerKind, TowerSnapshot, TowerStats, WorldPoint, UPGRADE_DAMAGE_FACTOR,
    UPGRADE_FIRE_RATE_FACTOR, UPGRADE_RANGE_BONUS,
};

/// Snapshot of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Kind of tower that was constructed.
    pub(crate) kind: TowerKind,
    /// Cell occupied by the tower.
    pub(crate) cell: CellCoord,
    /// Center of the occupied cell.
    pub(crate) position: WorldPoint,
    pub(crate) damage: u32,
    pub(crate) range: f32,
    pub(crate) fire_rate: f32,
    pub(crate) level: u32,
    /// Time left before the tower may fire again.
    pub(crate) fire_cooldown: Duration,
    pub(crate) upgrade_cost: u32,
}

impl TowerState {
    /// Builds a level-one tower that is ready to fire immediately.
    pub(crate) fn new(
        id: TowerId,
        kind: TowerKind,
        cell: CellCoord,
        position: WorldPoint,
        stats: &TowerStats,
    ) -> Self {
        Self {
            id,
            kind,
            cell,
            position,
            damage: stats.damage,
            range: stats.range,
            fire_rate: stats.fire_rate,
            level: 1,
            fire_cooldown: Duration::ZERO,
            upgrade_cost: upgrade_cost_for(1),
        }
    }

    /// Counts the cooldown down by `dt` and reports whether the tower may fire.
    pub(crate) fn cool_down(&mut self, dt: Duration) -> bool {
        self.fire_cooldown = self.fire_cooldown.saturating_sub(dt);
        self.fire_cooldown.is_zero()
    }

    /// Restarts the cooldown after firing.
    pub(crate) fn rearm(&mut self) {
        self.fire_cooldown = reload_time(self.fire_rate);
    }

    /// Raises the tower one level and returns the new level.
    pub(crate) fn upgrade(&mut self) -> u32 {
        self.level = self.level.saturating_add(1);
        self.damage = (self.damage as f32 * UPGRADE_DAMAGE_FACTOR).floor() as u32;
        self.range += UPGRADE_RANGE_BONUS;
        self.fire_rate *= UPGRADE_FIRE_RATE_FACTOR;
        self.upgrade_cost = upgrade_cost_for(self.level);
        self.level
    }

    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            position: self.position,
            damage: self.damage,
            range: self.range,
            fire_rate: self.fire_rate,
            level: self.level,
            fire_cooldown: self.fire_cooldown,
            upgrade_cost: self.upgrade_cost,
        }
    }

    pub(crate) fn from_snapshot(snapshot: &TowerSnapshot) -> Self {
        Self {
            id: snapshot.id,
            kind: snapshot.kind,
            cell: snapshot.cell,
            position: snapshot.position,
            damage: snapshot.damage,
            range: snapshot.range,
            fire_rate: snapshot.fire_rate,
            level: snapshot.level,
            fire_cooldown: snapshot.fire_cooldown,
            upgrade_cost: snapshot.upgrade_cost,
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Rebuilds a registry from restored towers and a saved identifier counter.
    pub(crate) fn restored(towers: Vec<TowerState>, next_tower_id: TowerId) -> Self {
        Self {
            entries: towers.into_iter().map(|tower| (tower.id, tower)).collect(),
            next_tower_id,
        }
    }

    /// Identifier the next inserted tower will receive.
    pub(crate) fn next_id(&self) -> TowerId {
        self.next_tower_id
    }

    /// Stores a new tower and returns its freshly allocated identifier.
    pub(crate) fn insert(
        &mut self,
        kind: TowerKind,
        cell: CellCoord,
        position: WorldPoint,
        stats: &TowerStats,
    ) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let _ = self
            .entries
            .insert(id, TowerState::new(id, kind, cell, position, stats));
        id
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&TowerState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    /// Towers in identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TowerState> {
        self.entries.values_mut()
    }
}

/// Money required to raise a tower from `level` to the next one.
pub(crate) fn upgrade_cost_for(level: u32) -> u32 {
    level.saturating_mul(25).saturating_add(50)
}

fn reload_time(fire_rate: f32) -> Duration {
    Duration::try_from_secs_f32(1.0 / fire_rate).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic_stats() -> TowerStats {
        TowerStats {
            cost: 50,
            damage: 10,
            range: 100.0,
            fire_rate: 1.0,
        }
    }

    fn basic_tower() -> TowerState {
        TowerState::new(
            TowerId::new(0),
            TowerKind::Basic,
            CellCoord::new(1, 1),
            WorldPoint::new(60.0, 60.0),
            &basic_stats(),
        )
    }

    #[test]
    fn registry_starts_empty_with_zero_identifier() {
        let registry = TowerRegistry::new();
        assert!(registry.entries.is_empty());
        assert_eq!(registry.next_id().get(), 0);
    }

    #[test]
    fn identifiers_are_allocated_sequentially() {
        let mut registry = TowerRegistry::new();
        let stats = basic_stats();
        let first = registry.insert(
            TowerKind::Basic,
            CellCoord::new(0, 0),
            WorldPoint::new(20.0, 20.0),
            &stats,
        );
        let second = registry.insert(
            TowerKind::Sniper,
            CellCoord::new(1, 0),
            WorldPoint::new(60.0, 20.0),
            &stats,
        );

        assert_eq!(first, TowerId::new(0));
        assert_eq!(second, TowerId::new(1));
        assert_eq!(registry.next_id(), TowerId::new(2));
        assert_eq!(registry.get(second).map(|tower| tower.kind), Some(TowerKind::Sniper));
    }

    #[test]
    fn upgrade_cost_grows_by_twenty_five_per_level() {
        assert_eq!(upgrade_cost_for(1), 75);
        assert_eq!(upgrade_cost_for(2), 100);
        assert_eq!(upgrade_cost_for(3), 125);
    }

    #[test]
    fn upgrades_scale_combat_statistics() {
        let mut tower = basic_tower();

        assert_eq!(tower.upgrade(), 2);
        assert_eq!(tower.damage, 15);
        assert_eq!(tower.range, 110.0);
        assert!((tower.fire_rate - 1.1).abs() < 1e-6);
        assert_eq!(tower.upgrade_cost, 100);

        assert_eq!(tower.upgrade(), 3);
        assert_eq!(tower.damage, 22);
        assert_eq!(tower.range, 120.0);
        assert_eq!(tower.upgrade_cost, 125);
    }

    #[test]
    fn new_tower_is_ready_and_rearms_to_its_reload_time() {
        let mut tower = basic_tower();
        assert!(tower.cool_down(Duration::from_millis(16)));

        tower.rearm();
        assert_eq!(tower.fire_cooldown, Duration::from_secs(1));
        assert!(!tower.cool_down(Duration::from_millis(999)));
        assert!(tower.cool_down(Duration::from_millis(1)));
    }
}
