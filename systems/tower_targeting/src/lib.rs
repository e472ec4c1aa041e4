#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that selects the nearest in-range enemy for each ready tower.

use path_defence_core::{EnemyId, EnemyView, TowerId, TowerTarget, WorldPoint};

/// Tower whose cooldown elapsed and that may fire this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReadyTower {
    /// Identifier of the tower.
    pub id: TowerId,
    /// Center of the tower in world units.
    pub position: WorldPoint,
    /// Targeting radius in world units.
    pub range: f32,
}

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes a target for every ready tower that has an enemy in range.
    ///
    /// The nearest enemy wins; enemies at equal distance resolve to the one
    /// spawned first. Range is inclusive. The output buffer is cleared before
    /// populating it, and towers without a candidate produce no entry.
    pub fn handle(
        &mut self,
        towers: &[ReadyTower],
        enemies: &EnemyView,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();

        if towers.is_empty() || enemies.is_empty() {
            return;
        }

        self.prepare_enemy_workspace(enemies);

        for tower in towers {
            let max_distance = tower.range * tower.range;
            let mut best: Option<BestCandidate> = None;

            for candidate in &self.enemy_workspace {
                let distance_sq = tower.position.distance_squared(candidate.position);
                if distance_sq > max_distance {
                    continue;
                }

                let current = BestCandidate {
                    distance_sq,
                    enemy: candidate.id,
                };

                match &mut best {
                    Some(existing) => {
                        if current.precedes(existing) {
                            *existing = current;
                        }
                    }
                    None => best = Some(current),
                }
            }

            if let Some(best_candidate) = best {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy: best_candidate.enemy,
                });
            }
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        self.enemy_workspace.reserve(enemies.len());

        for snapshot in enemies.iter() {
            self.enemy_workspace.push(EnemyCandidate {
                id: snapshot.id,
                position: snapshot.position,
            });
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: WorldPoint,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance_sq: f32,
    enemy: EnemyId,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance_sq != other.distance_sq {
            return self.distance_sq < other.distance_sq;
        }

        self.enemy < other.enemy
    }
}

#[cfg(test)]
mod tests {
    use super::{ReadyTower, TowerTargeting};
    use path_defence_core::{
        EnemyId, EnemyKind, EnemySnapshot, EnemyView, TowerId, TowerTarget, WorldPoint,
    };

    fn ready(id: u32, x: f32, y: f32, range: f32) -> ReadyTower {
        ReadyTower {
            id: TowerId::new(id),
            position: WorldPoint::new(x, y),
            range,
        }
    }

    fn enemy(id: u32, x: f32, y: f32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Basic,
            health: 50,
            max_health: 50,
            speed: 1.0,
            reward: 10,
            size: 10.0,
            path_index: 0,
            position: WorldPoint::new(x, y),
        }
    }

    fn view(snapshots: Vec<EnemySnapshot>) -> EnemyView {
        EnemyView::from_snapshots(snapshots)
    }

    #[test]
    fn nearest_enemy_in_range_is_selected() {
        let mut system = TowerTargeting::new();
        let towers = [ready(1, 100.0, 100.0, 100.0)];
        let enemies = view(vec![
            enemy(0, 180.0, 100.0),
            enemy(1, 130.0, 140.0),
            enemy(2, 60.0, 100.0),
        ]);

        let mut out = Vec::new();
        system.handle(&towers, &enemies, &mut out);

        assert_eq!(
            out,
            vec![TowerTarget {
                tower: TowerId::new(1),
                enemy: EnemyId::new(2),
            }]
        );
    }

    #[test]
    fn enemy_outside_range_is_ignored() {
        let mut system = TowerTargeting::new();
        let towers = [ready(1, 0.0, 0.0, 100.0)];
        let enemies = view(vec![enemy(3, 100.5, 0.0)]);

        let mut out = Vec::new();
        system.handle(&towers, &enemies, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn range_boundary_is_inclusive() {
        let mut system = TowerTargeting::new();
        let towers = [ready(1, 0.0, 0.0, 100.0)];
        let enemies = view(vec![enemy(3, 60.0, 80.0)]);

        let mut out = Vec::new();
        system.handle(&towers, &enemies, &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].enemy, EnemyId::new(3));
    }

    #[test]
    fn earlier_spawn_wins_when_distances_match() {
        let mut system = TowerTargeting::new();
        let towers = [ready(1, 100.0, 100.0, 200.0)];
        let enemies = view(vec![enemy(9, 150.0, 100.0), enemy(4, 50.0, 100.0)]);

        let mut out = Vec::new();
        system.handle(&towers, &enemies, &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].enemy, EnemyId::new(4));
    }

    #[test]
    fn towers_select_targets_independently() {
        let mut system = TowerTargeting::new();
        let towers = [ready(1, 0.0, 0.0, 50.0), ready(2, 400.0, 0.0, 50.0)];
        let enemies = view(vec![enemy(1, 20.0, 0.0), enemy(2, 390.0, 10.0)]);

        let mut out = Vec::new();
        system.handle(&towers, &enemies, &mut out);

        assert_eq!(
            out,
            vec![
                TowerTarget {
                    tower: TowerId::new(1),
                    enemy: EnemyId::new(1),
                },
                TowerTarget {
                    tower: TowerId::new(2),
                    enemy: EnemyId::new(2),
                },
            ]
        );
    }

    #[test]
    fn stale_output_is_cleared_when_nothing_is_targetable() {
        let mut system = TowerTargeting::new();
        let mut out = vec![TowerTarget {
            tower: TowerId::new(99),
            enemy: EnemyId::new(99),
        }];

        system.handle(&[], &view(vec![enemy(1, 0.0, 0.0)]), &mut out);
        assert!(out.is_empty());

        out.push(TowerTarget {
            tower: TowerId::new(99),
            enemy: EnemyId::new(99),
        });
        system.handle(&[ready(1, 0.0, 0.0, 10.0)], &view(Vec::new()), &mut out);
        assert!(out.is_empty());
    }
}
