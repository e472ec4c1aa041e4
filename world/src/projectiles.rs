//! Homing projectiles fired by towers.

use path_defence_core::{
    EnemyId, ProjectileSnapshot, Rgb, WorldPoint, PROJECTILE_HIT_RADIUS, PROJECTILE_SPEED,
};

use crate::{enemies::EnemyRoster, towers::TowerState};

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    position: WorldPoint,
    target: EnemyId,
    damage: u32,
    speed: f32,
    color: Rgb,
    expired: bool,
}

/// Damage landed on an enemy by a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Hit {
    pub(crate) enemy: EnemyId,
    pub(crate) damage: u32,
    pub(crate) remaining: u32,
}

impl Projectile {
    /// Launches a projectile from `tower` toward `target`.
    pub(crate) fn launch(tower: &TowerState, target: EnemyId) -> Self {
        Self {
            position: tower.position,
            target,
            damage: tower.damage,
            speed: PROJECTILE_SPEED,
            color: tower.kind.color(),
            expired: false,
        }
    }

    pub(crate) fn from_snapshot(snapshot: &ProjectileSnapshot) -> Self {
        Self {
            position: snapshot.position,
            target: snapshot.target,
            damage: snapshot.damage,
            speed: snapshot.speed,
            color: snapshot.color,
            expired: false,
        }
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            position: self.position,
            target: self.target,
            damage: self.damage,
            speed: self.speed,
            color: self.color,
        }
    }

    pub(crate) fn is_expired(&self) -> bool {
        self.expired
    }

    /// Homes in on the target and applies damage once within the hit radius.
    ///
    /// A projectile whose target is gone, escaped, or already dead expires
    /// without dealing damage.
    pub(crate) fn advance(&mut self, enemies: &mut EnemyRoster, seconds: f32) -> Option<Hit> {
        let Some(target) = enemies
            .get_mut(self.target)
            .filter(|enemy| enemy.is_live())
        else {
            self.expired = true;
            return None;
        };

        let destination = target.position;
        if self.position.distance(destination) >= PROJECTILE_HIT_RADIUS {
            self.position = self
                .position
                .step_toward(destination, self.speed * seconds);
        }

        if self.position.distance(destination) < PROJECTILE_HIT_RADIUS {
            self.expired = true;
            let remaining = target.apply_damage(self.damage);
            return Some(Hit {
                enemy: target.id,
                damage: self.damage,
                remaining,
            });
        }

        None
    }
}
