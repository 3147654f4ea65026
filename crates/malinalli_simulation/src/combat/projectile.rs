//! Снаряд стрелка (ranged attack policy).

use bevy::prelude::*;
use crate::components::{LayerMask, Position, Velocity};
use crate::config::PoisonConfig;

/// Летящий снаряд. Не имеет CollisionLayer: в SpatialIndex не попадает,
/// сенсоры его не видят.
#[derive(Component, Debug, Clone)]
#[require(Position, Velocity)]
pub struct Projectile {
    /// Кто выстрелил (для предотвращения self-hit)
    pub owner: Entity,
    pub damage: u32,
    pub radius: f32,
    /// Кого можно задеть
    pub victims: LayerMask,
    /// Обо что разбивается
    pub obstacles: LayerMask,
    /// Секунды до самоуничтожения
    pub remaining_life: f32,
    /// Отравляет жертву при попадании
    pub poison: Option<PoisonConfig>,
}

impl Projectile {
    pub fn new(owner: Entity, damage: u32, radius: f32, victims: LayerMask, lifetime: f32) -> Self {
        Self {
            owner,
            damage,
            radius,
            victims,
            obstacles: LayerMask::TERRAIN,
            remaining_life: lifetime,
            poison: None,
        }
    }

    pub fn with_poison(mut self, poison: Option<PoisonConfig>) -> Self {
        self.poison = poison;
        self
    }
}

/// Точка прицеливания: позиция цели + упреждение `velocity × lead`
pub fn aim_point(target_position: Vec2, target_velocity: Vec2, lead: f32) -> Vec2 {
    target_position + target_velocity * lead.max(0.0)
}
