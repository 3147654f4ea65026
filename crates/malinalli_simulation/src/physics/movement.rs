//! Movement actuator: MotorIntent → Velocity, интеграция позиций.
//!
//! AI выдаёт только намерения (velocity intents). В движке их применяет
//! rigidbody; в headless режиме: `integrate_motion`.

use bevy::prelude::*;
use crate::components::{Position, Velocity};
use crate::ai::CombatFsm;
use crate::combat::Projectile;
use crate::{SimClock, SimulationSettings};

/// Намерение движения от FSM (пишется каждый тик в Decision фазе)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub enum MotorIntent {
    /// Нет намерения: velocity не трогаем
    #[default]
    Idle,
    /// Горизонтальная скорость, вертикальная сохраняется (наземные враги)
    Horizontal(f32),
    /// Полная скорость в плоскости (плавающие враги)
    Planar(Vec2),
    /// Разовый импульс (единичная масса): прибавляется к скорости
    Impulse(Vec2),
    /// Полная остановка (смерть)
    Stop,
}

/// Система: применить MotorIntent к Velocity
pub fn apply_motor_intents(mut bodies: Query<(&MotorIntent, &mut Velocity)>) {
    for (intent, mut velocity) in bodies.iter_mut() {
        match *intent {
            MotorIntent::Idle => {}
            MotorIntent::Horizontal(vx) => velocity.0.x = vx,
            MotorIntent::Planar(v) => velocity.0 = v,
            MotorIntent::Impulse(impulse) => velocity.0 += impulse,
            MotorIntent::Stop => velocity.0 = Vec2::ZERO,
        }
    }
}

/// Система: явный Эйлер для headless симуляции.
///
/// Тела без FSM (игроки, отброшенные knockback'ом) тормозятся `body_drag`,
/// иначе импульс жил бы вечно. Снаряды летят без сопротивления.
pub fn integrate_motion(
    clock: Res<SimClock>,
    settings: Res<SimulationSettings>,
    mut bodies: Query<(&mut Position, &mut Velocity, Has<CombatFsm>, Has<Projectile>)>,
) {
    let dt = clock.delta;
    let drag = (1.0 - settings.body_drag * dt).clamp(0.0, 1.0);

    for (mut position, mut velocity, driven, projectile) in bodies.iter_mut() {
        position.0 += velocity.0 * dt;
        if !driven && !projectile {
            velocity.0 *= drag;
        }
    }
}
