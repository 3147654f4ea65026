use bevy::prelude::*;
use crate::ai::TargetResolver;
use crate::components::Velocity;
use crate::physics::MotorIntent;

/// Враг под управлением AI. Имя архетипа: для логов.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(Velocity, MotorIntent, TargetResolver)]
pub struct Enemy {
    pub archetype: String,
}

/// Воин (управляется игроком на стороне хоста)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Velocity)]
pub struct Warrior;

/// Компаньон-черепаха: guard, charge, taunt
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Velocity)]
pub struct Companion;
