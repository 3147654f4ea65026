//! Сборка акторов: один `EnemyConfig` → полный набор AI модулей.

use bevy::prelude::*;
use crate::actor::{Companion, Enemy, Warrior};
use crate::ai::{CombatFsm, FsmConfig, Sensor, ThreatTable};
use crate::combat::{GuardedHealth, Health};
use crate::components::{CollisionLayer, LayerMask, PatrolRoute, Position};
use crate::config::{ConfigError, EnemyConfig};

/// Default HP воина
pub const WARRIOR_MAX_HEALTH: u32 = 100;
/// Default HP черепахи (больше, чем у воина)
pub const COMPANION_MAX_HEALTH: u32 = 160;

/// Bundle врага (конфиг не валидируется: см. `spawn_enemy`)
pub fn enemy_bundle(config: &EnemyConfig, position: Vec2, route: Vec<Vec2>) -> impl Bundle {
    (
        Enemy {
            archetype: config.name.clone(),
        },
        Position(position),
        CollisionLayer(LayerMask::ENEMY),
        Health::new(config.max_health),
        Sensor::new(config.sensor.clone()),
        ThreatTable::new(config.threat.clone()),
        CombatFsm::new(FsmConfig::from_enemy(config)),
        PatrolRoute(route),
    )
}

pub fn warrior_bundle(position: Vec2) -> impl Bundle {
    (
        Warrior,
        Position(position),
        CollisionLayer(LayerMask::WARRIOR),
        Health::new(WARRIOR_MAX_HEALTH),
    )
}

pub fn companion_bundle(position: Vec2) -> impl Bundle {
    (
        Companion,
        Position(position),
        CollisionLayer(LayerMask::COMPANION),
        GuardedHealth::new(COMPANION_MAX_HEALTH),
    )
}

/// Спавн врага с валидацией конфига
pub fn spawn_enemy(
    world: &mut World,
    config: &EnemyConfig,
    position: Vec2,
    route: Vec<Vec2>,
) -> Result<Entity, ConfigError> {
    config.validate()?;

    let entity = world.spawn(enemy_bundle(config, position, route)).id();
    crate::log(&format!(
        "👾 Spawned enemy {:?} ({}) at {:?}",
        entity, config.name, position
    ));

    Ok(entity)
}
