//! Combat system module
//!
//! ECS ответственность:
//! - Game state: Health, GuardedHealth, Projectile, DashHitbox, Poisoned
//! - Combat rules: strike execution, damage multipliers, knockback
//! - Events: HitLanded → DamageDealt, EntityDied
//!
//! Хост ответственность:
//! - анимации удара/смерти (по PresentationCue)
//! - реальная физика knockback (здесь только импульс в Velocity)

use bevy::prelude::*;

pub mod damage;
pub mod effects;
pub mod projectile;
pub mod systems;

// Re-export основных типов
pub use damage::{
    DamageDealt, DamageReport, Damageable, Dead, DespawnAfter, EntityDied, GuardedHealth, Health, HitLanded,
};
pub use effects::{DashHitbox, Poisoned};
pub use projectile::{aim_point, Projectile};
pub use systems::{
    advance_dash_hitboxes, advance_projectiles, apply_hits, despawn_after_timeout, execute_strikes, mark_dead,
    tick_poison, MAX_SWEEP_VICTIMS,
};

use crate::{SimulationTick, TickSet};

/// Combat Plugin
///
/// Порядок выполнения:
/// 1. Aftermath: mark_dead, despawn_after_timeout (трупы прошлого тика)
/// 2. Combat: execute_strikes → advance_dash_hitboxes → advance_projectiles
///    → tick_poison → apply_hits::<T>
///
/// Урон от окружения/хоста: достаточно записать `HitLanded` до Combat фазы.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<HitLanded>()
            .add_event::<DamageDealt>()
            .add_event::<EntityDied>();

        app.add_systems(
            SimulationTick,
            (mark_dead, despawn_after_timeout)
                .chain()
                .in_set(TickSet::Aftermath),
        )
        .add_systems(
            SimulationTick,
            (
                execute_strikes,
                advance_dash_hitboxes,
                advance_projectiles,
                tick_poison,
                apply_hits::<Health>,
                apply_hits::<GuardedHealth>,
            )
                .chain() // Последовательное выполнение
                .in_set(TickSet::Combat),
        );
    }
}
