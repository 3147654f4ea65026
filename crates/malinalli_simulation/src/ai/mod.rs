//! AI decision-making module
//!
//! Per-enemy композиция: Sensor (зрение) + ThreatTable (агрессия)
//! → TargetResolver (одна цель на тик) → CombatFsm (поведение).
//! Всё собирается из `EnemyConfig`, без наследования вариантов.

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod systems;

// Re-export основных типов
pub use components::*;
pub use events::{PresentationCue, StrikeRequested, TauntRequested};
pub use systems::{
    apply_taunts, enter_dead_state, forget_fallen_targets, record_damage_threat, think, tick_threat_tables,
    MAX_TAUNT_TARGETS,
};

use crate::physics::rebuild_spatial_index;
use crate::{SimulationTick, TickSet};

/// AI Plugin
///
/// Регистрирует AI системы в `SimulationTick`.
/// Порядок выполнения:
/// 1. Aftermath: enter_dead_state, forget_fallen_targets (смерти прошлого тика)
/// 2. Perception: урон → threat, taunt, затухание (после пересборки SpatialIndex)
/// 3. Decision: think (Sensor → Resolver → FSM)
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<TauntRequested>()
            .add_event::<StrikeRequested>()
            .add_event::<PresentationCue>();

        app.add_systems(
            SimulationTick,
            (enter_dead_state, forget_fallen_targets)
                .chain()
                .in_set(TickSet::Aftermath),
        )
        .add_systems(
            SimulationTick,
            (record_damage_threat, apply_taunts, tick_threat_tables)
                .chain() // Последовательное выполнение для детерминизма
                .after(rebuild_spatial_index)
                .in_set(TickSet::Perception),
        )
        .add_systems(SimulationTick, think.in_set(TickSet::Decision));
    }
}
