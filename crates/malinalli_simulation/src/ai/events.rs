//! AI Events: вход от хоста (taunt) и выход к хосту (удары, presentation cues)
//!
//! AI не трогает анимации напрямую: хост читает `PresentationCue` и сам
//! дёргает триггеры аниматора / flip спрайта.

use bevy::prelude::*;
use crate::ai::{CombatState, StrikeIntent};
use crate::components::Facing;

/// Taunt от компаньона: все враги в радиусе переключаются на `source`
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct TauntRequested {
    pub source: Entity,
    pub center: Vec2,
    pub radius: f32,
    /// Секунды (обрезается до `max_taunt_duration` каждой таблицы)
    pub duration: f32,
    pub threat_boost: f32,
}

/// FSM решил ударить (Decision → Combat)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct StrikeRequested {
    pub attacker: Entity,
    pub intent: StrikeIntent,
}

/// Fire-and-forget хуки для презентации
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum PresentationCue {
    StateEntered {
        entity: Entity,
        state: CombatState,
    },
    FacingChanged {
        entity: Entity,
        facing: Facing,
    },
    /// Замах начался (триггер анимации windup)
    WindupStarted { entity: Entity },
    /// Удар нанесён (триггер анимации attack)
    Struck { entity: Entity },
    Died { entity: Entity },
}

impl PresentationCue {
    pub fn entity(&self) -> Entity {
        match *self {
            PresentationCue::StateEntered { entity, .. }
            | PresentationCue::FacingChanged { entity, .. }
            | PresentationCue::WindupStarted { entity }
            | PresentationCue::Struck { entity }
            | PresentationCue::Died { entity } => entity,
        }
    }
}
