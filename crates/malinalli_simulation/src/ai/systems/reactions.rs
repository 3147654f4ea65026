//! AI reaction systems (death: своя и чужая).

use bevy::prelude::*;
use crate::ai::{CombatFsm, PresentationCue, TargetResolver, ThreatTable};
use crate::combat::EntityDied;
use crate::components::Velocity;
use crate::physics::MotorIntent;

/// System: смерть врага → FSM в Dead, движение стоп
///
/// Dead терминален: после этого `think` врага больше не трогает.
pub fn enter_dead_state(
    mut death_events: EventReader<EntityDied>,
    mut actors: Query<(&mut CombatFsm, Option<&mut MotorIntent>, Option<&mut Velocity>)>,
    mut cues: EventWriter<PresentationCue>,
) {
    for event in death_events.read() {
        let Ok((mut fsm, motor, velocity)) = actors.get_mut(event.entity) else {
            continue;
        };

        if !fsm.kill() {
            continue;
        }
        if let Some(mut motor) = motor {
            *motor = MotorIntent::Stop;
        }
        if let Some(mut velocity) = velocity {
            velocity.0 = Vec2::ZERO;
        }

        cues.write(PresentationCue::Died { entity: event.entity });
        crate::log_info(&format!("💀 {:?} died (killer: {:?}) → AI disabled", event.entity, event.killer));
    }
}

/// System: убитая entity исчезает из всех threat таблиц и резолверов
///
/// Без этого резолвер держал бы висячую ссылку до деспавна трупа.
pub fn forget_fallen_targets(
    mut death_events: EventReader<EntityDied>,
    mut tables: Query<&mut ThreatTable>,
    mut resolvers: Query<&mut TargetResolver>,
) {
    for event in death_events.read() {
        for mut table in tables.iter_mut() {
            table.clear_target(event.entity);
        }
        for mut resolver in resolvers.iter_mut() {
            resolver.forget(event.entity);
        }
    }
}
