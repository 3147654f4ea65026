//! Decision фаза: Sensor → TargetResolver → CombatFsm для каждого врага.

use bevy::prelude::*;
use crate::ai::{
    CombatFsm, PresentationCue, Sensor, StrikeRequested, TargetResolver, TargetSighting, ThreatTable,
    TickInput,
};
use crate::combat::Dead;
use crate::components::{PatrolRoute, Position, Velocity};
use crate::physics::{MotorIntent, SpatialIndex};
use crate::SimClock;

/// Система: один тик решения для всех живых врагов.
///
/// Враги обходятся в порядке Entity: порядок StrikeRequested событий
/// (и значит, кто кого добил) не зависит от раскладки архетипов.
pub fn think(
    clock: Res<SimClock>,
    index: Res<SpatialIndex>,
    mut enemies: Query<
        (
            Entity,
            &Position,
            &Velocity,
            &mut Sensor,
            &mut TargetResolver,
            &mut CombatFsm,
            &mut MotorIntent,
            Option<&ThreatTable>,
            Option<&PatrolRoute>,
        ),
        Without<Dead>,
    >,
    velocities: Query<&Velocity>,
    mut strikes: EventWriter<StrikeRequested>,
    mut cues: EventWriter<PresentationCue>,
) {
    let mut order: Vec<Entity> = enemies.iter().map(|(entity, ..)| entity).collect();
    order.sort();

    for entity in order {
        let Ok((_, position, velocity, mut sensor, mut resolver, mut fsm, mut motor, threat, route)) =
            enemies.get_mut(entity)
        else {
            continue;
        };
        if fsm.is_dead() {
            continue;
        }

        sensor.update_facing(velocity.0.x, fsm.facing());
        let eye = sensor.eye(position.0);
        let resolved = resolver.resolve(&sensor, eye, threat, &*index);

        let target = resolved.map(|r| TargetSighting {
            entity: r.entity,
            position: r.position,
            velocity: velocities.get(r.entity).map(|v| v.0).unwrap_or(Vec2::ZERO),
        });

        let waypoints = route.map(|r| r.0.as_slice()).unwrap_or(&[]);
        let output = fsm.step(TickInput {
            dt: clock.delta,
            position: position.0,
            target,
            waypoints,
        });

        *motor = output.motor;

        if let Some(state) = output.entered {
            crate::log(&format!(
                "🧠 {:?} → {:?} (target: {:?}, tick {})",
                entity,
                state,
                resolved.map(|r| (r.entity, r.source)),
                clock.tick
            ));
            cues.write(PresentationCue::StateEntered { entity, state });
        }

        if output.facing_changed {
            cues.write(PresentationCue::FacingChanged {
                entity,
                facing: fsm.facing(),
            });
        }

        if output.windup_started {
            cues.write(PresentationCue::WindupStarted { entity });
        }

        if let Some(intent) = output.strike {
            cues.write(PresentationCue::Struck { entity });
            strikes.write(StrikeRequested {
                attacker: entity,
                intent,
            });
        }
    }
}
