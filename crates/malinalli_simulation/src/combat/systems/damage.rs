//! Damage application and death systems.

use bevy::prelude::*;
use bevy::ecs::component::Mutable;
use crate::combat::{Damageable, DamageDealt, Dead, DespawnAfter, EntityDied, HitLanded};
use crate::components::Velocity;
use crate::{SimClock, SimulationSettings};

/// Система: HitLanded → Damageable::take_damage (generic по виду здоровья)
///
/// Регистрируется отдельно для `Health` и `GuardedHealth`; каждый инстанс
/// читает все HitLanded и пропускает жертв без своего компонента.
/// Уже мёртвые (в том числе убитые ранее в этом же тике) урон не получают.
pub fn apply_hits<T>(
    mut hits: EventReader<HitLanded>,
    mut victims: Query<(&mut T, Option<&mut Velocity>), Without<Dead>>,
    mut damage_dealt_events: EventWriter<DamageDealt>,
    mut entity_died_events: EventWriter<EntityDied>,
) where
    T: Damageable + Component<Mutability = Mutable>,
{
    for hit in hits.read() {
        let Ok((mut health, velocity)) = victims.get_mut(hit.victim) else {
            continue;
        };
        if !health.is_alive() {
            continue;
        }

        let report = health.take_damage(hit.amount, hit.point, hit.direction);

        if report.knockback != Vec2::ZERO {
            if let Some(mut velocity) = velocity {
                velocity.0 += report.knockback;
            }
        }

        damage_dealt_events.write(DamageDealt {
            attacker: hit.attacker,
            target: hit.victim,
            damage: report.applied,
            target_died: report.killed,
        });

        crate::log(&format!(
            "💥 {:?} took {} damage from {:?} (hp {}/{})",
            hit.victim,
            report.applied,
            hit.attacker,
            health.current(),
            health.max()
        ));

        if report.killed {
            entity_died_events.write(EntityDied {
                entity: hit.victim,
                killer: hit.attacker,
            });
            crate::log_info(&format!("☠️ Entity {:?} killed by {:?}", hit.victim, hit.attacker));
        }
    }
}

/// Система: EntityDied → маркер Dead + отложенный деспавн трупа
pub fn mark_dead(
    mut commands: Commands,
    mut death_events: EventReader<EntityDied>,
    clock: Res<SimClock>,
    settings: Res<SimulationSettings>,
) {
    for event in death_events.read() {
        if let Ok(mut entity_commands) = commands.get_entity(event.entity) {
            entity_commands.insert((
                Dead,
                DespawnAfter {
                    despawn_time: clock.elapsed + settings.corpse_linger,
                },
            ));
        }
    }
}

/// Система: деспавн трупов по таймеру
pub fn despawn_after_timeout(
    mut commands: Commands,
    clock: Res<SimClock>,
    query: Query<(Entity, &DespawnAfter)>,
) {
    for (entity, despawn_after) in query.iter() {
        if clock.elapsed >= despawn_after.despawn_time {
            crate::log(&format!("⚰️ Despawning entity {:?} (timeout)", entity));
            commands.entity(entity).despawn();
        }
    }
}
