//! Полёт снарядов: попадание, стена, истечение lifetime.

use bevy::prelude::*;
use crate::combat::{HitLanded, Poisoned, Projectile};
use crate::components::{Position, Velocity};
use crate::physics::{SpatialIndex, WorldQuery};
use crate::SimClock;

/// Система: проверка снарядов перед интеграцией движения.
///
/// 1. Жертва в радиусе → HitLanded (+ яд), снаряд исчезает
/// 2. Lifetime истёк → исчезает
/// 3. Следующий шаг упирается в препятствие → исчезает
pub fn advance_projectiles(
    mut commands: Commands,
    clock: Res<SimClock>,
    index: Res<SpatialIndex>,
    mut projectiles: Query<(Entity, &mut Projectile, &Position, &Velocity)>,
    mut hits: EventWriter<HitLanded>,
) {
    let mut sorted: Vec<Entity> = projectiles.iter().map(|(entity, ..)| entity).collect();
    sorted.sort();

    for entity in sorted {
        let Ok((_, mut projectile, position, velocity)) = projectiles.get_mut(entity) else {
            continue;
        };

        let victim = index
            .overlap_circle(position.0, projectile.radius, projectile.victims, 2)
            .into_iter()
            .find(|c| c.entity != projectile.owner);

        if let Some(victim) = victim {
            hits.write(HitLanded {
                attacker: Some(projectile.owner),
                victim: victim.entity,
                amount: projectile.damage,
                point: position.0,
                direction: velocity.0.normalize_or_zero(),
            });
            crate::log(&format!(
                "🎯 Projectile {:?} from {:?} hits {:?} for {}",
                entity, projectile.owner, victim.entity, projectile.damage
            ));
            if let Some(poison) = projectile.poison {
                if let Ok(mut victim_commands) = commands.get_entity(victim.entity) {
                    victim_commands.insert(Poisoned::new(projectile.owner, poison));
                }
            }
            commands.entity(entity).despawn();
            continue;
        }

        projectile.remaining_life -= clock.delta;
        if projectile.remaining_life <= 0.0 {
            commands.entity(entity).despawn();
            continue;
        }

        let next = position.0 + velocity.0 * clock.delta;
        if !index.segment_clear(position.0, next, projectile.obstacles) {
            crate::log(&format!("🧱 Projectile {:?} hit terrain", entity));
            commands.entity(entity).despawn();
        }
    }
}
