//! Яд: периодический урон от отравленных снарядов.

use bevy::prelude::*;
use crate::combat::{Dead, HitLanded, Poisoned};
use crate::components::Position;
use crate::SimClock;

/// Система: тик яда → HitLanded без направления
///
/// Когда тики кончились, компонент снимается. На трупах яд не тикает.
pub fn tick_poison(
    mut commands: Commands,
    clock: Res<SimClock>,
    mut poisoned: Query<(Entity, &mut Poisoned, Option<&Position>), Without<Dead>>,
    mut hits: EventWriter<HitLanded>,
) {
    let mut sorted: Vec<Entity> = poisoned.iter().map(|(entity, ..)| entity).collect();
    sorted.sort();

    for entity in sorted {
        let Ok((_, mut poison, position)) = poisoned.get_mut(entity) else {
            continue;
        };

        poison.timer -= clock.delta;
        if poison.timer > 0.0 {
            continue;
        }

        if poison.ticks_left > 0 {
            poison.ticks_left -= 1;
            poison.timer += poison.interval;
            hits.write(HitLanded {
                attacker: Some(poison.source),
                victim: entity,
                amount: poison.damage,
                point: position.map(|p| p.0).unwrap_or(Vec2::ZERO),
                direction: Vec2::ZERO,
            });
            crate::log(&format!(
                "☠ {:?} takes {} poison damage ({} ticks left)",
                entity, poison.damage, poison.ticks_left
            ));
        }

        if poison.ticks_left == 0 {
            commands.entity(entity).remove::<Poisoned>();
        }
    }
}
