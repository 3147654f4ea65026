//! Исполнение ударов: melee overlap, запуск снаряда или рывок.

use bevy::prelude::*;
use crate::ai::{AttackPhase, CombatFsm, StrikeRequested};
use crate::combat::{aim_point, DashHitbox, HitLanded, Projectile};
use crate::components::{Position, Velocity};
use crate::config::AttackStyle;
use crate::physics::{SpatialIndex, WorldQuery};

/// Максимум жертв у sweep удара
pub const MAX_SWEEP_VICTIMS: usize = 8;

/// Система: StrikeRequested → HitLanded (melee) / Projectile (ranged) / DashHitbox (dash)
///
/// Melee бьёт первого найденного в радиусе от attack origin
/// (всех, если архетип делает sweep). Промах: просто ничего.
pub fn execute_strikes(
    mut commands: Commands,
    index: Res<SpatialIndex>,
    mut strikes: EventReader<StrikeRequested>,
    mut hits: EventWriter<HitLanded>,
) {
    for strike in strikes.read() {
        let intent = &strike.intent;

        match intent.style {
            AttackStyle::Melee { sweep } => {
                let limit = if sweep { MAX_SWEEP_VICTIMS } else { 1 };
                // +1: атакующий сам может попасть в маску жертв
                let victims: Vec<_> = index
                    .overlap_circle(intent.origin, intent.radius, intent.victims, limit + 1)
                    .into_iter()
                    .filter(|victim| victim.entity != strike.attacker)
                    .take(limit)
                    .collect();

                if victims.is_empty() {
                    crate::log(&format!("🌀 {:?} swung and missed", strike.attacker));
                }

                for victim in victims {
                    hits.write(HitLanded {
                        attacker: Some(strike.attacker),
                        victim: victim.entity,
                        amount: intent.damage,
                        point: victim.position,
                        direction: (victim.position - intent.origin).normalize_or(intent.direction),
                    });
                    crate::log(&format!(
                        "⚔️ {:?} hits {:?} for {} (melee)",
                        strike.attacker, victim.entity, intent.damage
                    ));
                }
            }
            AttackStyle::Ranged {
                projectile_speed,
                lead,
                lifetime,
                radius,
                poison,
            } => {
                let aim = aim_point(intent.target_position, intent.target_velocity, lead);
                let direction = (aim - intent.origin).normalize_or(intent.direction);

                commands.spawn((
                    Projectile::new(strike.attacker, intent.damage, radius, intent.victims, lifetime)
                        .with_poison(poison),
                    Position(intent.origin),
                    Velocity(direction * projectile_speed),
                ));
                crate::log(&format!(
                    "🏹 {:?} fires at {:?} (aim {:?})",
                    strike.attacker, intent.target, aim
                ));
            }
            AttackStyle::Dash { .. } => {
                if let Ok(mut attacker) = commands.get_entity(strike.attacker) {
                    attacker.insert(DashHitbox::new(intent.damage, intent.radius, intent.victims));
                    crate::log(&format!("💨 {:?} dashes at {:?}", strike.attacker, intent.target));
                }
            }
        }
    }
}

/// Система: контактный урон рывка
///
/// Хитбокс живёт ровно столько, сколько фаза `Dash` у FSM: смерть
/// или конец рывка снимают его на ближайшем тике.
pub fn advance_dash_hitboxes(
    mut commands: Commands,
    index: Res<SpatialIndex>,
    mut dashers: Query<(Entity, &Position, &CombatFsm, &mut DashHitbox)>,
    mut hits: EventWriter<HitLanded>,
) {
    let mut sorted: Vec<Entity> = dashers.iter().map(|(entity, ..)| entity).collect();
    sorted.sort();

    for entity in sorted {
        let Ok((_, position, fsm, mut hitbox)) = dashers.get_mut(entity) else {
            continue;
        };

        if !matches!(fsm.attack_phase(), AttackPhase::Dash { .. }) {
            commands.entity(entity).remove::<DashHitbox>();
            continue;
        }

        let candidates = index.overlap_circle(position.0, hitbox.radius, hitbox.victims, MAX_SWEEP_VICTIMS + 1);
        for victim in candidates {
            if victim.entity == entity || hitbox.struck.contains(&victim.entity) {
                continue;
            }
            hitbox.struck.push(victim.entity);
            hits.write(HitLanded {
                attacker: Some(entity),
                victim: victim.entity,
                amount: hitbox.damage,
                point: victim.position,
                direction: (victim.position - position.0).normalize_or_zero(),
            });
            crate::log(&format!(
                "⚔️ {:?} rams {:?} for {} (dash)",
                entity, victim.entity, hitbox.damage
            ));
        }
    }
}
