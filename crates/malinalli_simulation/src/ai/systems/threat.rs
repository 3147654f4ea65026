//! Perception фаза: урон → threat, taunt запросы, затухание.

use bevy::prelude::*;
use crate::ai::{TauntRequested, ThreatTable};
use crate::combat::{DamageDealt, Dead};
use crate::components::LayerMask;
use crate::physics::{SpatialIndex, WorldQuery};
use crate::SimClock;

/// Сколько врагов максимум цепляет один taunt
pub const MAX_TAUNT_TARGETS: usize = 32;

/// Система: DamageDealt → ThreatTable::on_damaged
///
/// Урон без атакующего (окружение) threat не создаёт.
pub fn record_damage_threat(
    mut damage_events: EventReader<DamageDealt>,
    mut tables: Query<&mut ThreatTable, Without<Dead>>,
) {
    for event in damage_events.read() {
        let Some(attacker) = event.attacker else {
            continue;
        };
        let Ok(mut table) = tables.get_mut(event.target) else {
            continue;
        };

        table.on_damaged(attacker, event.damage);
        crate::log(&format!(
            "😡 {:?} threat from {:?}: {:.1}",
            event.target,
            attacker,
            table.threat_of(attacker)
        ));
    }
}

/// Система: TauntRequested → apply_taunt всем врагам в радиусе
pub fn apply_taunts(
    clock: Res<SimClock>,
    index: Res<SpatialIndex>,
    mut taunts: EventReader<TauntRequested>,
    mut tables: Query<&mut ThreatTable, Without<Dead>>,
) {
    for taunt in taunts.read() {
        // Только конечная область и конечные числа
        if !taunt.radius.is_finite() || taunt.radius < 0.0 || !taunt.center.is_finite() {
            crate::log_warning(&format!(
                "📢 Taunt from {:?} ignored: bad area {:?} r={}",
                taunt.source, taunt.center, taunt.radius
            ));
            continue;
        }
        if !taunt.duration.is_finite() || !taunt.threat_boost.is_finite() {
            crate::log_warning(&format!(
                "📢 Taunt from {:?} ignored: duration {} boost {}",
                taunt.source, taunt.duration, taunt.threat_boost
            ));
            continue;
        }

        let affected = index.overlap_circle(taunt.center, taunt.radius, LayerMask::ENEMY, MAX_TAUNT_TARGETS);

        let mut count = 0;
        for candidate in affected {
            if candidate.entity == taunt.source {
                continue;
            }
            let Ok(mut table) = tables.get_mut(candidate.entity) else {
                continue;
            };
            table.apply_taunt(taunt.source, taunt.duration, taunt.threat_boost, clock.elapsed);
            count += 1;
        }

        crate::log_info(&format!(
            "📢 Taunt from {:?}: {} enemies for {:.1}s",
            taunt.source, count, taunt.duration
        ));
    }
}

/// Система: затухание threat и истечение taunt
pub fn tick_threat_tables(clock: Res<SimClock>, mut tables: Query<&mut ThreatTable, Without<Dead>>) {
    for mut table in tables.iter_mut() {
        table.tick(clock.delta, clock.elapsed);
    }
}
