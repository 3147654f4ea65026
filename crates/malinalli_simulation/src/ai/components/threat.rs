//! ThreatTable: кто насколько "раздражает" врага.
//!
//! Threat копится от урона, затухает со временем. Taunt (от компаньона)
//! временно перекрывает любой threat.

use bevy::prelude::*;
use std::collections::BTreeMap;
use crate::config::ThreatConfig;

/// Активный taunt: кого бить и до какого момента (секунды `SimClock::elapsed`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Taunt {
    pub source: Entity,
    pub expires_at: f32,
}

/// Таблица угрозы врага.
///
/// Entries в `BTreeMap`: при равном threat побеждает наименьший `Entity`,
/// порядок не зависит от истории вставок.
#[derive(Component, Debug, Clone, Default)]
pub struct ThreatTable {
    config: ThreatConfig,
    entries: BTreeMap<Entity, f32>,
    taunt: Option<Taunt>,
}

impl ThreatTable {
    pub fn new(config: ThreatConfig) -> Self {
        Self {
            config,
            entries: BTreeMap::new(),
            taunt: None,
        }
    }

    pub fn config(&self) -> &ThreatConfig {
        &self.config
    }

    /// Добавить threat. Неположительные/NaN значения и PLACEHOLDER игнорируются.
    pub fn add_threat(&mut self, source: Entity, amount: f32) {
        if source == Entity::PLACEHOLDER || !(amount > 0.0) {
            return;
        }
        *self.entries.entry(source).or_insert(0.0) += amount;
    }

    /// Урон от `attacker` → threat (damage × damage_to_threat)
    pub fn on_damaged(&mut self, attacker: Entity, damage: u32) {
        self.add_threat(attacker, damage as f32 * self.config.damage_to_threat);
    }

    /// Taunt: форсирует цель до `now + min(duration, max_taunt_duration)`
    /// и добавляет `threat_boost` источнику.
    pub fn apply_taunt(&mut self, source: Entity, duration: f32, threat_boost: f32, now: f32) {
        if source == Entity::PLACEHOLDER {
            return;
        }

        let duration = duration.max(0.0).min(self.config.max_taunt_duration);
        self.taunt = Some(Taunt {
            source,
            expires_at: now + duration,
        });
        self.add_threat(source, threat_boost);
    }

    /// Затухание threat + истечение taunt. Вызывается раз в тик.
    /// Затухшие до нуля entries удаляются.
    pub fn tick(&mut self, dt: f32, now: f32) {
        let decay = self.config.decay_per_sec * dt;
        self.entries.retain(|_, value| {
            *value = (*value - decay).max(0.0);
            *value > 0.0
        });

        if self.taunt.is_some_and(|t| now > t.expires_at) {
            self.taunt = None;
        }
    }

    /// Кого бить: taunt → максимальный положительный threat → `fallback`
    pub fn preferred_target(&self, fallback: Option<Entity>) -> Option<Entity> {
        if let Some(taunt) = self.taunt {
            return Some(taunt.source);
        }

        let mut best: Option<(Entity, f32)> = None;
        for (&entity, &value) in &self.entries {
            if value <= 0.0 {
                continue;
            }
            // Строгое сравнение: при равенстве остаётся меньший Entity
            if best.map_or(true, |(_, best_value)| value > best_value) {
                best = Some((entity, value));
            }
        }

        best.map(|(entity, _)| entity).or(fallback)
    }

    /// Цель умерла/исчезла: забываем её (и taunt, если он её)
    pub fn clear_target(&mut self, entity: Entity) {
        self.entries.remove(&entity);
        if self.taunt.is_some_and(|t| t.source == entity) {
            self.taunt = None;
        }
    }

    pub fn threat_of(&self, entity: Entity) -> f32 {
        self.entries.get(&entity).copied().unwrap_or(0.0)
    }

    pub fn taunt(&self) -> Option<Taunt> {
        self.taunt
    }

    pub fn is_taunted(&self) -> bool {
        self.taunt.is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
