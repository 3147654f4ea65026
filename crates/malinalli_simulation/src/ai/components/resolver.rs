//! TargetResolver: склейка Sensor + ThreatTable в одну цель на тик.
//!
//! Приоритет: taunt → удержание текущей (anti-flicker) → лучший кандидат
//! сенсора, пропущенный через threat.

use bevy::prelude::*;
use super::sensor::Sensor;
use super::threat::ThreatTable;
use crate::physics::WorldQuery;

/// Каким правилом выбрана цель (для логов и cue)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum TargetSource {
    /// Активный taunt, видимость не проверяется
    Taunt,
    /// Текущая цель всё ещё видна
    Retained,
    /// Лучший кандидат сенсора
    Sensor,
    /// Threat перебил кандидата сенсора
    Threat,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedTarget {
    pub entity: Entity,
    pub position: Vec2,
    pub source: TargetSource,
}

/// Текущая цель врага. Entity здесь слабая ссылка, разыменовывается
/// только через `WorldQuery::locate`.
#[derive(Component, Debug, Clone, Default)]
pub struct TargetResolver {
    current: Option<Entity>,
}

impl TargetResolver {
    pub fn current(&self) -> Option<Entity> {
        self.current
    }

    pub fn resolve<W: WorldQuery + ?Sized>(
        &mut self,
        sensor: &Sensor,
        eye: Vec2,
        threat: Option<&ThreatTable>,
        world: &W,
    ) -> Option<ResolvedTarget> {
        // 1. Taunt
        if let Some(taunt) = threat.and_then(|t| t.taunt()) {
            if let Some(position) = world.locate(taunt.source) {
                return Some(self.pick(taunt.source, position, TargetSource::Taunt));
            }
        }

        // 2. Удержание
        if let Some(current) = self.current {
            if sensor.can_see(eye, current, world) {
                if let Some(position) = world.locate(current) {
                    return Some(self.pick(current, position, TargetSource::Retained));
                }
            }
        }

        // 3. Сенсор + threat
        let resolved = sensor.find_best_target(eye, world).and_then(|best| {
            let preferred = threat
                .and_then(|t| t.preferred_target(Some(best)))
                .unwrap_or(best);

            if preferred != best {
                if let Some(position) = world.locate(preferred) {
                    return Some((preferred, position, TargetSource::Threat));
                }
            }
            world
                .locate(best)
                .map(|position| (best, position, TargetSource::Sensor))
        });

        match resolved {
            Some((entity, position, source)) => Some(self.pick(entity, position, source)),
            None => {
                // 4. Никого
                self.current = None;
                None
            }
        }
    }

    /// Entity уничтожена: сбросить висячую ссылку
    pub fn forget(&mut self, entity: Entity) {
        if self.current == Some(entity) {
            self.current = None;
        }
    }

    fn pick(&mut self, entity: Entity, position: Vec2, source: TargetSource) -> ResolvedTarget {
        self.current = Some(entity);
        ResolvedTarget {
            entity,
            position,
            source,
        }
    }
}
