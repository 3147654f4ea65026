//! Sensor: конус зрения + line-of-sight + ближайший кандидат.
//!
//! Чистый запрос к миру (через `WorldQuery`), единственное состояние:
//! закэшированный facing, который обновляется раз в тик.

use bevy::prelude::*;
use crate::components::Facing;
use crate::config::SensorConfig;
use crate::physics::WorldQuery;

/// Кандидаты ближе этого считаются "в глазу" и пропускаются
const MIN_SCAN_DISTANCE: f32 = 0.0001;

#[derive(Component, Debug, Clone)]
pub struct Sensor {
    config: SensorConfig,
    /// cos(sight_angle / 2), считается один раз
    cos_half_angle: f32,
    facing: Facing,
}

impl Sensor {
    pub fn new(config: SensorConfig) -> Self {
        let half = (config.sight_angle * 0.5).to_radians();
        Self {
            cos_half_angle: half.cos(),
            config,
            facing: Facing::Right,
        }
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Точка глаз в мире
    pub fn eye(&self, position: Vec2) -> Vec2 {
        position + self.facing.mirror(Vec2::from_array(self.config.eye_offset))
    }

    /// Обновить facing.
    ///
    /// По движению: |vx| выше порога задаёт сторону, иначе остаётся последний.
    /// Без movement facing: берём ориентацию тела.
    pub fn update_facing(&mut self, velocity_x: f32, body_facing: Facing) -> Facing {
        if self.config.use_movement_facing {
            if velocity_x > self.config.min_move_for_facing {
                self.facing = Facing::Right;
            } else if velocity_x < -self.config.min_move_for_facing {
                self.facing = Facing::Left;
            }
        } else {
            self.facing = body_facing;
        }
        self.facing
    }

    /// Лучшая видимая цель: ближайшая в конусе без препятствий.
    ///
    /// Цель внутри `near_sense` принимается сразу (при наличии LOS),
    /// даже если она за спиной.
    pub fn find_best_target<W: WorldQuery + ?Sized>(&self, eye: Vec2, world: &W) -> Option<Entity> {
        let candidates = world.overlap_circle(
            eye,
            self.config.sight_range,
            self.config.targets,
            self.config.max_candidates,
        );

        let forward = self.facing.forward();
        let mut best: Option<(Entity, f32)> = None;

        for candidate in candidates {
            let to = candidate.position - eye;
            let dist = to.length();
            if dist <= MIN_SCAN_DISTANCE {
                continue;
            }

            if self.in_near_sense(dist) && self.line_of_sight(eye, candidate.position, world) {
                return Some(candidate.entity);
            }

            if forward.dot(to / dist) < self.cos_half_angle {
                continue;
            }

            if !self.line_of_sight(eye, candidate.position, world) {
                continue;
            }

            if best.map_or(true, |(_, best_dist)| dist < best_dist) {
                best = Some((candidate.entity, dist));
            }
        }

        best.map(|(entity, _)| entity)
    }

    /// Видна ли конкретная цель прямо сейчас
    pub fn can_see<W: WorldQuery + ?Sized>(&self, eye: Vec2, target: Entity, world: &W) -> bool {
        let Some(target_pos) = world.locate(target) else {
            return false;
        };

        let to = target_pos - eye;
        let dist = to.length();
        if dist > self.config.sight_range {
            return false;
        }

        if self.in_near_sense(dist) {
            return self.line_of_sight(eye, target_pos, world);
        }

        let dir = if dist > MIN_SCAN_DISTANCE { to / dist } else { Vec2::X };
        if self.facing.forward().dot(dir) < self.cos_half_angle {
            return false;
        }

        self.line_of_sight(eye, target_pos, world)
    }

    fn in_near_sense(&self, dist: f32) -> bool {
        self.config.near_sense > 0.0 && dist <= self.config.near_sense
    }

    fn line_of_sight<W: WorldQuery + ?Sized>(&self, from: Vec2, to: Vec2, world: &W) -> bool {
        world.segment_clear(from, to, self.config.obstacles)
    }
}
