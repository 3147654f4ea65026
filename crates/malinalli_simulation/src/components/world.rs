//! World компоненты: препятствия для line-of-sight, маршрут патруля

use bevy::prelude::*;
use crate::components::LayerMask;

/// Статическое препятствие (AABB): стены, пол, платформы.
///
/// Блокирует линию видимости для сенсоров и снаряды.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Obstacle {
    pub min: Vec2,
    pub max: Vec2,
    pub layer: LayerMask,
}

impl Obstacle {
    /// Terrain-блок по центру и полуразмерам
    pub fn terrain(center: Vec2, half_extents: Vec2) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
            layer: LayerMask::TERRAIN,
        }
    }

    /// Пересекает ли отрезок `from → to` этот AABB (slab test).
    pub fn intersects_segment(&self, from: Vec2, to: Vec2) -> bool {
        let delta = to - from;
        let mut t_enter = 0.0_f32;
        let mut t_exit = 1.0_f32;

        for axis in 0..2 {
            let (origin, d, lo, hi) = (from[axis], delta[axis], self.min[axis], self.max[axis]);

            if d.abs() < f32::EPSILON {
                // Параллельно оси: либо внутри slab, либо мимо
                if origin < lo || origin > hi {
                    return false;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (lo - origin) * inv;
            let mut t1 = (hi - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            t_enter = t_enter.max(t0);
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return false;
            }
        }

        true
    }
}

/// Циклическая последовательность waypoint'ов патруля
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct PatrolRoute(pub Vec<Vec2>);
