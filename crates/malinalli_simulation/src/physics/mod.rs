//! World/physics запросы для AI (strategic layer)
//!
//! Ядро AI не трогает ECS напрямую: сенсор, резолвер и исполнение ударов
//! получают `WorldQuery` параметром. В симуляции это `SpatialIndex`,
//! пересобираемый каждый тик; хост может подставить свою реализацию
//! (raycast'ы движка).

use bevy::prelude::*;
use crate::components::LayerMask;

pub mod movement;
pub mod spatial_index;

pub use movement::{apply_motor_intents, integrate_motion, MotorIntent};
pub use spatial_index::{rebuild_spatial_index, SpatialIndex};

/// Кандидат из overlap запроса
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub entity: Entity,
    pub position: Vec2,
}

/// Синхронный, authoritative на текущий тик сервис запросов к миру.
pub trait WorldQuery {
    /// Entities слоя `mask` в радиусе `radius` от `center`.
    ///
    /// Не больше `limit` штук; при переполнении побеждают первые
    /// зарегистрированные (порядок вставки).
    fn overlap_circle(&self, center: Vec2, radius: f32, mask: LayerMask, limit: usize) -> Vec<Candidate>;

    /// `true` если отрезок `from → to` не пересекает препятствия слоя `obstacles`
    fn segment_clear(&self, from: Vec2, to: Vec2, obstacles: LayerMask) -> bool;

    /// Позиция живой entity; `None`: entity уничтожена или мертва
    fn locate(&self, entity: Entity) -> Option<Vec2>;
}
