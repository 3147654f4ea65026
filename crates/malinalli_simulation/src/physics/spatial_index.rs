//! Spatial hash по живым телам + список препятствий.
//!
//! Пересобирается целиком в начале Perception фазы: тел немного
//! (десятки), пересборка дешевле инкрементального трекинга.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::combat::Dead;
use crate::components::{CollisionLayer, LayerMask, Obstacle, Position};
use crate::physics::{Candidate, WorldQuery};
use crate::SimulationSettings;

#[derive(Debug, Clone, Copy)]
struct Body {
    entity: Entity,
    position: Vec2,
    layer: LayerMask,
}

#[derive(Resource, Debug, Clone)]
pub struct SpatialIndex {
    cell_size: f32,
    /// Тела в порядке вставки (индекс = порядок "кто найден первым")
    bodies: Vec<Body>,
    cells: HashMap<(i32, i32), Vec<usize>>,
    lookup: HashMap<Entity, usize>,
    obstacles: Vec<Obstacle>,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new(4.0)
    }
}

impl SpatialIndex {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(0.01),
            bodies: Vec::new(),
            cells: HashMap::new(),
            lookup: HashMap::new(),
            obstacles: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
        self.cells.clear();
        self.lookup.clear();
        self.obstacles.clear();
    }

    pub fn set_cell_size(&mut self, cell_size: f32) {
        self.cell_size = cell_size.max(0.01);
    }

    pub fn insert_body(&mut self, entity: Entity, position: Vec2, layer: LayerMask) {
        let idx = self.bodies.len();
        self.bodies.push(Body {
            entity,
            position,
            layer,
        });
        let key = self.cell_key(position);
        self.cells.entry(key).or_default().push(idx);
        self.lookup.insert(entity, idx);
    }

    pub fn insert_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn cell_key(&self, position: Vec2) -> (i32, i32) {
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }
}

impl WorldQuery for SpatialIndex {
    fn overlap_circle(&self, center: Vec2, radius: f32, mask: LayerMask, limit: usize) -> Vec<Candidate> {
        // NaN радиус тоже отсекается
        if limit == 0 || !(radius >= 0.0) || !center.is_finite() || mask.is_empty() {
            return Vec::new();
        }

        let radius_sq = radius * radius;
        let hit = |body: &Body| body.layer.intersects(mask) && body.position.distance_squared(center) <= radius_sq;

        // Ячеек больше, чем тел (или радиус бесконечный): линейный проход дешевле
        let span = (radius / self.cell_size).ceil();
        let cells_to_scan = (2.0 * span + 1.0) * (2.0 * span + 1.0);
        if !span.is_finite() || cells_to_scan > self.bodies.len() as f32 {
            return self
                .bodies
                .iter()
                .filter(|body| hit(*body))
                .take(limit)
                .map(|body| Candidate {
                    entity: body.entity,
                    position: body.position,
                })
                .collect();
        }

        let r = span as i32;
        let (cx, cy) = self.cell_key(center);

        let mut found: Vec<usize> = Vec::new();
        for ix in cx.saturating_sub(r)..=cx.saturating_add(r) {
            for iy in cy.saturating_sub(r)..=cy.saturating_add(r) {
                let Some(ids) = self.cells.get(&(ix, iy)) else {
                    continue;
                };
                found.extend(ids.iter().copied().filter(|&idx| hit(&self.bodies[idx])));
            }
        }

        // Ячейки обходятся в произвольном порядке: восстанавливаем порядок вставки
        found.sort_unstable();
        found.truncate(limit);

        found
            .into_iter()
            .map(|idx| Candidate {
                entity: self.bodies[idx].entity,
                position: self.bodies[idx].position,
            })
            .collect()
    }

    fn segment_clear(&self, from: Vec2, to: Vec2, obstacles: LayerMask) -> bool {
        !self
            .obstacles
            .iter()
            .filter(|o| o.layer.intersects(obstacles))
            .any(|o| o.intersects_segment(from, to))
    }

    fn locate(&self, entity: Entity) -> Option<Vec2> {
        self.lookup.get(&entity).map(|&idx| self.bodies[idx].position)
    }
}

/// Система: пересборка SpatialIndex из ECS.
///
/// Мёртвые (`Dead`) не попадают в индекс: для AI они больше не существуют.
/// Entities сортируются для детерминированного порядка вставки.
pub fn rebuild_spatial_index(
    mut index: ResMut<SpatialIndex>,
    settings: Res<SimulationSettings>,
    bodies: Query<(Entity, &Position, &CollisionLayer), Without<Dead>>,
    obstacles: Query<&Obstacle>,
) {
    index.clear();
    index.set_cell_size(settings.spatial_cell_size);

    let mut sorted: Vec<_> = bodies.iter().collect();
    sorted.sort_by_key(|(entity, _, _)| *entity);

    for (entity, position, layer) in sorted {
        index.insert_body(entity, position.0, layer.0);
    }
    for obstacle in obstacles.iter() {
        index.insert_obstacle(*obstacle);
    }
}
