//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: позиция, скорость, слой коллизий, facing
//! - world: препятствия и маршруты патруля
//!
//! AI/combat компоненты живут в своих модулях (`crate::ai`, `crate::combat`).

pub mod actor;
pub mod world;

// Re-exports для удобного импорта
pub use actor::*;
pub use world::*;
