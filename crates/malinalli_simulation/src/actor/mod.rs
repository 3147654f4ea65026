//! Actor domain: кто есть кто на сцене
//!
//! Содержит:
//! - Enemy / Warrior / Companion (маркеры ролей)
//! - bundle-конструкторы и спавн врага из `EnemyConfig`

pub mod components;
pub mod spawn;

// Re-export all components
pub use components::*;
pub use spawn::*;
