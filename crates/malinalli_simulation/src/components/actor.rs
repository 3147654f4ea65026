//! Базовые компоненты акторов: позиция, скорость, слой коллизий, facing

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::BitOr;

/// Позиция в мире (2D, метры). Authoritative для AI решений.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Position(pub Vec2);

/// Текущая скорость тела (м/с). Хост-физика читает/пишет её же.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Velocity(pub Vec2);

/// Категория физического слоя (аналог layer в движке)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Warrior,
    Companion,
    Enemy,
    Terrain,
}

impl Layer {
    const ALL: [Layer; 4] = [Layer::Warrior, Layer::Companion, Layer::Enemy, Layer::Terrain];

    pub fn mask(self) -> LayerMask {
        match self {
            Layer::Warrior => LayerMask::WARRIOR,
            Layer::Companion => LayerMask::COMPANION,
            Layer::Enemy => LayerMask::ENEMY,
            Layer::Terrain => LayerMask::TERRAIN,
        }
    }
}

/// Битовая маска слоёв.
///
/// В TOML пишется списком имён: `targets = ["warrior", "companion"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
#[serde(from = "Vec<Layer>", into = "Vec<Layer>")]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const WARRIOR: LayerMask = LayerMask(1 << 0);
    pub const COMPANION: LayerMask = LayerMask(1 << 1);
    pub const ENEMY: LayerMask = LayerMask(1 << 2);
    pub const TERRAIN: LayerMask = LayerMask(1 << 3);
    /// Оба управляемых игроком персонажа (воин + черепаха)
    pub const PLAYERS: LayerMask = LayerMask(Self::WARRIOR.0 | Self::COMPANION.0);

    pub fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for LayerMask {
    type Output = LayerMask;

    fn bitor(self, rhs: LayerMask) -> LayerMask {
        LayerMask(self.0 | rhs.0)
    }
}

impl From<Vec<Layer>> for LayerMask {
    fn from(layers: Vec<Layer>) -> Self {
        layers
            .into_iter()
            .fold(LayerMask::NONE, |mask, layer| mask | layer.mask())
    }
}

impl From<LayerMask> for Vec<Layer> {
    fn from(mask: LayerMask) -> Self {
        Layer::ALL
            .into_iter()
            .filter(|layer| mask.intersects(layer.mask()))
            .collect()
    }
}

/// Слой, к которому принадлежит entity (для overlap запросов)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct CollisionLayer(pub LayerMask);

/// Ориентация спрайта (бинарный flip влево/вправо)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// Направление на точку по оси X (`to_x >= from_x` → Right)
    pub fn toward(from_x: f32, to_x: f32) -> Self {
        if to_x >= from_x {
            Facing::Right
        } else {
            Facing::Left
        }
    }

    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn forward(self) -> Vec2 {
        Vec2::new(self.sign(), 0.0)
    }

    /// Отражает локальный offset (eye, attack point) по facing
    pub fn mirror(self, offset: Vec2) -> Vec2 {
        Vec2::new(offset.x * self.sign(), offset.y)
    }
}
