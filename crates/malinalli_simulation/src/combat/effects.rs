//! Временные эффекты на телах: контактный хитбокс рывка, яд.

use bevy::prelude::*;
use crate::components::LayerMask;
use crate::config::PoisonConfig;

/// Контактный урон рывка. Висит на атакующем, пока его CombatFsm
/// в фазе `Dash`; каждую жертву задевает не больше одного раза.
#[derive(Component, Debug, Clone)]
pub struct DashHitbox {
    pub damage: u32,
    pub radius: f32,
    pub victims: LayerMask,
    pub struck: Vec<Entity>,
}

impl DashHitbox {
    pub fn new(damage: u32, radius: f32, victims: LayerMask) -> Self {
        Self {
            damage,
            radius,
            victims,
            struck: Vec::new(),
        }
    }
}

/// Яд на жертве: `ticks_left` раз по `damage` каждые `interval` секунд.
/// Повторное отравление перезапускает счётчик.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Poisoned {
    pub source: Entity,
    pub damage: u32,
    pub ticks_left: u32,
    pub interval: f32,
    /// Секунды до следующего тика яда
    pub timer: f32,
}

impl Poisoned {
    pub fn new(source: Entity, config: PoisonConfig) -> Self {
        Self {
            source,
            damage: config.damage,
            ticks_left: config.ticks,
            interval: config.interval,
            timer: config.interval,
        }
    }
}
