//! Damageable capability + события урона/смерти.
//!
//! Два вида здоровья:
//! - `Health` (воин и враги): просто вычитаем
//! - `GuardedHealth` (черепаха): guard/charge множители + knockback
//!
//! Оба применяются одной generic системой `apply_hits::<T>`.

use bevy::prelude::*;

/// Итог одного попадания
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DamageReport {
    /// Фактически снятое здоровье (после множителей)
    pub applied: u32,
    /// Импульс для Velocity (ZERO: без отбрасывания)
    pub knockback: Vec2,
    /// Переход alive → dead на этом попадании (ровно один раз)
    pub killed: bool,
}

/// Всё, что можно ударить
pub trait Damageable {
    /// `impact_direction`: направление удара (от атакующего к жертве)
    fn take_damage(&mut self, amount: u32, impact_point: Vec2, impact_direction: Vec2) -> DamageReport;
    fn is_alive(&self) -> bool;
    fn current(&self) -> u32;
    fn max(&self) -> u32;
}

/// Здоровье (инвариант: 0 ≤ current ≤ max)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Лечение до `max`. Мёртвых не поднимает: смерть окончательна.
    pub fn heal(&mut self, amount: u32) {
        if !self.is_alive() {
            return;
        }
        self.current = self.current.saturating_add(amount).min(self.max);
    }
}

impl Damageable for Health {
    fn take_damage(&mut self, amount: u32, _impact_point: Vec2, _impact_direction: Vec2) -> DamageReport {
        let was_alive = self.is_alive();
        let before = self.current;
        self.current = self.current.saturating_sub(amount);

        DamageReport {
            applied: before - self.current,
            knockback: Vec2::ZERO,
            killed: was_alive && !self.is_alive(),
        }
    }

    fn is_alive(&self) -> bool {
        self.current > 0
    }

    fn current(&self) -> u32 {
        self.current
    }

    fn max(&self) -> u32 {
        self.max
    }
}

/// Здоровье компаньона: меньше урона и отбрасывания в guard/charge.
///
/// Финальный урон: `max(1, round(amount × mult))`, даже полный guard
/// не делает черепаху неуязвимой.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct GuardedHealth {
    pub current: u32,
    pub max: u32,

    pub knockback_scale: f32,
    /// Сила отбрасывания до множителей
    pub knockback_impulse: f32,

    pub guard_damage_multiplier: f32,
    pub guard_knockback_scale: f32,

    pub charge_damage_multiplier: f32,
    pub charge_knockback_scale: f32,

    guarding: bool,
    charging: bool,
    /// 0..1, дополнительное сопротивление knockback в guard
    extra_knockback_resist: f32,
}

impl Default for GuardedHealth {
    fn default() -> Self {
        Self::new(160)
    }
}

impl GuardedHealth {
    pub fn new(max: u32) -> Self {
        Self {
            current: max,
            max,
            knockback_scale: 0.6,
            knockback_impulse: 6.0,
            guard_damage_multiplier: 0.5,
            guard_knockback_scale: 0.4,
            charge_damage_multiplier: 0.75,
            charge_knockback_scale: 0.5,
            guarding: false,
            charging: false,
            extra_knockback_resist: 0.0,
        }
    }

    pub fn set_guarding(&mut self, guarding: bool, extra_resist: f32) {
        self.guarding = guarding;
        self.extra_knockback_resist = extra_resist.clamp(0.0, 1.0);
    }

    pub fn set_charging(&mut self, charging: bool) {
        self.charging = charging;
    }

    pub fn is_guarding(&self) -> bool {
        self.guarding
    }

    pub fn is_charging(&self) -> bool {
        self.charging
    }

    /// (множитель урона, множитель knockback) для текущей стойки
    fn multipliers(&self) -> (f32, f32) {
        let mut damage = 1.0;
        let mut knockback = self.knockback_scale;

        if self.guarding {
            damage *= self.guard_damage_multiplier;
            knockback *= self.guard_knockback_scale * (1.0 - self.extra_knockback_resist);
        }
        if self.charging {
            damage *= self.charge_damage_multiplier;
            knockback *= self.charge_knockback_scale;
        }

        (damage, knockback)
    }
}

impl Damageable for GuardedHealth {
    fn take_damage(&mut self, amount: u32, _impact_point: Vec2, impact_direction: Vec2) -> DamageReport {
        let was_alive = self.is_alive();
        let (damage_mul, knockback_mul) = self.multipliers();

        let final_damage = ((amount as f32 * damage_mul).round() as u32).max(1);
        let before = self.current;
        self.current = self.current.saturating_sub(final_damage);

        // Почти нулевое направление → отбрасываем влево
        let direction = if impact_direction.length_squared() > 0.01 {
            impact_direction.normalize()
        } else {
            Vec2::NEG_X
        };

        DamageReport {
            applied: before - self.current,
            knockback: direction * self.knockback_impulse * knockback_mul,
            killed: was_alive && !self.is_alive(),
        }
    }

    fn is_alive(&self) -> bool {
        self.current > 0
    }

    fn current(&self) -> u32 {
        self.current
    }

    fn max(&self) -> u32 {
        self.max
    }
}

/// Событие: удар достиг жертвы (ещё до множителей жертвы)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct HitLanded {
    /// `None`: урон от окружения/хоста
    pub attacker: Option<Entity>,
    pub victim: Entity,
    pub amount: u32,
    pub point: Vec2,
    pub direction: Vec2,
}

/// Событие: урон нанесен
///
/// Генерируется после применения damage к здоровью.
/// Используется threat таблицами, UI, звуками.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DamageDealt {
    pub attacker: Option<Entity>,
    pub target: Entity,
    pub damage: u32,
    pub target_died: bool,
}

/// Событие: entity умер (не чаще одного раза на entity)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Компонент-маркер: entity мертв.
///
/// Мёртвые не попадают в SpatialIndex и не получают новых попаданий.
#[derive(Component, Debug)]
pub struct Dead;

/// Компонент-маркер: деспавн entity после указанного времени
#[derive(Component, Debug)]
pub struct DespawnAfter {
    /// Время деспавна (`SimClock::elapsed`)
    pub despawn_time: f32,
}
