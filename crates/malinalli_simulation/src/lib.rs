//! Malinalli Simulation Core
//!
//! ECS-симуляция вражеского AI на Bevy 0.16 (strategic layer).
//!
//! HYBRID ARCHITECTURE:
//! - ECS = strategic layer (сенсоры, threat, FSM, правила урона)
//! - Движок хоста = tactical layer (физика, анимации, рендер, звук)
//!
//! Хост крутит `SimulationTick` (через `step()` или FixedUpdate мост),
//! пишет в ECS позиции/урон/taunt и читает MotorIntent + PresentationCue.

use bevy::ecs::schedule::{ExecutorKind, ScheduleLabel};
use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod actor;
pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod logger;
pub mod physics;

// Re-export базовых типов для удобства
pub use actor::{Companion, Enemy, Warrior};
pub use ai::{AIPlugin, CombatFsm, CombatState, PresentationCue, TauntRequested};
pub use combat::{CombatPlugin, DamageDealt, Dead, EntityDied, GuardedHealth, Health, HitLanded};
pub use components::*;
pub use config::{ArchetypeRegistry, ConfigError, EnemyConfig};
pub use logger::{init_logger, log, log_error, log_info, log_warning, set_log_level, LogLevel};

/// Один фиксированный шаг симуляции
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimulationTick;

/// Фазы внутри тика (строго по порядку)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSet {
    /// Продвинуть SimClock
    Clock,
    /// Смерти прошлого тика: Dead, FSM → Dead, очистка threat/резолверов
    Aftermath,
    /// SpatialIndex, урон → threat, taunt, затухание
    Perception,
    /// Sensor → Resolver → FSM
    Decision,
    /// Удары, снаряды, урон
    Combat,
    /// MotorIntent → Velocity → Position
    Motion,
}

/// Часы симуляции. `elapsed`: "now" для taunt и деспавна.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct SimClock {
    pub tick: u64,
    /// Фиксированный шаг (секунды)
    pub delta: f32,
    pub elapsed: f32,
}

impl Default for SimClock {
    fn default() -> Self {
        Self {
            tick: 0,
            delta: 1.0 / 60.0,
            elapsed: 0.0,
        }
    }
}

/// Глобальные настройки симуляции
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    /// Частота тика (Гц)
    pub tick_hz: f64,
    /// Сколько секунд труп лежит до деспавна
    pub corpse_linger: f32,
    pub spatial_cell_size: f32,
    /// Торможение тел без FSM (1/сек)
    pub body_drag: f32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_hz: 60.0,
            corpse_linger: 1.5,
            spatial_cell_size: 4.0,
            body_drag: 4.0,
        }
    }
}

impl SimulationSettings {
    pub fn delta(&self) -> f32 {
        (1.0 / self.tick_hz.max(1.0)) as f32
    }
}

/// Главный plugin симуляции (объединяет все подсистемы)
#[derive(Default)]
pub struct SimulationPlugin {
    pub settings: SimulationSettings,
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let settings = self.settings.clone();

        app.init_schedule(SimulationTick)
            .edit_schedule(SimulationTick, |schedule| {
                // Один поток: порядок событий внутри тика детерминирован
                schedule.set_executor_kind(ExecutorKind::SingleThreaded);
            })
            .configure_sets(
                SimulationTick,
                (
                    TickSet::Clock,
                    TickSet::Aftermath,
                    TickSet::Perception,
                    TickSet::Decision,
                    TickSet::Combat,
                    TickSet::Motion,
                )
                    .chain(),
            )
            // Fixed timestep для моста из FixedUpdate
            .insert_resource(Time::<Fixed>::from_hz(settings.tick_hz))
            .insert_resource(SimClock {
                delta: settings.delta(),
                ..SimClock::default()
            })
            .insert_resource(settings)
            .init_resource::<physics::SpatialIndex>()
            // Детерминистичный RNG (seed по умолчанию)
            .insert_resource(DeterministicRng::new(42))
            // Подсистемы (ECS strategic layer)
            .add_plugins((CombatPlugin, AIPlugin))
            .add_systems(SimulationTick, advance_clock.in_set(TickSet::Clock))
            .add_systems(
                SimulationTick,
                physics::rebuild_spatial_index.in_set(TickSet::Perception),
            )
            .add_systems(
                SimulationTick,
                (physics::apply_motor_intents, physics::integrate_motion)
                    .chain()
                    .in_set(TickSet::Motion),
            )
            .add_systems(FixedUpdate, run_simulation_tick);
    }
}

/// Мост: один FixedUpdate = один SimulationTick
pub fn run_simulation_tick(world: &mut World) {
    world.run_schedule(SimulationTick);
}

/// Система: продвинуть часы на фиксированный шаг
pub fn advance_clock(mut clock: ResMut<SimClock>, settings: Res<SimulationSettings>) {
    clock.delta = settings.delta();
    clock.tick += 1;
    clock.elapsed += clock.delta;
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт Bevy App для headless симуляции (тики: через `step`)
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(SimulationPlugin::default())
        .insert_resource(DeterministicRng::new(seed));

    app
}

/// Один тик вручную (без Time/FixedUpdate).
///
/// Сначала First (ротация event буферов, как в `App::update`), потом тик:
/// события тика N видны системам тика N+1 и тестам после `step`.
pub fn step(app: &mut App) {
    let world = app.world_mut();
    let _ = world.try_run_schedule(First);
    world.run_schedule(SimulationTick);
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    // Собираем все компоненты в детерминированный формат
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
