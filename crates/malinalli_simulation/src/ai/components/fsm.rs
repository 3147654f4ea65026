//! CombatFsm: боевой конечный автомат врага.
//!
//! Patrol → Chase → Attack (+ Dead, терминальное). Один `step()` на тик:
//! вход: позиция, результат резолвера и маршрут; выход: намерение
//! движения, удар и presentation hooks. Физику автомат не трогает.

use bevy::prelude::*;
use crate::components::{Facing, LayerMask};
use crate::config::{AttackConfig, AttackStyle, EnemyConfig, MovementConfig, MovementMode};
use crate::physics::MotorIntent;

/// Разница по X меньше этой не меняет facing и не двигает наземного врага
const MIN_AXIS_DELTA: f32 = 0.001;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum CombatState {
    #[default]
    Patrol,
    Chase,
    Attack,
    /// Терминальное, только через `kill()`
    Dead,
}

/// Подсостояние атаки: замах → удар/рывок → отдых, всё явными таймерами
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum AttackPhase {
    #[default]
    Ready,
    Windup { remaining: f32 },
    /// Рывок летит, контактный урон активен
    Dash { remaining: f32 },
    Recovery { remaining: f32 },
}

/// Та часть `EnemyConfig`, которая нужна автомату
#[derive(Debug, Clone, PartialEq)]
pub struct FsmConfig {
    pub movement: MovementConfig,
    pub attack: AttackConfig,
    pub lost_sight_grace: f32,
}

impl FsmConfig {
    pub fn from_enemy(config: &EnemyConfig) -> Self {
        Self {
            movement: config.movement.clone(),
            attack: config.attack.clone(),
            lost_sight_grace: config.behaviour.lost_sight_grace,
        }
    }
}

impl Default for FsmConfig {
    fn default() -> Self {
        Self::from_enemy(&EnemyConfig::default())
    }
}

/// Цель, выданная резолвером на этот тик
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSighting {
    pub entity: Entity,
    pub position: Vec2,
    /// Для упреждения снарядов
    pub velocity: Vec2,
}

#[derive(Debug, Clone, Copy)]
pub struct TickInput<'a> {
    pub dt: f32,
    pub position: Vec2,
    pub target: Option<TargetSighting>,
    pub waypoints: &'a [Vec2],
}

/// Запрос на удар: исполняется в Combat фазе
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrikeIntent {
    /// Attack origin в мире
    pub origin: Vec2,
    pub radius: f32,
    pub damage: u32,
    /// Единичный вектор origin → цель
    pub direction: Vec2,
    pub target: Entity,
    pub target_position: Vec2,
    pub target_velocity: Vec2,
    pub style: AttackStyle,
    pub victims: LayerMask,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickOutput {
    pub motor: MotorIntent,
    pub strike: Option<StrikeIntent>,
    /// Состояние, в которое вошли на этом тике
    pub entered: Option<CombatState>,
    pub facing_changed: bool,
    pub windup_started: bool,
}

#[derive(Component, Debug, Clone)]
pub struct CombatFsm {
    state: CombatState,
    patrol_index: usize,
    cooldown: f32,
    /// Секунды с последнего успешного resolve
    lost_sight: f32,
    attack_phase: AttackPhase,
    facing: Facing,
    config: FsmConfig,
}

impl Default for CombatFsm {
    fn default() -> Self {
        Self::new(FsmConfig::default())
    }
}

impl CombatFsm {
    pub fn new(config: FsmConfig) -> Self {
        Self {
            state: CombatState::Patrol,
            patrol_index: 0,
            cooldown: 0.0,
            lost_sight: 0.0,
            attack_phase: AttackPhase::Ready,
            facing: Facing::Right,
            config,
        }
    }

    pub fn state(&self) -> CombatState {
        self.state
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn patrol_index(&self) -> usize {
        self.patrol_index
    }

    pub fn cooldown(&self) -> f32 {
        self.cooldown
    }

    pub fn lost_sight(&self) -> f32 {
        self.lost_sight
    }

    pub fn attack_phase(&self) -> AttackPhase {
        self.attack_phase
    }

    pub fn config(&self) -> &FsmConfig {
        &self.config
    }

    pub fn is_dead(&self) -> bool {
        self.state == CombatState::Dead
    }

    /// Внешнее уведомление о смерти. `true` только при первом вызове.
    pub fn kill(&mut self) -> bool {
        if self.is_dead() {
            return false;
        }
        self.state = CombatState::Dead;
        self.attack_phase = AttackPhase::Ready;
        true
    }

    /// Точка удара: позиция + origin, отражённый по facing
    pub fn attack_origin(&self, position: Vec2) -> Vec2 {
        position + self.facing.mirror(Vec2::from_array(self.config.attack.origin))
    }

    /// Один тик автомата
    pub fn step(&mut self, input: TickInput) -> TickOutput {
        if self.is_dead() {
            return TickOutput::default();
        }

        let mut output = TickOutput::default();
        let previous_facing = self.facing;

        self.cooldown = (self.cooldown - input.dt).max(0.0);

        if let Some(target) = input.target {
            self.facing = Facing::toward(input.position.x, target.position.x);
            self.lost_sight = 0.0;
        } else {
            self.lost_sight += input.dt;
        }

        let next = self.next_state(input.position, input.target);
        if next != self.state {
            if self.state == CombatState::Attack {
                // Замах и отдых брошены
                self.attack_phase = AttackPhase::Ready;
            }
            self.state = next;
            output.entered = Some(next);
        }

        match self.state {
            CombatState::Patrol => self.patrol(&input, &mut output),
            CombatState::Chase => self.chase(&input, &mut output),
            CombatState::Attack => self.attack(&input, &mut output),
            CombatState::Dead => {}
        }

        output.facing_changed = self.facing != previous_facing;
        output
    }

    fn next_state(&self, position: Vec2, target: Option<TargetSighting>) -> CombatState {
        let in_range = |t: &TargetSighting| {
            self.attack_origin(position).distance(t.position) <= self.config.attack.range
        };

        match (self.state, target) {
            (CombatState::Dead, _) => CombatState::Dead,
            // Начатый рывок не прерывается: цель за спиной или вне дистанции
            (CombatState::Attack, _) if matches!(self.attack_phase, AttackPhase::Dash { .. }) => {
                CombatState::Attack
            }
            (CombatState::Patrol, Some(_)) => CombatState::Chase,
            (CombatState::Patrol, None) => CombatState::Patrol,
            (CombatState::Chase, Some(t)) if in_range(&t) => CombatState::Attack,
            (CombatState::Chase, Some(_)) => CombatState::Chase,
            (CombatState::Chase, None) if self.lost_sight > self.config.lost_sight_grace => {
                CombatState::Patrol
            }
            (CombatState::Chase, None) => CombatState::Chase,
            (CombatState::Attack, Some(t)) if in_range(&t) => CombatState::Attack,
            (CombatState::Attack, Some(_)) => CombatState::Chase,
            (CombatState::Attack, None) => CombatState::Patrol,
        }
    }

    fn patrol(&mut self, input: &TickInput, output: &mut TickOutput) {
        if input.waypoints.is_empty() {
            output.motor = self.halt();
            return;
        }

        self.patrol_index %= input.waypoints.len();
        let mut waypoint = input.waypoints[self.patrol_index];

        if self.arrived(input.position, waypoint) {
            self.patrol_index = (self.patrol_index + 1) % input.waypoints.len();
            waypoint = input.waypoints[self.patrol_index];
        }

        self.face_toward(input.position.x, waypoint.x);
        output.motor = self.move_toward(input.position, waypoint, self.config.movement.patrol_speed);
    }

    fn chase(&mut self, input: &TickInput, output: &mut TickOutput) {
        output.motor = match input.target {
            Some(target) => self.move_toward(input.position, target.position, self.config.movement.chase_speed),
            // Grace: стоим и ждём, вдруг цель вернётся
            None => self.halt(),
        };
    }

    fn attack(&mut self, input: &TickInput, output: &mut TickOutput) {
        output.motor = self.halt();

        match self.attack_phase {
            AttackPhase::Dash { remaining } => {
                let remaining = remaining - input.dt;
                if remaining <= 0.0 {
                    // Конец рывка: тормозим (halt уже в output)
                    self.attack_phase = self.recovery_phase();
                } else {
                    self.attack_phase = AttackPhase::Dash { remaining };
                    output.motor = MotorIntent::Idle;
                }
                return;
            }
            AttackPhase::Recovery { remaining } => {
                let remaining = remaining - input.dt;
                self.attack_phase = if remaining <= 0.0 {
                    AttackPhase::Ready
                } else {
                    AttackPhase::Recovery { remaining }
                };
                return;
            }
            AttackPhase::Ready | AttackPhase::Windup { .. } => {}
        }

        let Some(target) = input.target else {
            return;
        };

        match self.attack_phase {
            AttackPhase::Ready => {
                if self.cooldown > 0.0 {
                    return;
                }
                if self.config.attack.windup > 0.0 {
                    self.attack_phase = AttackPhase::Windup {
                        remaining: self.config.attack.windup,
                    };
                    output.windup_started = true;
                } else {
                    self.release(input.position, target, output);
                }
            }
            AttackPhase::Windup { remaining } => {
                let remaining = remaining - input.dt;
                if remaining <= 0.0 {
                    self.release(input.position, target, output);
                } else {
                    self.attack_phase = AttackPhase::Windup { remaining };
                }
            }
            AttackPhase::Dash { .. } | AttackPhase::Recovery { .. } => {}
        }
    }

    /// Удар или старт рывка
    fn release(&mut self, position: Vec2, target: TargetSighting, output: &mut TickOutput) {
        output.strike = Some(self.strike(position, target));

        self.attack_phase = match self.config.attack.style {
            AttackStyle::Dash { force, duration, .. } => {
                output.motor = MotorIntent::Impulse(self.dash_direction(position, target.position) * force);
                AttackPhase::Dash { remaining: duration }
            }
            AttackStyle::Melee { .. } | AttackStyle::Ranged { .. } => self.recovery_phase(),
        };
    }

    fn recovery_phase(&self) -> AttackPhase {
        let recovery = self.config.attack.recovery;
        if recovery > 0.0 {
            AttackPhase::Recovery { remaining: recovery }
        } else {
            AttackPhase::Ready
        }
    }

    /// Наземный рывок строго горизонтален
    fn dash_direction(&self, from: Vec2, to: Vec2) -> Vec2 {
        match self.config.movement.mode {
            MovementMode::Ground => {
                let dx = to.x - from.x;
                if dx.abs() < MIN_AXIS_DELTA {
                    self.facing.forward()
                } else {
                    Vec2::new(dx.signum(), 0.0)
                }
            }
            MovementMode::Free => (to - from).normalize_or(self.facing.forward()),
        }
    }

    fn strike(&mut self, position: Vec2, target: TargetSighting) -> StrikeIntent {
        self.cooldown = self.config.attack.cooldown;

        let origin = self.attack_origin(position);
        let attack = &self.config.attack;
        let (radius, damage) = match attack.style {
            AttackStyle::Dash { radius, damage, .. } => (radius, damage),
            AttackStyle::Melee { .. } | AttackStyle::Ranged { .. } => (attack.range, attack.damage),
        };
        StrikeIntent {
            origin,
            radius,
            damage,
            direction: (target.position - origin).normalize_or(self.facing.forward()),
            target: target.entity,
            target_position: target.position,
            target_velocity: target.velocity,
            style: attack.style,
            victims: attack.victims,
        }
    }

    fn arrived(&self, position: Vec2, waypoint: Vec2) -> bool {
        let radius = self.config.movement.arrival_radius;
        match self.config.movement.mode {
            MovementMode::Ground => (waypoint.x - position.x).abs() <= radius,
            MovementMode::Free => position.distance(waypoint) <= radius,
        }
    }

    fn move_toward(&self, from: Vec2, to: Vec2, speed: f32) -> MotorIntent {
        match self.config.movement.mode {
            MovementMode::Ground => {
                let dx = to.x - from.x;
                if dx.abs() < MIN_AXIS_DELTA {
                    MotorIntent::Horizontal(0.0)
                } else {
                    MotorIntent::Horizontal(dx.signum() * speed)
                }
            }
            MovementMode::Free => MotorIntent::Planar((to - from).normalize_or_zero() * speed),
        }
    }

    fn halt(&self) -> MotorIntent {
        match self.config.movement.mode {
            MovementMode::Ground => MotorIntent::Horizontal(0.0),
            MovementMode::Free => MotorIntent::Planar(Vec2::ZERO),
        }
    }

    /// Вертикальный waypoint (Free) не дёргает facing
    fn face_toward(&mut self, from_x: f32, to_x: f32) {
        if (to_x - from_x).abs() >= MIN_AXIS_DELTA {
            self.facing = Facing::toward(from_x, to_x);
        }
    }
}
