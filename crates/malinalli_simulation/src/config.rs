//! Конфигурация архетипов врагов.
//!
//! `EnemyConfig`: неизменяемая запись, собирается один раз при спавне и
//! раздаётся модулям (Sensor, ThreatTable, CombatFsm) по частям.
//! Архетипы: встроенные пресеты + TOML реестр (`data/archetypes.toml`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::components::LayerMask;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read archetype file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse archetype TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("archetype '{archetype}': invalid {field}: {reason}")]
    Invalid {
        archetype: String,
        field: &'static str,
        reason: String,
    },

    #[error("unknown archetype: {0}")]
    UnknownArchetype(String),
}

/// Параметры зрения
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Радиус обзора (метры)
    pub sight_range: f32,
    /// Полный угол конуса зрения (градусы, 0..=360)
    pub sight_angle: f32,
    /// Радиус "чутья": ловит цель даже за спиной (0 = выключено)
    pub near_sense: f32,
    /// Лимит кандидатов за тик
    pub max_candidates: usize,
    /// Минимальная |vx| для смены facing по движению
    pub min_move_for_facing: f32,
    /// false → facing берётся из ориентации тела
    pub use_movement_facing: bool,
    /// Кого ищем
    pub targets: LayerMask,
    /// Что блокирует обзор
    pub obstacles: LayerMask,
    /// Точка глаз относительно позиции (x отражается по facing)
    pub eye_offset: [f32; 2],
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            sight_range: 6.0,
            sight_angle: 75.0,
            near_sense: 0.0,
            max_candidates: 8,
            min_move_for_facing: 0.05,
            use_movement_facing: true,
            targets: LayerMask::PLAYERS,
            obstacles: LayerMask::TERRAIN,
            eye_offset: [0.3, 0.5],
        }
    }
}

/// Параметры таблицы угрозы и taunt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreatConfig {
    /// Пассивное затухание (threat/сек)
    pub decay_per_sec: f32,
    /// 1 урон = N threat
    pub damage_to_threat: f32,
    /// Максимальная длительность taunt (секунды)
    pub max_taunt_duration: f32,
}

impl Default for ThreatConfig {
    fn default() -> Self {
        Self {
            decay_per_sec: 2.0,
            damage_to_threat: 1.0,
            max_taunt_duration: 6.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementMode {
    /// Только горизонталь (платформер)
    #[default]
    Ground,
    /// Свободно в плоскости (под водой)
    Free,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub patrol_speed: f32,
    pub chase_speed: f32,
    /// Радиус "прибыли" на waypoint
    pub arrival_radius: f32,
    pub mode: MovementMode,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            patrol_speed: 2.0,
            chase_speed: 3.5,
            arrival_radius: 0.1,
            mode: MovementMode::Ground,
        }
    }
}

/// Как наносится удар
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttackStyle {
    /// Ближний бой: один противник (или все в радиусе при `sweep`)
    Melee {
        #[serde(default)]
        sweep: bool,
    },
    /// Снаряд в цель с упреждением `lead` секунд
    Ranged {
        projectile_speed: f32,
        #[serde(default)]
        lead: f32,
        lifetime: f32,
        radius: f32,
        /// Яд поверх урона попадания
        #[serde(default)]
        poison: Option<PoisonConfig>,
    },
    /// Рывок: импульс к цели, повышенный урон только пока длится рывок
    Dash {
        /// Импульс (м/с), добавляется к скорости один раз
        force: f32,
        duration: f32,
        damage: u32,
        /// Радиус контакта вокруг тела
        #[serde(default = "default_contact_radius")]
        radius: f32,
    },
}

fn default_contact_radius() -> f32 {
    0.6
}

/// Урон со временем от отравленного снаряда
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoisonConfig {
    pub damage: u32,
    pub ticks: u32,
    /// Секунды между тиками яда
    pub interval: f32,
}

impl Default for PoisonConfig {
    fn default() -> Self {
        Self {
            damage: 5,
            ticks: 4,
            interval: 1.0,
        }
    }
}

impl Default for AttackStyle {
    fn default() -> Self {
        AttackStyle::Melee { sweep: false }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackConfig {
    pub damage: u32,
    /// Дистанция атаки от attack origin до цели
    pub range: f32,
    pub cooldown: f32,
    /// Замах перед ударом (0 = мгновенный удар)
    pub windup: f32,
    /// Отдых после удара/рывка, враг стоит (0 = сразу Ready)
    pub recovery: f32,
    /// Attack origin относительно позиции (x отражается по facing)
    pub origin: [f32; 2],
    /// Кого можно задеть
    pub victims: LayerMask,
    pub style: AttackStyle,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            damage: 10,
            range: 1.7,
            cooldown: 1.2,
            windup: 0.0,
            recovery: 0.0,
            origin: [0.6, 0.0],
            victims: LayerMask::PLAYERS,
            style: AttackStyle::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviourConfig {
    /// Сколько секунд без цели в Chase до возврата в Patrol
    pub lost_sight_grace: f32,
}

impl Default for BehaviourConfig {
    fn default() -> Self {
        Self { lost_sight_grace: 2.0 }
    }
}

/// Полная конфигурация архетипа врага
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Имя архетипа (заполняется из ключа реестра)
    pub name: String,
    pub max_health: u32,
    pub sensor: SensorConfig,
    pub threat: ThreatConfig,
    pub movement: MovementConfig,
    pub attack: AttackConfig,
    pub behaviour: BehaviourConfig,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self::brute()
    }
}

impl EnemyConfig {
    /// Наземный мечник (дефолты EnemyStats)
    pub fn brute() -> Self {
        Self {
            name: "brute".to_string(),
            max_health: 30,
            sensor: SensorConfig::default(),
            threat: ThreatConfig::default(),
            movement: MovementConfig::default(),
            attack: AttackConfig::default(),
            behaviour: BehaviourConfig::default(),
        }
    }

    /// Стрелок: держит дистанцию, бьёт снарядами по воину
    pub fn shooter() -> Self {
        Self {
            name: "shooter".to_string(),
            max_health: 20,
            sensor: SensorConfig {
                sight_range: 8.0,
                targets: LayerMask::WARRIOR,
                ..SensorConfig::default()
            },
            threat: ThreatConfig::default(),
            movement: MovementConfig {
                patrol_speed: 1.5,
                chase_speed: 2.0,
                ..MovementConfig::default()
            },
            attack: AttackConfig {
                damage: 8,
                range: 6.0,
                cooldown: 1.5,
                victims: LayerMask::WARRIOR,
                style: AttackStyle::Ranged {
                    projectile_speed: 12.0,
                    lead: 0.0,
                    lifetime: 2.0,
                    radius: 0.3,
                    poison: None,
                },
                ..AttackConfig::default()
            },
            behaviour: BehaviourConfig::default(),
        }
    }

    /// Подводный хищник: плавает в плоскости, замах + удар по площади
    pub fn swimmer() -> Self {
        Self {
            name: "swimmer".to_string(),
            max_health: 45,
            sensor: SensorConfig {
                sight_range: 7.0,
                sight_angle: 120.0,
                near_sense: 1.5,
                ..SensorConfig::default()
            },
            threat: ThreatConfig::default(),
            movement: MovementConfig {
                patrol_speed: 1.5,
                chase_speed: 4.0,
                arrival_radius: 0.3,
                mode: MovementMode::Free,
            },
            attack: AttackConfig {
                damage: 14,
                range: 1.2,
                cooldown: 2.0,
                windup: 0.4,
                style: AttackStyle::Melee { sweep: true },
                ..AttackConfig::default()
            },
            behaviour: BehaviourConfig { lost_sight_grace: 3.0 },
        }
    }

    /// Спидстер: заряжает рывок, пролетает сквозь цель, долго отдыхает
    pub fn speedster() -> Self {
        Self {
            name: "speedster".to_string(),
            max_health: 25,
            sensor: SensorConfig::default(),
            threat: ThreatConfig::default(),
            movement: MovementConfig {
                patrol_speed: 3.0,
                chase_speed: 3.0,
                ..MovementConfig::default()
            },
            attack: AttackConfig {
                range: 5.0,
                cooldown: 2.4,
                windup: 0.8,
                recovery: 2.0,
                style: AttackStyle::Dash {
                    force: 20.0,
                    duration: 0.4,
                    damage: 25,
                    radius: default_contact_radius(),
                },
                ..AttackConfig::default()
            },
            behaviour: BehaviourConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = self.name.as_str();

        ensure(self.max_health > 0, name, "max_health", "must be positive")?;

        let sensor = &self.sensor;
        ensure(positive(sensor.sight_range), name, "sensor.sight_range", POSITIVE)?;
        ensure(
            (0.0..=360.0).contains(&sensor.sight_angle),
            name,
            "sensor.sight_angle",
            "must be within 0..=360 degrees",
        )?;
        ensure(non_negative(sensor.near_sense), name, "sensor.near_sense", NON_NEGATIVE)?;
        ensure(sensor.max_candidates > 0, name, "sensor.max_candidates", "must be at least 1")?;
        ensure(
            non_negative(sensor.min_move_for_facing),
            name,
            "sensor.min_move_for_facing",
            NON_NEGATIVE,
        )?;

        let threat = &self.threat;
        ensure(non_negative(threat.decay_per_sec), name, "threat.decay_per_sec", NON_NEGATIVE)?;
        ensure(non_negative(threat.damage_to_threat), name, "threat.damage_to_threat", NON_NEGATIVE)?;
        ensure(
            non_negative(threat.max_taunt_duration),
            name,
            "threat.max_taunt_duration",
            NON_NEGATIVE,
        )?;

        let movement = &self.movement;
        ensure(non_negative(movement.patrol_speed), name, "movement.patrol_speed", NON_NEGATIVE)?;
        ensure(non_negative(movement.chase_speed), name, "movement.chase_speed", NON_NEGATIVE)?;
        ensure(positive(movement.arrival_radius), name, "movement.arrival_radius", POSITIVE)?;

        let attack = &self.attack;
        ensure(positive(attack.range), name, "attack.range", POSITIVE)?;
        ensure(non_negative(attack.cooldown), name, "attack.cooldown", NON_NEGATIVE)?;
        ensure(non_negative(attack.windup), name, "attack.windup", NON_NEGATIVE)?;
        ensure(non_negative(attack.recovery), name, "attack.recovery", NON_NEGATIVE)?;
        ensure(
            attack.origin.iter().all(|v| v.is_finite()),
            name,
            "attack.origin",
            "must be finite",
        )?;
        match attack.style {
            AttackStyle::Melee { .. } => {}
            AttackStyle::Ranged {
                projectile_speed,
                lead,
                lifetime,
                radius,
                poison,
            } => {
                ensure(positive(projectile_speed), name, "attack.style.projectile_speed", POSITIVE)?;
                ensure(non_negative(lead), name, "attack.style.lead", NON_NEGATIVE)?;
                ensure(positive(lifetime), name, "attack.style.lifetime", POSITIVE)?;
                ensure(positive(radius), name, "attack.style.radius", POSITIVE)?;
                if let Some(poison) = poison {
                    ensure(positive(poison.interval), name, "attack.style.poison.interval", POSITIVE)?;
                }
            }
            AttackStyle::Dash {
                force,
                duration,
                radius,
                ..
            } => {
                ensure(positive(force), name, "attack.style.force", POSITIVE)?;
                ensure(positive(duration), name, "attack.style.duration", POSITIVE)?;
                ensure(positive(radius), name, "attack.style.radius", POSITIVE)?;
            }
        }

        ensure(
            non_negative(self.behaviour.lost_sight_grace),
            name,
            "behaviour.lost_sight_grace",
            NON_NEGATIVE,
        )?;

        Ok(())
    }
}

const POSITIVE: &str = "must be positive and finite";
const NON_NEGATIVE: &str = "must be non-negative and finite";

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn non_negative(value: f32) -> bool {
    value.is_finite() && value >= 0.0
}

fn ensure(condition: bool, archetype: &str, field: &'static str, reason: &str) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            archetype: archetype.to_string(),
            field,
            reason: reason.to_string(),
        })
    }
}

/// Реестр архетипов по имени
#[derive(Debug, Clone, Default)]
pub struct ArchetypeRegistry {
    archetypes: BTreeMap<String, EnemyConfig>,
}

impl ArchetypeRegistry {
    /// Встроенные пресеты: brute, shooter, swimmer, speedster
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        for config in [
            EnemyConfig::brute(),
            EnemyConfig::shooter(),
            EnemyConfig::swimmer(),
            EnemyConfig::speedster(),
        ] {
            registry.archetypes.insert(config.name.clone(), config);
        }
        registry
    }

    /// Парсинг TOML: каждая top-level таблица = один архетип.
    ///
    /// Пропущенные поля берутся из дефолтов, каждый архетип валидируется.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let parsed: BTreeMap<String, EnemyConfig> = toml::from_str(raw)?;

        let mut archetypes = BTreeMap::new();
        for (name, mut config) in parsed {
            config.name = name.clone();
            config.validate()?;
            archetypes.insert(name, config);
        }

        Ok(Self { archetypes })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn get(&self, name: &str) -> Result<&EnemyConfig, ConfigError> {
        self.archetypes
            .get(name)
            .ok_or_else(|| ConfigError::UnknownArchetype(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.archetypes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_presets_are_valid() {
        let registry = ArchetypeRegistry::builtin();
        assert_eq!(registry.len(), 4);
        for name in ["brute", "shooter", "swimmer", "speedster"] {
            let config = registry.get(name).expect("builtin archetype");
            config.validate().expect("builtin archetype must validate");
        }
    }

    #[test]
    fn test_enemy_stats_defaults() {
        let config = EnemyConfig::default();
        assert_eq!(config.movement.patrol_speed, 2.0);
        assert_eq!(config.movement.chase_speed, 3.5);
        assert_eq!(config.attack.damage, 10);
        assert_eq!(config.attack.range, 1.7);
        assert_eq!(config.attack.cooldown, 1.2);
        assert_eq!(config.sensor.sight_range, 6.0);
        assert_eq!(config.sensor.sight_angle, 75.0);
        assert_eq!(config.threat.max_taunt_duration, 6.0);
    }

    #[test]
    fn test_parse_partial_archetype() {
        let raw = r#"
            [lurker]
            max_health = 12

            [lurker.sensor]
            sight_range = 4.5
            targets = ["companion"]

            [lurker.attack.style]
            type = "melee"
            sweep = true
        "#;

        let registry = ArchetypeRegistry::from_toml_str(raw).expect("valid toml");
        let lurker = registry.get("lurker").expect("lurker parsed");
        assert_eq!(lurker.name, "lurker");
        assert_eq!(lurker.max_health, 12);
        assert_eq!(lurker.sensor.sight_range, 4.5);
        assert_eq!(lurker.sensor.targets, LayerMask::COMPANION);
        // Не указано: дефолт
        assert_eq!(lurker.sensor.sight_angle, 75.0);
        assert_eq!(lurker.attack.style, AttackStyle::Melee { sweep: true });
    }

    #[test]
    fn test_parse_ranged_style() {
        let raw = r#"
            [sniper.attack]
            range = 7.0

            [sniper.attack.style]
            type = "ranged"
            projectile_speed = 15.0
            lifetime = 1.5
            radius = 0.25
        "#;

        let registry = ArchetypeRegistry::from_toml_str(raw).expect("valid toml");
        let sniper = registry.get("sniper").expect("sniper parsed");
        assert!(matches!(
            sniper.attack.style,
            AttackStyle::Ranged { projectile_speed, lead, .. } if projectile_speed == 15.0 && lead == 0.0
        ));
    }

    #[test]
    fn test_invalid_archetype_rejected() {
        let raw = r#"
            [broken.sensor]
            max_candidates = 0
        "#;

        let err = ArchetypeRegistry::from_toml_str(raw).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: "sensor.max_candidates", .. }
        ));
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let cases: [(&str, fn(&mut EnemyConfig)); 5] = [
            ("sensor.sight_range", |c| c.sensor.sight_range = f32::INFINITY),
            ("sensor.near_sense", |c| c.sensor.near_sense = f32::NAN),
            ("threat.max_taunt_duration", |c| c.threat.max_taunt_duration = f32::INFINITY),
            ("movement.chase_speed", |c| c.movement.chase_speed = f32::INFINITY),
            ("attack.range", |c| c.attack.range = f32::INFINITY),
        ];

        for (expected, corrupt) in cases {
            let mut config = EnemyConfig::brute();
            corrupt(&mut config);
            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == expected),
                "{expected} accepted a non-finite value"
            );
        }
    }

    #[test]
    fn test_parse_dash_and_poison_styles() {
        let raw = r#"
            [charger.attack]
            windup = 0.5
            recovery = 1.0

            [charger.attack.style]
            type = "dash"
            force = 15.0
            duration = 0.3
            damage = 20

            [spitter.attack.style]
            type = "ranged"
            projectile_speed = 10.0
            lifetime = 2.0
            radius = 0.3
            poison = { damage = 5, ticks = 4, interval = 1.0 }
        "#;

        let registry = ArchetypeRegistry::from_toml_str(raw).expect("valid toml");
        let charger = registry.get("charger").expect("charger parsed");
        assert_eq!(charger.attack.recovery, 1.0);
        assert_eq!(
            charger.attack.style,
            AttackStyle::Dash {
                force: 15.0,
                duration: 0.3,
                damage: 20,
                radius: 0.6,
            }
        );

        let spitter = registry.get("spitter").expect("spitter parsed");
        assert!(matches!(
            spitter.attack.style,
            AttackStyle::Ranged { poison: Some(p), .. } if p == PoisonConfig::default()
        ));
    }

    #[test]
    fn test_unknown_archetype() {
        let registry = ArchetypeRegistry::builtin();
        assert!(matches!(
            registry.get("dragon"),
            Err(ConfigError::UnknownArchetype(name)) if name == "dragon"
        ));
    }

    #[test]
    fn test_load_shipped_archetypes() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/archetypes.toml");
        let registry = ArchetypeRegistry::load(&path).expect("shipped archetypes load");
        assert!(registry.get("brute").is_ok());
        assert!(registry.get("shooter").is_ok());
        assert!(registry.get("swimmer").is_ok());
        assert!(matches!(
            registry.get("speedster").map(|c| c.attack.style),
            Ok(AttackStyle::Dash { damage: 25, .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ArchetypeRegistry::load("does/not/exist.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
