//! Combat integration test
//!
//! Headless App, тики вручную через `step()`.
//!
//! Проверяем:
//! - Patrol / Chase / Attack на живом ECS
//! - Урон → threat, taunt, смерть и очистка ссылок
//! - Снаряды (и яд), sweep удар, рывок, guard черепахи
//! - FixedUpdate мост

use bevy::prelude::*;
use malinalli_simulation::actor::{companion_bundle, spawn_enemy, warrior_bundle};
use malinalli_simulation::ai::{CombatFsm, CombatState, PresentationCue, TargetResolver, ThreatTable};
use malinalli_simulation::combat::{DashHitbox, Poisoned, Projectile};
use malinalli_simulation::config::{EnemyConfig, PoisonConfig, ThreatConfig};
use malinalli_simulation::physics::MotorIntent;
use malinalli_simulation::*;

/// Helper: App + сцена без врагов
fn create_combat_app() -> App {
    create_headless_app(42)
}

/// Helper: спавн врага с валидным конфигом
fn spawn(app: &mut App, config: &EnemyConfig, position: Vec2, route: Vec<Vec2>) -> Entity {
    spawn_enemy(app.world_mut(), config, position, route).expect("valid enemy config")
}

/// Helper: тик + presentation cues этого тика
fn step_collect(app: &mut App) -> Vec<PresentationCue> {
    step(app);
    app.world()
        .resource::<Events<PresentationCue>>()
        .iter_current_update_events()
        .copied()
        .collect()
}

fn hit(attacker: Option<Entity>, victim: Entity, amount: u32) -> HitLanded {
    HitLanded {
        attacker,
        victim,
        amount,
        point: Vec2::ZERO,
        direction: Vec2::X,
    }
}

fn fsm_state(app: &App, entity: Entity) -> Option<CombatState> {
    app.world().get::<CombatFsm>(entity).map(|f| f.state())
}

/// Test: без целей враг ходит по маршруту и разворачивается на waypoint
#[test]
fn test_enemy_patrols_between_waypoints() {
    let mut app = create_combat_app();
    let enemy = spawn(
        &mut app,
        &EnemyConfig::brute(),
        Vec2::ZERO,
        vec![Vec2::new(5.0, 0.0), Vec2::new(-5.0, 0.0)],
    );

    let mut turned_at = None;
    for _ in 0..400 {
        step(&mut app);
        assert_eq!(fsm_state(&app, enemy), Some(CombatState::Patrol));

        let fsm = app.world().get::<CombatFsm>(enemy).expect("enemy alive");
        if fsm.patrol_index() == 1 {
            turned_at = app.world().get::<Position>(enemy).map(|p| p.0);
            break;
        }
    }

    let turned_at = turned_at.expect("enemy reached (5, 0)");
    // Позиция после Motion фазы этого тика: ≤ arrival radius + один шаг
    assert!((turned_at.x - 5.0).abs() <= 0.1 + 2.0 / 60.0 + 1e-4, "turned at {turned_at:?}");
    assert_eq!(app.world().get::<MotorIntent>(enemy), Some(&MotorIntent::Horizontal(-2.0)));
}

/// Test: враг видит воина, догоняет и бьёт
#[test]
fn test_enemy_chases_and_strikes_warrior() {
    let mut app = create_combat_app();
    let warrior = app.world_mut().spawn(warrior_bundle(Vec2::new(4.0, 0.0))).id();
    let enemy = spawn(&mut app, &EnemyConfig::brute(), Vec2::ZERO, vec![]);

    let mut cues = Vec::new();
    for _ in 0..90 {
        cues.extend(step_collect(&mut app));
        if app.world().get::<Health>(warrior).map(|h| h.current) != Some(100) {
            break;
        }
    }

    assert_eq!(app.world().get::<Health>(warrior).map(|h| h.current), Some(90));
    assert_eq!(fsm_state(&app, enemy), Some(CombatState::Attack));
    assert!(cues.contains(&PresentationCue::StateEntered {
        entity: enemy,
        state: CombatState::Chase
    }));
    assert!(cues.contains(&PresentationCue::StateEntered {
        entity: enemy,
        state: CombatState::Attack
    }));
    assert!(cues.contains(&PresentationCue::Struck { entity: enemy }));
}

/// Test: 10 урона → +10 threat; видимая цель удерживается (anti-flicker)
#[test]
fn test_damage_builds_threat() {
    let mut app = create_combat_app();
    let config = EnemyConfig {
        threat: ThreatConfig {
            decay_per_sec: 0.0,
            ..ThreatConfig::default()
        },
        ..EnemyConfig::brute()
    };
    let warrior = app.world_mut().spawn(warrior_bundle(Vec2::new(3.0, 0.0))).id();
    let companion = app.world_mut().spawn(companion_bundle(Vec2::new(-3.0, 0.0))).id();
    let enemy = spawn(&mut app, &config, Vec2::ZERO, vec![]);

    app.world_mut().send_event(hit(Some(companion), enemy, 10));
    step(&mut app); // Combat: урон
    step(&mut app); // Perception: threat

    let threat = app.world().get::<ThreatTable>(enemy).expect("enemy has threat table");
    assert_eq!(threat.threat_of(companion), 10.0);
    assert_eq!(app.world().get::<Health>(enemy).map(|h| h.current), Some(20));

    let resolver = app.world().get::<TargetResolver>(enemy).expect("enemy has resolver");
    assert_eq!(resolver.current(), Some(warrior));
}

/// Test: taunt черепахи перебивает видимого воина, потом истекает
#[test]
fn test_taunt_forces_target_then_expires() {
    let mut app = create_combat_app();
    app.world_mut().spawn(warrior_bundle(Vec2::new(3.0, 0.0)));
    let companion = app.world_mut().spawn(companion_bundle(Vec2::new(-4.0, 0.0))).id();
    let enemy = spawn(&mut app, &EnemyConfig::brute(), Vec2::ZERO, vec![]);

    app.world_mut().send_event(TauntRequested {
        source: companion,
        center: Vec2::new(-4.0, 0.0),
        radius: 6.0,
        duration: 0.5,
        threat_boost: 0.0,
    });
    step(&mut app);

    let resolver = app.world().get::<TargetResolver>(enemy).expect("enemy has resolver");
    assert_eq!(resolver.current(), Some(companion));
    assert!(app.world().get::<ThreatTable>(enemy).is_some_and(|t| t.is_taunted()));

    for _ in 0..40 {
        step(&mut app);
    }
    assert!(!app.world().get::<ThreatTable>(enemy).is_some_and(|t| t.is_taunted()));
}

/// Test: taunt с бесконечным радиусом отбрасывается целиком
#[test]
fn test_taunt_with_infinite_radius_is_ignored() {
    let mut app = create_combat_app();
    let warrior = app.world_mut().spawn(warrior_bundle(Vec2::new(3.0, 0.0))).id();
    let companion = app.world_mut().spawn(companion_bundle(Vec2::new(-4.0, 0.0))).id();
    let enemy = spawn(&mut app, &EnemyConfig::brute(), Vec2::ZERO, vec![]);

    for radius in [f32::INFINITY, f32::NAN] {
        app.world_mut().send_event(TauntRequested {
            source: companion,
            center: Vec2::new(-4.0, 0.0),
            radius,
            duration: 5.0,
            threat_boost: 3.0,
        });
        step(&mut app);
    }

    let threat = app.world().get::<ThreatTable>(enemy).expect("enemy has threat table");
    assert!(!threat.is_taunted());
    assert_eq!(threat.threat_of(companion), 0.0);
    assert_eq!(
        app.world().get::<TargetResolver>(enemy).and_then(|r| r.current()),
        Some(warrior)
    );
}

/// Test: смерть врага → Dead, стоп, деспавн после corpse_linger
#[test]
fn test_enemy_death_freezes_and_despawns() {
    let mut app = create_combat_app();
    let enemy = spawn(
        &mut app,
        &EnemyConfig::brute(),
        Vec2::ZERO,
        vec![Vec2::new(5.0, 0.0), Vec2::new(-5.0, 0.0)],
    );

    app.world_mut().send_event(hit(None, enemy, 100));
    step(&mut app); // Combat: EntityDied
    let cues = step_collect(&mut app); // Aftermath: Dead

    assert_eq!(fsm_state(&app, enemy), Some(CombatState::Dead));
    assert!(app.world().get::<Dead>(enemy).is_some());
    assert_eq!(app.world().get::<MotorIntent>(enemy), Some(&MotorIntent::Stop));
    assert!(cues.contains(&PresentationCue::Died { entity: enemy }));

    let frozen = app.world().get::<Position>(enemy).map(|p| p.0);
    for _ in 0..30 {
        let cues = step_collect(&mut app);
        assert!(cues.iter().all(|c| c.entity() != enemy));
        assert_eq!(app.world().get::<Position>(enemy).map(|p| p.0), frozen);
        assert_eq!(fsm_state(&app, enemy), Some(CombatState::Dead));
    }

    // 1.5s = 90 тиков
    for _ in 0..70 {
        step(&mut app);
    }
    assert!(app.world().get_entity(enemy).is_err());
}

/// Test: убитый воин исчезает из threat таблиц и резолверов
#[test]
fn test_fallen_target_is_forgotten() {
    let mut app = create_combat_app();
    let warrior = app.world_mut().spawn(warrior_bundle(Vec2::new(3.0, 0.0))).id();
    let enemy = spawn(&mut app, &EnemyConfig::brute(), Vec2::ZERO, vec![]);

    app.world_mut().send_event(hit(Some(warrior), enemy, 5));
    step(&mut app);
    assert_eq!(
        app.world().get::<TargetResolver>(enemy).and_then(|r| r.current()),
        Some(warrior)
    );

    app.world_mut().send_event(hit(None, warrior, 500));
    step(&mut app); // threat записан, воин убит
    assert!(app.world().get::<ThreatTable>(enemy).is_some_and(|t| t.threat_of(warrior) > 0.0));

    step(&mut app); // Aftermath: очистка
    let threat = app.world().get::<ThreatTable>(enemy).expect("enemy has threat table");
    assert!(threat.is_empty());
    assert_eq!(app.world().get::<TargetResolver>(enemy).and_then(|r| r.current()), None);
    assert!(app.world().get::<Dead>(warrior).is_some());
}

/// Test: стрелок выпускает снаряд, тот долетает до воина
#[test]
fn test_shooter_projectile_hits_warrior() {
    let mut app = create_combat_app();
    let warrior = app.world_mut().spawn(warrior_bundle(Vec2::new(5.0, 0.0))).id();
    spawn(&mut app, &EnemyConfig::shooter(), Vec2::ZERO, vec![]);

    let mut launched = false;
    for _ in 0..60 {
        step(&mut app);
        let mut projectiles = app.world_mut().query::<&Projectile>();
        launched |= projectiles.iter(app.world()).count() > 0;
        if app.world().get::<Health>(warrior).map(|h| h.current) != Some(100) {
            break;
        }
    }

    assert!(launched);
    assert_eq!(app.world().get::<Health>(warrior).map(|h| h.current), Some(92));
}

/// Test: снаряд разбивается о стену
#[test]
fn test_projectile_stopped_by_terrain() {
    let mut app = create_combat_app();
    let shooter = app.world_mut().spawn(Position(Vec2::new(10.0, 10.0))).id();
    let warrior = app.world_mut().spawn(warrior_bundle(Vec2::new(5.0, 0.0))).id();
    app.world_mut()
        .spawn(Obstacle::terrain(Vec2::new(3.0, 0.0), Vec2::new(0.1, 2.0)));
    let projectile = app
        .world_mut()
        .spawn((
            Projectile::new(shooter, 8, 0.3, LayerMask::WARRIOR, 2.0),
            Position(Vec2::ZERO),
            Velocity(Vec2::new(12.0, 0.0)),
        ))
        .id();

    for _ in 0..60 {
        step(&mut app);
    }

    assert!(app.world().get_entity(projectile).is_err());
    assert_eq!(app.world().get::<Health>(warrior).map(|h| h.current), Some(100));
}

/// Test: пловец после замаха бьёт всех в радиусе
#[test]
fn test_swimmer_windup_sweeps_both_players() {
    let mut app = create_combat_app();
    let warrior = app.world_mut().spawn(warrior_bundle(Vec2::new(1.0, 0.0))).id();
    let companion = app.world_mut().spawn(companion_bundle(Vec2::new(1.2, 0.3))).id();
    let swimmer = spawn(&mut app, &EnemyConfig::swimmer(), Vec2::ZERO, vec![]);

    let mut cues = Vec::new();
    for _ in 0..60 {
        cues.extend(step_collect(&mut app));
        if app.world().get::<Health>(warrior).map(|h| h.current) != Some(100) {
            break;
        }
    }

    assert!(cues.contains(&PresentationCue::WindupStarted { entity: swimmer }));
    assert_eq!(app.world().get::<Health>(warrior).map(|h| h.current), Some(86));
    assert_eq!(app.world().get::<GuardedHealth>(companion).map(|h| h.current), Some(146));
}

/// Test: одиночный удар по маске со своим слоем не тратится на самого атакующего
#[test]
fn test_single_strike_skips_attacker_in_victim_mask() {
    let mut app = create_combat_app();
    let mut config = EnemyConfig::brute();
    config.attack.victims = LayerMask::PLAYERS | LayerMask::ENEMY;
    // Враг спавнится первым: в SpatialIndex он раньше воина
    let enemy = spawn(&mut app, &config, Vec2::ZERO, vec![]);
    let warrior = app.world_mut().spawn(warrior_bundle(Vec2::new(1.5, 0.0))).id();

    for _ in 0..30 {
        step(&mut app);
        if app.world().get::<Health>(warrior).map(|h| h.current) != Some(100) {
            break;
        }
    }

    assert_eq!(app.world().get::<Health>(warrior).map(|h| h.current), Some(90));
    assert_eq!(app.world().get::<Health>(enemy).map(|h| h.current), Some(30));
}

/// Test: спидстер замахивается, пролетает сквозь воина, бьёт ровно один раз
#[test]
fn test_speedster_dash_hits_once() {
    let mut app = create_combat_app();
    let warrior = app.world_mut().spawn(warrior_bundle(Vec2::new(4.0, 0.0))).id();
    let speedster = spawn(&mut app, &EnemyConfig::speedster(), Vec2::ZERO, vec![]);

    let mut hitbox_ticks = 0;
    let mut warrior_hits = 0;
    // windup 0.8 + dash 0.4 + часть recovery, до следующего замаха далеко
    for _ in 0..150 {
        step(&mut app);
        if app.world().get::<DashHitbox>(speedster).is_some() {
            hitbox_ticks += 1;
        }
        warrior_hits += app
            .world()
            .resource::<Events<DamageDealt>>()
            .iter_current_update_events()
            .filter(|e| e.target == warrior)
            .count();
    }

    assert_eq!(warrior_hits, 1);
    assert_eq!(app.world().get::<Health>(warrior).map(|h| h.current), Some(75));
    assert!((20..=26).contains(&hitbox_ticks), "hitbox lived {hitbox_ticks} ticks");
    assert!(app.world().get::<DashHitbox>(speedster).is_none());
}

/// Test: смерть посреди рывка снимает хитбокс, воин цел
#[test]
fn test_speedster_death_mid_dash_drops_hitbox() {
    let mut app = create_combat_app();
    let warrior = app.world_mut().spawn(warrior_bundle(Vec2::new(4.0, 0.0))).id();
    let speedster = spawn(&mut app, &EnemyConfig::speedster(), Vec2::ZERO, vec![]);

    let mut dashing = false;
    for _ in 0..80 {
        step(&mut app);
        if app.world().get::<DashHitbox>(speedster).is_some() {
            dashing = true;
            break;
        }
    }
    assert!(dashing);

    app.world_mut().send_event(hit(None, speedster, 100));
    step(&mut app); // Combat: EntityDied
    step(&mut app); // Aftermath: Dead, хитбокс снят в Combat этого тика

    assert_eq!(fsm_state(&app, speedster), Some(CombatState::Dead));
    assert!(app.world().get::<DashHitbox>(speedster).is_none());
    assert_eq!(app.world().get::<Health>(warrior).map(|h| h.current), Some(100));
}

/// Test: отравленный снаряд: удар + урон со временем, потом яд спадает
#[test]
fn test_poisoned_projectile_ticks_damage() {
    let mut app = create_combat_app();
    let shooter = app.world_mut().spawn(Position(Vec2::new(0.0, 10.0))).id();
    let warrior = app.world_mut().spawn(warrior_bundle(Vec2::new(5.0, 0.0))).id();
    let poison = PoisonConfig {
        damage: 5,
        ticks: 2,
        interval: 0.5,
    };
    app.world_mut().spawn((
        Projectile::new(shooter, 8, 0.3, LayerMask::WARRIOR, 2.0).with_poison(Some(poison)),
        Position(Vec2::ZERO),
        Velocity(Vec2::new(12.0, 0.0)),
    ));

    let mut poisoned_seen = false;
    for _ in 0..60 {
        step(&mut app);
        poisoned_seen |= app.world().get::<Poisoned>(warrior).is_some();
    }
    assert!(poisoned_seen);
    assert_eq!(app.world().get::<Health>(warrior).map(|h| h.current), Some(87));

    for _ in 0..60 {
        step(&mut app);
    }
    assert_eq!(app.world().get::<Health>(warrior).map(|h| h.current), Some(82));
    assert!(app.world().get::<Poisoned>(warrior).is_none());
}

/// Test: guard черепахи режет урон, knockback уходит в Velocity
#[test]
fn test_companion_guard_reduces_damage() {
    let mut app = create_combat_app();
    let companion = app.world_mut().spawn(companion_bundle(Vec2::ZERO)).id();
    if let Some(mut health) = app.world_mut().get_mut::<GuardedHealth>(companion) {
        health.set_guarding(true, 0.0);
    }

    app.world_mut().send_event(hit(None, companion, 10));
    step(&mut app);

    assert_eq!(app.world().get::<GuardedHealth>(companion).map(|h| h.current), Some(155));
    assert!(app.world().get::<Velocity>(companion).is_some_and(|v| v.0.x > 0.0));
}

/// Test: SimulationTick крутится из FixedUpdate при обычном `App::update`
#[test]
fn test_fixed_update_bridge_advances_clock() {
    use bevy::time::TimeUpdateStrategy;
    use std::time::Duration;

    let mut app = App::new();
    app.add_plugins((MinimalPlugins, SimulationPlugin::default()))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / 60.0)));
    app.finish();
    app.cleanup();

    for _ in 0..10 {
        app.update();
    }

    let clock = app.world().resource::<SimClock>();
    assert!(clock.tick >= 5, "ticks: {}", clock.tick);
    assert!((clock.elapsed - clock.tick as f32 / 60.0).abs() < 1e-3);
}
