//! Headless симуляция Malinalli
//!
//! Сцена: воин + черепаха против трёх архетипов врагов, стена посреди уровня.
//! Хост (этот файл) двигает воина, изредка бьёт врагов и зовёт taunt.
//!
//! Usage: malinalli_simulation [archetypes.toml] [seed]

use bevy::prelude::*;
use rand::Rng;

use malinalli_simulation::actor::{companion_bundle, spawn_enemy, warrior_bundle};
use malinalli_simulation::ai::{CombatFsm, PresentationCue};
use malinalli_simulation::components::{Obstacle, Position, Velocity};
use malinalli_simulation::{
    create_headless_app, log_error, log_info, step, world_snapshot, ArchetypeRegistry, Companion, ConfigError,
    DeterministicRng, HitLanded, TauntRequested, Warrior,
};

const TICKS: u64 = 1800;

fn main() {
    let mut args = std::env::args().skip(1);
    let archetypes_path = args.next();
    let seed = args.next().and_then(|raw| raw.parse().ok()).unwrap_or(42);

    let mut app = create_headless_app(seed);
    log_info(&format!("Starting Malinalli headless simulation (seed: {})", seed));

    if let Err(err) = setup_scene(&mut app, archetypes_path.as_deref()) {
        log_error(&format!("Scene setup failed: {}", err));
        std::process::exit(1);
    }

    let mut cues_seen = 0usize;
    for tick in 0..TICKS {
        drive_host(&mut app, tick);
        step(&mut app);

        cues_seen += app
            .world()
            .resource::<Events<PresentationCue>>()
            .iter_current_update_events()
            .count();

        if tick % 300 == 0 {
            let mut fsm_query = app.world_mut().query::<&CombatFsm>();
            let alive = fsm_query.iter(app.world()).filter(|f| !f.is_dead()).count();
            log_info(&format!(
                "Tick {}: {} entities, {} enemies alive, {} cues so far",
                tick,
                app.world().entities().len(),
                alive,
                cues_seen
            ));
        }
    }

    let snapshot = world_snapshot::<Position>(app.world_mut());
    log_info(&format!("Simulation complete! Position snapshot: {} bytes", snapshot.len()));
}

fn setup_scene(app: &mut App, archetypes_path: Option<&str>) -> Result<(), ConfigError> {
    let registry = match archetypes_path {
        Some(path) => ArchetypeRegistry::load(path)?,
        None => ArchetypeRegistry::builtin(),
    };

    let world = app.world_mut();
    world.spawn(warrior_bundle(Vec2::new(-6.0, 0.0)));
    world.spawn(companion_bundle(Vec2::new(-7.0, 0.0)));
    world.spawn(Obstacle::terrain(Vec2::new(2.0, 1.0), Vec2::new(0.25, 1.0)));

    spawn_enemy(
        world,
        registry.get("brute")?,
        Vec2::new(4.0, 0.0),
        vec![Vec2::new(6.0, 0.0), Vec2::new(0.0, 0.0)],
    )?;
    spawn_enemy(
        world,
        registry.get("shooter")?,
        Vec2::new(8.0, 0.5),
        vec![Vec2::new(10.0, 0.5), Vec2::new(7.0, 0.5)],
    )?;
    spawn_enemy(
        world,
        registry.get("swimmer")?,
        Vec2::new(-2.0, -3.0),
        vec![Vec2::new(-4.0, -3.0), Vec2::new(1.0, -2.0)],
    )?;
    spawn_enemy(
        world,
        registry.get("speedster")?,
        Vec2::new(12.0, 0.0),
        vec![Vec2::new(14.0, 0.0), Vec2::new(10.0, 0.0)],
    )?;

    Ok(())
}

/// "Игрок": воин ходит туда-обратно, иногда бьёт ближайшего врага,
/// черепаха раз в несколько секунд вызывает taunt.
fn drive_host(app: &mut App, tick: u64) {
    let world = app.world_mut();

    let mut warrior_query = world.query_filtered::<(Entity, &Position, &mut Velocity), With<Warrior>>();
    let warrior = warrior_query.iter_mut(world).next().map(|(entity, position, mut velocity)| {
        velocity.0.x = if (tick / 240) % 2 == 0 { 1.5 } else { -1.5 };
        (entity, position.0)
    });

    let mut companion_query =
        world.query_filtered::<(Entity, &Position), With<Companion>>();
    let companion = companion_query.iter(world).next().map(|(entity, position)| (entity, position.0));

    let mut enemy_query = world.query::<(Entity, &Position, &CombatFsm)>();
    let mut enemies: Vec<(Entity, Vec2)> = enemy_query
        .iter(world)
        .filter(|(_, _, fsm)| !fsm.is_dead())
        .map(|(entity, position, _)| (entity, position.0))
        .collect();
    enemies.sort_by_key(|(entity, _)| *entity);

    let roll: f32 = world.resource_mut::<DeterministicRng>().rng.gen_range(0.0..1.0);

    if let Some((warrior, warrior_pos)) = warrior {
        let nearest = enemies
            .iter()
            .filter(|(_, pos)| pos.distance(warrior_pos) < 1.8)
            .min_by(|a, b| a.1.distance(warrior_pos).total_cmp(&b.1.distance(warrior_pos)));

        if let Some(&(enemy, enemy_pos)) = nearest {
            if roll < 0.05 {
                world.send_event(HitLanded {
                    attacker: Some(warrior),
                    victim: enemy,
                    amount: 12,
                    point: enemy_pos,
                    direction: (enemy_pos - warrior_pos).normalize_or_zero(),
                });
            }
        }
    }

    if let Some((companion, companion_pos)) = companion {
        if tick % 420 == 210 {
            world.send_event(TauntRequested {
                source: companion,
                center: companion_pos,
                radius: 6.0,
                duration: 3.0,
                threat_boost: 5.0,
            });
        }
    }
}
