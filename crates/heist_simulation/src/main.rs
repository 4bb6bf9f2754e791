//! Headless симуляция миссии
//!
//! Скриптованный run без рендера: intruder бежит через патрулируемый склад,
//! сообщник бьёт его slap'ом, guards реагируют. Печатает переходы FSM.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use heist_simulation::{
    create_headless_app, spawn_roster, Captured, Difficulty, GuardRoster, GuardState, Incapacitated,
    Locomotion, NoiseEmission, NoiseProfile, Obstacles, Player, SlapIntent, Slappable, Slapper,
    SpawnPoint, Stamina,
};

const TICKS: usize = 1800;
const TICK: Duration = Duration::from_micros(16_667);
const INTRUDER_SPEED: f32 = 5.0;

fn main() {
    let seed = 42;
    println!("Starting heist headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    // Один app.update() == один fixed тик
    app.insert_resource(Time::<Fixed>::from_duration(TICK))
        .insert_resource(TimeUpdateStrategy::ManualDuration(TICK))
        .insert_resource(Difficulty::Normal.settings())
        .insert_resource(warehouse_obstacles())
        .insert_resource(warehouse_roster());

    let world = app.world_mut();
    let guards = spawn_roster(world);

    let intruder = world
        .spawn((
            Player,
            Slappable,
            Transform::from_xyz(0.0, 0.0, -30.0),
            Locomotion::Running,
            NoiseProfile::default(),
            NoiseEmission::default(),
            Stamina::default(),
            Slapper::default(),
        ))
        .id();

    let accomplice = world
        .spawn((Transform::from_xyz(1.0, 0.0, -30.0), Slapper::default()))
        .id();

    let mut last_states: Vec<Option<GuardState>> = vec![None; guards.len()];

    for tick in 0..TICKS {
        if tick == 1 {
            app.world_mut().send_event(SlapIntent { actor: accomplice });
        }

        step_intruder(app.world_mut(), intruder);
        app.update();

        for (slot, guard) in last_states.iter_mut().zip(&guards) {
            let Some(state) = app.world().get::<GuardState>(*guard).copied() else {
                continue;
            };
            if slot.map(|s| s.kind()) != Some(state.kind()) {
                println!("Tick {}: guard {:?} → {}", tick, guard, state.kind().as_str());
                *slot = Some(state);
            }
        }

        if app.world().get::<Captured>(intruder).is_some() {
            println!("Tick {}: intruder captured, mission failed", tick);
            break;
        }

        if tick % 300 == 0 {
            let position = app
                .world()
                .get::<Transform>(intruder)
                .map(|t| t.translation)
                .unwrap_or_default();
            println!("Tick {}: intruder at {:.1?}", tick, position);
        }
    }

    println!("Simulation complete!");
}

/// Host роль: intruder бежит к выходу по +Z (пока не оглушён/пойман)
fn step_intruder(world: &mut World, intruder: Entity) {
    let Ok(mut entity) = world.get_entity_mut(intruder) else {
        return;
    };

    if entity.contains::<Incapacitated>() || entity.contains::<Captured>() {
        return;
    }

    let speed = match entity.get::<Locomotion>() {
        Some(Locomotion::Running) => INTRUDER_SPEED,
        Some(Locomotion::Walking) => INTRUDER_SPEED * 0.5,
        _ => 0.0,
    };

    if let Some(mut transform) = entity.get_mut::<Transform>() {
        transform.translation.z += speed * TICK.as_secs_f32();
    }
}

fn warehouse_obstacles() -> Obstacles {
    Obstacles::new()
        .with_wall(Vec3::new(-8.0, 1.5, 0.0), Vec3::new(0.5, 1.5, 6.0))
        .with_wall(Vec3::new(8.0, 1.5, 5.0), Vec3::new(0.5, 1.5, 6.0))
        .with_wall(Vec3::new(0.0, 1.5, 15.0), Vec3::new(4.0, 1.5, 0.5))
}

fn warehouse_roster() -> GuardRoster {
    GuardRoster::with_spawn_points(vec![
        SpawnPoint::new(
            Vec3::new(-15.0, 0.0, -10.0),
            Vec3::X,
            vec![
                Vec3::new(-15.0, 0.0, -10.0),
                Vec3::new(-15.0, 0.0, 10.0),
                Vec3::new(-3.0, 0.0, 10.0),
            ],
        ),
        SpawnPoint::new(
            Vec3::new(15.0, 0.0, 0.0),
            Vec3::NEG_X,
            vec![Vec3::new(15.0, 0.0, 0.0), Vec3::new(15.0, 0.0, 20.0)],
        ),
        SpawnPoint::new(
            Vec3::new(0.0, 0.0, 25.0),
            Vec3::NEG_Z,
            vec![
                Vec3::new(0.0, 0.0, 25.0),
                Vec3::new(-10.0, 0.0, 25.0),
                Vec3::new(10.0, 0.0, 25.0),
            ],
        ),
    ])
}
