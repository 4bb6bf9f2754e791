//! AI movement systems.

use bevy::prelude::*;

use crate::components::{Captured, Incapacitated, MovementCommand};

/// Система: headless исполнитель MovementCommand
///
/// Прямая линия к цели со скоростью команды, без pathfinding/физики.
/// Не перелетаем цель: последний шаг ставит ровно в точку.
/// Поворот только по горизонтали (guard смотрит куда идёт).
pub fn apply_movement_commands(
    mut query: Query<(&MovementCommand, &mut Transform), (Without<Incapacitated>, Without<Captured>)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (command, mut transform) in query.iter_mut() {
        let MovementCommand::MoveToPosition { target, speed } = *command else {
            continue;
        };

        let to_target = target - transform.translation;
        let distance = to_target.length();
        if distance <= f32::EPSILON {
            continue;
        }

        let step = speed.max(0.0) * delta;
        if step >= distance {
            transform.translation = target;
        } else {
            transform.translation += to_target / distance * step;
        }

        let planar = Vec3::new(to_target.x, 0.0, to_target.z);
        if planar.length_squared() > 1e-6 {
            transform.look_to(planar, Vec3::Y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn app_with_step(step_ms: u64) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(Time::<Fixed>::from_duration(Duration::from_millis(step_ms)))
            .insert_resource(bevy::time::TimeUpdateStrategy::ManualDuration(
                Duration::from_millis(step_ms),
            ))
            .add_systems(FixedUpdate, apply_movement_commands);
        app
    }

    #[test]
    fn test_moves_toward_target_without_overshoot() {
        let mut app = app_with_step(20);
        let mover = app
            .world_mut()
            .spawn((
                Transform::default(),
                MovementCommand::MoveToPosition {
                    target: Vec3::new(1.0, 0.0, 0.0),
                    speed: 5.0,
                },
            ))
            .id();

        // 1 м при 5 m/s = 0.2 сек; даём с запасом
        for _ in 0..30 {
            app.update();
        }

        let position = app.world().get::<Transform>(mover).unwrap().translation;
        assert!(position.distance(Vec3::new(1.0, 0.0, 0.0)) < 1e-4);
    }

    #[test]
    fn test_idle_and_incapacitated_do_not_move() {
        let mut app = app_with_step(20);
        let idle = app
            .world_mut()
            .spawn((Transform::default(), MovementCommand::Idle))
            .id();
        let stunned = app
            .world_mut()
            .spawn((
                Transform::default(),
                MovementCommand::MoveToPosition {
                    target: Vec3::X * 10.0,
                    speed: 5.0,
                },
                Incapacitated::new(2.0, Vec3::ZERO),
            ))
            .id();

        for _ in 0..10 {
            app.update();
        }

        assert_eq!(app.world().get::<Transform>(idle).unwrap().translation, Vec3::ZERO);
        assert_eq!(app.world().get::<Transform>(stunned).unwrap().translation, Vec3::ZERO);
    }
}
