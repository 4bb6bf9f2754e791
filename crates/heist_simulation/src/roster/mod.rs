//! GuardRoster — расстановка guards на старте миссии
//!
//! Планирование — чистая функция (roster, difficulty, rng) → Vec<GuardPlan>,
//! спавн/деспавн — через &mut World (host вызывает на загрузке уровня и при restart).

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

pub mod difficulty;

pub use difficulty::{Difficulty, DifficultySettings};

use crate::ai::{despawn_guard, Guard, GuardConfig, GuardState, OnDuty, PatrolRoute, TargetSnapshot};
use crate::alert::AlertBus;
use crate::components::{Captured, Incapacitated, MovementCommand, Player, Stamina};
use crate::noise::Locomotion;
use crate::stun::{Slapper, StunSchedule};
use crate::DeterministicRng;

/// Точка спавна guard'а со своим маршрутом
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub position: Vec3,
    /// Куда смотрит guard после спавна
    pub facing: Vec3,
    /// Patrol маршрут guard'а с этой точки
    pub route: Vec<Vec3>,
}

impl SpawnPoint {
    pub fn new(position: Vec3, facing: Vec3, route: Vec<Vec3>) -> Self {
        Self {
            position,
            facing,
            route,
        }
    }
}

/// Resource: конфигурация roster'а + текущие guards
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GuardRoster {
    pub spawn_points: Vec<SpawnPoint>,
    /// Количество без DifficultySettings
    pub base_guard_count: usize,
    /// Разброс позиции вокруг spawn point (по горизонтали)
    pub spawn_offset_radius: f32,
    /// Базовый конфиг (до difficulty scaling)
    pub guard_config: GuardConfig,
    /// Guards текущего run
    pub spawned: Vec<Entity>,
}

impl Default for GuardRoster {
    fn default() -> Self {
        Self {
            spawn_points: Vec::new(),
            base_guard_count: 3,
            spawn_offset_radius: 3.0,
            guard_config: GuardConfig::default(),
            spawned: Vec::new(),
        }
    }
}

impl GuardRoster {
    pub fn with_spawn_points(spawn_points: Vec<SpawnPoint>) -> Self {
        Self {
            spawn_points,
            ..Default::default()
        }
    }
}

/// Один guard к спавну
#[derive(Debug, Clone, PartialEq)]
pub struct GuardPlan {
    pub position: Vec3,
    pub facing: Vec3,
    pub route: Vec<Vec3>,
    pub config: GuardConfig,
}

/// Планирование roster'а
///
/// - count = max_guards (или base_guard_count), clamp [1, spawn points]
/// - spawn points перемешиваются, берутся первые count
/// - маршрут (> 1 waypoint) перемешивается
/// - позиция: случайный сдвиг внутри круга spawn_offset_radius
/// - sight/hearing × sight_multiplier
///
/// Нет spawn points → пустой план.
pub fn plan_roster(
    roster: &GuardRoster,
    difficulty: Option<&DifficultySettings>,
    rng: &mut impl Rng,
) -> Vec<GuardPlan> {
    if roster.spawn_points.is_empty() {
        return Vec::new();
    }

    let requested = difficulty
        .map(|d| d.max_guards)
        .unwrap_or(roster.base_guard_count);
    let count = requested.clamp(1, roster.spawn_points.len());

    let config = match difficulty {
        Some(settings) => roster.guard_config.clone().scaled_senses(settings.sight_multiplier),
        None => roster.guard_config.clone(),
    };

    let mut points: Vec<&SpawnPoint> = roster.spawn_points.iter().collect();
    points.shuffle(rng);

    points
        .into_iter()
        .take(count)
        .map(|point| {
            let mut route = point.route.clone();
            if route.len() > 1 {
                route.shuffle(rng);
            }

            GuardPlan {
                position: point.position + random_planar_offset(rng, roster.spawn_offset_radius),
                facing: point.facing,
                route,
                config: config.clone(),
            }
        })
        .collect()
}

/// Равномерная точка внутри круга радиуса radius (плоскость XZ)
fn random_planar_offset(rng: &mut impl Rng, radius: f32) -> Vec3 {
    if radius <= 0.0 {
        return Vec3::ZERO;
    }

    let angle = rng.gen::<f32>() * std::f32::consts::TAU;
    let distance = rng.gen::<f32>().sqrt() * radius;
    Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance)
}

/// Заспавнить guards по GuardRoster + DifficultySettings + DeterministicRng
///
/// Guards появляются в Patrol с route index 0 и OnDuty
/// (подписка на AlertBus — sync_alert_subscriptions на ближайшем тике).
pub fn spawn_roster(world: &mut World) -> Vec<Entity> {
    let Some(roster) = world.get_resource::<GuardRoster>().cloned() else {
        crate::log_warning("spawn_roster: GuardRoster resource missing");
        return Vec::new();
    };

    if roster.spawn_points.is_empty() {
        crate::log_warning("spawn_roster: no spawn points → no guards spawned");
        return Vec::new();
    }

    let difficulty = world.get_resource::<DifficultySettings>().cloned();

    let plans = match world.get_resource_mut::<DeterministicRng>() {
        Some(mut rng) => plan_roster(&roster, difficulty.as_ref(), &mut rng.rng),
        None => {
            crate::log_warning("spawn_roster: DeterministicRng missing → seed 0");
            plan_roster(&roster, difficulty.as_ref(), &mut ChaCha8Rng::seed_from_u64(0))
        }
    };

    let spawned: Vec<Entity> = plans
        .into_iter()
        .map(|plan| {
            let mut transform = Transform::from_translation(plan.position);
            let facing = Vec3::new(plan.facing.x, 0.0, plan.facing.z);
            if facing.length_squared() > 1e-6 {
                transform.look_to(facing, Vec3::Y);
            }

            world
                .spawn((
                    Guard,
                    OnDuty,
                    GuardState::patrol(&plan.config),
                    PatrolRoute::new(plan.route),
                    plan.config,
                    transform,
                    MovementCommand::Idle,
                ))
                .id()
        })
        .collect();

    crate::log_info(&format!(
        "[GuardRoster] Spawned {} guards ({})",
        spawned.len(),
        difficulty
            .map(|d| d.difficulty.as_str())
            .unwrap_or("no difficulty")
    ));

    if let Some(mut roster) = world.get_resource_mut::<GuardRoster>() {
        roster.spawned = spawned.clone();
    }

    spawned
}

/// Удалить всех guards (каждый отписывается до despawn)
pub fn despawn_roster(world: &mut World) -> usize {
    let guards: Vec<Entity> = world
        .query_filtered::<Entity, With<Guard>>()
        .iter(world)
        .collect();

    let despawned = guards
        .into_iter()
        .filter(|&guard| despawn_guard(world, guard))
        .count();

    if let Some(mut roster) = world.get_resource_mut::<GuardRoster>() {
        roster.spawned.clear();
    }

    despawned
}

/// Перезапуск миссии
///
/// Guards пересоздаются (новая расстановка из того же RNG потока),
/// отложенные impacts отменяются, с intruder'а снимаются Captured/Incapacitated.
pub fn restart_mission(world: &mut World) -> Vec<Entity> {
    let despawned = despawn_roster(world);

    if let Some(mut schedule) = world.get_resource_mut::<StunSchedule>() {
        schedule.clear();
    }
    if let Some(mut bus) = world.get_resource_mut::<AlertBus>() {
        bus.clear();
    }
    if let Some(mut snapshot) = world.get_resource_mut::<TargetSnapshot>() {
        snapshot.current = None;
    }

    let intruders: Vec<Entity> = world
        .query_filtered::<Entity, With<Player>>()
        .iter(world)
        .collect();

    for intruder in intruders {
        let Ok(mut entity) = world.get_entity_mut(intruder) else {
            continue;
        };

        entity.remove::<(Captured, Incapacitated)>();
        if let Some(mut stamina) = entity.get_mut::<Stamina>() {
            stamina.current = stamina.max;
            stamina.depleted = false;
        }
        if let Some(mut locomotion) = entity.get_mut::<Locomotion>() {
            *locomotion = Locomotion::Idle;
        }
        if let Some(mut slapper) = entity.get_mut::<Slapper>() {
            slapper.cooldown_timer = 0.0;
        }
    }

    crate::log_info(&format!("🔄 Mission restart: {} guards removed", despawned));
    spawn_roster(world)
}

/// Roster Plugin: ресурсы расстановки (спавн — явным вызовом spawn_roster)
pub struct RosterPlugin;

impl Plugin for RosterPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GuardRoster>()
            .init_resource::<DifficultySettings>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor_roster(points: usize) -> GuardRoster {
        let spawn_points = (0..points)
            .map(|i| {
                let base = Vec3::new(i as f32 * 20.0, 0.0, 0.0);
                SpawnPoint::new(
                    base,
                    Vec3::X,
                    vec![base, base + Vec3::Z * 10.0, base + Vec3::X * 10.0],
                )
            })
            .collect();
        GuardRoster::with_spawn_points(spawn_points)
    }

    #[test]
    fn test_count_follows_difficulty_and_clamps() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let roster = corridor_roster(3);

        assert_eq!(plan_roster(&roster, Some(&Difficulty::Easy.settings()), &mut rng).len(), 2);
        // Hard хочет 4, точек только 3
        assert_eq!(plan_roster(&roster, Some(&Difficulty::Hard.settings()), &mut rng).len(), 3);
        // Без difficulty → base_guard_count
        assert_eq!(plan_roster(&roster, None, &mut rng).len(), 3);
    }

    #[test]
    fn test_at_least_one_guard() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut roster = corridor_roster(2);
        roster.base_guard_count = 0;

        assert_eq!(plan_roster(&roster, None, &mut rng).len(), 1);
    }

    #[test]
    fn test_no_spawn_points_no_guards() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert!(plan_roster(&GuardRoster::default(), None, &mut rng).is_empty());
    }

    #[test]
    fn test_offset_within_radius_and_senses_scaled() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let roster = corridor_roster(4);
        let hard = Difficulty::Hard.settings();

        for plan in plan_roster(&roster, Some(&hard), &mut rng) {
            let anchor = roster
                .spawn_points
                .iter()
                .map(|p| p.position)
                .min_by(|a, b| a.distance(plan.position).total_cmp(&b.distance(plan.position)))
                .unwrap();
            assert!(plan.position.distance(anchor) <= roster.spawn_offset_radius + 1e-4);
            assert_eq!(plan.position.y, 0.0);
            assert!((plan.config.sight_range - 26.0).abs() < 1e-4);
            // Маршрут — перестановка исходного
            assert_eq!(plan.route.len(), 3);
            assert!(plan.route.contains(&anchor));
        }
    }

    #[test]
    fn test_same_seed_same_plan() {
        let roster = corridor_roster(5);
        let settings = Difficulty::Hard.settings();

        let a = plan_roster(&roster, Some(&settings), &mut ChaCha8Rng::seed_from_u64(42));
        let b = plan_roster(&roster, Some(&settings), &mut ChaCha8Rng::seed_from_u64(42));

        assert_eq!(a, b);
    }
}
