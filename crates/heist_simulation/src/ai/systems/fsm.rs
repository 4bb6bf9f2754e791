//! Guard FSM: state behaviour + sight/hearing transitions + alert reactions.
//!
//! tick_guard / receive_alert — чистые функции над компонентами (тестируются без App).
//! guard_behaviour — ECS система, прогоняет их для всех guards на duty.

use bevy::prelude::*;

use crate::ai::components::{GuardConfig, GuardState, PatrolRoute};
use crate::ai::events::TargetCaptured;
use crate::ai::systems::reactions::{GuardAlertSink, GuardQuery};
use crate::ai::target::{TargetSnapshot, TargetView};
use crate::alert::{AlertBus, AlertEvent};
use crate::components::{has_arrived, MovementCommand};
use crate::sensing::{can_hear, can_see, Obstacles, ObserverPose, OcclusionQuery};

/// Результат тика guard'а
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuardTick {
    /// Что исполнить movement слою
    pub command: MovementCommand,
    /// Sighting alert для рассылки (после тика, не во время)
    pub broadcast: Option<AlertEvent>,
    /// Цель в catch distance во время Chase
    pub captured: bool,
}

impl GuardTick {
    fn hold() -> Self {
        Self {
            command: MovementCommand::Idle,
            broadcast: None,
            captured: false,
        }
    }
}

/// Один тик guard'а
///
/// Порядок: behaviour текущего состояния → sight → hearing.
/// Sight/hearing пропускаются в Chase и когда цель incapacitated/captured.
#[allow(clippy::too_many_arguments)]
pub fn tick_guard(
    guard: Entity,
    state: &mut GuardState,
    route: &mut PatrolRoute,
    config: &GuardConfig,
    pose: &ObserverPose,
    target: &TargetView,
    occlusion: &impl OcclusionQuery,
    delta: f32,
) -> GuardTick {
    let mut tick = GuardTick::hold();

    // 1. Behaviour
    match *state {
        GuardState::Patrol { .. } => {
            tick.command = patrol_step(state, route, config, pose.position, delta);
        }
        GuardState::Investigate { .. } => {
            tick.command = investigate_step(guard, state, route, config, pose.position, delta);
        }
        GuardState::Chase { .. } => {
            let (command, captured) = chase_step(guard, state, config, pose, target, occlusion);
            tick.command = command;
            if captured {
                tick.captured = true;
                return tick;
            }
        }
    }

    if !target.is_detectable() {
        return tick;
    }

    // 2. Sight
    if !state.is_chasing()
        && can_see(
            pose,
            target.position,
            config.sight_range,
            config.half_sight_angle(),
            occlusion,
        )
    {
        tick.broadcast = Some(AlertEvent::sighting(target.position, guard));
        set_state(
            guard,
            state,
            GuardState::Chase {
                last_seen: target.position,
            },
            "spotted intruder",
        );
        tick.command = MovementCommand::MoveToPosition {
            target: target.position,
            speed: config.chase_speed,
        };
    }

    // 3. Hearing (ambient шум — только локально, без broadcast)
    if !state.is_chasing()
        && can_hear(
            pose.position,
            target.position,
            target.noise_radius,
            config.hearing_range,
        )
    {
        start_investigate(guard, state, target.position, config.investigate_duration, "heard footsteps");
        tick.command = MovementCommand::MoveToPosition {
            target: target.position,
            speed: config.patrol_speed,
        };
    }

    tick
}

/// Patrol: к текущему waypoint, ждём, следующий (cyclic)
fn patrol_step(
    state: &mut GuardState,
    route: &mut PatrolRoute,
    config: &GuardConfig,
    position: Vec3,
    delta: f32,
) -> MovementCommand {
    let GuardState::Patrol { wait_timer } = state else {
        return MovementCommand::Idle;
    };

    // Пустой маршрут — стоим на месте, это не ошибка
    let Some(waypoint) = route.current() else {
        return MovementCommand::Idle;
    };

    if has_arrived(position, waypoint, config.patrol_arrival_tolerance) {
        *wait_timer = (*wait_timer - delta).max(0.0);
        if *wait_timer <= 0.0 {
            route.advance();
            *wait_timer = config.patrol_wait_time;
        }
    }

    match route.current() {
        Some(next) => MovementCommand::MoveToPosition {
            target: next,
            speed: config.patrol_speed,
        },
        None => MovementCommand::Idle,
    }
}

/// Investigate: к точке, осмотр после прибытия, потом Patrol с того же index
fn investigate_step(
    guard: Entity,
    state: &mut GuardState,
    route: &mut PatrolRoute,
    config: &GuardConfig,
    position: Vec3,
    delta: f32,
) -> MovementCommand {
    let GuardState::Investigate {
        position: spot,
        timer,
    } = state
    else {
        return MovementCommand::Idle;
    };
    let spot = *spot;

    if has_arrived(position, spot, config.investigate_arrival_tolerance) {
        *timer = (*timer - delta).max(0.0);
        if *timer <= 0.0 {
            set_state(guard, state, GuardState::patrol(config), "search finished");
            return match route.current() {
                Some(waypoint) => MovementCommand::MoveToPosition {
                    target: waypoint,
                    speed: config.patrol_speed,
                },
                None => MovementCommand::Idle,
            };
        }
    }

    MovementCommand::MoveToPosition {
        target: spot,
        speed: config.patrol_speed,
    }
}

/// Chase: к живой позиции цели; catch distance → captured; потеря из виду → Investigate
///
/// Incapacitated цель остаётся видимой для уже преследующего guard'а.
fn chase_step(
    guard: Entity,
    state: &mut GuardState,
    config: &GuardConfig,
    pose: &ObserverPose,
    target: &TargetView,
    occlusion: &impl OcclusionQuery,
) -> (MovementCommand, bool) {
    let GuardState::Chase { last_seen } = state else {
        return (MovementCommand::Idle, false);
    };

    let chase = MovementCommand::MoveToPosition {
        target: target.position,
        speed: config.chase_speed,
    };

    if pose.position.distance(target.position) <= config.catch_distance {
        crate::log_info(&format!("🚨 {:?} caught intruder {:?}", guard, target.entity));
        return (chase, true);
    }

    if can_see(
        pose,
        target.position,
        config.sight_range,
        config.half_sight_angle(),
        occlusion,
    ) {
        *last_seen = target.position;
        return (chase, false);
    }

    let last_seen = *last_seen;
    start_investigate(guard, state, last_seen, config.investigate_duration, "lost sight");
    (
        MovementCommand::MoveToPosition {
            target: last_seen,
            speed: config.patrol_speed,
        },
        false,
    )
}

/// Реакция guard'а на alert с bus
///
/// Chase sticky: ни sighting, ни noise его не сбивают.
/// Возвращает follow-up alert (sighting после очень близкого шума).
pub fn receive_alert(
    guard: Entity,
    state: &mut GuardState,
    config: &GuardConfig,
    position: Vec3,
    event: &AlertEvent,
) -> Option<AlertEvent> {
    if state.is_chasing() {
        return None;
    }

    match *event {
        AlertEvent::Sighting {
            position: spot,
            source,
        } => {
            // Свой broadcast не переспрашиваем
            if source == Some(guard) {
                return None;
            }
            if position.distance(spot) > config.alert_radius {
                return None;
            }

            // Уже ищем ту же точку: peer alert не укорачивает поиск
            let duration = match *state {
                GuardState::Investigate {
                    position: current,
                    timer,
                } if current == spot => timer.max(config.investigate_duration),
                _ => config.investigate_duration,
            };
            start_investigate(guard, state, spot, duration, "peer alert");
            None
        }
        AlertEvent::Noise {
            position: spot,
            radius,
        } => {
            if radius <= 0.0 {
                return None;
            }

            let distance = position.distance(spot);
            if distance > radius {
                return None;
            }

            crate::log(&format!("🔊 {:?} heard a SLAP at {:.1}m", guard, distance));

            if distance <= radius * config.close_noise_ratio {
                // Очень близко: поднимаем остальных и ищем дольше
                start_investigate(
                    guard,
                    state,
                    spot,
                    config.investigate_duration * config.close_noise_search_multiplier,
                    "slap nearby",
                );
                return Some(AlertEvent::sighting(spot, guard));
            }

            start_investigate(guard, state, spot, config.investigate_duration, "slap");
            None
        }
    }
}

fn start_investigate(guard: Entity, state: &mut GuardState, position: Vec3, duration: f32, reason: &str) {
    set_state(
        guard,
        state,
        GuardState::Investigate {
            position,
            timer: duration.max(0.0),
        },
        reason,
    );
}

fn set_state(guard: Entity, state: &mut GuardState, next: GuardState, reason: &str) {
    if state.kind() != next.kind() {
        crate::log(&format!(
            "AI: {:?} {} → {} ({})",
            guard,
            state.kind().as_str(),
            next.kind().as_str(),
            reason
        ));
    }
    *state = next;
}

/// Система: тик всех guards на duty
///
/// Порядок — порядок подписки на AlertBus. Sighting alert рассылается сразу
/// после тика guard'а (синхронно, в том же тике): guards дальше по списку
/// уже видят обновлённое состояние.
/// После поимки остальные guards в этом тике не тикают (mission over).
pub fn guard_behaviour(
    mut guards: GuardQuery,
    snapshot: Res<TargetSnapshot>,
    obstacles: Res<Obstacles>,
    mut bus: ResMut<AlertBus>,
    mut captured_events: EventWriter<TargetCaptured>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();
    let order: Vec<Entity> = bus.subscribers().to_vec();

    for guard in order {
        let tick = {
            let Ok((_, mut state, mut route, config, transform, mut command)) = guards.get_mut(guard)
            else {
                continue;
            };

            // Цель удалена → hold position; поймана → mission over, не тикаем
            let Some(target) = snapshot.target().filter(|t| !t.is_captured) else {
                if *command != MovementCommand::Idle {
                    *command = MovementCommand::Idle;
                }
                continue;
            };

            let pose = ObserverPose::from_transform(transform, config.eye_height);
            let tick = tick_guard(
                guard,
                &mut state,
                &mut route,
                config,
                &pose,
                target,
                &*obstacles,
                delta,
            );

            // Не спамим Changed<MovementCommand> одинаковыми командами
            if *command != tick.command {
                *command = tick.command;
            }
            tick
        };

        if let Some(alert) = tick.broadcast {
            crate::log(&format!("📣 {:?} broadcasts sighting at {:?}", guard, alert.position()));
            bus.publish(alert, &mut GuardAlertSink::new(&mut guards));
        }

        if tick.captured {
            if let Some(target) = snapshot.target() {
                captured_events.write(TargetCaptured {
                    guard,
                    target: target.entity,
                });
            }
            break;
        }
    }
}
