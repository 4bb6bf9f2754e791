//! AI reaction systems (alert delivery, duty lifecycle, captures).

use bevy::prelude::*;

use crate::ai::components::{Guard, GuardConfig, GuardState, OnDuty, PatrolRoute};
use crate::ai::events::TargetCaptured;
use crate::ai::systems::fsm::receive_alert;
use crate::alert::{AlertBus, AlertEvent, AlertHandler};
use crate::components::{Captured, Incapacitated, MovementCommand};
use crate::stun::StunSchedule;

/// Query всех guards на duty (FSM тик + доставка alerts)
///
/// Один Query на оба пути: guard_behaviour передаёт его же в GuardAlertSink,
/// поэтому нет конфликта доступа к GuardState внутри системы.
pub type GuardQuery<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static mut GuardState,
        &'static mut PatrolRoute,
        &'static GuardConfig,
        &'static Transform,
        &'static mut MovementCommand,
    ),
    (With<Guard>, With<OnDuty>),
>;

/// AlertHandler поверх ECS guards
///
/// Подписчик без guard компонентов (despawn в этом тике) пропускаем с warning.
pub struct GuardAlertSink<'a, 'w, 's> {
    guards: &'a mut GuardQuery<'w, 's>,
}

impl<'a, 'w, 's> GuardAlertSink<'a, 'w, 's> {
    pub fn new(guards: &'a mut GuardQuery<'w, 's>) -> Self {
        Self { guards }
    }
}

impl AlertHandler for GuardAlertSink<'_, '_, '_> {
    fn handle_alert(&mut self, subscriber: Entity, event: &AlertEvent) -> Option<AlertEvent> {
        let Ok((_, mut state, _, config, transform, mut command)) = self.guards.get_mut(subscriber)
        else {
            crate::log_warning(&format!(
                "GuardAlertSink: stale subscriber {:?} (no guard components), alert skipped",
                subscriber
            ));
            return None;
        };

        let follow_up = receive_alert(subscriber, &mut state, config, transform.translation, event);

        // Сразу разворачиваем к точке, не ждём своего тика
        if let Some(spot) = state.investigate_position() {
            let next = MovementCommand::MoveToPosition {
                target: spot,
                speed: config.patrol_speed,
            };
            if *command != next {
                *command = next;
            }
        }

        follow_up
    }
}

/// Система: AlertBus подписки ↔ OnDuty
///
/// Сначала отписки (снятие OnDuty, despawn), потом новые подписки.
/// Порядок новых подписок = порядок итерации Query (порядок спавна).
pub fn sync_alert_subscriptions(
    mut bus: ResMut<AlertBus>,
    added: Query<Entity, (With<Guard>, Added<OnDuty>)>,
    mut removed: RemovedComponents<OnDuty>,
) {
    for guard in removed.read() {
        if bus.unsubscribe(guard) {
            crate::log(&format!("AlertBus: {:?} off duty → unsubscribed", guard));
        }
    }

    for guard in added.iter() {
        if bus.subscribe(guard) {
            crate::log(&format!("AlertBus: {:?} on duty → subscribed", guard));
        }
    }
}

/// Снять guard'а с дежурства (unsubscribe до снятия OnDuty)
pub fn deactivate_guard(world: &mut World, guard: Entity) {
    if let Some(mut bus) = world.get_resource_mut::<AlertBus>() {
        bus.unsubscribe(guard);
    }

    if let Ok(mut entity) = world.get_entity_mut(guard) {
        entity.remove::<OnDuty>();
        if let Some(mut command) = entity.get_mut::<MovementCommand>() {
            *command = MovementCommand::Idle;
        }
    }
}

/// Удалить guard'а (unsubscribe до despawn)
pub fn despawn_guard(world: &mut World, guard: Entity) -> bool {
    if let Some(mut bus) = world.get_resource_mut::<AlertBus>() {
        bus.unsubscribe(guard);
    }

    world.despawn(guard)
}

/// Система: TargetCaptured → Captured на intruder'е
///
/// Captured терминален: Incapacitated снимается, отложенные impacts отменяются.
pub fn apply_captures(
    mut commands: Commands,
    mut events: EventReader<TargetCaptured>,
    mut schedule: ResMut<StunSchedule>,
    targets: Query<Has<Captured>>,
) {
    for event in events.read() {
        let Ok(already_captured) = targets.get(event.target) else {
            crate::log_warning(&format!(
                "apply_captures: target {:?} no longer exists",
                event.target
            ));
            continue;
        };

        if already_captured {
            continue;
        }

        let cancelled = schedule.cancel_for(event.target);

        if let Ok(mut entity) = commands.get_entity(event.target) {
            entity.insert(Captured).remove::<Incapacitated>();
        }

        crate::log_info(&format!(
            "🔒 Intruder {:?} captured by {:?} (cancelled {} pending impacts)",
            event.target, event.guard, cancelled
        ));
    }
}
