//! Stun systems: cooldowns, slap intents, delayed impacts.

use bevy::prelude::*;

use crate::ai::systems::reactions::{GuardAlertSink, GuardQuery};
use crate::alert::{AlertBus, AlertEvent, NoiseEmitted};
use crate::components::{Captured, Incapacitated, Slappable};
use crate::stun::schedule::StunSchedule;
use crate::stun::slapper::{select_slap_target, slap_force, Slapper};

/// Запрос на slap от input слоя (клавиша / AI скрипт)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct SlapIntent {
    /// Кто бьёт (entity с Slapper)
    pub actor: Entity,
}

/// Система: обновление slap cooldown таймеров
pub fn tick_slap_cooldowns(mut query: Query<&mut Slapper>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for mut slapper in query.iter_mut() {
        slapper.tick(delta);
    }
}

/// Система: истечение incapacitation
///
/// Таймер clamp к 0; на 0 компонент снимается (управление вернулось).
pub fn tick_incapacitation(
    mut commands: Commands,
    mut query: Query<(Entity, &mut Incapacitated)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, mut incapacitated) in query.iter_mut() {
        if incapacitated.tick(delta) {
            commands.entity(entity).remove::<Incapacitated>();
            crate::log(&format!("💫 {:?} recovered from stun", entity));
        }
    }
}

/// Система: SlapIntent → StunSchedule
///
/// Условия: cooldown готов, actor не incapacitated/captured,
/// есть Slappable цель строго ближе slap_range.
/// Cooldown ставится сразу, impact — через impact_delay.
pub fn process_slap_intents(
    mut intents: EventReader<SlapIntent>,
    mut actors: Query<(&mut Slapper, &Transform, Has<Incapacitated>, Has<Captured>)>,
    candidates: Query<(Entity, &Transform), (With<Slappable>, Without<Incapacitated>, Without<Captured>)>,
    mut schedule: ResMut<StunSchedule>,
) {
    for intent in intents.read() {
        let Ok((mut slapper, transform, incapacitated, captured)) = actors.get_mut(intent.actor) else {
            crate::log_warning(&format!("SlapIntent: actor {:?} has no Slapper", intent.actor));
            continue;
        };

        if incapacitated || captured {
            continue;
        }

        if !slapper.is_ready() {
            crate::log(&format!(
                "✋ {:?} slap on cooldown ({:.1}s left)",
                intent.actor,
                slapper.cooldown_remaining()
            ));
            continue;
        }

        let Some(target) = select_slap_target(
            intent.actor,
            transform.translation,
            candidates.iter().map(|(entity, t)| (entity, t.translation)),
            slapper.slap_range,
        ) else {
            continue;
        };

        slapper.start_cooldown();
        let request = schedule.schedule(
            intent.actor,
            target,
            slapper.impact_delay,
            slapper.ragdoll_duration,
            slapper.slap_force,
            slapper.slap_noise_radius,
        );

        crate::log(&format!(
            "👋 {:?} slaps {:?} (impact in {:.2}s)",
            intent.actor, target, request.impact_delay
        ));
    }
}

/// Система: доставка созревших impacts
///
/// Цель пропала или captured за время windup → impact тихо отбрасывается.
/// Направление считается по позициям на момент impact.
/// Повторный impact по уже оглушённой цели не продлевает stun, но шумит.
pub fn deliver_stun_impacts(
    mut commands: Commands,
    mut schedule: ResMut<StunSchedule>,
    mut bus: ResMut<AlertBus>,
    mut guards: GuardQuery,
    bodies: Query<(&Transform, Has<Incapacitated>, Has<Captured>)>,
    mut noise_events: EventWriter<NoiseEmitted>,
    time: Res<Time<Fixed>>,
) {
    // Insert через Commands виден только после sync point
    let mut stunned_this_tick: Vec<Entity> = Vec::new();

    for request in schedule.advance(time.delta_secs()) {
        let Ok((target_transform, stunned, captured)) = bodies.get(request.target) else {
            crate::log(&format!("Impact on {:?} dropped: target gone", request.target));
            continue;
        };

        if captured {
            crate::log(&format!("Impact on {:?} dropped: target captured", request.target));
            continue;
        }

        let target_position = target_transform.translation;
        // Actor пропал → толкаем строго вверх
        let actor_position = bodies
            .get(request.actor)
            .map(|(t, _, _)| t.translation)
            .unwrap_or(target_position);
        let force = slap_force(actor_position, target_position, request.force);

        if stunned || stunned_this_tick.contains(&request.target) {
            crate::log(&format!("{:?} already stunned, impact adds only noise", request.target));
        } else {
            commands
                .entity(request.target)
                .insert(Incapacitated::new(request.duration, force));
            stunned_this_tick.push(request.target);
            crate::log_info(&format!(
                "💥 {:?} stunned for {:.1}s (force {:?})",
                request.target, request.duration, force
            ));
        }

        let alert = AlertEvent::noise(target_position, request.noise_radius);
        bus.publish(alert, &mut GuardAlertSink::new(&mut guards));
        noise_events.write(NoiseEmitted {
            position: target_position,
            radius: request.noise_radius,
        });
    }
}
