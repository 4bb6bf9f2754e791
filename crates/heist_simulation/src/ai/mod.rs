//! Guard AI module
//!
//! Patrol / Investigate / Chase FSM, alerts между guards, headless movement.
//! Guards решают "куда идти" (MovementCommand), исполнитель двигает Transform.

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod systems;
pub mod target;

// Re-export основных типов
pub use components::{
    Guard, GuardConfig, GuardState, GuardStateKind, OnDuty, PatrolRoute, DEFAULT_PATROL_WAIT,
};
pub use events::TargetCaptured;
pub use systems::{
    apply_captures, apply_movement_commands, deactivate_guard, despawn_guard, guard_behaviour,
    receive_alert, sync_alert_subscriptions, tick_guard, GuardAlertSink, GuardQuery, GuardTick,
};
pub use target::{refresh_target_snapshot, TargetSnapshot, TargetView};

use crate::alert::AlertBus;
use crate::noise::update_noise_emission;
use crate::sensing::Obstacles;
use crate::stun::StunSchedule;
use crate::SimulationSet;

/// AI Plugin
///
/// Регистрирует AI системы в FixedUpdate для детерминизма.
/// Порядок выполнения (по SimulationSet):
/// 1. Timers: sync_alert_subscriptions — OnDuty ↔ AlertBus
/// 2. Target: refresh_target_snapshot — после noise emission
/// 3. Guards: guard_behaviour — FSM тик + sighting broadcast
/// 4. Outcome: apply_captures — TargetCaptured → Captured
/// 5. Movement: apply_movement_commands — straight line executor
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AlertBus>()
            .init_resource::<TargetSnapshot>()
            .init_resource::<Obstacles>()
            // apply_captures отменяет отложенные impacts
            .init_resource::<StunSchedule>()
            .add_event::<TargetCaptured>()
            .add_systems(
                FixedUpdate,
                (
                    sync_alert_subscriptions.in_set(SimulationSet::Timers),
                    refresh_target_snapshot
                        .in_set(SimulationSet::Target)
                        .after(update_noise_emission),
                    guard_behaviour.in_set(SimulationSet::Guards),
                    apply_captures.in_set(SimulationSet::Outcome),
                    apply_movement_commands.in_set(SimulationSet::Movement),
                ),
            );
    }
}
