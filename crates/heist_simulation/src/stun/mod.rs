//! Stun ("slap") module
//!
//! ECS ответственность:
//! - Slapper stats + cooldown
//! - Выбор цели, отложенный impact (StunSchedule), Incapacitated
//! - Noise alert на AlertBus при impact
//!
//! Host ответственность: анимация windup, ragdoll по Incapacitated.force.

use bevy::prelude::*;

pub mod schedule;
pub mod slapper;
pub mod systems;

// Re-export основных типов
pub use schedule::{StunRequest, StunSchedule};
pub use slapper::{select_slap_target, slap_force, Slapper, SLAP_UPWARD_FACTOR};
pub use systems::{
    deliver_stun_impacts, process_slap_intents, tick_incapacitation, tick_slap_cooldowns,
    SlapIntent,
};

use crate::alert::NoiseEmitted;
use crate::SimulationSet;

/// Stun Plugin
///
/// Порядок выполнения:
/// 1. Timers: tick_slap_cooldowns, tick_incapacitation
/// 2. Stun: deliver_stun_impacts → process_slap_intents
///
/// Impact доставляется не раньше следующего тика после intent
/// (clock этого тика уже продвинут к моменту планирования).
pub struct StunPlugin;

impl Plugin for StunPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StunSchedule>()
            .add_event::<SlapIntent>()
            .add_event::<NoiseEmitted>();

        app.add_systems(
            FixedUpdate,
            (
                (tick_slap_cooldowns, tick_incapacitation).in_set(SimulationSet::Timers),
                (deliver_stun_impacts, process_slap_intents)
                    .chain()
                    .in_set(SimulationSet::Stun),
            ),
        );
    }
}
