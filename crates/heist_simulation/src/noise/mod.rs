//! Noise domain (intruder side)
//!
//! - source: Locomotion → noise radius + label (чистые функции)
//! - systems: stamina drain/regen, NoiseEmission snapshot каждый тик

use bevy::prelude::*;

pub mod source;
pub mod systems;

pub use source::{
    noise_level, noise_radius, Locomotion, NoiseEmission, NoiseLevel, NoiseProfile,
    LOW_STAMINA_LABEL_THRESHOLD,
};
pub use systems::{update_intruder_stamina, update_noise_emission};

use crate::SimulationSet;

/// Noise Plugin
///
/// Порядок выполнения (SimulationSet::Target):
/// 1. update_intruder_stamina — бег тратит stamina, depleted → Walking
/// 2. update_noise_emission — radius/label снимок для guards
pub struct NoisePlugin;

impl Plugin for NoisePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (update_intruder_stamina, update_noise_emission)
                .chain()
                .in_set(SimulationSet::Target),
        );
    }
}
