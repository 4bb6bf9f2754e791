//! Noise systems: stamina + emission snapshot

use bevy::prelude::*;

use crate::components::{Captured, Incapacitated, Stamina};
use crate::noise::source::{noise_level, noise_radius, Locomotion, NoiseEmission, NoiseProfile};

/// Система: stamina intruder'а
///
/// Running → drain; всё остальное → regen.
/// Depleted intruder не может бежать: Locomotion принудительно Running → Walking
/// (input слой может снова выставить Running, но до recover мы его сбросим).
/// Incapacitated/Captured — stamina не трогаем.
pub fn update_intruder_stamina(
    mut query: Query<(&mut Stamina, &mut Locomotion), (Without<Incapacitated>, Without<Captured>)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (mut stamina, mut locomotion) in query.iter_mut() {
        if *locomotion == Locomotion::Running && !stamina.can_run() {
            *locomotion = Locomotion::Walking;
        }

        if *locomotion == Locomotion::Running {
            stamina.drain(delta);
            if stamina.depleted {
                crate::log("😮‍💨 Intruder stamina depleted → Walking");
                *locomotion = Locomotion::Walking;
            }
        } else {
            stamina.regenerate(delta);
        }
    }
}

/// Система: NoiseEmission snapshot
///
/// Пересчитывается каждый тик из Locomotion + Incapacitated.
pub fn update_noise_emission(
    mut query: Query<(
        &mut NoiseEmission,
        &Locomotion,
        &NoiseProfile,
        &Stamina,
        Has<Incapacitated>,
    )>,
) {
    for (mut emission, locomotion, profile, stamina, incapacitated) in query.iter_mut() {
        let next = NoiseEmission {
            radius: noise_radius(*locomotion, incapacitated, profile),
            level: noise_level(*locomotion, incapacitated, stamina),
        };

        // Changed<NoiseEmission> не спамим если ничего не поменялось
        if *emission != next {
            *emission = next;
        }
    }
}
