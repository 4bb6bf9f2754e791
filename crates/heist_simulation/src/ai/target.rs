//! Target snapshot — то, что guards знают об intruder'е на этот тик
//!
//! Строится один раз за тик из Player entity; guards читают по значению,
//! никто кроме refresh_target_snapshot его не пишет.

use bevy::prelude::*;

use crate::components::{Captured, Incapacitated, Player};
use crate::noise::NoiseEmission;

/// Вид intruder'а для guards
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetView {
    pub entity: Entity,
    pub position: Vec3,
    /// Инвариант: 0 когда is_incapacitated
    pub noise_radius: f32,
    pub is_incapacitated: bool,
    pub is_captured: bool,
}

impl TargetView {
    /// Можно ли заметить цель заново (sight/hearing триггеры)
    pub fn is_detectable(&self) -> bool {
        !self.is_incapacitated && !self.is_captured
    }
}

/// Resource: snapshot intruder'а (None — intruder удалён/не заспавнен)
#[derive(Resource, Debug, Clone, Default)]
pub struct TargetSnapshot {
    pub current: Option<TargetView>,
}

impl TargetSnapshot {
    pub fn target(&self) -> Option<&TargetView> {
        self.current.as_ref()
    }
}

/// Система: обновление TargetSnapshot
///
/// Single-player: берём первый Player. Без NoiseEmission — тихий (radius 0).
pub fn refresh_target_snapshot(
    mut snapshot: ResMut<TargetSnapshot>,
    players: Query<
        (
            Entity,
            &Transform,
            Option<&NoiseEmission>,
            Has<Incapacitated>,
            Has<Captured>,
        ),
        With<Player>,
    >,
) {
    let next = players
        .iter()
        .next()
        .map(|(entity, transform, emission, incapacitated, captured)| TargetView {
            entity,
            position: transform.translation,
            noise_radius: if incapacitated {
                0.0
            } else {
                emission.map(|e| e.radius).unwrap_or(0.0)
            },
            is_incapacitated: incapacitated,
            is_captured: captured,
        });

    if snapshot.current.is_some() && next.is_none() {
        crate::log_warning("TargetSnapshot: intruder entity missing → guards hold position");
    }

    snapshot.current = next;
}
