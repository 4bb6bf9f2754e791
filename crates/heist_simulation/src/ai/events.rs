//! AI Events — outcome для host слоя
//!
//! Guards не знают про mission flow/score: только сообщают "поймал".

use bevy::prelude::*;

/// Guard поймал intruder'а (terminal outcome погони)
///
/// Читает apply_captures (ставит Captured) и host (lose screen).
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct TargetCaptured {
    /// Кто поймал
    pub guard: Entity,
    /// Кого поймали
    pub target: Entity,
}
