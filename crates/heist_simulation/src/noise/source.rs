//! NoiseSource — шум intruder'а из locomotion state
//!
//! Чистые функции от состояния, без storage. NoiseEmission компонент
//! только кэширует результат на тик для guards/HUD.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::Stamina;

/// Порог stamina для label HIGH vs MEDIUM (доля max)
pub const LOW_STAMINA_LABEL_THRESHOLD: f32 = 0.3;

/// Режим передвижения intruder'а (пишет input/host слой)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub enum Locomotion {
    #[default]
    Idle,
    Walking,
    Running,
    Crouching,
}

/// Радиусы шума по режимам (метры)
///
/// Run — самый громкий. Crouch может быть 0 (silent).
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct NoiseProfile {
    pub walk_radius: f32,
    pub run_radius: f32,
    pub crouch_radius: f32,
}

impl Default for NoiseProfile {
    fn default() -> Self {
        Self {
            walk_radius: 0.0,
            run_radius: 10.0,
            crouch_radius: 0.0,
        }
    }
}

/// Дискретный label шума (для HUD/телеметрии, не для физики)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum NoiseLevel {
    Stunned,
    Silent,
    Low,
    Medium,
    High,
}

impl NoiseLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoiseLevel::Stunned => "STUNNED",
            NoiseLevel::Silent => "SILENT",
            NoiseLevel::Low => "LOW",
            NoiseLevel::Medium => "MEDIUM",
            NoiseLevel::High => "HIGH",
        }
    }
}

/// Мгновенный радиус шума
///
/// Idle считается как walking (шаги на месте):
/// всё что не crouch/run — walk radius.
pub fn noise_radius(locomotion: Locomotion, incapacitated: bool, profile: &NoiseProfile) -> f32 {
    if incapacitated {
        return 0.0;
    }

    let radius = match locomotion {
        Locomotion::Crouching => profile.crouch_radius,
        Locomotion::Running => profile.run_radius,
        Locomotion::Idle | Locomotion::Walking => profile.walk_radius,
    };

    radius.max(0.0)
}

/// Label шума
///
/// MEDIUM = бежит, но stamina ≤ 30% (скоро перестанет бегать).
pub fn noise_level(locomotion: Locomotion, incapacitated: bool, stamina: &Stamina) -> NoiseLevel {
    if incapacitated {
        return NoiseLevel::Stunned;
    }

    match locomotion {
        Locomotion::Crouching => NoiseLevel::Silent,
        Locomotion::Running => {
            if stamina.fraction() > LOW_STAMINA_LABEL_THRESHOLD {
                NoiseLevel::High
            } else {
                NoiseLevel::Medium
            }
        }
        Locomotion::Idle | Locomotion::Walking => NoiseLevel::Low,
    }
}

/// Снимок шума intruder'а на текущий тик
///
/// Инвариант: radius == 0 когда intruder incapacitated.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct NoiseEmission {
    pub radius: f32,
    pub level: NoiseLevel,
}

impl Default for NoiseEmission {
    fn default() -> Self {
        Self {
            radius: 0.0,
            level: NoiseLevel::Low,
        }
    }
}
