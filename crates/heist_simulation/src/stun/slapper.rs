//! Slapper component — характеристики slap у актора
//!
//! По аналогии с Attacker: cooldown таймер уменьшается до 0,
//! cooldown ставится СРАЗУ при slap (до impact), чтобы не было спама во время windup.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Доля вертикальной составляющей в направлении удара
pub const SLAP_UPWARD_FACTOR: f32 = 0.5;

#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct Slapper {
    /// Дистанция поиска цели (строго меньше)
    pub slap_range: f32,
    /// Cooldown между slap (секунды)
    pub slap_cooldown: f32,
    /// Текущий cooldown таймер (уменьшается до 0)
    pub cooldown_timer: f32,
    /// Длительность incapacitation жертвы
    pub ragdoll_duration: f32,
    /// Сила импульса
    pub slap_force: f32,
    /// Задержка impact после нажатия (синхронизация с анимацией)
    pub impact_delay: f32,
    /// Радиус шума удара (guards в радиусе слышат)
    pub slap_noise_radius: f32,
}

impl Default for Slapper {
    fn default() -> Self {
        Self {
            slap_range: 2.5,
            slap_cooldown: 6.0,
            cooldown_timer: 0.0,
            ragdoll_duration: 2.0,
            slap_force: 25.0,
            impact_delay: 0.3,
            slap_noise_radius: 20.0,
        }
    }
}

impl Slapper {
    pub fn is_ready(&self) -> bool {
        self.cooldown_timer <= 0.0
    }

    pub fn start_cooldown(&mut self) {
        self.cooldown_timer = self.slap_cooldown;
    }

    pub fn cooldown_remaining(&self) -> f32 {
        self.cooldown_timer.max(0.0)
    }

    pub fn tick(&mut self, delta: f32) {
        if self.cooldown_timer > 0.0 {
            self.cooldown_timer = (self.cooldown_timer - delta).max(0.0);
        }
    }
}

/// Выбор цели slap: строго ближайший кандидат с distance < range
///
/// Кандидаты уже отфильтрованы (не captured, не incapacitated).
/// Сам actor пропускается. При равенстве дистанций — первый встреченный.
pub fn select_slap_target(
    actor: Entity,
    actor_position: Vec3,
    candidates: impl IntoIterator<Item = (Entity, Vec3)>,
    range: f32,
) -> Option<Entity> {
    let mut closest = None;
    let mut closest_distance = range;

    for (candidate, position) in candidates {
        if candidate == actor {
            continue;
        }

        let distance = actor_position.distance(position);
        if distance < closest_distance {
            closest_distance = distance;
            closest = Some(candidate);
        }
    }

    closest
}

/// Вектор импульса удара
///
/// Направление actor → target пересчитывается на момент impact (не windup),
/// плюс вертикальная составляющая, нормализуется и умножается на силу.
pub fn slap_force(actor_position: Vec3, target_position: Vec3, magnitude: f32) -> Vec3 {
    let direction = (target_position - actor_position).normalize_or_zero();
    (direction + Vec3::Y * SLAP_UPWARD_FACTOR).normalize_or_zero() * magnitude
}
