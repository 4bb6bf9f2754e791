//! SensorModel — зрение (range + cone + occlusion) и слух (noise radius + hearing range)
//!
//! Чистая геометрия, без ECS. Guard FSM вызывает can_see/can_hear каждый тик.

use bevy::prelude::*;

pub mod occlusion;

pub use occlusion::{Obstacles, OcclusionQuery, OpenSpace};

/// Поза наблюдателя (guard) на текущий тик
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverPose {
    /// Позиция ног (для distance/angle)
    pub position: Vec3,
    /// Смещение глаз над позицией (для occlusion луча)
    pub eye_height: f32,
    /// Направление взгляда
    pub forward: Vec3,
}

impl ObserverPose {
    pub fn new(position: Vec3, forward: Vec3, eye_height: f32) -> Self {
        Self {
            position,
            eye_height,
            forward,
        }
    }

    /// Поза из Transform (Bevy forward = -Z)
    pub fn from_transform(transform: &Transform, eye_height: f32) -> Self {
        Self::new(transform.translation, transform.forward().as_vec3(), eye_height)
    }

    pub fn eye(&self) -> Vec3 {
        self.position + Vec3::Y * self.eye_height
    }
}

/// Видит ли наблюдатель цель
///
/// Проверки по возрастанию стоимости, short-circuit:
/// 1. distance > range → false
/// 2. угол между forward и направлением на цель > half_angle → false
/// 3. occlusion луч от глаз к цели перекрыт → false
///
/// range ≤ 0 выключает зрение полностью (даже на дистанции 0).
pub fn can_see(
    observer: &ObserverPose,
    target: Vec3,
    range: f32,
    half_angle_deg: f32,
    occlusion: &impl OcclusionQuery,
) -> bool {
    if range <= 0.0 {
        return false;
    }

    let to_target = target - observer.position;
    let distance = to_target.length();
    if distance > range {
        return false;
    }

    // Цель "внутри" наблюдателя — угол не определён, считаем в конусе
    if distance > f32::EPSILON {
        let angle = observer.forward.angle_between(to_target).to_degrees();
        if angle.is_nan() || angle > half_angle_deg {
            return false;
        }
    }

    // Луч на уровне глаз параллельно направлению на цель
    let eye = observer.eye();
    let eye_target = eye + to_target;
    !occlusion.is_blocked(eye, eye_target, distance)
}

/// Слышит ли слушатель шум цели
///
/// Оба условия обязательны: цель в радиусе своего шума И в пределах
/// слуха слушателя. Громкий шум за пределами hearing_range не слышен.
pub fn can_hear(
    listener: Vec3,
    target: Vec3,
    target_noise_radius: f32,
    hearing_range: f32,
) -> bool {
    if target_noise_radius <= 0.0 || hearing_range <= 0.0 {
        return false;
    }

    let distance = listener.distance(target);
    distance <= target_noise_radius && distance <= hearing_range
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose_facing_x() -> ObserverPose {
        ObserverPose::new(Vec3::ZERO, Vec3::X, 1.0)
    }

    #[test]
    fn test_range_dominates() {
        let pose = pose_facing_x();

        // Прямо перед носом, но дальше range
        assert!(!can_see(&pose, Vec3::new(25.0, 0.0, 0.0), 20.0, 60.0, &OpenSpace));
        // Даже с конусом 180°
        assert!(!can_see(&pose, Vec3::new(25.0, 0.0, 0.0), 20.0, 180.0, &OpenSpace));
        assert!(can_see(&pose, Vec3::new(15.0, 0.0, 0.0), 20.0, 60.0, &OpenSpace));
    }

    #[test]
    fn test_cone_rejects_behind() {
        let pose = pose_facing_x();

        assert!(!can_see(&pose, Vec3::new(-5.0, 0.0, 0.0), 20.0, 60.0, &OpenSpace));
        // 45° — внутри половинного угла 60°
        assert!(can_see(&pose, Vec3::new(5.0, 0.0, 5.0), 20.0, 60.0, &OpenSpace));
        // ~63° — снаружи
        assert!(!can_see(&pose, Vec3::new(5.0, 0.0, 10.0), 20.0, 60.0, &OpenSpace));
    }

    #[test]
    fn test_occlusion_blocks_sight() {
        let pose = pose_facing_x();
        let obstacles = Obstacles::new().with_wall(Vec3::new(5.0, 1.0, 0.0), Vec3::new(0.5, 2.0, 2.0));

        assert!(!can_see(&pose, Vec3::new(10.0, 0.0, 0.0), 20.0, 60.0, &obstacles));
        assert!(can_see(&pose, Vec3::new(3.0, 0.0, 0.0), 20.0, 60.0, &obstacles));
    }

    #[test]
    fn test_zero_sight_range_is_blind() {
        let pose = pose_facing_x();

        assert!(!can_see(&pose, Vec3::ZERO, 0.0, 60.0, &OpenSpace));
    }

    #[test]
    fn test_hearing_ceiling_dominates() {
        // Шум 30м, но слух 15м, дистанция 20
        assert!(!can_hear(Vec3::ZERO, Vec3::new(20.0, 0.0, 0.0), 30.0, 15.0));
        // Слух большой, но шум тихий
        assert!(!can_hear(Vec3::ZERO, Vec3::new(8.0, 0.0, 0.0), 5.0, 15.0));
        assert!(can_hear(Vec3::ZERO, Vec3::new(8.0, 0.0, 0.0), 10.0, 15.0));
    }

    #[test]
    fn test_silent_target_not_heard() {
        assert!(!can_hear(Vec3::ZERO, Vec3::ZERO, 0.0, 15.0));
        assert!(!can_hear(Vec3::ZERO, Vec3::X, 10.0, 0.0));
    }
}
