//! Occlusion query — "закрыт ли луч стеной"
//!
//! Реальный host (движок) реализует OcclusionQuery через свой physics raycast.
//! Headless: Obstacles resource с AABB стенами + bevy_math RayCast3d.

use bevy::math::bounding::{Aabb3d, RayCast3d};
use bevy::math::{Dir3, Ray3d};
use bevy::prelude::*;

/// Capability: проверка видимости между двумя точками
pub trait OcclusionQuery {
    /// true если луч from → to перекрыт на дистанции ≤ max_distance
    fn is_blocked(&self, from: Vec3, to: Vec3, max_distance: f32) -> bool;
}

/// Пустое пространство — ничего не перекрывает (тесты, открытые карты)
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenSpace;

impl OcclusionQuery for OpenSpace {
    fn is_blocked(&self, _from: Vec3, _to: Vec3, _max_distance: f32) -> bool {
        false
    }
}

/// Статичные препятствия (стены) уровня
///
/// Host заполняет при загрузке уровня; guards читают каждый тик.
#[derive(Resource, Debug, Clone, Default)]
pub struct Obstacles {
    walls: Vec<Aabb3d>,
}

impl Obstacles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавить стену (центр + половинные размеры)
    pub fn add_wall(&mut self, center: Vec3, half_size: Vec3) {
        self.walls.push(Aabb3d::new(center, half_size));
    }

    pub fn with_wall(mut self, center: Vec3, half_size: Vec3) -> Self {
        self.add_wall(center, half_size);
        self
    }

    pub fn clear(&mut self) {
        self.walls.clear();
    }

    pub fn len(&self) -> usize {
        self.walls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }
}

impl OcclusionQuery for Obstacles {
    fn is_blocked(&self, from: Vec3, to: Vec3, max_distance: f32) -> bool {
        if self.walls.is_empty() || max_distance <= 0.0 {
            return false;
        }

        // Нулевой луч (from == to) ничего не перекрывает
        let Ok(direction) = Dir3::new(to - from) else {
            return false;
        };

        let ray = RayCast3d::from_ray(Ray3d { origin: from, direction }, max_distance);
        self.walls
            .iter()
            .any(|wall| ray.aabb_intersection_at(wall).is_some())
    }
}
