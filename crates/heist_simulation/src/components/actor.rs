//! Компоненты intruder'а: маркеры, stamina, статусы stun/capture

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Marker: intruder, за которым охотятся guards
///
/// В single-player ровно один entity имеет этот компонент.
/// TargetSnapshot строится из него каждый тик (см. ai::target).
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;

/// Capability: по entity можно ударить (slap)
///
/// Разрешается один раз при спавне (With<Slappable> filter),
/// StunSystem не ищет "компонент цели" каждый тик.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Slappable;

/// Marker: intruder пойман guard'ом (mission over)
///
/// Ставится системой apply_captures по TargetCaptured event.
/// После этого guards больше не тикают, pending stun impacts дропаются.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Captured;

/// Incapacitation ("stun") после slap
///
/// Пока компонент висит: нет управления, noise radius == 0.
/// Снимается когда `remaining` дошёл до 0 или при capture.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Incapacitated {
    /// Сколько секунд осталось (clamp к 0, не уходит в минус)
    pub remaining: f32,
    /// Импульс удара (для ragdoll в presentation слое)
    pub force: Vec3,
}

impl Incapacitated {
    pub fn new(duration: f32, force: Vec3) -> Self {
        Self {
            remaining: duration.max(0.0),
            force,
        }
    }

    /// Тик таймера. Возвращает true когда stun закончился.
    pub fn tick(&mut self, delta: f32) -> bool {
        self.remaining = (self.remaining - delta).max(0.0);
        self.remaining <= 0.0
    }
}

/// Выносливость intruder'а (бег)
///
/// Инвариант: 0.0 ≤ current ≤ max
/// Бег тратит drain_rate/сек, остальное время regen_rate/сек.
/// При 0 → depleted, бег запрещён пока не восстановится recover_fraction × max.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct Stamina {
    pub current: f32,
    pub max: f32,
    pub drain_rate: f32,
    pub regen_rate: f32,
    /// Доля max, после которой depleted снимается (0.2 = 20%)
    pub recover_fraction: f32,
    pub depleted: bool,
}

impl Default for Stamina {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Stamina {
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
            max,
            drain_rate: 20.0,
            regen_rate: 10.0,
            recover_fraction: 0.2,
            depleted: false,
        }
    }

    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            return 0.0;
        }
        self.current / self.max
    }

    pub fn can_run(&self) -> bool {
        !self.depleted
    }

    pub fn drain(&mut self, delta: f32) {
        self.current = (self.current - self.drain_rate * delta).max(0.0);
        if self.current <= 0.0 {
            self.depleted = true;
        }
    }

    pub fn regenerate(&mut self, delta: f32) {
        self.current = (self.current + self.regen_rate * delta).min(self.max);
        if self.depleted && self.current >= self.max * self.recover_fraction {
            self.depleted = false;
        }
    }
}
