//! StunSchedule — очередь отложенных impact'ов
//!
//! Вместо coroutine/таска: запись с fires_at по simulation clock,
//! которую deliver_stun_impacts снимает в том же FixedUpdate тике.
//! Запись хранит только Entity — валидность цели проверяется при срабатывании.

use bevy::prelude::*;

/// Отложенный slap impact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StunRequest {
    pub actor: Entity,
    pub target: Entity,
    /// Исходная задержка (для логов/телеметрии)
    pub impact_delay: f32,
    /// Момент срабатывания по StunSchedule clock
    pub fires_at: f32,
    /// Длительность incapacitation
    pub duration: f32,
    /// Сила импульса (направление считается при impact)
    pub force: f32,
    /// Радиус шума impact'а
    pub noise_radius: f32,
}

#[derive(Resource, Debug, Default)]
pub struct StunSchedule {
    clock: f32,
    pending: Vec<StunRequest>,
}

impl StunSchedule {
    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn pending(&self) -> &[StunRequest] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Запланировать impact через `delay` секунд от текущего clock
    pub fn schedule(
        &mut self,
        actor: Entity,
        target: Entity,
        delay: f32,
        duration: f32,
        force: f32,
        noise_radius: f32,
    ) -> StunRequest {
        let delay = delay.max(0.0);
        let request = StunRequest {
            actor,
            target,
            impact_delay: delay,
            fires_at: self.clock + delay,
            duration,
            force,
            noise_radius,
        };
        self.pending.push(request);
        request
    }

    /// Продвинуть clock и забрать созревшие impacts (в порядке планирования)
    pub fn advance(&mut self, delta: f32) -> Vec<StunRequest> {
        self.clock += delta.max(0.0);

        let clock = self.clock;
        let (due, pending): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|request| request.fires_at <= clock);
        self.pending = pending;
        due
    }

    /// Отменить все impacts по цели (captured/removed). Возвращает число отменённых.
    pub fn cancel_for(&mut self, target: Entity) -> usize {
        let before = self.pending.len();
        self.pending.retain(|request| request.target != target);
        before - self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
