//! AlertBus — broadcast канал guard ↔ guard (sighting) и мир → guards (noise)
//!
//! Явный Resource вместо глобального static event:
//! - subscribe/unsubscribe привязаны к активации guard'а (OnDuty)
//! - publish синхронный, в порядке подписки, внутри текущего тика
//! - никакой очереди между тиками, никакой persistence
//!
//! Re-entrant publish невозможен: publish берёт `&mut self`, handler до bus
//! не дотягивается. Вместо этого handler возвращает follow-up alert, bus
//! доставляет его ПОСЛЕ текущего broadcast (тот же вызов, тот же тик).

use bevy::prelude::*;
use std::collections::VecDeque;

/// Alert сообщение (transient, не хранится)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlertEvent {
    /// Визуальное обнаружение: "investigate here"
    Sighting {
        position: Vec3,
        /// Guard который разослал (сам себе не реагирует)
        source: Option<Entity>,
    },
    /// Громкий шум (slap): receivers решают chase/investigate по дистанции
    Noise { position: Vec3, radius: f32 },
}

impl AlertEvent {
    pub fn sighting(position: Vec3, source: Entity) -> Self {
        Self::Sighting {
            position,
            source: Some(source),
        }
    }

    pub fn noise(position: Vec3, radius: f32) -> Self {
        Self::Noise { position, radius }
    }

    pub fn position(&self) -> Vec3 {
        match self {
            AlertEvent::Sighting { position, .. } | AlertEvent::Noise { position, .. } => *position,
        }
    }
}

/// Обработчик доставки (на стороне подписчиков)
///
/// ECS: GuardAlertSink поверх Query guards. Тесты: любой mock.
pub trait AlertHandler {
    /// Доставить event подписчику. Можно вернуть follow-up alert —
    /// bus разошлёт его после завершения текущего broadcast.
    fn handle_alert(&mut self, subscriber: Entity, event: &AlertEvent) -> Option<AlertEvent>;
}

/// Outcome sink: шум для host слоя (audio, HUD, score)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct NoiseEmitted {
    pub position: Vec3,
    pub radius: f32,
}

/// Broadcast канал
///
/// Subscriber list меняется только через subscribe/unsubscribe,
/// никогда во время publish (publish держит `&mut self`).
#[derive(Resource, Debug, Default)]
pub struct AlertBus {
    subscribers: Vec<Entity>,
    published: u64,
    delivered: u64,
}

impl AlertBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Подписать (idempotent). Возвращает true если подписка новая.
    pub fn subscribe(&mut self, subscriber: Entity) -> bool {
        if self.subscribers.contains(&subscriber) {
            return false;
        }
        self.subscribers.push(subscriber);
        true
    }

    /// Отписать. Порядок остальных сохраняется.
    pub fn unsubscribe(&mut self, subscriber: Entity) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|&e| e != subscriber);
        before != self.subscribers.len()
    }

    pub fn is_subscribed(&self, subscriber: Entity) -> bool {
        self.subscribers.contains(&subscriber)
    }

    /// Подписчики в порядке подписки
    pub fn subscribers(&self) -> &[Entity] {
        &self.subscribers
    }

    /// Сколько events разослано (включая follow-ups)
    pub fn published_count(&self) -> u64 {
        self.published
    }

    /// Сколько доставок (event × subscriber)
    pub fn delivered_count(&self) -> u64 {
        self.delivered
    }

    pub fn clear(&mut self) {
        self.subscribers.clear();
    }

    /// Разослать event всем текущим подписчикам
    ///
    /// Follow-ups доставляются в FIFO порядке после исходного broadcast.
    /// Follow-up от Sighting доставки отбрасывается: цепочка ограничена
    /// noise → sighting (mutual sight chains не разгоняются).
    ///
    /// Возвращает число доставок.
    pub fn publish(&mut self, event: AlertEvent, handler: &mut impl AlertHandler) -> usize {
        let mut queue = VecDeque::from([event]);
        let mut deliveries = 0;

        while let Some(current) = queue.pop_front() {
            self.published += 1;

            for &subscriber in &self.subscribers {
                deliveries += 1;
                let Some(follow_up) = handler.handle_alert(subscriber, &current) else {
                    continue;
                };

                if matches!(current, AlertEvent::Sighting { .. }) {
                    crate::log_warning(&format!(
                        "AlertBus: follow-up {:?} from sighting delivery to {:?} dropped",
                        follow_up, subscriber
                    ));
                    continue;
                }
                queue.push_back(follow_up);
            }
        }

        self.delivered += deliveries as u64;
        deliveries
    }
}
