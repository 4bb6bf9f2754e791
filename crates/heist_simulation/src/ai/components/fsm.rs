//! Guard FSM components (state machine, config, patrol route).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Patrol wait по умолчанию (секунды на waypoint)
pub const DEFAULT_PATROL_WAIT: f32 = 2.0;

/// Marker: entity — guard
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Guard;

/// Marker: guard активен (подписан на AlertBus, тикает FSM)
///
/// Добавление → subscribe, удаление/despawn → unsubscribe
/// (см. ai::systems::reactions::sync_alert_subscriptions).
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct OnDuty;

/// Guard FSM состояния
///
/// Ровно одно активное состояние. investigate position существует
/// только внутри Investigate (нет "висящей" позиции в других состояниях).
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub enum GuardState {
    /// Patrol — обход маршрута (начальное состояние)
    Patrol {
        /// Сколько ещё ждать на текущем waypoint (тикает только после прибытия)
        wait_timer: f32,
    },

    /// Investigate — идём к точке и осматриваемся
    Investigate {
        /// Последняя известная точка (most recent cue wins)
        position: Vec3,
        /// Осмотр на месте (тикает только после прибытия)
        timer: f32,
    },

    /// Chase — преследование intruder'а
    Chase {
        /// Где guard видел цель последний раз (→ Investigate при потере)
        last_seen: Vec3,
    },
}

impl Default for GuardState {
    fn default() -> Self {
        Self::Patrol {
            wait_timer: DEFAULT_PATROL_WAIT,
        }
    }
}

impl GuardState {
    pub fn patrol(config: &GuardConfig) -> Self {
        Self::Patrol {
            wait_timer: config.patrol_wait_time,
        }
    }

    pub fn kind(&self) -> GuardStateKind {
        match self {
            GuardState::Patrol { .. } => GuardStateKind::Patrol,
            GuardState::Investigate { .. } => GuardStateKind::Investigate,
            GuardState::Chase { .. } => GuardStateKind::Chase,
        }
    }

    /// Точка расследования (только в Investigate)
    pub fn investigate_position(&self) -> Option<Vec3> {
        match self {
            GuardState::Investigate { position, .. } => Some(*position),
            _ => None,
        }
    }

    pub fn is_chasing(&self) -> bool {
        matches!(self, GuardState::Chase { .. })
    }
}

/// Дискриминант состояния (для телеметрии/presentation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum GuardStateKind {
    Patrol,
    Investigate,
    Chase,
}

impl GuardStateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuardStateKind::Patrol => "PATROL",
            GuardStateKind::Investigate => "INVESTIGATE",
            GuardStateKind::Chase => "CHASE",
        }
    }
}

/// Параметры guard'а (фиксированы на run, difficulty применяется при спавне)
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct GuardConfig {
    /// Ожидание на каждом waypoint (секунды)
    pub patrol_wait_time: f32,
    /// Скорость в Patrol/Investigate (m/s)
    pub patrol_speed: f32,
    /// Скорость в Chase (m/s), быстрее patrol
    pub chase_speed: f32,
    /// Дальность зрения (метры)
    pub sight_range: f32,
    /// Полная ширина конуса зрения (градусы)
    pub sight_angle: f32,
    /// Потолок слуха (метры)
    pub hearing_range: f32,
    /// Дистанция поимки
    pub catch_distance: f32,
    /// Радиус реакции на sighting alert от других guards
    pub alert_radius: f32,
    /// Осмотр на точке Investigate (секунды после прибытия)
    pub investigate_duration: f32,
    /// Высота глаз над позицией (occlusion луч)
    pub eye_height: f32,
    /// Arrival tolerance для waypoint
    pub patrol_arrival_tolerance: f32,
    /// Arrival tolerance для investigate точки
    pub investigate_arrival_tolerance: f32,
    /// Noise alert ближе radius × ratio → "очень близко"
    pub close_noise_ratio: f32,
    /// Множитель investigate_duration после близкого шума
    pub close_noise_search_multiplier: f32,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            patrol_wait_time: DEFAULT_PATROL_WAIT,
            patrol_speed: 4.0,
            chase_speed: 6.0,
            sight_range: 20.0,
            sight_angle: 120.0,
            hearing_range: 15.0,
            catch_distance: 1.5,
            alert_radius: 30.0,
            investigate_duration: 10.0,
            eye_height: 1.0,
            patrol_arrival_tolerance: 0.3,
            investigate_arrival_tolerance: 0.5,
            close_noise_ratio: 0.4,
            close_noise_search_multiplier: 1.5,
        }
    }
}

impl GuardConfig {
    pub fn half_sight_angle(&self) -> f32 {
        self.sight_angle * 0.5
    }

    /// Difficulty scaling: зрение и слух × multiplier
    pub fn scaled_senses(mut self, multiplier: f32) -> Self {
        let multiplier = multiplier.max(0.0);
        self.sight_range *= multiplier;
        self.hearing_range *= multiplier;
        self
    }
}

/// Маршрут патруля (циклический, порядок вставки = порядок обхода)
///
/// Index сохраняется при Investigate/Chase — после осмотра guard
/// возвращается к тому же waypoint (маршрут не перемешивается mid-run).
#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct PatrolRoute {
    pub waypoints: Vec<Vec3>,
    pub index: usize,
}

impl PatrolRoute {
    pub fn new(waypoints: Vec<Vec3>) -> Self {
        Self { waypoints, index: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn current(&self) -> Option<Vec3> {
        self.waypoints.get(self.index).copied()
    }

    /// Следующий waypoint (cyclic wrap)
    pub fn advance(&mut self) {
        if self.waypoints.is_empty() {
            self.index = 0;
            return;
        }
        self.index = (self.index + 1) % self.waypoints.len();
    }
}
