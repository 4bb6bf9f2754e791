//! Heist Simulation Core
//!
//! ECS-симуляция stealth-ограбления на Bevy 0.16:
//! guards (Patrol / Investigate / Chase), зрение и слух, AlertBus между guards,
//! шум intruder'а и slap (отложенный stun).
//!
//! Host (движок/клиент) владеет рендером, анимацией, pathfinding и input:
//! пишет Transform/Locomotion/SlapIntent, читает MovementCommand и events.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod alert;
pub mod components;
pub mod logger;
pub mod noise;
pub mod roster;
pub mod sensing;
pub mod stun;

// Re-export базовых компонентов для удобства
pub use ai::{
    AIPlugin, Guard, GuardConfig, GuardState, GuardStateKind, OnDuty, PatrolRoute, TargetCaptured,
    TargetSnapshot, TargetView,
};
pub use alert::{AlertBus, AlertEvent, AlertHandler, NoiseEmitted};
pub use components::*;
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use noise::{Locomotion, NoiseEmission, NoiseLevel, NoisePlugin, NoiseProfile};
pub use roster::{
    despawn_roster, plan_roster, restart_mission, spawn_roster, Difficulty, DifficultySettings,
    GuardRoster, RosterPlugin, SpawnPoint,
};
pub use sensing::{can_hear, can_see, Obstacles, ObserverPose, OcclusionQuery, OpenSpace};
pub use stun::{SlapIntent, Slapper, StunPlugin, StunSchedule};

/// Фазы одного simulation тика (FixedUpdate), строго по порядку
///
/// Timers → Stun → Target → Guards → Outcome → Movement
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Cooldowns, incapacitation, AlertBus подписки
    Timers,
    /// Slap intents + доставка impacts
    Stun,
    /// Stamina, noise emission, TargetSnapshot
    Target,
    /// Guard FSM + alerts
    Guards,
    /// Captures
    Outcome,
    /// Исполнение MovementCommand
    Movement,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            // Детерминистичный RNG (seed по умолчанию)
            .insert_resource(DeterministicRng::new(42))
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Timers,
                    SimulationSet::Stun,
                    SimulationSet::Target,
                    SimulationSet::Guards,
                    SimulationSet::Outcome,
                    SimulationSet::Movement,
                )
                    .chain(),
            )
            // Подсистемы
            .add_plugins((NoisePlugin, StunPlugin, AIPlugin, RosterPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт Bevy App для headless симуляции (все подсистемы + seed)
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .add_plugins(SimulationPlugin)
        // SimulationPlugin ставит seed по умолчанию, перезаписываем
        .insert_resource(DeterministicRng::new(seed));

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
