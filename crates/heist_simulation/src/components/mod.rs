//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: intruder и цели slap (Player, Slappable, Stamina, Incapacitated, Captured)
//! - movement: команды перемещения (MovementCommand)
//!
//! Guard-компоненты (GuardState, GuardConfig, PatrolRoute) живут в crate::ai,
//! noise-компоненты (Locomotion, NoiseProfile, NoiseEmission) — в crate::noise.

pub mod actor;
pub mod movement;

// Re-exports для удобного импорта
pub use actor::*;
pub use movement::*;
