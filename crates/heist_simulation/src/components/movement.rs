//! Movement компоненты: команды перемещения

use bevy::prelude::*;

/// Команда движения для актора
///
/// Архитектура:
/// - Guard FSM пишет MovementCommand (high-level intent, "move toward point")
/// - Исполнитель (path following) читает и двигает Transform
/// - Headless: ai::systems::movement::apply_movement_commands (straight line)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub enum MovementCommand {
    /// Стоять на месте (hold position)
    Idle,
    /// Двигаться к позиции (world coordinates) с заданной скоростью
    MoveToPosition { target: Vec3, speed: f32 },
}

impl Default for MovementCommand {
    fn default() -> Self {
        Self::Idle
    }
}

impl MovementCommand {
    /// Куда сейчас идём (None для Idle)
    pub fn destination(&self) -> Option<Vec3> {
        match self {
            MovementCommand::Idle => None,
            MovementCommand::MoveToPosition { target, .. } => Some(*target),
        }
    }
}

/// Дошли ли до точки (arrival tolerance)
///
/// Аналог NavigationAgent.is_target_reached(), только по прямой дистанции.
pub fn has_arrived(position: Vec3, destination: Vec3, tolerance: f32) -> bool {
    position.distance(destination) <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_arrived_tolerance() {
        let destination = Vec3::new(10.0, 0.0, 0.0);

        assert!(has_arrived(Vec3::new(9.8, 0.0, 0.0), destination, 0.3));
        assert!(!has_arrived(Vec3::new(9.0, 0.0, 0.0), destination, 0.3));
    }

    #[test]
    fn test_destination() {
        assert_eq!(MovementCommand::Idle.destination(), None);

        let command = MovementCommand::MoveToPosition {
            target: Vec3::X,
            speed: 4.0,
        };
        assert_eq!(command.destination(), Some(Vec3::X));
    }
}
