//! Difficulty presets (Easy / Normal / Hard)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Normal => "NORMAL",
            Difficulty::Hard => "HARD",
        }
    }

    pub fn settings(self) -> DifficultySettings {
        DifficultySettings::for_difficulty(self)
    }
}

/// Resource: активные настройки сложности
///
/// Нет resource → roster берёт base_guard_count и не масштабирует чувства.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultySettings {
    pub difficulty: Difficulty,
    /// Таймер побега (секунды), читает host
    pub escape_duration: f32,
    /// Сколько guards спавнить
    pub max_guards: usize,
    /// Множитель sight_range и hearing_range
    pub sight_multiplier: f32,
    /// Множитель очков, читает host
    pub score_multiplier: f32,
}

impl Default for DifficultySettings {
    fn default() -> Self {
        Self::for_difficulty(Difficulty::Normal)
    }
}

impl DifficultySettings {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        let (escape_duration, max_guards, sight_multiplier, score_multiplier) = match difficulty {
            Difficulty::Easy => (300.0, 2, 0.7, 0.5),
            Difficulty::Normal => (240.0, 3, 1.0, 1.0),
            Difficulty::Hard => (180.0, 4, 1.3, 2.0),
        };

        Self {
            difficulty,
            escape_duration,
            max_guards,
            sight_multiplier,
            score_multiplier,
        }
    }
}
