//! Tetrion — classic falling-block puzzle engine.
//!
//! The crate owns the game state only: playfield grid, piece catalog, the
//! falling piece, scoring, level progression, gravity ticking and puzzle
//! goals. Rendering and input polling live outside; collaborators observe
//! the [`Session`] read-only and drive it with discrete [`Command`]s.
//!
//! ```no_run
//! use std::time::Instant;
//! use tetrion::{Command, GameConfig, Session};
//!
//! let mut session = Session::new(GameConfig::default(), Instant::now()).unwrap();
//! session.apply(Command::MoveLeft, Instant::now());
//! session.update(Instant::now());
//! ```

pub mod game;
pub mod highscores;
pub mod input;
pub mod pieces;
pub mod puzzle;

pub use game::{Cell, Command, GameOverReason, Piece, Playfield, Session, Status};
pub use input::key_to_command;
pub use pieces::TetrominoKind;
pub use puzzle::{GoalKind, Puzzle, PuzzleError, PuzzleGoal};

use thiserror::Error;

/// Options that shape a session: playfield size, starting level, preview
/// queue length and the bag seed.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub width: u16,
    pub height: u16,
    pub initial_level: u32,
    pub preview_count: usize,
    pub seed: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 20,
            initial_level: 1,
            preview_count: 3,
            seed: 0x1234_5678,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("playfield too small: {width}x{height} (minimum 4x4)")]
    Dimensions { width: u16, height: u16 },
    #[error("preview queue cannot be empty")]
    EmptyPreview,
    #[error("initial level must be at least 1")]
    ZeroLevel,
}

impl GameConfig {
    /// Checked once at session construction; dimensions never change after.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < 4 || self.height < 4 {
            return Err(ConfigError::Dimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.preview_count == 0 {
            return Err(ConfigError::EmptyPreview);
        }
        if self.initial_level == 0 {
            return Err(ConfigError::ZeroLevel);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_tiny_playfield_rejected() {
        let config = GameConfig {
            width: 3,
            height: 20,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Dimensions { width: 3, height: 20 })
        ));
    }

    #[test]
    fn test_zero_level_rejected() {
        let config = GameConfig {
            initial_level: 0,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroLevel)));
    }
}
