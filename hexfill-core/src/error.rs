//! Error types for game play

use crate::board::Color;

/// Errors for moves and setup
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FillerError {
    #[error("color {color} is outside the {num_colors}-color palette")]
    ColorOutOfRange { color: Color, num_colors: usize },

    #[error("color {0} is the opponent's color")]
    OpponentColor(Color),

    #[error("player has no pending turn")]
    NotPending,

    #[error("seat {0} is not to move")]
    OutOfTurn(usize),

    #[error("game is already over")]
    GameOver,

    #[error("unknown robot: {0}")]
    UnknownRobot(String),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

pub type Result<T> = std::result::Result<T, FillerError>;
