//! HEXFILL Core - Territory engine and robots
//!
//! This crate provides the core logic of a two-player hex territory game:
//! - Grid geometry (column-major hex grid with parity holes)
//! - Capture flood fill and territory counting
//! - Ownership classification and reachability distances
//! - Evaluators, one-ply lookahead and strategy primitives
//! - Robot players, external players and a game runner

pub mod grid;
pub mod board;
pub mod scratch;
pub mod capture;
pub mod classify;
pub mod distance;
pub mod eval;
pub mod lookahead;
pub mod strategy;
pub mod error;
pub mod settings;
pub mod game;
pub mod robot;
pub mod runner;

// Re-exports for convenient access
pub use grid::{CellIndex, HexGrid, Origins};
pub use board::{Board, Color, ColorSet, MAX_COLORS, NO_COLOR};
pub use scratch::Scratch;
pub use capture::{capture, territory, Capture};
pub use classify::{classify, Class, ClassSet, MUST_BE_FREE, MUST_BE_HIS, MUST_BE_MINE};
pub use distance::{best_goal_colors, distances, Distance, UNREACHABLE};
pub use eval::{DistanceEvaluator, Evaluator, ExpandEvaluator, TerritoryEvaluator};
pub use lookahead::Lookahead;
pub use strategy::TurnView;
pub use error::{FillerError, Result};
pub use settings::Settings;
pub use game::{apply_move, validate_move, Game, Seat};
pub use robot::{ExternalPlayer, Player, Robot, RobotKind, Turn};
pub use runner::{GameOutcome, GameRunner, MoveSource, NoSource};
