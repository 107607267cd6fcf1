//! Position evaluation for lookahead

use crate::board::Board;
use crate::classify::{Class, MUST_BE_HIS, MUST_BE_MINE};
use crate::distance::UNREACHABLE;
use crate::grid::Origins;
use crate::scratch::Scratch;

/// Cost charged for a cell the player can never reach
pub const INACCESSIBLE: i64 = 50;

/// Scores a classified board from the perspective of `origins.mine`.
/// Higher is better.
pub trait Evaluator: Send + Sync {
    fn score(&self, board: &Board, scratch: &Scratch, origins: Origins) -> i64;

    /// Whether `score` reads the distance buffers
    fn needs_distances(&self) -> bool {
        false
    }
}

/// How much closer I am to the rest of the board than my opponent
#[derive(Clone, Copy, Debug, Default)]
pub struct DistanceEvaluator;

impl Evaluator for DistanceEvaluator {
    fn score(&self, board: &Board, scratch: &Scratch, _origins: Origins) -> i64 {
        let grid = board.grid();
        let cost = |d: u32| {
            if d == UNREACHABLE {
                INACCESSIBLE
            } else {
                d as i64
            }
        };

        let mut mine = 0;
        let mut his = 0;
        for i in grid.valid_cells() {
            mine += cost(scratch.distances()[i]);
            his += cost(scratch.opponent_distances()[i]);
        }
        his - mine
    }

    fn needs_distances(&self) -> bool {
        true
    }
}

/// Reward pushing the border as far from home as possible
#[derive(Clone, Copy, Debug, Default)]
pub struct ExpandEvaluator;

impl Evaluator for ExpandEvaluator {
    fn score(&self, board: &Board, scratch: &Scratch, origins: Origins) -> i64 {
        let grid = board.grid();
        grid.valid_cells()
            .filter(|&i| matches!(scratch.class(i), Class::Border | Class::SharedBorder))
            .map(|i| grid.side_distance(origins.mine, i) as i64)
            .max()
            .unwrap_or(i64::MIN)
    }
}

/// Secured cells minus the opponent's secured cells
#[derive(Clone, Copy, Debug, Default)]
pub struct TerritoryEvaluator;

impl Evaluator for TerritoryEvaluator {
    fn score(&self, board: &Board, scratch: &Scratch, _origins: Origins) -> i64 {
        let mut score = 0;
        for i in board.grid().valid_cells() {
            let class = scratch.class(i);
            if MUST_BE_MINE.contains(class) {
                score += 1;
            } else if MUST_BE_HIS.contains(class) {
                score -= 1;
            }
        }
        score
    }
}
