//! Move application: recolor a territory and merge what it now touches

use crate::board::{Board, Color};
use crate::grid::CellIndex;
use crate::scratch::Scratch;

/// Territory size before and after one capture
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capture {
    pub before: usize,
    pub after: usize,
}

impl Capture {
    /// Score after the move
    pub fn score(&self) -> usize {
        self.after
    }

    /// Cells merged in by this move
    pub fn gained(&self) -> usize {
        self.after - self.before
    }
}

/// Recolor the territory connected to `origin` to `color`, then absorb every
/// connected cell that already had `color`.
///
/// The territory is recomputed from the board each call. On return
/// `scratch.captured` marks exactly the final territory. The caller is
/// responsible for rejecting illegal colors first.
pub fn capture(
    board: &mut Board,
    origin: CellIndex,
    color: Color,
    scratch: &mut Scratch,
) -> Capture {
    let before = flood(board, origin, scratch);

    let grid = board.grid_arc();
    for i in 0..grid.size() {
        if scratch.captured[i] {
            board.set(i, color);
        }
    }

    let after = flood(board, origin, scratch);
    debug_assert!(after >= before);
    Capture { before, after }
}

/// Size of the territory connected to `origin`, marked in `scratch.captured`
pub fn territory(board: &Board, origin: CellIndex, scratch: &mut Scratch) -> usize {
    flood(board, origin, scratch)
}

fn flood(board: &Board, origin: CellIndex, scratch: &mut Scratch) -> usize {
    let grid = board.grid();
    assert!(grid.valid(origin), "origin {} is not a valid cell", origin);
    assert_eq!(scratch.len(), board.len(), "scratch does not match board");

    scratch.reset_listed();
    scratch.captured.fill(false);

    let color = board.get(origin);
    let mut size = 0;
    scratch.listed[origin] = true;
    scratch.stack.push(origin);

    while let Some(p) = scratch.stack.pop() {
        scratch.captured[p] = true;
        size += 1;
        for &q in grid.neighbors(p) {
            if !scratch.listed[q] && board.get(q) == color {
                scratch.listed[q] = true;
                scratch.stack.push(q);
            }
        }
    }

    size
}
