//! Color-change distances over a classified board
//!
//! The distance to a cell is the number of moves needed before it joins the
//! territory: stepping onto a neighbour of the same color is free, any other
//! step costs one move. Solved with a stack-based label-correcting pass.

use crate::board::{Board, ColorSet};
use crate::classify::{Class, MUST_BE_HIS, MUST_BE_MINE};
use crate::grid::{CellIndex, HexGrid};
use crate::scratch::Scratch;

pub type Distance = u32;

/// Cell the player can never capture
pub const UNREACHABLE: Distance = Distance::MAX;

/// Not yet labelled; never survives a completed pass
pub const UNKNOWN: Distance = Distance::MAX - 1;

/// Fill `scratch.distance` for me and `scratch.opponent_distance` for the
/// opponent. The scratch must hold a classification of `board`.
pub fn distances(board: &Board, scratch: &mut Scratch) {
    assert_eq!(scratch.len(), board.len(), "scratch does not match board");

    let Scratch {
        classes,
        listed,
        stack,
        distance,
        opponent_distance,
        ..
    } = scratch;

    relax(board, classes, listed, stack, distance);

    // the opponent's view is the same classification mirrored
    mirror(classes);
    relax(board, classes, listed, stack, opponent_distance);
    mirror(classes);
}

fn mirror(classes: &mut [Class]) {
    for c in classes.iter_mut() {
        *c = c.mirrored();
    }
}

fn relax(
    board: &Board,
    classes: &[Class],
    listed: &mut [bool],
    stack: &mut Vec<CellIndex>,
    distance: &mut [Distance],
) {
    let grid = board.grid();
    listed.fill(false);
    stack.clear();

    for (i, &class) in classes.iter().enumerate() {
        distance[i] = if !grid.valid(i) || MUST_BE_HIS.contains(class) {
            UNREACHABLE
        } else if MUST_BE_MINE.contains(class) {
            0
        } else if matches!(class, Class::Border | Class::SharedBorder) {
            listed[i] = true;
            stack.push(i);
            1
        } else {
            UNKNOWN
        };
    }

    while let Some(p) = stack.pop() {
        listed[p] = false;
        let dp = distance[p];
        let color = board.get(p);
        for &q in grid.neighbors(p) {
            let dq = distance[q];
            if dq == UNREACHABLE || dq == 0 {
                continue;
            }
            let expected = if board.get(q) == color { dp } else { dp + 1 };
            if dq == UNKNOWN || expected < dq {
                distance[q] = expected;
                if !listed[q] {
                    listed[q] = true;
                    stack.push(q);
                }
            }
        }
    }

    for d in distance.iter_mut() {
        if *d == UNKNOWN {
            *d = UNREACHABLE;
        }
    }
}

/// Colors that start a shortest route from my border to `goal`.
///
/// Walks back from the goal's same-colored blob through strictly decreasing
/// distances until it reaches cells at distance one, and returns their
/// colors. Empty when the goal is already mine or out of reach.
pub fn best_goal_colors(board: &Board, scratch: &mut Scratch, goal: CellIndex) -> ColorSet {
    let mut remaining = match scratch.distance(goal) {
        Some(d) if d > 0 => d,
        _ => return ColorSet::EMPTY,
    };
    let grid = board.grid();

    scratch.reset_listed();
    let Scratch {
        listed, distance, ..
    } = scratch;

    listed[goal] = true;
    let mut frontier = spread_same_color(grid, board, listed, vec![goal]);

    while remaining > 1 {
        let mut lower = Vec::new();
        for &p in &frontier {
            for &q in grid.neighbors(p) {
                if listed[q] {
                    continue;
                }
                let dq = distance[q];
                if dq > 0 && dq < remaining {
                    listed[q] = true;
                    lower.push(q);
                }
            }
        }
        frontier = spread_same_color(grid, board, listed, lower);
        remaining -= 1;
    }

    frontier.iter().map(|&p| board.get(p)).collect()
}

/// Grow each seed through unlisted neighbours of its own color
fn spread_same_color(
    grid: &HexGrid,
    board: &Board,
    listed: &mut [bool],
    mut stack: Vec<CellIndex>,
) -> Vec<CellIndex> {
    let mut cells = Vec::with_capacity(stack.len());
    while let Some(p) = stack.pop() {
        cells.push(p);
        let color = board.get(p);
        for &q in grid.neighbors(p) {
            if !listed[q] && board.get(q) == color {
                listed[q] = true;
                stack.push(q);
            }
        }
    }
    cells
}
