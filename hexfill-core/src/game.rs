//! Game state and move application

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::board::{Board, Color};
use crate::capture::{capture, territory};
use crate::error::{FillerError, Result};
use crate::grid::{CellIndex, HexGrid, Origins};
use crate::scratch::Scratch;
use crate::settings::Settings;

// ============================================================================
// CORE TYPES
// ============================================================================

/// One of the two seats at the board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    pub const BOTH: [Seat; 2] = [Seat::First, Seat::Second];

    pub fn opponent(self) -> Self {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Seat::First => 0,
            Seat::Second => 1,
        }
    }
}

/// Check a proposed color against the palette and the opponent's color
pub fn validate_move(color: Color, opponent: Color, num_colors: usize) -> Result<Color> {
    if color as usize >= num_colors {
        return Err(FillerError::ColorOutOfRange { color, num_colors });
    }
    if color == opponent {
        return Err(FillerError::OpponentColor(color));
    }
    Ok(color)
}

/// Capture `color` from `origin` and return the new score
pub fn apply_move(board: &mut Board, origin: CellIndex, color: Color) -> usize {
    let mut scratch = Scratch::new(board.grid());
    capture(board, origin, color, &mut scratch).score()
}

// ============================================================================
// GAME
// ============================================================================

#[derive(Clone, Debug)]
pub struct Game {
    settings: Settings,
    board: Board,
    /// Seat 0's view; seat 1 sees them swapped
    origins: Origins,
    points_to_win: usize,
    colors: [Color; 2],
    scores: [usize; 2],
    to_move: Seat,
    turns: usize,
    scratch: Scratch,
}

impl Game {
    /// New game on a random board drawn from `seed`
    pub fn new(settings: Settings, seed: u64) -> Result<Self> {
        settings.validate()?;
        let grid = Arc::new(settings.grid());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let board = Board::random(grid, settings.num_colors, &mut rng);
        Self::with_board(settings, board)
    }

    /// New game on a given board, e.g. one received from a remote peer
    pub fn with_board(settings: Settings, board: Board) -> Result<Self> {
        settings.validate()?;
        let grid = board.grid();
        if grid.columns() != settings.columns || grid.rows() != settings.rows {
            return Err(FillerError::InvalidSettings(format!(
                "board is {}x{}, settings say {}x{}",
                grid.columns(),
                grid.rows(),
                settings.columns,
                settings.rows
            )));
        }
        if let Some(c) = grid
            .valid_cells()
            .map(|i| board.get(i))
            .find(|&c| c as usize >= settings.num_colors)
        {
            return Err(FillerError::ColorOutOfRange {
                color: c,
                num_colors: settings.num_colors,
            });
        }

        let origins = settings.origins_on(grid);
        let points_to_win = settings.points_to_win_on(grid);
        let mut scratch = Scratch::new(grid);
        let scores = [
            territory(&board, origins.mine, &mut scratch),
            territory(&board, origins.theirs, &mut scratch),
        ];
        let colors = [board.get(origins.mine), board.get(origins.theirs)];

        Ok(Self {
            settings,
            board,
            origins,
            points_to_win,
            colors,
            scores,
            to_move: Seat::First,
            turns: 0,
            scratch,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn grid(&self) -> &HexGrid {
        self.board.grid()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Origins as seen from `seat`
    pub fn origins(&self, seat: Seat) -> Origins {
        match seat {
            Seat::First => self.origins,
            Seat::Second => self.origins.swapped(),
        }
    }

    pub fn colors(&self) -> [Color; 2] {
        self.colors
    }

    pub fn color(&self, seat: Seat) -> Color {
        self.colors[seat.index()]
    }

    pub fn scores(&self) -> [usize; 2] {
        self.scores
    }

    pub fn points_to_win(&self) -> usize {
        self.points_to_win
    }

    pub fn to_move(&self) -> Seat {
        self.to_move
    }

    /// Moves applied so far, both seats counted
    pub fn turns(&self) -> usize {
        self.turns
    }

    pub fn is_over(&self) -> bool {
        self.scores.iter().any(|&s| s >= self.points_to_win)
    }

    /// Seat with the higher score once the game is over
    pub fn winner(&self) -> Option<Seat> {
        if !self.is_over() {
            return None;
        }
        self.leader()
    }

    /// Seat currently ahead, `None` when level
    pub fn leader(&self) -> Option<Seat> {
        let [a, b] = self.scores;
        match a.cmp(&b) {
            std::cmp::Ordering::Greater => Some(Seat::First),
            std::cmp::Ordering::Less => Some(Seat::Second),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Play `color` for `seat` and return its new score.
    ///
    /// An illegal color is replaced by the seat's previous color, so the
    /// turn is still taken. Out-of-turn moves and moves after the end are
    /// rejected without touching the board.
    pub fn apply_move(&mut self, seat: Seat, color: Color) -> Result<usize> {
        if self.is_over() {
            return Err(FillerError::GameOver);
        }
        if seat != self.to_move {
            return Err(FillerError::OutOfTurn(seat.index()));
        }

        let me = seat.index();
        let opponent = self.colors[seat.opponent().index()];
        let chosen = match validate_move(color, opponent, self.settings.num_colors) {
            Ok(c) => c,
            Err(e) => {
                warn!(seat = me, color, error = %e, "illegal color, keeping previous");
                self.colors[me]
            }
        };

        let origin = self.origins(seat).mine;
        let result = capture(&mut self.board, origin, chosen, &mut self.scratch);
        self.colors[me] = chosen;
        self.scores[me] = result.score();
        self.turns += 1;
        if !self.is_over() {
            self.to_move = seat.opponent();
        }
        Ok(result.score())
    }
}

// ============================================================================
// TESTS
// ============================================================================
