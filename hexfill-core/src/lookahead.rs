//! One-ply lookahead over candidate colors
//!
//! Every candidate is simulated on its own board clone with its own
//! [`Scratch`], so branches share nothing but the read-only input board.
//! Scores are gathered in color order before the reduction, which makes the
//! outcome independent of how rayon schedules the branches.

use rand::Rng;
use rayon::prelude::*;

use crate::board::{Board, Color, ColorSet};
use crate::capture::capture;
use crate::classify::classify;
use crate::distance::distances;
use crate::eval::Evaluator;
use crate::grid::Origins;
use crate::scratch::Scratch;

/// Lookahead search settings
#[derive(Clone, Copy, Debug)]
pub struct Lookahead {
    /// Palette size of the game
    pub num_colors: usize,
    /// Evaluate candidates on the rayon pool
    pub parallel: bool,
    /// Compute distances before scoring even if the evaluator doesn't ask
    pub use_distance: bool,
}

impl Lookahead {
    pub fn new(num_colors: usize) -> Self {
        Self {
            num_colors,
            parallel: true,
            use_distance: false,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_distance(mut self, use_distance: bool) -> Self {
        self.use_distance = use_distance;
        self
    }

    /// Colors worth simulating: everything but mine and the opponent's
    pub fn candidates(&self, my_color: Color, opponent_color: Color) -> ColorSet {
        let mut set = ColorSet::all(self.num_colors);
        set.remove(my_color);
        set.remove(opponent_color);
        set
    }

    /// Score of every candidate, in increasing color order
    pub fn scores(
        &self,
        board: &Board,
        origins: Origins,
        my_color: Color,
        opponent_color: Color,
        evaluator: &dyn Evaluator,
    ) -> Vec<(Color, i64)> {
        let colors: Vec<Color> = self.candidates(my_color, opponent_color).iter().collect();
        let with_distance = self.use_distance || evaluator.needs_distances();

        if self.parallel {
            colors
                .par_iter()
                .map_init(
                    || Scratch::new(board.grid()),
                    |scratch, &c| {
                        let score = simulate(board, origins, c, evaluator, with_distance, scratch);
                        (c, score)
                    },
                )
                .collect()
        } else {
            let mut scratch = Scratch::new(board.grid());
            colors
                .iter()
                .map(|&c| (c, simulate(board, origins, c, evaluator, with_distance, &mut scratch)))
                .collect()
        }
    }

    /// Best-scoring candidate, ties broken by one uniform draw
    pub fn choose<R: Rng + ?Sized>(
        &self,
        board: &Board,
        origins: Origins,
        my_color: Color,
        opponent_color: Color,
        evaluator: &dyn Evaluator,
        rng: &mut R,
    ) -> Option<Color> {
        let scores = self.scores(board, origins, my_color, opponent_color, evaluator);
        let highest = scores.iter().map(|&(_, s)| s).max()?;
        let ties: ColorSet = scores
            .iter()
            .filter(|&&(_, s)| s == highest)
            .map(|&(c, _)| c)
            .collect();
        ties.choose(rng)
    }
}

/// Take `color` on a copy of the board and score the result
fn simulate(
    board: &Board,
    origins: Origins,
    color: Color,
    evaluator: &dyn Evaluator,
    with_distance: bool,
    scratch: &mut Scratch,
) -> i64 {
    let mut next = board.clone();
    capture(&mut next, origins.mine, color, scratch);
    classify(&next, origins, scratch);
    if with_distance {
        distances(&next, scratch);
    }
    evaluator.score(&next, scratch, origins)
}
