//! Strategy primitives
//!
//! Small heuristics over a freshly classified board. Each returns `None`
//! when it has no preference so callers can chain them with `or_else`, and
//! none of them ever proposes the opponent's color.

use rand::Rng;

use crate::board::{Board, Color, ColorSet};
use crate::classify::{Class, ClassSet, MUST_BE_FREE, MUST_BE_HIS, MY_BORDER};
use crate::distance::best_goal_colors;
use crate::grid::{CellIndex, HexGrid, Origins};
use crate::scratch::Scratch;

/// Classes counted when grabbing the most cells this turn
pub const MOST: ClassSet = MY_BORDER.with(Class::InternalBorder);

/// Classes counted when guessing the opponent's best move
pub const OPPONENT_BORDER: ClassSet = ClassSet::of(&[Class::HisBorder, Class::SharedBorder]);

/// Sentinel larger than any diagonal distance on a supported board
const FAR: u32 = 1000;

/// Everything one robot turn can see
pub struct TurnView<'a> {
    pub board: &'a Board,
    /// Classified for `origins`; distances are present if the caller ran them
    pub scratch: &'a mut Scratch,
    pub origins: Origins,
    pub my_color: Color,
    pub opponent_color: Color,
    pub num_colors: usize,
    pub points_to_win: usize,
}

impl<'a> TurnView<'a> {
    fn grid(&self) -> &HexGrid {
        self.board.grid()
    }

    /// Cells of each color whose class is in `set`; the opponent's color
    /// is pinned to -1 so it can never win a count
    pub fn count_in_set(&self, set: ClassSet) -> Vec<i64> {
        let mut counts = vec![0i64; self.num_colors];
        for i in self.grid().valid_cells() {
            if set.contains(self.scratch.class(i)) {
                if let Some(n) = counts.get_mut(self.board.get(i) as usize) {
                    *n += 1;
                }
            }
        }
        if let Some(n) = counts.get_mut(self.opponent_color as usize) {
            *n = -1;
        }
        counts
    }

    /// Color with the highest positive count in `set`, random among ties
    pub fn most_in_set<R: Rng + ?Sized>(&self, set: ClassSet, rng: &mut R) -> Option<Color> {
        let counts = self.count_in_set(set);
        let best = counts.iter().copied().max().filter(|&n| n > 0)?;
        let favourites: ColorSet = counts
            .iter()
            .enumerate()
            .filter(|&(_, &n)| n == best)
            .map(|(c, _)| c as Color)
            .collect();
        favourites.choose(rng)
    }

    /// Most cells right now
    pub fn most<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Color> {
        self.most_in_set(MOST, rng)
    }

    /// Most cells right now that the opponent could also take
    pub fn most_free<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Color> {
        self.most_in_set(MY_BORDER, rng)
    }

    /// The color that would gain the opponent most on his next turn
    pub fn opponent_most<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Color> {
        self.most_in_set(OPPONENT_BORDER, rng)
    }

    /// The biggest grab, but only if it ends the game
    pub fn most_if_win(&self) -> Option<Color> {
        let counts = self.count_in_set(MOST);
        let mut favourite = None;
        let mut best = -1;
        for (c, &n) in counts.iter().enumerate() {
            if n > best {
                favourite = Some(c as Color);
                best = n;
            }
        }
        if best + self.score() as i64 >= self.points_to_win as i64 {
            favourite
        } else {
            None
        }
    }

    /// Win if possible, otherwise take contested cells, otherwise anything
    pub fn smart_most<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Color> {
        self.most_if_win()
            .or_else(|| self.most_free(rng))
            .or_else(|| self.most(rng))
    }

    /// Color of the border cell nearest `goal`, first one on ties
    fn nearest_border(&self, goal: CellIndex, classes: ClassSet) -> Option<Color> {
        let grid = self.grid();
        let mut closest = FAR;
        let mut favourite = None;
        for i in grid.valid_cells() {
            if !classes.contains(self.scratch.class(i))
                || self.board.get(i) == self.opponent_color
            {
                continue;
            }
            let d = grid.diag_distance(goal, i);
            if d < closest {
                closest = d;
                favourite = Some(self.board.get(i));
            }
        }
        favourite
    }

    /// Head toward `target`, or as close as possible if it is taken
    pub fn target(&self, target: CellIndex) -> Option<Color> {
        self.nearest_border(target, MY_BORDER)
    }

    /// Head toward `goal` unless it is already mine or out of my reach
    pub fn goal(&self, goal: CellIndex) -> Option<Color> {
        let class = self.scratch.class(goal);
        if class == Class::Mine || class == Class::Vacant || MUST_BE_HIS.contains(class) {
            return None;
        }
        self.nearest_border(goal, MY_BORDER)
    }

    fn furthest(&self, perimeter_only: bool) -> Option<Color> {
        let grid = self.grid();
        let home = self.origins.mine;
        let mut furthest = None;
        let mut favourite = None;
        for i in grid.valid_cells() {
            if !MY_BORDER.contains(self.scratch.class(i))
                || self.board.get(i) == self.opponent_color
            {
                continue;
            }
            if perimeter_only && !grid.is_perimeter(i) {
                continue;
            }
            let d = grid.side_distance(i, home);
            if furthest.map_or(true, |f| d > f) {
                furthest = Some(d);
                favourite = Some(self.board.get(i));
            }
        }
        favourite
    }

    /// Push the border furthest from home
    pub fn expand(&self) -> Option<Color> {
        self.furthest(false)
    }

    /// Like [`TurnView::expand`], along the edge of the board only
    pub fn furthest_border(&self) -> Option<Color> {
        self.furthest(true)
    }

    /// First border cell on the edge of the board
    pub fn border(&self) -> Option<Color> {
        let grid = self.grid();
        grid.valid_cells()
            .find(|&i| {
                MY_BORDER.contains(self.scratch.class(i))
                    && grid.is_perimeter(i)
                    && self.board.get(i) != self.opponent_color
            })
            .map(|i| self.board.get(i))
    }

    /// Fill in close to home first. May return my own color.
    pub fn dont_expand(&self) -> Option<Color> {
        self.nearest_border(self.origins.mine, MY_BORDER.with(Class::Reachable))
    }

    /// Any color present on my border
    pub fn random_border<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Color> {
        let mut colors: ColorSet = self
            .grid()
            .valid_cells()
            .filter(|&i| MY_BORDER.contains(self.scratch.class(i)))
            .map(|i| self.board.get(i))
            .collect();
        colors.remove(self.opponent_color);
        colors.choose(rng)
    }

    /// Colors on a shortest route to `goal`, minus mine and the opponent's.
    /// Needs distances.
    pub fn best_goal_colors(&mut self, goal: CellIndex) -> ColorSet {
        let mut colors = best_goal_colors(self.board, self.scratch, goal);
        colors.remove(self.my_color);
        colors.remove(self.opponent_color);
        colors
    }

    /// Any color on a shortest route to `goal`
    pub fn best_goal<R: Rng + ?Sized>(&mut self, goal: CellIndex, rng: &mut R) -> Option<Color> {
        self.best_goal_colors(goal).choose(rng)
    }

    /// The shortest-route color that also grabs the most border now
    pub fn most_best_goal<R: Rng + ?Sized>(
        &mut self,
        goal: CellIndex,
        rng: &mut R,
    ) -> Option<Color> {
        let route = self.best_goal_colors(goal);
        let counts = self.count_in_set(MY_BORDER);
        let best = route
            .iter()
            .filter_map(|c| counts.get(c as usize).copied())
            .filter(|&n| n > 0)
            .max()?;
        let favourites: ColorSet = route
            .iter()
            .filter(|&c| counts.get(c as usize) == Some(&best))
            .collect();
        favourites.choose(rng)
    }

    /// Next color after mine, skipping the opponent's
    pub fn cycle(&self) -> Option<Color> {
        let n = self.num_colors as Color;
        let mut next = (self.my_color.wrapping_add(1)) % n;
        if next == self.opponent_color {
            next = (next + 1) % n;
        }
        Some(next)
    }

    /// Any color other than mine and the opponent's
    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Color> {
        let mut colors = ColorSet::all(self.num_colors);
        colors.remove(self.my_color);
        colors.remove(self.opponent_color);
        colors.choose(rng)
    }

    /// Cells whose owner is not yet decided
    pub fn undecided_cells(&self) -> usize {
        self.grid()
            .valid_cells()
            .filter(|&i| MUST_BE_FREE.contains(self.scratch.class(i)))
            .count()
    }

    /// Cells I own
    pub fn score(&self) -> usize {
        self.scratch.count(Class::Mine)
    }

    /// Cells I own or am certain to own
    pub fn real_score(&self) -> usize {
        self.score() + self.scratch.count(Class::Reachable)
    }

    /// Plurality of the suggestions, my color and the opponent's excluded.
    /// Lowest color wins a tie.
    pub fn vote(&self, votes: &[Option<Color>]) -> Option<Color> {
        let mut tally = vec![0usize; self.num_colors];
        for &c in votes.iter().flatten() {
            if let Some(n) = tally.get_mut(c as usize) {
                *n += 1;
            }
        }
        let mut best = None;
        let mut best_votes = 0;
        for (c, &n) in tally.iter().enumerate() {
            let c = c as Color;
            if c == self.my_color || c == self.opponent_color {
                continue;
            }
            if n > best_votes {
                best_votes = n;
                best = Some(c);
            }
        }
        best
    }
}
