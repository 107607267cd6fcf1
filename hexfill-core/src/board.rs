//! Board colors

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::grid::{CellIndex, HexGrid};

/// Cell color in `[0, num_colors)`
pub type Color = u8;

/// Sentinel stored on invalid cells
pub const NO_COLOR: Color = Color::MAX;

/// Largest palette a [`ColorSet`] can hold
pub const MAX_COLORS: usize = 16;

/// Small bitset of colors
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorSet(u16);

impl ColorSet {
    pub const EMPTY: ColorSet = ColorSet(0);

    /// Every color of an `n`-color palette
    pub fn all(n: usize) -> Self {
        debug_assert!(n <= MAX_COLORS);
        if n >= MAX_COLORS {
            ColorSet(u16::MAX)
        } else {
            ColorSet((1u16 << n) - 1)
        }
    }

    pub fn single(color: Color) -> Self {
        let mut set = Self::EMPTY;
        set.insert(color);
        set
    }

    pub fn insert(&mut self, color: Color) {
        if (color as usize) < MAX_COLORS {
            self.0 |= 1 << color;
        }
    }

    pub fn remove(&mut self, color: Color) {
        if (color as usize) < MAX_COLORS {
            self.0 &= !(1 << color);
        }
    }

    pub fn contains(&self, color: Color) -> bool {
        (color as usize) < MAX_COLORS && self.0 & (1 << color) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Color> {
        (0..MAX_COLORS as Color).filter(move |&c| self.contains(c))
    }

    /// Pick one member uniformly at random
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Color> {
        let n = self.len();
        if n == 0 {
            return None;
        }
        self.iter().nth(rng.gen_range(0..n))
    }
}

impl FromIterator<Color> for ColorSet {
    fn from_iter<I: IntoIterator<Item = Color>>(iter: I) -> Self {
        let mut set = ColorSet::EMPTY;
        for c in iter {
            set.insert(c);
        }
        set
    }
}

/// Per-cell colors for one game (clone to simulate)
#[derive(Clone, Debug)]
pub struct Board {
    grid: Arc<HexGrid>,
    colors: Vec<Color>,
}

impl Board {
    /// Fill every valid cell with a uniformly random color
    pub fn random<R: Rng + ?Sized>(grid: Arc<HexGrid>, num_colors: usize, rng: &mut R) -> Self {
        let colors = (0..grid.size())
            .map(|i| {
                if grid.valid(i) {
                    rng.gen_range(0..num_colors) as Color
                } else {
                    NO_COLOR
                }
            })
            .collect();
        Self { grid, colors }
    }

    /// Build from a full color array, e.g. one received from a remote peer.
    ///
    /// Panics if the array does not cover the grid. Invalid cells are forced
    /// to [`NO_COLOR`].
    pub fn from_colors(grid: Arc<HexGrid>, mut colors: Vec<Color>) -> Self {
        assert_eq!(
            colors.len(),
            grid.size(),
            "board has {} cells, grid needs {}",
            colors.len(),
            grid.size()
        );
        for (i, c) in colors.iter_mut().enumerate() {
            if !grid.valid(i) {
                *c = NO_COLOR;
            }
        }
        Self { grid, colors }
    }

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    /// Shared handle to the grid, for building sibling boards
    pub fn grid_arc(&self) -> Arc<HexGrid> {
        Arc::clone(&self.grid)
    }

    pub fn get(&self, i: CellIndex) -> Color {
        self.colors[i]
    }

    /// Raw write; game play goes through [`crate::capture::capture`]
    pub fn set(&mut self, i: CellIndex, color: Color) {
        debug_assert!(self.grid.valid(i));
        self.colors[i] = color;
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_random_fill() {
        let grid = Arc::new(HexGrid::new(95, 15));
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let board = Board::random(Arc::clone(&grid), 9, &mut rng);
        assert_eq!(board.len(), grid.size());
        for i in 0..grid.size() {
            if grid.valid(i) {
                assert!(board.get(i) < 9);
            } else {
                assert_eq!(board.get(i), NO_COLOR);
            }
        }
    }

    #[test]
    fn test_random_fill_seeded() {
        let grid = Arc::new(HexGrid::new(20, 10));
        let a = Board::random(Arc::clone(&grid), 6, &mut ChaCha8Rng::seed_from_u64(1));
        let b = Board::random(Arc::clone(&grid), 6, &mut ChaCha8Rng::seed_from_u64(1));
        assert_eq!(a.colors(), b.colors());
    }

    #[test]
    #[should_panic]
    fn test_wrong_length_rejected() {
        let grid = Arc::new(HexGrid::new(5, 5));
        let _ = Board::from_colors(grid, vec![0; 3]);
    }

    #[test]
    fn test_color_set() {
        let mut set = ColorSet::all(9);
        assert_eq!(set.len(), 9);
        set.remove(3);
        assert!(!set.contains(3));
        assert!(set.contains(8));
        assert!(!set.contains(9));
        assert_eq!(set.iter().count(), 8);

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(ColorSet::single(5).choose(&mut rng), Some(5));
        assert_eq!(ColorSet::EMPTY.choose(&mut rng), None);
    }
}
