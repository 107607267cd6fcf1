//! Reusable working memory for flood fills
//!
//! One `Scratch` belongs to exactly one computation at a time. Every buffer
//! is sized to the grid once and reset in place between passes; lookahead
//! branches each take their own instance.

use crate::classify::{Class, NUM_CLASSES};
use crate::distance::{Distance, UNREACHABLE};
use crate::grid::{CellIndex, HexGrid};

#[derive(Clone, Debug)]
pub struct Scratch {
    /// Classification code per cell
    pub(crate) classes: Vec<Class>,
    /// Cell already queued or processed in the current flood
    pub(crate) listed: Vec<bool>,
    /// Work stack shared by every flood
    pub(crate) stack: Vec<CellIndex>,
    /// Cells my border can eventually spread into
    pub(crate) reachable: Vec<bool>,
    /// Cells his border can eventually spread into
    pub(crate) his_reachable: Vec<bool>,
    /// Color changes I need per cell
    pub(crate) distance: Vec<Distance>,
    /// Color changes he needs per cell
    pub(crate) opponent_distance: Vec<Distance>,
    /// Territory after the last capture
    pub(crate) captured: Vec<bool>,
    /// Invalid cells, which always stay `Vacant`
    holes: usize,
}

impl Scratch {
    pub fn new(grid: &HexGrid) -> Self {
        let size = grid.size();
        Self {
            classes: vec![Class::Vacant; size],
            listed: vec![false; size],
            stack: Vec::with_capacity(size),
            reachable: vec![false; size],
            his_reachable: vec![false; size],
            distance: vec![UNREACHABLE; size],
            opponent_distance: vec![UNREACHABLE; size],
            captured: vec![false; size],
            holes: size - grid.valid_count(),
        }
    }

    /// Number of cells these buffers cover
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn reset_listed(&mut self) {
        self.listed.fill(false);
        self.stack.clear();
    }

    pub fn reset_reachable(&mut self) {
        self.reachable.fill(false);
        self.his_reachable.fill(false);
    }

    /// Clear classification and distances. The captured mask survives.
    pub fn reset(&mut self) {
        self.reset_listed();
        self.classes.fill(Class::Vacant);
        self.distance.fill(UNREACHABLE);
        self.opponent_distance.fill(UNREACHABLE);
    }

    pub fn class(&self, i: CellIndex) -> Class {
        self.classes[i]
    }

    pub fn classes(&self) -> &[Class] {
        &self.classes
    }

    /// Color changes I need to capture `i`, `None` if I never can
    pub fn distance(&self, i: CellIndex) -> Option<Distance> {
        Some(self.distance[i]).filter(|&d| d != UNREACHABLE)
    }

    /// Color changes the opponent needs to capture `i`
    pub fn opponent_distance(&self, i: CellIndex) -> Option<Distance> {
        Some(self.opponent_distance[i]).filter(|&d| d != UNREACHABLE)
    }

    pub fn distances(&self) -> &[Distance] {
        &self.distance
    }

    pub fn opponent_distances(&self) -> &[Distance] {
        &self.opponent_distance
    }

    /// Whether `i` ended up in the territory of the last capture
    pub fn captured(&self, i: CellIndex) -> bool {
        self.captured[i]
    }

    pub fn captured_mask(&self) -> &[bool] {
        &self.captured
    }

    /// Valid cells of `class`
    pub fn count(&self, class: Class) -> usize {
        let n = self.classes.iter().filter(|&&c| c == class).count();
        if class == Class::Vacant {
            n - self.holes
        } else {
            n
        }
    }

    /// Valid cells per class, indexed by `Class as usize`
    pub fn class_counts(&self) -> [usize; NUM_CLASSES] {
        let mut counts = [0; NUM_CLASSES];
        for &c in &self.classes {
            counts[c as usize] += 1;
        }
        counts[Class::Vacant as usize] -= self.holes;
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::classify::classify;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;

    #[test]
    fn test_counts_skip_holes() {
        let grid = Arc::new(HexGrid::new(31, 11));
        let mut scratch = Scratch::new(&grid);
        assert_eq!(scratch.count(Class::Vacant), grid.valid_count());

        for seed in 0..10 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let board = Board::random(Arc::clone(&grid), 6, &mut rng);
            classify(&board, grid.default_origins(), &mut scratch);

            let counts = scratch.class_counts();
            assert_eq!(counts.iter().sum::<usize>(), grid.valid_count());
            for class in Class::ALL {
                let expected = grid
                    .valid_cells()
                    .filter(|&i| scratch.class(i) == class)
                    .count();
                assert_eq!(scratch.count(class), expected, "{:?}", class);
                assert_eq!(counts[class as usize], expected, "{:?}", class);
            }
        }
    }
}
