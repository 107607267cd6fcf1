//! Hex grid geometry with column-major cell indices
//!
//! Cells are numbered `x * rows + y`. Even columns sit half a cell lower than
//! odd columns, so the top cell of every even column falls outside the
//! packing and is permanently invalid.

use serde::{Deserialize, Serialize};

/// Linear cell index into the grid
pub type CellIndex = usize;

/// Maximum neighbours a cell can have
pub const MAX_NEIGHBORS: usize = 6;

/// Smallest supported grid
const MIN_COLUMNS: usize = 3;
const MIN_ROWS: usize = 2;

/// Small integer square roots, used before falling back to Newton iteration
const ROOTS: [u32; 20] = [0, 1, 1, 1, 2, 2, 2, 2, 2, 3, 3, 3, 3, 3, 3, 3, 4, 4, 4, 4];

/// The two fixed starting cells of a game.
///
/// `mine` is always the perspective of whoever holds the value; use
/// [`Origins::swapped`] to get the opponent's view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Origins {
    pub mine: CellIndex,
    pub theirs: CellIndex,
}

impl Origins {
    pub const fn new(mine: CellIndex, theirs: CellIndex) -> Self {
        Self { mine, theirs }
    }

    /// Same origins seen from the other player
    pub const fn swapped(self) -> Self {
        Self {
            mine: self.theirs,
            theirs: self.mine,
        }
    }
}

/// Static adjacency for a `columns x rows` board. Built once, read-only.
#[derive(Clone, Debug)]
pub struct HexGrid {
    columns: usize,
    rows: usize,
    neighbors: Vec<[CellIndex; MAX_NEIGHBORS]>,
    neighbor_counts: Vec<u8>,
    valid_count: usize,
}

impl HexGrid {
    /// Build the grid and precompute every valid cell's neighbours.
    ///
    /// Panics on grids smaller than 3x2, which cannot hold two origins.
    pub fn new(columns: usize, rows: usize) -> Self {
        assert!(
            columns >= MIN_COLUMNS && rows >= MIN_ROWS,
            "grid {}x{} is too small",
            columns,
            rows
        );

        let size = columns * rows;
        let mut grid = Self {
            columns,
            rows,
            neighbors: vec![[0; MAX_NEIGHBORS]; size],
            neighbor_counts: vec![0; size],
            valid_count: 0,
        };

        for i in 0..size {
            if !grid.valid(i) {
                continue;
            }
            grid.valid_count += 1;
            let (list, count) = grid.compute_neighbors(i);
            grid.neighbors[i] = list;
            grid.neighbor_counts[i] = count;
        }

        grid
    }

    fn compute_neighbors(&self, i: CellIndex) -> ([CellIndex; MAX_NEIGHBORS], u8) {
        let (x, y) = self.coordinates(i);
        let mut list = [0; MAX_NEIGHBORS];
        let mut count = 0usize;
        let mut push = |x: usize, y: usize| {
            list[count] = self.index(x, y);
            count += 1;
        };

        // same row, two columns across
        if x + 2 < self.columns {
            push(x + 2, y);
        }
        if x >= 2 {
            push(x - 2, y);
        }

        if x % 2 == 0 {
            // even columns: an upper and a lower neighbour on each side
            if x > 0 {
                push(x - 1, y - 1);
                push(x - 1, y);
            }
            if x + 1 < self.columns {
                push(x + 1, y - 1);
                push(x + 1, y);
            }
        } else {
            // odd columns: two above, two below
            if y > 0 {
                push(x - 1, y);
                if x + 1 < self.columns {
                    push(x + 1, y);
                }
            }
            if y + 1 < self.rows {
                push(x - 1, y + 1);
                if x + 1 < self.columns {
                    push(x + 1, y + 1);
                }
            }
        }

        (list, count as u8)
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Total number of indices, valid or not
    pub fn size(&self) -> usize {
        self.columns * self.rows
    }

    /// Number of cells that can hold a color
    pub fn valid_count(&self) -> usize {
        self.valid_count
    }

    /// Index of column `x`, row `y`
    pub fn index(&self, x: usize, y: usize) -> CellIndex {
        debug_assert!(x < self.columns && y < self.rows);
        x * self.rows + y
    }

    /// Column and row of cell `i`
    pub fn coordinates(&self, i: CellIndex) -> (usize, usize) {
        (i / self.rows, i % self.rows)
    }

    /// Whether `i` names a playable cell
    pub fn valid(&self, i: CellIndex) -> bool {
        if i >= self.size() {
            return false;
        }
        let (x, y) = self.coordinates(i);
        !(x % 2 == 0 && y == 0)
    }

    /// Neighbours of cell `i` (empty for invalid cells)
    pub fn neighbors(&self, i: CellIndex) -> &[CellIndex] {
        &self.neighbors[i][..self.neighbor_counts[i] as usize]
    }

    /// True iff the cell has fewer than six neighbours
    pub fn is_perimeter(&self, i: CellIndex) -> bool {
        (self.neighbor_counts[i] as usize) < MAX_NEIGHBORS
    }

    /// Iterate all valid cells in index order
    pub fn valid_cells(&self) -> impl Iterator<Item = CellIndex> + '_ {
        (0..self.size()).filter(move |&i| self.valid(i))
    }

    /// Starting cells: bottom of column 1 and top of the mirrored odd column
    pub fn default_origins(&self) -> Origins {
        let far_column = if (self.columns - 2) % 2 == 1 {
            self.columns - 2
        } else {
            self.columns - 1
        };
        Origins::new(self.index(1, self.rows - 1), self.index(far_column, 0))
    }

    /// The middle cell, nudged off a hole if necessary
    pub fn centre(&self) -> CellIndex {
        self.nearest_valid(self.columns / 2, self.rows / 2)
    }

    /// Cell at `(x, y)`, or the one below it when `(x, y)` is a hole
    pub fn nearest_valid(&self, x: usize, y: usize) -> CellIndex {
        let x = x.min(self.columns - 1);
        let y = y.min(self.rows - 1);
        let i = self.index(x, y);
        if self.valid(i) {
            i
        } else {
            self.index(x, y + 1)
        }
    }

    /// Manhattan distance in (column, row) space
    pub fn side_distance(&self, a: CellIndex, b: CellIndex) -> u32 {
        let (ax, ay) = self.coordinates(a);
        let (bx, by) = self.coordinates(b);
        (ax.abs_diff(bx) + ay.abs_diff(by)) as u32
    }

    /// Approximate Euclidean distance with rows stretched to match the
    /// hex aspect ratio
    pub fn diag_distance(&self, a: CellIndex, b: CellIndex) -> u32 {
        let (ax, ay) = self.coordinates(a);
        let (bx, by) = self.coordinates(b);
        let dx = ax.abs_diff(bx) as u32;
        let dy = ay.abs_diff(by) as u32 * 3;
        int_root(dx * dx + dy * dy)
    }
}

/// Integer square root
pub fn int_root(x: u32) -> u32 {
    if (x as usize) < ROOTS.len() {
        return ROOTS[x as usize];
    }
    let mut a1 = x / 2;
    let mut a2 = x / a1;
    while a1.abs_diff(a2) > 1 {
        a1 = (a1 + a2) / 2;
        a2 = x / a1;
    }
    a1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holes() {
        let grid = HexGrid::new(95, 15);
        assert!(!grid.valid(grid.index(0, 0)));
        assert!(!grid.valid(grid.index(2, 0)));
        assert!(grid.valid(grid.index(1, 0)));
        assert!(grid.valid(grid.index(2, 1)));
        // 48 even columns each lose their top cell
        assert_eq!(grid.valid_count(), 95 * 15 - 48);
    }

    #[test]
    fn test_index_round_trip() {
        let grid = HexGrid::new(7, 5);
        for i in 0..grid.size() {
            let (x, y) = grid.coordinates(i);
            assert_eq!(grid.index(x, y), i);
        }
    }

    #[test]
    fn test_interior_has_six_neighbors() {
        let grid = HexGrid::new(95, 15);
        let i = grid.index(10, 7);
        assert_eq!(grid.neighbors(i).len(), 6);
        assert!(!grid.is_perimeter(i));
        let i = grid.index(11, 7);
        assert_eq!(grid.neighbors(i).len(), 6);
    }

    #[test]
    fn test_edges_are_perimeter() {
        let grid = HexGrid::new(95, 15);
        assert!(grid.is_perimeter(grid.index(0, 5)));
        assert!(grid.is_perimeter(grid.index(1, 0)));
        assert!(grid.is_perimeter(grid.index(94, 5)));
        assert!(grid.is_perimeter(grid.index(5, 14)));
    }

    #[test]
    fn test_adjacency_symmetric_and_valid() {
        for (columns, rows) in [(95, 15), (6, 4), (5, 5)] {
            let grid = HexGrid::new(columns, rows);
            for i in grid.valid_cells() {
                for &q in grid.neighbors(i) {
                    assert!(grid.valid(q), "{} -> {} invalid", i, q);
                    assert!(
                        grid.neighbors(q).contains(&i),
                        "{} -> {} not symmetric on {}x{}",
                        i,
                        q,
                        columns,
                        rows
                    );
                }
            }
        }
    }

    #[test]
    fn test_specific_neighbors() {
        let grid = HexGrid::new(95, 15);
        // even column: across, plus up/down on both sides
        let mut ns = grid.neighbors(grid.index(4, 3)).to_vec();
        ns.sort();
        let mut expected = vec![
            grid.index(6, 3),
            grid.index(2, 3),
            grid.index(3, 2),
            grid.index(3, 3),
            grid.index(5, 2),
            grid.index(5, 3),
        ];
        expected.sort();
        assert_eq!(ns, expected);
    }

    #[test]
    fn test_default_origins() {
        let grid = HexGrid::new(95, 15);
        let origins = grid.default_origins();
        assert_eq!(grid.coordinates(origins.mine), (1, 14));
        assert_eq!(grid.coordinates(origins.theirs), (93, 0));

        let even = HexGrid::new(6, 4);
        let origins = even.default_origins();
        assert!(even.valid(origins.mine));
        assert!(even.valid(origins.theirs));
        assert_eq!(origins.swapped().mine, origins.theirs);
    }

    #[test]
    fn test_int_root() {
        assert_eq!(int_root(0), 0);
        assert_eq!(int_root(15), 3);
        assert_eq!(int_root(100), 10);
        // rounds to nearest rather than flooring
        assert!((9..=10).contains(&int_root(99)));
    }
}
