//! The Game of Life transition rule on a bounded grid.
//!
//! Neighbors that fall outside the grid do not exist; the grid does not wrap.

use crate::board::Board;

const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
  (-1, -1),
  (0, -1),
  (1, -1),
  (-1, 0),
  (1, 0),
  (-1, 1),
  (0, 1),
  (1, 1),
];

/// Count alive cells among the (up to) 8 neighbors of `(x, y)`.
///
/// ```rust
/// use life_sidecar::{board::Board, engine::neighbor_count};
/// let full = Board::from_rows(&["###", "###", "###"]).unwrap();
/// assert_eq!(neighbor_count(&full, 0, 0), 3);
/// assert_eq!(neighbor_count(&full, 1, 0), 5);
/// assert_eq!(neighbor_count(&full, 1, 1), 8);
/// ```
pub fn neighbor_count(board: &Board, x: usize, y: usize) -> u8 {
  NEIGHBOR_OFFSETS
    .iter()
    .filter_map(|&(dx, dy)| Some((x.checked_add_signed(dx)?, y.checked_add_signed(dy)?)))
    .filter(|&(nx, ny)| board.get(nx, ny))
    .count() as u8
}

/// Whether a cell is alive in the next generation.
#[inline]
pub fn next_state(alive: bool, neighbors: u8) -> bool {
  matches!((alive, neighbors), (true, 2) | (true, 3) | (false, 3))
}

/// Compute the next generation. The input board is only read, so every cell
/// sees the previous generation of its neighbors.
pub fn step(board: &Board) -> Board {
  let (width, height) = (board.width(), board.height());
  let mut cells = Vec::with_capacity(width * height);
  for y in 0..height {
    for x in 0..width {
      cells.push(next_state(board.get(x, y), neighbor_count(board, x, y)));
    }
  }
  Board::from_cells(height, width, cells)
}
