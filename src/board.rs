//! The dense grid of cells that holds the simulation state at one step.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{Error, ErrorKind, Result};

/// A fixed-size grid of alive/dead cells, stored row-major.
///
/// Boards are never mutated once built; each simulation step produces a new
/// one (see [`crate::engine::step`]).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
  width: usize,
  height: usize,
  cells: Vec<bool>,
}

impl Board {
  /// A board with every cell dead.
  pub fn empty(height: usize, width: usize) -> Result<Self> {
    check_dimensions(height, width)?;
    Ok(Self {
      width,
      height,
      cells: vec![false; width * height],
    })
  }

  /// Fill a board by drawing one fair coin per cell from `rng`, row by row.
  pub fn random<R: Rng + ?Sized>(height: usize, width: usize, rng: &mut R) -> Result<Self> {
    check_dimensions(height, width)?;
    let cells = (0..width * height).map(|_| rng.gen_bool(0.5)).collect();
    Ok(Self {
      width,
      height,
      cells,
    })
  }

  /// A dead board with the given `(x, y)` cells set alive.
  /// Coordinates outside the grid are ignored.
  pub fn with_alive<I>(height: usize, width: usize, alive: I) -> Result<Self>
  where
    I: IntoIterator<Item = (usize, usize)>,
  {
    let mut board = Self::empty(height, width)?;
    for (x, y) in alive {
      if x < width && y < height {
        board.cells[y * width + x] = true;
      }
    }
    Ok(board)
  }

  /// Parse a board from text rows, where `#` or `O` is alive and anything
  /// else is dead.
  ///
  /// ```rust
  /// use life_sidecar::board::Board;
  /// let blinker = Board::from_rows(&[".....", "..#..", "..#..", "..#..", "....."]).unwrap();
  /// assert_eq!(blinker.live_count(), 3);
  /// assert!(blinker.get(2, 1));
  /// ```
  pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self> {
    let height = rows.len();
    let width = rows.first().map(|r| r.as_ref().chars().count()).unwrap_or(0);
    check_dimensions(height, width)?;

    let mut cells = Vec::with_capacity(width * height);
    for row in rows {
      let row = row.as_ref();
      if row.chars().count() != width {
        return Err(Error::new(
          ErrorKind::InvalidDimension,
          format!("Ragged board row {row:?}, expected width {width}"),
        ));
      }
      cells.extend(row.chars().map(|c| matches!(c, '#' | 'O')));
    }

    Ok(Self {
      width,
      height,
      cells,
    })
  }

  pub(crate) fn from_cells(height: usize, width: usize, cells: Vec<bool>) -> Self {
    debug_assert_eq!(cells.len(), width * height);
    Self {
      width,
      height,
      cells,
    }
  }

  pub fn width(&self) -> usize {
    self.width
  }

  pub fn height(&self) -> usize {
    self.height
  }

  /// Whether the cell at column `x`, row `y` is alive. Off-grid positions
  /// are dead.
  #[inline]
  pub fn get(&self, x: usize, y: usize) -> bool {
    x < self.width && y < self.height && self.cells[y * self.width + x]
  }

  pub fn live_count(&self) -> usize {
    self.cells.iter().filter(|&&c| c).count()
  }

  /// Iterate over rows from top to bottom.
  pub fn iter_rows(&self) -> impl Iterator<Item = &[bool]> {
    self.cells.chunks(self.width)
  }
}

impl fmt::Debug for Board {
  /// Draws the grid with `#` for alive cells and `.` for dead ones.
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "Board {}x{}", self.width, self.height)?;
    for row in self.iter_rows() {
      let line: String = row.iter().map(|&c| if c { '#' } else { '.' }).collect();
      writeln!(f, "{line}")?;
    }
    Ok(())
  }
}

fn check_dimensions(height: usize, width: usize) -> Result<()> {
  if width == 0 || height == 0 {
    return Err(Error::invalid_dimension(width, height));
  }
  Ok(())
}

/// Seeded generator used for board initialization. Without a seed, one is
/// drawn from process entropy; the seed actually used is returned so the run
/// can be replayed.
pub fn board_rng(seed: Option<u64>) -> (ChaCha8Rng, u64) {
  let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
  (ChaCha8Rng::seed_from_u64(seed), seed)
}

/// Create a random board where every cell is alive with probability 0.5.
///
/// The same `seed` and dimensions always yield the same board.
pub fn create_board(height: usize, width: usize, seed: Option<u64>) -> Result<Board> {
  let (mut rng, _) = board_rng(seed);
  Board::random(height, width, &mut rng)
}
