use crate::{
  board::Board,
  error::{Error, ErrorKind, Result},
};

/// Pixel format of every rendered frame, as named by FFmpeg's `-pix_fmt`.
pub const PIX_FMT: &str = "rgb24";

pub const ALIVE: [u8; 3] = [255, 255, 255];
pub const DEAD: [u8; 3] = [0, 0, 0];

/// One rendered image of a board, ready to be piped into an encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
  /// Width in pixels
  pub width: u32,
  /// Height in pixels
  pub height: u32,
  /// Simulation step this frame was rendered from
  pub frame_num: usize,
  /// Packed `rgb24` pixels, row-major, `width * height * 3` bytes
  pub data: Vec<u8>,
}

impl Frame {
  /// Color of the pixel at column `x`, row `y`.
  pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
    let idx = (y as usize * self.width as usize + x as usize) * 3;
    [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
  }

  /// `WIDTHxHEIGHT`, the form FFmpeg expects for `-s`.
  pub fn size_str(&self) -> String {
    format!("{}x{}", self.width, self.height)
  }
}

/// Render `board` at `scale` pixels per cell: alive cells white, dead cells
/// black, nearest-neighbor upscaled so each cell is a uniform square block.
pub fn render(board: &Board, scale: usize) -> Result<Frame> {
  render_step(board, scale, 0)
}

/// Pixel size of a `cols` x `rows` board rendered at `scale`.
///
/// Fails with `InvalidDimension` when either side overflows `u32` or the
/// packed `rgb24` buffer would not fit in memory.
pub fn frame_size(cols: usize, rows: usize, scale: usize) -> Result<(u32, u32)> {
  if scale < 1 {
    return Err(Error::invalid_scale(scale));
  }
  let px = |cells: usize| cells.checked_mul(scale).and_then(|n| u32::try_from(n).ok());
  let fits = |w: u32, h: u32| {
    (w as usize)
      .checked_mul(h as usize)
      .and_then(|n| n.checked_mul(3))
      .is_some_and(|n| n <= isize::MAX as usize)
  };
  match (px(cols), px(rows)) {
    (Some(w), Some(h)) if fits(w, h) => Ok((w, h)),
    _ => Err(Error::new(
      ErrorKind::InvalidDimension,
      format!("{cols}x{rows} cells at scale {scale} do not fit in a frame"),
    )),
  }
}

/// Same as [`render`], tagging the frame with the step it came from.
pub fn render_step(board: &Board, scale: usize, frame_num: usize) -> Result<Frame> {
  let (width, height) = frame_size(board.width(), board.height(), scale)?;
  let row_len = width as usize * 3;
  let mut data = Vec::with_capacity(row_len * height as usize);

  // Build each scaled pixel row once, then repeat it `scale` times
  let mut row_buf = Vec::with_capacity(row_len);
  for cells in board.iter_rows() {
    row_buf.clear();
    for &alive in cells {
      let color = if alive { ALIVE } else { DEAD };
      for _ in 0..scale {
        row_buf.extend_from_slice(&color);
      }
    }
    for _ in 0..scale {
      data.extend_from_slice(&row_buf);
    }
  }

  Ok(Frame {
    width,
    height,
    frame_num,
    data,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::board::create_board;

  #[test]
  fn test_scale_one_matches_cells() {
    let board = create_board(7, 11, Some(3)).unwrap();
    let frame = render(&board, 1).unwrap();
    assert_eq!((frame.width, frame.height), (11, 7));
    for y in 0..7 {
      for x in 0..11 {
        let expected = if board.get(x, y) { ALIVE } else { DEAD };
        assert_eq!(frame.pixel(x as u32, y as u32), expected);
      }
    }
  }

  #[test]
  fn test_scaled_blocks_are_uniform() {
    let k = 4;
    let board = create_board(5, 6, Some(9)).unwrap();
    let frame = render(&board, k).unwrap();
    assert_eq!(frame.width as usize, 6 * k);
    assert_eq!(frame.height as usize, 5 * k);
    assert_eq!(frame.data.len(), 6 * k * 5 * k * 3);

    for py in 0..frame.height {
      for px in 0..frame.width {
        let (x, y) = (px as usize / k, py as usize / k);
        let expected = if board.get(x, y) { ALIVE } else { DEAD };
        assert_eq!(frame.pixel(px, py), expected, "pixel ({px}, {py})");
      }
    }
  }

  #[test]
  fn test_zero_scale_rejected() {
    let board = Board::empty(2, 2).unwrap();
    assert_eq!(render(&board, 0).unwrap_err().kind(), ErrorKind::InvalidScale);
  }

  #[test]
  fn test_frame_metadata() {
    let board = Board::from_rows(&["#."]).unwrap();
    let frame = render_step(&board, 3, 17).unwrap();
    assert_eq!(frame.frame_num, 17);
    assert_eq!(frame.size_str(), "6x3");
    assert_eq!(frame.pixel(2, 2), ALIVE);
    assert_eq!(frame.pixel(3, 0), DEAD);
  }

  #[test]
  fn test_oversized_frame_rejected() {
    let board = Board::empty(1, 1).unwrap();
    let err = render(&board, usize::MAX).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidDimension);
    assert!(err.message.contains("do not fit"));

    // Each side fits in u32, the pixel buffer does not
    let err = frame_size(1 << 16, 1 << 16, 1 << 15).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidDimension);
    assert_eq!(frame_size(3, 2, 4).unwrap(), (12, 8));
  }

  #[test]
  fn test_frame_num_is_not_truncated() {
    let board = Board::empty(1, 1).unwrap();
    let frame = render_step(&board, 1, usize::MAX).unwrap();
    assert_eq!(frame.frame_num, usize::MAX);
  }
}
