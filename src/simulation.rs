//! The simulate-render-encode loop.

use std::sync::{
  atomic::{AtomicBool, Ordering},
  mpsc::sync_channel,
};

use crate::{
  board::{board_rng, Board},
  encoder::FrameSink,
  engine::step,
  error::{Error, Result},
  render::{frame_size, render_step, Frame},
};

/// How many steps pass between progress log lines.
const LOG_INTERVAL: usize = 100;

/// Parameters of one run. Defaults match the command line defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
  pub width: usize,
  pub height: usize,
  /// Number of frames to produce
  pub steps: usize,
  /// Pixels per cell along each axis
  pub scale: usize,
  /// Fixed seed for a reproducible run; drawn from entropy when `None`
  pub seed: Option<u64>,
}

impl Default for SimulationConfig {
  fn default() -> Self {
    Self {
      width: 100,
      height: 100,
      steps: 1000,
      scale: 5,
      seed: None,
    }
  }
}

impl SimulationConfig {
  /// Build a config from signed values as they come off the command line,
  /// rejecting non-positive dimensions and scales.
  pub fn new(width: i64, height: i64, steps: usize, scale: i64, seed: Option<u64>) -> Result<Self> {
    let (width, height) = match (usize::try_from(width), usize::try_from(height)) {
      (Ok(w), Ok(h)) if w > 0 && h > 0 => (w, h),
      _ => return Err(Error::invalid_dimension(width, height)),
    };
    let scale = match usize::try_from(scale) {
      Ok(s) if s >= 1 => s,
      _ => return Err(Error::invalid_scale(scale)),
    };
    Ok(Self {
      width,
      height,
      steps,
      scale,
      seed,
    })
  }

  /// Pixel size of every frame this config renders.
  pub fn frame_size(&self) -> Result<(u32, u32)> {
    frame_size(self.width, self.height, self.scale)
  }
}

/// Successive generations of a board, starting with the board itself.
///
/// The iterator never ends; use `take(n)` for `n` generations.
///
/// ```rust
/// use life_sidecar::{board::Board, simulation::Simulation};
/// let blinker = Board::from_rows(&[".....", "..#..", "..#..", "..#..", "....."]).unwrap();
/// let gens: Vec<Board> = Simulation::new(blinker.clone()).take(3).collect();
/// assert_eq!(gens[0], blinker);
/// assert_ne!(gens[1], blinker);
/// assert_eq!(gens[2], blinker);
/// ```
pub struct Simulation {
  next: Option<Board>,
  seed: Option<u64>,
}

impl Simulation {
  pub fn new(board: Board) -> Self {
    Self {
      next: Some(board),
      seed: None,
    }
  }

  /// Start from a random board as described by `config`.
  pub fn from_config(config: &SimulationConfig) -> Result<Self> {
    let (mut rng, seed) = board_rng(config.seed);
    let board = Board::random(config.height, config.width, &mut rng)?;
    log::info!(
      "Created {}x{} board with seed {seed}, {} cells alive",
      config.width,
      config.height,
      board.live_count()
    );
    Ok(Self {
      next: Some(board),
      seed: Some(seed),
    })
  }

  /// The seed the initial board was drawn with, if it was random.
  pub fn seed(&self) -> Option<u64> {
    self.seed
  }
}

impl Iterator for Simulation {
  type Item = Board;

  fn next(&mut self) -> Option<Board> {
    let current = self.next.take()?;
    self.next = Some(step(&current));
    Some(current)
  }
}

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
  pub frames: usize,
  /// Live cells on the board of the last frame
  pub final_live_cells: usize,
  pub seed: Option<u64>,
}

/// Render `config.steps` generations into `sink`, in order, on the calling
/// thread. Frame 0 is the initial board.
pub fn run<S: FrameSink + ?Sized>(config: &SimulationConfig, sink: &mut S) -> Result<RunSummary> {
  run_with_cancel(config, sink, &AtomicBool::new(false))
}

/// Like [`run`], checking `cancel` before each step and stopping with a
/// `Cancelled` error once it is set.
pub fn run_with_cancel<S: FrameSink + ?Sized>(
  config: &SimulationConfig,
  sink: &mut S,
  cancel: &AtomicBool,
) -> Result<RunSummary> {
  let simulation = Simulation::from_config(config)?;
  let seed = simulation.seed();

  let mut final_live_cells = 0;
  for (n, board) in simulation.take(config.steps).enumerate() {
    if cancel.load(Ordering::Relaxed) {
      return Err(Error::cancelled(n));
    }
    final_live_cells = board.live_count();
    sink.write_frame(render_step(&board, config.scale, n)?)?;
    log_progress(n, config.steps, final_live_cells);
  }

  Ok(RunSummary {
    frames: config.steps,
    final_live_cells,
    seed,
  })
}

/// Like [`run_with_cancel`], but simulation and rendering happen on a worker
/// thread that stays up to `depth` frames ahead of the sink. Frames still
/// reach the sink in step order, on the calling thread.
pub fn run_pipelined<S: FrameSink + ?Sized>(
  config: &SimulationConfig,
  sink: &mut S,
  depth: usize,
  cancel: &AtomicBool,
) -> Result<RunSummary> {
  let simulation = Simulation::from_config(config)?;
  let seed = simulation.seed();
  let (steps, scale) = (config.steps, config.scale);
  let (tx, rx) = sync_channel::<Result<(Frame, usize)>>(depth.max(1));

  std::thread::scope(|scope| {
    scope.spawn(move || {
      for (n, board) in simulation.take(steps).enumerate() {
        if cancel.load(Ordering::Relaxed) {
          tx.send(Err(Error::cancelled(n))).ok();
          return;
        }
        let live = board.live_count();
        let rendered = render_step(&board, scale, n).map(|frame| (frame, live));
        let failed = rendered.is_err();
        // A send error means the sink side has already given up
        if tx.send(rendered).is_err() || failed {
          return;
        }
      }
    });

    let mut frames = 0;
    let mut final_live_cells = 0;
    for rendered in rx {
      let (frame, live) = rendered?;
      sink.write_frame(frame)?;
      log_progress(frames, steps, live);
      frames += 1;
      final_live_cells = live;
    }

    Ok(RunSummary {
      frames,
      final_live_cells,
      seed,
    })
  })
}

fn log_progress(n: usize, steps: usize, live: usize) {
  if n % LOG_INTERVAL == 0 || n + 1 == steps {
    log::debug!("step {}/{steps}: {live} cells alive", n + 1);
  }
}
