//! Render Conway's Game of Life to a video file.

use std::{path::PathBuf, sync::atomic::AtomicBool};

use anyhow::{Context, Result};
use clap::Parser;
use life_sidecar::{
  encoder::{EncoderConfig, VideoEncoder},
  paths::ffmpeg_is_installed,
  simulation::{run_pipelined, SimulationConfig},
};

/// Frames the simulation thread may run ahead of the encoder.
const PIPELINE_DEPTH: usize = 8;

#[derive(Parser)]
#[command(name = "life-sidecar")]
#[command(version)]
#[command(about = "Conway's Game of Life, rendered to video through FFmpeg")]
struct Cli {
  /// Width of the board in cells
  #[arg(long, default_value_t = 100, allow_negative_numbers = true)]
  width: i64,

  /// Height of the board in cells
  #[arg(long, default_value_t = 100, allow_negative_numbers = true)]
  height: i64,

  /// Number of steps to simulate, one frame each
  #[arg(long, default_value_t = 1000)]
  steps: usize,

  /// Pixels per cell in the output video
  #[arg(long, default_value_t = 5, allow_negative_numbers = true)]
  scale: i64,

  /// Random seed for the initial board
  #[arg(long)]
  seed: Option<u64>,

  /// Output video file
  #[arg(short, long, default_value = "game_of_life.mp4")]
  output: PathBuf,

  /// Frame rate of the output video
  #[arg(long, default_value_t = 20)]
  fps: u32,

  /// FFmpeg executable; defaults to a sidecar binary or `ffmpeg` on the PATH
  #[arg(long)]
  ffmpeg: Option<PathBuf>,
}

fn main() -> Result<()> {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

  let cli = Cli::parse();

  let config = SimulationConfig::new(cli.width, cli.height, cli.steps, cli.scale, cli.seed)
    .context("Invalid simulation parameters")?;

  let mut encoder_config = EncoderConfig::default().output(&cli.output).fps(cli.fps);
  if let Some(ffmpeg) = &cli.ffmpeg {
    encoder_config = encoder_config.ffmpeg(ffmpeg);
  }
  if !ffmpeg_is_installed(&encoder_config.ffmpeg) {
    anyhow::bail!(
      "FFmpeg not found at {}; install it or pass --ffmpeg",
      encoder_config.ffmpeg.display()
    );
  }

  let (width, height) = config.frame_size()?;
  let mut encoder =
    VideoEncoder::open(&encoder_config, width, height).context("Failed to start the encoder")?;

  let summary = run_pipelined(&config, &mut encoder, PIPELINE_DEPTH, &AtomicBool::new(false))
    .context("Simulation aborted")?;
  encoder.finish().context("Failed to finalize the video")?;

  log::info!(
    "Wrote {} frames to {} (seed {}, {} cells alive at the end)",
    summary.frames,
    cli.output.display(),
    summary
      .seed
      .map(|s| s.to_string())
      .unwrap_or_else(|| "none".to_string()),
    summary.final_live_cells
  );
  Ok(())
}
