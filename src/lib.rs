//! Simulate Conway's Game of Life and stream every generation into a
//! standalone FFmpeg binary as a video.
//!
//! ## Example
//!
//! ```rust,no_run
//! use life_sidecar::{
//!   encoder::{EncoderConfig, VideoEncoder},
//!   error::Result,
//!   simulation::{run, SimulationConfig},
//! };
//!
//! fn main() -> Result<()> {
//!   let config = SimulationConfig { seed: Some(42), ..Default::default() }; // <- 100x100, 1000 steps
//!   let (width, height) = config.frame_size()?;
//!   let mut encoder = VideoEncoder::open(&EncoderConfig::default(), width, height)?; // <- spawns `ffmpeg`
//!   let summary = run(&config, &mut encoder)?; // <- one rgb24 frame per step, piped to stdin
//!   encoder.finish()?; // <- waits for `game_of_life.mp4` to be written
//!   println!("{} frames, {} cells alive at the end", summary.frames, summary.final_live_cells);
//!   Ok(())
//! }
//! ```
//!

#[cfg(test)]
mod test;

pub mod board;
pub mod child;
pub mod command;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod log_parser;
pub mod paths;
pub mod read_until_any;
pub mod render;
pub mod simulation;
