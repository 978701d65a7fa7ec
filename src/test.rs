use crate::{
  encoder::{EncoderConfig, FrameSink, VideoEncoder},
  error::ErrorKind,
  paths::{ffmpeg_is_installed, ffmpeg_path},
  render::Frame,
  simulation::{run, SimulationConfig},
};
use std::{env::temp_dir, fs};

fn ffmpeg_available() -> bool {
  let installed = ffmpeg_is_installed(ffmpeg_path());
  if !installed {
    eprintln!("ffmpeg not found, skipping");
  }
  installed
}

#[test]
fn test_encode_video() {
  if !ffmpeg_available() {
    return;
  }

  let output = temp_dir().join(format!("life_sidecar_test_{}.mp4", std::process::id()));
  let config = SimulationConfig {
    width: 32,
    height: 24,
    steps: 20,
    scale: 4,
    seed: Some(7),
  };
  let (width, height) = config.frame_size().unwrap();
  let mut encoder = VideoEncoder::open(&EncoderConfig::default().output(&output), width, height).unwrap();
  let summary = run(&config, &mut encoder).unwrap();
  assert_eq!(encoder.frames_written(), 20);
  assert_eq!(encoder.finish().unwrap(), 20);
  assert_eq!(summary.frames, 20);

  let size = fs::metadata(&output).unwrap().len();
  assert!(size > 0);
  fs::remove_file(&output).ok();
}

#[test]
fn test_encoder_rejects_wrong_frame_size() {
  if !ffmpeg_available() {
    return;
  }

  let output = temp_dir().join(format!("life_sidecar_mismatch_{}.mp4", std::process::id()));
  let mut encoder = VideoEncoder::open(&EncoderConfig::default().output(&output), 8, 8).unwrap();
  let err = encoder
    .write_frame(Frame {
      width: 4,
      height: 4,
      frame_num: 0,
      data: vec![0; 4 * 4 * 3],
    })
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::FrameMismatch);
  assert_eq!(encoder.frames_written(), 0);

  // Dropping without `finish` kills the process instead of hanging on it
  drop(encoder);
  fs::remove_file(&output).ok();
}

/// Write an executable shell script standing in for FFmpeg. It ignores the
/// arguments it is started with.
#[cfg(unix)]
fn fake_ffmpeg(name: &str, body: &str) -> std::path::PathBuf {
  use std::os::unix::fs::PermissionsExt;

  let path = temp_dir().join(format!("life_sidecar_{name}_{}.sh", std::process::id()));
  fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
  fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
  path
}

/// 512x512 frames, far larger than a pipe buffer, so a write cannot
/// complete once FFmpeg is gone.
#[cfg(unix)]
fn large_frames(steps: usize) -> SimulationConfig {
  SimulationConfig {
    width: 64,
    height: 64,
    steps,
    scale: 8,
    seed: Some(11),
  }
}

#[cfg(unix)]
#[test]
fn test_ffmpeg_exit_fails_run_with_its_errors() {
  use crate::simulation::run_pipelined;
  use std::sync::atomic::AtomicBool;

  let ffmpeg = fake_ffmpeg("exit_1", "echo \"[error] boom\" >&2\nexit 1");
  let encoder_config = EncoderConfig::default().ffmpeg(&ffmpeg);
  let config = large_frames(5);
  let (width, height) = config.frame_size().unwrap();

  let mut encoder = VideoEncoder::open(&encoder_config, width, height).unwrap();
  let err = run(&config, &mut encoder).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Encoder);
  assert!(err.message.contains("boom"), "{}", err.message);
  assert_eq!(encoder.frames_written(), 0);
  drop(encoder);

  let mut encoder = VideoEncoder::open(&encoder_config, width, height).unwrap();
  let err = run_pipelined(&config, &mut encoder, 2, &AtomicBool::new(false)).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Encoder);
  assert!(err.message.contains("Writing frame 0 failed"), "{}", err.message);
  assert!(err.message.contains("boom"), "{}", err.message);
  drop(encoder);

  fs::remove_file(&ffmpeg).ok();
}

#[cfg(unix)]
#[test]
fn test_finish_reports_frames_written() {
  let ffmpeg = fake_ffmpeg("cat", "cat >/dev/null");
  let config = large_frames(3);
  let (width, height) = config.frame_size().unwrap();

  let mut encoder = VideoEncoder::open(&EncoderConfig::default().ffmpeg(&ffmpeg), width, height).unwrap();
  let summary = run(&config, &mut encoder).unwrap();
  assert_eq!(summary.frames, 3);
  assert_eq!(encoder.finish().unwrap(), 3);

  fs::remove_file(&ffmpeg).ok();
}

#[cfg(unix)]
#[test]
fn test_drop_kills_unfinished_encoder() {
  use std::time::{Duration, Instant};

  // Never reads its input and never exits on its own
  let ffmpeg = fake_ffmpeg("sleep", "exec sleep 30");
  let mut encoder = VideoEncoder::open(&EncoderConfig::default().ffmpeg(&ffmpeg), 4, 4).unwrap();
  encoder
    .write_frame(Frame {
      width: 4,
      height: 4,
      frame_num: 0,
      data: vec![0; 4 * 4 * 3],
    })
    .unwrap();
  assert_eq!(encoder.frames_written(), 1);

  let start = Instant::now();
  drop(encoder);
  assert!(start.elapsed() < Duration::from_secs(10));

  fs::remove_file(&ffmpeg).ok();
}
