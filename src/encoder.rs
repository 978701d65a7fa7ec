//! Streaming rendered frames into an FFmpeg child process.
//!
//! Frames are written as raw `rgb24` bytes to FFmpeg's stdin, while a
//! background thread drains its stderr and forwards each line to the logger.

use std::{
  io::{self, Write},
  path::{Path, PathBuf},
  process::{ChildStderr, ChildStdin},
  thread::JoinHandle,
};

use crate::{
  child::FfmpegChild,
  command::FfmpegCommand,
  error::{Error, ErrorKind, Result},
  log_parser::{FfmpegLogParser, LogEvent},
  paths::ffmpeg_path,
  render::Frame,
};

/// Anything that accepts rendered frames in step order.
pub trait FrameSink {
  fn write_frame(&mut self, frame: Frame) -> Result<()>;
}

/// Collect frames in memory.
impl FrameSink for Vec<Frame> {
  fn write_frame(&mut self, frame: Frame) -> Result<()> {
    self.push(frame);
    Ok(())
  }
}

/// Output settings for [`VideoEncoder`]. The defaults produce a lossless
/// H.264 `game_of_life.mp4` at 20 fps, favoring encoding speed over file size.
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderConfig {
  /// FFmpeg executable to run
  pub ffmpeg: PathBuf,
  pub output: PathBuf,
  pub fps: u32,
  pub codec: String,
  pub preset: String,
  pub crf: u8,
  /// Output pixel format; left to the encoder when `None`
  pub pix_fmt: Option<String>,
}

impl Default for EncoderConfig {
  fn default() -> Self {
    Self {
      ffmpeg: ffmpeg_path(),
      output: PathBuf::from("game_of_life.mp4"),
      fps: 20,
      codec: "libx264".to_string(),
      preset: "ultrafast".to_string(),
      crf: 0,
      pix_fmt: None,
    }
  }
}

impl EncoderConfig {
  pub fn output<P: AsRef<Path>>(mut self, output: P) -> Self {
    self.output = output.as_ref().to_path_buf();
    self
  }

  pub fn fps(mut self, fps: u32) -> Self {
    self.fps = fps;
    self
  }

  pub fn ffmpeg<P: AsRef<Path>>(mut self, ffmpeg: P) -> Self {
    self.ffmpeg = ffmpeg.as_ref().to_path_buf();
    self
  }

  /// The full FFmpeg invocation for frames of the given size.
  pub fn command(&self, width: u32, height: u32) -> FfmpegCommand {
    let mut command = FfmpegCommand::new_with_exe(&self.ffmpeg);
    command
      .hide_banner()
      .rawvideo_stdin(width, height, self.fps)
      .codec_video(&self.codec)
      .preset(&self.preset)
      .crf(self.crf);
    if let Some(pix_fmt) = &self.pix_fmt {
      command.pix_fmt(pix_fmt);
    }
    command.overwrite().arg(&self.output);
    command
  }
}

/// A running FFmpeg process encoding frames of one fixed size.
///
/// Call [`VideoEncoder::finish`] after the last frame. If the encoder is
/// dropped before that (for example because the run failed), the FFmpeg
/// process is killed and reaped.
pub struct VideoEncoder {
  child: FfmpegChild,
  stdin: Option<ChildStdin>,
  stderr_thread: Option<JoinHandle<Vec<String>>>,
  width: u32,
  height: u32,
  frames_written: usize,
  finished: bool,
}

impl VideoEncoder {
  /// Spawn FFmpeg, ready to receive `width` x `height` frames.
  pub fn open(config: &EncoderConfig, width: u32, height: u32) -> Result<Self> {
    if width == 0 || height == 0 {
      return Err(Error::invalid_dimension(width, height));
    }

    let mut child = config.command(width, height).spawn().map_err(|e| {
      let mut err = Error::from_std(ErrorKind::Encoder, e);
      err.message = format!(
        "Failed to start {}: {}. Is FFmpeg installed?",
        config.ffmpeg.display(),
        err.message
      );
      err
    })?;

    let stdin = child
      .take_stdin()
      .ok_or_else(|| Error::encoder("No stdin channel on the FFmpeg process"))?;
    let stderr_thread = child.take_stderr().map(spawn_stderr_thread);

    log::info!(
      "Encoding {width}x{height} at {} fps to {}",
      config.fps,
      config.output.display()
    );

    Ok(Self {
      child,
      stdin: Some(stdin),
      stderr_thread,
      width,
      height,
      frames_written: 0,
      finished: false,
    })
  }

  pub fn frames_written(&self) -> usize {
    self.frames_written
  }

  /// Close FFmpeg's input and wait for it to write the file, returning the
  /// number of frames encoded.
  pub fn finish(mut self) -> Result<usize> {
    self.finished = true;
    drop(self.stdin.take());
    let status = self.child.wait()?;
    let errors = self.join_stderr();

    if !status.success() {
      return Err(Error::encoder(format!(
        "FFmpeg exited with {status}: {}",
        errors.join("; ")
      )));
    }

    log::info!("Encoder finished after {} frames", self.frames_written);
    Ok(self.frames_written)
  }

  fn join_stderr(&mut self) -> Vec<String> {
    match self.stderr_thread.take().map(JoinHandle::join) {
      Some(Ok(errors)) => errors,
      Some(Err(_)) => vec!["stderr reader thread panicked".to_string()],
      None => Vec::new(),
    }
  }

  /// Turn a failed write into an error carrying whatever FFmpeg reported.
  fn write_failed(&mut self, e: io::Error) -> Error {
    self.finished = true;
    drop(self.stdin.take());
    let status = self.child.wait();
    let errors = self.join_stderr();

    let mut err = Error::from(e);
    err.message = format!(
      "Writing frame {} failed ({}), FFmpeg status {:?}: {}",
      self.frames_written,
      err.message,
      status.ok(),
      errors.join("; ")
    );
    err
  }
}

impl FrameSink for VideoEncoder {
  fn write_frame(&mut self, frame: Frame) -> Result<()> {
    if (frame.width, frame.height) != (self.width, self.height) {
      return Err(Error::new(
        ErrorKind::FrameMismatch,
        format!(
          "Frame {} is {}, encoder expects {}x{}",
          frame.frame_num,
          frame.size_str(),
          self.width,
          self.height
        ),
      ));
    }

    let stdin = self
      .stdin
      .as_mut()
      .ok_or_else(|| Error::encoder("Encoder input is already closed"))?;
    if let Err(e) = stdin.write_all(&frame.data) {
      return Err(self.write_failed(e));
    }

    self.frames_written += 1;
    log::trace!("Wrote frame {}", frame.frame_num);
    Ok(())
  }
}

impl Drop for VideoEncoder {
  fn drop(&mut self) {
    if self.finished {
      return;
    }
    log::warn!(
      "Encoder dropped after {} frames without finishing; killing FFmpeg",
      self.frames_written
    );
    drop(self.stdin.take());
    self.child.kill().ok();
    self.child.wait().ok();
    self.join_stderr();
  }
}

/// Spawn a thread which reads FFmpeg's stderr line by line and forwards it to
/// the `ffmpeg` log target. Returns the error lines once stderr closes.
pub fn spawn_stderr_thread(stderr: ChildStderr) -> JoinHandle<Vec<String>> {
  std::thread::spawn(move || {
    let mut parser = FfmpegLogParser::new(stderr);
    let mut errors = Vec::new();
    loop {
      match parser.parse_next_event() {
        Ok(LogEvent::EOF) => break,
        Ok(LogEvent::Progress(p)) => {
          log::debug!(target: "ffmpeg", "encoded {} frames, time={} speed={}x", p.frame, p.time, p.speed)
        }
        Ok(LogEvent::Log(level, message)) => {
          log::log!(target: "ffmpeg", level.as_log_level(), "{message}");
          if level.is_error() {
            errors.push(message);
          }
        }
        Err(e) => {
          log::warn!("Error reading ffmpeg output: {e}");
          break;
        }
      }
    }
    errors
  })
}
