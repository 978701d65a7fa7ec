//! Internal methods for parsing FFmpeg CLI log output.
//!
//! The encoder is started with `-loglevel level+info`, so every stderr line
//! carries a `[level]` prefix that maps onto the `log` crate's levels.

use std::io::{BufReader, Read};

use crate::read_until_any::read_until_any;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
  Info,
  Warning,
  Error,
  Fatal,
  Unknown,
}

impl LogLevel {
  /// The `log` level an FFmpeg message of this level is forwarded at.
  pub fn as_log_level(self) -> log::Level {
    match self {
      LogLevel::Info | LogLevel::Unknown => log::Level::Debug,
      LogLevel::Warning => log::Level::Warn,
      LogLevel::Error | LogLevel::Fatal => log::Level::Error,
    }
  }

  pub fn is_error(self) -> bool {
    matches!(self, LogLevel::Error | LogLevel::Fatal)
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FfmpegProgress {
  /// Number of frames encoded so far
  pub frame: u32,

  /// Encoding throughput in frames per second
  pub fps: f32,

  /// The raw time string in a format like `00:03:29.04`
  pub time: String,

  /// Processing speed as a ratio of the output duration; 1x is realtime
  pub speed: f32,

  /// The line that this progress was parsed from
  pub raw_log_message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogEvent {
  Log(LogLevel, String),
  Progress(FfmpegProgress),
  EOF,
}

pub struct FfmpegLogParser<R: Read> {
  reader: BufReader<R>,
}

impl<R: Read> FfmpegLogParser<R> {
  /// Consume one line (delimited by `\n`, `\r\n`, or a bare `\r`) and
  /// classify it. Only fails if reading from the underlying pipe fails.
  pub fn parse_next_event(&mut self) -> anyhow::Result<LogEvent> {
    let mut buf = Vec::<u8>::new();
    let bytes_read = read_until_any(&mut self.reader, &[b'\r', b'\n'], &mut buf)?;
    if bytes_read == 0 {
      return Ok(LogEvent::EOF);
    }

    let line = String::from_utf8_lossy(&buf);
    let line = line.trim();
    if let Some(progress) = try_parse_progress(line) {
      return Ok(LogEvent::Progress(progress));
    }
    let (level, message) = parse_log_level(line);
    Ok(LogEvent::Log(level, message.to_string()))
  }

  pub fn new(inner: R) -> Self {
    Self {
      reader: BufReader::new(inner),
    }
  }
}

/// Split the `[level]` prefix from a log line.
///
/// ```rust
/// use life_sidecar::log_parser::{parse_log_level, LogLevel};
/// assert_eq!(parse_log_level("[warning] deprecated pixel format"), (LogLevel::Warning, "deprecated pixel format"));
/// assert_eq!(parse_log_level("no prefix"), (LogLevel::Unknown, "no prefix"));
/// ```
pub fn parse_log_level(line: &str) -> (LogLevel, &str) {
  let levels = [
    ("[info]", LogLevel::Info),
    ("[warning]", LogLevel::Warning),
    ("[error]", LogLevel::Error),
    ("[fatal]", LogLevel::Fatal),
  ];
  levels
    .iter()
    .find_map(|&(prefix, level)| line.strip_prefix(prefix).map(|rest| (level, rest.trim())))
    .unwrap_or((LogLevel::Unknown, line))
}

/// Parse a progress update such as
/// `[info] frame=  120 fps= 60 q=-0.0 size=     512KiB time=00:00:06.00 bitrate= 699.1kbits/s speed=3.01x`.
///
/// Returns `None` for any other line.
pub fn try_parse_progress(line: &str) -> Option<FfmpegProgress> {
  let raw_log_message = line.to_string();
  let line = line.strip_prefix("[info]").unwrap_or(line).trim();
  if !line.starts_with("frame=") {
    return None;
  }

  let field = |key: &str| line.split(key).nth(1)?.split_whitespace().next();

  let frame = field("frame=")?.parse::<u32>().ok()?;
  let fps = field("fps=")?.parse::<f32>().unwrap_or(0.0);
  let time = field("time=")?.to_string();
  let speed = field("speed=")
    .and_then(|s| s.strip_suffix('x'))
    .and_then(|s| s.parse::<f32>().ok())
    .unwrap_or(0.0); // handles "N/A"

  Some(FfmpegProgress {
    frame,
    fps,
    time,
    speed,
    raw_log_message,
  })
}
