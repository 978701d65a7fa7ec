use std::error::Error as StdError;
use std::fmt::{Display, Formatter};
use std::io;
use std::result::Result as StdResult;

/// Shorthand alias for `Result<T, Error>` using the `life_sidecar` error type.
pub type Result<T> = StdResult<T, Error>;

/// Broad category of a failure. Every kind is fatal to a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Board width or height was not a positive integer.
  InvalidDimension,
  /// Render scale was less than 1.
  InvalidScale,
  /// A frame did not match the dimensions the sink was opened with.
  FrameMismatch,
  /// FFmpeg could not be started, closed its pipe early, or exited with an error.
  Encoder,
  /// The run was stopped through its cancellation flag.
  Cancelled,
  /// Any other I/O failure.
  Io,
}

/// The error type for the `life-sidecar` crate.
#[derive(Debug)]
pub struct Error {
  pub kind: ErrorKind,
  pub message: String,
  pub source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl Display for Error {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.message)
  }
}

impl StdError for Error {
  fn source(&self) -> Option<&(dyn StdError + 'static)> {
    self
      .source
      .as_deref()
      .map(|e| e as &(dyn StdError + 'static))
  }
}

impl Error {
  /// Create an error of the given kind from a message.
  pub fn new<S: AsRef<str>>(kind: ErrorKind, message: S) -> Self {
    Error {
      kind,
      message: message.as_ref().to_string(),
      source: None,
    }
  }

  /// Wrap any standard Error, keeping it as the source.
  pub fn from_std<E>(kind: ErrorKind, e: E) -> Self
  where
    E: StdError + Send + Sync + 'static,
  {
    Error {
      kind,
      message: e.to_string(),
      source: Some(Box::new(e)),
    }
  }

  pub fn invalid_dimension(width: impl Display, height: impl Display) -> Self {
    Self::new(
      ErrorKind::InvalidDimension,
      format!("Board dimensions must be positive, got {width}x{height}"),
    )
  }

  pub fn invalid_scale(scale: impl Display) -> Self {
    Self::new(
      ErrorKind::InvalidScale,
      format!("Scale must be at least 1, got {scale}"),
    )
  }

  /// Shorthand for an `Encoder` error.
  pub fn encoder<S: AsRef<str>>(message: S) -> Self {
    Self::new(ErrorKind::Encoder, message)
  }

  pub fn cancelled(step: usize) -> Self {
    Self::new(ErrorKind::Cancelled, format!("Run cancelled at step {step}"))
  }

  pub fn kind(&self) -> ErrorKind {
    self.kind
  }
}

impl From<io::Error> for Error {
  fn from(e: io::Error) -> Self {
    // A closed stdin means ffmpeg went away mid-stream
    let kind = match e.kind() {
      io::ErrorKind::BrokenPipe => ErrorKind::Encoder,
      _ => ErrorKind::Io,
    };
    Error::from_std(kind, e)
  }
}

impl From<&str> for Error {
  fn from(e: &str) -> Self {
    Error::new(ErrorKind::Io, e)
  }
}

impl From<String> for Error {
  fn from(e: String) -> Self {
    Error::new(ErrorKind::Io, e)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_broken_pipe_is_encoder_error() {
    let err = Error::from(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
    assert_eq!(err.kind(), ErrorKind::Encoder);
    assert!(err.source().is_some());
  }

  #[test]
  fn test_messages() {
    assert_eq!(
      Error::invalid_dimension(0, 5).to_string(),
      "Board dimensions must be positive, got 0x5"
    );
    assert_eq!(Error::invalid_scale(0).kind(), ErrorKind::InvalidScale);
    assert_eq!(Error::from("boom").kind(), ErrorKind::Io);
  }
}
