use std::{
  io,
  process::{Child, ChildStderr, ChildStdin, ExitStatus},
};

/// A wrapper around [`std::process::Child`] containing a spawned FFmpeg command.
pub struct FfmpegChild {
  inner: Child,
}

impl FfmpegChild {
  /// Take ownership of the stdin pipe frames are written to. Dropping it
  /// signals end of input to FFmpeg.
  pub fn take_stdin(&mut self) -> Option<ChildStdin> {
    self.inner.stdin.take()
  }

  /// Take ownership of the stderr pipe carrying FFmpeg's log output.
  pub fn take_stderr(&mut self) -> Option<ChildStderr> {
    self.inner.stderr.take()
  }

  /// Wait for the child process to exit. Any stdin still held by this
  /// wrapper is closed first.
  pub fn wait(&mut self) -> io::Result<ExitStatus> {
    self.inner.wait()
  }

  /// Forcibly terminate the child process.
  pub fn kill(&mut self) -> io::Result<()> {
    self.inner.kill()
  }

  pub(crate) fn from_inner(inner: Child) -> Self {
    Self { inner }
  }
}
