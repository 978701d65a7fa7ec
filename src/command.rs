use std::{
  ffi::OsStr,
  fmt, io,
  process::{Command, CommandArgs, Stdio},
};

use crate::{child::FfmpegChild, paths::ffmpeg_path};

/// A wrapper around [`std::process::Command`] with the argument aliases the
/// frame encoder needs.
///
/// The `rustdoc` on each method includes relevant information from the FFmpeg
/// documentation: <https://ffmpeg.org/ffmpeg.html>.
pub struct FfmpegCommand {
  inner: Command,
}

impl FfmpegCommand {
  //// Generic option aliases
  //// https://ffmpeg.org/ffmpeg.html#Generic-options

  /// Alias for `-hide_banner` argument.
  ///
  /// Suppress printing the copyright notice, build options and library versions.
  pub fn hide_banner(&mut self) -> &mut Self {
    self.arg("-hide_banner");
    self
  }

  //// Main option aliases
  //// https://ffmpeg.org/ffmpeg.html#Main-options

  /// Alias for `-f` argument, the format name.
  ///
  /// Before an input, forces the demuxer; before an output, the muxer.
  pub fn format<S: AsRef<str>>(&mut self, format: S) -> &mut Self {
    self.arg("-f");
    self.arg(format.as_ref());
    self
  }

  /// Alias for `-i` argument, the input file path or URL.
  ///
  /// To take input from stdin, use the value `-` or `pipe`.
  pub fn input<S: AsRef<str>>(&mut self, path_or_url: S) -> &mut Self {
    self.arg("-i");
    self.arg(path_or_url.as_ref());
    self
  }

  /// Alias for `-y` argument: overwrite output files without asking.
  pub fn overwrite(&mut self) -> &mut Self {
    self.arg("-y");
    self
  }

  /// Alias for `-c:v` argument.
  ///
  /// Select the video encoder when used before an output file.
  pub fn codec_video<S: AsRef<str>>(&mut self, codec: S) -> &mut Self {
    self.arg("-c:v");
    self.arg(codec.as_ref());
    self
  }

  //// Video option aliases
  //// https://ffmpeg.org/ffmpeg.html#Video-Options

  /// Alias for `-pix_fmt` argument.
  ///
  /// Set the pixel format. For raw input this describes the bytes on the pipe.
  pub fn pix_fmt<S: AsRef<str>>(&mut self, format: S) -> &mut Self {
    self.arg("-pix_fmt");
    self.arg(format.as_ref());
    self
  }

  /// Alias for `-s` argument, frame size as `WIDTHxHEIGHT`.
  ///
  /// Required for raw video input since it carries no header.
  pub fn size(&mut self, width: u32, height: u32) -> &mut Self {
    self.arg("-s");
    self.arg(format!("{width}x{height}"));
    self
  }

  /// Alias for `-r` argument, the frame rate.
  pub fn rate(&mut self, fps: u32) -> &mut Self {
    self.arg("-r");
    self.arg(fps.to_string());
    self
  }

  /// Alias for `-preset` argument of the x264/x265 encoders, trading
  /// compression for speed (`ultrafast` .. `veryslow`).
  pub fn preset<S: AsRef<str>>(&mut self, preset: S) -> &mut Self {
    self.arg("-preset");
    self.arg(preset.as_ref());
    self
  }

  /// Alias for `-crf` argument, the constant rate factor. `0` is lossless
  /// for libx264.
  pub fn crf(&mut self, crf: u8) -> &mut Self {
    self.arg("-crf");
    self.arg(crf.to_string());
    self
  }

  //// Preset argument sets for common use cases.

  /// Preset for reading raw `rgb24` frames of a fixed size from stdin.
  /// Equivalent to `-f rawvideo -pix_fmt rgb24 -s WxH -r FPS -i -`.
  pub fn rawvideo_stdin(&mut self, width: u32, height: u32, fps: u32) -> &mut Self {
    self
      .format("rawvideo")
      .pix_fmt("rgb24")
      .size(width, height)
      .rate(fps)
      .input("-")
  }

  /// Automatically applied in the constructor of `FfmpegCommand`.
  ///
  /// Equivalent to `ffmpeg -loglevel level+info`. The `level` flag prefixes
  /// every log line with its level in square brackets so stderr can be
  /// forwarded at the matching `log` level.
  fn set_expected_loglevel(&mut self) -> &mut Self {
    self.args(["-loglevel", "level+info"]);
    self
  }

  //// `std::process::Command` passthrough methods

  /// Adds an argument to pass to the program.
  ///
  /// Identical to `arg` in [`std::process::Command`].
  pub fn arg<S: AsRef<OsStr>>(&mut self, arg: S) -> &mut Self {
    self.inner.arg(arg.as_ref());
    self
  }

  /// Adds multiple arguments to pass to the program.
  ///
  /// Identical to `args` in [`std::process::Command`].
  pub fn args<I, S>(&mut self, args: I) -> &mut Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
  {
    for arg in args {
      self.arg(arg.as_ref());
    }
    self
  }

  /// Returns an iterator of the arguments that will be passed to the program.
  pub fn get_args(&self) -> CommandArgs<'_> {
    self.inner.get_args()
  }

  /// Spawn the ffmpeg command as a child process, wrapping it in a
  /// `FfmpegChild` interface.
  pub fn spawn(&mut self) -> io::Result<FfmpegChild> {
    log::debug!("Spawning {:?}", self.inner);
    self.inner.spawn().map(FfmpegChild::from_inner)
  }

  //// Constructors

  /// Uses the sidecar binary if present, else `ffmpeg` from the system path.
  pub fn new() -> Self {
    Self::new_with_exe(ffmpeg_path())
  }

  pub fn new_with_exe<S: AsRef<OsStr>>(exe: S) -> Self {
    let mut inner = Command::new(&exe);
    inner.stdin(Stdio::piped());
    inner.stderr(Stdio::piped());
    inner.stdout(Stdio::null());

    let mut ffmpeg_command = Self { inner };
    ffmpeg_command.set_expected_loglevel();
    ffmpeg_command
  }
}

impl Default for FfmpegCommand {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Debug for FfmpegCommand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.inner.fmt(f)
  }
}

impl From<Command> for FfmpegCommand {
  /// Convert a `Command` without applying `-loglevel level+info` or
  /// configuring stdio.
  fn from(inner: Command) -> Self {
    Self { inner }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn args_of(cmd: &FfmpegCommand) -> Vec<String> {
    cmd
      .get_args()
      .map(|a| a.to_string_lossy().to_string())
      .collect()
  }

  #[test]
  fn test_rawvideo_stdin_args() {
    let mut cmd = FfmpegCommand::new_with_exe("ffmpeg");
    cmd.rawvideo_stdin(500, 300, 20);
    assert_eq!(
      args_of(&cmd),
      [
        "-loglevel",
        "level+info",
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgb24",
        "-s",
        "500x300",
        "-r",
        "20",
        "-i",
        "-"
      ]
    );
  }

  #[test]
  fn test_from_command_skips_loglevel() {
    let cmd = FfmpegCommand::from(Command::new("ffmpeg"));
    assert_eq!(cmd.get_args().count(), 0);
  }

  #[test]
  fn test_encoder_aliases() {
    let mut cmd = FfmpegCommand::new_with_exe("ffmpeg");
    cmd
      .hide_banner()
      .codec_video("libx264")
      .preset("ultrafast")
      .crf(0)
      .overwrite();
    assert_eq!(
      &args_of(&cmd)[2..],
      ["-hide_banner", "-c:v", "libx264", "-preset", "ultrafast", "-crf", "0", "-y"]
    );
  }
}
