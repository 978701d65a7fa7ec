use crate::error::{Error, ErrorKind, Result};
use std::{
  env::current_exe,
  path::{Path, PathBuf},
  process::{Command, Stdio},
};

/// Path of the FFmpeg executable used for encoding: a sidecar binary next to
/// the running executable if one exists, otherwise plain `ffmpeg` resolved
/// through the system path when the command is run.
pub fn ffmpeg_path() -> PathBuf {
  let default = Path::new("ffmpeg").to_path_buf();
  match sidecar_path() {
    Ok(path) if path.exists() => path,
    _ => default,
  }
}

/// The (expected) path to an FFmpeg binary adjacent to the Rust binary,
/// with `.exe` appended on Windows.
pub fn sidecar_path() -> Result<PathBuf> {
  let mut path = current_exe()?
    .parent()
    .ok_or_else(|| Error::new(ErrorKind::Io, "Can't get parent of current_exe"))?
    .join("ffmpeg");
  if cfg!(windows) {
    path.set_extension("exe");
  }
  Ok(path)
}

/// Whether `ffmpeg -version` runs successfully at the given path.
pub fn ffmpeg_is_installed<P: AsRef<Path>>(path: P) -> bool {
  Command::new(path.as_ref())
    .arg("-version")
    .stderr(Stdio::null())
    .stdout(Stdio::null())
    .status()
    .map(|s| s.success())
    .unwrap_or(false)
}
