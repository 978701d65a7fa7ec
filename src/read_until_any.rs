//! Internal utility; `BufRead::read_until` with multiple delimiters.
//!
//! FFmpeg ends progress lines with a bare `\r` and everything else with `\n`
//! or `\r\n`, so stderr has to be split on either byte.

use std::io::{BufRead, ErrorKind, Result};

/// Reads from `r` until any of the delimiter bytes match, appending to `buf`
/// including the delimiter. Delimiters at the very start of a read are
/// skipped so that `\r\n` never yields an empty line. Returns the number of
/// bytes consumed, or 0 once only delimiters remain before EOF.
pub fn read_until_any<R: BufRead + ?Sized>(
  r: &mut R,
  delims: &[u8],
  buf: &mut Vec<u8>,
) -> Result<usize> {
  let is_delim = |b: &u8| delims.contains(b);
  let mut read = 0;
  loop {
    let (done, used) = {
      let available = match r.fill_buf() {
        Ok(n) => n,
        Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
        Err(e) => return Err(e),
      };

      let skip = match read {
        0 => available.iter().take_while(|&b| is_delim(b)).count(),
        _ => 0,
      };

      match available[skip..].iter().position(is_delim) {
        Some(i) => {
          buf.extend_from_slice(&available[..=skip + i]);
          (true, skip + i + 1)
        }
        None => {
          buf.extend_from_slice(available);
          (false, available.len())
        }
      }
    };
    r.consume(used);
    read += used;

    if done {
      return Ok(read);
    }

    if used == 0 {
      // EOF: a buffer of nothing but delimiters is not a line
      return match buf.iter().all(is_delim) {
        true => Ok(0),
        false => Ok(read),
      };
    }
  }
}
