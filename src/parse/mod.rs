//! Low level access to the bytes of a PLY file.
//!
//! The header and ASCII data section are consumed line by line, binary data
//! sections in chunks of a fixed number of bytes. [`Input`] offers exactly
//! these two operations; [`buf::Buffer`] implements it for every
//! `io::Read`.

use std::io;


pub(crate) mod buf;

/// A source of lines and fixed size byte chunks.
pub(crate) trait Input {
    /// Takes the next line (without the `\n` terminator) and passes it to
    /// `func`. The last line of the input doesn't need a terminator. Returns
    /// `Ok(None)` if the input is exhausted.
    fn take_line<F, O, E>(&mut self, func: F) -> Result<Option<O>, E>
    where
        F: FnOnce(&[u8]) -> Result<O, E>,
        E: From<io::Error>;

    /// Takes the next `num_bytes` bytes and passes them to `func`. Returns
    /// `Ok(None)` (and consumes everything) if there are fewer than
    /// `num_bytes` bytes left.
    fn take_bytes<F, O, E>(&mut self, num_bytes: usize, func: F) -> Result<Option<O>, E>
    where
        F: FnOnce(&[u8]) -> Result<O, E>,
        E: From<io::Error>;

    /// Number of bytes consumed so far.
    fn offset(&self) -> usize;
}

/// Removes trailing whitespace (including a `\r` from a `\r\n` line break)
/// and leading whitespace.
pub(crate) fn trim_line(line: &[u8]) -> &[u8] {
    let start = line.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(line.len());
    let end = line.iter().rposition(|b| !b.is_ascii_whitespace()).map_or(start, |i| i + 1);
    &line[start..end]
}

/// Formats bytes for error messages: as string if they are valid UTF-8, as
/// list of numbers otherwise.
pub(crate) fn debug_fmt_bytes(data: &[u8]) -> String {
    if let Ok(s) = std::str::from_utf8(data) {
        format!("{:?}", s)
    } else {
        format!("{:?}", data)
    }
}
