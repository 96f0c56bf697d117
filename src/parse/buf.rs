use std::{
    cmp::{max, min},
    fmt,
    io::{self, Read},
};

use static_assertions::const_assert;

use super::Input;


/// The initial size of the buffer in bytes.
const START_BUFFER_SIZE: usize = 8 * 1024;

/// The maximum size the internal buffer can grow to.
///
/// The buffer only has to hold one line or one value at a time. Header lines
/// and ASCII rows are small, so a file exceeding this limit is either
/// degenerate or not a PLY file. Instead of growing without bound, we return
/// an error.
pub(crate) const MAX_BUFFER_SIZE: usize = 4 * 1024 * 1024;

const_assert!(START_BUFFER_SIZE <= MAX_BUFFER_SIZE);

/// A read buffer over an `io::Read` that implements [`Input`].
pub(crate) struct Buffer<R: Read> {
    reader: R,

    buf: Vec<u8>,

    /// Points to the first byte in `buf` that is real data. Invariants:
    /// - `0 <= start <= end`
    start: usize,

    /// Points to the byte after the last byte of real data. Invariants:
    /// - `0 <= end <= buf.len()`
    /// - `start <= end`
    end: usize,

    consumed_total: usize,
}

impl<R: Read> fmt::Debug for Buffer<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Buffer {{ consumed_total: {}, .. }}", self.consumed_total)
    }
}

impl<R: Read> Buffer<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            reader,
            buf: vec![0; START_BUFFER_SIZE],
            start: 0,
            end: 0,
            consumed_total: 0,
        }
    }

    // =======================================================================
    // ===== Internal methods
    // =======================================================================

    fn len(&self) -> usize {
        self.end - self.start
    }

    fn cap(&self) -> usize {
        self.buf.len()
    }

    fn data(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }

    fn consume(&mut self, num_bytes: usize) {
        assert!(self.start + num_bytes <= self.end);

        self.start += num_bytes;
        self.consumed_total += num_bytes;

        // If we consumed all the data, we set both indices to 0.
        if self.start == self.end {
            self.start = 0;
            self.end = 0;
        }
    }

    /// Makes sure there is space for at least `additional` more bytes after
    /// `self.end`, either by moving the data to the front or by growing the
    /// buffer.
    #[inline(never)]
    fn grow_buf(&mut self, additional: usize) -> Result<(), io::Error> {
        let space_after = self.cap() - self.end;
        let space_before = self.start;

        if space_after >= additional {
            return Ok(());
        }

        // Moving the data to the beginning only makes sense if that creates
        // enough room. But if the data is half as big as the buffer or
        // bigger, we grow instead: with alternating small and large requests
        // we would otherwise copy large amounts of data again and again.
        if space_after + space_before >= additional && self.len() < self.cap() / 2 {
            self.buf.copy_within(self.start..self.end, 0);
        } else {
            // The new buffer size will be at least our current length +
            // `additional`, but no less than twice the current buffer size
            // (otherwise, reallocations might be too frequent).
            let required = self.len() + additional;
            let new_len = min(max(required, self.cap() * 2), MAX_BUFFER_SIZE);
            if new_len < required {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "line or value at offset {} is longer than {} bytes",
                        self.consumed_total,
                        MAX_BUFFER_SIZE,
                    ),
                ));
            }

            // Allocating the new buffer anyway, so we move our data to its
            // beginning while copying.
            let mut new = Vec::with_capacity(new_len);
            new.extend_from_slice(self.data());
            new.resize(new_len, 0);
            self.buf = new;
        }

        // In both cases, the data starts at the very beginning now.
        self.end -= self.start;
        self.start = 0;

        Ok(())
    }

    /// Performs a single successful read into the free space after
    /// `self.end` (making sure there is some). Returns the number of bytes
    /// read; 0 means the reader is exhausted.
    fn read_some(&mut self) -> Result<usize, io::Error> {
        self.grow_buf(1)?;
        loop {
            match self.reader.read(&mut self.buf[self.end..]) {
                Ok(n) => {
                    self.end += n;
                    return Ok(n);
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }

    /// Reads until at least `additional` new bytes are in the buffer or the
    /// reader is exhausted. Returns the number of bytes read.
    fn fill_buf_by(&mut self, additional: usize) -> Result<usize, io::Error> {
        self.grow_buf(additional)?;

        let mut bytes_read = 0;
        while bytes_read < additional {
            match self.read_some()? {
                0 => break,
                n => bytes_read += n,
            }
        }

        Ok(bytes_read)
    }
}

impl<R: Read> Input for Buffer<R> {
    fn take_line<F, O, E>(&mut self, func: F) -> Result<Option<O>, E>
    where
        F: FnOnce(&[u8]) -> Result<O, E>,
        E: From<io::Error>,
    {
        // Everything before `searched` is known to not contain a linebreak.
        let mut searched = 0;
        loop {
            if let Some(pos) = self.data()[searched..].iter().position(|&b| b == b'\n') {
                let line_len = searched + pos;
                let out = func(&self.data()[..line_len])?;
                self.consume(line_len + 1);
                return Ok(Some(out));
            }

            searched = self.len();
            if self.read_some()? == 0 {
                // The last line doesn't need a linebreak.
                if self.len() == 0 {
                    return Ok(None);
                }

                let line_len = self.len();
                let out = func(self.data())?;
                self.consume(line_len);
                return Ok(Some(out));
            }
        }
    }

    fn take_bytes<F, O, E>(&mut self, num_bytes: usize, func: F) -> Result<Option<O>, E>
    where
        F: FnOnce(&[u8]) -> Result<O, E>,
        E: From<io::Error>,
    {
        if self.len() < num_bytes {
            let diff = num_bytes - self.len();
            if self.fill_buf_by(diff)? < diff {
                self.consume(self.len());
                return Ok(None);
            }
        }

        let out = func(&self.data()[..num_bytes])?;
        self.consume(num_bytes);
        Ok(Some(out))
    }

    fn offset(&self) -> usize {
        self.consumed_total
    }
}


#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use super::*;

    /// A reader that returns at most one byte per `read` call.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match (self.0.split_first(), buf.first_mut()) {
                (Some((&b, rest)), Some(out)) => {
                    *out = b;
                    self.0 = rest;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    fn line(input: &mut impl Input) -> Option<String> {
        input.take_line(|l| -> Result<_, io::Error> {
            Ok(String::from_utf8_lossy(l).into_owned())
        }).unwrap()
    }

    fn bytes(input: &mut impl Input, n: usize) -> Option<Vec<u8>> {
        input.take_bytes(n, |b| -> Result<_, io::Error> { Ok(b.to_vec()) }).unwrap()
    }

    #[test]
    fn lines() {
        let data = b"ply\nformat\r\n\nlast";
        let mut buf = Buffer::new(Trickle(data));
        assert_eq!(line(&mut buf).as_deref(), Some("ply"));
        assert_eq!(line(&mut buf).as_deref(), Some("format\r"));
        assert_eq!(line(&mut buf).as_deref(), Some(""));
        assert_eq!(line(&mut buf).as_deref(), Some("last"));
        assert_eq!(line(&mut buf), None);
        assert_eq!(buf.offset(), data.len());
    }

    #[test]
    fn line_then_bytes() {
        let mut buf = Buffer::new(Cursor::new(b"end_header\n\x01\x02\x03".to_vec()));
        assert_eq!(line(&mut buf).as_deref(), Some("end_header"));
        assert_eq!(bytes(&mut buf, 2), Some(vec![1, 2]));
        assert_eq!(buf.offset(), 13);
        assert_eq!(bytes(&mut buf, 2), None);
        assert_eq!(bytes(&mut buf, 1), None);
    }

    #[test]
    fn long_line_grows_buffer() {
        let mut data = vec![b'a'; 3 * START_BUFFER_SIZE];
        data.extend_from_slice(b"\nb");

        let mut buf = Buffer::new(Trickle(&data));
        assert_eq!(line(&mut buf).map(|l| l.len()), Some(3 * START_BUFFER_SIZE));
        assert_eq!(line(&mut buf).as_deref(), Some("b"));
    }

    #[test]
    fn line_too_long() {
        let data = vec![b'a'; MAX_BUFFER_SIZE + 1];
        let mut buf = Buffer::new(Cursor::new(data));
        let res = buf.take_line(|_| -> Result<(), io::Error> { Ok(()) });
        assert_eq!(res.unwrap_err().kind(), io::ErrorKind::InvalidData);
    }
}
