//! Helpers for tests. Only compiled in test mode.

use crate::{
    error::Error,
    schema::Schema,
};


/// Returns a `Cursor` over the given file in `src/test_files/`.
macro_rules! include_test_file {
    ($filename:expr) => {{
        let bytes = include_bytes!(concat!("test_files/", $filename)) as &[u8];
        std::io::Cursor::new(bytes)
    }}
}

/// Reads a whole PLY file from a string.
pub(crate) fn read_str(src: &str) -> Result<Schema, Error> {
    crate::read(src.as_bytes())
}

/// Like `read_str`, but for files with binary data: `header` is followed by
/// the raw bytes of `body`.
pub(crate) fn read_with_body(header: &str, body: &[u8]) -> Result<Schema, Error> {
    let mut data = header.as_bytes().to_vec();
    data.extend_from_slice(body);
    crate::read(&data[..])
}
