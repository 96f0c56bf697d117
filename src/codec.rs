//! Decoding of single values from the three data section encodings.
//!
//! The data reader only ever asks for "the next value of type `T`"; how that
//! value is obtained is decided by the [`ValueSource`] implementation:
//!
//! - [`AsciiRow`] parses whitespace separated tokens of one line,
//! - [`BinarySource`] reads fixed width values in byte order `B`.

use std::{
    io,
    marker::PhantomData,
    str::SplitAsciiWhitespace,
};

use byteorder::ByteOrder;

use crate::{
    parse::Input,
    types::{Primitive, ScalarType},
};


/// Why a single value could not be decoded. Turned into a positioned
/// [`Error`][crate::Error] by the data reader.
#[derive(Debug)]
pub(crate) enum DecodeError {
    /// The ASCII token is not a valid literal of the expected type.
    Parse {
        token: String,
        ty: ScalarType,
        msg: String,
    },

    /// A list length value is negative or not integral.
    InvalidListLen {
        value: String,
        ty: ScalarType,
    },

    /// The ASCII row has no more tokens.
    MissingToken,

    /// The binary input ended in the middle of a value.
    Truncated,

    Io(io::Error),
}

impl From<io::Error> for DecodeError {
    fn from(src: io::Error) -> Self {
        DecodeError::Io(src)
    }
}

/// Something values can be read from, one at a time.
pub(crate) trait ValueSource {
    fn read<T: Primitive>(&mut self) -> Result<T, DecodeError>;
}


// ===========================================================================
// ===== ASCII
// ===========================================================================

/// The tokens of one line of an ASCII data section.
pub(crate) struct AsciiRow<'a> {
    tokens: SplitAsciiWhitespace<'a>,
}

impl<'a> AsciiRow<'a> {
    pub(crate) fn new(line: &'a str) -> Self {
        Self {
            tokens: line.split_ascii_whitespace(),
        }
    }

    /// Returns the first token that was not consumed, if any.
    pub(crate) fn next_unused(&mut self) -> Option<&'a str> {
        self.tokens.next()
    }
}

impl ValueSource for AsciiRow<'_> {
    fn read<T: Primitive>(&mut self) -> Result<T, DecodeError> {
        let token = self.tokens.next().ok_or(DecodeError::MissingToken)?;
        T::parse_ascii(token).map_err(|msg| DecodeError::Parse {
            token: token.to_string(),
            ty: T::TY,
            msg,
        })
    }
}


// ===========================================================================
// ===== Binary
// ===========================================================================

/// Reads raw, tightly packed values in byte order `B` from an [`Input`].
pub(crate) struct BinarySource<'a, I, B> {
    input: &'a mut I,
    _order: PhantomData<B>,
}

impl<'a, I: Input, B: ByteOrder> BinarySource<'a, I, B> {
    pub(crate) fn new(input: &'a mut I) -> Self {
        Self {
            input,
            _order: PhantomData,
        }
    }
}

impl<I: Input, B: ByteOrder> ValueSource for BinarySource<'_, I, B> {
    fn read<T: Primitive>(&mut self) -> Result<T, DecodeError> {
        let len = T::TY.len().as_usize();
        self.input
            .take_bytes(len, |buf| Ok::<_, DecodeError>(T::read_bytes::<B>(buf)))?
            .ok_or(DecodeError::Truncated)
    }
}


#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use byteorder::{BigEndian, LittleEndian};
    use crate::{
        parse::buf::Buffer,
        value::{read_scalar, Scalar},
    };
    use super::*;

    #[test]
    fn ascii_tokens() {
        let mut row = AsciiRow::new("  1.5\t-3  0x10 ");
        assert_eq!(row.read::<f32>().unwrap(), 1.5);
        assert_eq!(row.read::<i16>().unwrap(), -3);
        assert_eq!(row.read::<u8>().unwrap(), 16);
        assert!(matches!(row.read::<u8>(), Err(DecodeError::MissingToken)));
    }

    #[test]
    fn ascii_invalid_token() {
        let mut row = AsciiRow::new("300 7");
        match row.read::<u8>() {
            Err(DecodeError::Parse { token, ty, .. }) => {
                assert_eq!(token, "300");
                assert_eq!(ty, ScalarType::UInt8);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(row.next_unused(), Some("7"));
    }

    #[test]
    fn binary_endianness() {
        let data: [u8; 4] = [0x01, 0x00, 0x00, 0x00];

        let mut le = Buffer::new(Cursor::new(data));
        let mut le = BinarySource::<_, LittleEndian>::new(&mut le);
        assert_eq!(read_scalar(&mut le, ScalarType::Int32).unwrap(), Scalar::Int32(1));

        let mut be = Buffer::new(Cursor::new(data));
        let mut be = BinarySource::<_, BigEndian>::new(&mut be);
        assert_eq!(read_scalar(&mut be, ScalarType::Int32).unwrap(), Scalar::Int32(16_777_216));
    }

    #[test]
    fn binary_packed_values() {
        let data: [u8; 6] = [0xff, 0x00, 0x01, 0x00, 0x80, 0x3f];
        let mut buf = Buffer::new(Cursor::new(data));
        let mut src = BinarySource::<_, LittleEndian>::new(&mut buf);

        assert_eq!(src.read::<i8>().unwrap(), -1);
        assert_eq!(src.read::<u16>().unwrap(), 256);
        assert!(matches!(src.read::<f32>(), Err(DecodeError::Truncated)));
    }
}
