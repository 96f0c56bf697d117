use std::{fmt, io};

use failure::Fail;

use crate::types::ScalarType;


/// Everything that can go wrong while reading a PLY file.
///
/// Header errors carry the (1-based) number of the offending header line,
/// data errors the [`Position`] of the value that could not be decoded.
/// Every error is terminal: no partially read data is ever returned.
#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "IO error: {}", _0)]
    Io(#[cause] io::Error),

    /// The first line is not `ply`.
    #[fail(display = "not a PLY file (first line is not 'ply')")]
    NotAPlyFile,

    #[fail(display = "malformed header line {}: {}", line, msg)]
    MalformedHeader {
        line: usize,
        msg: String,
    },

    #[fail(display = "unknown type '{}' in header line {}", name, line)]
    UnknownType {
        line: usize,
        name: String,
    },

    /// A `property` line appeared before the first `element` line.
    #[fail(display = "property without element in header line {}", line)]
    NoCurrentElement {
        line: usize,
    },

    /// The header contains a line that is not part of the grammar, or the
    /// input ended before `end_header`. In the latter case, `line` is the
    /// number of the line that would have followed.
    #[fail(display = "header not terminated by 'end_header' (line {})", line)]
    UnterminatedHeader {
        line: usize,
    },

    #[fail(display = "invalid {} value '{}' at {}: {}", ty, token, pos, msg)]
    ValueParse {
        pos: Position,
        ty: ScalarType,
        token: String,
        msg: String,
    },

    #[fail(display = "unexpected end of data at {}", pos)]
    TruncatedData {
        pos: Position,
    },

    #[fail(display = "data does not match the header at {}: {}", pos, msg)]
    SchemaMismatch {
        pos: Position,
        msg: String,
    },
}

impl From<io::Error> for Error {
    fn from(src: io::Error) -> Self {
        Error::Io(src)
    }
}

impl Error {
    /// Returns the header line number for header errors.
    pub fn line(&self) -> Option<usize> {
        match *self {
            Error::MalformedHeader { line, .. }
            | Error::UnknownType { line, .. }
            | Error::NoCurrentElement { line }
            | Error::UnterminatedHeader { line } => Some(line),
            _ => None,
        }
    }

    /// Returns the data position for data section errors.
    pub fn position(&self) -> Option<&Position> {
        match self {
            Error::ValueParse { pos, .. }
            | Error::TruncatedData { pos }
            | Error::SchemaMismatch { pos, .. } => Some(pos),
            _ => None,
        }
    }
}

/// Where in the data section an error occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    /// Name of the element.
    pub element: String,

    /// Zero-based row within the element.
    pub row: u64,

    /// Name of the property. `None` if the error is not about a single
    /// property (e.g. leftover tokens after the last one).
    pub property: Option<String>,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "element '{}', row {}", self.element, self.row)?;
        if let Some(prop) = &self.property {
            write!(f, ", property '{}'", prop)?;
        }
        Ok(())
    }
}
