//! Reading PLY (polygon file format) files.
//!
//! A PLY file starts with a textual header declaring *elements* (e.g.
//! `vertex` and `face`), each with a number of rows and a list of typed
//! *properties*. The header is followed by the data section in one of three
//! encodings: ASCII, binary little endian or binary big endian.
//!
//! ```
//! let file = b"\
//!     ply\n\
//!     format ascii 1.0\n\
//!     element vertex 2\n\
//!     property float32 x\n\
//!     property float32 y\n\
//!     property list uint8 int32 indices\n\
//!     end_header\n\
//!     1.0 2.0 2 10 20\n\
//!     3.0 4.0 0\n";
//!
//! let schema = ply_reader::read(&file[..])?;
//! assert_eq!(schema.get::<f32>("vertex", "y", 0), Some(2.0));
//! assert_eq!(schema.get_list::<i32>("vertex", "indices", 0), Some(&[10, 20][..]));
//! assert_eq!(schema.list("vertex", "indices", 1).map(|l| l.len()), Some(0));
//! # Ok::<(), ply_reader::Error>(())
//! ```
//!
//! All values are stored in typed columns ([`PropertyData`]), independent of
//! the encoding they were read from.

#[cfg(test)]
#[macro_use]
mod test_utils;

mod codec;
mod error;
mod header;
mod parse;
mod read;
mod schema;
mod types;
mod value;


pub use self::{
    error::{Error, Position},
    read::{read, Reader},
    schema::{ElementDef, Encoding, PropIndex, PropVec, PropertyDef, PropertyType, Schema},
    types::{Primitive, ScalarLen, ScalarType, ScalarTypeParseError, ALL_SCALAR_TYPES},
    value::{Column, List, PropertyData, Scalar},
};
