//! Reading a PLY file: the header first, then the data section.

use std::io;

#[cfg(feature = "fs")]
use std::{fs::File, path::Path};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::{debug, trace};

use crate::{
    codec::{AsciiRow, BinarySource, DecodeError},
    error::{Error, Position},
    header::parse_header,
    parse::{buf::Buffer, Input},
    schema::{ElementDef, Encoding, Schema},
    value::PropertyData,
};


/// A reader for PLY files.
///
/// Creating a reader parses the header, which is then available via
/// [`Reader::schema`]. The data section is read by [`Reader::read`] or
/// [`Reader::read_into`].
///
/// ```no_run
/// use ply_reader::Reader;
///
/// # fn main() -> Result<(), ply_reader::Error> {
/// let schema = Reader::open("bunny.ply")?.read()?;
/// let x = schema.get::<f32>("vertex", "x", 0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Reader<R: io::Read> {
    buf: Buffer<R>,
    schema: Schema,
}

#[cfg(feature = "fs")]
impl Reader<File> {
    /// Tries to open the file specified by the given path and creates a new
    /// `Reader` from that file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        // We don't need a `BufReader` here, because we will use our internal
        // parse buffer anyway.
        Self::new(File::open(path)?)
    }
}

impl<R: io::Read> Reader<R> {
    /// Creates a new `Reader` from the given `io::Read` instance and parses
    /// the header of the given input.
    ///
    /// If you want to open a file, rather use [`Reader::open`].
    pub fn new(reader: R) -> Result<Self, Error> {
        let mut buf = Buffer::new(reader);
        let schema = parse_header(&mut buf)?;

        Ok(Self { buf, schema })
    }

    /// The schema declared by the header. Does not contain any values yet.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The encoding of the data section, as declared by the `format` line.
    pub fn encoding(&self) -> Encoding {
        self.schema.encoding
    }

    /// Reads the data section and returns the schema with all property values
    /// filled in.
    pub fn read(self) -> Result<Schema, Error> {
        let Self { mut buf, mut schema } = self;
        let data = read_body(&mut buf, &schema)?;
        commit(&mut schema, data);

        Ok(schema)
    }

    /// Reads the data section into the property stores of `schema`, which
    /// must declare exactly the same elements and properties (with the same
    /// encoding) as the header. Values previously stored in `schema` are
    /// replaced.
    ///
    /// On error, `schema` is left unchanged.
    pub fn read_into(self, schema: &mut Schema) -> Result<(), Error> {
        if !schema.same_layout(&self.schema) {
            let element = self.schema.elements.iter()
                .zip(&schema.elements)
                .find(|(a, b)| !a.same_layout(b))
                .map(|(a, _)| a.name.clone())
                .unwrap_or_default();

            return Err(Error::SchemaMismatch {
                pos: Position { element, row: 0, property: None },
                msg: "target schema does not declare the same elements and properties \
                    as the header".into(),
            });
        }

        let Self { mut buf, schema: header } = self;
        let data = read_body(&mut buf, &header)?;
        commit(schema, data);

        Ok(())
    }
}

/// Reads a whole PLY file (header and data section) from `reader`.
pub fn read(reader: impl io::Read) -> Result<Schema, Error> {
    Reader::new(reader)?.read()
}

/// Moves the decoded stores into the property definitions of `schema`.
fn commit(schema: &mut Schema, data: Vec<Vec<PropertyData>>) {
    for (elem, elem_data) in schema.elements.iter_mut().zip(data) {
        for (prop, prop_data) in elem.property_defs.iter_mut().zip(elem_data) {
            prop.data = prop_data;
        }
    }
}


// ===========================================================================
// ===== Data section
// ===========================================================================

/// Decodes all rows of all elements declared in `schema`. The result holds
/// one store per property, grouped by element, in declaration order.
fn read_body(
    input: &mut impl Input,
    schema: &Schema,
) -> Result<Vec<Vec<PropertyData>>, Error> {
    let start = input.offset();
    let mut out = Vec::with_capacity(schema.elements.len());

    for elem in &schema.elements {
        trace!("reading {} rows of element '{}'", elem.count, elem.name);

        let mut data = elem.property_defs.iter()
            .map(|def| PropertyData::new(def.ty))
            .collect::<Vec<_>>();

        // Rows without properties occupy no bytes and no lines.
        if elem.property_defs.is_empty() {
            out.push(data);
            continue;
        }

        match schema.encoding {
            Encoding::Ascii => read_ascii_rows(input, elem, &mut data)?,
            Encoding::BinaryBigEndian => read_binary_rows::<BigEndian, _>(input, elem, &mut data)?,
            Encoding::BinaryLittleEndian => {
                read_binary_rows::<LittleEndian, _>(input, elem, &mut data)?
            }
        }

        out.push(data);
    }

    debug!(
        "read PLY data section: {} elements, {} bytes",
        schema.elements.len(),
        input.offset() - start,
    );

    Ok(out)
}

/// Reads `elem.count` lines, one row each. Lines containing only whitespace
/// are skipped and do not count as a row.
fn read_ascii_rows(
    input: &mut impl Input,
    elem: &ElementDef,
    data: &mut [PropertyData],
) -> Result<(), Error> {
    let mut row = 0;
    while row < elem.count {
        let was_row = input.take_line(|line| -> Result<bool, Error> {
            // Invalid UTF-8 ends up in a token that fails to parse.
            let line = String::from_utf8_lossy(line);
            if line.trim().is_empty() {
                return Ok(false);
            }

            decode_ascii_row(&line, elem, row, &mut *data)?;
            Ok(true)
        })?;

        match was_row {
            Some(true) => row += 1,
            Some(false) => {}
            None => return Err(Error::TruncatedData { pos: position(elem, row, None) }),
        }
    }

    Ok(())
}

fn decode_ascii_row(
    line: &str,
    elem: &ElementDef,
    row: u64,
    data: &mut [PropertyData],
) -> Result<(), Error> {
    let mut src = AsciiRow::new(line);
    for (def, store) in elem.property_defs.iter().zip(data.iter_mut()) {
        store.decode_row(&mut src, def.ty)
            .map_err(|e| positioned(e, position(elem, row, Some(&def.name))))?;
    }

    if let Some(token) = src.next_unused() {
        return Err(Error::SchemaMismatch {
            pos: position(elem, row, None),
            msg: format!("unexpected value '{}' after the last property", token),
        });
    }

    Ok(())
}

/// Reads `elem.count` rows of tightly packed values in byte order `B`.
fn read_binary_rows<B: ByteOrder, I: Input>(
    input: &mut I,
    elem: &ElementDef,
    data: &mut [PropertyData],
) -> Result<(), Error> {
    let mut src = BinarySource::<I, B>::new(input);
    for row in 0..elem.count {
        for (def, store) in elem.property_defs.iter().zip(data.iter_mut()) {
            store.decode_row(&mut src, def.ty)
                .map_err(|e| positioned(e, position(elem, row, Some(&def.name))))?;
        }
    }

    Ok(())
}

fn position(elem: &ElementDef, row: u64, property: Option<&str>) -> Position {
    Position {
        element: elem.name.clone(),
        row,
        property: property.map(|p| p.to_string()),
    }
}

/// Attaches the position to a decode error.
fn positioned(err: DecodeError, pos: Position) -> Error {
    match err {
        DecodeError::Parse { token, ty, msg } => Error::ValueParse { pos, ty, token, msg },
        DecodeError::InvalidListLen { value, ty } => Error::ValueParse {
            pos,
            ty,
            token: value,
            msg: "list length has to be a non-negative integer".into(),
        },
        DecodeError::MissingToken => Error::SchemaMismatch {
            pos,
            msg: "row has fewer values than the header declares".into(),
        },
        DecodeError::Truncated => Error::TruncatedData { pos },
        DecodeError::Io(e) => Error::Io(e),
    }
}


#[cfg(test)]
mod tests;
