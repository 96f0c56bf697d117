//! Parsing of the PLY header.
//!
//! The header is a sequence of lines, each starting with a keyword:
//!
//! ```text
//! ply
//! format ascii 1.0
//! comment made by hand
//! obj_info num_cols 4
//! element vertex 8
//! property float x
//! property list uchar int vertex_index
//! end_header
//! ```
//!
//! Lines are split into whitespace separated tokens, each of which is
//! classified as number or identifier. Only the classification, not the
//! value, is interesting here: values are decoded later by the data reader.

use log::debug;
use smallvec::SmallVec;

use crate::{
    error::Error,
    parse::{debug_fmt_bytes, trim_line, Input},
    schema::{ElementDef, Encoding, PropertyDef, PropertyType, Schema},
    types::ScalarType,
};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    /// Optionally signed decimal number, optionally with a decimal point:
    /// `3`, `-12`, `1.0`, `.5`.
    Number,

    /// Everything else.
    Ident,
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    text: &'a str,
    kind: TokenKind,
}

impl<'a> Token<'a> {
    fn classify(text: &'a str) -> Self {
        let digits = text.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(text);
        let mut parts = digits.splitn(2, '.');
        let int_part = parts.next().unwrap_or("");
        let frac_part = parts.next();

        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        let is_number = all_digits(int_part)
            && frac_part.map_or(true, all_digits)
            && (!int_part.is_empty() || frac_part.map_or(false, |f| !f.is_empty()));

        let kind = if is_number { TokenKind::Number } else { TokenKind::Ident };
        Self { text, kind }
    }

    fn is_number(&self) -> bool {
        self.kind == TokenKind::Number
    }
}

type Tokens<'a> = SmallVec<[Token<'a>; 8]>;

fn tokenize(line: &str) -> Tokens<'_> {
    line.split_ascii_whitespace().map(Token::classify).collect()
}

/// Reads the next header line, trimmed. Returns `None` at the end of input.
fn next_line(input: &mut impl Input) -> Result<Option<Vec<u8>>, Error> {
    input.take_line(|line| Ok(trim_line(line).to_vec()))
}

fn malformed(line: usize, msg: impl Into<String>) -> Error {
    Error::MalformedHeader { line, msg: msg.into() }
}

fn resolve_type(line: usize, name: &str) -> Result<ScalarType, Error> {
    ScalarType::resolve(name).map_err(|e| Error::UnknownType {
        line,
        name: e.name().to_string(),
    })
}

/// Parses the header from `input`, leaving `input` at the first byte of the
/// data section.
pub(crate) fn parse_header(input: &mut impl Input) -> Result<Schema, Error> {
    // ===== Magic number ====================================================
    if !parse_magic(input)? {
        return Err(Error::UnterminatedHeader { line: 2 });
    }


    // ===== Format line =====================================================
    let mut line_no = 2;
    let line = next_line(input)?.ok_or(Error::UnterminatedHeader { line: line_no })?;
    let line = std::str::from_utf8(&line)
        .map_err(|_| malformed(line_no, format!("invalid UTF-8: {}", debug_fmt_bytes(&line))))?;
    let mut schema = parse_format(line_no, line)?;


    // ===== Elements, properties, comments and obj_info =====================
    loop {
        line_no += 1;
        let line = next_line(input)?.ok_or(Error::UnterminatedHeader { line: line_no })?;
        let line = std::str::from_utf8(&line).map_err(|_| {
            malformed(line_no, format!("invalid UTF-8: {}", debug_fmt_bytes(&line)))
        })?;

        let tokens = tokenize(line);
        let keyword = match tokens.first() {
            Some(t) if !t.is_number() => t.text,
            _ => return Err(Error::UnterminatedHeader { line: line_no }),
        };

        match keyword {
            "end_header" if tokens.len() == 1 => break,
            "comment" => {}
            "obj_info" => {
                let (key, value) = parse_obj_info(line_no, line)?;
                schema.obj_info.insert(key, value);
            }
            "element" => schema.elements.push(parse_element(line_no, &tokens)?),
            "property" => {
                let elem = schema.elements.last_mut()
                    .ok_or(Error::NoCurrentElement { line: line_no })?;
                elem.property_defs.push(parse_property(line_no, &tokens)?);
            }
            _ => return Err(Error::UnterminatedHeader { line: line_no }),
        }
    }

    debug!(
        "parsed PLY header: {:?}, {} elements ({} header lines)",
        schema.encoding,
        schema.elements.len(),
        line_no,
    );

    Ok(schema)
}

/// Checks that the input starts with the line `ply`. Reads byte by byte and
/// never buffers a whole line. Returns `false` if the input ends right after
/// the magic number.
fn parse_magic(input: &mut impl Input) -> Result<bool, Error> {
    let magic = input.take_bytes(3, |b| Ok::<_, Error>(b == b"ply"))?;
    if magic != Some(true) {
        return Err(Error::NotAPlyFile);
    }

    // Trailing whitespace (including the `\r` of `\r\n`) is allowed.
    loop {
        match input.take_bytes(1, |b| Ok::<_, Error>(b[0]))? {
            None => return Ok(false),
            Some(b'\n') => return Ok(true),
            Some(b) if b.is_ascii_whitespace() => {}
            Some(_) => return Err(Error::NotAPlyFile),
        }
    }
}

/// `format <encoding> <version>`
fn parse_format(line_no: usize, line: &str) -> Result<Schema, Error> {
    let tokens = tokenize(line);
    match &*tokens {
        [kw, enc, version] if kw.text == "format" => {
            let encoding = Encoding::from_ply_name(enc.text).ok_or_else(|| malformed(
                line_no,
                format!(
                    "expected 'ascii', 'binary_little_endian' or 'binary_big_endian', \
                        found '{}'",
                    enc.text,
                ),
            ))?;

            if !version.is_number() {
                return Err(malformed(line_no, format!("invalid version '{}'", version.text)));
            }

            Ok(Schema::new(encoding, version.text))
        }
        _ => Err(malformed(line_no, "expected 'format <encoding> <version>'")),
    }
}

/// `element <name> <count>`
fn parse_element(line_no: usize, tokens: &[Token<'_>]) -> Result<ElementDef, Error> {
    match tokens {
        [_, name, count] => {
            let count = if count.is_number() { count.text.parse::<u64>().ok() } else { None };
            let count = count.ok_or_else(|| malformed(
                line_no,
                format!("invalid element count '{}'", tokens[2].text),
            ))?;

            Ok(ElementDef::new(name.text, count))
        }
        _ => Err(malformed(line_no, "expected 'element <name> <count>'")),
    }
}

/// `property <type> <name>` or `property list <len-type> <type> <name>`
fn parse_property(line_no: usize, tokens: &[Token<'_>]) -> Result<PropertyDef, Error> {
    match tokens {
        [_, list, len_type, scalar_type, name] if list.text == "list" => {
            let ty = PropertyType::List {
                len_type: resolve_type(line_no, len_type.text)?,
                scalar_type: resolve_type(line_no, scalar_type.text)?,
            };
            Ok(PropertyDef::new(name.text, ty))
        }
        [_, list, ..] if list.text == "list" => {
            Err(malformed(line_no, "expected 'property list <len-type> <type> <name>'"))
        }
        [_, ty, name] => {
            let ty = PropertyType::Scalar(resolve_type(line_no, ty.text)?);
            Ok(PropertyDef::new(name.text, ty))
        }
        _ => Err(malformed(line_no, "expected 'property <type> <name>'")),
    }
}

/// `obj_info <key> <value...>`: the value is the rest of the line.
fn parse_obj_info(line_no: usize, line: &str) -> Result<(String, String), Error> {
    let rest = line["obj_info".len()..].trim_start();
    if rest.is_empty() {
        return Err(malformed(line_no, "expected 'obj_info <key> <value>'"));
    }

    let (key, value) = match rest.find(|c: char| c.is_ascii_whitespace()) {
        Some(pos) => (&rest[..pos], rest[pos..].trim()),
        None => (rest, ""),
    };

    Ok((key.to_string(), value.to_string()))
}
