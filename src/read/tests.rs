use crate::{
    test_utils::{read_str, read_with_body},
    types::ScalarType,
    value::Scalar,
};
use super::*;


const VERTEX_HEADER: &str = "\
    ply\n\
    format ascii 1.0\n\
    element vertex 2\n\
    property float32 x\n\
    property float32 y\n\
    property list uint8 int32 indices\n\
    end_header\n";

fn pos_of(err: &Error) -> (String, u64, Option<String>) {
    let pos = err.position().expect("error without position");
    (pos.element.clone(), pos.row, pos.property.clone())
}

#[test]
fn ascii_rows_with_lists() -> Result<(), Error> {
    let schema = read_str(&format!("{}1.0 2.0 2 10 20\n3.0 4.0 0\n", VERTEX_HEADER))?;

    assert_eq!(schema.get::<f32>("vertex", "x", 0), Some(1.0));
    assert_eq!(schema.get::<f32>("vertex", "y", 0), Some(2.0));
    assert_eq!(schema.get_list::<i32>("vertex", "indices", 0), Some(&[10, 20][..]));
    assert_eq!(schema.get::<f32>("vertex", "x", 1), Some(3.0));
    assert_eq!(schema.get::<f32>("vertex", "y", 1), Some(4.0));
    assert_eq!(schema.get_list::<i32>("vertex", "indices", 1), Some(&[][..]));

    let indices = schema.property_data("vertex", "indices").unwrap();
    assert_eq!(indices.rows(), 2);
    assert_eq!(indices.column().len(), 2);
    assert_eq!(schema.scalar("vertex", "x", 2), None);

    Ok(())
}

#[test]
fn missing_list_count() {
    let err = read_str(&format!("{}1.0 2.0\n3.0 4.0 0\n", VERTEX_HEADER)).unwrap_err();
    assert!(matches!(err, Error::SchemaMismatch { .. }), "{:?}", err);
    assert_eq!(pos_of(&err), ("vertex".into(), 0, Some("indices".into())));
}

#[test]
fn leftover_tokens() {
    let err = read_str(&format!("{}1.0 2.0 0 5\n3.0 4.0 0\n", VERTEX_HEADER)).unwrap_err();
    assert!(matches!(err, Error::SchemaMismatch { .. }), "{:?}", err);
    assert_eq!(pos_of(&err), ("vertex".into(), 0, None));
}

#[test]
fn blank_lines_are_skipped() -> Result<(), Error> {
    let schema = read_str(&format!("{}\n1.0 2.0 0\n  \t\r\n\n3.0 4.0 1 7\n", VERTEX_HEADER))?;
    assert_eq!(schema.get::<f32>("vertex", "x", 1), Some(3.0));
    assert_eq!(schema.get_list::<i32>("vertex", "indices", 1), Some(&[7][..]));
    Ok(())
}

#[test]
fn crlf_rows() -> Result<(), Error> {
    let schema = read_str(&format!("{}1.0 2.0 0\r\n3.0 4.0 0\r\n", VERTEX_HEADER))?;
    assert_eq!(schema.get::<f32>("vertex", "y", 1), Some(4.0));
    Ok(())
}

#[test]
fn ascii_truncated() {
    let err = read_str(&format!("{}1.0 2.0 0\n\n", VERTEX_HEADER)).unwrap_err();
    assert!(matches!(err, Error::TruncatedData { .. }), "{:?}", err);
    assert_eq!(pos_of(&err), ("vertex".into(), 1, None));
}

#[test]
fn ascii_invalid_value() {
    let err = read_str(&format!("{}1.0 2.0 0\n3.0 four 0\n", VERTEX_HEADER)).unwrap_err();
    match &err {
        Error::ValueParse { ty, token, .. } => {
            assert_eq!(*ty, ScalarType::Float32);
            assert_eq!(token, "four");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(pos_of(&err), ("vertex".into(), 1, Some("y".into())));
}

#[test]
fn ascii_out_of_range() {
    let src = "ply\nformat ascii 1.0\nelement v 1\nproperty uchar a\nend_header\n256\n";
    let err = read_str(src).unwrap_err();
    assert!(matches!(err, Error::ValueParse { ty: ScalarType::UInt8, .. }), "{:?}", err);
}

#[test]
fn list_count_types() -> Result<(), Error> {
    let src = "ply\nformat ascii 1.0\n\
        element v 2\n\
        property list float uint8 a\n\
        property list int short b\n\
        end_header\n\
        2.0 1 2 1 -5\n\
        0 0\n";
    let schema = read_str(src)?;
    assert_eq!(schema.get_list::<u8>("v", "a", 0), Some(&[1, 2][..]));
    assert_eq!(schema.get_list::<i16>("v", "b", 0), Some(&[-5][..]));
    assert_eq!(schema.list("v", "a", 1).map(|l| l.len()), Some(0));

    for bad in &["-1", "1.5"] {
        let src = format!(
            "ply\nformat ascii 1.0\nelement v 1\nproperty list float uint8 a\nend_header\n{} 1\n",
            bad,
        );
        let err = read_str(&src).unwrap_err();
        assert!(matches!(err, Error::ValueParse { ty: ScalarType::Float32, .. }), "{:?}", err);
    }

    Ok(())
}

#[test]
fn binary_byte_orders() -> Result<(), Error> {
    let header = |enc: &str| format!(
        "ply\nformat {} 1.0\nelement v 1\nproperty int a\nproperty list uchar ushort l\nend_header\n",
        enc,
    );
    let body = [0x01, 0x00, 0x00, 0x00, 0x02, 0x01, 0x00, 0x00, 0x02];

    let le = read_with_body(&header("binary_little_endian"), &body)?;
    assert_eq!(le.get::<i32>("v", "a", 0), Some(1));
    assert_eq!(le.get_list::<u16>("v", "l", 0), Some(&[1, 512][..]));

    let be = read_with_body(&header("binary_big_endian"), &body)?;
    assert_eq!(be.get::<i32>("v", "a", 0), Some(16_777_216));
    assert_eq!(be.get_list::<u16>("v", "l", 0), Some(&[256, 2][..]));

    Ok(())
}

#[test]
fn binary_empty_list_consumes_only_count() -> Result<(), Error> {
    let header = "ply\nformat binary_little_endian 1.0\n\
        element v 2\nproperty list uchar int l\nproperty uchar b\nend_header\n";
    let schema = read_with_body(header, &[0, 9, 1, 4, 0, 0, 0, 8])?;

    assert_eq!(schema.get_list::<i32>("v", "l", 0), Some(&[][..]));
    assert_eq!(schema.get::<u8>("v", "b", 0), Some(9));
    assert_eq!(schema.get_list::<i32>("v", "l", 1), Some(&[4][..]));
    assert_eq!(schema.get::<u8>("v", "b", 1), Some(8));
    Ok(())
}

#[test]
fn binary_truncated() {
    let header = "ply\nformat binary_big_endian 1.0\n\
        element v 2\nproperty short a\nproperty short b\nend_header\n";
    let err = read_with_body(header, &[0, 1, 0, 2, 0, 3, 0]).unwrap_err();
    assert!(matches!(err, Error::TruncatedData { .. }), "{:?}", err);
    assert_eq!(pos_of(&err), ("v".into(), 1, Some("b".into())));
}

#[test]
fn binary_trailing_bytes_are_ignored() -> Result<(), Error> {
    let header = "ply\nformat binary_little_endian 1.0\nelement v 1\nproperty char a\nend_header\n";
    let schema = read_with_body(header, &[0xff, 1, 2, 3])?;
    assert_eq!(schema.scalar("v", "a", 0), Some(Scalar::Int8(-1)));
    Ok(())
}

#[test]
fn huge_declared_count_is_not_preallocated() {
    let header = "ply\nformat binary_little_endian 1.0\n\
        element v 18446744073709551615\nproperty double a\nend_header\n";
    let err = read_with_body(header, &[0; 12]).unwrap_err();
    assert!(matches!(err, Error::TruncatedData { .. }), "{:?}", err);
    assert_eq!(pos_of(&err).1, 1);
}

#[test]
fn elements_without_properties_ascii() -> Result<(), Error> {
    let src = "ply\nformat ascii 1.0\n\
        element marker 3\n\
        element v 1\n\
        property uchar a\n\
        end_header\n\
        \n5\n";
    let schema = read_str(src)?;
    assert_eq!(schema.element("marker").map(|e| e.count), Some(3));
    assert_eq!(schema.get::<u8>("v", "a", 0), Some(5));
    Ok(())
}

#[test]
fn elements_without_properties_binary() -> Result<(), Error> {
    let header = "ply\nformat binary_little_endian 1.0\n\
        element marker 18446744073709551615\n\
        element v 1\n\
        property uchar a\n\
        end_header\n";
    let schema = read_with_body(header, &[7])?;
    assert_eq!(schema.get::<u8>("v", "a", 0), Some(7));

    let only_marker = "ply\nformat binary_big_endian 1.0\n\
        element marker 18446744073709551615\nend_header\n";
    let schema = read_with_body(only_marker, &[])?;
    assert_eq!(schema.elements().len(), 1);
    Ok(())
}

#[test]
fn read_into_existing_schema() -> Result<(), Error> {
    let src = format!("{}1.0 2.0 0\n3.0 4.0 1 1\n", VERTEX_HEADER);

    let mut target = Reader::new(src.as_bytes())?.schema().clone();
    Reader::new(src.as_bytes())?.read_into(&mut target)?;
    assert_eq!(target.get_list::<i32>("vertex", "indices", 1), Some(&[1][..]));

    // A failing read leaves the target untouched.
    let before = target.clone();
    let bad = format!("{}9.0 9.0 0\n", VERTEX_HEADER);
    assert!(Reader::new(bad.as_bytes())?.read_into(&mut target).is_err());
    assert_eq!(target, before);

    Ok(())
}

#[test]
fn read_into_different_layout() -> Result<(), Error> {
    let src = format!("{}1.0 2.0 0\n3.0 4.0 0\n", VERTEX_HEADER);
    let other = "ply\nformat ascii 1.0\nelement vertex 2\nproperty float x\nend_header\n";

    let mut target = Reader::new(other.as_bytes())?.schema().clone();
    let err = Reader::new(src.as_bytes())?.read_into(&mut target).unwrap_err();
    assert!(matches!(err, Error::SchemaMismatch { .. }), "{:?}", err);
    assert_eq!(pos_of(&err).0, "vertex");

    Ok(())
}

#[test]
fn reader_exposes_header() -> Result<(), Error> {
    let reader = Reader::new(VERTEX_HEADER.as_bytes())?;
    assert_eq!(reader.encoding(), Encoding::Ascii);
    assert_eq!(reader.schema().elements().len(), 1);
    assert_eq!(reader.schema().property_data("vertex", "x").map(|d| d.rows()), Some(0));
    Ok(())
}
