//! The eight scalar types of the PLY format and their names.
//!
//! The format historically used C-style type names (`char`, `uint`, `double`,
//! ...). Later versions switched to names with explicit widths (`int8`,
//! `uint32`, `float64`, ...). Both name sets are accepted and resolve to the
//! same [`ScalarType`].

use std::{
    fmt,
    str::FromStr,
};

use byteorder::ByteOrder;
use num_traits::{Bounded, NumCast, ToPrimitive};

use crate::value::{Column, List, Scalar};


/// A primitive PLY type. There are 8 in total, 2 floating point types, 3
/// signed and 3 unsigned integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Int8,
    Int16,
    Int32,
    UInt8,
    UInt16,
    UInt32,
    Float32,
    Float64,
}

/// All scalar types, in the order the format lists them.
pub const ALL_SCALAR_TYPES: [ScalarType; 8] = [
    ScalarType::Int8,
    ScalarType::Int16,
    ScalarType::Int32,
    ScalarType::UInt8,
    ScalarType::UInt16,
    ScalarType::UInt32,
    ScalarType::Float32,
    ScalarType::Float64,
];

impl ScalarType {
    /// Resolves a type name from the header. Both the explicit-width names
    /// (`int32`) and the legacy C names (`int`) are accepted. Matching is
    /// exact and case-sensitive.
    pub fn resolve(name: &str) -> Result<Self, ScalarTypeParseError> {
        name.parse()
    }

    /// Returns `true` if and only if the type is either `float32` or
    /// `float64`.
    pub fn is_floating_point(&self) -> bool {
        *self == ScalarType::Float32 || *self == ScalarType::Float64
    }

    /// Returns `true` if and only if the type is one of `uint8`, `uint16` or
    /// `uint32`.
    pub fn is_unsigned_integer(&self) -> bool {
        match self {
            ScalarType::UInt8 | ScalarType::UInt16 | ScalarType::UInt32 => true,
            _ => false,
        }
    }

    /// Returns `true` if and only if the type is one of `int8`, `int16` or
    /// `int32`.
    pub fn is_signed_integer(&self) -> bool {
        match self {
            ScalarType::Int8 | ScalarType::Int16 | ScalarType::Int32 => true,
            _ => false,
        }
    }

    /// Returns the number of bytes this type occupies.
    pub fn len(&self) -> ScalarLen {
        match self {
            ScalarType::Int8 => ScalarLen::One,
            ScalarType::Int16 => ScalarLen::Two,
            ScalarType::Int32 => ScalarLen::Four,
            ScalarType::UInt8 => ScalarLen::One,
            ScalarType::UInt16 => ScalarLen::Two,
            ScalarType::UInt32 => ScalarLen::Four,
            ScalarType::Float32 => ScalarLen::Four,
            ScalarType::Float64 => ScalarLen::Eight,
        }
    }

    /// Returns the explicit-width type name (e.g. `int16` for `Int16`).
    pub fn ply_type_name(&self) -> &'static str {
        match self {
            ScalarType::Int8 => "int8",
            ScalarType::Int16 => "int16",
            ScalarType::Int32 => "int32",
            ScalarType::UInt8 => "uint8",
            ScalarType::UInt16 => "uint16",
            ScalarType::UInt32 => "uint32",
            ScalarType::Float32 => "float32",
            ScalarType::Float64 => "float64",
        }
    }

    /// Returns the legacy C-style type name (e.g. `short` for `Int16`).
    pub fn legacy_type_name(&self) -> &'static str {
        match self {
            ScalarType::Int8 => "char",
            ScalarType::Int16 => "short",
            ScalarType::Int32 => "int",
            ScalarType::UInt8 => "uchar",
            ScalarType::UInt16 => "ushort",
            ScalarType::UInt32 => "uint",
            ScalarType::Float32 => "float",
            ScalarType::Float64 => "double",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.ply_type_name())
    }
}

/// The error emitted when the `FromStr` implementation for `ScalarType` cannot
/// parse the given string.
pub struct ScalarTypeParseError(pub(crate) String);

impl ScalarTypeParseError {
    /// The name that could not be resolved.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScalarTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\" is not a valid PLY scalar type", self.0)
    }
}

impl fmt::Debug for ScalarTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for ScalarType {
    type Err = ScalarTypeParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int8" | "char" => Ok(ScalarType::Int8),
            "int16" | "short" => Ok(ScalarType::Int16),
            "int32" | "int" => Ok(ScalarType::Int32),
            "uint8" | "uchar" => Ok(ScalarType::UInt8),
            "uint16" | "ushort" => Ok(ScalarType::UInt16),
            "uint32" | "uint" => Ok(ScalarType::UInt32),
            "float32" | "float" => Ok(ScalarType::Float32),
            "float64" | "double" => Ok(ScalarType::Float64),
            other => Err(ScalarTypeParseError(other.to_string())),
        }
    }
}

/// Length of a PLY scalar value in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarLen {
    One = 1,
    Two = 2,
    Four = 4,
    Eight = 8,
}

impl ScalarLen {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    pub fn as_usize(&self) -> usize {
        *self as usize
    }
}


// ==========================================================================
// ===== Primitives
// ==========================================================================

mod internal {
    pub trait DoNotImplement {}
}

/// Abstracts over the Rust types matching the eight PLY scalar types.
///
/// This is a closed set of implementing types: `i8`, `i16`, `i32`, `u8`,
/// `u16`, `u32`, `f32` and `f64`. That's why this trait has a supertrait
/// called `DoNotImplement`, which is crate-private.
pub trait Primitive: Copy + fmt::Debug + PartialEq + internal::DoNotImplement {
    /// The PLY type represented by `Self`.
    const TY: ScalarType;

    /// Parses an ASCII token of the data section.
    fn parse_ascii(token: &str) -> Result<Self, String>;

    /// Reads the value from the start of `buf` in byte order `B`. `buf` must
    /// be at least `Self::TY.len()` bytes long.
    fn read_bytes<B: ByteOrder>(buf: &[u8]) -> Self;

    /// Writes the value to the start of `buf` in byte order `B`.
    fn write_bytes<B: ByteOrder>(self, buf: &mut [u8]);

    /// Returns the value as dynamically typed [`Scalar`].
    fn to_scalar(self) -> Scalar;

    /// Returns the value if `scalar` holds a `Self`.
    fn from_scalar(scalar: Scalar) -> Option<Self>;

    /// Returns the values of `column` if it stores `Self` values.
    fn column(column: &Column) -> Option<&[Self]>;

    /// Returns the items of `list` if they are `Self` values.
    fn list_slice(list: List<'_>) -> Option<&[Self]>;
}

macro_rules! impl_primitive_common {
    ($ty:ident, $variant:ident) => {
        impl internal::DoNotImplement for $ty {}

        impl Primitive for $ty {
            const TY: ScalarType = ScalarType::$variant;

            fn parse_ascii(token: &str) -> Result<Self, String> {
                impl_primitive_common!(@parse $ty, token)
            }

            fn read_bytes<B: ByteOrder>(buf: &[u8]) -> Self {
                impl_primitive_common!(@read $ty, B, buf)
            }

            fn write_bytes<B: ByteOrder>(self, buf: &mut [u8]) {
                impl_primitive_common!(@write $ty, B, buf, self)
            }

            fn to_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            fn from_scalar(scalar: Scalar) -> Option<Self> {
                match scalar {
                    Scalar::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn column(column: &Column) -> Option<&[Self]> {
                match column {
                    Column::$variant(v) => Some(v.as_slice()),
                    _ => None,
                }
            }

            fn list_slice(list: List<'_>) -> Option<&[Self]> {
                match list {
                    List::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };

    // Single byte types don't have a byte order.
    (@read i8, $B:ident, $buf:ident) => { $buf[0] as i8 };
    (@read u8, $B:ident, $buf:ident) => { $buf[0] };
    (@read i16, $B:ident, $buf:ident) => { $B::read_i16($buf) };
    (@read u16, $B:ident, $buf:ident) => { $B::read_u16($buf) };
    (@read i32, $B:ident, $buf:ident) => { $B::read_i32($buf) };
    (@read u32, $B:ident, $buf:ident) => { $B::read_u32($buf) };
    (@read f32, $B:ident, $buf:ident) => { $B::read_f32($buf) };
    (@read f64, $B:ident, $buf:ident) => { $B::read_f64($buf) };

    (@write i8, $B:ident, $buf:ident, $v:expr) => { $buf[0] = $v as u8 };
    (@write u8, $B:ident, $buf:ident, $v:expr) => { $buf[0] = $v };
    (@write i16, $B:ident, $buf:ident, $v:expr) => { $B::write_i16($buf, $v) };
    (@write u16, $B:ident, $buf:ident, $v:expr) => { $B::write_u16($buf, $v) };
    (@write i32, $B:ident, $buf:ident, $v:expr) => { $B::write_i32($buf, $v) };
    (@write u32, $B:ident, $buf:ident, $v:expr) => { $B::write_u32($buf, $v) };
    (@write f32, $B:ident, $buf:ident, $v:expr) => { $B::write_f32($buf, $v) };
    (@write f64, $B:ident, $buf:ident, $v:expr) => { $B::write_f64($buf, $v) };

    (@parse f32, $token:ident) => { parse_float::<f32>($token) };
    (@parse f64, $token:ident) => { parse_float::<f64>($token) };
    (@parse $ty:ident, $token:ident) => { parse_int::<$ty>($token) };
}

impl_primitive_common!(i8,  Int8);
impl_primitive_common!(i16, Int16);
impl_primitive_common!(i32, Int32);
impl_primitive_common!(u8,  UInt8);
impl_primitive_common!(u16, UInt16);
impl_primitive_common!(u32, UInt32);
impl_primitive_common!(f32, Float32);
impl_primitive_common!(f64, Float64);

/// Parses an integer token: optional sign, optional `0x`/`0o`/`0b` prefix,
/// then digits in the selected base (base 10 without prefix). The value has
/// to fit into `T`.
fn parse_int<T: Bounded + NumCast + fmt::Display>(token: &str) -> Result<T, String> {
    let (negative, rest) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };

    let (radix, digits) = match rest.get(..2) {
        Some("0x") | Some("0X") => (16, &rest[2..]),
        Some("0o") | Some("0O") => (8, &rest[2..]),
        Some("0b") | Some("0B") => (2, &rest[2..]),
        _ => (10, rest),
    };

    // `from_str_radix` would accept another sign here.
    if digits.is_empty() || digits.starts_with('+') || digits.starts_with('-') {
        return Err("not an integer".into());
    }

    let magnitude = u64::from_str_radix(digits, radix)
        .map_err(|e| format!("not an integer ({})", e))?;

    let out_of_range = || format!(
        "out of range (must be between {} and {})",
        T::min_value(),
        T::max_value(),
    );

    if negative && T::min_value().to_i64() == Some(0) {
        return Err("negative value for an unsigned type".into());
    }
    if magnitude > i64::max_value() as u64 {
        return Err(out_of_range());
    }
    let value = if negative { -(magnitude as i64) } else { magnitude as i64 };

    <T as NumCast>::from(value).ok_or_else(out_of_range)
}

/// Parses a decimal or scientific float token.
fn parse_float<T>(token: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    token.parse::<T>().map_err(|e| format!("not a floating point number ({})", e))
}
