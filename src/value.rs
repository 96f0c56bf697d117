//! Decoded property values.
//!
//! Regardless of the encoding of the data section (ASCII or binary in either
//! byte order), values end up in the same typed representation: one
//! [`Column`] of native Rust numbers per property. Scalar properties store
//! one value per row, list properties store all list items back to back plus
//! the offsets of each row.

use std::{
    fmt,
    mem,
};

use byteorder::{ByteOrder, LittleEndian};
use smallvec::{smallvec, SmallVec};
use static_assertions::const_assert;

use crate::{
    codec::{DecodeError, ValueSource},
    schema::PropertyType,
    types::{Primitive, ScalarType},
};


// ===========================================================================
// ===== `Scalar`
// ===========================================================================

/// One scalar value of some PLY type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    Float32(f32),
    Float64(f64),
}

// Lists and columns hand out `Scalar`s by value.
const_assert!(mem::size_of::<Scalar>() <= 16);

/// Calls `$body` with `$v` bound to the value inside `$scalar`.
macro_rules! with_scalar {
    ($scalar:expr, |$v:ident| $body:expr) => {
        match $scalar {
            Scalar::Int8($v) => $body,
            Scalar::Int16($v) => $body,
            Scalar::Int32($v) => $body,
            Scalar::UInt8($v) => $body,
            Scalar::UInt16($v) => $body,
            Scalar::UInt32($v) => $body,
            Scalar::Float32($v) => $body,
            Scalar::Float64($v) => $body,
        }
    };
}

/// Calls `$body` with the type parameter `$T` set to the Rust type matching
/// `$ty`.
macro_rules! with_type {
    ($ty:expr, <$T:ident> $body:expr) => {
        match $ty {
            ScalarType::Int8 => { type $T = i8; $body }
            ScalarType::Int16 => { type $T = i16; $body }
            ScalarType::Int32 => { type $T = i32; $body }
            ScalarType::UInt8 => { type $T = u8; $body }
            ScalarType::UInt16 => { type $T = u16; $body }
            ScalarType::UInt32 => { type $T = u32; $body }
            ScalarType::Float32 => { type $T = f32; $body }
            ScalarType::Float64 => { type $T = f64; $body }
        }
    };
}

impl Scalar {
    /// Returns the type of this value.
    pub fn ty(&self) -> ScalarType {
        match self {
            Scalar::Int8(_) => ScalarType::Int8,
            Scalar::Int16(_) => ScalarType::Int16,
            Scalar::Int32(_) => ScalarType::Int32,
            Scalar::UInt8(_) => ScalarType::UInt8,
            Scalar::UInt16(_) => ScalarType::UInt16,
            Scalar::UInt32(_) => ScalarType::UInt32,
            Scalar::Float32(_) => ScalarType::Float32,
            Scalar::Float64(_) => ScalarType::Float64,
        }
    }

    /// Returns the value as integer, or `None` if the value does not have an
    /// integer type.
    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            Scalar::Int8(v) => Some(v.into()),
            Scalar::Int16(v) => Some(v.into()),
            Scalar::Int32(v) => Some(v.into()),
            Scalar::UInt8(v) => Some(v.into()),
            Scalar::UInt16(v) => Some(v.into()),
            Scalar::UInt32(v) => Some(v.into()),
            _ => None,
        }
    }

    /// Returns the value as unsigned integer, or `None` if the value does not
    /// have an unsigned integer type.
    pub fn as_unsigned_integer(&self) -> Option<u32> {
        match *self {
            Scalar::UInt8(v) => Some(v.into()),
            Scalar::UInt16(v) => Some(v.into()),
            Scalar::UInt32(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the value as signed integer, or `None` if the value does not
    /// have a signed integer type.
    pub fn as_signed_integer(&self) -> Option<i32> {
        match *self {
            Scalar::Int8(v) => Some(v.into()),
            Scalar::Int16(v) => Some(v.into()),
            Scalar::Int32(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the value as float, or `None` if the value does not have a
    /// float type.
    pub fn as_floating_point(&self) -> Option<f64> {
        match *self {
            Scalar::Float32(v) => Some(v.into()),
            Scalar::Float64(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the value converted to `f64`. This is lossless for all PLY
    /// types.
    pub fn as_f64(&self) -> f64 {
        with_scalar!(*self, |v| v.into())
    }

    /// Interprets this value as the length of a list. Only non-negative
    /// integral values are valid lengths.
    pub(crate) fn list_len(&self) -> Option<u32> {
        match *self {
            Scalar::UInt8(v) => Some(v.into()),
            Scalar::UInt16(v) => Some(v.into()),
            Scalar::UInt32(v) => Some(v),
            Scalar::Int8(v) if v >= 0 => Some(v as u32),
            Scalar::Int16(v) if v >= 0 => Some(v as u32),
            Scalar::Int32(v) if v >= 0 => Some(v as u32),
            Scalar::Float32(v) if v >= 0.0 && v.fract() == 0.0 && v < 4294967296.0
                => Some(v as u32),
            Scalar::Float64(v) if v >= 0.0 && v.fract() == 0.0 && v < 4294967296.0
                => Some(v as u32),
            _ => None,
        }
    }

    /// Encodes the value in byte order `B`. The result has exactly
    /// `self.ty().len()` bytes.
    pub fn to_bytes<B: ByteOrder>(&self) -> SmallVec<[u8; 8]> {
        let mut out = smallvec![0; self.ty().len().as_usize()];
        with_scalar!(*self, |v| v.write_bytes::<B>(&mut out));
        out
    }

    /// Decodes a value of type `ty` from `buf` in byte order `B`. Returns
    /// `None` if `buf` is not exactly `ty.len()` bytes long.
    pub fn from_bytes<B: ByteOrder>(ty: ScalarType, buf: &[u8]) -> Option<Self> {
        if buf.len() != ty.len().as_usize() {
            return None;
        }

        Some(with_type!(ty, <T> T::read_bytes::<B>(buf).to_scalar()))
    }

    /// Returns the canonical byte representation of this value: fixed width,
    /// little endian.
    pub fn to_le_bytes(&self) -> SmallVec<[u8; 8]> {
        self.to_bytes::<LittleEndian>()
    }

    /// Inverse of [`Scalar::to_le_bytes`].
    pub fn from_le_bytes(ty: ScalarType, buf: &[u8]) -> Option<Self> {
        Self::from_bytes::<LittleEndian>(ty, buf)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        with_scalar!(*self, |v| fmt::Display::fmt(&v, f))
    }
}

/// Reads one scalar of type `ty` from `src`.
pub(crate) fn read_scalar(src: &mut impl ValueSource, ty: ScalarType) -> Result<Scalar, DecodeError> {
    with_type!(ty, <T> src.read::<T>().map(Primitive::to_scalar))
}


// ===========================================================================
// ===== `Column` and `List`
// ===========================================================================

/// A densely packed sequence of values of one PLY type.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    UInt8(Vec<u8>),
    UInt16(Vec<u16>),
    UInt32(Vec<u32>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

/// Calls `$body` with `$v` bound to the vector inside `$column`.
macro_rules! with_column {
    ($column:expr, |$v:ident| $body:expr) => {
        match $column {
            Column::Int8($v) => $body,
            Column::Int16($v) => $body,
            Column::Int32($v) => $body,
            Column::UInt8($v) => $body,
            Column::UInt16($v) => $body,
            Column::UInt32($v) => $body,
            Column::Float32($v) => $body,
            Column::Float64($v) => $body,
        }
    };
}

impl Column {
    /// Creates an empty column for values of type `ty`.
    pub fn new(ty: ScalarType) -> Self {
        match ty {
            ScalarType::Int8 => Column::Int8(Vec::new()),
            ScalarType::Int16 => Column::Int16(Vec::new()),
            ScalarType::Int32 => Column::Int32(Vec::new()),
            ScalarType::UInt8 => Column::UInt8(Vec::new()),
            ScalarType::UInt16 => Column::UInt16(Vec::new()),
            ScalarType::UInt32 => Column::UInt32(Vec::new()),
            ScalarType::Float32 => Column::Float32(Vec::new()),
            ScalarType::Float64 => Column::Float64(Vec::new()),
        }
    }

    /// Returns the type of the stored values.
    pub fn ty(&self) -> ScalarType {
        match self {
            Column::Int8(_) => ScalarType::Int8,
            Column::Int16(_) => ScalarType::Int16,
            Column::Int32(_) => ScalarType::Int32,
            Column::UInt8(_) => ScalarType::UInt8,
            Column::UInt16(_) => ScalarType::UInt16,
            Column::UInt32(_) => ScalarType::UInt32,
            Column::Float32(_) => ScalarType::Float32,
            Column::Float64(_) => ScalarType::Float64,
        }
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        with_column!(self, |v| v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the value at `idx`.
    pub fn get(&self, idx: usize) -> Option<Scalar> {
        with_column!(self, |v| v.get(idx).map(|x| x.to_scalar()))
    }

    /// Borrows the values in `start..end` as a [`List`].
    fn slice(&self, start: usize, end: usize) -> List<'_> {
        match self {
            Column::Int8(v) => List::Int8(&v[start..end]),
            Column::Int16(v) => List::Int16(&v[start..end]),
            Column::Int32(v) => List::Int32(&v[start..end]),
            Column::UInt8(v) => List::UInt8(&v[start..end]),
            Column::UInt16(v) => List::UInt16(&v[start..end]),
            Column::UInt32(v) => List::UInt32(&v[start..end]),
            Column::Float32(v) => List::Float32(&v[start..end]),
            Column::Float64(v) => List::Float64(&v[start..end]),
        }
    }

    /// Reads one value of this column's type from `src` and appends it.
    fn decode_one(&mut self, src: &mut impl ValueSource) -> Result<(), DecodeError> {
        with_column!(self, |v| v.push(src.read()?));
        Ok(())
    }
}

/// The values of one list property in one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum List<'a> {
    Int8(&'a [i8]),
    Int16(&'a [i16]),
    Int32(&'a [i32]),
    UInt8(&'a [u8]),
    UInt16(&'a [u16]),
    UInt32(&'a [u32]),
    Float32(&'a [f32]),
    Float64(&'a [f64]),
}

/// Calls `$body` with `$v` bound to the slice inside `$list`.
macro_rules! with_list {
    ($list:expr, |$v:ident| $body:expr) => {
        match $list {
            List::Int8($v) => $body,
            List::Int16($v) => $body,
            List::Int32($v) => $body,
            List::UInt8($v) => $body,
            List::UInt16($v) => $body,
            List::UInt32($v) => $body,
            List::Float32($v) => $body,
            List::Float64($v) => $body,
        }
    };
}

impl<'a> List<'a> {
    /// Returns the type of the list items.
    pub fn ty(&self) -> ScalarType {
        match self {
            List::Int8(_) => ScalarType::Int8,
            List::Int16(_) => ScalarType::Int16,
            List::Int32(_) => ScalarType::Int32,
            List::UInt8(_) => ScalarType::UInt8,
            List::UInt16(_) => ScalarType::UInt16,
            List::UInt32(_) => ScalarType::UInt32,
            List::Float32(_) => ScalarType::Float32,
            List::Float64(_) => ScalarType::Float64,
        }
    }

    pub fn len(&self) -> usize {
        with_list!(self, |v| v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, idx: usize) -> Option<Scalar> {
        with_list!(self, |v| v.get(idx).map(|x| x.to_scalar()))
    }

    /// Returns the items as `&[T]` if `T` matches the item type.
    pub fn as_slice<T: Primitive>(&self) -> Option<&'a [T]> {
        T::list_slice(*self)
    }

    /// Iterates over all items.
    pub fn iter(&self) -> impl Iterator<Item = Scalar> + 'a {
        let list = *self;
        (0..list.len()).filter_map(move |i| list.get(i))
    }
}

// ===========================================================================
// ===== `PropertyData`
// ===========================================================================

/// All values of one property, one entry per row of its element.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyData {
    values: Column,

    /// For list properties: `offsets[row]..offsets[row + 1]` is the range of
    /// row `row` in `values`. Starts with a single `0`.
    offsets: Option<Vec<usize>>,
}

impl PropertyData {
    /// Creates an empty store for a property of type `ty`.
    pub fn new(ty: PropertyType) -> Self {
        Self {
            values: Column::new(ty.scalar_type()),
            offsets: if ty.is_list() { Some(vec![0]) } else { None },
        }
    }

    /// Number of rows stored so far.
    pub fn rows(&self) -> usize {
        match &self.offsets {
            Some(offsets) => offsets.len() - 1,
            None => self.values.len(),
        }
    }

    pub fn is_list(&self) -> bool {
        self.offsets.is_some()
    }

    /// All stored values. For list properties, the items of all rows are
    /// concatenated.
    pub fn column(&self) -> &Column {
        &self.values
    }

    /// Returns the value at `row` of a scalar property. Returns `None` for
    /// list properties or if `row` is out of bounds.
    pub fn scalar(&self, row: usize) -> Option<Scalar> {
        match self.offsets {
            Some(_) => None,
            None => self.values.get(row),
        }
    }

    /// Returns the list at `row` of a list property. Returns `None` for
    /// scalar properties or if `row` is out of bounds.
    pub fn list(&self, row: usize) -> Option<List<'_>> {
        let offsets = self.offsets.as_ref()?;
        let start = *offsets.get(row)?;
        let end = *offsets.get(row + 1)?;
        Some(self.values.slice(start, end))
    }

    /// Typed version of [`PropertyData::scalar`]: returns `None` if `T` is
    /// not the property's type.
    pub fn get<T: Primitive>(&self, row: usize) -> Option<T> {
        self.scalar(row).and_then(T::from_scalar)
    }

    /// Typed version of [`PropertyData::list`]: returns `None` if `T` is not
    /// the type of the list items.
    pub fn get_list<T: Primitive>(&self, row: usize) -> Option<&[T]> {
        self.list(row).and_then(|l| l.as_slice::<T>())
    }

    /// Returns all values of a scalar property as slice, one per row.
    /// Returns `None` for list properties or if `T` is not the property's
    /// type.
    pub fn values<T: Primitive>(&self) -> Option<&[T]> {
        match self.offsets {
            Some(_) => None,
            None => T::column(&self.values),
        }
    }

    /// Decodes one row of this property from `src` and appends it. `ty` has
    /// to be the type this store was created with.
    pub(crate) fn decode_row(
        &mut self,
        src: &mut impl ValueSource,
        ty: PropertyType,
    ) -> Result<(), DecodeError> {
        match ty {
            PropertyType::Scalar(_) => self.values.decode_one(src),
            PropertyType::List { len_type, .. } => {
                let len_value = read_scalar(src, len_type)?;
                let len = len_value.list_len().ok_or_else(|| DecodeError::InvalidListLen {
                    value: len_value.to_string(),
                    ty: len_type,
                })?;

                // The length is not used to reserve memory: a bogus header or
                // length field must not make us allocate huge amounts.
                for _ in 0..len {
                    self.values.decode_one(src)?;
                }

                let end = self.values.len();
                if let Some(offsets) = &mut self.offsets {
                    offsets.push(end);
                }
                Ok(())
            }
        }
    }
}
