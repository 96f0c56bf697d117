//! The structure of a PLY file as described by its header: elements with
//! their properties.
//!
//! A [`Schema`] is created by parsing the header. Its element and property
//! definitions never change afterwards; only the per-property
//! [`PropertyData`] stores are filled when the data section is read.

use std::{
    fmt,
    ops,
};

use derive_more::{Display, From};
use fxhash::FxHashMap;

use crate::{
    types::{Primitive, ScalarType},
    value::{List, PropertyData, Scalar},
};


/// The encoding of the data section of a PLY file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    /// Everything is stored as whitespace separated ASCII tokens, one element
    /// per line.
    Ascii,

    /// Binary encoding where all numeric types are stored in big endian
    /// layout.
    BinaryBigEndian,

    /// Binary encoding where all numeric types are stored in little endian
    /// layout.
    BinaryLittleEndian,
}

impl Encoding {
    /// Returns the name used in the `format` header line.
    pub fn ply_name(&self) -> &'static str {
        match self {
            Encoding::Ascii => "ascii",
            Encoding::BinaryBigEndian => "binary_big_endian",
            Encoding::BinaryLittleEndian => "binary_little_endian",
        }
    }

    /// Parses the name used in the `format` header line.
    pub fn from_ply_name(name: &str) -> Option<Self> {
        match name {
            "ascii" => Some(Encoding::Ascii),
            "binary_big_endian" => Some(Encoding::BinaryBigEndian),
            "binary_little_endian" => Some(Encoding::BinaryLittleEndian),
            _ => None,
        }
    }
}


// ===========================================================================
// ===== Strongly typed index
// ===========================================================================

/// Index of a specific property in the ordered list of properties of one
/// element. Can be used to index a [`PropVec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, From, Display)]
pub struct PropIndex(pub u32);

impl PropIndex {
    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

/// A vector that holds data for each property. Can be indexed by
/// [`PropIndex`].
///
/// This is simply a wrapper around a `Vec` to use strong typing.
#[derive(Debug, Clone, PartialEq, From)]
pub struct PropVec<T>(Vec<T>);

impl<T> PropVec<T> {
    pub fn new() -> Self {
        PropVec(Vec::new())
    }
}

impl<T> Default for PropVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ops::Index<PropIndex> for PropVec<T> {
    type Output = T;
    fn index(&self, idx: PropIndex) -> &Self::Output {
        &self.0[idx.as_usize()]
    }
}

impl<T> ops::Deref for PropVec<T> {
    type Target = Vec<T>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> ops::DerefMut for PropVec<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}


// ===========================================================================
// ===== Definitions
// ===========================================================================

/// The type of a property: a single scalar or a list of scalars with a
/// length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    Scalar(ScalarType),
    List {
        len_type: ScalarType,
        scalar_type: ScalarType,
    }
}

impl PropertyType {
    /// The type of the length prefix, or `None` for scalar properties.
    pub fn len_type(&self) -> Option<ScalarType> {
        match self {
            PropertyType::Scalar(_) => None,
            PropertyType::List { len_type, .. } => Some(*len_type),
        }
    }

    /// The type of the value (scalar properties) or of the list items (list
    /// properties).
    pub fn scalar_type(&self) -> ScalarType {
        match *self {
            PropertyType::Scalar(scalar_type) => scalar_type,
            PropertyType::List { scalar_type, .. } => scalar_type,
        }
    }

    pub fn is_list(&self) -> bool {
        self.len_type().is_some()
    }
}

/// The header definition of one property of an element, together with the
/// property's values once the data section has been read.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDef {
    pub name: String,
    pub ty: PropertyType,
    pub(crate) data: PropertyData,
}

impl PropertyDef {
    pub fn new(name: impl Into<String>, ty: PropertyType) -> Self {
        Self {
            name: name.into(),
            ty,
            data: PropertyData::new(ty),
        }
    }

    /// The values of this property. Empty until the data section is read.
    pub fn data(&self) -> &PropertyData {
        &self.data
    }
}

impl fmt::Display for PropertyDef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.ty {
            PropertyType::Scalar(ty) => write!(f, "property {} {}", ty, self.name),
            PropertyType::List { len_type, scalar_type } => {
                write!(f, "property list {} {} {}", len_type, scalar_type, self.name)
            }
        }
    }
}

/// The header definition of one element (group of rows).
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDef {
    pub name: String,

    /// Number of rows of this element.
    pub count: u64,

    /// Definitions for all properties of this element, in file order.
    pub property_defs: PropVec<PropertyDef>,
}

impl ElementDef {
    pub fn new(name: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            count,
            property_defs: PropVec::new(),
        }
    }

    /// Position of the property with the given name.
    pub fn prop_pos(&self, prop_name: &str) -> Option<PropIndex> {
        self.property_defs.iter()
            .position(|p| p.name == prop_name)
            .map(|idx| PropIndex(idx as u32))
    }

    /// The property with the given name.
    pub fn property(&self, prop_name: &str) -> Option<&PropertyDef> {
        self.prop_pos(prop_name).map(|idx| &self.property_defs[idx])
    }

    /// Names of all properties, in file order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.property_defs.iter().map(|p| p.name.as_str())
    }

    /// Returns `true` if `other` declares the same name, count and properties
    /// (ignoring stored values).
    pub(crate) fn same_layout(&self, other: &ElementDef) -> bool {
        self.name == other.name
            && self.count == other.count
            && self.property_defs.len() == other.property_defs.len()
            && self.property_defs.iter()
                .zip(other.property_defs.iter())
                .all(|(a, b)| a.name == b.name && a.ty == b.ty)
    }
}

impl fmt::Display for ElementDef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "element {} {}", self.name, self.count)?;
        for prop in self.property_defs.iter() {
            write!(f, "\n{}", prop)?;
        }
        Ok(())
    }
}


// ===========================================================================
// ===== `Schema`
// ===========================================================================

/// Everything the header of a PLY file declares, plus the decoded values of
/// every property once the data section was read.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub(crate) encoding: Encoding,
    pub(crate) version: String,
    pub(crate) obj_info: FxHashMap<String, String>,
    pub(crate) elements: Vec<ElementDef>,
}

impl Schema {
    /// Creates an empty schema without any elements.
    pub fn new(encoding: Encoding, version: impl Into<String>) -> Self {
        Self {
            encoding,
            version: version.into(),
            obj_info: FxHashMap::default(),
            elements: Vec::new(),
        }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// The version from the `format` line, e.g. `1.0`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The value of the `obj_info` entry with the given key.
    pub fn obj_info(&self, key: &str) -> Option<&str> {
        self.obj_info.get(key).map(|s| s.as_str())
    }

    /// All `obj_info` entries (in no particular order).
    pub fn obj_infos(&self) -> impl Iterator<Item = (&str, &str)> {
        self.obj_info.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// All elements, in file order.
    pub fn elements(&self) -> &[ElementDef] {
        &self.elements
    }

    /// Names of all elements, in file order.
    pub fn element_names(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|e| e.name.as_str())
    }

    /// The element with the given name. If multiple elements share the name,
    /// the first one is returned.
    pub fn element(&self, name: &str) -> Option<&ElementDef> {
        self.elements.iter().find(|e| e.name == name)
    }

    /// The values of property `prop` of element `elem`.
    pub fn property_data(&self, elem: &str, prop: &str) -> Option<&PropertyData> {
        self.element(elem)?.property(prop).map(|p| p.data())
    }

    /// The value of the scalar property `prop` of element `elem` in row `row`.
    pub fn scalar(&self, elem: &str, prop: &str, row: usize) -> Option<Scalar> {
        self.property_data(elem, prop)?.scalar(row)
    }

    /// The list of the list property `prop` of element `elem` in row `row`.
    pub fn list(&self, elem: &str, prop: &str, row: usize) -> Option<List<'_>> {
        self.property_data(elem, prop)?.list(row)
    }

    /// Typed version of [`Schema::scalar`]. Returns `None` if `T` is not the
    /// property's type.
    pub fn get<T: Primitive>(&self, elem: &str, prop: &str, row: usize) -> Option<T> {
        self.property_data(elem, prop)?.get(row)
    }

    /// Typed version of [`Schema::list`]. Returns `None` if `T` is not the
    /// type of the list items.
    pub fn get_list<T: Primitive>(&self, elem: &str, prop: &str, row: usize) -> Option<&[T]> {
        self.property_data(elem, prop)?.get_list(row)
    }

    /// Returns `true` if `other` declares the same elements and properties
    /// with the same encoding (ignoring stored values and `obj_info`).
    pub(crate) fn same_layout(&self, other: &Schema) -> bool {
        self.encoding == other.encoding
            && self.elements.len() == other.elements.len()
            && self.elements.iter().zip(&other.elements).all(|(a, b)| a.same_layout(b))
    }
}

/// Renders the schema as PLY header (without `comment` lines, which are not
/// retained).
impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "ply")?;
        writeln!(f, "format {} {}", self.encoding.ply_name(), self.version)?;

        // Sort to get a deterministic output.
        let mut infos: Vec<_> = self.obj_infos().collect();
        infos.sort();
        for (key, value) in infos {
            if value.is_empty() {
                writeln!(f, "obj_info {}", key)?;
            } else {
                writeln!(f, "obj_info {} {}", key, value)?;
            }
        }

        for elem in &self.elements {
            writeln!(f, "{}", elem)?;
        }
        write!(f, "end_header")
    }
}
