#![cfg_attr(feature = "cargo-clippy", allow(clippy::module_name_repetitions))]

//! In-memory description of HDF5 datatypes.
//!
//! A datatype is a tree of [`TypeDescriptor`] nodes. Compound members, the base type of
//! enumerations, arrays and variable-length types are owned by their parent node. The
//! [`bits`] module provides the bit-level helpers used to lay out sub-byte fields.

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

mod array;
pub mod bits;
mod compound;
mod error;
mod h5type;
mod string;

pub use self::array::{ArrayType, VarLenKind, VarLenType, MAX_RANK};
pub use self::compound::{CompoundMember, CompoundType, EnumMember, EnumType};
pub use self::error::TypeError;
pub use self::h5type::{
    AtomicInfo, BitfieldType, ByteOrder, CharacterSet, FloatType, IntegerType, Location,
    Normalization, OpaqueType, Pad, ReferenceKind, ReferenceType, Sign, StringPadding,
    StringType, TimeType, TypeClass, TypeDescriptor, TypeKind, Version,
};
pub use self::string::{
    ascii_tag, validate_name, StringError, OPAQUE_TAG_LEN_MAX, OPAQUE_TAG_MAX,
};
