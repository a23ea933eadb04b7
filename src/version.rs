//! Version rules of the datatype message format.
//!
//! * version 1: atomic types, compounds with intrinsic member dimensions, names padded to
//!   a multiple of eight bytes;
//! * version 2: array class;
//! * version 3: unpadded names, VAX float order, member offsets as wide as the compound
//!   size needs;
//! * version 4: additional reference kinds.

use hdf5_dtype_types::{TypeDescriptor, TypeKind, Version};

use crate::error::{Error, Result};
use crate::options::DecodeOptions;

/// Size of the header common to every encoded datatype.
pub const HEADER_SIZE: usize = 8;

/// Dimension block preceding every member type of a version 1 compound: rank (1),
/// reserved (3), permutation (4), reserved (4) and four 4-byte dimensions (16).
pub const LEGACY_DIMS_BLOCK_SIZE: usize = 1 + 3 + 4 + 4 + 16;

/// Highest rank expressible in the version 1 dimension block.
pub const LEGACY_MAX_RANK: usize = 4;

/// Minimum version able to represent the whole tree.
pub fn required_version(dtype: &TypeDescriptor) -> Version {
    dtype
        .children()
        .into_iter()
        .map(required_version)
        .fold(dtype.kind.min_version(), Ord::max)
}

/// Whether a decoded node may be raised to `target` without failing the decode.
pub fn can_upgrade_in_place(
    dtype: &TypeDescriptor, target: Version, options: &DecodeOptions,
) -> bool {
    !options.strict() && target >= dtype.version
}

/// Raises `dtype` to at least `target`.
///
/// Nested compound, enum and array nodes are raised to `target` as well, variable-length
/// nodes follow their base type and atomic nodes keep their version.
pub fn upgrade_version(dtype: &mut TypeDescriptor, target: Version) {
    for child in dtype.children_mut() {
        raise_nested(child, target);
    }
    dtype.version = dtype.version.max(target);
}

fn raise_nested(dtype: &mut TypeDescriptor, target: Version) {
    for child in dtype.children_mut() {
        raise_nested(child, target);
    }
    let version = match &dtype.kind {
        TypeKind::Compound(_) | TypeKind::Enum(_) | TypeKind::Array(_) => target,
        TypeKind::VarLen(vt) => vt.base.version,
        _ => dtype.version,
    };
    dtype.version = dtype.version.max(version);
}

/// Copy of `dtype` laid out for exactly `version`.
///
/// The root and every nested compound, enum and array take `version`, variable-length
/// nodes take the version of their base type and atomic nodes the lowest version their
/// own features allow.
pub fn with_version(dtype: &TypeDescriptor, version: Version) -> Result<TypeDescriptor> {
    let required = required_version(dtype);
    ensure!(
        version >= required,
        Error::IncompatibleVersion { class: dtype.class(), stored: version, required }
    );
    let mut copy = dtype.clone();
    relayout(&mut copy, version);
    copy.version = version;
    Ok(copy)
}

fn relayout(dtype: &mut TypeDescriptor, version: Version) {
    for child in dtype.children_mut() {
        relayout(child, version);
    }
    dtype.version = match &dtype.kind {
        TypeKind::Compound(_) | TypeKind::Enum(_) | TypeKind::Array(_) => version,
        TypeKind::VarLen(vt) => vt.base.version,
        kind => kind.min_version(),
    };
}

/// Number of bytes used for compound member offsets from version 3 on.
pub fn member_offset_width(size: usize) -> usize {
    if size == 0 {
        1
    } else {
        (63 - (size as u64).leading_zeros() as usize) / 8 + 1
    }
}

/// Bytes taken by a NUL-terminated name of `len` bytes.
pub fn name_field_len(len: usize, version: Version) -> usize {
    if version >= Version::V3 {
        len + 1
    } else {
        (len + 8) / 8 * 8
    }
}
