use hdf5_dtype_types::{TypeDescriptor, TypeKind, Version};

use crate::codec::{intrinsic_array, opaque_tag_field_len};
use crate::version::{
    member_offset_width, name_field_len, HEADER_SIZE, LEGACY_DIMS_BLOCK_SIZE,
};

/// Offset and precision.
const ATOMIC_PAYLOAD_SIZE: usize = 2 + 2;
/// Offset, precision, exponent and mantissa fields, exponent bias.
const FLOAT_PAYLOAD_SIZE: usize = 2 + 2 + 1 + 1 + 1 + 1 + 4;
const TIME_PAYLOAD_SIZE: usize = 2;

/// Number of bytes [`encode`](crate::encode) writes for `dtype`.
pub fn encoded_size(dtype: &TypeDescriptor) -> usize {
    let version = dtype.version;
    HEADER_SIZE
        + match &dtype.kind {
            TypeKind::Integer(_) | TypeKind::Bitfield(_) => ATOMIC_PAYLOAD_SIZE,
            TypeKind::Float(_) => FLOAT_PAYLOAD_SIZE,
            TypeKind::Time(_) => TIME_PAYLOAD_SIZE,
            TypeKind::String(_) | TypeKind::Reference(_) => 0,
            TypeKind::Opaque(ot) => opaque_tag_field_len(ot.tag.len()),
            TypeKind::Compound(ct) => {
                let offset_width =
                    if version >= Version::V3 { member_offset_width(dtype.size) } else { 4 };
                ct.members
                    .iter()
                    .map(|m| {
                        let member = if version == Version::V1 {
                            let base = intrinsic_array(&m.dtype).map_or(&m.dtype, |at| &*at.base);
                            LEGACY_DIMS_BLOCK_SIZE + encoded_size(base)
                        } else {
                            encoded_size(&m.dtype)
                        };
                        name_field_len(m.name.len(), version) + offset_width + member
                    })
                    .sum()
            }
            TypeKind::Enum(et) => {
                let names: usize =
                    et.members.iter().map(|m| name_field_len(m.name.len(), version)).sum();
                encoded_size(&et.base) + names + et.members.len() * et.base.size
            }
            TypeKind::VarLen(vt) => encoded_size(&vt.base),
            TypeKind::Array(at) => {
                let rank = at.rank();
                let legacy = if version < Version::V3 { 3 + 4 * rank } else { 0 };
                1 + 4 * rank + legacy + encoded_size(&at.base)
            }
        }
}
