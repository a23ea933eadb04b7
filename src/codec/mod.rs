//! Encoding and decoding of datatype messages.

use log::trace;

use hdf5_dtype_types::{ArrayType, TypeDescriptor, TypeKind, Version};

use crate::error::Result;
use crate::options::DecodeOptions;
use crate::version::with_version;

pub mod cursor;
mod decode;
mod encode;
mod flags;
mod size;

pub use self::cursor::{ReadCursor, WriteCursor};
pub use self::size::encoded_size;

/// Result of decoding a datatype message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoded {
    pub dtype: TypeDescriptor,
    /// Set if the tree was raised above its stored versions and should be re-encoded.
    pub dirty: bool,
    /// Number of bytes taken from the buffer.
    pub consumed: usize,
}

/// Decodes a datatype message from the start of `buf` with default options.
pub fn decode(buf: &[u8]) -> Result<Decoded> {
    decode_with(buf, &DecodeOptions::default())
}

/// Decodes a datatype message from the start of `buf`.
///
/// Trailing bytes are left alone; `consumed` tells where the message ends.
pub fn decode_with(buf: &[u8], options: &DecodeOptions) -> Result<Decoded> {
    let mut cur = ReadCursor::new(buf);
    let (dtype, dirty) = decode_from(&mut cur, options)?;
    Ok(Decoded { dtype, dirty, consumed: cur.position() })
}

/// Decodes one datatype message at the cursor, advancing it past the message.
///
/// Returns the descriptor and whether it was upgraded while decoding.
pub fn decode_from(
    cur: &mut ReadCursor, options: &DecodeOptions,
) -> Result<(TypeDescriptor, bool)> {
    let start = cur.position();
    let (dtype, dirty) = decode::decode_node(cur, options, 0)?;
    trace!(
        "decoded {} datatype (version {}) from {} bytes{}",
        dtype.class(),
        dtype.version,
        cur.position() - start,
        if dirty { ", upgraded" } else { "" }
    );
    Ok((dtype, dirty))
}

/// Writes `dtype` at the cursor using the versions stored in the tree.
///
/// # Panics
///
/// Panics if a node's version is lower than one of its children's, if a VAX float is
/// stored below version 3, or if an array is stored below version 2 anywhere except as a
/// member of a version 1 compound.
pub fn encode_into(dtype: &TypeDescriptor, cur: &mut WriteCursor) -> Result<()> {
    let start = cur.position();
    encode::encode_node(dtype, cur)?;
    trace!(
        "encoded {} datatype (version {}) into {} bytes",
        dtype.class(),
        dtype.version,
        cur.position() - start
    );
    Ok(())
}

/// Writes `dtype` to the start of `buf` and returns the number of bytes written.
pub fn encode(dtype: &TypeDescriptor, buf: &mut [u8]) -> Result<usize> {
    let mut cur = WriteCursor::new(buf);
    encode_into(dtype, &mut cur)?;
    Ok(cur.position())
}

/// Encodes `dtype` into a buffer of exactly [`encoded_size`] bytes.
pub fn encode_to_vec(dtype: &TypeDescriptor) -> Result<Vec<u8>> {
    let mut buf = vec![0; encoded_size(dtype)];
    let n = encode(dtype, &mut buf)?;
    debug_assert_eq!(n, buf.len());
    Ok(buf)
}

/// Encodes `dtype` laid out for `version`; see [`with_version`].
pub fn encode_as(dtype: &TypeDescriptor, version: Version) -> Result<Vec<u8>> {
    encode_to_vec(&with_version(dtype, version)?)
}

/// An array stored in the intrinsic form of version 1 compound members.
pub(crate) fn intrinsic_array(dtype: &TypeDescriptor) -> Option<&ArrayType> {
    match &dtype.kind {
        TypeKind::Array(at) if dtype.version == Version::V1 => Some(at),
        _ => None,
    }
}

/// Bytes taken by an opaque tag: NUL-padded to a multiple of eight.
pub(crate) fn opaque_tag_field_len(len: usize) -> usize {
    (len + 7) & !7
}

#[cfg(test)]
pub mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use hdf5_dtype_types::{
        ByteOrder, CharacterSet, CompoundType, EnumType, ReferenceKind, StringPadding,
        TypeDescriptor as TD,
    };

    use crate::error::Error;

    fn sample() -> TD {
        let i = TD::integer(4, ByteOrder::LittleEndian, true);
        let mut et = EnumType::new(&TD::integer(1, ByteOrder::BigEndian, false)).unwrap();
        et.insert_value("RED", 0).unwrap();
        et.insert_value("GREEN", 1).unwrap();
        let e = TD::enumeration(et).unwrap();
        let mut ct = CompoundType::new();
        ct.append("id", &i).unwrap();
        ct.append("color", &e).unwrap();
        ct.append("xy", &TD::array(&TD::ieee_f32(ByteOrder::LittleEndian), &[2]).unwrap()).unwrap();
        ct.append("name", &TD::vlen_string(StringPadding::NullTerm, CharacterSet::Utf8)).unwrap();
        TD::compound(32, ct).unwrap()
    }

    #[test]
    pub fn test_roundtrip_all_versions() {
        let dt = sample();
        assert_eq!(dt.version, Version::V2);
        for version in Version::all().filter(|&v| v >= Version::V2) {
            let expected = with_version(&dt, version).unwrap();
            let buf = encode_as(&dt, version).unwrap();
            assert_eq!(buf.len(), encoded_size(&expected));
            let decoded = decode(&buf).unwrap();
            assert!(!decoded.dirty);
            assert_eq!(decoded.consumed, buf.len());
            assert_eq!(decoded.dtype, expected);
        }
        assert_eq!(
            encode_as(&dt, Version::V1).unwrap_err(),
            Error::IncompatibleVersion {
                class: hdf5_dtype_types::TypeClass::Compound,
                stored: Version::V1,
                required: Version::V2
            }
        );
    }

    #[test]
    pub fn test_trailing_bytes() {
        let mut buf = encode_to_vec(&TD::reference(8, ReferenceKind::Object)).unwrap();
        buf.extend_from_slice(&[1, 2, 3]);
        let decoded = decode(&buf).unwrap();
        assert_eq!(decoded.consumed, 8);
        assert_eq!(decoded.dtype, TD::reference(8, ReferenceKind::Object));
    }

    #[test]
    pub fn test_encode_short_buffer() {
        let dt = sample();
        let mut buf = vec![0; encoded_size(&dt) - 1];
        assert_err!(encode(&dt, &mut buf), "buffer too short");
    }

    #[test]
    pub fn test_cursor_sequence() {
        let a = TD::integer(8, ByteOrder::BigEndian, false);
        let b = TD::ieee_f64(ByteOrder::LittleEndian);
        let mut buf = vec![0; encoded_size(&a) + encoded_size(&b)];
        {
            let mut cur = WriteCursor::new(&mut buf);
            encode_into(&a, &mut cur).unwrap();
            encode_into(&b, &mut cur).unwrap();
            assert_eq!(cur.remaining(), 0);
        }
        let mut cur = ReadCursor::new(&buf);
        let options = DecodeOptions::default();
        assert_eq!(decode_from(&mut cur, &options).unwrap(), (a, false));
        assert_eq!(decode_from(&mut cur, &options).unwrap(), (b, false));
        assert_eq!(cur.remaining(), 0);
    }

    #[test]
    pub fn test_opaque_tag_field_len() {
        let lens: Vec<_> = [0, 1, 7, 8, 9, 248].iter().map(|&n| opaque_tag_field_len(n)).collect();
        assert_eq!(lens, vec![0, 8, 8, 8, 16, 248]);
    }
}
