use hdf5_dtype::types::{
    ByteOrder, CompoundMember, CompoundType, EnumMember, EnumType, TypeClass, TypeDescriptor as TD,
    TypeError, TypeKind, Version,
};
use hdf5_dtype::{
    decode, decode_with, encode, encode_as, encode_to_vec, DecodeOptions, Error,
    DEFAULT_MAX_DEPTH,
};

#[macro_use]
mod common;

/// Version 3 compound of the given size holding 4-byte integers at the given offsets.
fn raw_compound(size: u8, members: &[(&str, u8)]) -> Vec<u8> {
    let mut buf = vec![0x36, members.len() as u8, 0, 0, size, 0, 0, 0];
    for &(name, offset) in members {
        buf.extend_from_slice(name.as_bytes());
        buf.extend_from_slice(&[0, offset]);
        buf.extend_from_slice(&int_bytes!(4, 0x08));
    }
    buf
}

#[test]
pub fn test_overlapping_members() {
    let overlap = Error::OverlappingMembers { first: "a".into(), second: "b".into() };
    assert_eq!(decode(&raw_compound(8, &[("a", 0), ("b", 2)])).unwrap_err(), overlap);
    assert_eq!(decode(&raw_compound(8, &[("a", 0), ("b", 3)])).unwrap_err(), overlap);
    // reported in offset order, not storage order
    let swapped = Error::OverlappingMembers { first: "b".into(), second: "a".into() };
    assert_eq!(decode(&raw_compound(8, &[("a", 3), ("b", 0)])).unwrap_err(), swapped);
    assert!(decode(&raw_compound(8, &[("a", 0), ("b", 4)])).is_ok());
    assert_err!(decode(&raw_compound(6, &[("a", 0), ("b", 4)])), "extends past the end");

    // a tree the builder would refuse still encodes, and the decoder catches it
    let int = TD::integer(4, ByteOrder::LittleEndian, true);
    let members = vec![CompoundMember::new("a", 0, int.clone()), CompoundMember::new("b", 3, int)];
    let dt = TD { version: Version::V3, size: 8, kind: TypeKind::Compound(CompoundType { members }) };
    let buf = encode_to_vec(&dt).unwrap();
    assert_eq!(buf, raw_compound(8, &[("a", 0), ("b", 3)]));
    assert_eq!(decode(&buf).unwrap_err(), overlap);
}

#[test]
pub fn test_names_not_utf8() {
    let mut buf = vec![0x36, 1, 0, 0, 4, 0, 0, 0, 0xff, 0, 0];
    buf.extend_from_slice(&int_bytes!(4, 0x08));
    assert_err!(decode(&buf), "name is not valid UTF-8");

    let mut buf = vec![0x38, 1, 0, 0, 1, 0, 0, 0];
    buf.extend_from_slice(&int_bytes!(1, 0x00));
    buf.extend_from_slice(&[b'o', b'k', 0xc3, 0x28, 0, 7]);
    assert_err!(decode(&buf), "name is not valid UTF-8");
    buf[22] = b'!';
    buf[23] = b'!';
    let decoded = decode(&buf).unwrap();
    assert_eq!(encode_to_vec(&decoded.dtype).unwrap(), buf);
}

#[test]
pub fn test_member_count() {
    assert_eq!(
        decode(&[0x36, 0, 0, 0, 8, 0, 0, 0]).unwrap_err(),
        Error::InvalidMemberCount(TypeClass::Compound)
    );
    assert_eq!(
        decode(&[0x38, 0, 0, 0, 1, 0, 0, 0]).unwrap_err(),
        Error::InvalidMemberCount(TypeClass::Enum)
    );
    let empty = TD { version: Version::V1, size: 4, kind: TypeKind::Compound(CompoundType::new()) };
    let mut buf = vec![0; 64];
    assert_eq!(encode(&empty, &mut buf).unwrap_err(), Error::InvalidMemberCount(TypeClass::Compound));
}

#[test]
pub fn test_float_order_bits() {
    let mut buf = vec![0x31, 0x20, 31, 0, 4, 0, 0, 0, 0, 0, 32, 0, 23, 8, 0, 23, 127, 0, 0, 0];
    assert_eq!(decode(&buf).unwrap().dtype.atomic().unwrap().order, ByteOrder::LittleEndian);
    buf[1] = 0x60;
    assert_err!(decode(&buf), "malformed floating-point type");
    buf[1] = 0x61;
    let decoded = decode(&buf).unwrap();
    assert_eq!(decoded.dtype.version, Version::V3);
    assert_eq!(decoded.dtype.atomic().unwrap().order, ByteOrder::Vax);
    // reserved before version 3
    buf[0] = 0x21;
    assert_eq!(decode(&buf).unwrap().dtype.atomic().unwrap().order, ByteOrder::BigEndian);
}

#[test]
pub fn test_truncation() {
    let mut et = EnumType::new(&TD::integer(2, ByteOrder::BigEndian, false)).unwrap();
    et.insert_value("ONE", 1).unwrap();
    et.insert_value("TWO", 2).unwrap();
    let mut ct = CompoundType::new();
    ct.append("long member name", &TD::enumeration(et).unwrap()).unwrap();
    ct.append("tag", &TD::opaque(2, "abc").unwrap()).unwrap();
    ct.append("arr", &TD::array(&TD::ieee_f64(ByteOrder::BigEndian), &[3]).unwrap()).unwrap();
    let dt = TD::compound(64, ct).unwrap();

    for &version in &[Version::V2, Version::V3] {
        let buf = encode_as(&dt, version).unwrap();
        assert!(decode(&buf).is_ok());
        for len in 0..buf.len() {
            match decode(&buf[..len]) {
                Err(Error::BufferTooShort { .. }) => {}
                res => panic!("expected truncation error at {} of {}: {:?}", len, buf.len(), res),
            }
        }
    }
}

#[test]
pub fn test_header_errors() {
    assert_eq!(decode(&[0x1b, 0, 0, 0, 1, 0, 0, 0]).unwrap_err(), Error::UnsupportedClass(11));
    assert_eq!(decode(&[0x1f, 0, 0, 0, 1, 0, 0, 0]).unwrap_err(), Error::UnsupportedClass(15));
    assert_eq!(
        decode(&[0x00, 0, 0, 0, 1, 0, 0, 0]).unwrap_err(),
        Error::BadVersion { class: None, version: 0 }
    );
    assert_err!(decode(&[0x70, 0, 0, 0, 1, 0, 0, 0]), "bad version number for datatype message: 7");
    assert_eq!(decode(&[]).unwrap_err(), Error::BufferTooShort { needed: 1, available: 0 });
}

#[test]
pub fn test_recursion_limit() {
    let mut buf = Vec::new();
    for _ in 0..100_000 {
        buf.extend_from_slice(&[0x3a, 0, 0, 0, 4, 0, 0, 0, 1, 1, 0, 0, 0]);
    }
    buf.extend_from_slice(&int_bytes!(4, 0x08));
    assert_eq!(decode(&buf).unwrap_err(), Error::RecursionLimitExceeded(DEFAULT_MAX_DEPTH));

    // exactly at the limit
    let start = buf.len() - 12 - 13 * DEFAULT_MAX_DEPTH;
    let decoded = decode(&buf[start..]).unwrap();
    assert_eq!(decoded.consumed, buf.len() - start);
    assert_eq!(decoded.dtype.node_count(), DEFAULT_MAX_DEPTH + 1);
    assert_eq!(
        decode(&buf[start - 13..]).unwrap_err(),
        Error::RecursionLimitExceeded(DEFAULT_MAX_DEPTH)
    );

    let options = DecodeOptions::build().max_depth(5).finish();
    let tail = &buf[buf.len() - 12 - 13 * 6..];
    assert_eq!(decode_with(tail, &options).unwrap_err(), Error::RecursionLimitExceeded(5));
}

/// Version 1 compound holding a single member of the given encoded type.
fn legacy_compound(size: u8, member: &[u8]) -> Vec<u8> {
    let mut buf = vec![0x16, 1, 0, 0, size, 0, 0, 0];
    buf.extend_from_slice(b"m\0\0\0\0\0\0\0");
    buf.extend_from_slice(&[0; 4 + 28]);
    buf.extend_from_slice(member);
    buf
}

#[test]
pub fn test_strict_versions() {
    let buf = legacy_compound(8, &[0x47, 0x02, 0, 0, 8, 0, 0, 0]);
    let decoded = decode(&buf).unwrap();
    assert!(decoded.dirty);
    assert_eq!(decoded.dtype.version, Version::V4);

    let strict = DecodeOptions::build().strict(true).finish();
    assert_eq!(
        decode_with(&buf, &strict).unwrap_err(),
        Error::IncompatibleVersion {
            class: TypeClass::Compound,
            stored: Version::V1,
            required: Version::V4
        }
    );
    let plain = legacy_compound(4, &int_bytes!(4, 0x00));
    assert!(!decode_with(&plain, &strict).unwrap().dirty);
}

#[test]
pub fn test_legacy_rank() {
    let mut buf = legacy_compound(4, &int_bytes!(4, 0x00));
    buf[8 + 8 + 4] = 5;
    assert_err!(decode(&buf), "compound member rank 5 exceeds 4");
}

#[test]
pub fn test_encode_errors() {
    let mut et = EnumType::new(&TD::integer(2, ByteOrder::LittleEndian, true)).unwrap();
    et.insert_value("A", 0).unwrap();
    let mut dt = TD::enumeration(et).unwrap();
    if let TypeKind::Enum(et) = &mut dt.kind {
        et.members.push(EnumMember { name: "B".into(), value: vec![1] });
    }
    assert_eq!(
        encode_to_vec(&dt).unwrap_err(),
        Error::Type(TypeError::ValueSize { expected: 2, actual: 1 })
    );

    let member = CompoundMember::new("far", 300, TD::integer(1, ByteOrder::LittleEndian, false));
    let dt = TD {
        version: Version::V3,
        size: 4,
        kind: TypeKind::Compound(CompoundType { members: vec![member] }),
    };
    assert_err!(encode_to_vec(&dt), "offset 300 of member \"far\" does not fit in 1 bytes");

    let mut buf = [0; 11];
    assert_eq!(
        encode(&TD::integer(4, ByteOrder::LittleEndian, true), &mut buf).unwrap_err(),
        Error::BufferTooShort { needed: 2, available: 1 }
    );
}
