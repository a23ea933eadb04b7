use hdf5_dtype_types::{
    ArrayType, AtomicInfo, ByteOrder, CompoundType, EnumType, FloatType, Normalization,
    OpaqueType, Pad, ReferenceType, Sign, TypeClass, TypeDescriptor, TypeError, TypeKind,
    VarLenKind, VarLenType, Version, MAX_RANK, OPAQUE_TAG_LEN_MAX,
};

use crate::codec::cursor::WriteCursor;
use crate::codec::flags::{self, field, AtomicFlags, FloatFlags};
use crate::codec::{intrinsic_array, opaque_tag_field_len};
use crate::error::{Error, Result};
use crate::version::{member_offset_width, HEADER_SIZE, LEGACY_MAX_RANK};

/// Writes `dtype` and its subtree at the version stored in each node.
///
/// # Panics
///
/// Panics if the tree breaks the layout rules of its own versions: a child with a higher
/// version than its parent, VAX byte order below version 3, or an array node below
/// version 2 that is not a member of a version 1 compound.
pub(crate) fn encode_node(dtype: &TypeDescriptor, cur: &mut WriteCursor) -> Result<()> {
    let start = cur.position();
    cur.write_zeros(HEADER_SIZE)?;
    let version = dtype.version;
    let flags = match &dtype.kind {
        TypeKind::Integer(it) => {
            let mut bits = atomic_flags(&it.atomic, dtype.class())?;
            bits.set(AtomicFlags::SIGNED, it.sign == Sign::TwosComplement);
            write_offset_precision(cur, &it.atomic)?;
            bits.bits()
        }
        TypeKind::Float(ft) => encode_float(cur, ft, version)?,
        TypeKind::Time(tt) => {
            let bits = atomic_flags(&AtomicInfo::new(tt.order, 0, tt.precision), dtype.class())?;
            ensure!(tt.precision <= u16::MAX as usize, "time precision {} too large", tt.precision);
            cur.write_u16(tt.precision as u16)?;
            bits.bits()
        }
        TypeKind::String(st) => {
            let mut flags = 0;
            flags::set(&mut flags, field::STRING_PAD, u32::from(st.pad.code()));
            flags::set(&mut flags, field::STRING_CSET, u32::from(st.cset.code()));
            flags
        }
        TypeKind::Bitfield(bt) => {
            let bits = atomic_flags(&bt.atomic, dtype.class())?;
            write_offset_precision(cur, &bt.atomic)?;
            bits.bits()
        }
        TypeKind::Opaque(ot) => encode_opaque(cur, ot)?,
        TypeKind::Reference(rt) => encode_reference(rt, version)?,
        TypeKind::Compound(ct) => encode_compound(cur, ct, dtype.size, version)?,
        TypeKind::Enum(et) => encode_enum(cur, et, version)?,
        TypeKind::VarLen(vt) => encode_vlen(cur, vt, version)?,
        TypeKind::Array(at) => encode_array(cur, at, version)?,
    };

    ensure!(dtype.size <= u32::MAX as usize, "datatype size {} does not fit in 32 bits", dtype.size);
    let mut header = [0u8; HEADER_SIZE];
    header[0] = dtype.class().code() | version.as_u8() << 4;
    header[1..4].copy_from_slice(&flags.to_le_bytes()[..flags::FLAGS_SIZE]);
    header[4..].copy_from_slice(&(dtype.size as u32).to_le_bytes());
    cur.patch(start, &header)
}

fn check_child(child: &TypeDescriptor, version: Version) {
    assert!(
        child.version <= version,
        "{} datatype of version {} cannot be nested in a version {} datatype",
        child.class(),
        child.version,
        version
    );
}

fn atomic_flags(atomic: &AtomicInfo, class: TypeClass) -> Result<AtomicFlags> {
    let mut bits = AtomicFlags::empty();
    match atomic.order {
        ByteOrder::LittleEndian => {}
        ByteOrder::BigEndian => bits.insert(AtomicFlags::BIG_ENDIAN),
        order => fail!("unsupported byte order for {} datatype: {:?}", class, order),
    }
    bits.set(AtomicFlags::LSB_PAD, atomic.lsb_pad == Pad::One);
    bits.set(AtomicFlags::MSB_PAD, atomic.msb_pad == Pad::One);
    Ok(bits)
}

fn write_offset_precision(cur: &mut WriteCursor, atomic: &AtomicInfo) -> Result<()> {
    ensure!(atomic.offset <= u16::MAX as usize, "bit offset {} too large", atomic.offset);
    ensure!(atomic.precision <= u16::MAX as usize, "precision {} too large", atomic.precision);
    cur.write_u16(atomic.offset as u16)?;
    cur.write_u16(atomic.precision as u16)
}

fn encode_float(cur: &mut WriteCursor, ft: &FloatType, version: Version) -> Result<u32> {
    let mut bits = FloatFlags::empty();
    match ft.atomic.order {
        ByteOrder::LittleEndian => {}
        ByteOrder::BigEndian => bits.insert(FloatFlags::BIG_ENDIAN),
        ByteOrder::Vax => {
            assert!(version >= Version::V3, "VAX byte order requires datatype version 3");
            bits.insert(FloatFlags::BIG_ENDIAN | FloatFlags::VAX);
        }
        ByteOrder::None => fail!("unsupported byte order for floating-point datatype: None"),
    }
    bits.set(FloatFlags::LSB_PAD, ft.atomic.lsb_pad == Pad::One);
    bits.set(FloatFlags::MSB_PAD, ft.atomic.msb_pad == Pad::One);
    bits.set(FloatFlags::INTERNAL_PAD, ft.pad == Pad::One);
    let mut flags = bits.bits();
    let norm = match ft.norm {
        Normalization::None => 0,
        Normalization::MsbSet => 1,
        Normalization::Implied => 2,
    };
    flags::set(&mut flags, field::FLOAT_NORM, norm);
    flags::set(&mut flags, field::FLOAT_SIGN_POS, u32::from(ft.sign_pos));

    write_offset_precision(cur, &ft.atomic)?;
    cur.write_u8(ft.exp_pos)?;
    cur.write_u8(ft.exp_size)?;
    cur.write_u8(ft.mant_pos)?;
    cur.write_u8(ft.mant_size)?;
    cur.write_u32(ft.exp_bias)?;
    Ok(flags)
}

fn encode_opaque(cur: &mut WriteCursor, ot: &OpaqueType) -> Result<u32> {
    let tag = &ot.tag[..];
    let len = opaque_tag_field_len(tag.len());
    ensure!(
        len <= OPAQUE_TAG_LEN_MAX,
        "opaque tag of {} bytes exceeds {} bytes",
        tag.len(),
        OPAQUE_TAG_LEN_MAX
    );
    cur.write_bytes(tag)?;
    cur.write_zeros(len - tag.len())?;
    Ok(len as u32)
}

fn encode_reference(rt: &ReferenceType, version: Version) -> Result<u32> {
    ensure!(
        version >= rt.kind.min_version(),
        "reference kind {:?} requires version {}",
        rt.kind,
        rt.kind.min_version()
    );
    let mut flags = 0;
    flags::set(&mut flags, field::REFERENCE_KIND, u32::from(rt.kind.code()));
    Ok(flags)
}

fn member_count(n: usize, class: TypeClass) -> Result<u32> {
    ensure!(n > 0, Error::InvalidMemberCount(class));
    ensure!(n <= 0xffff, "too many members in {} datatype: {}", class, n);
    Ok(n as u32)
}

fn encode_compound(
    cur: &mut WriteCursor, ct: &CompoundType, size: usize, version: Version,
) -> Result<u32> {
    let flags = member_count(ct.members.len(), TypeClass::Compound)?;
    let width = member_offset_width(size);
    for member in &ct.members {
        check_child(&member.dtype, version);
        cur.write_name(&member.name, version)?;
        if version >= Version::V3 {
            ensure!(
                width >= 8 || (member.offset as u64) >> (8 * width) == 0,
                "offset {} of member \"{}\" does not fit in {} bytes",
                member.offset,
                member.name,
                width
            );
            cur.write_uint(member.offset as u64, width)?;
        } else {
            ensure!(member.offset <= u32::MAX as usize, "member offset {} too large", member.offset);
            cur.write_u32(member.offset as u32)?;
        }
        if version == Version::V1 {
            match intrinsic_array(&member.dtype) {
                Some(at) => {
                    encode_legacy_dims(cur, &at.dims)?;
                    check_child(&at.base, version);
                    encode_node(&at.base, cur)?;
                }
                None => {
                    encode_legacy_dims(cur, &[])?;
                    encode_node(&member.dtype, cur)?;
                }
            }
        } else {
            encode_node(&member.dtype, cur)?;
        }
    }
    Ok(flags)
}

fn encode_legacy_dims(cur: &mut WriteCursor, dims: &[u32]) -> Result<()> {
    assert!(
        dims.len() <= LEGACY_MAX_RANK,
        "array member of rank {} cannot be stored in a version 1 compound",
        dims.len()
    );
    cur.write_u8(dims.len() as u8)?;
    cur.write_zeros(3 + 4 + 4)?;
    for i in 0..LEGACY_MAX_RANK {
        cur.write_u32(dims.get(i).copied().unwrap_or(0))?;
    }
    Ok(())
}

fn encode_enum(cur: &mut WriteCursor, et: &EnumType, version: Version) -> Result<u32> {
    let flags = member_count(et.members.len(), TypeClass::Enum)?;
    check_child(&et.base, version);
    encode_node(&et.base, cur)?;
    for member in &et.members {
        cur.write_name(&member.name, version)?;
    }
    for member in &et.members {
        ensure!(
            member.value.len() == et.base.size,
            TypeError::ValueSize { expected: et.base.size, actual: member.value.len() }
        );
        cur.write_bytes(&member.value)?;
    }
    Ok(flags)
}

fn encode_vlen(cur: &mut WriteCursor, vt: &VarLenType, version: Version) -> Result<u32> {
    let mut flags = 0;
    flags::set(&mut flags, field::VLEN_KIND, u32::from(vt.kind.code()));
    if let VarLenKind::String { pad, cset } = vt.kind {
        flags::set(&mut flags, field::VLEN_PAD, u32::from(pad.code()));
        flags::set(&mut flags, field::VLEN_CSET, u32::from(cset.code()));
    }
    check_child(&vt.base, version);
    encode_node(&vt.base, cur)?;
    Ok(flags)
}

fn encode_array(cur: &mut WriteCursor, at: &ArrayType, version: Version) -> Result<u32> {
    assert!(version >= Version::V2, "array datatype requires version 2");
    let rank = at.rank();
    ensure!((1..=MAX_RANK).contains(&rank), "invalid array rank: {}", rank);
    cur.write_u8(rank as u8)?;
    if version < Version::V3 {
        cur.write_zeros(3)?;
    }
    for &dim in &at.dims {
        cur.write_u32(dim)?;
    }
    if version < Version::V3 {
        for i in 0..rank {
            cur.write_u32(i as u32)?;
        }
    }
    check_child(&at.base, version);
    encode_node(&at.base, cur)?;
    Ok(0)
}

#[cfg(test)]
pub mod tests {
    use super::*;

    use hdf5_dtype_types::{CharacterSet, StringPadding, TypeDescriptor as TD};

    fn encode(dtype: &TD) -> Result<Vec<u8>> {
        let mut buf = vec![0xaa; 4096];
        let n = {
            let mut cur = WriteCursor::new(&mut buf);
            encode_node(dtype, &mut cur)?;
            cur.position()
        };
        buf.truncate(n);
        Ok(buf)
    }

    #[test]
    pub fn test_integer() {
        let buf = encode(&TD::integer(4, ByteOrder::LittleEndian, true)).unwrap();
        assert_eq!(buf, vec![0x10, 0x08, 0, 0, 4, 0, 0, 0, 0, 0, 0x20, 0]);
        let buf = encode(&TD::integer(2, ByteOrder::BigEndian, false)).unwrap();
        assert_eq!(buf, vec![0x10, 0x01, 0, 0, 2, 0, 0, 0, 0, 0, 0x10, 0]);
    }

    #[test]
    pub fn test_unsupported_order() {
        let dt = TD::integer(4, ByteOrder::None, true);
        assert_err!(encode(&dt), "unsupported byte order for integer datatype: None");
        let dt = TD::bitfield(1, ByteOrder::Vax);
        assert_err!(encode(&dt), "unsupported byte order for bit field datatype: Vax");
    }

    #[test]
    pub fn test_float_flags() {
        let buf = encode(&TD::ieee_f32(ByteOrder::BigEndian)).unwrap();
        assert_eq!(&buf[..4], &[0x11, 0x21, 31, 0]);
        assert_eq!(&buf[8..], &[0, 0, 32, 0, 23, 8, 0, 23, 127, 0, 0, 0]);
        let buf = encode(&TD::ieee_f64(ByteOrder::Vax)).unwrap();
        assert_eq!(&buf[..4], &[0x31, 0x61, 63, 0]);
    }

    #[test]
    #[should_panic(expected = "VAX byte order requires datatype version 3")]
    pub fn test_vax_below_v3() {
        let mut dt = TD::ieee_f32(ByteOrder::Vax);
        dt.version = Version::V2;
        let _ = encode(&dt);
    }

    #[test]
    #[should_panic(expected = "cannot be nested in a version 1 datatype")]
    pub fn test_child_above_parent() {
        let vs = TD::vlen_sequence(&TD::ieee_f32(ByteOrder::Vax));
        let mut vs = vs;
        vs.version = Version::V1;
        let _ = encode(&vs);
    }

    #[test]
    pub fn test_string_and_opaque() {
        let s = TD::fixed_string(7, StringPadding::SpacePad, CharacterSet::Utf8);
        assert_eq!(encode(&s).unwrap(), vec![0x13, 0x12, 0, 0, 7, 0, 0, 0]);
        let o = TD::opaque(3, "abcdefghi").unwrap();
        let buf = encode(&o).unwrap();
        assert_eq!(&buf[..2], &[0x15, 16]);
        assert_eq!(&buf[8..], b"abcdefghi\0\0\0\0\0\0\0");
    }

    #[test]
    pub fn test_empty_compound() {
        let dt = TD {
            version: Version::V1,
            size: 4,
            kind: TypeKind::Compound(CompoundType::new()),
        };
        assert_eq!(encode(&dt).unwrap_err(), Error::InvalidMemberCount(TypeClass::Compound));
    }

    #[test]
    pub fn test_buffer_too_short() {
        let dt = TD::ieee_f64(ByteOrder::LittleEndian);
        let mut buf = [0u8; 19];
        let res = encode_node(&dt, &mut WriteCursor::new(&mut buf));
        assert_eq!(res.unwrap_err(), Error::BufferTooShort { needed: 4, available: 3 });
    }
}
