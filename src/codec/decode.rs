use log::{debug, warn};

use hdf5_dtype_types::{
    bits, ArrayType, AtomicInfo, BitfieldType, ByteOrder, CharacterSet, CompoundMember,
    CompoundType, EnumMember, EnumType, FloatType, IntegerType, Location, Normalization,
    OpaqueType, Pad, ReferenceKind, ReferenceType, Sign, StringPadding, StringType, TimeType,
    TypeClass, TypeDescriptor, TypeKind, VarLenKind, VarLenType, Version, MAX_RANK,
};

use crate::codec::cursor::ReadCursor;
use crate::codec::flags::{self, field, AtomicFlags, FloatFlags};
use crate::error::{Error, Result};
use crate::options::DecodeOptions;
use crate::version::{
    can_upgrade_in_place, member_offset_width, upgrade_version, LEGACY_MAX_RANK,
};

/// Common header of every encoded datatype.
#[derive(Clone, Copy, Debug)]
struct Header {
    class: TypeClass,
    version: Version,
    flags: u32,
    size: usize,
}

fn read_header(cur: &mut ReadCursor) -> Result<Header> {
    let byte = [cur.read_u8()?];
    let version = bits::get_as_integer(&byte, 4, 4) as u8;
    let code = bits::get_as_integer(&byte, 0, 4) as u8;
    let version = Version::from_u8(version).ok_or(Error::BadVersion { class: None, version })?;
    let class = TypeClass::from_code(code).ok_or(Error::UnsupportedClass(code))?;
    let flags = cur.read_uint(flags::FLAGS_SIZE)? as u32;
    let size = cur.read_u32()? as usize;
    Ok(Header { class, version, flags, size })
}

fn reserve<T>(n: usize) -> Result<Vec<T>> {
    let mut vec = Vec::new();
    vec.try_reserve_exact(n).map_err(|_| Error::OutOfMemory)?;
    Ok(vec)
}

/// Decodes one datatype and its whole subtree at nesting level `depth`.
///
/// The flag returned next to the node is set if the node or anything below it had to be
/// raised above its stored version.
pub(crate) fn decode_node(
    cur: &mut ReadCursor, options: &DecodeOptions, depth: usize,
) -> Result<(TypeDescriptor, bool)> {
    ensure!(depth <= options.max_depth(), Error::RecursionLimitExceeded(options.max_depth()));
    let header = read_header(cur)?;
    let (flags, version) = (header.flags, header.version);

    let mut upgraded = false;
    let kind = match header.class {
        TypeClass::Integer => TypeKind::Integer(decode_integer(cur, flags)?),
        TypeClass::Float => TypeKind::Float(decode_float(cur, flags, version)?),
        TypeClass::Time => TypeKind::Time(decode_time(cur, flags)?),
        TypeClass::String => TypeKind::String(decode_string(flags)),
        TypeClass::Bitfield => TypeKind::Bitfield(decode_bitfield(cur, flags)?),
        TypeClass::Opaque => TypeKind::Opaque(decode_opaque(cur, flags)?),
        TypeClass::Reference => TypeKind::Reference(decode_reference(flags)?),
        TypeClass::Compound => {
            let (ct, up) = decode_compound(cur, &header, options, depth)?;
            upgraded |= up;
            TypeKind::Compound(ct)
        }
        TypeClass::Enum => {
            let (et, up) = decode_enum(cur, &header, options, depth)?;
            upgraded |= up;
            TypeKind::Enum(et)
        }
        TypeClass::VarLen => {
            let (vt, up) = decode_vlen(cur, flags, options, depth)?;
            upgraded |= up;
            TypeKind::VarLen(vt)
        }
        TypeClass::Array => {
            let (at, up) = decode_array(cur, version, options, depth)?;
            upgraded |= up;
            TypeKind::Array(at)
        }
    };

    let mut dtype = TypeDescriptor { version, size: header.size, kind };
    let required = dtype
        .children()
        .into_iter()
        .map(|child| child.version)
        .fold(dtype.kind.min_version(), Ord::max);
    upgraded |= settle_version(&mut dtype, required, options)?;
    Ok((dtype, upgraded))
}

/// Raises `dtype` to `required` unless the decode is strict, in which case the version
/// mismatch is an error. Returns whether the node was upgraded.
fn settle_version(
    dtype: &mut TypeDescriptor, required: Version, options: &DecodeOptions,
) -> Result<bool> {
    if dtype.version >= required {
        return Ok(false);
    }
    ensure!(
        can_upgrade_in_place(dtype, required, options),
        Error::IncompatibleVersion { class: dtype.class(), stored: dtype.version, required }
    );
    debug!("upgrading {} datatype from version {} to {}", dtype.class(), dtype.version, required);
    upgrade_version(dtype, required);
    Ok(true)
}

fn order_of(big_endian: bool) -> ByteOrder {
    if big_endian {
        ByteOrder::BigEndian
    } else {
        ByteOrder::LittleEndian
    }
}

fn pad_of(one: bool) -> Pad {
    if one {
        Pad::One
    } else {
        Pad::Zero
    }
}

fn decode_atomic(cur: &mut ReadCursor, flags: AtomicFlags) -> Result<AtomicInfo> {
    let order = order_of(flags.contains(AtomicFlags::BIG_ENDIAN));
    let offset = cur.read_u16()? as usize;
    let precision = cur.read_u16()? as usize;
    Ok(AtomicInfo {
        order,
        offset,
        precision,
        lsb_pad: pad_of(flags.contains(AtomicFlags::LSB_PAD)),
        msb_pad: pad_of(flags.contains(AtomicFlags::MSB_PAD)),
    })
}

fn decode_integer(cur: &mut ReadCursor, flags: u32) -> Result<IntegerType> {
    let flags = AtomicFlags::from_bits_truncate(flags);
    let atomic = decode_atomic(cur, flags)?;
    let sign = if flags.contains(AtomicFlags::SIGNED) { Sign::TwosComplement } else { Sign::None };
    Ok(IntegerType { atomic, sign })
}

fn decode_bitfield(cur: &mut ReadCursor, flags: u32) -> Result<BitfieldType> {
    let flags = AtomicFlags::from_bits_truncate(flags) - AtomicFlags::SIGNED;
    Ok(BitfieldType { atomic: decode_atomic(cur, flags)? })
}

fn decode_float(cur: &mut ReadCursor, flags: u32, version: Version) -> Result<FloatType> {
    let ff = FloatFlags::from_bits_truncate(flags);
    // bit 6 is reserved before version 3
    let order = if version >= Version::V3 && ff.contains(FloatFlags::VAX) {
        ensure!(
            ff.contains(FloatFlags::BIG_ENDIAN),
            Error::MalformedFloatEncoding("VAX order marker without the byte order bit")
        );
        ByteOrder::Vax
    } else {
        order_of(ff.contains(FloatFlags::BIG_ENDIAN))
    };
    let norm = match flags::get(flags, field::FLOAT_NORM) {
        0 => Normalization::None,
        1 => Normalization::MsbSet,
        2 => Normalization::Implied,
        _ => fail!(Error::MalformedFloatEncoding("unknown mantissa normalization")),
    };
    let sign_pos = flags::get(flags, field::FLOAT_SIGN_POS) as u8;

    let offset = cur.read_u16()? as usize;
    let precision = cur.read_u16()? as usize;
    let exp_pos = cur.read_u8()?;
    let exp_size = cur.read_u8()?;
    let mant_pos = cur.read_u8()?;
    let mant_size = cur.read_u8()?;
    let exp_bias = cur.read_u32()?;
    ensure!(exp_size > 0, Error::MalformedFloatEncoding("exponent size is zero"));
    ensure!(mant_size > 0, Error::MalformedFloatEncoding("mantissa size is zero"));

    Ok(FloatType {
        atomic: AtomicInfo {
            order,
            offset,
            precision,
            lsb_pad: pad_of(ff.contains(FloatFlags::LSB_PAD)),
            msb_pad: pad_of(ff.contains(FloatFlags::MSB_PAD)),
        },
        sign_pos,
        exp_pos,
        exp_size,
        mant_pos,
        mant_size,
        exp_bias,
        norm,
        pad: pad_of(ff.contains(FloatFlags::INTERNAL_PAD)),
    })
}

fn decode_time(cur: &mut ReadCursor, flags: u32) -> Result<TimeType> {
    let order = order_of(AtomicFlags::from_bits_truncate(flags).contains(AtomicFlags::BIG_ENDIAN));
    let precision = cur.read_u16()? as usize;
    Ok(TimeType { order, precision })
}

fn decode_string(flags: u32) -> StringType {
    StringType {
        pad: StringPadding::from_code(flags::get(flags, field::STRING_PAD) as u8),
        cset: CharacterSet::from_code(flags::get(flags, field::STRING_CSET) as u8),
    }
}

fn decode_opaque(cur: &mut ReadCursor, flags: u32) -> Result<OpaqueType> {
    let len = flags::get(flags, field::OPAQUE_TAG_LEN) as usize;
    ensure!(len % 8 == 0, Error::Malformed(format!("opaque tag length {} is not aligned", len)));
    let raw = cur.read_bytes(len)?;
    let tag = raw.iter().position(|&c| c == 0).map_or(raw, |end| &raw[..end]);
    Ok(OpaqueType { tag: tag.to_vec() })
}

fn decode_reference(flags: u32) -> Result<ReferenceType> {
    let code = flags::get(flags, field::REFERENCE_KIND) as u8;
    let kind = ReferenceKind::from_code(code)
        .ok_or_else(|| Error::Malformed(format!("unknown reference kind: {}", code)))?;
    Ok(ReferenceType { kind, location: Location::Undefined })
}

fn member_count(flags: u32, class: TypeClass) -> Result<usize> {
    let n = flags::get(flags, field::MEMBER_COUNT) as usize;
    ensure!(n > 0, Error::InvalidMemberCount(class));
    Ok(n)
}

/// Dimensions of a version 1 compound member; empty if the member is not an array.
fn decode_legacy_dims(cur: &mut ReadCursor) -> Result<Vec<u32>> {
    let rank = cur.read_u8()? as usize;
    ensure!(
        rank <= LEGACY_MAX_RANK,
        Error::Malformed(format!("compound member rank {} exceeds {}", rank, LEGACY_MAX_RANK))
    );
    cur.skip(3 + 4 + 4)?;
    let mut dims = reserve(rank)?;
    for i in 0..LEGACY_MAX_RANK {
        let dim = cur.read_u32()?;
        if i < rank {
            dims.push(dim);
        }
    }
    Ok(dims)
}

/// Turns a version 1 member with dimensions into an array node. Dimensions are taken as
/// stored, the same way `decode_array` takes them.
fn wrap_legacy_array(
    base: TypeDescriptor, dims: Vec<u32>, options: &DecodeOptions,
) -> Result<TypeDescriptor> {
    let size = dims
        .iter()
        .try_fold(base.size, |n, &d| n.checked_mul(d as usize))
        .ok_or_else(|| Error::Malformed(format!("array member of {} is too large", base)))?;
    let version = if options.strict() { base.version } else { base.version.max(Version::V2) };
    let kind = TypeKind::Array(ArrayType { base: Box::new(base), dims });
    let array = TypeDescriptor { version, size, kind };
    if options.strict() {
        warn!("keeping version 1 array member {} in strict mode", array);
    }
    Ok(array)
}

fn decode_compound(
    cur: &mut ReadCursor, header: &Header, options: &DecodeOptions, depth: usize,
) -> Result<(CompoundType, bool)> {
    let n = member_count(header.flags, TypeClass::Compound)?;
    let version = header.version;
    let mut members = reserve(n.min(cur.remaining()))?;
    let mut upgraded = false;
    for _ in 0..n {
        let name = cur.read_name(version)?;
        let offset = if version >= Version::V3 {
            cur.read_uint(member_offset_width(header.size))? as usize
        } else {
            cur.read_u32()? as usize
        };
        let dims = if version == Version::V1 { decode_legacy_dims(cur)? } else { vec![] };
        let (mut dtype, up) = decode_node(cur, options, depth + 1)?;
        upgraded |= up;
        if !dims.is_empty() {
            dtype = wrap_legacy_array(dtype, dims, options)?;
        }
        members.push(CompoundMember { name, offset, dtype });
    }

    if let Some((i, j)) = CompoundType::find_overlap(&members) {
        fail!(Error::OverlappingMembers {
            first: members[i].name.clone(),
            second: members[j].name.clone(),
        });
    }
    if let Some(member) = members.iter().find(|m| m.end() > header.size) {
        fail!(Error::Malformed(format!(
            "member \"{}\" extends past the end of a {}-byte compound",
            member.name, header.size
        )));
    }
    Ok((CompoundType { members }, upgraded))
}

fn decode_enum(
    cur: &mut ReadCursor, header: &Header, options: &DecodeOptions, depth: usize,
) -> Result<(EnumType, bool)> {
    let n = member_count(header.flags, TypeClass::Enum)?;
    let (base, upgraded) = decode_node(cur, options, depth + 1)?;
    let mut names = reserve(n.min(cur.remaining()))?;
    for _ in 0..n {
        names.push(cur.read_name(header.version)?);
    }
    let width = base.size;
    let total = n.checked_mul(width).ok_or(Error::OutOfMemory)?;
    let raw = cur.read_bytes(total)?;
    let mut members = reserve(n)?;
    for (i, name) in names.into_iter().enumerate() {
        let value = raw[i * width..(i + 1) * width].to_vec();
        members.push(EnumMember { name, value });
    }
    Ok((EnumType { base: Box::new(base), members }, upgraded))
}

fn decode_vlen(
    cur: &mut ReadCursor, flags: u32, options: &DecodeOptions, depth: usize,
) -> Result<(VarLenType, bool)> {
    let kind = match flags::get(flags, field::VLEN_KIND) {
        0 => VarLenKind::Sequence,
        1 => VarLenKind::String {
            pad: StringPadding::from_code(flags::get(flags, field::VLEN_PAD) as u8),
            cset: CharacterSet::from_code(flags::get(flags, field::VLEN_CSET) as u8),
        },
        code => fail!(Error::Malformed(format!("unknown variable-length kind: {}", code))),
    };
    let (base, upgraded) = decode_node(cur, options, depth + 1)?;
    let vlen = VarLenType { kind, base: Box::new(base), location: Location::Undefined };
    Ok((vlen, upgraded))
}

fn decode_array(
    cur: &mut ReadCursor, version: Version, options: &DecodeOptions, depth: usize,
) -> Result<(ArrayType, bool)> {
    ensure!(
        version >= Version::V2,
        Error::BadVersion { class: Some(TypeClass::Array), version: version.as_u8() }
    );
    let rank = cur.read_u8()? as usize;
    ensure!(
        (1..=MAX_RANK).contains(&rank),
        Error::Malformed(format!("invalid array rank: {}", rank))
    );
    if version < Version::V3 {
        cur.skip(3)?;
    }
    let mut dims = reserve(rank)?;
    for _ in 0..rank {
        dims.push(cur.read_u32()?);
    }
    if version < Version::V3 {
        // permutation indices, never used
        cur.skip(4 * rank)?;
    }
    let (base, upgraded) = decode_node(cur, options, depth + 1)?;
    Ok((ArrayType { base: Box::new(base), dims }, upgraded))
}
