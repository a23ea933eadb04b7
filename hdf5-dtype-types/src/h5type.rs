use std::borrow::Cow;
use std::fmt::{self, Display};

use crate::array::{ArrayType, VarLenKind, VarLenType};
use crate::compound::{CompoundType, EnumType};
use crate::error::TypeError;
use crate::string::ascii_tag;

/// Datatype message format version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Version {
    V1 = 1,
    V2 = 2,
    V3 = 3,
    V4 = 4,
}

impl Version {
    pub const EARLIEST: Self = Version::V1;
    pub const LATEST: Self = Version::V4;

    pub fn from_u8(version: u8) -> Option<Self> {
        match version {
            1 => Some(Version::V1),
            2 => Some(Version::V2),
            3 => Some(Version::V3),
            4 => Some(Version::V4),
            _ => None,
        }
    }

    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (1..=4).filter_map(Version::from_u8)
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// The eleven datatype classes, numbered as in the message header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeClass {
    Integer = 0,
    Float = 1,
    Time = 2,
    String = 3,
    Bitfield = 4,
    Opaque = 5,
    Compound = 6,
    Reference = 7,
    Enum = 8,
    VarLen = 9,
    Array = 10,
}

impl TypeClass {
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => TypeClass::Integer,
            1 => TypeClass::Float,
            2 => TypeClass::Time,
            3 => TypeClass::String,
            4 => TypeClass::Bitfield,
            5 => TypeClass::Opaque,
            6 => TypeClass::Compound,
            7 => TypeClass::Reference,
            8 => TypeClass::Enum,
            9 => TypeClass::VarLen,
            10 => TypeClass::Array,
            _ => return None,
        })
    }

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Human-readable class name.
    pub fn name(self) -> &'static str {
        match self {
            TypeClass::Integer => "integer",
            TypeClass::Float => "floating-point",
            TypeClass::Time => "date and time",
            TypeClass::String => "text string",
            TypeClass::Bitfield => "bit field",
            TypeClass::Opaque => "opaque",
            TypeClass::Compound => "compound",
            TypeClass::Reference => "reference",
            TypeClass::Enum => "enum",
            TypeClass::VarLen => "vlen",
            TypeClass::Array => "array",
        }
    }
}

impl Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
    Vax,
    None,
}

impl ByteOrder {
    #[cfg(target_endian = "little")]
    pub const NATIVE: Self = ByteOrder::LittleEndian;
    #[cfg(target_endian = "big")]
    pub const NATIVE: Self = ByteOrder::BigEndian;
}

/// Value of padding bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pad {
    Zero,
    One,
}

impl Default for Pad {
    fn default() -> Self {
        Pad::Zero
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sign {
    None,
    TwosComplement,
}

/// Mantissa normalization of a floating-point type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Normalization {
    None,
    MsbSet,
    Implied,
}

/// Padding of fixed-length strings, stored in a 4-bit field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StringPadding {
    NullTerm,
    NullPad,
    SpacePad,
    Reserved(u8),
}

impl StringPadding {
    pub fn from_code(code: u8) -> Self {
        match code & 0x0f {
            0 => StringPadding::NullTerm,
            1 => StringPadding::NullPad,
            2 => StringPadding::SpacePad,
            code => StringPadding::Reserved(code),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            StringPadding::NullTerm => 0,
            StringPadding::NullPad => 1,
            StringPadding::SpacePad => 2,
            StringPadding::Reserved(code) => code & 0x0f,
        }
    }
}

/// Character set of string data, stored in a 4-bit field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CharacterSet {
    Ascii,
    Utf8,
    Reserved(u8),
}

impl CharacterSet {
    pub fn from_code(code: u8) -> Self {
        match code & 0x0f {
            0 => CharacterSet::Ascii,
            1 => CharacterSet::Utf8,
            code => CharacterSet::Reserved(code),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            CharacterSet::Ascii => 0,
            CharacterSet::Utf8 => 1,
            CharacterSet::Reserved(code) => code & 0x0f,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Object = 0,
    DatasetRegion = 1,
    Object2 = 2,
    DatasetRegion2 = 3,
    Attribute = 4,
}

impl ReferenceKind {
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => ReferenceKind::Object,
            1 => ReferenceKind::DatasetRegion,
            2 => ReferenceKind::Object2,
            3 => ReferenceKind::DatasetRegion2,
            4 => ReferenceKind::Attribute,
            _ => return None,
        })
    }

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Lowest message version able to carry this kind.
    pub fn min_version(self) -> Version {
        match self {
            ReferenceKind::Object | ReferenceKind::DatasetRegion => Version::V1,
            _ => Version::V4,
        }
    }
}

/// Where instances of a variable-length or reference type live; not part of the message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Location {
    Undefined,
    Memory,
    Disk,
}

impl Default for Location {
    fn default() -> Self {
        Location::Undefined
    }
}

/// Fields shared by all atomic types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AtomicInfo {
    pub order: ByteOrder,
    /// Bit offset of the first significant bit.
    pub offset: usize,
    /// Number of significant bits.
    pub precision: usize,
    pub lsb_pad: Pad,
    pub msb_pad: Pad,
}

impl AtomicInfo {
    pub fn new(order: ByteOrder, offset: usize, precision: usize) -> Self {
        Self { order, offset, precision, lsb_pad: Pad::Zero, msb_pad: Pad::Zero }
    }

    /// Fields of a type whose whole storage is significant and has no byte order.
    pub fn unordered(size: usize) -> Self {
        Self::new(ByteOrder::None, 0, 8 * size)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IntegerType {
    pub atomic: AtomicInfo,
    pub sign: Sign,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FloatType {
    pub atomic: AtomicInfo,
    /// Bit position of the sign bit.
    pub sign_pos: u8,
    pub exp_pos: u8,
    pub exp_size: u8,
    pub mant_pos: u8,
    pub mant_size: u8,
    pub exp_bias: u32,
    pub norm: Normalization,
    /// Internal padding between the fields.
    pub pad: Pad,
}

impl FloatType {
    /// IEEE 754 binary32 layout.
    pub fn ieee_f32(order: ByteOrder) -> Self {
        Self {
            atomic: AtomicInfo::new(order, 0, 32),
            sign_pos: 31,
            exp_pos: 23,
            exp_size: 8,
            mant_pos: 0,
            mant_size: 23,
            exp_bias: 127,
            norm: Normalization::Implied,
            pad: Pad::Zero,
        }
    }

    /// IEEE 754 binary64 layout.
    pub fn ieee_f64(order: ByteOrder) -> Self {
        Self {
            atomic: AtomicInfo::new(order, 0, 64),
            sign_pos: 63,
            exp_pos: 52,
            exp_size: 11,
            mant_pos: 0,
            mant_size: 52,
            exp_bias: 1023,
            norm: Normalization::Implied,
            pad: Pad::Zero,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimeType {
    pub order: ByteOrder,
    pub precision: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BitfieldType {
    pub atomic: AtomicInfo,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StringType {
    pub pad: StringPadding,
    pub cset: CharacterSet,
}

/// Opaque data described by a free-form tag.
///
/// The tag is kept as stored, without its NUL padding; only the builder insists on ASCII.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OpaqueType {
    pub tag: Vec<u8>,
}

impl OpaqueType {
    /// The tag for display, with invalid UTF-8 replaced.
    pub fn tag_lossy(&self) -> Cow<str> {
        String::from_utf8_lossy(&self.tag)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReferenceType {
    pub kind: ReferenceKind,
    pub location: Location,
}

/// Class-specific part of a descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Integer(IntegerType),
    Float(FloatType),
    Time(TimeType),
    String(StringType),
    Bitfield(BitfieldType),
    Opaque(OpaqueType),
    Compound(CompoundType),
    Reference(ReferenceType),
    Enum(EnumType),
    VarLen(VarLenType),
    Array(ArrayType),
}

impl TypeKind {
    pub fn class(&self) -> TypeClass {
        match self {
            TypeKind::Integer(_) => TypeClass::Integer,
            TypeKind::Float(_) => TypeClass::Float,
            TypeKind::Time(_) => TypeClass::Time,
            TypeKind::String(_) => TypeClass::String,
            TypeKind::Bitfield(_) => TypeClass::Bitfield,
            TypeKind::Opaque(_) => TypeClass::Opaque,
            TypeKind::Compound(_) => TypeClass::Compound,
            TypeKind::Reference(_) => TypeClass::Reference,
            TypeKind::Enum(_) => TypeClass::Enum,
            TypeKind::VarLen(_) => TypeClass::VarLen,
            TypeKind::Array(_) => TypeClass::Array,
        }
    }

    /// Lowest version able to represent this node's own features, children not included.
    pub fn min_version(&self) -> Version {
        match self {
            TypeKind::Float(ft) if ft.atomic.order == ByteOrder::Vax => Version::V3,
            TypeKind::Reference(rt) => rt.kind.min_version(),
            TypeKind::Array(_) => Version::V2,
            _ => Version::V1,
        }
    }
}

/// One node of a datatype description.
///
/// A node exclusively owns its children (compound members, the base type of enums, arrays
/// and variable-length types), so dropping the root releases the whole tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub version: Version,
    /// Size of one element in bytes.
    pub size: usize,
    pub kind: TypeKind,
}

impl TypeDescriptor {
    fn with_kind(size: usize, kind: TypeKind) -> Self {
        let version = kind.min_version();
        Self { version, size, kind }
    }

    /// Integer occupying the whole of its `size` bytes.
    pub fn integer(size: usize, order: ByteOrder, signed: bool) -> Self {
        let sign = if signed { Sign::TwosComplement } else { Sign::None };
        let atomic = AtomicInfo::new(order, 0, 8 * size);
        Self::with_kind(size, TypeKind::Integer(IntegerType { atomic, sign }))
    }

    pub fn float(size: usize, float: FloatType) -> Result<Self, TypeError> {
        if float.exp_size == 0 || float.mant_size == 0 {
            return Err(TypeError::InvalidFloat("exponent and mantissa must be non-empty"));
        }
        if float.atomic.offset + float.atomic.precision > 8 * size {
            return Err(TypeError::InvalidFloat("precision exceeds type size"));
        }
        Ok(Self::with_kind(size, TypeKind::Float(float)))
    }

    pub fn ieee_f32(order: ByteOrder) -> Self {
        Self::with_kind(4, TypeKind::Float(FloatType::ieee_f32(order)))
    }

    pub fn ieee_f64(order: ByteOrder) -> Self {
        Self::with_kind(8, TypeKind::Float(FloatType::ieee_f64(order)))
    }

    pub fn time(size: usize, order: ByteOrder) -> Self {
        Self::with_kind(size, TypeKind::Time(TimeType { order, precision: 8 * size }))
    }

    pub fn fixed_string(size: usize, pad: StringPadding, cset: CharacterSet) -> Self {
        Self::with_kind(size, TypeKind::String(StringType { pad, cset }))
    }

    pub fn bitfield(size: usize, order: ByteOrder) -> Self {
        let atomic = AtomicInfo::new(order, 0, 8 * size);
        Self::with_kind(size, TypeKind::Bitfield(BitfieldType { atomic }))
    }

    pub fn opaque(size: usize, tag: &str) -> Result<Self, TypeError> {
        let tag = ascii_tag(tag)?.as_bytes().to_vec();
        Ok(Self::with_kind(size, TypeKind::Opaque(OpaqueType { tag })))
    }

    pub fn reference(size: usize, kind: ReferenceKind) -> Self {
        let location = Location::Undefined;
        Self::with_kind(size, TypeKind::Reference(ReferenceType { kind, location }))
    }

    /// Compound of the given total size; all members must lie within it.
    pub fn compound(size: usize, compound: CompoundType) -> Result<Self, TypeError> {
        if compound.members.is_empty() {
            return Err(TypeError::Empty(TypeClass::Compound));
        }
        for member in &compound.members {
            if member.end() > size {
                return Err(TypeError::OutOfBounds { name: member.name.clone(), size });
            }
        }
        let version = compound.members.iter().map(|m| m.dtype.version).max();
        let mut dtype = Self::with_kind(size, TypeKind::Compound(compound));
        dtype.version = dtype.version.max(version.unwrap_or(Version::V1));
        Ok(dtype)
    }

    pub fn enumeration(enum_type: EnumType) -> Result<Self, TypeError> {
        if enum_type.members.is_empty() {
            return Err(TypeError::Empty(TypeClass::Enum));
        }
        let (size, version) = (enum_type.base.size, enum_type.base.version);
        let mut dtype = Self::with_kind(size, TypeKind::Enum(enum_type));
        dtype.version = dtype.version.max(version);
        Ok(dtype)
    }

    /// Variable-length sequence of `base` elements.
    pub fn vlen_sequence(base: &TypeDescriptor) -> Self {
        let vlen = VarLenType::new(VarLenKind::Sequence, base.clone());
        let mut dtype = Self::with_kind(VarLenType::SIZE, TypeKind::VarLen(vlen));
        dtype.version = dtype.version.max(base.version);
        dtype
    }

    /// Variable-length string; the base is a one-byte string with the same padding and
    /// character set.
    pub fn vlen_string(pad: StringPadding, cset: CharacterSet) -> Self {
        let base = Self::fixed_string(1, pad, cset);
        let vlen = VarLenType::new(VarLenKind::String { pad, cset }, base);
        Self::with_kind(VarLenType::SIZE, TypeKind::VarLen(vlen))
    }

    pub fn array(base: &TypeDescriptor, dims: &[u32]) -> Result<Self, TypeError> {
        let array = ArrayType::new(base.clone(), dims)?;
        let size = array.element_count().checked_mul(base.size).ok_or(TypeError::TooLarge)?;
        let mut dtype = Self::with_kind(size, TypeKind::Array(array));
        dtype.version = dtype.version.max(base.version);
        Ok(dtype)
    }

    #[inline]
    pub fn class(&self) -> TypeClass {
        self.kind.class()
    }

    /// Atomic fields of the node; synthesized for strings, references and times.
    pub fn atomic(&self) -> Option<AtomicInfo> {
        match &self.kind {
            TypeKind::Integer(it) => Some(it.atomic),
            TypeKind::Float(ft) => Some(ft.atomic),
            TypeKind::Bitfield(bt) => Some(bt.atomic),
            TypeKind::Time(tt) => Some(AtomicInfo::new(tt.order, 0, tt.precision)),
            TypeKind::String(_) | TypeKind::Reference(_) => Some(AtomicInfo::unordered(self.size)),
            _ => None,
        }
    }

    /// Direct children, in storage order.
    pub fn children(&self) -> Vec<&TypeDescriptor> {
        match &self.kind {
            TypeKind::Compound(ct) => ct.members.iter().map(|m| &m.dtype).collect(),
            TypeKind::Enum(et) => vec![&*et.base],
            TypeKind::VarLen(vt) => vec![&*vt.base],
            TypeKind::Array(at) => vec![&*at.base],
            _ => vec![],
        }
    }

    pub fn children_mut(&mut self) -> Vec<&mut TypeDescriptor> {
        match &mut self.kind {
            TypeKind::Compound(ct) => ct.members.iter_mut().map(|m| &mut m.dtype).collect(),
            TypeKind::Enum(et) => vec![&mut *et.base],
            TypeKind::VarLen(vt) => vec![&mut *vt.base],
            TypeKind::Array(at) => vec![&mut *at.base],
            _ => vec![],
        }
    }

    /// True if element values of this type cannot be copied bit-for-bit between files
    /// and memory (variable-length data or object references anywhere in the tree).
    pub fn requires_conversion(&self) -> bool {
        match &self.kind {
            TypeKind::VarLen(_) => true,
            TypeKind::Reference(rt) => rt.kind == ReferenceKind::Object,
            TypeKind::Compound(ct) => ct.members.iter().any(|m| m.dtype.requires_conversion()),
            TypeKind::Array(at) => at.base.requires_conversion(),
            _ => false,
        }
    }

    /// Number of nodes in the tree rooted here.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(|c| c.node_count()).sum::<usize>()
    }
}

impl Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            TypeKind::Integer(it) => match it.sign {
                Sign::TwosComplement => write!(f, "int{}", 8 * self.size),
                Sign::None => write!(f, "uint{}", 8 * self.size),
            },
            TypeKind::Float(_) => write!(f, "float{}", 8 * self.size),
            TypeKind::Time(_) => write!(f, "time{}", 8 * self.size),
            TypeKind::String(st) => match st.cset {
                CharacterSet::Utf8 => write!(f, "unicode (len {})", self.size),
                _ => write!(f, "string (len {})", self.size),
            },
            TypeKind::Bitfield(_) => write!(f, "bitfield{}", 8 * self.size),
            TypeKind::Opaque(ot) => write!(f, "opaque{} \"{}\"", self.size, ot.tag_lossy()),
            TypeKind::Compound(ct) => write!(f, "compound ({} members)", ct.members.len()),
            TypeKind::Reference(rt) => write!(f, "reference ({:?})", rt.kind),
            TypeKind::Enum(et) => write!(f, "enum ({})", et.base),
            TypeKind::VarLen(vt) => match vt.kind {
                VarLenKind::Sequence => write!(f, "[{}]", vt.base),
                VarLenKind::String { cset: CharacterSet::Utf8, .. } => f.write_str("unicode (var len)"),
                VarLenKind::String { .. } => f.write_str("string (var len)"),
            },
            TypeKind::Array(at) => {
                let dims: Vec<_> = at.dims.iter().map(ToString::to_string).collect();
                write!(f, "[{}; {}]", at.base, dims.join("x"))
            }
        }
    }
}
