//! Predefined standard datatypes.
//!
//! Each descriptor is built once on first use; clone it to place it in a tree.

use lazy_static::lazy_static;

use hdf5_dtype_types::{
    ByteOrder, CharacterSet, FloatType, ReferenceKind, StringPadding, TypeDescriptor, TypeKind,
    Version,
};

macro_rules! std_int {
    ($($name:ident = $size:expr, $order:ident, $signed:expr;)+) => {
        lazy_static! {
            $(
                pub static ref $name: TypeDescriptor =
                    TypeDescriptor::integer($size, ByteOrder::$order, $signed);
            )+
        }
    };
}

std_int! {
    STD_I8LE = 1, LittleEndian, true;
    STD_I8BE = 1, BigEndian, true;
    STD_I16LE = 2, LittleEndian, true;
    STD_I16BE = 2, BigEndian, true;
    STD_I32LE = 4, LittleEndian, true;
    STD_I32BE = 4, BigEndian, true;
    STD_I64LE = 8, LittleEndian, true;
    STD_I64BE = 8, BigEndian, true;
    STD_U8LE = 1, LittleEndian, false;
    STD_U8BE = 1, BigEndian, false;
    STD_U16LE = 2, LittleEndian, false;
    STD_U16BE = 2, BigEndian, false;
    STD_U32LE = 4, LittleEndian, false;
    STD_U32BE = 4, BigEndian, false;
    STD_U64LE = 8, LittleEndian, false;
    STD_U64BE = 8, BigEndian, false;
}

/// VAX F and G floating-point formats; these differ from IEEE in byte order and bias.
fn vax_float(size: usize) -> TypeDescriptor {
    let mut ft = match size {
        4 => FloatType::ieee_f32(ByteOrder::Vax),
        _ => FloatType::ieee_f64(ByteOrder::Vax),
    };
    ft.exp_bias += 2;
    TypeDescriptor { version: Version::V3, size, kind: TypeKind::Float(ft) }
}

lazy_static! {
    pub static ref IEEE_F32LE: TypeDescriptor = TypeDescriptor::ieee_f32(ByteOrder::LittleEndian);
    pub static ref IEEE_F32BE: TypeDescriptor = TypeDescriptor::ieee_f32(ByteOrder::BigEndian);
    pub static ref IEEE_F64LE: TypeDescriptor = TypeDescriptor::ieee_f64(ByteOrder::LittleEndian);
    pub static ref IEEE_F64BE: TypeDescriptor = TypeDescriptor::ieee_f64(ByteOrder::BigEndian);
    pub static ref VAX_F32: TypeDescriptor = vax_float(4);
    pub static ref VAX_F64: TypeDescriptor = vax_float(8);
}

lazy_static! {
    /// One-byte NUL-terminated C string.
    pub static ref C_S1: TypeDescriptor =
        TypeDescriptor::fixed_string(1, StringPadding::NullTerm, CharacterSet::Ascii);
    /// One-byte space-padded Fortran string.
    pub static ref FORTRAN_S1: TypeDescriptor =
        TypeDescriptor::fixed_string(1, StringPadding::SpacePad, CharacterSet::Ascii);
    pub static ref STD_REF_OBJ: TypeDescriptor =
        TypeDescriptor::reference(8, ReferenceKind::Object);
    pub static ref STD_REF_DSETREG: TypeDescriptor =
        TypeDescriptor::reference(12, ReferenceKind::DatasetRegion);
}

cfg_if::cfg_if! {
    if #[cfg(target_endian = "little")] {
        pub use self::{
            IEEE_F32LE as NATIVE_FLOAT, IEEE_F64LE as NATIVE_DOUBLE, STD_I16LE as NATIVE_INT16,
            STD_I32LE as NATIVE_INT32, STD_I64LE as NATIVE_INT64, STD_I8LE as NATIVE_INT8,
            STD_U16LE as NATIVE_UINT16, STD_U32LE as NATIVE_UINT32, STD_U64LE as NATIVE_UINT64,
            STD_U8LE as NATIVE_UINT8,
        };
    } else {
        pub use self::{
            IEEE_F32BE as NATIVE_FLOAT, IEEE_F64BE as NATIVE_DOUBLE, STD_I16BE as NATIVE_INT16,
            STD_I32BE as NATIVE_INT32, STD_I64BE as NATIVE_INT64, STD_I8BE as NATIVE_INT8,
            STD_U16BE as NATIVE_UINT16, STD_U32BE as NATIVE_UINT32, STD_U64BE as NATIVE_UINT64,
            STD_U8BE as NATIVE_UINT8,
        };
    }
}
