//! Class-specific bit-flags stored in bytes 1-3 of the message header.

use bitflags::bitflags;

use hdf5_dtype_types::bits;

bitflags! {
    /// Single-bit flags of integer, bitfield and time types.
    pub struct AtomicFlags: u32 {
        const BIG_ENDIAN = 0x01;
        const LSB_PAD = 0x02;
        const MSB_PAD = 0x04;
        /// Integers only.
        const SIGNED = 0x08;
    }
}

bitflags! {
    /// Single-bit flags of floating-point types.
    pub struct FloatFlags: u32 {
        const BIG_ENDIAN = 0x01;
        const LSB_PAD = 0x02;
        const MSB_PAD = 0x04;
        const INTERNAL_PAD = 0x08;
        /// Set together with `BIG_ENDIAN` for VAX order, version 3 and later.
        const VAX = 0x40;
    }
}

/// Width of the flags field in bytes.
pub const FLAGS_SIZE: usize = 3;

/// Multi-bit sub-fields, as (bit offset, bit size).
pub mod field {
    pub const MEMBER_COUNT: (usize, usize) = (0, 16);
    pub const FLOAT_NORM: (usize, usize) = (4, 2);
    pub const FLOAT_SIGN_POS: (usize, usize) = (8, 8);
    pub const STRING_PAD: (usize, usize) = (0, 4);
    pub const STRING_CSET: (usize, usize) = (4, 4);
    pub const OPAQUE_TAG_LEN: (usize, usize) = (0, 8);
    pub const REFERENCE_KIND: (usize, usize) = (0, 4);
    pub const VLEN_KIND: (usize, usize) = (0, 4);
    pub const VLEN_PAD: (usize, usize) = (4, 4);
    pub const VLEN_CSET: (usize, usize) = (8, 4);
}

/// Extracts a sub-field from the flags.
pub fn get(flags: u32, (offset, size): (usize, usize)) -> u32 {
    bits::get_as_integer(&flags.to_le_bytes()[..FLAGS_SIZE], offset, size) as u32
}

/// Stores `value` into a sub-field of the flags, truncating it to the field width.
pub fn set(flags: &mut u32, (offset, size): (usize, usize), value: u32) {
    let mut buf = flags.to_le_bytes();
    bits::set_from_integer(&mut buf[..FLAGS_SIZE], offset, size, u64::from(value));
    *flags = u32::from_le_bytes(buf);
}
