//! Bit-addressable operations over byte buffers.
//!
//! Bit `i` of a buffer lives in byte `i / 8` at position `i % 8`, so bit 0 is the least
//! significant bit of the first byte. Callers guarantee that every region fits into the
//! buffers they pass in; an out-of-range region panics the same way slice indexing does.

use std::collections::TryReserveError;

/// Scan direction used by [`find`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Start at the least significant bit of the region.
    LsbFirst,
    /// Start at the most significant bit of the region.
    MsbFirst,
}

#[inline]
fn mask(width: usize) -> u8 {
    debug_assert!(width <= 8);
    if width >= 8 {
        0xff
    } else {
        (1u8 << width) - 1
    }
}

#[inline]
fn get_bit(buf: &[u8], pos: usize) -> bool {
    ((buf[pos / 8] >> (pos % 8)) & 1) == 1
}

#[inline]
fn put_bit(buf: &mut [u8], pos: usize, value: bool) {
    let m = 1u8 << (pos % 8);
    if value {
        buf[pos / 8] |= m;
    } else {
        buf[pos / 8] &= !m;
    }
}

/// Copies `size` bits from `src` at `src_offset` into `dst` at `dst_offset`.
///
/// Offsets need not be byte-aligned. Bits of `dst` outside the target region are preserved.
pub fn copy(dst: &mut [u8], dst_offset: usize, src: &[u8], src_offset: usize, size: usize) {
    let (mut d, mut s, mut left) = (dst_offset, src_offset, size);
    while left > 0 {
        // at most one byte boundary on either side per step
        let width = left.min(8 - s % 8).min(8 - d % 8);
        let chunk = (src[s / 8] >> (s % 8)) & mask(width);
        let m = mask(width) << (d % 8);
        dst[d / 8] = (dst[d / 8] & !m) | (chunk << (d % 8));
        s += width;
        d += width;
        left -= width;
    }
}

/// Sets (`value == true`) or clears every bit of the region.
pub fn set(buf: &mut [u8], offset: usize, size: usize, value: bool) {
    let (mut pos, mut left) = (offset, size);
    while left > 0 {
        let width = left.min(8 - pos % 8);
        let m = mask(width) << (pos % 8);
        if value {
            buf[pos / 8] |= m;
        } else {
            buf[pos / 8] &= !m;
        }
        pos += width;
        left -= width;
    }
}

/// Complements every bit of the region in place.
pub fn negate(buf: &mut [u8], start: usize, size: usize) {
    let (mut pos, mut left) = (start, size);
    while left > 0 {
        let width = left.min(8 - pos % 8);
        buf[pos / 8] ^= mask(width) << (pos % 8);
        pos += width;
        left -= width;
    }
}

/// Logically shifts a `size`-bit field in place.
///
/// A positive `distance` moves bits towards higher indices, a negative one towards lower
/// indices; vacated bits are cleared. Shifting by `size` or more clears the whole field.
/// The only failure is being unable to allocate the `size / 8 + 1` byte scratch buffer.
pub fn shift(
    buf: &mut [u8], distance: isize, offset: usize, size: usize,
) -> Result<(), TryReserveError> {
    let dist = distance.unsigned_abs();
    if size == 0 || dist == 0 {
        return Ok(());
    }
    if dist >= size {
        set(buf, offset, size, false);
        return Ok(());
    }

    let mut scratch = Vec::new();
    scratch.try_reserve_exact(size / 8 + 1)?;
    scratch.resize(size / 8 + 1, 0);
    copy(&mut scratch, 0, buf, offset, size);

    if distance > 0 {
        copy(buf, offset + dist, &scratch, 0, size - dist);
        set(buf, offset, dist, false);
    } else {
        copy(buf, offset, &scratch, dist, size - dist);
        set(buf, offset + size - dist, dist, false);
    }
    Ok(())
}

/// Reads a bit field of at most 64 bits as an unsigned integer.
pub fn get_as_integer(buf: &[u8], offset: usize, size: usize) -> u64 {
    assert!(size <= 64, "bit field of {} bits does not fit into u64", size);
    let mut tmp = [0u8; 8];
    copy(&mut tmp, 0, buf, offset, size);
    u64::from_le_bytes(tmp)
}

/// Stores the low `size` bits of `value` into the region; higher bits of `value` are dropped.
pub fn set_from_integer(buf: &mut [u8], offset: usize, size: usize, value: u64) {
    assert!(size <= 64, "bit field of {} bits does not fit into u64", size);
    let tmp = value.to_le_bytes();
    copy(buf, offset, &tmp, 0, size);
}

/// Finds the first bit equal to `value`, scanning the region in the given direction.
///
/// The returned position is relative to `offset` and always counted from the low end of
/// the region, regardless of the scan direction.
pub fn find(
    buf: &[u8], offset: usize, size: usize, direction: Direction, value: bool,
) -> Option<usize> {
    match direction {
        Direction::LsbFirst => (0..size).find(|&i| get_bit(buf, offset + i) == value),
        Direction::MsbFirst => (0..size).rev().find(|&i| get_bit(buf, offset + i) == value),
    }
}

/// Adds one to the field read as an unsigned integer; returns `true` on overflow.
pub fn increment(buf: &mut [u8], start: usize, size: usize) -> bool {
    match find(buf, start, size, Direction::LsbFirst, false) {
        Some(pos) => {
            set(buf, start, pos, false);
            put_bit(buf, start + pos, true);
            false
        }
        None => {
            set(buf, start, size, false);
            true
        }
    }
}

/// Subtracts one from the field read as an unsigned integer; returns `true` on underflow.
pub fn decrement(buf: &mut [u8], start: usize, size: usize) -> bool {
    match find(buf, start, size, Direction::LsbFirst, true) {
        Some(pos) => {
            set(buf, start, pos, true);
            put_bit(buf, start + pos, false);
            false
        }
        None => {
            set(buf, start, size, true);
            true
        }
    }
}
