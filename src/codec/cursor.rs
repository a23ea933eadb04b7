//! Bounds-checked little-endian cursors over byte buffers.

use byteorder::{ByteOrder, LittleEndian};

use hdf5_dtype_types::Version;

use crate::error::{Error, Result};
use crate::version::name_field_len;

/// Read side of a message buffer; advances past every consumed byte.
#[derive(Clone, Debug)]
pub struct ReadCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ReadCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Number of bytes consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        ensure!(
            needed <= self.remaining(),
            Error::BufferTooShort { needed, available: self.remaining() }
        );
        Ok(())
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    pub fn peek_u8(&self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.buf[self.pos])
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let b = self.peek_u8()?;
        self.pos += 1;
        Ok(b)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_bytes(2).map(LittleEndian::read_u16)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_bytes(4).map(LittleEndian::read_u32)
    }

    /// Reads an unsigned integer of `width` bytes, `1 <= width <= 8`.
    pub fn read_uint(&mut self, width: usize) -> Result<u64> {
        self.read_bytes(width).map(|b| LittleEndian::read_uint(b, width))
    }

    /// Reads a NUL-terminated name and skips the padding used by `version`.
    pub fn read_name(&mut self, version: Version) -> Result<String> {
        let rest = &self.buf[self.pos..];
        let len = rest.iter().position(|&c| c == 0).ok_or(Error::BufferTooShort {
            needed: rest.len() + 1,
            available: rest.len(),
        })?;
        let name = std::str::from_utf8(&rest[..len])
            .map_err(|err| Error::Malformed(format!("name is not valid UTF-8: {}", err)))?
            .to_owned();
        self.skip(name_field_len(len, version))?;
        Ok(name)
    }
}

/// Write side of a message buffer.
#[derive(Debug)]
pub struct WriteCursor<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> WriteCursor<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Number of bytes written so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn reserve(&mut self, n: usize) -> Result<&mut [u8]> {
        ensure!(
            n <= self.remaining(),
            Error::BufferTooShort { needed: n, available: self.remaining() }
        );
        let start = self.pos;
        self.pos += n;
        Ok(&mut self.buf[start..start + n])
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.reserve(bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    pub fn write_zeros(&mut self, n: usize) -> Result<()> {
        self.reserve(n)?.iter_mut().for_each(|b| *b = 0);
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.reserve(1)?[0] = value;
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        LittleEndian::write_u16(self.reserve(2)?, value);
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        LittleEndian::write_u32(self.reserve(4)?, value);
        Ok(())
    }

    /// Writes the low `width` bytes of `value`, `1 <= width <= 8`.
    pub fn write_uint(&mut self, value: u64, width: usize) -> Result<()> {
        LittleEndian::write_uint(self.reserve(width)?, value, width);
        Ok(())
    }

    /// Writes a NUL-terminated name padded as required by `version`.
    pub fn write_name(&mut self, name: &str, version: Version) -> Result<()> {
        let field = self.reserve(name_field_len(name.len(), version))?;
        let (text, padding) = field.split_at_mut(name.len());
        text.copy_from_slice(name.as_bytes());
        padding.iter_mut().for_each(|b| *b = 0);
        Ok(())
    }

    /// Overwrites bytes at an earlier position without moving the cursor.
    pub fn patch(&mut self, pos: usize, bytes: &[u8]) -> Result<()> {
        ensure!(
            pos + bytes.len() <= self.pos,
            Error::Internal(format!("cannot patch unwritten bytes at {}", pos))
        );
        self.buf[pos..pos + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }
}
