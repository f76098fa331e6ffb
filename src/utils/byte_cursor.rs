use crate::err::{DeserializationError, DeserializationResult};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::fmt;

/// Byte order of every multi-byte integer in one EPG dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

impl Endianness {
    pub fn flipped(self) -> Self {
        match self {
            Endianness::Little => Endianness::Big,
            Endianness::Big => Endianness::Little,
        }
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endianness::Little => f.write_str("little endian"),
            Endianness::Big => f.write_str("big endian"),
        }
    }
}

/// A forward-only cursor over an immutable byte slice.
///
/// All multi-byte reads use the cursor's [`Endianness`], which is chosen once per dump
/// (see [`crate::EpgFileHeader`]). Every read either consumes exactly the bytes it needs
/// or fails with [`DeserializationError::Truncated`] without advancing.
#[derive(Clone, Copy, Debug)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
    endianness: Endianness,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8], endianness: Endianness) -> Self {
        ByteCursor {
            buf,
            pos: 0,
            endianness,
        }
    }

    #[inline]
    pub fn position(&self) -> u64 {
        self.pos as u64
    }

    #[inline]
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub fn set_endianness(&mut self, endianness: Endianness) {
        self.endianness = endianness;
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    #[inline]
    pub fn take_bytes(
        &mut self,
        len: usize,
        what: &'static str,
    ) -> DeserializationResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.buf.len())
            .ok_or(DeserializationError::Truncated {
                what,
                offset: self.pos as u64,
                need: len,
                have: self.remaining(),
            })?;

        let out = &self.buf[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    #[inline]
    pub fn array<const N: usize>(
        &mut self,
        what: &'static str,
    ) -> DeserializationResult<[u8; N]> {
        let bytes = self.take_bytes(N, what)?;
        let mut out = [0_u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    #[inline]
    pub fn u8_named(&mut self, what: &'static str) -> DeserializationResult<u8> {
        Ok(self.take_bytes(1, what)?[0])
    }

    #[inline]
    pub fn i8_named(&mut self, what: &'static str) -> DeserializationResult<i8> {
        Ok(self.u8_named(what)? as i8)
    }

    pub fn u16_named(&mut self, what: &'static str) -> DeserializationResult<u16> {
        let bytes = self.take_bytes(2, what)?;
        Ok(match self.endianness {
            Endianness::Little => LittleEndian::read_u16(bytes),
            Endianness::Big => BigEndian::read_u16(bytes),
        })
    }

    pub fn i16_named(&mut self, what: &'static str) -> DeserializationResult<i16> {
        let bytes = self.take_bytes(2, what)?;
        Ok(match self.endianness {
            Endianness::Little => LittleEndian::read_i16(bytes),
            Endianness::Big => BigEndian::read_i16(bytes),
        })
    }

    pub fn u32_named(&mut self, what: &'static str) -> DeserializationResult<u32> {
        let bytes = self.take_bytes(4, what)?;
        Ok(match self.endianness {
            Endianness::Little => LittleEndian::read_u32(bytes),
            Endianness::Big => BigEndian::read_u32(bytes),
        })
    }

    pub fn i32_named(&mut self, what: &'static str) -> DeserializationResult<i32> {
        let bytes = self.take_bytes(4, what)?;
        Ok(match self.endianness {
            Endianness::Little => LittleEndian::read_i32(bytes),
            Endianness::Big => BigEndian::read_i32(bytes),
        })
    }
}
