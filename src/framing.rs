//! Signature and length framing shared by every data block.
//!
//! A block starts with an 8-byte signature: a tag byte (`0xFF`, or `0x00` on `ARAMODE` blocks)
//! and a 7-byte ASCII magic padded with spaces. A little-endian `u16` length word follows, then
//! the payload.

use crate::error::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use std::fmt;

pub const SIGNATURE_LEN: usize = 8;
/// Signature plus length word.
pub const BLOCK_HEADER_LEN: usize = SIGNATURE_LEN + 2;
/// Tag byte that opens every signature.
pub const SIGNATURE_TAG: u8 = 0xFF;
/// Tag byte third-party files put on `ARAMODE` blocks.
pub const ARAMODE_TAG: u8 = 0x00;

const MAGIC_LEN: usize = SIGNATURE_LEN - 1;

/// An 8-byte block signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_LEN]);

impl Signature {
    /// Build a signature from a magic string. The magic is space-padded to 7 bytes; anything
    /// past 7 bytes is dropped.
    pub fn new(magic: &str) -> Self {
        debug_assert!(magic.len() <= MAGIC_LEN);
        let mut raw = [b' '; SIGNATURE_LEN];
        raw[0] = SIGNATURE_TAG;
        for (dst, src) in raw[1..].iter_mut().zip(magic.bytes()) {
            *dst = src;
        }
        Self(raw)
    }

    pub fn from_bytes(raw: [u8; SIGNATURE_LEN]) -> Self {
        Self(raw)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    pub fn tag(&self) -> u8 {
        self.0[0]
    }

    /// Whether the tag byte is one a block may start with.
    pub fn has_block_tag(&self) -> bool {
        matches!(self.tag(), SIGNATURE_TAG | ARAMODE_TAG)
    }

    /// The magic with space and NUL padding removed.
    pub fn magic(&self) -> &[u8] {
        let magic = &self.0[1..];
        let end = magic
            .iter()
            .rposition(|&b| b != b' ' && b != 0)
            .map_or(0, |i| i + 1);
        &magic[..end]
    }

    pub fn is_magic(&self, magic: &str) -> bool {
        self.magic() == magic.as_bytes()
    }

    pub(crate) fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.0);
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Signature({:#04x}, {:?})",
            self.tag(),
            String::from_utf8_lossy(self.magic())
        )
    }
}

/// Write a complete block: signature, declared length, then the body. The declared length is
/// usually the body length, but DBCS tables declare 0 while still carrying a terminator word.
pub(crate) fn encode_block(buf: &mut Vec<u8>, signature: &Signature, declared_len: u16, body: &[u8]) {
    signature.encode(buf);
    buf.extend_from_slice(&declared_len.to_le_bytes());
    buf.extend_from_slice(body);
}

/// A framed block borrowed out of a database.
#[derive(Clone, Copy, Debug)]
pub struct SplitBlock<'a> {
    pub signature: Signature,
    pub payload: &'a [u8],
}

impl<'a> SplitBlock<'a> {
    /// Split the block starting at `offset`. Fails if the header or the declared payload runs
    /// past the end of the buffer.
    pub fn split(buf: &'a [u8], offset: usize) -> Result<SplitBlock<'a>> {
        let mut buf = buf.get(offset..).ok_or(Error::LengthTooShort {
            step: "seek to block",
            actual: buf.len(),
            expected: offset,
        })?;
        if buf.len() < BLOCK_HEADER_LEN {
            return Err(Error::LengthTooShort {
                step: "get block signature and length",
                actual: buf.len(),
                expected: BLOCK_HEADER_LEN,
            });
        }
        let (raw, rest) = buf.split_at(SIGNATURE_LEN);
        let mut signature = [0u8; SIGNATURE_LEN];
        signature.copy_from_slice(raw);
        buf = rest;
        let len = buf.read_u16::<LittleEndian>().map_err(|_| Error::LengthTooShort {
            step: "get block length",
            actual: buf.len(),
            expected: 2,
        })? as usize;
        let payload = buf.get(..len).ok_or(Error::LengthTooShort {
            step: "get block payload",
            actual: buf.len(),
            expected: len,
        })?;
        Ok(Self {
            signature: Signature::from_bytes(signature),
            payload,
        })
    }

    /// Total number of bytes the framed block occupies, header included.
    pub fn framed_len(&self) -> usize {
        BLOCK_HEADER_LEN + self.payload.len()
    }
}
