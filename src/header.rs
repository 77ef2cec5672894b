//! The file header.
//!
//! ```text
//! +------+---------+---------------+---------+------+-------------+
//! | 0xFF | COUNTRY | 8 zero bytes  | count   | type | offset      | (type, offset repeat)
//! +------+---------+---------------+---------+------+-------------+
//!   1       7         8               u16      u8     u32
//! ```
//!
//! The pointer list always holds one entry-table pointer (type 1) in files this crate writes.
//! Readers accept more than one and search each entry table in turn.

use crate::error::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt};

const FILE_SIGNATURE_LEN: usize = 8;
/// File signature: tag byte plus `COUNTRY`.
pub const FILE_SIGNATURE: &[u8; FILE_SIGNATURE_LEN] = b"\xFFCOUNTRY";
/// Reserved bytes after the signature.
pub const RESERVED_LEN: usize = 8;
/// Pointer type for an entry table.
pub const POINTER_ENTRY_TABLE: u8 = 1;
/// Bytes one pointer occupies.
pub(crate) const POINTER_LEN: usize = 5;
/// Fixed part of the header: signature, reserved bytes, and pointer count.
pub(crate) const HEADER_PREFIX_LEN: usize = FILE_SIGNATURE_LEN + RESERVED_LEN + 2;
/// Size of a header holding a single pointer, which is where the first entry table begins.
pub const HEADER_LEN: usize = HEADER_PREFIX_LEN + POINTER_LEN;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileHeader {
    pub entry_table_offsets: Vec<u32>,
}

impl FileHeader {
    /// A header pointing at a single entry table.
    pub fn new(entry_table_offset: u32) -> Self {
        Self {
            entry_table_offsets: vec![entry_table_offset],
        }
    }

    pub fn encoded_len(&self) -> usize {
        HEADER_PREFIX_LEN + POINTER_LEN * self.entry_table_offsets.len()
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(FILE_SIGNATURE);
        buf.extend_from_slice(&[0u8; RESERVED_LEN]);
        buf.extend_from_slice(&(self.entry_table_offsets.len() as u16).to_le_bytes());
        for offset in self.entry_table_offsets.iter() {
            buf.push(POINTER_ENTRY_TABLE);
            buf.extend_from_slice(&offset.to_le_bytes());
        }
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_PREFIX_LEN {
            return Err(Error::LengthTooShort {
                step: "get file header",
                actual: buf.len(),
                expected: HEADER_PREFIX_LEN,
            });
        }
        let (signature, mut buf) = buf.split_at(FILE_SIGNATURE_LEN);
        if signature != FILE_SIGNATURE {
            return Err(Error::BadHeader(format!(
                "signature is {:02x?}, expected {:02x?}",
                signature, FILE_SIGNATURE
            )));
        }
        buf = &buf[RESERVED_LEN..];
        // Length was checked above
        let count = buf.read_u16::<LittleEndian>().unwrap_or_default();
        if count == 0 {
            return Err(Error::BadHeader("no entry table pointers".into()));
        }
        let mut entry_table_offsets = Vec::with_capacity(count as usize);
        for _ in 0..count {
            if buf.len() < POINTER_LEN {
                return Err(Error::LengthTooShort {
                    step: "get entry table pointer",
                    actual: buf.len(),
                    expected: POINTER_LEN,
                });
            }
            let kind = buf.read_u8().unwrap_or_default();
            let offset = buf.read_u32::<LittleEndian>().unwrap_or_default();
            if kind != POINTER_ENTRY_TABLE {
                return Err(Error::BadHeader(format!(
                    "pointer type {} is not an entry table",
                    kind
                )));
            }
            entry_table_offsets.push(offset);
        }
        Ok(Self {
            entry_table_offsets,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn wire_layout() {
        let mut enc = Vec::new();
        FileHeader::new(0x17).encode(&mut enc);
        assert_eq!(enc.len(), HEADER_LEN);
        assert_eq!(HEADER_LEN, 23);
        assert_eq!(
            enc,
            b"\xFFCOUNTRY\0\0\0\0\0\0\0\0\x01\x00\x01\x17\x00\x00\x00"
        );
        assert_eq!(FileHeader::decode(&enc).unwrap(), FileHeader::new(0x17));
    }

    #[test]
    fn multiple_pointers() {
        let header = FileHeader {
            entry_table_offsets: vec![0x1C, 0x400],
        };
        let mut enc = Vec::new();
        header.encode(&mut enc);
        assert_eq!(enc.len(), header.encoded_len());
        assert_eq!(FileHeader::decode(&enc).unwrap(), header);
    }

    #[test]
    fn reject_bad_header() {
        let mut enc = Vec::new();
        FileHeader::new(0x17).encode(&mut enc);

        let mut bad = enc.clone();
        bad[1] = b'K';
        assert!(matches!(FileHeader::decode(&bad), Err(Error::BadHeader(_))));

        let mut bad = enc.clone();
        bad[18] = 2;
        assert!(matches!(FileHeader::decode(&bad), Err(Error::BadHeader(_))));

        let mut bad = enc.clone();
        bad[16] = 0;
        assert!(matches!(FileHeader::decode(&bad), Err(Error::BadHeader(_))));

        FileHeader::decode(&enc[..22]).unwrap_err();
        FileHeader::decode(&enc[..10]).unwrap_err();
    }
}
