//! The entry table: one record per (country, codepage) pair.
//!
//! The table is a `u16` entry count followed by 14-byte records. Each record carries its own
//! size word (always 12, the bytes that follow it), a reserved word that is always zero, and the
//! file offset of the entry's subfunction header.

use crate::error::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use std::collections::HashSet;

/// Value of the size word in every entry record.
pub const ENTRY_SIZE: u16 = 12;
/// Bytes an entry record occupies, size word included.
pub const ENTRY_LEN: usize = 2 + ENTRY_SIZE as usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntryRecord {
    pub country: u16,
    pub codepage: u16,
    pub subfunction_header_offset: u32,
}

impl EntryRecord {
    pub fn new(country: u16, codepage: u16, subfunction_header_offset: u32) -> Self {
        Self {
            country,
            codepage,
            subfunction_header_offset,
        }
    }

    pub fn key(&self) -> (u16, u16) {
        (self.country, self.codepage)
    }

    pub(crate) fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&ENTRY_SIZE.to_le_bytes());
        buf.extend_from_slice(&self.country.to_le_bytes());
        buf.extend_from_slice(&self.codepage.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&self.subfunction_header_offset.to_le_bytes());
    }

    /// Decode one record from the front of `buf`, advancing past it.
    pub(crate) fn decode(buf: &mut &[u8]) -> Result<Self> {
        if buf.len() < ENTRY_LEN {
            return Err(Error::LengthTooShort {
                step: "get entry record",
                actual: buf.len(),
                expected: ENTRY_LEN,
            });
        }
        // Length was checked above, so none of these reads can fail
        let size = buf.read_u16::<LittleEndian>().unwrap_or_default();
        if size != ENTRY_SIZE {
            return Err(Error::InvalidFormat(format!(
                "entry record size is {}, expected {}",
                size, ENTRY_SIZE
            )));
        }
        let country = buf.read_u16::<LittleEndian>().unwrap_or_default();
        let codepage = buf.read_u16::<LittleEndian>().unwrap_or_default();
        let _reserved = buf.read_u32::<LittleEndian>().unwrap_or_default();
        let subfunction_header_offset = buf.read_u32::<LittleEndian>().unwrap_or_default();
        Ok(Self {
            country,
            codepage,
            subfunction_header_offset,
        })
    }
}

/// Collects entry records in input order, refusing duplicate (country, codepage) pairs.
#[derive(Clone, Debug, Default)]
pub struct EntryTableBuilder {
    entries: Vec<EntryRecord>,
    seen: HashSet<(u16, u16)>,
}

impl EntryTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that a pair hasn't been used yet, without adding it.
    pub fn check(&self, country: u16, codepage: u16) -> Result<()> {
        if self.seen.contains(&(country, codepage)) {
            return Err(Error::DuplicateEntry { country, codepage });
        }
        Ok(())
    }

    pub fn add(&mut self, entry: EntryRecord) -> Result<()> {
        if !self.seen.insert(entry.key()) {
            return Err(Error::DuplicateEntry {
                country: entry.country,
                codepage: entry.codepage,
            });
        }
        if self.entries.len() >= u16::MAX as usize {
            self.seen.remove(&entry.key());
            return Err(Error::LengthTooLong {
                max: u16::MAX as usize,
                actual: self.entries.len() + 1,
            });
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn entries(&self) -> &[EntryRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Size of the encoded table, count word included.
    pub fn encoded_len(&self) -> usize {
        2 + ENTRY_LEN * self.entries.len()
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&(self.entries.len() as u16).to_le_bytes());
        for entry in self.entries.iter() {
            entry.encode(buf);
        }
    }
}

/// Iterator over the records of an entry table read from a database.
#[derive(Clone, Debug)]
pub struct EntryIter<'a> {
    buf: &'a [u8],
    remaining: u16,
}

impl<'a> EntryIter<'a> {
    /// Borrow the entry table at `offset` in `data`.
    pub(crate) fn parse(data: &'a [u8], offset: usize) -> Result<Self> {
        let mut buf = data.get(offset..).ok_or(Error::LengthTooShort {
            step: "seek to entry table",
            actual: data.len(),
            expected: offset,
        })?;
        let remaining = buf
            .read_u16::<LittleEndian>()
            .map_err(|_| Error::LengthTooShort {
                step: "get entry count",
                actual: buf.len(),
                expected: 2,
            })?;
        Ok(Self { buf, remaining })
    }

    /// Entries left to read.
    pub fn remaining(&self) -> u16 {
        self.remaining
    }
}

impl<'a> Iterator for EntryIter<'a> {
    type Item = Result<EntryRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let result = EntryRecord::decode(&mut self.buf);
        self.remaining = if result.is_ok() { self.remaining - 1 } else { 0 };
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining as usize))
    }
}
