//! Query-time access to a compiled database.
//!
//! [`CountrySys`] borrows the raw bytes and never copies them. Every read is bounds checked, so a
//! truncated or corrupted file produces an error rather than a panic. Lookups resolve wildcards
//! against the caller's [`ActiveLocale`], scan the entry table(s) in file order for an exact
//! match, and hand back the entry's [`SubfunctionHeader`].

use crate::block::DataBlock;
use crate::dbcs::DbcsTable;
use crate::entry::{EntryIter, EntryRecord, ENTRY_LEN};
use crate::error::{Error, Result};
use crate::framing::SplitBlock;
use crate::header::{FileHeader, HEADER_PREFIX_LEN, POINTER_LEN};
use crate::kind::BlockKind;
use crate::subfunction::SubfunctionHeader;
use crate::trailer::Trailer;
use crate::{WILDCARD_CODEPAGE, WILDCARD_COUNTRY};
use byteorder::{LittleEndian, ReadBytesExt};
use educe::Educe;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// The country and codepage currently in effect. Wildcard requests resolve to these.
#[derive(Educe, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields, default)]
pub struct ActiveLocale {
    #[educe(Default = 1)]
    pub country: u16,
    #[educe(Default = 437)]
    pub codepage: u16,
}

impl ActiveLocale {
    pub fn new(country: u16, codepage: u16) -> Self {
        Self { country, codepage }
    }

    /// Substitute wildcards in a requested pair.
    pub fn resolve(&self, country: u16, codepage: u16) -> (u16, u16) {
        let country = if country == WILDCARD_COUNTRY {
            self.country
        } else {
            country
        };
        let codepage = if codepage == WILDCARD_CODEPAGE {
            self.codepage
        } else {
            codepage
        };
        (country, codepage)
    }
}

/// A read-only view of a compiled database.
#[derive(Clone, Copy, Debug)]
pub struct CountrySys<'a> {
    data: &'a [u8],
    pointers: &'a [u8],
}

impl<'a> CountrySys<'a> {
    /// Open a database, validating its file header.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        let header = FileHeader::decode(data)?;
        let end = HEADER_PREFIX_LEN + POINTER_LEN * header.entry_table_offsets.len();
        Ok(Self {
            data,
            pointers: &data[HEADER_PREFIX_LEN..end],
        })
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Iterate over every entry record, across all entry tables, in file order.
    pub fn entries(&self) -> Entries<'a> {
        Entries {
            data: self.data,
            pointers: self.pointers,
            current: None,
        }
    }

    /// Borrow the subfunction header an entry points at.
    pub fn header(&self, entry: &EntryRecord) -> Result<SubfunctionHeader<'a>> {
        SubfunctionHeader::parse(
            self.data,
            entry.subfunction_header_offset as usize,
            entry.country,
            entry.codepage,
        )
    }

    /// Find the entry for a country and codepage. Either may be the `0xFFFF` wildcard, which is
    /// replaced by the matching half of `active`. Only exact matches are returned.
    pub fn lookup(
        &self,
        country: u16,
        codepage: u16,
        active: &ActiveLocale,
    ) -> Result<SubfunctionHeader<'a>> {
        let (country, codepage) = active.resolve(country, codepage);
        for entry in self.entries() {
            let entry = entry?;
            if entry.key() == (country, codepage) {
                trace!(country, codepage, offset = entry.subfunction_header_offset, "Found entry");
                return self.header(&entry);
            }
        }
        trace!(country, codepage, "No matching entry");
        Err(Error::NotFound { country, codepage })
    }

    /// Look up an entry and decode one of its blocks.
    pub fn get(
        &self,
        country: u16,
        codepage: u16,
        kind: BlockKind,
        active: &ActiveLocale,
    ) -> Result<DataBlock> {
        self.lookup(country, codepage, active)?.get(kind)
    }

    /// Iterate over every entry along with its subfunction header.
    pub fn locales(&self) -> impl Iterator<Item = Result<(EntryRecord, SubfunctionHeader<'a>)>> + 'a {
        let this = *self;
        self.entries().map(move |entry| {
            let entry = entry?;
            Ok((entry, this.header(&entry)?))
        })
    }

    /// Read the framed block at a file offset.
    pub fn block_at(&self, offset: u32) -> Result<SplitBlock<'a>> {
        SplitBlock::split(self.data, offset as usize)
    }

    /// Read the version and copyright notice that follow the last referenced block.
    pub fn trailer(&self) -> Result<Trailer> {
        let end = self.content_end()?;
        Ok(Trailer::decode(&self.data[end..]))
    }

    /// Offset just past the last byte any header, entry table, or referenced block covers.
    fn content_end(&self) -> Result<usize> {
        let mut end = HEADER_PREFIX_LEN + self.pointers.len();
        for pointer in self.pointers.chunks_exact(POINTER_LEN) {
            let mut raw = &pointer[1..];
            let offset = raw.read_u32::<LittleEndian>().unwrap_or_default() as usize;
            let entries = EntryIter::parse(self.data, offset)?;
            end = end.max(offset + 2 + ENTRY_LEN * entries.remaining() as usize);
        }
        for locale in self.locales() {
            let (entry, header) = locale?;
            let header_end = entry.subfunction_header_offset as usize
                + 2
                + header
                    .records()
                    .map(|r| r.map(|r| 2 + r.size as usize))
                    .sum::<Result<usize>>()?;
            end = end.max(header_end);
            for record in header.records() {
                let record = record?;
                let block = self.block_at(record.offset)?;
                if !block.signature.has_block_tag() {
                    return Err(Error::InvalidFormat(format!(
                        "record at offset {} doesn't point at a block",
                        record.offset
                    )));
                }
                let mut block_end = record.offset as usize + block.framed_len();
                // DBCS tables may leave their terminator out of the declared length
                if block.signature.is_magic(BlockKind::Dbcs.magic())
                    && DbcsTable::terminator_follows(block.payload)
                    && self.data.get(block_end..block_end + 2) == Some(&[0, 0][..])
                {
                    block_end += 2;
                }
                end = end.max(block_end);
            }
        }
        Ok(end.min(self.data.len()))
    }
}

/// Iterator over the entry records of a [`CountrySys`]. Stops after the first error.
#[derive(Clone, Debug)]
pub struct Entries<'a> {
    data: &'a [u8],
    pointers: &'a [u8],
    current: Option<EntryIter<'a>>,
}

impl<'a> Iterator for Entries<'a> {
    type Item = Result<EntryRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(current) = self.current.as_mut() {
                match current.next() {
                    Some(Ok(entry)) => return Some(Ok(entry)),
                    Some(Err(e)) => {
                        self.pointers = &[];
                        self.current = None;
                        return Some(Err(e));
                    }
                    None => self.current = None,
                }
            }
            if self.pointers.len() < POINTER_LEN {
                return None;
            }
            let (pointer, rest) = self.pointers.split_at(POINTER_LEN);
            self.pointers = rest;
            let mut raw = &pointer[1..];
            let offset = raw.read_u32::<LittleEndian>().unwrap_or_default();
            match EntryIter::parse(self.data, offset as usize) {
                Ok(iter) => self.current = Some(iter),
                Err(e) => {
                    self.pointers = &[];
                    return Some(Err(e));
                }
            }
        }
    }
}
