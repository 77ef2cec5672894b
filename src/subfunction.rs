//! Subfunction headers: the per-entry list of `(kind, offset)` records.
//!
//! A header is a `u16` record count followed by that many records, each `size:u16, kind:u16,
//! offset:u32`. The size word counts the bytes after itself and is 6 for every record this crate
//! writes; readers use it to step over records, so kinds this crate doesn't know are skipped
//! rather than misparsed.

use crate::block::DataBlock;
use crate::country_info::CountryInfo;
use crate::dbcs::DbcsTable;
use crate::error::{Error, Result};
use crate::fchar::FilenameTerminators;
use crate::framing::SplitBlock;
use crate::kind::BlockKind;
use crate::table::{CollateTable, LowercaseTable, UppercaseTable};
use crate::yesno::YesNo;
use byteorder::{LittleEndian, ReadBytesExt};
use std::collections::BTreeMap;

/// Value of the size word in every record this crate writes.
pub const RECORD_SIZE: u16 = 6;
/// Bytes a record occupies, size word included.
pub const RECORD_LEN: usize = 2 + RECORD_SIZE as usize;

/// One subfunction record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubfunctionRecord {
    pub size: u16,
    pub kind_id: u16,
    pub offset: u32,
}

impl SubfunctionRecord {
    pub fn new(kind: BlockKind, offset: u32) -> Self {
        Self {
            size: RECORD_SIZE,
            kind_id: kind.into_u16(),
            offset,
        }
    }

    /// The record's kind, or `None` if the id isn't one this crate handles.
    pub fn kind(&self) -> Option<BlockKind> {
        BlockKind::from_u16(self.kind_id)
    }

    pub(crate) fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.size.to_le_bytes());
        buf.extend_from_slice(&self.kind_id.to_le_bytes());
        buf.extend_from_slice(&self.offset.to_le_bytes());
    }
}

/// Collects the resolved block offsets for one entry and writes them in canonical order.
#[derive(Clone, Debug, Default)]
pub struct SubfunctionHeaderBuilder {
    records: BTreeMap<BlockKind, u32>,
}

impl SubfunctionHeaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record where a block of the given kind lives. Each kind may be added once.
    pub fn add(&mut self, kind: BlockKind, offset: u32) -> Result<()> {
        if self.records.insert(kind, offset).is_some() {
            return Err(Error::malformed(
                kind,
                "kind appears twice in one subfunction header",
            ));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Size of the encoded header.
    pub fn encoded_len(&self) -> usize {
        2 + RECORD_LEN * self.records.len()
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&(self.records.len() as u16).to_le_bytes());
        for (&kind, &offset) in self.records.iter() {
            SubfunctionRecord::new(kind, offset).encode(buf);
        }
    }
}

/// A subfunction header read out of a database, along with the entry it belongs to.
#[derive(Clone, Copy, Debug)]
pub struct SubfunctionHeader<'a> {
    data: &'a [u8],
    country: u16,
    codepage: u16,
    records: &'a [u8],
    count: u16,
}

impl<'a> SubfunctionHeader<'a> {
    /// Borrow the header at `offset` in `data`. Only the count is read here; records are checked
    /// as they're iterated.
    pub(crate) fn parse(data: &'a [u8], offset: usize, country: u16, codepage: u16) -> Result<Self> {
        let mut records = data.get(offset..).ok_or(Error::LengthTooShort {
            step: "seek to subfunction header",
            actual: data.len(),
            expected: offset,
        })?;
        let count = records
            .read_u16::<LittleEndian>()
            .map_err(|_| Error::LengthTooShort {
                step: "get subfunction count",
                actual: records.len(),
                expected: 2,
            })?;
        Ok(Self {
            data,
            country,
            codepage,
            records,
            count,
        })
    }

    pub fn country(&self) -> u16 {
        self.country
    }

    pub fn codepage(&self) -> u16 {
        self.codepage
    }

    /// Number of records the header claims to hold.
    pub fn count(&self) -> u16 {
        self.count
    }

    /// Iterate over the records, including ones of unknown kind.
    pub fn records(&self) -> Records<'a> {
        Records {
            buf: self.records,
            remaining: self.count,
        }
    }

    /// Find the record for a kind.
    pub fn record(&self, kind: BlockKind) -> Result<SubfunctionRecord> {
        let id = kind.into_u16();
        for record in self.records() {
            let record = record?;
            if record.kind_id == id {
                return Ok(record);
            }
        }
        Err(Error::UnknownBlockKind {
            country: self.country,
            codepage: self.codepage,
            kind,
        })
    }

    /// Whether the entry supplies a block of this kind.
    pub fn has(&self, kind: BlockKind) -> Result<bool> {
        match self.record(kind) {
            Ok(_) => Ok(true),
            Err(Error::UnknownBlockKind { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Locate the framed block for a kind, checking its signature.
    pub fn block(&self, kind: BlockKind) -> Result<SplitBlock<'a>> {
        let record = self.record(kind)?;
        let block = SplitBlock::split(self.data, record.offset as usize)?;
        if !kind.accepts(&block.signature) {
            return Err(Error::InvalidFormat(format!(
                "record for {} points at signature {:?}",
                kind, block.signature
            )));
        }
        Ok(block)
    }

    /// Locate and decode the block for a kind.
    pub fn get(&self, kind: BlockKind) -> Result<DataBlock> {
        let block = self.block(kind)?;
        DataBlock::decode(kind, &block)
    }

    /// Every known block the entry supplies, decoded, in record order.
    pub fn blocks(&self) -> Result<Vec<DataBlock>> {
        let mut blocks = Vec::with_capacity(self.count as usize);
        for record in self.records() {
            let record = record?;
            let kind = match record.kind() {
                Some(kind) => kind,
                None => continue,
            };
            let block = SplitBlock::split(self.data, record.offset as usize)?;
            blocks.push(DataBlock::decode(kind, &block)?);
        }
        Ok(blocks)
    }

    pub fn country_info(&self) -> Result<CountryInfo> {
        CountryInfo::decode_payload(self.block(BlockKind::CountryInfo)?.payload)
    }

    pub fn uppercase(&self) -> Result<UppercaseTable> {
        UppercaseTable::decode_payload(self.block(BlockKind::Uppercase)?.payload)
    }

    /// The entry's lowercase table. Fails with `UnknownBlockKind` if the entry relies on the
    /// inverse of its uppercase table; see [`lowercase_or_inverse`][Self::lowercase_or_inverse].
    pub fn lowercase(&self) -> Result<LowercaseTable> {
        LowercaseTable::decode_payload(self.block(BlockKind::Lowercase)?.payload)
    }

    /// The stored lowercase table, or the one implied by the uppercase table if none is stored.
    pub fn lowercase_or_inverse(&self) -> Result<LowercaseTable> {
        match self.lowercase() {
            Err(Error::UnknownBlockKind { .. }) => {
                Ok(LowercaseTable::inverse_of(&self.uppercase()?))
            }
            other => other,
        }
    }

    pub fn filename_uppercase(&self) -> Result<UppercaseTable> {
        UppercaseTable::decode_payload(self.block(BlockKind::FilenameUppercase)?.payload)
    }

    pub fn filename_terminators(&self) -> Result<FilenameTerminators> {
        FilenameTerminators::decode_payload(self.block(BlockKind::FilenameTerminators)?.payload)
    }

    pub fn collate(&self) -> Result<CollateTable> {
        CollateTable::decode_payload(self.block(BlockKind::Collate)?.payload)
    }

    pub fn dbcs(&self) -> Result<DbcsTable> {
        DbcsTable::decode_payload(self.block(BlockKind::Dbcs)?.payload)
    }

    pub fn yes_no(&self) -> Result<YesNo> {
        YesNo::decode_payload(self.block(BlockKind::YesNo)?.payload)
    }
}

/// Iterator over the records of a [`SubfunctionHeader`]. Stops after the first error.
#[derive(Clone, Debug)]
pub struct Records<'a> {
    buf: &'a [u8],
    remaining: u16,
}

impl<'a> Records<'a> {
    fn next_record(&mut self) -> Result<SubfunctionRecord> {
        let size = self
            .buf
            .read_u16::<LittleEndian>()
            .map_err(|_| Error::LengthTooShort {
                step: "get subfunction record size",
                actual: self.buf.len(),
                expected: 2,
            })?;
        if size < RECORD_SIZE {
            return Err(Error::InvalidFormat(format!(
                "subfunction record size {} is below the minimum of {}",
                size, RECORD_SIZE
            )));
        }
        if self.buf.len() < size as usize {
            return Err(Error::LengthTooShort {
                step: "get subfunction record",
                actual: self.buf.len(),
                expected: size as usize,
            });
        }
        let (mut record, rest) = self.buf.split_at(size as usize);
        self.buf = rest;
        // Length was checked above
        let kind_id = record.read_u16::<LittleEndian>().unwrap_or_default();
        let offset = record.read_u32::<LittleEndian>().unwrap_or_default();
        Ok(SubfunctionRecord {
            size,
            kind_id,
            offset,
        })
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<SubfunctionRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let result = self.next_record();
        self.remaining = if result.is_ok() { self.remaining - 1 } else { 0 };
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining as usize))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builder_orders_records() {
        let mut builder = SubfunctionHeaderBuilder::new();
        builder.add(BlockKind::YesNo, 0x500).unwrap();
        builder.add(BlockKind::CountryInfo, 0x100).unwrap();
        builder.add(BlockKind::Collate, 0x300).unwrap();
        assert_eq!(builder.len(), 3);
        assert_eq!(builder.encoded_len(), 26);
        let mut enc = Vec::new();
        builder.encode(&mut enc);
        assert_eq!(enc.len(), 26);
        assert_eq!(&enc[..2], &[3, 0]);
        assert_eq!(&enc[2..10], &[6, 0, 1, 0, 0x00, 0x01, 0, 0]);
        assert_eq!(&enc[10..18], &[6, 0, 6, 0, 0x00, 0x03, 0, 0]);
        assert_eq!(&enc[18..26], &[6, 0, 35, 0, 0x00, 0x05, 0, 0]);
    }

    #[test]
    fn builder_rejects_duplicate_kind() {
        let mut builder = SubfunctionHeaderBuilder::new();
        builder.add(BlockKind::Uppercase, 0x100).unwrap();
        builder.add(BlockKind::Uppercase, 0x200).unwrap_err();
    }

    #[test]
    fn read_back_records() {
        let mut builder = SubfunctionHeaderBuilder::new();
        builder.add(BlockKind::Uppercase, 0x20).unwrap();
        builder.add(BlockKind::Dbcs, 0x40).unwrap();
        let mut enc = vec![0xEE; 4];
        builder.encode(&mut enc);
        let header = SubfunctionHeader::parse(&enc, 4, 1, 437).unwrap();
        assert_eq!(header.count(), 2);
        let records: Vec<SubfunctionRecord> = header.records().map(|r| r.unwrap()).collect();
        assert_eq!(
            records,
            vec![
                SubfunctionRecord::new(BlockKind::Uppercase, 0x20),
                SubfunctionRecord::new(BlockKind::Dbcs, 0x40),
            ]
        );
        assert_eq!(header.record(BlockKind::Dbcs).unwrap().offset, 0x40);
        assert!(!header.has(BlockKind::Lowercase).unwrap());
        assert!(matches!(
            header.record(BlockKind::Lowercase),
            Err(Error::UnknownBlockKind {
                country: 1,
                codepage: 437,
                kind: BlockKind::Lowercase
            })
        ));
    }

    #[test]
    fn skip_unknown_and_oversized_records() {
        let mut enc = Vec::new();
        enc.extend_from_slice(&3u16.to_le_bytes());
        // An Arabic table with a padded record
        enc.extend_from_slice(&[10, 0, 21, 0, 0x10, 0, 0, 0, 0xAA, 0xAA, 0xAA, 0xAA]);
        enc.extend_from_slice(&[6, 0, 20, 0, 0x20, 0, 0, 0]);
        SubfunctionRecord::new(BlockKind::Collate, 0x30).encode(&mut enc);
        let header = SubfunctionHeader::parse(&enc, 0, 1, 437).unwrap();
        let records: Vec<SubfunctionRecord> = header.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].kind(), None);
        assert_eq!(records[1].kind(), None);
        assert_eq!(header.record(BlockKind::Collate).unwrap().offset, 0x30);
    }

    #[test]
    fn reject_bad_records() {
        let enc = [1u8, 0, 4, 0, 1, 0, 0, 0];
        let header = SubfunctionHeader::parse(&enc, 0, 1, 437).unwrap();
        assert!(matches!(
            header.record(BlockKind::CountryInfo),
            Err(Error::InvalidFormat(_))
        ));

        let enc = [2u8, 0, 6, 0, 1, 0, 0, 0, 0, 0];
        let header = SubfunctionHeader::parse(&enc, 0, 1, 437).unwrap();
        let results: Vec<_> = header.records().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());

        SubfunctionHeader::parse(&enc, 9, 1, 437).unwrap_err();
        SubfunctionHeader::parse(&enc, 11, 1, 437).unwrap_err();
    }
}
