//! Typed data blocks.
//!
//! [`DataBlock`] is the closed set of records a locale entry points at. Encoding produces the
//! full framed block (signature, length word, payload), which is also what the interner keys on.
//! Decoding takes a [`SplitBlock`] and checks its signature against the kind the subfunction
//! header claimed before parsing the payload.

use crate::country_info::CountryInfo;
use crate::dbcs::DbcsTable;
use crate::error::{Error, Result};
use crate::fchar::FilenameTerminators;
use crate::framing::{encode_block, Signature, SplitBlock, BLOCK_HEADER_LEN};
use crate::kind::BlockKind;
use crate::table::{CollateTable, LowercaseTable, UppercaseTable};
use crate::yesno::YesNo;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataBlock {
    CountryInfo(CountryInfo),
    Uppercase(UppercaseTable),
    Lowercase(LowercaseTable),
    FilenameUppercase(UppercaseTable),
    FilenameTerminators(FilenameTerminators),
    Collate(CollateTable),
    Dbcs(DbcsTable),
    YesNo(YesNo),
}

impl DataBlock {
    pub fn kind(&self) -> BlockKind {
        match self {
            DataBlock::CountryInfo(_) => BlockKind::CountryInfo,
            DataBlock::Uppercase(_) => BlockKind::Uppercase,
            DataBlock::Lowercase(_) => BlockKind::Lowercase,
            DataBlock::FilenameUppercase(_) => BlockKind::FilenameUppercase,
            DataBlock::FilenameTerminators(_) => BlockKind::FilenameTerminators,
            DataBlock::Collate(_) => BlockKind::Collate,
            DataBlock::Dbcs(_) => BlockKind::Dbcs,
            DataBlock::YesNo(_) => BlockKind::YesNo,
        }
    }

    /// Append the framed block to `buf`. Fails without touching `buf` if the content doesn't
    /// fit its kind's schema.
    pub fn encode(&self, buf: &mut Vec<u8>) -> Result<()> {
        let kind = self.kind();
        let signature = Signature::new(kind.magic());
        match self {
            DataBlock::CountryInfo(info) => {
                let payload = info.encode_payload()?;
                encode_block(buf, &signature, payload_len(kind, &payload)?, &payload);
            }
            DataBlock::Uppercase(table) | DataBlock::FilenameUppercase(table) => {
                let payload = table.encode_payload(kind)?;
                encode_block(buf, &signature, payload_len(kind, payload)?, payload);
            }
            DataBlock::Lowercase(table) => {
                let payload = table.encode_payload()?;
                encode_block(buf, &signature, payload_len(kind, payload)?, payload);
            }
            DataBlock::FilenameTerminators(fchar) => {
                let payload = fchar.encode_payload()?;
                encode_block(buf, &signature, payload_len(kind, &payload)?, &payload);
            }
            DataBlock::Collate(table) => {
                let payload = table.encode_payload()?;
                encode_block(buf, &signature, payload_len(kind, payload)?, payload);
            }
            DataBlock::Dbcs(table) => {
                let (declared, body) = table.encode_payload()?;
                encode_block(buf, &signature, declared, &body);
            }
            DataBlock::YesNo(yes_no) => {
                let payload = yes_no.encode_payload()?;
                encode_block(buf, &signature, payload_len(kind, &payload)?, &payload);
            }
        }
        Ok(())
    }

    /// Encode into a fresh buffer.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(BLOCK_HEADER_LEN + 256);
        self.encode(&mut buf)?;
        Ok(buf)
    }

    /// Decode a block that a subfunction header said was of the given kind.
    pub fn decode(kind: BlockKind, block: &SplitBlock) -> Result<Self> {
        if !kind.accepts(&block.signature) {
            return Err(Error::InvalidFormat(format!(
                "expected {} block, found signature {:?}",
                kind, block.signature
            )));
        }
        let payload = block.payload;
        Ok(match kind {
            BlockKind::CountryInfo => DataBlock::CountryInfo(CountryInfo::decode_payload(payload)?),
            BlockKind::Uppercase => DataBlock::Uppercase(UppercaseTable::decode_payload(payload)?),
            BlockKind::Lowercase => DataBlock::Lowercase(LowercaseTable::decode_payload(payload)?),
            BlockKind::FilenameUppercase => {
                DataBlock::FilenameUppercase(UppercaseTable::decode_payload(payload)?)
            }
            BlockKind::FilenameTerminators => {
                DataBlock::FilenameTerminators(FilenameTerminators::decode_payload(payload)?)
            }
            BlockKind::Collate => DataBlock::Collate(CollateTable::decode_payload(payload)?),
            BlockKind::Dbcs => DataBlock::Dbcs(DbcsTable::decode_payload(payload)?),
            BlockKind::YesNo => DataBlock::YesNo(YesNo::decode_payload(payload)?),
        })
    }
}

fn payload_len(kind: BlockKind, payload: &[u8]) -> Result<u16> {
    u16::try_from(payload.len()).map_err(|_| {
        Error::malformed(
            kind,
            format!("payload is {} bytes, longer than a length word holds", payload.len()),
        )
    })
}
