//! Double-byte character set lead-byte ranges (the `DBCS` block).

use crate::error::{Error, Result};
use crate::kind::BlockKind;
use serde::{Deserialize, Serialize};

/// One inclusive range of lead bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadByteRange {
    pub start: u8,
    pub end: u8,
}

impl LeadByteRange {
    pub fn new(start: u8, end: u8) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, ch: u8) -> bool {
        (self.start..=self.end).contains(&ch)
    }
}

/// Lead-byte ranges for a codepage. Single-byte codepages have none.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DbcsTable {
    pub ranges: Vec<LeadByteRange>,
}

impl DbcsTable {
    pub fn new(ranges: Vec<LeadByteRange>) -> Self {
        Self { ranges }
    }

    /// Lead bytes for Shift-JIS, codepage 932.
    pub fn cp932() -> Self {
        Self::new(vec![LeadByteRange::new(0x81, 0x9F), LeadByteRange::new(0xE0, 0xFC)])
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn is_lead_byte(&self, ch: u8) -> bool {
        self.ranges.iter().any(|r| r.contains(ch))
    }

    /// Encode the table. Returns the declared length along with the body: the body always ends
    /// in the `0,0` terminator, while the declared length is 0 for an empty table.
    pub(crate) fn encode_payload(&self) -> Result<(u16, Vec<u8>)> {
        let kind = BlockKind::Dbcs;
        for range in self.ranges.iter() {
            if range.start == 0 {
                return Err(Error::malformed(kind, "lead byte range starts at 0"));
            }
            if range.start > range.end {
                return Err(Error::malformed(
                    kind,
                    format!("range {:#04x}-{:#04x} is reversed", range.start, range.end),
                ));
            }
        }
        let mut body = Vec::with_capacity(self.ranges.len() * 2 + 2);
        for range in self.ranges.iter() {
            body.push(range.start);
            body.push(range.end);
        }
        body.extend_from_slice(&[0, 0]);
        let declared = if self.ranges.is_empty() {
            0
        } else {
            u16::try_from(body.len())
                .map_err(|_| Error::malformed(kind, format!("{} ranges", self.ranges.len())))?
        };
        Ok((declared, body))
    }

    /// Decode the ranges in a payload, stopping at the `0,0` terminator or at the end of the
    /// payload, since some files count only the range pairs in the length word.
    pub(crate) fn decode_payload(payload: &[u8]) -> Result<Self> {
        let mut ranges = Vec::new();
        for pair in payload.chunks(2) {
            match *pair {
                [0, 0] => break,
                [start, end] => ranges.push(LeadByteRange { start, end }),
                _ => {
                    return Err(Error::InvalidFormat(
                        "DBCS table has an odd number of bytes".into(),
                    ))
                }
            }
        }
        Ok(Self { ranges })
    }

    /// Whether a payload is missing the `0,0` word, which then follows it in the file.
    pub(crate) fn terminator_follows(payload: &[u8]) -> bool {
        !payload.ends_with(&[0, 0])
    }
}
