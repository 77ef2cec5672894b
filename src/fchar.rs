//! Filename character rules (the `FCHAR` block).

use crate::error::{Error, Result};
use crate::kind::BlockKind;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// Fixed bytes preceding the terminator list.
const FCHAR_HEADER_LEN: usize = 8;

/// Characters that end a filename in every standard table.
pub const STANDARD_TERMINATORS: &[u8] = b".\"/\\[]:|<>+=;,";

/// Which characters may appear in a filename.
///
/// A character is permissible if it lies within `lowest..=highest`, outside
/// `excluded_first..=excluded_last`, and is not one of the terminators. The defaults are the
/// table every DOS version ships: any byte is allowed except control characters, space, and
/// the 14 standard terminators.
#[derive(Educe, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields, default)]
pub struct FilenameTerminators {
    #[educe(Default = 0x00)]
    pub lowest: u8,
    #[educe(Default = 0xFF)]
    pub highest: u8,
    #[educe(Default = 0x00)]
    pub excluded_first: u8,
    #[educe(Default = 0x20)]
    pub excluded_last: u8,
    #[educe(Default(expression = STANDARD_TERMINATORS.to_vec()))]
    #[serde(with = "serde_bytes")]
    pub terminators: Vec<u8>,
}

impl FilenameTerminators {
    pub fn is_terminator(&self, ch: u8) -> bool {
        self.terminators.contains(&ch)
    }

    pub fn is_permissible(&self, ch: u8) -> bool {
        (self.lowest..=self.highest).contains(&ch)
            && !(self.excluded_first..=self.excluded_last).contains(&ch)
            && !self.is_terminator(ch)
    }

    pub(crate) fn encode_payload(&self) -> Result<Vec<u8>> {
        let kind = BlockKind::FilenameTerminators;
        let count = u8::try_from(self.terminators.len()).map_err(|_| {
            Error::malformed(
                kind,
                format!("{} terminators, at most 255 allowed", self.terminators.len()),
            )
        })?;
        if self.lowest > self.highest {
            return Err(Error::malformed(
                kind,
                format!(
                    "lowest permissible character {:#04x} is above highest {:#04x}",
                    self.lowest, self.highest
                ),
            ));
        }
        if self.excluded_first > self.excluded_last {
            return Err(Error::malformed(kind, "excluded range is reversed"));
        }
        let mut buf = Vec::with_capacity(FCHAR_HEADER_LEN + self.terminators.len());
        // The unnamed bytes hold the values every MS-DOS release writes there
        buf.push(0x01);
        buf.push(self.lowest);
        buf.push(self.highest);
        buf.push(0x00);
        buf.push(self.excluded_first);
        buf.push(self.excluded_last);
        buf.push(0x02);
        buf.push(count);
        buf.extend_from_slice(&self.terminators);
        Ok(buf)
    }

    pub(crate) fn decode_payload(payload: &[u8]) -> Result<Self> {
        if payload.len() < FCHAR_HEADER_LEN {
            return Err(Error::LengthTooShort {
                step: "decode filename terminator header",
                actual: payload.len(),
                expected: FCHAR_HEADER_LEN,
            });
        }
        let (head, rest) = payload.split_at(FCHAR_HEADER_LEN);
        let count = head[7] as usize;
        let terminators = rest.get(..count).ok_or(Error::LengthTooShort {
            step: "decode filename terminators",
            actual: rest.len(),
            expected: count,
        })?;
        Ok(Self {
            lowest: head[1],
            highest: head[2],
            excluded_first: head[4],
            excluded_last: head[5],
            terminators: terminators.to_vec(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn wire_layout() {
        let enc = FilenameTerminators::default().encode_payload().unwrap();
        assert_eq!(enc.len(), 22);
        assert_eq!(&enc[..8], &[0x01, 0x00, 0xFF, 0x00, 0x00, 0x20, 0x02, 14]);
        assert_eq!(&enc[8..], b".\"/\\[]:|<>+=;,");
    }

    #[test]
    fn roundtrip() {
        let table = FilenameTerminators {
            lowest: 0x21,
            highest: 0xFE,
            excluded_first: 0x7F,
            excluded_last: 0x7F,
            terminators: b"*?".to_vec(),
        };
        let enc = table.encode_payload().unwrap();
        assert_eq!(FilenameTerminators::decode_payload(&enc).unwrap(), table);
    }

    #[test]
    fn permissible() {
        let table = FilenameTerminators::default();
        assert!(table.is_permissible(b'A'));
        assert!(table.is_permissible(0x80));
        assert!(!table.is_permissible(b' '));
        assert!(!table.is_permissible(0x07));
        assert!(!table.is_permissible(b'.'));
        assert!(table.is_terminator(b';'));
        assert!(!table.is_terminator(b'_'));
    }

    #[test]
    fn reject_malformed() {
        let mut table = FilenameTerminators::default();
        table.terminators = vec![b'x'; 256];
        table.encode_payload().unwrap_err();
        let mut table = FilenameTerminators::default();
        table.lowest = 0x80;
        table.highest = 0x7F;
        table.encode_payload().unwrap_err();
    }

    #[test]
    fn decode_truncated() {
        let enc = FilenameTerminators::default().encode_payload().unwrap();
        FilenameTerminators::decode_payload(&enc[..7]).unwrap_err();
        FilenameTerminators::decode_payload(&enc[..21]).unwrap_err();
    }
}
