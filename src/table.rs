//! Fixed-size byte tables: uppercase, lowercase, and collating sequence.
//!
//! The tables keep their bytes in a `Vec` so they can come straight out of a data file. Length is
//! checked when a table is constructed through [`new`](UppercaseTable::new) and again when it is
//! encoded, since deserialization skips the constructor.

use crate::error::{Error, Result};
use crate::kind::BlockKind;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Number of entries in an uppercase table: one per character from 0x80 to 0xFF.
pub const UPPERCASE_LEN: usize = 128;
/// Number of entries in a lowercase table: one per character.
pub const LOWERCASE_LEN: usize = 256;
/// Number of weights in a collating table: one per character.
pub const COLLATE_LEN: usize = 256;

fn check_len(kind: BlockKind, table: &[u8], expected: usize) -> Result<()> {
    if table.len() != expected {
        return Err(Error::malformed(
            kind,
            format!("table has {} entries, expected exactly {}", table.len(), expected),
        ));
    }
    Ok(())
}

/// Uppercase equivalents for characters 0x80 through 0xFF. Also used for the filename uppercase
/// table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UppercaseTable(#[serde(with = "serde_bytes")] Vec<u8>);

impl UppercaseTable {
    pub fn new(table: Vec<u8>) -> Result<Self> {
        check_len(BlockKind::Uppercase, &table, UPPERCASE_LEN)?;
        Ok(Self(table))
    }

    /// A table that leaves every character above 0x7F unchanged.
    pub fn identity() -> Self {
        Self((0x80..=0xFFu8).collect())
    }

    /// The uppercase table shipped for codepage 437.
    pub fn cp437() -> Self {
        let mut table: Vec<u8> = (0x80..=0xFFu8).collect();
        #[rustfmt::skip]
        let low: [u8; 40] = [
            0x80, 0x9A, 0x45, 0x41, 0x8E, 0x41, 0x8F, 0x80,
            0x45, 0x45, 0x45, 0x49, 0x49, 0x49, 0x8E, 0x8F,
            0x90, 0x92, 0x92, 0x4F, 0x99, 0x4F, 0x55, 0x55,
            0x59, 0x99, 0x9A, 0x9B, 0x9C, 0x9D, 0x9E, 0x9F,
            0x41, 0x49, 0x4F, 0x55, 0xA5, 0xA5, 0xA6, 0xA7,
        ];
        table[..low.len()].copy_from_slice(&low);
        Self(table)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Uppercase a single character. Characters below 0x80 use the ASCII rules.
    pub fn to_upper(&self, ch: u8) -> u8 {
        if ch < 0x80 {
            ch.to_ascii_uppercase()
        } else {
            self.0
                .get((ch - 0x80) as usize)
                .copied()
                .unwrap_or(ch)
        }
    }

    pub(crate) fn encode_payload(&self, kind: BlockKind) -> Result<&[u8]> {
        check_len(kind, &self.0, UPPERCASE_LEN)?;
        Ok(&self.0)
    }

    pub(crate) fn decode_payload(payload: &[u8]) -> Result<Self> {
        if payload.len() != UPPERCASE_LEN {
            return Err(Error::InvalidFormat(format!(
                "uppercase table is {} bytes",
                payload.len()
            )));
        }
        Ok(Self(payload.to_vec()))
    }
}

/// Lowercase equivalents for every character.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LowercaseTable(#[serde(with = "serde_bytes")] Vec<u8>);

impl LowercaseTable {
    pub fn new(table: Vec<u8>) -> Result<Self> {
        check_len(BlockKind::Lowercase, &table, LOWERCASE_LEN)?;
        Ok(Self(table))
    }

    /// Derive the lowercase table implied by an uppercase table: ASCII letters fold as usual,
    /// and each extended character that uppercases to a different extended character becomes
    /// that character's lowercase form. When several characters share an uppercase form, the
    /// lowest one wins. Extended characters that uppercase into ASCII (like accented vowels
    /// in codepage 437) leave the ASCII letters alone.
    pub fn inverse_of(upper: &UppercaseTable) -> Self {
        let mut table: Vec<u8> = (0..=0xFFu8).map(|c| c.to_ascii_lowercase()).collect();
        let mut assigned = [false; LOWERCASE_LEN];
        for ch in 0x80..=0xFFu8 {
            let up = upper.to_upper(ch);
            if up >= 0x80 && up != ch && !assigned[up as usize] {
                table[up as usize] = ch;
                assigned[up as usize] = true;
            }
        }
        Self(table)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_lower(&self, ch: u8) -> u8 {
        self.0.get(ch as usize).copied().unwrap_or(ch)
    }

    /// True if this table carries no information beyond what the uppercase table implies.
    pub fn is_inverse_of(&self, upper: &UppercaseTable) -> bool {
        *self == Self::inverse_of(upper)
    }

    pub(crate) fn encode_payload(&self) -> Result<&[u8]> {
        check_len(BlockKind::Lowercase, &self.0, LOWERCASE_LEN)?;
        Ok(&self.0)
    }

    pub(crate) fn decode_payload(payload: &[u8]) -> Result<Self> {
        if payload.len() != LOWERCASE_LEN {
            return Err(Error::InvalidFormat(format!(
                "lowercase table is {} bytes",
                payload.len()
            )));
        }
        Ok(Self(payload.to_vec()))
    }
}

/// Sort weight for every character.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollateTable(#[serde(with = "serde_bytes")] Vec<u8>);

impl CollateTable {
    pub fn new(table: Vec<u8>) -> Result<Self> {
        check_len(BlockKind::Collate, &table, COLLATE_LEN)?;
        Ok(Self(table))
    }

    /// Sort by raw byte value.
    pub fn identity() -> Self {
        Self((0..=0xFFu8).collect())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn weight(&self, ch: u8) -> u8 {
        self.0.get(ch as usize).copied().unwrap_or(ch)
    }

    /// Compare two strings by their collating weights. Ties fall back to length, so a prefix
    /// sorts first.
    pub fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        a.iter()
            .map(|&c| self.weight(c))
            .cmp(b.iter().map(|&c| self.weight(c)))
    }

    pub(crate) fn encode_payload(&self) -> Result<&[u8]> {
        check_len(BlockKind::Collate, &self.0, COLLATE_LEN)?;
        Ok(&self.0)
    }

    pub(crate) fn decode_payload(payload: &[u8]) -> Result<Self> {
        if payload.len() != COLLATE_LEN {
            return Err(Error::InvalidFormat(format!(
                "collating table is {} bytes",
                payload.len()
            )));
        }
        Ok(Self(payload.to_vec()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn length_checks() {
        UppercaseTable::new(vec![0u8; 127]).unwrap_err();
        UppercaseTable::new(vec![0u8; 128]).unwrap();
        LowercaseTable::new(vec![0u8; 128]).unwrap_err();
        LowercaseTable::new(vec![0u8; 256]).unwrap();
        CollateTable::new(vec![0u8; 255]).unwrap_err();
        assert!(matches!(
            CollateTable::new(vec![0u8; 257]),
            Err(Error::MalformedPayload {
                kind: BlockKind::Collate,
                ..
            })
        ));
    }

    #[test]
    fn deserialized_tables_still_checked() {
        let table: CollateTable = serde_json::from_str("[1, 2, 3]").unwrap();
        table.encode_payload().unwrap_err();
        let table: UppercaseTable = serde_json::from_str("[1, 2, 3]").unwrap();
        table.encode_payload(BlockKind::FilenameUppercase).unwrap_err();
    }

    #[test]
    fn cp437_upper() {
        let upper = UppercaseTable::cp437();
        assert_eq!(upper.to_upper(b'a'), b'A');
        assert_eq!(upper.to_upper(0x81), 0x9A); // u with diaeresis
        assert_eq!(upper.to_upper(0x82), b'E'); // e with acute
        assert_eq!(upper.to_upper(0xA4), 0xA5); // n with tilde
        assert_eq!(upper.to_upper(0xE1), 0xE1);
    }

    #[test]
    fn inverse_lowercase() {
        let lower = LowercaseTable::inverse_of(&UppercaseTable::cp437());
        assert_eq!(lower.to_lower(b'A'), b'a');
        assert_eq!(lower.to_lower(b'E'), b'e');
        assert_eq!(lower.to_lower(0x9A), 0x81);
        assert_eq!(lower.to_lower(0x8E), 0x84);
        assert_eq!(lower.to_lower(0xA5), 0xA4);
        assert_eq!(lower.to_lower(0x80), 0x87);
        assert!(lower.is_inverse_of(&UppercaseTable::cp437()));

        let identity = LowercaseTable::inverse_of(&UppercaseTable::identity());
        assert_eq!(identity.to_lower(0xC0), 0xC0);
        assert!(!identity.is_inverse_of(&UppercaseTable::cp437()));
    }

    #[test]
    fn collate_compare() {
        let mut weights: Vec<u8> = (0..=0xFFu8).collect();
        // Sort lowercase letters together with uppercase
        for c in b'a'..=b'z' {
            weights[c as usize] = c.to_ascii_uppercase();
        }
        let table = CollateTable::new(weights).unwrap();
        assert_eq!(table.compare(b"abc", b"ABC"), Ordering::Equal);
        assert_eq!(table.compare(b"abc", b"ABD"), Ordering::Less);
        assert_eq!(table.compare(b"ab", b"ABC"), Ordering::Less);
        assert_eq!(
            CollateTable::identity().compare(b"abc", b"ABC"),
            Ordering::Greater
        );
    }
}
