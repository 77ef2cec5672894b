//! Build signature appended after the last data block.
//!
//! The trailer is an optional `VERSION` block followed by an optional copyright notice. The
//! version payload is the major and minor numbers as ASCII decimal, each NUL padded to 2 bytes.
//! The copyright notice is a `0x00` separator and the ASCII text, running to the end of the file.
//! Lookups never read the trailer.

use crate::error::{Error, Result};
use crate::framing::{encode_block, Signature, SplitBlock, SIGNATURE_TAG};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const VERSION_MAGIC: &str = "VERSION";
const VERSION_PAYLOAD_LEN: usize = 4;
const VERSION_FIELD_LEN: usize = 2;

/// A database version number. Each part must fit in 2 decimal digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    pub fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    fn encode_payload(&self) -> Result<[u8; VERSION_PAYLOAD_LEN]> {
        let mut payload = [0u8; VERSION_PAYLOAD_LEN];
        for (dst, part) in payload
            .chunks_exact_mut(VERSION_FIELD_LEN)
            .zip([self.major, self.minor])
        {
            let digits = part.to_string();
            if digits.len() > VERSION_FIELD_LEN {
                return Err(Error::LengthTooLong {
                    max: VERSION_FIELD_LEN,
                    actual: digits.len(),
                });
            }
            dst[..digits.len()].copy_from_slice(digits.as_bytes());
        }
        Ok(payload)
    }

    fn decode_payload(payload: &[u8]) -> Option<Self> {
        if payload.len() != VERSION_PAYLOAD_LEN {
            return None;
        }
        let mut parts = payload.chunks_exact(VERSION_FIELD_LEN).map(|field| {
            let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
            std::str::from_utf8(&field[..end]).ok()?.parse::<u8>().ok()
        });
        let major = parts.next()??;
        let minor = parts.next()??;
        Some(Self { major, minor })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Version and copyright notice read from, or written after, the data blocks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Trailer {
    pub version: Option<Version>,
    pub copyright: Option<String>,
}

impl Trailer {
    pub fn is_empty(&self) -> bool {
        self.version.is_none() && self.copyright.is_none()
    }

    /// Append the trailer. The copyright text must be ASCII without NUL bytes.
    pub fn encode(&self, buf: &mut Vec<u8>) -> Result<()> {
        if let Some(ref text) = self.copyright {
            if !text.is_ascii() || text.contains('\0') {
                return Err(Error::InvalidFormat(
                    "copyright text must be ASCII without NUL bytes".into(),
                ));
            }
        }
        if let Some(version) = self.version {
            let payload = version.encode_payload()?;
            encode_block(
                buf,
                &Signature::new(VERSION_MAGIC),
                VERSION_PAYLOAD_LEN as u16,
                &payload,
            );
        }
        if let Some(ref text) = self.copyright {
            buf.push(0);
            buf.extend_from_slice(text.as_bytes());
        }
        Ok(())
    }

    /// Read a trailer from the bytes following the last data block. Bytes that don't look like
    /// a trailer are ignored, so files from other tools yield an empty trailer instead of an
    /// error.
    pub fn decode(mut tail: &[u8]) -> Self {
        let mut trailer = Trailer::default();
        if tail.first() == Some(&SIGNATURE_TAG) {
            if let Ok(block) = SplitBlock::split(tail, 0) {
                if block.signature.is_magic(VERSION_MAGIC) {
                    trailer.version = Version::decode_payload(block.payload);
                    tail = &tail[block.framed_len()..];
                }
            }
        }
        if let Some((&0, text)) = tail.split_first() {
            let text = String::from_utf8_lossy(text);
            let text = text.trim_end_matches(&['\0', ' ', '\r', '\n'][..]);
            if !text.is_empty() {
                trailer.copyright = Some(text.to_owned());
            }
        }
        trailer
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn version_block_bytes() {
        let trailer = Trailer {
            version: Some(Version::new(6, 22)),
            copyright: None,
        };
        let mut enc = Vec::new();
        trailer.encode(&mut enc).unwrap();
        assert_eq!(enc, b"\xFFVERSION\x04\x006\x0022");
        assert_eq!(Trailer::decode(&enc), trailer);
    }

    #[test]
    fn version_and_copyright() {
        let trailer = Trailer {
            version: Some(Version::new(1, 0)),
            copyright: Some("Copyright (C) 2026 country-pack".into()),
        };
        let mut enc = Vec::new();
        trailer.encode(&mut enc).unwrap();
        assert_eq!(Trailer::decode(&enc), trailer);
        assert_eq!(trailer.version.unwrap().to_string(), "1.0");
    }

    #[test]
    fn copyright_only() {
        let tail = b"\0(C)Copyright 1988-1994 Microsoft Corp\r\n\0";
        let trailer = Trailer::decode(tail);
        assert_eq!(trailer.version, None);
        assert_eq!(
            trailer.copyright.as_deref(),
            Some("(C)Copyright 1988-1994 Microsoft Corp")
        );
    }

    #[test]
    fn empty_and_foreign_tails() {
        assert!(Trailer::decode(&[]).is_empty());
        assert!(Trailer::decode(b"garbage").is_empty());
        assert!(Trailer::decode(b"\xFFVERSI").is_empty());
        let mut enc = Vec::new();
        Trailer::default().encode(&mut enc).unwrap();
        assert!(enc.is_empty());
    }

    #[test]
    fn reject_bad_input() {
        let mut enc = Vec::new();
        let trailer = Trailer {
            version: Some(Version::new(100, 0)),
            copyright: None,
        };
        assert!(matches!(
            trailer.encode(&mut enc),
            Err(Error::LengthTooLong { max: 2, actual: 3 })
        ));
        let trailer = Trailer {
            version: None,
            copyright: Some("caf\u{e9}".into()),
        };
        trailer.encode(&mut enc).unwrap_err();
        assert!(enc.is_empty());
    }
}
