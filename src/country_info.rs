//! Country-dependent formatting information (the `CTYINFO` block).

use crate::error::{Error, Result};
use crate::kind::BlockKind;
use byteorder::{LittleEndian, ReadBytesExt};
use serde::{Deserialize, Serialize};

/// Encoded size of the country information payload.
pub const COUNTRY_INFO_LEN: usize = 22;
/// Longest currency symbol, not counting its NUL terminator.
pub const MAX_CURRENCY_LEN: usize = 4;

/// How dates are ordered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateFormat {
    /// Month, day, year
    Usa,
    /// Day, month, year
    Europe,
    /// Year, month, day
    Japan,
}

impl DateFormat {
    pub fn from_u16(v: u16) -> Option<Self> {
        match v {
            0 => Some(DateFormat::Usa),
            1 => Some(DateFormat::Europe),
            2 => Some(DateFormat::Japan),
            _ => None,
        }
    }

    pub fn into_u16(self) -> u16 {
        match self {
            DateFormat::Usa => 0,
            DateFormat::Europe => 1,
            DateFormat::Japan => 2,
        }
    }
}

/// 12 or 24-hour clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeFormat {
    Hour12,
    Hour24,
}

impl TimeFormat {
    /// Only bit 0 is meaningful.
    pub fn from_u8(v: u8) -> Self {
        if v & 0x01 == 0 {
            TimeFormat::Hour12
        } else {
            TimeFormat::Hour24
        }
    }

    pub fn into_u8(self) -> u8 {
        match self {
            TimeFormat::Hour12 => 0,
            TimeFormat::Hour24 => 1,
        }
    }
}

/// Currency format bit field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyFormat(pub u8);

impl CurrencyFormat {
    /// Symbol follows the value instead of preceding it.
    pub const FOLLOWS: u8 = 0x01;
    /// A space separates the symbol and the value.
    pub const SPACE: u8 = 0x02;
    /// The symbol replaces the decimal separator.
    pub const REPLACES_DECIMAL: u8 = 0x04;

    pub fn symbol_follows(&self) -> bool {
        self.0 & Self::FOLLOWS != 0
    }

    pub fn has_space(&self) -> bool {
        self.0 & Self::SPACE != 0
    }

    pub fn replaces_decimal(&self) -> bool {
        self.0 & Self::REPLACES_DECIMAL != 0
    }
}

/// Country-dependent formatting information for one country and codepage.
///
/// Text fields are bytes in the entry's codepage, not UTF-8: the pound sign in codepage 437 is
/// `0x9C`, for example.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CountryInfo {
    pub country_id: u16,
    pub codepage: u16,
    pub date_format: DateFormat,
    /// Up to 4 bytes; NUL padding is added on encode.
    #[serde(with = "serde_bytes")]
    pub currency_symbol: Vec<u8>,
    pub thousands_sep: u8,
    pub decimal_sep: u8,
    pub date_sep: u8,
    pub time_sep: u8,
    #[serde(default)]
    pub currency_format: CurrencyFormat,
    pub currency_digits: u8,
    pub time_format: TimeFormat,
}

impl CountryInfo {
    /// United States defaults for the given codepage.
    pub fn usa(codepage: u16) -> Self {
        Self {
            country_id: 1,
            codepage,
            date_format: DateFormat::Usa,
            currency_symbol: b"$".to_vec(),
            thousands_sep: b',',
            decimal_sep: b'.',
            date_sep: b'-',
            time_sep: b':',
            currency_format: CurrencyFormat(0),
            currency_digits: 2,
            time_format: TimeFormat::Hour12,
        }
    }

    pub(crate) fn encode_payload(&self) -> Result<Vec<u8>> {
        let kind = BlockKind::CountryInfo;
        if self.currency_symbol.len() > MAX_CURRENCY_LEN {
            return Err(Error::malformed(
                kind,
                format!(
                    "currency symbol is {} bytes, at most {} allowed",
                    self.currency_symbol.len(),
                    MAX_CURRENCY_LEN
                ),
            ));
        }
        if self.currency_symbol.contains(&0) {
            return Err(Error::malformed(kind, "currency symbol contains a NUL byte"));
        }
        let seps = [
            ("thousands", self.thousands_sep),
            ("decimal", self.decimal_sep),
            ("date", self.date_sep),
            ("time", self.time_sep),
        ];
        if let Some((name, _)) = seps.iter().find(|(_, sep)| *sep == 0) {
            return Err(Error::malformed(kind, format!("{} separator is NUL", name)));
        }

        let mut buf = Vec::with_capacity(COUNTRY_INFO_LEN);
        buf.extend_from_slice(&self.country_id.to_le_bytes());
        buf.extend_from_slice(&self.codepage.to_le_bytes());
        buf.extend_from_slice(&self.date_format.into_u16().to_le_bytes());
        let mut currency = [0u8; MAX_CURRENCY_LEN + 1];
        currency[..self.currency_symbol.len()].copy_from_slice(&self.currency_symbol);
        buf.extend_from_slice(&currency);
        for (_, sep) in seps {
            buf.push(sep);
            buf.push(0);
        }
        buf.push(self.currency_format.0);
        buf.push(self.currency_digits);
        buf.push(self.time_format.into_u8());
        debug_assert_eq!(buf.len(), COUNTRY_INFO_LEN);
        Ok(buf)
    }

    /// Decode a `CTYINFO` payload. Later DOS versions append fields past the first 22 bytes;
    /// those are ignored.
    pub(crate) fn decode_payload(payload: &[u8]) -> Result<Self> {
        if payload.len() < COUNTRY_INFO_LEN {
            return Err(Error::LengthTooShort {
                step: "decode country info",
                actual: payload.len(),
                expected: COUNTRY_INFO_LEN,
            });
        }
        let mut buf = payload;
        // Length was checked above, so none of these reads can fail
        let country_id = buf.read_u16::<LittleEndian>().unwrap_or_default();
        let codepage = buf.read_u16::<LittleEndian>().unwrap_or_default();
        let date_raw = buf.read_u16::<LittleEndian>().unwrap_or_default();
        let date_format = DateFormat::from_u16(date_raw)
            .ok_or_else(|| Error::InvalidFormat(format!("unknown date format {}", date_raw)))?;
        let (currency, buf) = buf.split_at(MAX_CURRENCY_LEN + 1);
        let currency_len = currency.iter().position(|&b| b == 0).unwrap_or(currency.len());
        Ok(Self {
            country_id,
            codepage,
            date_format,
            currency_symbol: currency[..currency_len].to_vec(),
            thousands_sep: buf[0],
            decimal_sep: buf[2],
            date_sep: buf[4],
            time_sep: buf[6],
            currency_format: CurrencyFormat(buf[8]),
            currency_digits: buf[9],
            time_format: TimeFormat::from_u8(buf[10]),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn germany() -> CountryInfo {
        CountryInfo {
            country_id: 49,
            codepage: 850,
            date_format: DateFormat::Europe,
            currency_symbol: b"EUR".to_vec(),
            thousands_sep: b'.',
            decimal_sep: b',',
            date_sep: b'.',
            time_sep: b':',
            currency_format: CurrencyFormat(CurrencyFormat::FOLLOWS | CurrencyFormat::SPACE),
            currency_digits: 2,
            time_format: TimeFormat::Hour24,
        }
    }

    #[test]
    fn wire_layout() {
        let enc = CountryInfo::usa(437).encode_payload().unwrap();
        assert_eq!(
            enc,
            &[
                1, 0, 0xB5, 0x01, 0, 0, b'$', 0, 0, 0, 0, b',', 0, b'.', 0, b'-', 0, b':', 0, 0,
                2, 0
            ]
        );
    }

    #[test]
    fn roundtrip() {
        let info = germany();
        let enc = info.encode_payload().unwrap();
        assert_eq!(enc.len(), COUNTRY_INFO_LEN);
        let dec = CountryInfo::decode_payload(&enc).unwrap();
        assert_eq!(dec, info);
        assert!(dec.currency_format.symbol_follows());
        assert!(dec.currency_format.has_space());
        assert!(!dec.currency_format.replaces_decimal());
    }

    #[test]
    fn extended_payload_ignores_tail() {
        let mut enc = germany().encode_payload().unwrap();
        enc.extend_from_slice(&[0u8, 0, 0, 0, b';', 0]);
        enc.extend_from_slice(&[0u8; 10]);
        assert_eq!(CountryInfo::decode_payload(&enc).unwrap(), germany());
    }

    #[test]
    fn reject_long_currency() {
        let mut info = germany();
        info.currency_symbol = b"EURO!".to_vec();
        assert!(matches!(
            info.encode_payload(),
            Err(Error::MalformedPayload {
                kind: BlockKind::CountryInfo,
                ..
            })
        ));
        info.currency_symbol = b"EURO".to_vec();
        info.encode_payload().unwrap();
    }

    #[test]
    fn reject_nul_separator() {
        let mut info = germany();
        info.decimal_sep = 0;
        info.encode_payload().unwrap_err();
    }

    #[test]
    fn reject_short_or_unknown() {
        let enc = germany().encode_payload().unwrap();
        CountryInfo::decode_payload(&enc[..21]).unwrap_err();
        let mut enc = enc;
        enc[4] = 3;
        assert!(matches!(
            CountryInfo::decode_payload(&enc),
            Err(Error::InvalidFormat(_))
        ));
    }
}
