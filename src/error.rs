use crate::kind::BlockKind;
use std::fmt;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum Error {
    /// Occurs when two locale definitions share the same country id and codepage. Raised before
    /// any bytes of the database are emitted.
    DuplicateEntry { country: u16, codepage: u16 },
    /// Occurs when a block's content violates its kind's fixed-size or length rules, like a
    /// collating table that isn't exactly 256 entries long.
    MalformedPayload { kind: BlockKind, reason: String },
    /// No entry matched the resolved country id and codepage.
    NotFound { country: u16, codepage: u16 },
    /// The entry exists, but doesn't provide the requested block kind.
    UnknownBlockKind {
        country: u16,
        codepage: u16,
        kind: BlockKind,
    },
    /// The file header (signature and entry table pointers) failed to parse correctly.
    BadHeader(String),
    /// Stored data doesn't follow the database format.
    InvalidFormat(String),
    /// Database output was greater than the format can address.
    LengthTooLong { max: usize, actual: usize },
    /// Database ended too early.
    LengthTooShort {
        step: &'static str,
        actual: usize,
        expected: usize,
    },
}

impl Error {
    /// Get the extended error information a DOS-style facade should report for this error.
    /// Build-time errors have no equivalent and return `None`.
    pub fn extended(&self) -> Option<ExtendedError> {
        match *self {
            Error::NotFound { .. } => Some(ExtendedError {
                code: ExtendedError::INVALID_COUNTRY,
                class: ErrorClass::NotFound,
                action: SuggestedAction::Reenter,
                locus: ErrorLocus::Unknown,
            }),
            Error::UnknownBlockKind { .. } => Some(ExtendedError {
                code: ExtendedError::INVALID_FUNCTION,
                class: ErrorClass::Application,
                action: SuggestedAction::AbortCleanup,
                locus: ErrorLocus::Unknown,
            }),
            Error::BadHeader(_) | Error::InvalidFormat(_) | Error::LengthTooShort { .. } => {
                Some(ExtendedError {
                    code: ExtendedError::INVALID_FORMAT,
                    class: ErrorClass::BadFormat,
                    action: SuggestedAction::AbortCleanup,
                    locus: ErrorLocus::Memory,
                })
            }
            Error::DuplicateEntry { .. }
            | Error::MalformedPayload { .. }
            | Error::LengthTooLong { .. } => None,
        }
    }

    pub(crate) fn malformed(kind: BlockKind, reason: impl Into<String>) -> Self {
        Error::MalformedPayload {
            kind,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::DuplicateEntry { country, codepage } => write!(
                f,
                "Duplicate entry for country {}, codepage {}",
                country, codepage
            ),
            Error::MalformedPayload { kind, ref reason } => {
                write!(f, "Malformed {} payload: {}", kind.name(), reason)
            }
            Error::NotFound { country, codepage } => write!(
                f,
                "No entry for country {}, codepage {}",
                country, codepage
            ),
            Error::UnknownBlockKind {
                country,
                codepage,
                kind,
            } => write!(
                f,
                "Country {}, codepage {} has no {} table",
                country,
                codepage,
                kind.name()
            ),
            Error::BadHeader(ref err) => write!(f, "Data has bad header format: {}", err),
            Error::InvalidFormat(ref err) => write!(f, "Invalid database format: {}", err),
            Error::LengthTooLong { max, actual } => write!(
                f,
                "Data too long: was {} bytes, maximum allowed is {}",
                actual, max
            ),
            Error::LengthTooShort {
                step,
                actual,
                expected,
            } => write!(
                f,
                "Expected data length {}, but got {} on step [{}]",
                expected, actual, step
            ),
        }
    }
}

impl std::error::Error for Error {}

/// Extended error information, laid out the way DOS reports it for the country and codepage
/// calls: an error code plus a class/action/locus triple telling the caller whether to retry,
/// prompt the user again, or give up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtendedError {
    pub code: u16,
    pub class: ErrorClass,
    pub action: SuggestedAction,
    pub locus: ErrorLocus,
}

impl ExtendedError {
    pub const INVALID_FUNCTION: u16 = 0x01;
    /// Returned by the country calls in place of "file not found".
    pub const INVALID_COUNTRY: u16 = 0x02;
    pub const INVALID_FORMAT: u16 = 0x0B;
}

/// Error class, as reported in BH by the extended error call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    OutOfResource,
    Temporary,
    Authorization,
    Internal,
    Hardware,
    System,
    Application,
    NotFound,
    BadFormat,
    Locked,
    Media,
    AlreadyExists,
    Unknown,
}

impl ErrorClass {
    pub fn into_u8(self) -> u8 {
        match self {
            ErrorClass::OutOfResource => 0x01,
            ErrorClass::Temporary => 0x02,
            ErrorClass::Authorization => 0x03,
            ErrorClass::Internal => 0x04,
            ErrorClass::Hardware => 0x05,
            ErrorClass::System => 0x06,
            ErrorClass::Application => 0x07,
            ErrorClass::NotFound => 0x08,
            ErrorClass::BadFormat => 0x09,
            ErrorClass::Locked => 0x0A,
            ErrorClass::Media => 0x0B,
            ErrorClass::AlreadyExists => 0x0C,
            ErrorClass::Unknown => 0x0D,
        }
    }
}

/// Suggested action, as reported in BL by the extended error call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuggestedAction {
    Retry,
    DelayRetry,
    Reenter,
    AbortCleanup,
    AbortNow,
    Ignore,
    UserIntervention,
}

impl SuggestedAction {
    pub fn into_u8(self) -> u8 {
        match self {
            SuggestedAction::Retry => 0x01,
            SuggestedAction::DelayRetry => 0x02,
            SuggestedAction::Reenter => 0x03,
            SuggestedAction::AbortCleanup => 0x04,
            SuggestedAction::AbortNow => 0x05,
            SuggestedAction::Ignore => 0x06,
            SuggestedAction::UserIntervention => 0x07,
        }
    }
}

/// Error locus, as reported in CH by the extended error call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorLocus {
    Unknown,
    Block,
    Network,
    Serial,
    Memory,
}

impl ErrorLocus {
    pub fn into_u8(self) -> u8 {
        match self {
            ErrorLocus::Unknown => 0x01,
            ErrorLocus::Block => 0x02,
            ErrorLocus::Network => 0x03,
            ErrorLocus::Serial => 0x04,
            ErrorLocus::Memory => 0x05,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn not_found_maps_to_invalid_country() {
        let err = Error::NotFound {
            country: 7,
            codepage: 866,
        };
        let ext = err.extended().unwrap();
        assert_eq!(ext.code, 2);
        assert_eq!(ext.class.into_u8(), 0x08);
        assert_eq!(ext.action.into_u8(), 0x03);
        assert_eq!(ext.locus.into_u8(), 0x01);
    }

    #[test]
    fn build_errors_have_no_mapping() {
        let err = Error::DuplicateEntry {
            country: 1,
            codepage: 437,
        };
        assert!(err.extended().is_none());
        let err = Error::malformed(BlockKind::Collate, "too short");
        assert!(err.extended().is_none());
        assert_eq!(err.to_string(), "Malformed COLLATE payload: too short");
    }
}
