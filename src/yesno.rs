//! Yes/No prompt characters (the `YESNO` block).

use crate::error::{Error, Result};
use crate::kind::BlockKind;
use serde::{Deserialize, Serialize};

pub const YESNO_LEN: usize = 4;

/// The characters accepted as "yes" and "no" answers. The trail bytes are 0 unless the
/// character is double-byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct YesNo {
    pub yes: u8,
    #[serde(default)]
    pub yes_trail: u8,
    pub no: u8,
    #[serde(default)]
    pub no_trail: u8,
}

/// How a typed character answers a yes/no prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum YesNoResponse {
    No,
    Yes,
    Neither,
}

impl YesNoResponse {
    /// The value DOS returns for this response.
    pub fn into_u8(self) -> u8 {
        match self {
            YesNoResponse::No => 0,
            YesNoResponse::Yes => 1,
            YesNoResponse::Neither => 2,
        }
    }
}

impl YesNo {
    /// Single-byte yes and no characters.
    pub fn new(yes: u8, no: u8) -> Self {
        Self {
            yes,
            yes_trail: 0,
            no,
            no_trail: 0,
        }
    }

    /// Classify a character. `trail` is the second byte of a double-byte character, or 0.
    /// Matching is exact; callers wanting case-insensitive answers uppercase first.
    pub fn classify(&self, ch: u8, trail: u8) -> YesNoResponse {
        if (ch, trail) == (self.yes, self.yes_trail) {
            YesNoResponse::Yes
        } else if (ch, trail) == (self.no, self.no_trail) {
            YesNoResponse::No
        } else {
            YesNoResponse::Neither
        }
    }

    pub(crate) fn encode_payload(&self) -> Result<[u8; YESNO_LEN]> {
        let kind = BlockKind::YesNo;
        if self.yes == 0 || self.no == 0 {
            return Err(Error::malformed(kind, "yes and no characters must be non-zero"));
        }
        if (self.yes, self.yes_trail) == (self.no, self.no_trail) {
            return Err(Error::malformed(kind, "yes and no characters are identical"));
        }
        Ok([self.yes, self.yes_trail, self.no, self.no_trail])
    }

    pub(crate) fn decode_payload(payload: &[u8]) -> Result<Self> {
        match *payload {
            [yes, yes_trail, no, no_trail, ..] => Ok(Self {
                yes,
                yes_trail,
                no,
                no_trail,
            }),
            _ => Err(Error::LengthTooShort {
                step: "decode yes/no characters",
                actual: payload.len(),
                expected: YESNO_LEN,
            }),
        }
    }
}

impl Default for YesNo {
    fn default() -> Self {
        Self::new(b'Y', b'N')
    }
}
