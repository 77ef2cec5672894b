//! Locale definitions: the input records a database is built from.
//!
//! Definitions derive `Serialize` and `Deserialize`, so a whole set of them can live in a data
//! file and be loaded with any serde format. Byte tables use `serde_bytes`.

use crate::country_info::CountryInfo;
use crate::dbcs::DbcsTable;
use crate::fchar::FilenameTerminators;
use crate::table::{CollateTable, LowercaseTable, UppercaseTable};
use crate::yesno::YesNo;
use serde::{Deserialize, Serialize};

/// First country id used for multilingual variants.
pub const MULTILINGUAL_BASE: u16 = 40000;
/// Highest language variant index.
pub const MAX_VARIANT: u8 = 9;
const VARIANT_STRIDE: u16 = 1000;

/// Everything one (country, codepage) entry supplies.
///
/// Only the country info, uppercase and collating tables, and yes/no characters are required.
/// When building, a missing filename uppercase table reuses `uppercase`, missing filename
/// terminators use the standard table, and a missing DBCS table is empty. A lowercase table is
/// only stored if it differs from the inverse of `uppercase`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocaleDefinition {
    pub info: CountryInfo,
    pub uppercase: UppercaseTable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lowercase: Option<LowercaseTable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename_uppercase: Option<UppercaseTable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename_terminators: Option<FilenameTerminators>,
    pub collate: CollateTable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbcs: Option<DbcsTable>,
    #[serde(default)]
    pub yes_no: YesNo,
}

impl LocaleDefinition {
    /// A definition with default tables for everything but the country info.
    pub fn new(info: CountryInfo) -> Self {
        Self {
            info,
            uppercase: UppercaseTable::identity(),
            lowercase: None,
            filename_uppercase: None,
            filename_terminators: None,
            collate: CollateTable::identity(),
            dbcs: None,
            yes_no: YesNo::default(),
        }
    }

    /// The (country, codepage) pair this definition's entry is filed under.
    pub fn key(&self) -> (u16, u16) {
        (self.info.country_id, self.info.codepage)
    }

    pub fn country(&self) -> u16 {
        self.info.country_id
    }

    pub fn codepage(&self) -> u16 {
        self.info.codepage
    }
}

/// Compute the country id of a multilingual variant: `40000 + variant*1000 + base`. Returns
/// `None` if the variant is above 9 or the base country is 1000 or more.
pub fn multilingual_country_id(base: u16, variant: u8) -> Option<u16> {
    if variant > MAX_VARIANT || base >= VARIANT_STRIDE {
        return None;
    }
    Some(MULTILINGUAL_BASE + variant as u16 * VARIANT_STRIDE + base)
}

fn is_multilingual(id: u16) -> bool {
    let last = MULTILINGUAL_BASE + (MAX_VARIANT as u16 + 1) * VARIANT_STRIDE;
    (MULTILINGUAL_BASE..last).contains(&id)
}

/// The plain country a country id belongs to. Ids outside the multilingual range are returned
/// unchanged.
pub fn base_country(id: u16) -> u16 {
    if is_multilingual(id) {
        id % VARIANT_STRIDE
    } else {
        id
    }
}

/// The language variant index of a multilingual country id.
pub fn language_variant(id: u16) -> Option<u8> {
    if is_multilingual(id) {
        Some(((id - MULTILINGUAL_BASE) / VARIANT_STRIDE) as u8)
    } else {
        None
    }
}
