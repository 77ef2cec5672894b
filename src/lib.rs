//! country-pack compiles per-country, per-codepage localization data into the flat,
//! offset-addressed `COUNTRY.SYS` format, and reads it back.
//!
//! A database holds, for each (country, codepage) pair:
//!
//! - Country information: date, time, and currency formatting
//! - Uppercase and lowercase tables for characters above 0x7F
//! - A filename uppercase table and filename character rules
//! - A collating sequence
//! - Double-byte lead-byte ranges
//! - The characters accepted as "yes" and "no"
//!
//! Each of these is stored as a signed, length-prefixed data block. Blocks are interned by
//! content, so the dozens of entries that share, say, the codepage 850 uppercase table all point
//! at a single copy of it.
//!
//! Building uses [`DatabaseBuilder`], which takes [`LocaleDefinition`]s and produces the file
//! bytes. Reading uses [`CountrySys`], a zero-copy view that resolves a country and codepage
//! (either of which may be a wildcard standing in for the active setting) to that entry's
//! [`SubfunctionHeader`], from which individual tables are decoded.
//!
//! ```
//! use country_pack::*;
//!
//! let mut builder = DatabaseBuilder::new(BuildOptions::default());
//! let mut usa = LocaleDefinition::new(CountryInfo::usa(437));
//! usa.uppercase = UppercaseTable::cp437();
//! builder.add(usa).unwrap();
//! let db = builder.build().unwrap();
//!
//! let sys = CountrySys::new(&db).unwrap();
//! let active = ActiveLocale::new(1, 437);
//! let header = sys.lookup(WILDCARD_COUNTRY, 437, &active).unwrap();
//! assert_eq!(header.uppercase().unwrap().to_upper(0x81), 0x9A);
//! assert_eq!(header.yes_no().unwrap().classify(b'Y', 0), YesNoResponse::Yes);
//! assert!(sys.lookup(49, 850, &active).is_err());
//! ```

mod block;
mod builder;
mod country_info;
mod dbcs;
mod entry;
mod error;
mod fchar;
mod framing;
mod header;
mod interner;
mod kind;
mod locale;
mod lookup;
mod subfunction;
mod table;
mod trailer;
mod yesno;

pub use block::DataBlock;
pub use builder::{BuildOptions, BuildStats, DatabaseBuilder};
pub use country_info::{
    CountryInfo, CurrencyFormat, DateFormat, TimeFormat, COUNTRY_INFO_LEN, MAX_CURRENCY_LEN,
};
pub use dbcs::{DbcsTable, LeadByteRange};
pub use entry::{EntryIter, EntryRecord, EntryTableBuilder, ENTRY_LEN, ENTRY_SIZE};
pub use error::{Error, ErrorClass, ErrorLocus, ExtendedError, Result, SuggestedAction};
pub use fchar::{FilenameTerminators, STANDARD_TERMINATORS};
pub use framing::{Signature, SplitBlock, BLOCK_HEADER_LEN, SIGNATURE_LEN, SIGNATURE_TAG};
pub use header::{FileHeader, FILE_SIGNATURE, HEADER_LEN};
pub use interner::TableInterner;
pub use kind::BlockKind;
pub use locale::{
    base_country, language_variant, multilingual_country_id, LocaleDefinition,
    MULTILINGUAL_BASE,
};
pub use lookup::{ActiveLocale, CountrySys, Entries};
pub use subfunction::{
    Records, SubfunctionHeader, SubfunctionHeaderBuilder, SubfunctionRecord, RECORD_LEN,
    RECORD_SIZE,
};
pub use table::{CollateTable, LowercaseTable, UppercaseTable, COLLATE_LEN, LOWERCASE_LEN, UPPERCASE_LEN};
pub use trailer::{Trailer, Version};
pub use yesno::{YesNo, YesNoResponse, YESNO_LEN};

/// Country id that stands for the active country.
pub const WILDCARD_COUNTRY: u16 = 0xFFFF;
/// Codepage that stands for the active codepage.
pub const WILDCARD_CODEPAGE: u16 = 0xFFFF;
