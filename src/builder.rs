//! Database compilation.
//!
//! A build lays the file out in one pass once every definition is known:
//!
//! ```text
//! file header | entry table | subfunction headers | interned data blocks | trailer
//! ```
//!
//! The size of everything before the data blocks depends only on how many entries there are and
//! how many kinds each supplies, so the arena's base offset is computed up front and every block
//! offset handed out by the interner is already file-relative.

use crate::block::DataBlock;
use crate::entry::{EntryRecord, EntryTableBuilder, ENTRY_LEN};
use crate::error::{Error, Result};
use crate::header::{FileHeader, HEADER_LEN};
use crate::interner::TableInterner;
use crate::kind::BlockKind;
use crate::locale::LocaleDefinition;
use crate::subfunction::{SubfunctionHeaderBuilder, RECORD_LEN};
use crate::trailer::{Trailer, Version};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, trace};

/// Settings for a build.
#[derive(Educe, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields, default)]
pub struct BuildOptions {
    /// Copyright notice appended after the data blocks.
    pub copyright: Option<String>,
    /// Version written into a `VERSION` block after the data blocks.
    pub version: Option<Version>,
    /// Leave out lowercase tables that are just the inverse of the uppercase table.
    #[educe(Default = true)]
    pub omit_inverse_lowercase: bool,
}

/// Statistics from the last build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub entries: usize,
    /// Blocks referenced by all subfunction headers together.
    pub references: usize,
    /// Distinct blocks written.
    pub blocks: usize,
    pub arena_len: usize,
    pub total_len: usize,
}

/// Collects locale definitions and compiles them into a database.
#[derive(Clone, Debug, Default)]
pub struct DatabaseBuilder {
    options: BuildOptions,
    locales: Vec<LocaleDefinition>,
    seen: HashSet<(u16, u16)>,
    stats: BuildStats,
}

impl DatabaseBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Add a definition. Fails immediately if its (country, codepage) pair is already taken.
    pub fn add(&mut self, locale: LocaleDefinition) -> Result<()> {
        let (country, codepage) = locale.key();
        if !self.seen.insert((country, codepage)) {
            return Err(Error::DuplicateEntry { country, codepage });
        }
        trace!(country, codepage, "Added locale definition");
        self.locales.push(locale);
        Ok(())
    }

    /// Add every definition from an iterator, stopping at the first duplicate.
    pub fn extend<I: IntoIterator<Item = LocaleDefinition>>(&mut self, locales: I) -> Result<()> {
        for locale in locales {
            self.add(locale)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.locales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }

    /// Statistics from the most recent successful [`build`][Self::build].
    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// The blocks stored for one definition, in canonical order, with defaults filled in.
    pub fn resolve_blocks(&self, locale: &LocaleDefinition) -> Vec<DataBlock> {
        let mut blocks = Vec::with_capacity(BlockKind::ALL.len());
        blocks.push(DataBlock::CountryInfo(locale.info.clone()));
        blocks.push(DataBlock::Uppercase(locale.uppercase.clone()));
        if let Some(ref lower) = locale.lowercase {
            if !(self.options.omit_inverse_lowercase && lower.is_inverse_of(&locale.uppercase)) {
                blocks.push(DataBlock::Lowercase(lower.clone()));
            }
        }
        blocks.push(DataBlock::FilenameUppercase(
            locale
                .filename_uppercase
                .clone()
                .unwrap_or_else(|| locale.uppercase.clone()),
        ));
        blocks.push(DataBlock::FilenameTerminators(
            locale.filename_terminators.clone().unwrap_or_default(),
        ));
        blocks.push(DataBlock::Collate(locale.collate.clone()));
        blocks.push(DataBlock::Dbcs(locale.dbcs.clone().unwrap_or_default()));
        blocks.push(DataBlock::YesNo(locale.yes_no));
        blocks
    }

    /// Compile every definition added so far. Nothing is returned unless the whole database
    /// encodes cleanly.
    pub fn build(&mut self) -> Result<Vec<u8>> {
        if self.locales.len() > u16::MAX as usize {
            return Err(Error::LengthTooLong {
                max: u16::MAX as usize,
                actual: self.locales.len(),
            });
        }

        // Encode first so malformed content fails before any layout work
        let mut encoded: Vec<Vec<(BlockKind, Vec<u8>)>> = Vec::with_capacity(self.locales.len());
        for locale in self.locales.iter() {
            let blocks = self
                .resolve_blocks(locale)
                .iter()
                .map(|block| block.to_vec().map(|bytes| (block.kind(), bytes)))
                .collect::<Result<Vec<_>>>()?;
            encoded.push(blocks);
        }

        let entry_table_offset = HEADER_LEN;
        let entry_table_len = 2 + ENTRY_LEN * encoded.len();
        let mut header_offsets = Vec::with_capacity(encoded.len());
        let mut cursor = entry_table_offset + entry_table_len;
        for blocks in encoded.iter() {
            header_offsets.push(file_offset(cursor)?);
            cursor += 2 + RECORD_LEN * blocks.len();
        }
        let arena_base = file_offset(cursor)?;

        let mut interner = TableInterner::new(arena_base);
        let mut entries = EntryTableBuilder::new();
        let mut headers = Vec::with_capacity(encoded.len());
        for ((locale, blocks), &header_offset) in self
            .locales
            .iter()
            .zip(encoded.iter())
            .zip(header_offsets.iter())
        {
            let mut header = SubfunctionHeaderBuilder::new();
            for (kind, bytes) in blocks.iter() {
                header.add(*kind, interner.intern(bytes)?)?;
            }
            let (country, codepage) = locale.key();
            entries.add(EntryRecord::new(country, codepage, header_offset))?;
            headers.push(header);
        }

        let trailer = Trailer {
            version: self.options.version,
            copyright: self.options.copyright.clone(),
        };
        let stats = BuildStats {
            entries: entries.len(),
            references: interner.hits() + interner.misses(),
            blocks: interner.misses(),
            arena_len: interner.len(),
            total_len: 0,
        };

        let mut out = Vec::with_capacity(arena_base as usize + interner.len());
        FileHeader::new(entry_table_offset as u32).encode(&mut out);
        entries.encode(&mut out);
        for header in headers.iter() {
            header.encode(&mut out);
        }
        debug_assert_eq!(out.len(), arena_base as usize);
        out.extend_from_slice(&interner.into_arena());
        trailer.encode(&mut out)?;

        self.stats = BuildStats {
            total_len: out.len(),
            ..stats
        };
        debug!(
            entries = self.stats.entries,
            references = self.stats.references,
            blocks = self.stats.blocks,
            arena_len = self.stats.arena_len,
            total_len = self.stats.total_len,
            "Built locale database"
        );
        Ok(out)
    }
}

fn file_offset(offset: usize) -> Result<u32> {
    u32::try_from(offset).map_err(|_| Error::LengthTooLong {
        max: u32::MAX as usize,
        actual: offset,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::country_info::{CountryInfo, DateFormat};
    use crate::table::{LowercaseTable, UppercaseTable};
    use crate::yesno::YesNo;

    fn usa() -> LocaleDefinition {
        let mut def = LocaleDefinition::new(CountryInfo::usa(437));
        def.uppercase = UppercaseTable::cp437();
        def
    }

    fn germany() -> LocaleDefinition {
        let mut info = CountryInfo::usa(850);
        info.country_id = 49;
        info.date_format = DateFormat::Europe;
        let mut def = LocaleDefinition::new(info);
        def.yes_no = YesNo::new(b'J', b'N');
        def
    }

    #[test]
    fn reject_duplicate_immediately() {
        let mut builder = DatabaseBuilder::default();
        builder.add(usa()).unwrap();
        assert!(matches!(
            builder.add(usa()),
            Err(Error::DuplicateEntry {
                country: 1,
                codepage: 437
            })
        ));
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn file_layout() {
        let mut builder = DatabaseBuilder::default();
        builder.extend([usa(), germany()]).unwrap();
        let db = builder.build().unwrap();

        assert_eq!(&db[..8], b"\xFFCOUNTRY");
        assert_eq!(&db[19..23], &23u32.to_le_bytes());
        // Entry table: count, then two records
        assert_eq!(&db[23..25], &2u16.to_le_bytes());
        let first_header = 23 + 2 + 14 * 2;
        assert_eq!(&db[25..27], &12u16.to_le_bytes());
        assert_eq!(&db[35..39], &(first_header as u32).to_le_bytes());
        // Seven kinds each, no lowercase
        assert_eq!(&db[first_header..first_header + 2], &7u16.to_le_bytes());
        let second_header = first_header + 2 + 8 * 7;
        assert_eq!(&db[49..53], &(second_header as u32).to_le_bytes());
        let arena = second_header + 2 + 8 * 7;
        // First record of the first header points at the start of the arena
        assert_eq!(
            &db[first_header + 6..first_header + 10],
            &(arena as u32).to_le_bytes()
        );
        assert_eq!(&db[arena..arena + 8], b"\xFFCTYINFO");

        let stats = builder.stats();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.references, 14);
        assert_eq!(stats.total_len, db.len());
    }

    #[test]
    fn shared_tables_stored_once() {
        let mut builder = DatabaseBuilder::default();
        builder.extend([usa(), germany()]).unwrap();
        builder.build().unwrap();
        let stats = builder.stats();
        // usa: info, cp437 upper (also filename upper), fchar, collate, dbcs, yesno = 6
        // germany: info, identity upper (also filename upper), yesno = 3 more
        assert_eq!(stats.blocks, 9);
        assert_eq!(stats.references, 14);
    }

    #[test]
    fn inverse_lowercase_omitted() {
        let mut with_inverse = usa();
        with_inverse.lowercase = Some(LowercaseTable::inverse_of(&UppercaseTable::cp437()));
        let builder = DatabaseBuilder::default();
        assert_eq!(builder.resolve_blocks(&with_inverse).len(), 7);

        let options = BuildOptions {
            omit_inverse_lowercase: false,
            ..BuildOptions::default()
        };
        let builder = DatabaseBuilder::new(options);
        assert_eq!(builder.resolve_blocks(&with_inverse).len(), 8);

        let mut custom = usa();
        let mut lower = LowercaseTable::inverse_of(&UppercaseTable::cp437()).as_bytes().to_vec();
        lower[b'I' as usize] = 0x8D;
        custom.lowercase = Some(LowercaseTable::new(lower).unwrap());
        let builder = DatabaseBuilder::default();
        let kinds: Vec<BlockKind> = builder
            .resolve_blocks(&custom)
            .iter()
            .map(|b| b.kind())
            .collect();
        assert_eq!(kinds, BlockKind::ALL.to_vec());
    }

    #[test]
    fn malformed_definition_fails_build() {
        let mut bad = germany();
        bad.info.currency_symbol = b"EURO!".to_vec();
        let mut builder = DatabaseBuilder::default();
        builder.extend([usa(), bad]).unwrap();
        assert!(matches!(
            builder.build(),
            Err(Error::MalformedPayload {
                kind: BlockKind::CountryInfo,
                ..
            })
        ));
        assert_eq!(builder.stats(), BuildStats::default());
    }

    #[test]
    fn default_options() {
        let options = BuildOptions::default();
        assert!(options.omit_inverse_lowercase);
        assert!(options.copyright.is_none());
        let options: BuildOptions =
            serde_json::from_str(r#"{"copyright": "Public domain"}"#).unwrap();
        assert!(options.omit_inverse_lowercase);
        assert_eq!(options.copyright.as_deref(), Some("Public domain"));
    }

    #[test]
    fn empty_database() {
        let db = DatabaseBuilder::default().build().unwrap();
        assert_eq!(db.len(), 25);
        assert_eq!(&db[23..25], &[0, 0]);
    }
}
