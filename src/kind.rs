use crate::framing::Signature;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The subfunction kinds a locale entry may supply. Their numeric values are the subfunction
/// identifiers stored in each entry's subfunction header, and their natural order is the
/// canonical order records appear in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    CountryInfo,
    Uppercase,
    Lowercase,
    FilenameUppercase,
    FilenameTerminators,
    Collate,
    Dbcs,
    YesNo,
}

impl BlockKind {
    /// Every kind, in canonical subfunction order.
    pub const ALL: [BlockKind; 8] = [
        BlockKind::CountryInfo,
        BlockKind::Uppercase,
        BlockKind::Lowercase,
        BlockKind::FilenameUppercase,
        BlockKind::FilenameTerminators,
        BlockKind::Collate,
        BlockKind::Dbcs,
        BlockKind::YesNo,
    ];

    /// Construct a kind from its subfunction id. Returns `None` for ids this crate doesn't
    /// handle, like the Arabic/Hebrew tables some third-party files carry.
    pub fn from_u16(id: u16) -> Option<BlockKind> {
        match id {
            1 => Some(BlockKind::CountryInfo),
            2 => Some(BlockKind::Uppercase),
            3 => Some(BlockKind::Lowercase),
            4 => Some(BlockKind::FilenameUppercase),
            5 => Some(BlockKind::FilenameTerminators),
            6 => Some(BlockKind::Collate),
            7 => Some(BlockKind::Dbcs),
            35 => Some(BlockKind::YesNo),
            _ => None,
        }
    }

    /// Converts the kind into its subfunction id.
    pub fn into_u16(self) -> u16 {
        match self {
            BlockKind::CountryInfo => 1,
            BlockKind::Uppercase => 2,
            BlockKind::Lowercase => 3,
            BlockKind::FilenameUppercase => 4,
            BlockKind::FilenameTerminators => 5,
            BlockKind::Collate => 6,
            BlockKind::Dbcs => 7,
            BlockKind::YesNo => 35,
        }
    }

    /// The magic this crate writes into the block signature.
    pub fn magic(self) -> &'static str {
        match self {
            BlockKind::CountryInfo => "CTYINFO",
            BlockKind::Uppercase => "UCASE",
            BlockKind::Lowercase => "LCASE",
            // The filename table reuses the uppercase magic
            BlockKind::FilenameUppercase => "UCASE",
            BlockKind::FilenameTerminators => "FCHAR",
            BlockKind::Collate => "COLLATE",
            BlockKind::Dbcs => "DBCS",
            BlockKind::YesNo => "YESNO",
        }
    }

    /// Human-readable name for error messages.
    pub fn name(self) -> &'static str {
        match self {
            BlockKind::FilenameUppercase => "FUCASE",
            _ => self.magic(),
        }
    }

    /// Check a signature read back from a database against this kind. Filename uppercase
    /// tables may carry either `UCASE` or `FUCASE`, and yes/no blocks either `YESNO` or
    /// `ARAMODE`.
    pub fn accepts(self, signature: &Signature) -> bool {
        match self {
            BlockKind::FilenameUppercase => {
                signature.is_magic("UCASE") || signature.is_magic("FUCASE")
            }
            BlockKind::YesNo => signature.is_magic("YESNO") || signature.is_magic("ARAMODE"),
            _ => signature.is_magic(self.magic()),
        }
    }

    /// Whether an entry must always provide this kind. Only the lowercase table is optional.
    pub fn is_required(self) -> bool {
        self != BlockKind::Lowercase
    }
}

impl From<BlockKind> for u16 {
    fn from(val: BlockKind) -> u16 {
        val.into_u16()
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.into_u16())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ids_roundtrip() {
        for kind in BlockKind::ALL {
            assert_eq!(BlockKind::from_u16(kind.into_u16()), Some(kind));
        }
        assert_eq!(BlockKind::from_u16(0), None);
        assert_eq!(BlockKind::from_u16(20), None);
        assert_eq!(BlockKind::from_u16(21), None);
    }

    #[test]
    fn canonical_order_follows_ids() {
        let mut ids: Vec<u16> = BlockKind::ALL.iter().map(|k| k.into_u16()).collect();
        let sorted = ids.clone();
        ids.sort_unstable();
        assert_eq!(ids, sorted);
        let mut kinds = BlockKind::ALL.to_vec();
        kinds.reverse();
        kinds.sort();
        assert_eq!(kinds, BlockKind::ALL.to_vec());
    }

    #[test]
    fn filename_uppercase_accepts_both_magics() {
        let kind = BlockKind::FilenameUppercase;
        assert!(kind.accepts(&Signature::new("UCASE")));
        assert!(kind.accepts(&Signature::new("FUCASE")));
        assert!(!kind.accepts(&Signature::new("LCASE")));
        assert!(!BlockKind::Uppercase.accepts(&Signature::new("FUCASE")));
    }

    #[test]
    fn yes_no_accepts_aramode() {
        let kind = BlockKind::YesNo;
        assert!(kind.accepts(&Signature::new("YESNO")));
        assert!(kind.accepts(&Signature::from_bytes(*b"\x00ARAMODE")));
        assert!(!kind.accepts(&Signature::new("DBCS")));
    }
}
