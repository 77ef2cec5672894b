//! Content-addressed storage for encoded data blocks.
//!
//! Every block written during a build passes through a [`TableInterner`]. Blocks are keyed by
//! the hash of their full encoding and confirmed by comparing bytes, so two locales that share a
//! table (most codepage 850 entries share one uppercase table, for instance) end up pointing at a
//! single copy.

use crate::error::{Error, Result};
use fog_crypto::hash::Hash;
use std::collections::HashMap;
use tracing::trace;

#[derive(Clone, Debug)]
pub struct TableInterner {
    base: u32,
    arena: Vec<u8>,
    index: HashMap<Hash, u32>,
    hits: usize,
    misses: usize,
}

impl TableInterner {
    /// Start an empty arena that will be placed at file offset `base`.
    pub fn new(base: u32) -> Self {
        Self {
            base,
            arena: Vec::new(),
            index: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Store an encoded block, returning its file offset. A block identical to one already
    /// stored returns the earlier offset and adds nothing to the arena.
    pub fn intern(&mut self, block: &[u8]) -> Result<u32> {
        let key = Hash::new(block);
        if let Some(&offset) = self.index.get(&key) {
            if self.stored(offset, block.len()) == Some(block) {
                self.hits += 1;
                trace!(offset, len = block.len(), "Reusing interned block");
                return Ok(offset);
            }
        }

        let offset = self.next_offset()?;
        let end = self.arena.len() + block.len();
        if (self.base as usize).saturating_add(end) > u32::MAX as usize {
            return Err(Error::LengthTooLong {
                max: u32::MAX as usize,
                actual: (self.base as usize).saturating_add(end),
            });
        }
        self.arena.extend_from_slice(block);
        self.index.entry(key).or_insert(offset);
        self.misses += 1;
        trace!(offset, len = block.len(), "Interned new block");
        Ok(offset)
    }

    fn stored(&self, offset: u32, len: usize) -> Option<&[u8]> {
        let start = (offset - self.base) as usize;
        self.arena.get(start..start + len)
    }

    fn next_offset(&self) -> Result<u32> {
        u32::try_from(self.arena.len())
            .ok()
            .and_then(|len| self.base.checked_add(len))
            .ok_or(Error::LengthTooLong {
                max: u32::MAX as usize,
                actual: self.base as usize + self.arena.len(),
            })
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    /// Bytes stored so far.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Number of `intern` calls answered from an earlier block.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Number of distinct blocks stored.
    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn into_arena(self) -> Vec<u8> {
        self.arena
    }
}
