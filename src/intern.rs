//! Interning tables
//!
//! Append-only stores for pens and text strings, referenced by cell heads through
//! integer indices (spec §3). Deduplication is by structural equality (spec §9's
//! redesign note), using a hash-bucket-then-scan shape: hash first to narrow the
//! candidates, then fall back to a full equality check, the same two-step idea
//! `core-render`'s `ahash` dependency documents for its own line-snapshot hashing.

use crate::pen::Pen;
use compact_str::CompactString;
use rustc_hash::FxHashMap;

/// An append-only, structurally-deduped table of [`Pen`]s.
#[derive(Clone, Debug, Default)]
pub struct PenTable {
    pens: Vec<Pen>,
    by_hash: FxHashMap<u64, Vec<u32>>,
}

impl PenTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `pen`, returning its index. If a structurally-equal pen is already
    /// present, its existing index is reused.
    pub fn intern(&mut self, pen: &Pen) -> u32 {
        let hash = pen.structural_hash();
        if let Some(bucket) = self.by_hash.get(&hash) {
            for &idx in bucket {
                if &self.pens[idx as usize] == pen {
                    return idx;
                }
            }
        }
        let idx = self.pens.len() as u32;
        self.pens.push(pen.clone());
        self.by_hash.entry(hash).or_default().push(idx);
        idx
    }

    pub fn get(&self, idx: u32) -> &Pen {
        &self.pens[idx as usize]
    }

    /// Drop all interned entries (called on `reset`/`clear`).
    pub fn clear(&mut self) {
        self.pens.clear();
        self.by_hash.clear();
    }
}

/// An append-only table of interned text strings.
///
/// Stores [`CompactString`]s rather than `String`s, the same way
/// `dreg-core::buffer::Cell::symbol` avoids a heap allocation for the short runs of
/// text a terminal cell typically holds.
#[derive(Clone, Debug, Default)]
pub struct TextTable {
    texts: Vec<CompactString>,
}

impl TextTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text`, returning its index. Text is pushed unconditionally (unlike
    /// pens, the spec does not ask for text dedup, and the value is rarely reused
    /// verbatim the way a pen is).
    pub fn intern(&mut self, text: &str) -> u32 {
        let idx = self.texts.len() as u32;
        self.texts.push(CompactString::from(text));
        idx
    }

    pub fn get(&self, idx: u32) -> &str {
        &self.texts[idx as usize]
    }

    pub fn clear(&mut self) {
        self.texts.clear();
    }
}
