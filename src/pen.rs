//! Pen
//!
//! The graphical-attribute-bundle collaborator: an opaque, immutable value carrying
//! foreground/background/bold/italic/underline and similar style bits. Out of the
//! core's scope per the spec (it is declared an external interface), but a concrete,
//! minimal implementation is provided so the crate is directly usable and testable.

use rustc_hash::FxHashMap;
use std::sync::Arc;

/// A single attribute value: the spec allows integers or booleans.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AttrValue {
    Int(i32),
    Bool(bool),
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// An opaque, immutable attribute bundle.
///
/// Two pens are equal iff their attribute sets are equal (structural equality), which is
/// what the interning tables rely on to dedupe pens (see [`crate::intern`]).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Pen {
    attrs: Arc<FxHashMap<&'static str, AttrValue>>,
}

impl Pen {
    /// Build a pen from an iterator of attribute key/value pairs.
    pub fn new<I, V>(attrs: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, V)>,
        V: Into<AttrValue>,
    {
        let map: FxHashMap<&'static str, AttrValue> =
            attrs.into_iter().map(|(k, v)| (k, v.into())).collect();
        Self {
            attrs: Arc::new(map),
        }
    }

    /// The empty pen (no attributes set).
    pub fn empty() -> Self {
        Self::default()
    }

    /// This pen's attributes as a key -> value mapping.
    pub fn attributes(&self) -> impl Iterator<Item = (&'static str, AttrValue)> + '_ {
        self.attrs.iter().map(|(k, v)| (*k, *v))
    }

    pub fn get(&self, key: &str) -> Option<AttrValue> {
        self.attrs.get(key).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// A cheap structural hash used by [`crate::intern::PenTable`] to bucket candidates
    /// before falling back to a full equality scan. Order-independent (attribute maps
    /// have no canonical order), so it is computed by XOR-folding the hash of each
    /// key/value pair rather than hashing the map as a sequence.
    pub(crate) fn structural_hash(&self) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut acc: u64 = 0;
        for (k, v) in self.attrs.iter() {
            let mut hasher = rustc_hash::FxHasher::default();
            k.hash(&mut hasher);
            v.hash(&mut hasher);
            acc ^= hasher.finish();
        }
        acc
    }

    /// Produce a new immutable pen whose attributes are `overlay`'s values layered over
    /// `base`'s — i.e. every key `overlay` sets wins, every key only `base` sets passes
    /// through unchanged.
    pub fn merge(base: &Self, overlay: &Self) -> Self {
        if overlay.is_empty() {
            return base.clone();
        }
        if base.is_empty() {
            return overlay.clone();
        }
        let mut map = (*base.attrs).clone();
        for (k, v) in overlay.attrs.iter() {
            map.insert(k, *v);
        }
        Self {
            attrs: Arc::new(map),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overlay_wins_on_shared_keys() {
        let base = Pen::new([("fg", AttrValue::Int(1)), ("b", AttrValue::Bool(true))]);
        let overlay = Pen::new([("fg", AttrValue::Int(4))]);
        let merged = Pen::merge(&base, &overlay);
        assert_eq!(merged.get("fg"), Some(AttrValue::Int(4)));
        assert_eq!(merged.get("b"), Some(AttrValue::Bool(true)));
    }

    #[test]
    fn merge_with_empty_overlay_is_base() {
        let base = Pen::new([("bg", AttrValue::Int(3))]);
        let merged = Pen::merge(&base, &Pen::empty());
        assert_eq!(merged, base);
    }

    #[test]
    fn structural_equality() {
        let a = Pen::new([("fg", AttrValue::Int(1))]);
        let b = Pen::new([("fg", AttrValue::Int(1))]);
        assert_eq!(a, b);
    }
}
