//! Hierarchical fallback for codes without an exact match.
//!
//! ICD-10 codes are hierarchical: `A0012` belongs to the `A001` family,
//! which belongs to `A00`. When a code is missing from the reference table,
//! its closest ancestor family that is present tells us which categories the
//! code most plausibly falls into.
//!
//! The search starts at the full code, so codes that only appear in the
//! reference table through their descendants (`B01` when `B010` and `B011`
//! are listed) match at their own length first. It then drops one trailing
//! character at a time and stops at the first length with any match. A longer
//! prefix is always preferred over a shorter one, however many codes the
//! shorter one would bring in.

use ccsr_types::code_prefix;

use crate::index::{PrefixEntry, ReferenceIndex};

/// The closest reference family found for a code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackMatch<'i> {
    /// The matched prefix.
    pub prefix: String,
    /// Length of `prefix` in characters.
    pub prefix_len: usize,
    /// Characters dropped from the queried code to reach `prefix`.
    pub levels_up: usize,
    /// The reference codes sharing `prefix`.
    pub entry: &'i PrefixEntry,
}

impl FallbackMatch<'_> {
    /// Returns the reference codes sharing the prefix.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entry.codes.iter().map(String::as_str)
    }

    /// Returns the number of distinct categories across the family.
    pub fn category_count(&self) -> usize {
        self.entry.categories.len()
    }
}

/// Finds the most specific reference family of an already-normalized code.
///
/// Prefixes shorter than `min_prefix_len` are never searched; a code whose
/// only relatives sit below that floor resolves to `None`.
pub fn resolve<'i>(
    normalized: &str,
    index: &'i ReferenceIndex,
    min_prefix_len: usize,
) -> Option<FallbackMatch<'i>> {
    let code_len = normalized.chars().count();
    let floor = min_prefix_len.max(1);
    if code_len < floor {
        return None;
    }

    for len in (floor..=code_len).rev() {
        let prefix = code_prefix(normalized, len)?;
        if let Some(entry) = index.get_prefix(prefix) {
            tracing::trace!(code = normalized, prefix, "hierarchical match");
            return Some(FallbackMatch {
                prefix: prefix.to_string(),
                prefix_len: len,
                levels_up: code_len - len,
                entry,
            });
        }
    }

    None
}
