//! Exact-code matching against the reference index.

use crate::index::{ExactEntry, ReferenceIndex};

/// Looks up a raw code in the exact map.
///
/// The code is normalized with the same rules the index was built with, so
/// `a00.0` finds `A000`.
pub fn match_direct<'i>(code: &str, index: &'i ReferenceIndex) -> Option<&'i ExactEntry> {
    match_normalized(&index.normalize(code), index)
}

/// Looks up an already-normalized code in the exact map.
pub fn match_normalized<'i>(normalized: &str, index: &'i ReferenceIndex) -> Option<&'i ExactEntry> {
    index.get_exact(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccsr_types::{CcsrMapping, Normalization};

    fn index() -> ReferenceIndex {
        let rows = vec![
            CcsrMapping::new("A00.0", ["C1"]),
            CcsrMapping::new("B010", ["C2", "C4"]),
        ];
        ReferenceIndex::build(&rows, Normalization::default()).unwrap()
    }

    #[test]
    fn test_direct_hit_is_format_insensitive() {
        let index = index();
        for raw in ["A000", "a00.0", " A00.0 ", "'a000'"] {
            let entry = match_direct(raw, &index).unwrap();
            assert_eq!(entry.code, "A000");
        }
    }

    #[test]
    fn test_direct_hit_keeps_every_category() {
        let index = index();
        let entry = match_direct("B010", &index).unwrap();
        assert_eq!(entry.categories.len(), 2);
    }

    #[test]
    fn test_direct_miss() {
        let index = index();
        assert!(match_direct("A00", &index).is_none());
        assert!(match_direct("A0001", &index).is_none());
        assert!(match_normalized("a000", &index).is_none());
    }
}
