//! Per-code resolution outcome types.
//!
//! A `ResolutionOutcome` is produced once for every queried code and never
//! changes afterwards. Outcomes are grouped into the four output tables by
//! their [`Tier`].

use std::fmt;

use crate::{CategoryAssignment, CategoryId, Tier};

/// What a resolved code was matched against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "lowercase"))]
pub enum MatchBasis {
    /// The normalized code itself is in the reference table.
    Exact {
        /// The matched reference code.
        code: String,
    },
    /// The code matched the reference codes sharing `prefix`.
    Prefix {
        /// The leading characters shared with the related codes.
        prefix: String,
        /// Characters dropped from the normalized code to reach `prefix`.
        ///
        /// Zero means the related codes are all descendants of the query.
        levels_up: usize,
    },
}

impl MatchBasis {
    /// Returns the matched code or prefix.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Exact { code } => code,
            Self::Prefix { prefix, .. } => prefix,
        }
    }

    /// Returns true for an exact match.
    pub fn is_exact(&self) -> bool {
        matches!(self, Self::Exact { .. })
    }
}

impl fmt::Display for MatchBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Share of related codes carrying one candidate category.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategoryShare {
    /// The candidate category.
    pub category: CategoryId,
    /// Percentage of related codes carrying `category`, rounded to 2 decimals.
    pub share_pct: f64,
}

/// The classification of one queried code.
///
/// # Examples
///
/// ```
/// use ccsr_types::{ResolutionOutcome, Tier};
///
/// let outcome = ResolutionOutcome::failed("z99.9", "Z999");
/// assert_eq!(outcome.tier, Tier::Failed);
/// assert_eq!(outcome.matched_basis(), "");
/// assert!(outcome.category_ids().next().is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolutionOutcome {
    /// The code exactly as it was queried.
    pub input_code: String,
    /// The code after normalization.
    pub normalized_code: String,
    /// The confidence tier.
    pub tier: Tier,
    /// The exact code or prefix the categories came from.
    pub basis: Option<MatchBasis>,
    /// Resolved categories, sorted by identifier.
    pub categories: Vec<CategoryAssignment>,
    /// Default category when one can be reported.
    pub default_category: Option<CategoryId>,
    /// Reference codes sharing the matched prefix, sorted.
    pub related_codes: Vec<String>,
    /// Per-candidate agreement shares (semiautomatic only).
    pub shares: Vec<CategoryShare>,
}

impl ResolutionOutcome {
    /// Creates an outcome for a code with no match at all.
    pub fn failed(input_code: impl Into<String>, normalized_code: impl Into<String>) -> Self {
        Self {
            input_code: input_code.into(),
            normalized_code: normalized_code.into(),
            tier: Tier::Failed,
            basis: None,
            categories: Vec::new(),
            default_category: None,
            related_codes: Vec::new(),
            shares: Vec::new(),
        }
    }

    /// Returns the matched code or prefix, or an empty string.
    pub fn matched_basis(&self) -> &str {
        self.basis.as_ref().map(MatchBasis::as_str).unwrap_or("")
    }

    /// Returns an iterator over the resolved category identifiers.
    pub fn category_ids(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.id.as_str())
    }

    /// Returns true if more than one category was resolved.
    pub fn is_multi_category(&self) -> bool {
        self.categories.len() > 1
    }
}
