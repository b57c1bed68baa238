//! Confidence tier assignment.

use ccsr_types::{
    CategoryAssignment, CategoryId, CategoryShare, MatchBasis, ResolutionOutcome, Tier,
};

use crate::index::{ExactEntry, ReferenceIndex};
use crate::resolver::FallbackMatch;

/// Assigns a tier to a code from its direct and fallback lookups.
///
/// - a direct hit is `direct`, whatever the size of its category set
/// - no fallback is `failed`
/// - a family agreeing on one category is `automatic`
/// - anything else is `semiautomatic`, with every candidate kept
pub fn classify(
    input_code: &str,
    normalized_code: &str,
    direct: Option<&ExactEntry>,
    fallback: Option<&FallbackMatch<'_>>,
    index: &ReferenceIndex,
) -> ResolutionOutcome {
    let mut outcome = ResolutionOutcome::failed(input_code, normalized_code);

    if let Some(exact) = direct {
        outcome.tier = Tier::Direct;
        outcome.basis = Some(MatchBasis::Exact {
            code: exact.code.clone(),
        });
        outcome.categories = describe(exact.categories.iter(), index);
        outcome.default_category = exact.default_category.clone();
        return outcome;
    }

    let Some(found) = fallback else {
        return outcome;
    };

    let entry = found.entry;
    outcome.basis = Some(MatchBasis::Prefix {
        prefix: found.prefix.clone(),
        levels_up: found.levels_up,
    });
    outcome.categories = describe(entry.categories.iter(), index);
    outcome.related_codes = entry.codes.iter().cloned().collect();

    if entry.is_unanimous() {
        outcome.tier = Tier::Automatic;
        let categories: Vec<CategoryId> = entry.categories.iter().cloned().collect();
        outcome.default_category = index
            .default_for_set(&categories)
            .map(str::to_string)
            .or_else(|| categories.into_iter().next());
    } else {
        outcome.tier = Tier::Semiautomatic;
        outcome.shares = shares(entry.codes.len(), &entry.category_counts);
    }

    outcome
}

fn describe<'a>(
    categories: impl Iterator<Item = &'a CategoryId>,
    index: &ReferenceIndex,
) -> Vec<CategoryAssignment> {
    categories
        .map(|id| CategoryAssignment {
            id: id.clone(),
            description: index.category_description(id).map(str::to_string),
        })
        .collect()
}

/// Percentage of the family carrying each candidate, highest first.
fn shares<'a>(
    family_size: usize,
    counts: impl IntoIterator<Item = (&'a CategoryId, &'a usize)>,
) -> Vec<CategoryShare> {
    let mut shares: Vec<CategoryShare> = counts
        .into_iter()
        .map(|(category, &count)| CategoryShare {
            category: category.clone(),
            share_pct: round2(count as f64 * 100.0 / family_size.max(1) as f64),
        })
        .collect();
    shares.sort_by(|a, b| {
        b.share_pct
            .total_cmp(&a.share_pct)
            .then_with(|| a.category.cmp(&b.category))
    });
    shares
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
