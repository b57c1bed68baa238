//! Partitioning of outcomes into the four output tables.

use ccsr_types::{ResolutionOutcome, Tier};
use serde::Serialize;

/// The four output tables of a mapping run.
///
/// Every queried code appears in exactly one table, and each table keeps the
/// order in which the codes were queried.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionTables {
    /// Codes found verbatim in the reference table.
    pub direct: Vec<ResolutionOutcome>,
    /// Codes resolved through an unambiguous prefix family.
    pub automatic: Vec<ResolutionOutcome>,
    /// Codes with several candidate categories, for review.
    pub semiautomatic: Vec<ResolutionOutcome>,
    /// Codes with no match above the prefix floor.
    pub failed: Vec<ResolutionOutcome>,
}

impl ResolutionTables {
    /// Returns the table holding `tier`.
    pub fn table(&self, tier: Tier) -> &[ResolutionOutcome] {
        match tier {
            Tier::Direct => &self.direct,
            Tier::Automatic => &self.automatic,
            Tier::Semiautomatic => &self.semiautomatic,
            Tier::Failed => &self.failed,
        }
    }

    fn table_mut(&mut self, tier: Tier) -> &mut Vec<ResolutionOutcome> {
        match tier {
            Tier::Direct => &mut self.direct,
            Tier::Automatic => &mut self.automatic,
            Tier::Semiautomatic => &mut self.semiautomatic,
            Tier::Failed => &mut self.failed,
        }
    }

    /// Returns the tables paired with their tier, in output order.
    pub fn iter(&self) -> impl Iterator<Item = (Tier, &[ResolutionOutcome])> {
        Tier::ALL.into_iter().map(move |tier| (tier, self.table(tier)))
    }

    /// Returns the total number of rows across all tables.
    pub fn len(&self) -> usize {
        self.iter().map(|(_, rows)| rows.len()).sum()
    }

    /// Returns true if no code was resolved.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Finds the outcome of a queried code, by its original spelling.
    pub fn find(&self, input_code: &str) -> Option<&ResolutionOutcome> {
        self.iter()
            .flat_map(|(_, rows)| rows.iter())
            .find(|o| o.input_code == input_code)
    }

    /// Returns per-tier counts.
    pub fn summary(&self) -> MappingSummary {
        MappingSummary {
            total: self.len(),
            direct: self.direct.len(),
            automatic: self.automatic.len(),
            semiautomatic: self.semiautomatic.len(),
            failed: self.failed.len(),
        }
    }
}

/// Splits outcomes into the four tables, keeping their relative order.
pub fn aggregate<I>(outcomes: I) -> ResolutionTables
where
    I: IntoIterator<Item = ResolutionOutcome>,
{
    let mut tables = ResolutionTables::default();
    for outcome in outcomes {
        tables.table_mut(outcome.tier).push(outcome);
    }
    tables
}

/// Row counts per tier for one mapping run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MappingSummary {
    /// Total queried codes.
    pub total: usize,
    /// Rows in the direct table.
    pub direct: usize,
    /// Rows in the automatic table.
    pub automatic: usize,
    /// Rows in the semiautomatic table.
    pub semiautomatic: usize,
    /// Rows in the failed table.
    pub failed: usize,
}

impl MappingSummary {
    /// Returns the row count of a tier.
    pub fn count(&self, tier: Tier) -> usize {
        match tier {
            Tier::Direct => self.direct,
            Tier::Automatic => self.automatic,
            Tier::Semiautomatic => self.semiautomatic,
            Tier::Failed => self.failed,
        }
    }

    /// Returns the share of a tier as a percentage of the total.
    pub fn percent(&self, tier: Tier) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.count(tier) as f64 * 100.0 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(code: &str, tier: Tier) -> ResolutionOutcome {
        let mut outcome = ResolutionOutcome::failed(code, code);
        outcome.tier = tier;
        outcome
    }

    #[test]
    fn test_aggregate_partitions_in_order() {
        let tables = aggregate(vec![
            outcome("Z999", Tier::Failed),
            outcome("A000", Tier::Direct),
            outcome("B0199", Tier::Semiautomatic),
            outcome("A001", Tier::Direct),
            outcome("A0012", Tier::Automatic),
        ]);

        assert_eq!(tables.len(), 5);
        let direct: Vec<_> = tables.direct.iter().map(|o| o.input_code.as_str()).collect();
        assert_eq!(direct, vec!["A000", "A001"]);
        assert_eq!(tables.automatic.len(), 1);
        assert_eq!(tables.semiautomatic.len(), 1);
        assert_eq!(tables.failed.len(), 1);
        assert_eq!(tables.find("B0199").unwrap().tier, Tier::Semiautomatic);
        assert!(tables.find("C000").is_none());
    }

    #[test]
    fn test_summary_percentages() {
        let tables = aggregate(vec![
            outcome("A000", Tier::Direct),
            outcome("A001", Tier::Direct),
            outcome("A0012", Tier::Automatic),
            outcome("Z999", Tier::Failed),
        ]);
        let summary = tables.summary();

        assert_eq!(summary.total, 4);
        assert_eq!(summary.count(Tier::Direct), 2);
        assert!((summary.percent(Tier::Direct) - 50.0).abs() < 1e-9);
        assert!((summary.percent(Tier::Semiautomatic)).abs() < 1e-9);
        assert_eq!(MappingSummary::default().percent(Tier::Failed), 0.0);
    }

    #[test]
    fn test_empty_tables() {
        let tables = aggregate(Vec::new());
        assert!(tables.is_empty());
        assert_eq!(tables.iter().count(), 4);
    }
}
