//! End-to-end resolution of a code list.
//!
//! ```ignore
//! let rows = load_reference_table("DXCCSR_v2023-1.csv", TableFormat::Auto)?;
//! let mapper = CcsrMapper::new(&rows, ResolverConfig::default())?;
//!
//! let tables = mapper.map_codes(&["A000", "A0012", "B0199", "Z999"])?;
//! println!("{} direct, {} failed", tables.direct.len(), tables.failed.len());
//! ```

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use ccsr_types::{CcsrMapping, ResolutionOutcome};

use crate::aggregate::{aggregate, ResolutionTables};
use crate::classifier::classify;
use crate::index::ReferenceIndex;
use crate::matcher::match_normalized;
use crate::resolver::resolve;
use crate::types::{CcsrError, CcsrResult, ResolverConfig};

/// Resolves ICD-10 codes against one reference index.
///
/// The mapper owns an immutable index; resolving never mutates it, so a
/// mapper can be shared across threads and reused for many code lists.
#[derive(Debug)]
pub struct CcsrMapper {
    index: ReferenceIndex,
    config: ResolverConfig,
}

impl CcsrMapper {
    /// Builds the index from reference rows.
    pub fn new(rows: &[CcsrMapping], config: ResolverConfig) -> CcsrResult<Self> {
        config.validate()?;
        let index = ReferenceIndex::build(rows, config.normalization)?;
        tracing::info!(
            codes = index.code_count(),
            prefixes = index.prefix_entry_count(),
            min_prefix_len = config.min_prefix_len,
            "reference index ready"
        );
        Ok(Self { index, config })
    }

    /// Wraps an index built elsewhere.
    ///
    /// # Errors
    /// Fails if the configuration is invalid or its normalization differs
    /// from the one the index was built with.
    pub fn from_index(index: ReferenceIndex, config: ResolverConfig) -> CcsrResult<Self> {
        config.validate()?;
        if index.normalization() != config.normalization {
            return Err(CcsrError::InvalidConfig(
                "normalization differs from the one used to build the index".to_string(),
            ));
        }
        Ok(Self { index, config })
    }

    /// Returns the reference index.
    pub fn index(&self) -> &ReferenceIndex {
        &self.index
    }

    /// Returns the resolver configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolves a single code.
    pub fn resolve_code(&self, code: &str) -> ResolutionOutcome {
        self.resolve_normalized(code, &self.index.normalize(code))
    }

    fn resolve_normalized(&self, code: &str, normalized: &str) -> ResolutionOutcome {
        let direct = match_normalized(normalized, &self.index);
        let fallback = match direct {
            Some(_) => None,
            None => resolve(normalized, &self.index, self.config.min_prefix_len),
        };
        let outcome = classify(code, normalized, direct, fallback.as_ref(), &self.index);
        tracing::trace!(code, tier = %outcome.tier, basis = outcome.matched_basis(), "resolved");
        outcome
    }

    /// Resolves every code and splits the outcomes into the four tables.
    ///
    /// Duplicate codes are resolved once per occurrence, so the tables hold
    /// exactly one row per element of `codes`.
    ///
    /// # Errors
    /// Fails before resolving anything if `codes` is empty or any code is
    /// blank after normalization.
    pub fn map_codes<S>(&self, codes: &[S]) -> CcsrResult<ResolutionTables>
    where
        S: AsRef<str> + Sync,
    {
        let normalized = self.normalize_input(codes)?;
        let outcomes = self.resolve_all(codes, &normalized);
        let tables = aggregate(outcomes);

        let summary = tables.summary();
        tracing::info!(
            total = summary.total,
            direct = summary.direct,
            automatic = summary.automatic,
            semiautomatic = summary.semiautomatic,
            failed = summary.failed,
            "mapped codes"
        );
        Ok(tables)
    }

    fn normalize_input<S: AsRef<str>>(&self, codes: &[S]) -> CcsrResult<Vec<String>> {
        if codes.is_empty() {
            return Err(CcsrError::EmptyCodeList);
        }

        codes
            .iter()
            .enumerate()
            .map(|(position, code)| {
                let normalized = self.index.normalize(code.as_ref());
                if normalized.is_empty() {
                    Err(CcsrError::InvalidCode {
                        position,
                        value: code.as_ref().to_string(),
                    })
                } else {
                    Ok(normalized)
                }
            })
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn resolve_all<S>(&self, codes: &[S], normalized: &[String]) -> Vec<ResolutionOutcome>
    where
        S: AsRef<str> + Sync,
    {
        // Indexed collect keeps input order.
        codes
            .par_iter()
            .zip(normalized.par_iter())
            .map(|(code, normalized)| self.resolve_normalized(code.as_ref(), normalized))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn resolve_all<S>(&self, codes: &[S], normalized: &[String]) -> Vec<ResolutionOutcome>
    where
        S: AsRef<str> + Sync,
    {
        codes
            .iter()
            .zip(normalized)
            .map(|(code, normalized)| self.resolve_normalized(code.as_ref(), normalized))
            .collect()
    }
}

/// Builds an index from `rows` and resolves `codes` against it.
pub fn map_icd_to_ccsr<S>(
    codes: &[S],
    rows: &[CcsrMapping],
    config: ResolverConfig,
) -> CcsrResult<ResolutionTables>
where
    S: AsRef<str> + Sync,
{
    // Input errors come before reference errors.
    if codes.is_empty() {
        return Err(CcsrError::EmptyCodeList);
    }
    CcsrMapper::new(rows, config)?.map_codes(codes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccsr_types::{Normalization, Tier};

    fn scenario_rows() -> Vec<CcsrMapping> {
        vec![
            CcsrMapping::new("A000", ["C1"]),
            CcsrMapping::new("A00", ["C1"]),
            CcsrMapping::new("B010", ["C2"]),
            CcsrMapping::new("B011", ["C3"]),
        ]
    }

    fn ids(outcome: &ResolutionOutcome) -> Vec<&str> {
        outcome.category_ids().collect()
    }

    #[test]
    fn test_reference_scenario() {
        let tables = map_icd_to_ccsr(
            &["A000", "A0012", "B0199", "Z999"],
            &scenario_rows(),
            ResolverConfig::default(),
        )
        .unwrap();

        assert_eq!(tables.direct.len(), 1);
        assert_eq!(tables.direct[0].input_code, "A000");
        assert_eq!(ids(&tables.direct[0]), vec!["C1"]);

        assert_eq!(tables.automatic.len(), 1);
        assert_eq!(tables.automatic[0].input_code, "A0012");
        assert_eq!(tables.automatic[0].matched_basis(), "A00");
        assert_eq!(ids(&tables.automatic[0]), vec!["C1"]);

        assert_eq!(tables.semiautomatic.len(), 1);
        assert_eq!(tables.semiautomatic[0].input_code, "B0199");
        assert_eq!(tables.semiautomatic[0].matched_basis(), "B01");
        assert_eq!(ids(&tables.semiautomatic[0]), vec!["C2", "C3"]);

        assert_eq!(tables.failed.len(), 1);
        assert_eq!(tables.failed[0].input_code, "Z999");
        assert_eq!(tables.failed[0].matched_basis(), "");
    }

    #[test]
    fn test_totality_and_disjointness() {
        let codes = [
            "A000", "a00.0", "A0012", "B0199", "B01", "Z999", "A0", "A00", "B0199",
        ];
        let tables = map_icd_to_ccsr(&codes, &scenario_rows(), ResolverConfig::default()).unwrap();

        assert_eq!(tables.len(), codes.len());
        for (tier, rows) in tables.iter() {
            assert!(rows.iter().all(|row| row.tier == tier));
        }
        // Duplicates of a code always land in the same table.
        let b0199: Vec<_> = tables
            .semiautomatic
            .iter()
            .filter(|o| o.input_code == "B0199")
            .collect();
        assert_eq!(b0199.len(), 2);
        assert_eq!(tables.table(Tier::Failed).len(), 2);
    }

    #[test]
    fn test_order_preserved_within_tables() {
        let codes = ["A00", "Z999", "A000", "Y000", "a000"];
        let tables = map_icd_to_ccsr(&codes, &scenario_rows(), ResolverConfig::default()).unwrap();

        let direct: Vec<_> = tables.direct.iter().map(|o| o.input_code.as_str()).collect();
        assert_eq!(direct, vec!["A00", "A000", "a000"]);
        let failed: Vec<_> = tables.failed.iter().map(|o| o.input_code.as_str()).collect();
        assert_eq!(failed, vec!["Z999", "Y000"]);
    }

    #[test]
    fn test_deterministic() {
        let codes = ["B0199", "A0012", "Z999", "A000", "B01", "B0111"];
        let mapper = CcsrMapper::new(&scenario_rows(), ResolverConfig::default()).unwrap();
        let first = mapper.map_codes(&codes).unwrap();
        let second = mapper.map_codes(&codes).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_exact_match_priority() {
        // A00 exists verbatim and also prefixes A000.
        let mapper = CcsrMapper::new(&scenario_rows(), ResolverConfig::default()).unwrap();
        let outcome = mapper.resolve_code("A00");
        assert_eq!(outcome.tier, Tier::Direct);
        assert_eq!(outcome.matched_basis(), "A00");
    }

    #[test]
    fn test_most_specific_ancestor() {
        let rows = vec![CcsrMapping::new("A00", ["X"]), CcsrMapping::new("A001", ["Y"])];
        let mapper = CcsrMapper::new(&rows, ResolverConfig::default()).unwrap();
        let outcome = mapper.resolve_code("A0012");
        assert_eq!(outcome.tier, Tier::Automatic);
        assert_eq!(outcome.matched_basis(), "A001");
        assert_eq!(ids(&outcome), vec!["Y"]);
    }

    #[test]
    fn test_floor_behavior() {
        let rows = vec![CcsrMapping::new("A010", ["C1"])];
        let mapper = CcsrMapper::new(&rows, ResolverConfig::default()).unwrap();
        assert_eq!(mapper.resolve_code("A0999").tier, Tier::Failed);

        let loose = ResolverConfig {
            min_prefix_len: 2,
            ..Default::default()
        };
        let mapper = CcsrMapper::new(&rows, loose).unwrap();
        assert_eq!(mapper.resolve_code("A0999").tier, Tier::Automatic);
    }

    #[test]
    fn test_input_errors() {
        let rows = scenario_rows();
        let empty: [&str; 0] = [];
        assert!(matches!(
            map_icd_to_ccsr(&empty, &rows, ResolverConfig::default()),
            Err(CcsrError::EmptyCodeList)
        ));
        assert!(matches!(
            map_icd_to_ccsr(&empty, &[], ResolverConfig::default()),
            Err(CcsrError::EmptyCodeList)
        ));

        match map_icd_to_ccsr(&["A000", " .. "], &rows, ResolverConfig::default()) {
            Err(CcsrError::InvalidCode { position, value }) => {
                assert_eq!(position, 1);
                assert_eq!(value, " .. ");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_reference_errors() {
        assert!(matches!(
            map_icd_to_ccsr(&["A000"], &[], ResolverConfig::default()),
            Err(CcsrError::EmptyReference)
        ));
    }

    #[test]
    fn test_from_index_requires_matching_normalization() {
        let index = ReferenceIndex::build(&scenario_rows(), Normalization::default()).unwrap();
        let config = ResolverConfig {
            normalization: Normalization {
                uppercase: false,
                strip_punctuation: true,
            },
            ..Default::default()
        };
        assert!(matches!(
            CcsrMapper::from_index(index, config),
            Err(CcsrError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_case_sensitive_normalization() {
        let config = ResolverConfig {
            normalization: Normalization {
                uppercase: false,
                strip_punctuation: true,
            },
            ..Default::default()
        };
        let mapper = CcsrMapper::new(&scenario_rows(), config).unwrap();
        assert_eq!(mapper.resolve_code("a000").tier, Tier::Failed);
        assert_eq!(mapper.resolve_code("A00.0").tier, Tier::Direct);
    }
}
