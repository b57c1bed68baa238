//! In-memory CCSR reference index.
//!
//! Built once from the reference table and never modified afterwards, so a
//! single index can be shared by reference across worker threads.
//!
//! ## Structure
//!
//! - an exact map from normalized code to its merged category set
//! - one prefix map per code length: every leading substring of every
//!   reference code points at the codes sharing it and their categories
//!
//! ```ignore
//! let index = ReferenceIndex::build(&rows, Normalization::default())?;
//!
//! let exact = index.get_exact("A000");
//! let family = index.get_prefix("A00");
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};

use ccsr_types::{code_prefix, CategoryId, CcsrMapping, Normalization};

use crate::types::{CcsrError, CcsrResult};

/// Categories merged for one exact reference code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactEntry {
    /// The normalized reference code.
    pub code: String,
    /// Union of the categories of every row carrying this code.
    pub categories: BTreeSet<CategoryId>,
    /// Default category of the first row that declared one.
    pub default_category: Option<CategoryId>,
}

/// Reference codes sharing one prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixEntry {
    /// Normalized reference codes starting with the prefix.
    pub codes: BTreeSet<String>,
    /// Union of the categories of `codes`.
    pub categories: BTreeSet<CategoryId>,
    /// Number of `codes` carrying each category.
    pub category_counts: BTreeMap<CategoryId, usize>,
}

impl PrefixEntry {
    fn add(&mut self, exact: &ExactEntry) {
        if !self.codes.insert(exact.code.clone()) {
            return;
        }
        for category in &exact.categories {
            self.categories.insert(category.clone());
            *self.category_counts.entry(category.clone()).or_insert(0) += 1;
        }
    }

    /// Returns true if the codes agree on a single category.
    pub fn is_unanimous(&self) -> bool {
        self.categories.len() == 1
    }
}

/// Immutable lookup structures over the CCSR reference table.
#[derive(Default)]
pub struct ReferenceIndex {
    normalization: Normalization,
    /// Exact entries indexed by normalized code.
    exact: HashMap<String, ExactEntry>,
    /// `prefixes[n - 1]` maps every length-`n` prefix to its entry.
    prefixes: Vec<HashMap<String, PrefixEntry>>,
    /// Category descriptions, first non-empty description wins.
    descriptions: HashMap<CategoryId, String>,
    /// Default category keyed by a row's sorted category set.
    defaults_by_set: HashMap<Vec<CategoryId>, CategoryId>,
    /// Rows dropped because they carried no category.
    unassigned_rows: usize,
}

impl std::fmt::Debug for ReferenceIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceIndex")
            .field("normalization", &self.normalization)
            .field("exact", &self.exact.len())
            .field("prefix_lengths", &self.prefixes.len())
            .field("prefix_entries", &self.prefix_entry_count())
            .field("descriptions", &self.descriptions.len())
            .field("defaults_by_set", &self.defaults_by_set.len())
            .field("unassigned_rows", &self.unassigned_rows)
            .finish()
    }
}

impl ReferenceIndex {
    /// Builds the index from reference rows.
    ///
    /// Rows repeating a code are merged by unioning their categories. Rows
    /// without any category are not valid assignments and are left out.
    ///
    /// # Errors
    /// Returns [`CcsrError::EmptyReference`] when no row carries a category and
    /// [`CcsrError::MalformedReference`] for a row whose code normalizes to an
    /// empty string. No partial index is returned.
    pub fn build(rows: &[CcsrMapping], normalization: Normalization) -> CcsrResult<Self> {
        if rows.is_empty() {
            return Err(CcsrError::EmptyReference);
        }

        let mut index = Self {
            normalization,
            ..Default::default()
        };

        for (i, row) in rows.iter().enumerate() {
            let code = normalization.normalize(&row.icd);
            if code.is_empty() {
                return Err(CcsrError::MalformedReference {
                    row: i + 1,
                    reason: format!("code {:?} is empty after normalization", row.icd),
                });
            }

            index.record_descriptions(row);
            if row.is_unassigned() {
                index.unassigned_rows += 1;
                continue;
            }

            let mut key: Vec<CategoryId> = row.category_ids().map(str::to_string).collect();
            key.sort();
            key.dedup();
            if let Some(default) = row.default_category_id() {
                index
                    .defaults_by_set
                    .entry(key)
                    .or_insert_with(|| default.to_string());
            }

            let entry = index.exact.entry(code.clone()).or_insert_with(|| ExactEntry {
                code,
                categories: BTreeSet::new(),
                default_category: None,
            });
            entry
                .categories
                .extend(row.category_ids().map(str::to_string));
            if entry.default_category.is_none() {
                entry.default_category = row.default_category_id().map(str::to_string);
            }
        }

        if index.exact.is_empty() {
            return Err(CcsrError::EmptyReference);
        }
        if index.unassigned_rows > 0 {
            tracing::warn!(
                rows = index.unassigned_rows,
                "reference rows without any category were left out of the index"
            );
        }

        index.build_prefixes();
        tracing::debug!(?index, "built reference index");
        Ok(index)
    }

    fn record_descriptions(&mut self, row: &CcsrMapping) {
        for assignment in row.default_category.iter().chain(&row.categories) {
            if let Some(description) = &assignment.description {
                self.descriptions
                    .entry(assignment.id.clone())
                    .or_insert_with(|| description.clone());
            }
        }
    }

    fn build_prefixes(&mut self) {
        let max_len = self
            .exact
            .keys()
            .map(|code| code.chars().count())
            .max()
            .unwrap_or(0);
        let mut prefixes: Vec<HashMap<String, PrefixEntry>> = vec![HashMap::new(); max_len];

        for entry in self.exact.values() {
            for len in 1..=entry.code.chars().count() {
                if let Some(prefix) = code_prefix(&entry.code, len) {
                    prefixes[len - 1]
                        .entry(prefix.to_string())
                        .or_default()
                        .add(entry);
                }
            }
        }

        self.prefixes = prefixes;
    }

    /// Returns the normalization the index was built with.
    pub fn normalization(&self) -> Normalization {
        self.normalization
    }

    /// Normalizes a code with the index's rules.
    pub fn normalize(&self, code: &str) -> String {
        self.normalization.normalize(code)
    }

    /// Looks up an already-normalized code.
    pub fn get_exact(&self, code: &str) -> Option<&ExactEntry> {
        self.exact.get(code)
    }

    /// Returns true if the normalized code is in the reference table.
    pub fn has_code(&self, code: &str) -> bool {
        self.exact.contains_key(code)
    }

    /// Looks up the codes sharing an already-normalized prefix.
    pub fn get_prefix(&self, prefix: &str) -> Option<&PrefixEntry> {
        let len = prefix.chars().count();
        if len == 0 {
            return None;
        }
        self.prefixes.get(len - 1)?.get(prefix)
    }

    /// Returns the description of a category.
    pub fn category_description(&self, category: &str) -> Option<&str> {
        self.descriptions.get(category).map(String::as_str)
    }

    /// Returns the default category recorded for an exact category set.
    ///
    /// `categories` must be sorted and free of duplicates.
    pub fn default_for_set(&self, categories: &[CategoryId]) -> Option<&str> {
        self.defaults_by_set.get(categories).map(String::as_str)
    }

    /// Returns the number of distinct reference codes.
    pub fn code_count(&self) -> usize {
        self.exact.len()
    }

    /// Returns the length of the longest reference code.
    pub fn max_code_len(&self) -> usize {
        self.prefixes.len()
    }

    /// Returns the number of prefix entries across all lengths.
    pub fn prefix_entry_count(&self) -> usize {
        self.prefixes.iter().map(HashMap::len).sum()
    }

    /// Returns the number of rows left out for carrying no category.
    pub fn unassigned_rows(&self) -> usize {
        self.unassigned_rows
    }

    /// Returns an iterator over all exact entries.
    pub fn entries(&self) -> impl Iterator<Item = &ExactEntry> {
        self.exact.values()
    }
}
