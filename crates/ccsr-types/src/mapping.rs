//! CCSR reference table row type.
//!
//! This module provides the `CcsrMapping` struct representing one row of the
//! official CCSR reference table after the loader has mapped its columns onto
//! the fixed internal schema.

use crate::CategoryId;

/// One CCSR category assigned to a code, with its description when known.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategoryAssignment {
    /// The CCSR category identifier.
    pub id: CategoryId,
    /// Human readable category description.
    pub description: Option<String>,
}

impl CategoryAssignment {
    /// Creates an assignment without a description.
    pub fn new(id: impl Into<CategoryId>) -> Self {
        Self {
            id: id.into(),
            description: None,
        }
    }

    /// Creates an assignment carrying a description.
    pub fn with_description(id: impl Into<CategoryId>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: Some(description.into()),
        }
    }
}

/// A row of the CCSR reference table.
///
/// The official table lists up to six categories per ICD-10 code plus a
/// default category used when a single category must be reported.
///
/// # Examples
///
/// ```
/// use ccsr_types::{CategoryAssignment, CcsrMapping};
///
/// let row = CcsrMapping {
///     icd: "A000".to_string(),
///     description: Some("Cholera due to Vibrio cholerae 01, biovar cholerae".to_string()),
///     default_category: Some(CategoryAssignment::with_description("INF003", "Bacterial infections")),
///     categories: vec![CategoryAssignment::with_description("INF003", "Bacterial infections")],
/// };
///
/// assert_eq!(row.category_ids().collect::<Vec<_>>(), vec!["INF003"]);
/// assert_eq!(row.default_category_id(), Some("INF003"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CcsrMapping {
    /// ICD-10 code as written in the reference table.
    pub icd: String,
    /// ICD-10 code description.
    pub description: Option<String>,
    /// Default CCSR category for this code.
    pub default_category: Option<CategoryAssignment>,
    /// All CCSR categories assigned to this code, in column order.
    pub categories: Vec<CategoryAssignment>,
}

impl CcsrMapping {
    /// Creates a row from a code and bare category identifiers.
    pub fn new<I, S>(icd: impl Into<String>, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CategoryId>,
    {
        Self {
            icd: icd.into(),
            description: None,
            default_category: None,
            categories: categories.into_iter().map(CategoryAssignment::new).collect(),
        }
    }

    /// Returns an iterator over the category identifiers of this row.
    pub fn category_ids(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.id.as_str())
    }

    /// Returns the default category identifier, if any.
    pub fn default_category_id(&self) -> Option<&str> {
        self.default_category.as_ref().map(|c| c.id.as_str())
    }

    /// Returns true if the row carries no category at all.
    pub fn is_unassigned(&self) -> bool {
        self.categories.is_empty()
    }
}
