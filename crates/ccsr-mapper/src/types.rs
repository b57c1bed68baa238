//! Error, configuration and statistics types shared by the mapper.

use std::fmt;
use std::str::FromStr;

use ccsr_types::{Normalization, DEFAULT_MIN_PREFIX_LEN};
use thiserror::Error;

/// Errors that can occur while loading reference data or resolving codes.
#[derive(Error, Debug)]
pub enum CcsrError {
    /// I/O error reading or writing a file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Required column(s) missing from a table header.
    #[error("Missing required column: {column}")]
    MissingColumn {
        /// The missing column name(s), comma separated.
        column: String,
    },

    /// The reference table has no usable rows.
    #[error("Reference table contains no rows")]
    EmptyReference,

    /// A reference row violates the expected schema.
    #[error("Malformed reference row {row}: {reason}")]
    MalformedReference {
        /// 1-based data row number.
        row: usize,
        /// What is wrong with the row.
        reason: String,
    },

    /// No codes were given to resolve.
    #[error("Code list is empty")]
    EmptyCodeList,

    /// A queried code is blank after normalization.
    #[error("Invalid code at position {position}: {value:?}")]
    InvalidCode {
        /// 0-based position in the code list.
        position: usize,
        /// The raw value.
        value: String,
    },

    /// Configuration value out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for mapper operations.
pub type CcsrResult<T> = Result<T, CcsrError>;

/// Column layout of the reference table.
///
/// Only the column names differ between variants; the resolution algorithm
/// sees the same [`CcsrMapping`](ccsr_types::CcsrMapping) rows either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableFormat {
    /// Pick `Ahrq` when the header carries the official code column,
    /// `Clean` otherwise.
    #[default]
    Auto,
    /// Cleaned layout: `icd`, `ccsr_def`, `ccsr_def_desc`, `ccsr_1`..`ccsr_6`
    /// and `ccsr_n_desc`.
    Clean,
    /// Official AHRQ DXCCSR layout (`'ICD-10-CM CODE'`, `'CCSR CATEGORY 1'`, ...).
    Ahrq,
}

impl TableFormat {
    /// Maximum number of category columns in the reference table.
    pub const CATEGORY_SLOTS: usize = 6;

    /// Name of the ICD-10 code column.
    pub fn code_column(self) -> &'static str {
        match self {
            Self::Ahrq => "ICD-10-CM CODE",
            Self::Auto | Self::Clean => "icd",
        }
    }

    /// Name of the ICD-10 code description column, if the layout has one.
    pub fn code_description_column(self) -> Option<&'static str> {
        match self {
            Self::Ahrq => Some("ICD-10-CM CODE DESCRIPTION"),
            Self::Auto | Self::Clean => None,
        }
    }

    /// Name of the default category column.
    pub fn default_category_column(self) -> &'static str {
        match self {
            Self::Ahrq => "Default CCSR CATEGORY IP",
            Self::Auto | Self::Clean => "ccsr_def",
        }
    }

    /// Name of the default category description column.
    pub fn default_description_column(self) -> &'static str {
        match self {
            Self::Ahrq => "Default CCSR CATEGORY DESCRIPTION IP",
            Self::Auto | Self::Clean => "ccsr_def_desc",
        }
    }

    /// Name of the n-th category column (1-based).
    pub fn category_column(self, slot: usize) -> String {
        match self {
            Self::Ahrq => format!("CCSR CATEGORY {slot}"),
            Self::Auto | Self::Clean => format!("ccsr_{slot}"),
        }
    }

    /// Name of the n-th category description column (1-based).
    pub fn category_description_column(self, slot: usize) -> String {
        match self {
            Self::Ahrq => format!("CCSR CATEGORY {slot} DESCRIPTION"),
            Self::Auto | Self::Clean => format!("ccsr_{slot}_desc"),
        }
    }

    /// Resolves `Auto` against a cleaned header row.
    pub fn detect<'a, I>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        if self != Self::Auto {
            return self;
        }
        let ahrq_code = Self::Ahrq.code_column();
        if headers.into_iter().any(|h| h == ahrq_code) {
            Self::Ahrq
        } else {
            Self::Clean
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Clean => "clean",
            Self::Ahrq => "ahrq",
        })
    }
}

impl FromStr for TableFormat {
    type Err = CcsrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "clean" => Ok(Self::Clean),
            "ahrq" => Ok(Self::Ahrq),
            other => Err(CcsrError::InvalidConfig(format!(
                "unknown table format '{other}' (expected auto, clean or ahrq)"
            ))),
        }
    }
}

/// Configuration for code resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Shortest prefix searched during hierarchical fallback.
    pub min_prefix_len: usize,
    /// Normalization applied to reference and queried codes alike.
    pub normalization: Normalization,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            min_prefix_len: DEFAULT_MIN_PREFIX_LEN,
            normalization: Normalization::default(),
        }
    }
}

impl ResolverConfig {
    /// Checks that the configuration can be used for resolution.
    pub fn validate(&self) -> CcsrResult<()> {
        if self.min_prefix_len == 0 {
            return Err(CcsrError::InvalidConfig(
                "min_prefix_len must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Statistics from reading a reference table.
#[derive(Debug, Clone, Default)]
pub struct LoadStats {
    /// Data rows read from the file.
    pub total_rows: usize,
    /// Rows that produced a mapping.
    pub loaded_rows: usize,
    /// Blank rows skipped.
    pub skipped_rows: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolver_config_default() {
        let config = ResolverConfig::default();
        assert_eq!(config.min_prefix_len, 3);
        assert!(config.normalization.uppercase);
        assert!(config.normalization.strip_punctuation);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resolver_config_rejects_zero_floor() {
        let config = ResolverConfig {
            min_prefix_len: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CcsrError::InvalidConfig(_))));
    }

    #[test]
    fn test_table_format_columns() {
        assert_eq!(TableFormat::Clean.category_column(2), "ccsr_2");
        assert_eq!(TableFormat::Clean.category_description_column(6), "ccsr_6_desc");
        assert_eq!(TableFormat::Ahrq.category_column(1), "CCSR CATEGORY 1");
        assert_eq!(
            TableFormat::Ahrq.category_description_column(3),
            "CCSR CATEGORY 3 DESCRIPTION"
        );
        assert_eq!(TableFormat::Clean.code_description_column(), None);
    }

    #[test]
    fn test_table_format_detect() {
        let ahrq = ["ICD-10-CM CODE", "CCSR CATEGORY 1"];
        let clean = ["icd", "ccsr_1"];
        assert_eq!(TableFormat::Auto.detect(ahrq), TableFormat::Ahrq);
        assert_eq!(TableFormat::Auto.detect(clean), TableFormat::Clean);
        assert_eq!(TableFormat::Clean.detect(ahrq), TableFormat::Clean);
    }

    #[test]
    fn test_table_format_from_str() {
        assert_eq!("AHRQ".parse::<TableFormat>().unwrap(), TableFormat::Ahrq);
        assert_eq!("clean".parse::<TableFormat>().unwrap(), TableFormat::Clean);
        assert!("xlsx".parse::<TableFormat>().is_err());
    }
}
