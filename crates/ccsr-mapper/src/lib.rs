//! # ccsr-mapper
//!
//! Resolves ICD-10 diagnosis codes into CCSR categories using an AHRQ
//! reference table.
//!
//! Codes found verbatim in the table are `direct` matches. Codes missing from
//! it fall back to their most specific ancestor family in the ICD-10
//! hierarchy: a family that agrees on one category is an `automatic` match,
//! one that disagrees is a `semiautomatic` match carrying every candidate,
//! and codes with no family above the prefix floor are `failed`.
//!
//! ## Features
//!
//! - `parallel` (default): resolves large code lists with rayon.
//!
//! ## Usage
//!
//! ```rust
//! use ccsr_mapper::{map_icd_to_ccsr, ResolverConfig};
//! use ccsr_mapper::ccsr_types::{CcsrMapping, Tier};
//!
//! let reference = vec![
//!     CcsrMapping::new("A000", ["INF003"]),
//!     CcsrMapping::new("A001", ["INF003"]),
//! ];
//! let tables = map_icd_to_ccsr(&["A00.0", "A0012"], &reference, ResolverConfig::default())?;
//!
//! assert_eq!(tables.direct.len(), 1);
//! assert_eq!(tables.find("A0012").map(|o| o.tier), Some(Tier::Automatic));
//! # Ok::<(), ccsr_mapper::CcsrError>(())
//! ```

#![warn(missing_docs)]

pub mod aggregate;
pub mod classifier;
pub mod index;
pub mod loader;
pub mod matcher;
pub mod parser;
pub mod pipeline;
pub mod resolver;
pub mod types;
pub mod writer;

pub use aggregate::{aggregate, MappingSummary, ResolutionTables};
pub use classifier::classify;
pub use index::{ExactEntry, PrefixEntry, ReferenceIndex};
pub use loader::{
    discover_reference_file, extract_version, format_share, load_codes, load_reference_table,
    read_codes,
};
pub use matcher::{match_direct, match_normalized};
pub use parser::ReferenceReader;
pub use pipeline::{map_icd_to_ccsr, CcsrMapper};
pub use resolver::{resolve, FallbackMatch};
pub use types::{CcsrError, CcsrResult, LoadStats, ResolverConfig, TableFormat};
pub use writer::{write_table, write_tables};

// Re-export ccsr-types for convenience
pub use ccsr_types;
