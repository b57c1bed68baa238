//! # ccsr-types
//!
//! Type definitions for resolving ICD-10 diagnosis codes into CCSR
//! (Clinical Classifications Software Refined) categories.
//!
//! This crate provides the reference table row, the code normalization rules,
//! the four confidence tiers and the per-code outcome record shared by the
//! mapper and its callers.
//!
//! ## Features
//!
//! - `serde` (default): Enables serialization/deserialization support via serde.
//!   Disable this feature for zero-dependency usage.
//!
//! ## Usage
//!
//! ```rust
//! use ccsr_types::{CcsrMapping, Normalization, ResolutionOutcome, Tier};
//!
//! let row = CcsrMapping::new("A000", ["INF003"]);
//! assert_eq!(row.category_ids().next(), Some("INF003"));
//!
//! let rules = Normalization::default();
//! assert_eq!(rules.normalize("a00.0"), "A000");
//!
//! let outcome = ResolutionOutcome::failed("Z99.9", "Z999");
//! assert_eq!(outcome.tier, Tier::Failed);
//! ```

#![warn(missing_docs)]

mod code;
mod mapping;
mod outcome;
mod tier;

pub use code::{code_prefix, CategoryId, Normalization, DEFAULT_MIN_PREFIX_LEN};
pub use mapping::{CategoryAssignment, CcsrMapping};
pub use outcome::{CategoryShare, MatchBasis, ResolutionOutcome};
pub use tier::Tier;
