//! CSV output of the four resolution tables.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use ccsr_types::{ResolutionOutcome, Tier};
use csv::Writer;
use serde::Serialize;

use crate::aggregate::ResolutionTables;
use crate::types::CcsrResult;

/// Separator for multi-valued cells.
const LIST_SEPARATOR: &str = ";";

/// One output table row.
#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    input_code: &'a str,
    normalized_code: &'a str,
    matched_basis: &'a str,
    categories: String,
    category_descriptions: String,
    default_category: &'a str,
    related_codes: String,
    category_shares: String,
    tier: &'static str,
}

impl<'a> From<&'a ResolutionOutcome> for OutputRow<'a> {
    fn from(outcome: &'a ResolutionOutcome) -> Self {
        Self {
            input_code: &outcome.input_code,
            normalized_code: &outcome.normalized_code,
            matched_basis: outcome.matched_basis(),
            categories: join(outcome.category_ids()),
            category_descriptions: join(
                outcome
                    .categories
                    .iter()
                    .map(|c| c.description.as_deref().unwrap_or("")),
            ),
            default_category: outcome.default_category.as_deref().unwrap_or(""),
            related_codes: join(outcome.related_codes.iter().map(String::as_str)),
            category_shares: join(
                outcome
                    .shares
                    .iter()
                    .map(|s| format!("{}:{:.2}", s.category, s.share_pct)),
            ),
            tier: outcome.tier.as_str(),
        }
    }
}

fn join<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|v| v.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

/// Returns the file name used for a tier's table.
pub fn table_file_name(tier: Tier) -> String {
    format!("{}.csv", tier.as_str())
}

/// Writes one table as CSV, header included even when empty.
pub fn write_table<W: Write>(writer: W, rows: &[ResolutionOutcome]) -> CcsrResult<()> {
    let mut csv_writer = Writer::from_writer(writer);
    if rows.is_empty() {
        csv_writer.write_record(HEADER)?;
    }
    for row in rows {
        csv_writer.serialize(OutputRow::from(row))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Column names of every output table.
pub const HEADER: [&str; 9] = [
    "input_code",
    "normalized_code",
    "matched_basis",
    "categories",
    "category_descriptions",
    "default_category",
    "related_codes",
    "category_shares",
    "tier",
];

/// Writes `direct.csv`, `automatic.csv`, `semiautomatic.csv` and `failed.csv`
/// into `dir`, creating it if needed. Returns the written paths.
pub fn write_tables<P: AsRef<Path>>(dir: P, tables: &ResolutionTables) -> CcsrResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(Tier::ALL.len());
    for (tier, rows) in tables.iter() {
        let path = dir.join(table_file_name(tier));
        write_table(fs::File::create(&path)?, rows)?;
        tracing::debug!(rows = rows.len(), "wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
