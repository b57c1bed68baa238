//! CCSR reference table parser.
//!
//! Provides a streaming reader that maps the columns of either reference
//! table layout onto [`CcsrMapping`] rows.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use ccsr_types::{CategoryAssignment, CcsrMapping};
use csv::{Reader, ReaderBuilder, StringRecord};

use crate::types::{CcsrError, CcsrResult, LoadStats, TableFormat};

/// Header positions of the columns the mapper reads.
#[derive(Debug, Clone)]
struct ColumnIndices {
    code: usize,
    code_description: Option<usize>,
    default_category: Option<usize>,
    default_description: Option<usize>,
    /// (category, description) positions for each category slot present.
    categories: Vec<(usize, Option<usize>)>,
}

impl ColumnIndices {
    /// Locates the layout's columns in a header row.
    ///
    /// The code column and the first category column are required; every
    /// other column is optional. Extra columns are ignored.
    fn resolve(headers: &StringRecord, format: TableFormat) -> CcsrResult<(TableFormat, Self)> {
        let cleaned: Vec<String> = headers.iter().map(header_name).collect();
        let format = format.detect(cleaned.iter().map(String::as_str));
        let position = |name: &str| cleaned.iter().position(|h| h == name);

        let first_category = format.category_column(1);
        let mut missing = Vec::new();
        let code = position(format.code_column());
        if code.is_none() {
            missing.push(format.code_column().to_string());
        }
        if position(&first_category).is_none() {
            missing.push(first_category);
        }
        let code = match code {
            Some(code) if missing.is_empty() => code,
            _ => {
                return Err(CcsrError::MissingColumn {
                    column: missing.join(", "),
                })
            }
        };

        let categories = (1..=TableFormat::CATEGORY_SLOTS)
            .filter_map(|slot| {
                let id = position(&format.category_column(slot))?;
                Some((id, position(&format.category_description_column(slot))))
            })
            .collect();

        Ok((
            format,
            Self {
                code,
                code_description: format.code_description_column().and_then(position),
                default_category: position(format.default_category_column()),
                default_description: position(format.default_description_column()),
                categories,
            },
        ))
    }
}

/// Strips a UTF-8 BOM, whitespace and quoting from a header name.
fn header_name(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .trim()
        .trim_matches('\'')
        .trim()
        .to_string()
}

/// A streaming reader for CCSR reference tables.
pub struct ReferenceReader<R: Read> {
    reader: Reader<R>,
    format: TableFormat,
    columns: ColumnIndices,
    stats: LoadStats,
}

impl ReferenceReader<BufReader<File>> {
    /// Opens a reference table file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or its header lacks the
    /// required columns.
    pub fn from_path<P: AsRef<Path>>(path: P, format: TableFormat) -> CcsrResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(CcsrError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), format)
    }
}

impl<R: Read> ReferenceReader<R> {
    /// Creates a reader over CSV data.
    pub fn from_reader(reader: R, format: TableFormat) -> CcsrResult<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::None)
            .from_reader(reader);

        let (format, columns) = ColumnIndices::resolve(csv_reader.headers()?, format)?;

        Ok(Self {
            reader: csv_reader,
            format,
            columns,
            stats: LoadStats::default(),
        })
    }

    /// Returns the layout in use, with `Auto` already resolved.
    pub fn format(&self) -> TableFormat {
        self.format
    }

    /// Returns statistics for the rows read so far.
    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    /// Reads every row, stopping at the first malformed one.
    pub fn parse_all(mut self) -> CcsrResult<Vec<CcsrMapping>> {
        let mut rows = Vec::new();
        for row in self.by_ref() {
            rows.push(row?);
        }
        tracing::debug!(
            total = self.stats.total_rows,
            loaded = self.stats.loaded_rows,
            skipped = self.stats.skipped_rows,
            format = %self.format,
            "parsed reference table"
        );
        Ok(rows)
    }

    fn from_record(&self, record: &StringRecord) -> CcsrResult<CcsrMapping> {
        let field = |index: Option<usize>| index.and_then(|i| record.get(i)).and_then(parse::cell);

        let icd = field(Some(self.columns.code)).ok_or_else(|| CcsrError::MalformedReference {
            row: self.stats.total_rows,
            reason: "empty code".to_string(),
        })?;

        let default_category = field(self.columns.default_category).map(|id| CategoryAssignment {
            id,
            description: field(self.columns.default_description),
        });

        let categories = self
            .columns
            .categories
            .iter()
            .filter_map(|&(id, description)| {
                Some(CategoryAssignment {
                    id: field(Some(id))?,
                    description: field(description),
                })
            })
            .collect();

        Ok(CcsrMapping {
            icd,
            description: field(self.columns.code_description),
            default_category,
            categories,
        })
    }
}

impl<R: Read> Iterator for ReferenceReader<R> {
    type Item = CcsrResult<CcsrMapping>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut record = StringRecord::new();
            match self.reader.read_record(&mut record) {
                Ok(true) => {
                    self.stats.total_rows += 1;

                    if record.iter().all(|f| parse::cell(f).is_none()) {
                        self.stats.skipped_rows += 1;
                        continue;
                    }

                    let row = self.from_record(&record);
                    if row.is_ok() {
                        self.stats.loaded_rows += 1;
                    }
                    return Some(row);
                }
                Ok(false) => return None,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// Helper functions for cleaning reference table cells.
pub mod parse {
    /// Values the official tables use for "no value".
    const NULL_MARKERS: &[&str] = &["", "NA", "\0"];

    /// Cleans a cell, returning `None` for empty or null markers.
    ///
    /// The AHRQ files wrap every value in single quotes (`'A000'`), and pad
    /// unused category slots with a single space.
    pub fn cell(value: &str) -> Option<String> {
        let value = value.trim().trim_matches('\'').trim();
        if NULL_MARKERS.contains(&value) {
            None
        } else {
            Some(value.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAN_TABLE: &str = "\
icd,ccsr_def,ccsr_def_desc,ccsr_1,ccsr_1_desc,ccsr_2,ccsr_2_desc,ccsr_3,ccsr_3_desc,ccsr_4,ccsr_4_desc,ccsr_5,ccsr_5_desc,ccsr_6,ccsr_6_desc
A000,INF003,Bacterial infections,INF003,Bacterial infections,,,,,,,,,,
B010,INF008,Viral infection,INF008,Viral infection,SKN007,Other skin disorders,,,,,,,,
";

    const AHRQ_TABLE: &str = "\
\"'ICD-10-CM CODE'\",\"'ICD-10-CM CODE DESCRIPTION'\",\"'Default CCSR CATEGORY IP'\",\"'Default CCSR CATEGORY DESCRIPTION IP'\",\"'CCSR CATEGORY 1'\",\"'CCSR CATEGORY 1 DESCRIPTION'\",\"'CCSR CATEGORY 2'\",\"'CCSR CATEGORY 2 DESCRIPTION'\"
\"'A000'\",\"'Cholera due to Vibrio cholerae 01, biovar cholerae'\",\"'INF003'\",\"'Bacterial infections'\",\"'INF003'\",\"'Bacterial infections'\",\"' '\",\"' '\"
";

    #[test]
    fn test_parse_cell() {
        assert_eq!(parse::cell("'A000'"), Some("A000".to_string()));
        assert_eq!(parse::cell("  INF003 "), Some("INF003".to_string()));
        assert_eq!(parse::cell(" "), None);
        assert_eq!(parse::cell("' '"), None);
        assert_eq!(parse::cell("NA"), None);
        assert_eq!(parse::cell("\0"), None);
    }

    #[test]
    fn test_read_clean_table() {
        let reader = ReferenceReader::from_reader(CLEAN_TABLE.as_bytes(), TableFormat::Auto).unwrap();
        assert_eq!(reader.format(), TableFormat::Clean);

        let rows = reader.parse_all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].icd, "A000");
        assert_eq!(rows[0].default_category_id(), Some("INF003"));
        assert_eq!(rows[0].categories.len(), 1);
        assert_eq!(
            rows[0].categories[0].description.as_deref(),
            Some("Bacterial infections")
        );
        assert_eq!(
            rows[1].category_ids().collect::<Vec<_>>(),
            vec!["INF008", "SKN007"]
        );
    }

    #[test]
    fn test_read_ahrq_table() {
        let reader = ReferenceReader::from_reader(AHRQ_TABLE.as_bytes(), TableFormat::Auto).unwrap();
        assert_eq!(reader.format(), TableFormat::Ahrq);

        let rows = reader.parse_all().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].icd, "A000");
        assert!(rows[0].description.as_deref().unwrap().starts_with("Cholera"));
        assert_eq!(rows[0].category_ids().collect::<Vec<_>>(), vec!["INF003"]);
    }

    #[test]
    fn test_missing_columns_are_all_reported() {
        let data = "code,category\nA000,INF003\n";
        let err = ReferenceReader::from_reader(data.as_bytes(), TableFormat::Clean)
            .err()
            .unwrap();
        match err {
            CcsrError::MissingColumn { column } => assert_eq!(column, "icd, ccsr_1"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bom_and_extra_columns_tolerated() {
        let data = "\u{feff}icd,extra,ccsr_1\nA000,foo,INF003\n";
        let rows = ReferenceReader::from_reader(data.as_bytes(), TableFormat::Clean)
            .unwrap()
            .parse_all()
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].default_category, None);
        assert_eq!(rows[0].category_ids().collect::<Vec<_>>(), vec!["INF003"]);
    }

    #[test]
    fn test_blank_rows_skipped_and_empty_code_rejected() {
        let data = "icd,ccsr_1\nA000,INF003\n,\n,INF004\n";
        let mut reader = ReferenceReader::from_reader(data.as_bytes(), TableFormat::Clean).unwrap();

        assert_eq!(reader.next().unwrap().unwrap().icd, "A000");
        match reader.next().unwrap() {
            Err(CcsrError::MalformedReference { row, .. }) => assert_eq!(row, 3),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(reader.stats().skipped_rows, 1);
        assert_eq!(reader.stats().loaded_rows, 1);
    }
}
