//! Reference table discovery and input code loading.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use ccsr_types::CcsrMapping;
use csv::ReaderBuilder;

use crate::parser::{parse, ReferenceReader};
use crate::types::{CcsrError, CcsrResult, TableFormat};

/// Locates the reference table to load.
///
/// A file path is returned as-is. For a directory, the official
/// `DXCCSR_v<version>.csv` files are searched and the newest version wins.
pub fn discover_reference_file<P: AsRef<Path>>(path: P) -> CcsrResult<PathBuf> {
    let path = path.as_ref();

    if path.is_file() {
        return Ok(path.to_path_buf());
    }
    if !path.is_dir() {
        return Err(CcsrError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let mut candidates = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let filename = entry.file_name();
        let filename_str = filename.to_string_lossy();

        if filename_str.to_ascii_uppercase().starts_with("DXCCSR")
            && filename_str.to_ascii_lowercase().ends_with(".csv")
        {
            candidates.push(entry.path());
        }
    }

    candidates.sort();
    candidates.pop().ok_or_else(|| CcsrError::FileNotFound {
        path: format!("DXCCSR_*.csv not found in {}", path.display()),
    })
}

/// Extracts the release version from a reference file name.
///
/// Official files are named like `DXCCSR_v2023-1.csv`.
pub fn extract_version(filename: &str) -> Option<String> {
    let stem = filename
        .strip_suffix(".csv")
        .or_else(|| filename.strip_suffix(".CSV"))
        .unwrap_or(filename);
    let last = stem.rsplit('_').next()?;

    let digits = last.strip_prefix('v').or_else(|| last.strip_prefix('V'))?;
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit() || c == '-') {
        Some(last.to_string())
    } else {
        None
    }
}

/// Loads every row of a reference table file.
pub fn load_reference_table<P: AsRef<Path>>(
    path: P,
    format: TableFormat,
) -> CcsrResult<Vec<CcsrMapping>> {
    let path = path.as_ref();
    let reader = ReferenceReader::from_path(path, format)?;
    let format = reader.format();
    let rows = reader.parse_all()?;

    tracing::info!(
        rows = rows.len(),
        %format,
        "loaded reference table from {}",
        path.display()
    );
    Ok(rows)
}

/// Loads the codes to resolve from a file.
///
/// With `column`, the file is read as CSV with a header row and the named
/// column is used. Without it, every non-blank line is one code.
pub fn load_codes<P: AsRef<Path>>(path: P, column: Option<&str>) -> CcsrResult<Vec<String>> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(CcsrError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let file = File::open(path)?;
    let codes = read_codes(BufReader::new(file), column)?;
    tracing::info!(codes = codes.len(), "loaded codes from {}", path.display());
    Ok(codes)
}

/// Reads the codes to resolve from any reader. See [`load_codes`].
///
/// Blank entries are skipped; every other value is kept verbatim apart from
/// surrounding whitespace.
pub fn read_codes<R: Read>(reader: R, column: Option<&str>) -> CcsrResult<Vec<String>> {
    match column {
        Some(column) => read_code_column(reader, column),
        None => {
            let mut codes = Vec::new();
            for line in BufReader::new(reader).lines() {
                let line = line?;
                let code = line.trim();
                if !code.is_empty() {
                    codes.push(code.to_string());
                }
            }
            Ok(codes)
        }
    }
}

fn read_code_column<R: Read>(reader: R, column: &str) -> CcsrResult<Vec<String>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let position = csv_reader
        .headers()?
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == column)
        .ok_or_else(|| CcsrError::MissingColumn {
            column: column.to_string(),
        })?;

    let mut codes = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if let Some(value) = record.get(position).and_then(parse::cell) {
            codes.push(value);
        }
    }
    Ok(codes)
}

/// Formats a count as a percentage of `total` with one decimal.
pub fn format_share(count: usize, total: usize) -> String {
    if total == 0 {
        "0.0%".to_string()
    } else {
        format!("{:.1}%", count as f64 * 100.0 / total as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_version() {
        assert_eq!(
            extract_version("DXCCSR_v2023-1.csv"),
            Some("v2023-1".to_string())
        );
        assert_eq!(
            extract_version("DXCCSR_V2021-2.CSV"),
            Some("V2021-2".to_string())
        );
        assert_eq!(extract_version("ccsr_reference.csv"), None);
        assert_eq!(extract_version("DXCCSR_vNext.csv"), None);
    }

    #[test]
    fn test_read_codes_plain_lines() {
        let data = "A000\n\n  a00.12 \nZ999\n";
        let codes = read_codes(data.as_bytes(), None).unwrap();
        assert_eq!(codes, vec!["A000", "a00.12", "Z999"]);
    }

    #[test]
    fn test_read_codes_named_column() {
        let data = "patient,diagnosis_code\n1,A000\n2,\n3,B0199\n";
        let codes = read_codes(data.as_bytes(), Some("diagnosis_code")).unwrap();
        assert_eq!(codes, vec!["A000", "B0199"]);
    }

    #[test]
    fn test_read_codes_missing_column() {
        let data = "patient,code\n1,A000\n";
        let err = read_codes(data.as_bytes(), Some("diagnosis_code")).unwrap_err();
        assert!(matches!(err, CcsrError::MissingColumn { .. }));
    }

    #[test]
    fn test_missing_reference_path() {
        let err = discover_reference_file("/nonexistent/ccsr/reference").unwrap_err();
        assert!(matches!(err, CcsrError::FileNotFound { .. }));
    }

    #[test]
    fn test_format_share() {
        assert_eq!(format_share(1, 4), "25.0%");
        assert_eq!(format_share(2, 3), "66.7%");
        assert_eq!(format_share(0, 0), "0.0%");
    }
}
