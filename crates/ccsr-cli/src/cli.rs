//! CLI argument definitions for the CCSR mapper.

use std::path::PathBuf;

use ccsr_mapper::{ResolverConfig, TableFormat};
use ccsr_types::{Normalization, DEFAULT_MIN_PREFIX_LEN};
use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "ccsr-map",
    version,
    about = "Map ICD-10 diagnosis codes to CCSR categories",
    long_about = "Map ICD-10 diagnosis codes to CCSR categories.\n\n\
                  Codes found in the reference table are direct matches. Other codes\n\
                  fall back to their closest ICD-10 family and are split into\n\
                  automatic, semiautomatic and failed tables."
)]
pub struct Cli {
    /// File with the codes to map, one per line unless --column is given.
    #[arg(value_name = "CODES_FILE")]
    pub codes_file: PathBuf,

    /// CCSR reference table, or a directory holding a DXCCSR*.csv release.
    #[arg(long, value_name = "PATH", env = "CCSR_REFERENCE_PATH")]
    pub reference: PathBuf,

    /// Layout of the reference table.
    #[arg(long, value_enum, default_value = "auto")]
    pub format: FormatArg,

    /// Read codes from this CSV column instead of plain lines.
    #[arg(long, value_name = "NAME")]
    pub column: Option<String>,

    /// Shortest prefix searched when a code has no exact match.
    #[arg(long = "min-prefix-len", value_name = "N", default_value_t = DEFAULT_MIN_PREFIX_LEN)]
    pub min_prefix_len: usize,

    /// Keep code case as written.
    #[arg(long = "no-uppercase")]
    pub no_uppercase: bool,

    /// Keep dots, dashes and other punctuation in codes.
    #[arg(long = "keep-punctuation")]
    pub keep_punctuation: bool,

    /// Write direct.csv, automatic.csv, semiautomatic.csv and failed.csv here.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Resolver configuration from the normalization and prefix flags.
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            min_prefix_len: self.min_prefix_len,
            normalization: Normalization {
                uppercase: !self.no_uppercase,
                strip_punctuation: !self.keep_punctuation,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatArg {
    Auto,
    Clean,
    Ahrq,
}

impl From<FormatArg> for TableFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Auto => TableFormat::Auto,
            FormatArg::Clean => TableFormat::Clean,
            FormatArg::Ahrq => TableFormat::Ahrq,
        }
    }
}
