//! ICD-10 to CCSR mapper binary.

mod cli;

use ccsr_mapper::{
    discover_reference_file, extract_version, format_share, load_codes, load_reference_table,
    write_tables, CcsrMapper, ResolutionTables,
};
use ccsr_types::Tier;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so the summary on stdout stays machine-readable
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.resolver_config();

    let reference_path = discover_reference_file(&cli.reference)?;
    if let Some(version) = reference_path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(extract_version)
    {
        tracing::info!("Using CCSR release {}", version);
    }

    let rows = load_reference_table(&reference_path, cli.format.into())?;
    let mapper = CcsrMapper::new(&rows, config)?;

    let codes = load_codes(&cli.codes_file, cli.column.as_deref())?;
    let tables = mapper.map_codes(&codes)?;

    if let Some(dir) = &cli.output_dir {
        let written = write_tables(dir, &tables)?;
        tracing::info!("Wrote {} tables to {}", written.len(), dir.display());
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&tables.summary())?);
    } else {
        print_summary(&tables);
    }

    Ok(())
}

fn print_summary(tables: &ResolutionTables) {
    let summary = tables.summary();
    println!("Mapped {} codes", summary.total);
    for tier in Tier::ALL {
        let count = summary.count(tier);
        println!(
            "  {:<14} {:>8}  {:>6}",
            tier.as_str(),
            count,
            format_share(count, summary.total)
        );
    }
}
