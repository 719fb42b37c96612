// src/bin/reorder_columns.rs

use anyhow::Result;
use clap::Parser;
use schoolcsv::{
    layout::LayoutConfig,
    process::{self, ColumnReorderer},
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Move the raw export's columns into canonical order
///
/// Every flag is optional; the defaults are the fixed pipeline paths.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = process::RAW_SCHOOL_CSV)]
    input: PathBuf,

    #[arg(long, default_value = process::FIXED_SCHOOL_CSV)]
    output: PathBuf,

    /// JSON file with "source" and/or "target" column lists
    #[arg(long)]
    layout: Option<PathBuf>,
}

fn main() -> Result<()> {
    fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let cfg = LayoutConfig::load_or_default(args.layout.as_ref())?;
    let reorderer = ColumnReorderer::from_config(&cfg)?;

    let stats = reorderer.reorder_csv_file(&args.input, &args.output)?;
    info!(?stats, "done");
    println!("Reordered CSV saved as {}", args.output.display());
    Ok(())
}
