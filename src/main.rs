// src/main.rs

use anyhow::{Context, Result};
use clap::Parser;
use schoolcsv::{
    layout::LayoutConfig,
    process::{self, ColumnReorderer, HeaderReplacer},
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Reorder the raw school export, then stamp the canonical header on it.
///
/// With no flags the fixed paths and built-in layouts are used.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Raw export, columns in source order
    #[arg(long, default_value = process::RAW_SCHOOL_CSV)]
    input: PathBuf,

    /// Reordered file written by the first step
    #[arg(long, default_value = process::FIXED_SCHOOL_CSV)]
    intermediate: PathBuf,

    /// Upload-ready file written by the second step
    #[arg(long, default_value = process::UPLOAD_READY_CSV)]
    output: PathBuf,

    /// JSON file with "source" and/or "target" column lists
    #[arg(long)]
    layout: Option<PathBuf>,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    info!(?args, "startup");

    // ─── 2) layouts ──────────────────────────────────────────────────
    let cfg = LayoutConfig::load_or_default(args.layout.as_ref())?;
    let reorderer = ColumnReorderer::from_config(&cfg)?;
    let replacer = HeaderReplacer::from_layout(&cfg.target);

    // ─── 3) reorder columns ──────────────────────────────────────────
    reorderer
        .reorder_csv_file(&args.input, &args.intermediate)
        .context("reordering columns")?;
    println!("Reordered CSV saved as {}", args.intermediate.display());

    // ─── 4) replace header ───────────────────────────────────────────
    replacer
        .replace_header_file(&args.intermediate, &args.output)
        .context("replacing header")?;
    println!("Upload-ready CSV saved as {}", args.output.display());

    info!("all done");
    Ok(())
}
