// src/bin/replace_header.rs

use anyhow::Result;
use clap::Parser;
use schoolcsv::{
    layout::LayoutConfig,
    process::{self, HeaderReplacer},
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Replace the first row of a CSV with the canonical header
///
/// Every flag is optional; the defaults are the fixed pipeline paths.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = process::FIXED_SCHOOL_CSV)]
    input: PathBuf,

    #[arg(long, default_value = process::UPLOAD_READY_CSV)]
    output: PathBuf,

    /// JSON layout file; its "target" list becomes the header
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
    let replacer = HeaderReplacer::from_layout(&cfg.target);

    let stats = replacer.replace_header_file(&args.input, &args.output)?;
    info!(?stats, "done");
    println!("Upload-ready CSV saved as {}", args.output.display());
    Ok(())
}
