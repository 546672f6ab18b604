use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env};
use log::info;

use wsfkit::open_wsf;

/// Prints the header and spatial calibration of a `.wsf` file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The `.wsf` file to read
    #[arg(value_name = "FILE")]
    filename : PathBuf,

    /// Also write the metadata report to this file
    #[arg(long, value_name = "PATH")]
    report : Option<PathBuf>,
}

fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let reader = open_wsf(&args.filename)
        .with_context(|| format!("Failed to import {}", args.filename.display()))?;

    let (title, text) = reader.metadata_report();
    println!("{}\n{}", title, text);
    println!(
        "{} x {} samples, {}",
        reader.scalars().width,
        reader.scalars().height,
        reader.calibration(),
    );

    if let Some(path) = args.report {
        fs::write(&path, &text)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Wrote metadata report to {}", path.display());
    }
    Ok(())
}
