use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env};
use log::info;

/// Converts a `.wsf` file to a calibrated 32-bit float `.tif` file
///
/// If `-o` not specified, uses the same path as
/// the input file with a `.tif` extension.
///
/// # Example
///
/// ```
/// wsf_to_tiff my_scan.wsf -o my_scan.tif
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The `.wsf` file to convert
    #[arg(value_name = "FILE")]
    filename : String,

    /// Where to write the TIFF
    #[arg(short, long, value_name = "OUTPUT")]
    output : Option<String>,
}

fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let written = wsfkit::wsf_to_tiff(&args.filename, args.output.as_deref())
        .with_context(|| format!("Failed to convert {}", args.filename))?;
    info!("Converted {} to {}", args.filename, written.display());
    Ok(())
}
