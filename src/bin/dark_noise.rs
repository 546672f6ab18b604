use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env};
use log::info;

use wsfkit::{analysis::Exposures, image_prefix, output_dir};

const OUTPUT_PREFIX : &str = "DarkNoise";
const TABLE_NAME : &str = "Dark Noise Results.csv";

/// Fits the mean gray level of a stack of dark frames
/// against their exposure times.
///
/// Exposures are given in ascending slice order with
/// repeated `-e`; a negative value ends the list. With
/// fewer than two, the default sequence
/// 4, 10, 20, 50, 100, 200, 500, 1000, 2000, 5000 ms is used.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TIFF stack with one slice per exposure
    #[arg(value_name = "STACK")]
    stack : PathBuf,

    /// Exposure of the next slice, in milliseconds
    #[arg(short, long = "exposure", value_name = "MS", allow_negative_numbers = true)]
    exposures : Vec<f64>,

    /// Directory the output folder is created in. Defaults to the stack's directory.
    #[arg(short, long, value_name = "DIR")]
    output : Option<PathBuf>,

    /// Leave the date out of the output folder name
    #[arg(long)]
    no_date : bool,
}

fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let exposures = Exposures::from_entries(args.exposures.iter().copied());
    info!("Exposures (ms): {:?}", exposures.as_slice());

    let result = wsfkit::dark_noise_from_file(&args.stack, &exposures)
        .with_context(|| format!("Dark noise failed on {}", args.stack.display()))?;

    let name = args.stack.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parent = args.output.clone()
        .or_else(|| args.stack.parent().map(|p| p.to_path_buf()))
        .unwrap_or_default();

    let dir = output_dir(&parent, image_prefix(&name), OUTPUT_PREFIX, args.no_date)
        .context("Could not create the output directory")?;
    result.write_table(dir.join(TABLE_NAME))
        .context("Could not write the results table")?;

    println!("{}", result);
    Ok(())
}
