use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use dataviser::data::loader;
use dataviser::{Orientation, Pipeline, PipelineConfig};

/// Run the table pipeline over a raw input and print the exported mapping.
#[derive(Parser, Debug)]
#[command(name = "dataviser", version)]
struct Args {
    /// Raw input: a JSON mapping, a single CSV grid, or a directory of CSVs.
    input: PathBuf,

    /// Pipeline options as JSON (filters, transform, orientation, reset).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured orientation (dict, list, records, index, split).
    #[arg(long)]
    orientation: Option<Orientation>,

    /// Reset the working tables to the reference snapshot after export.
    #[arg(long)]
    reset_after: bool,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(orientation) = args.orientation {
        config.orientation = orientation;
    }
    config.reset_after |= args.reset_after;

    let raw = loader::load_path(&args.input)
        .with_context(|| format!("loading {}", args.input.display()))?;
    info!("loaded {} raw tables from {}", raw.len(), args.input.display());

    let mut pipeline = Pipeline::new(config);
    let output = pipeline.run(Some(&raw))?;

    let text = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}").context("writing output")?;
    Ok(())
}
