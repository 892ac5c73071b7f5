use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;

use dataviser::{Metadata, RawEntry, RawInput, Scalar};

/// Write a deterministic raw-input JSON file for trying out the pipeline.
#[derive(Parser, Debug)]
struct Args {
    /// Output path.
    #[arg(default_value = "sample_input.json")]
    output: PathBuf,

    /// PRNG seed.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// SplitMix64 stream; deterministic for a given seed.
struct CountStream(u64);

impl CountStream {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Integer in `0..bound`.
    fn below(&mut self, bound: u64) -> u64 {
        self.next() % bound
    }
}

/// A square origin → destination count grid with header row and index column.
fn generate_grid(regions: &[&str], scale: u64, rng: &mut CountStream) -> Vec<Vec<Scalar>> {
    let mut grid = Vec::with_capacity(regions.len() + 1);

    let mut header = vec![Scalar::from("")];
    header.extend(regions.iter().map(|&r| Scalar::from(r)));
    grid.push(header);

    for &origin in regions {
        let mut row = vec![Scalar::from(origin)];
        for &dest in regions {
            let count = if origin == dest { 0 } else { rng.below(scale) };
            // Mix numeric strings, plain numbers and the odd blank like real exports do.
            let cell = match rng.below(10) {
                0 => Scalar::from(""),
                1..=4 => Scalar::from(count.to_string()),
                _ => Scalar::Integer(count as i64),
            };
            row.push(cell);
        }
        grid.push(row);
    }
    grid
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = CountStream(args.seed);

    let regions = ["North", "South", "East", "West", "Central"];
    let groups = ["domestic", "international"];
    let years = [2019_i64, 2020, 2021];

    let mut raw = RawInput::new();
    for &year in &years {
        for (g, &group) in groups.iter().enumerate() {
            let scale = 100 * (g as u64 + 1);
            let meta: Metadata = serde_json::from_value(json!({
                "year": year,
                "group": group,
                "source": {"kind": "synthetic", "seed": args.seed},
            }))?;
            raw.insert(
                format!("{year}_{group}"),
                RawEntry {
                    table: generate_grid(&regions, scale, &mut rng),
                    meta,
                },
            );
        }
    }

    let text = serde_json::to_string_pretty(&raw)?;
    std::fs::write(&args.output, text)
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!(
        "Wrote {} tables ({} x {} each) to {}",
        raw.len(),
        regions.len(),
        regions.len(),
        args.output.display()
    );
    Ok(())
}
