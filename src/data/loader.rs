use std::path::Path;

use anyhow::{bail, Context, Result};
use log::debug;

use super::model::{Metadata, Scalar};
use super::preprocess::{RawEntry, RawInput};

/// Name of the optional metadata sidecar read by [`load_dir`].
pub const META_FILE: &str = "meta.json";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load raw input from a file or directory. Dispatch by extension.
///
/// Supported inputs:
/// * `.json`     – `{ "<id>": { "table": [[...], ...], "meta": {...} }, ... }`
/// * `.csv`      – a single grid keyed by the file stem, empty metadata
/// * directory – every `.csv` inside, see [`load_dir`]
pub fn load_path(path: &Path) -> Result<RawInput> {
    if path.is_dir() {
        return load_dir(path);
    }
    load_file(path)
}

/// Load a single `.json` or `.csv` file.
pub fn load_file(path: &Path) -> Result<RawInput> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "json" => load_json(path),
        "csv" => {
            let id = file_id(path)?;
            let entry = RawEntry {
                table: load_csv_grid(path)?,
                meta: Metadata::new(),
            };
            Ok(RawInput::from([(id, entry)]))
        }
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Load every `.csv` in `dir`, keyed by file stem.
///
/// If the directory holds a [`META_FILE`] mapping stems to metadata records,
/// those records are attached; other grids get empty metadata.
pub fn load_dir(dir: &Path) -> Result<RawInput> {
    let meta_path = dir.join(META_FILE);
    let mut meta: std::collections::BTreeMap<String, Metadata> = if meta_path.is_file() {
        let text = std::fs::read_to_string(&meta_path).context("reading metadata file")?;
        serde_json::from_str(&text).context("parsing metadata JSON")?
    } else {
        Default::default()
    };

    let mut raw = RawInput::new();
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("listing directory {}", dir.display()))?;
    for entry in entries {
        let path = entry.context("reading directory entry")?.path();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if !is_csv {
            continue;
        }
        let id = file_id(&path)?;
        let table = load_csv_grid(&path)?;
        debug!("loaded grid '{id}' with {} rows", table.len());
        let meta = meta.remove(&id).unwrap_or_default();
        raw.insert(id, RawEntry { table, meta });
    }
    Ok(raw)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn load_json(path: &Path) -> Result<RawInput> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    serde_json::from_str(&text).context("parsing raw input JSON")
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Read a CSV file as a plain grid. The first record is kept as a row, since
/// header promotion happens in preprocessing.
fn load_csv_grid(path: &Path) -> Result<Vec<Vec<Scalar>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;

    reader
        .records()
        .enumerate()
        .map(|(row_no, result)| -> Result<Vec<Scalar>> {
            let record = result.with_context(|| format!("CSV row {row_no}"))?;
            Ok(record.iter().map(guess_scalar).collect())
        })
        .collect()
}

fn guess_scalar(s: &str) -> Scalar {
    if s.is_empty() {
        return Scalar::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Scalar::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Scalar::Float(f);
    }
    if s == "true" || s == "false" {
        return Scalar::Bool(s == "true");
    }
    Scalar::String(s.to_string())
}

fn file_id(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .with_context(|| format!("no usable file name in {}", path.display()))
}
