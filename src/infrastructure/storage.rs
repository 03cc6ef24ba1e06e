//! CSV persistence for the dataset.
//!
//! File identity is `{directory}/{name}.csv`. The checkpoint written after
//! every page uses a `.checkpoint` name suffix so it can never collide with
//! the primary output. Saving is a full overwrite; overwriting an existing
//! file is expected during a run and only warned about once per path.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::dataset::Dataset;

/// Name suffix that separates checkpoint files from the primary output.
pub const CHECKPOINT_SUFFIX: &str = "checkpoint";

/// `{directory}/{name}.csv`
pub fn dataset_path(name: &str, directory: &str) -> PathBuf {
    Path::new(directory).join(format!("{name}.csv"))
}

/// Dataset name for the per-page checkpoint of `name`.
pub fn checkpoint_name(name: &str) -> String {
    format!("{name}.{CHECKPOINT_SUFFIX}")
}

/// Load a previously saved dataset. A missing file is not an error — the
/// harvest simply starts from an empty dataset.
pub fn load_dataset(name: &str, directory: &str) -> Result<Dataset> {
    let path = dataset_path(name, directory);
    if !path.exists() {
        debug!("no prior dataset at {}; starting empty", path.display());
        return Ok(Dataset::new());
    }

    let mut reader = csv::Reader::from_path(&path)
        .with_context(|| format!("Failed to open dataset file: {}", path.display()))?;

    let columns: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read header from: {}", path.display()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result
            .with_context(|| format!("Malformed row in dataset file: {}", path.display()))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    debug!("loaded {} rows from {}", rows.len(), path.display());
    Ok(Dataset::from_string_rows(columns, rows))
}

/// Persist the dataset, overwriting any existing file at the target path.
pub fn save_dataset(dataset: &Dataset, name: &str, directory: &str) -> Result<()> {
    std::fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create data directory: {directory}"))?;

    let path = dataset_path(name, directory);
    if path.exists() {
        warn!("overwriting existing dataset file: {}", path.display());
    }

    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to create dataset file: {}", path.display()))?;

    writer
        .write_record(dataset.columns())
        .context("Failed to write CSV header")?;

    for row in dataset.rows() {
        let cells: Vec<String> = dataset
            .columns()
            .iter()
            .map(|column| row.get(column).map(ToString::to_string).unwrap_or_default())
            .collect();
        writer.write_record(&cells).context("Failed to write CSV row")?;
    }

    writer.flush().context("Failed to flush dataset file")?;
    debug!("saved {} rows to {}", dataset.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Value;

    fn sample_dataset() -> Dataset {
        let mut dataset = Dataset::new();
        dataset.merge(
            [
                ("url".to_string(), Value::from("https://example.com/a")),
                ("price".to_string(), Value::Int(1_500_000)),
                ("floor_size_in_m2".to_string(), Value::Float(119.64)),
            ]
            .into_iter()
            .collect(),
        );
        dataset.merge(
            [
                ("url".to_string(), Value::from("https://example.com/b")),
                ("building_type".to_string(), Value::from("kamienica")),
            ]
            .into_iter()
            .collect(),
        );
        dataset
    }

    #[test]
    fn save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let dir = dir.path().to_str().unwrap();

        let dataset = sample_dataset();
        save_dataset(&dataset, "warszawa", dir).unwrap();
        let loaded = load_dataset("warszawa", dir).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.columns(), dataset.columns());
        assert_eq!(loaded.get(0, "price"), Value::Int(1_500_000));
        assert_eq!(loaded.get(0, "floor_size_in_m2"), Value::Float(119.64));
        // The first row predates the building_type column; it reads as null.
        assert_eq!(loaded.get(0, "building_type"), Value::Null);
        assert_eq!(loaded.get(1, "building_type"), Value::from("kamienica"));
        assert!(loaded.contains_url("https://example.com/b"));
    }

    #[test]
    fn missing_file_loads_empty_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_dataset("nothing-here", dir.path().to_str().unwrap()).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn checkpoint_name_never_collides_with_primary() {
        assert_eq!(checkpoint_name("otodom"), "otodom.checkpoint");
        assert_ne!(
            dataset_path(&checkpoint_name("otodom"), "data"),
            dataset_path("otodom", "data")
        );
    }
}
