//! Writes the summary tables of a run as CSV files.
use crate::summary::Summary;
use crate::Result;
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Suffixes of the files written for a sample, in writing order
pub const REPORT_SUFFIXES: [&str; 6] = [
    "barcode_count_summary_unfiltered.csv",
    "barcode_count_summary_validated.csv",
    "context_distribution_percent.csv",
    "correction_summary.csv",
    "barcode_count_distribution.csv",
    "pair_tally.csv",
];

/// Writes every table of `summary` into `output_dir` as `<sample>_<table>.csv`, creating the
/// directory if needed. Returns the paths written.
pub fn write_reports<P: AsRef<Path>>(
    output_dir: P,
    sample: &str,
    summary: &Summary,
) -> Result<Vec<PathBuf>> {
    let output_dir = output_dir.as_ref();
    std::fs::create_dir_all(output_dir)?;

    let path = |suffix: &str| output_dir.join(format!("{}_{}", sample, suffix));
    let paths = REPORT_SUFFIXES
        .iter()
        .map(|suffix| path(*suffix))
        .collect::<Vec<PathBuf>>();

    write_rows(&paths[0], &summary.unfiltered)?;
    write_rows(&paths[1], &summary.validated)?;
    write_rows(&paths[2], &summary.contexts)?;
    write_rows(&paths[3], std::slice::from_ref(&summary.correction))?;
    write_rows(&paths[4], &summary.distribution)?;
    write_rows(&paths[5], std::slice::from_ref(&summary.tally))?;

    info!("Wrote {} reports to {}", paths.len(), output_dir.display());
    Ok(paths)
}

/// Writes one CSV table with a header row taken from the field names of `T`
pub fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
