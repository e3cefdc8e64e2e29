//! Error type shared by every stage of a run.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors that abort a run. Per-read conditions such as a missing pattern are tallied instead.
pub enum Error {
    #[error("Malformed FASTQ record {index} in '{}': {reason}", .path.display())]
    /// A record could not be parsed or failed the structural check
    MalformedRecord {
        /// File the record was read from
        path: PathBuf,
        /// 1-based record number
        index: usize,
        /// What was wrong with it
        reason: String,
    },
    #[error(
        "Forward and reverse inputs are out of sync: '{}' has {forward_count} records but '{}' has {reverse_count}",
        .forward.display(),
        .reverse.display()
    )]
    /// One input stream ended before the other
    PairDesync {
        /// Forward reads file
        forward: PathBuf,
        /// Reverse reads file
        reverse: PathBuf,
        /// Records consumed from the forward file
        forward_count: usize,
        /// Records consumed from the reverse file
        reverse_count: usize,
    },
    #[error("Argument validation failed.\n{0}")]
    /// One or more run parameters are unusable, one per line
    InvalidConfiguration(String),
    #[error("Invalid input '{}': {reason}", .path.display())]
    /// Input file is missing, compressed or misnamed
    InvalidInput {
        /// Offending file
        path: PathBuf,
        /// Why it was rejected
        reason: String,
    },
    #[error("Could not read or write file: {0}")]
    /// Generic I/O failure
    Io(#[from] std::io::Error),
    #[error("Could not write CSV output: {0}")]
    /// CSV serialization failure
    Csv(#[from] csv::Error),
    #[error("Could not spawn threads")]
    /// Create thread pools error
    ThreadError,
    #[error("No validated reads were found")]
    /// No read pair survived reconciliation
    NoValidatedReads,
    #[error("No validated contexts were found at minimum percent {0}")]
    /// Every barcode was dropped by the minimum percent filter
    NoValidatedContexts(f64),
}
