#![warn(missing_debug_implementations, rust_2018_idioms, missing_docs)]

//! Profiling of barcoded oligonucleotide libraries from paired-end reads.
//!
//! Each read is searched for `[anchor1][barcode][anchor2][context][anchor3]`. The forward read
//! and the reverse complement of its mate must agree on the barcode before the pair is counted.
//! Counts are gathered per barcode and per context, every barcode is resolved to its dominant
//! context, and the share of contexts carrying the converted middle base is reported.
pub mod aggregate;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod fastq;
pub mod matcher;
pub mod pipeline;
pub mod reconcile;
pub mod report;
pub mod summary;

/// Nucleotide alphabet used
pub const NUCLEOTIDES: [u8; 4] = [b'A', b'C', b'G', b'T'];

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, crate::error::Error>;
