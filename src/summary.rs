//! Tables derived from a finished aggregation, ready to be written out.
use crate::aggregate::PairTally;
use serde::Serialize;

/// Read-count bins used for the barcode count distribution, as `(upper bound, label)`
pub const COUNT_BINS: [(u64, &str); 9] = [
    (1, "1"),
    (2, "2"),
    (10, "3-10"),
    (21, "11-21"),
    (51, "22-51"),
    (101, "52-101"),
    (501, "102-501"),
    (1001, "502-1001"),
    (u64::MAX, ">1001"),
];

/// Every barcode seen, before the minimum percent filter. Barcodes from discordant pairs only
/// appear when those pairs are counted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnfilteredBarcode {
    /// Barcode sequence
    pub barcode: String,
    /// Validated pairs carrying this barcode
    pub total_count: u64,
    /// Pairs counted for this barcode including discordant ones when those are counted
    pub read_count: u64,
    /// Different contexts seen with this barcode
    pub distinct_contexts: usize,
    /// `context:count` in first-seen order, separated by `;`
    pub context_counts: String,
}

/// A barcode whose dominant context passed the minimum percent filter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedBarcode {
    /// Barcode sequence
    pub barcode: String,
    /// Dominant context
    pub context: String,
    /// Validated pairs carrying the dominant context
    pub count: u64,
    /// Validated pairs carrying the barcode
    pub total_count: u64,
    /// `count` as a share of `total_count`
    pub percent: f64,
}

/// Per-context totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextStat {
    /// Context sequence
    pub context: String,
    /// Validated pairs carrying the context
    pub occurrences: u64,
    /// Of those, pairs whose middle base is the converted one
    pub conversions: u64,
    /// `conversions / occurrences`
    pub conversion_rate: f64,
    /// Share of all validated pairs
    pub percent_of_reads: f64,
    /// Retained barcodes resolved to this context
    pub resolved_barcodes: u64,
    /// Dominant-context reads of those barcodes
    pub resolved_reads: u64,
    /// Share of the reads supporting a retained barcode
    pub percent: f64,
}

/// Headline numbers for the conversion under study
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrectionSummary {
    /// Sample name taken from the input file names
    pub sample: String,
    /// Retained barcodes resolved to either the expected or the corrected context
    pub total_barcodes: u64,
    /// Retained barcodes resolved to the corrected context
    pub correction_events: u64,
    /// Retained barcodes resolved to the expected context
    pub no_correction_events: u64,
    #[serde(rename = "correction_%")]
    /// Share of `total_barcodes` that were corrected
    pub correction_pct: f64,
    #[serde(rename = "no_correction_%")]
    /// Share of `total_barcodes` that were not
    pub no_correction_pct: f64,
    /// Validated pairs over all contexts
    pub validated_reads: u64,
    /// Validated pairs carrying the converted middle base
    pub read_conversions: u64,
    /// `read_conversions / validated_reads`
    pub read_correction_rate: f64,
}

/// Number of barcodes whose validated pair count falls in a bin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountBin {
    /// Label such as `3-10` or `>1001`
    pub bin: String,
    /// Barcodes whose validated count falls in the bin
    pub barcodes: u64,
}

/// Everything reported for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Sorted by validated count, then read count
    pub unfiltered: Vec<UnfilteredBarcode>,
    /// Sorted by dominant-context count
    pub validated: Vec<ValidatedBarcode>,
    /// Sorted by share of resolved reads
    pub contexts: Vec<ContextStat>,
    /// Correction events and rate
    pub correction: CorrectionSummary,
    /// Barcodes per validated-count bin
    pub distribution: Vec<CountBin>,
    /// Outcome of every read pair
    pub tally: PairTally,
}

/// Percentage of `part` in `total`, zero when `total` is zero
pub fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Rounds to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Counts how many of the given per-barcode totals fall in each of [`COUNT_BINS`]
pub fn count_distribution<I: IntoIterator<Item = u64>>(counts: I) -> Vec<CountBin> {
    let mut bins = [0u64; COUNT_BINS.len()];
    for count in counts.into_iter().filter(|count| *count > 0) {
        if let Some(idx) = COUNT_BINS.iter().position(|(upper, _)| count <= *upper) {
            bins[idx] += 1;
        }
    }
    COUNT_BINS
        .iter()
        .zip(bins.iter())
        .map(|((_, label), barcodes)| CountBin {
            bin: label.to_string(),
            barcodes: *barcodes,
        })
        .collect()
}
