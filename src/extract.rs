//! Locates `[anchor1][barcode][anchor2][context][anchor3]` in a single read.
use crate::config::PatternSpec;
use crate::matcher::{find, match_at};
use bio::alphabets::dna;
use log::trace;

/// Barcode and context sliced out of a read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPattern {
    /// Bases following `anchor1`
    pub barcode: Vec<u8>,
    /// Bases following `anchor2`
    pub context: Vec<u8>,
}

/// Finds `anchor1` anywhere in `read`, then requires `anchor2` and `anchor3` at the exact offsets
/// implied by the barcode and context lengths. Barcode and context must be unambiguous `ACGT`.
///
/// Returns `None` unless every stage succeeds.
pub fn extract(read: &[u8], pattern: &PatternSpec) -> Option<ExtractedPattern> {
    let anchor1 = find(read, pattern.anchor1.seq(), pattern.anchor1.max_mismatches())?;
    let barcode_start = anchor1.end(pattern.anchor1.len());
    let barcode = field(read, barcode_start, pattern.barcode_len)?;

    let anchor2_start = barcode_start + pattern.barcode_len;
    let anchor2 = match_at(
        read,
        anchor2_start,
        pattern.anchor2.seq(),
        pattern.anchor2.max_mismatches(),
    )?;
    let context_start = anchor2.end(pattern.anchor2.len());
    let context = field(read, context_start, pattern.context_len)?;

    let anchor3_start = context_start + pattern.context_len;
    let anchor3 = match_at(
        read,
        anchor3_start,
        pattern.anchor3.seq(),
        pattern.anchor3.max_mismatches(),
    )?;

    trace!(
        "Pattern at {} with {}/{}/{} anchor mismatches",
        anchor1.pos,
        anchor1.mismatches,
        anchor2.mismatches,
        anchor3.mismatches
    );

    Some(ExtractedPattern { barcode, context })
}

/// Fixed-length field at `start`, upper-cased, or `None` if it runs off the read or holds a
/// base outside `ACGT`
fn field(read: &[u8], start: usize, len: usize) -> Option<Vec<u8>> {
    let bases = read.get(start..start + len)?;
    let bases = bases.to_ascii_uppercase();
    if bases.iter().all(|nuc| crate::NUCLEOTIDES.contains(nuc)) {
        Some(bases)
    } else {
        None
    }
}

/// Reverse complement of a read. `N` stays `N`.
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    dna::revcomp(seq)
}
