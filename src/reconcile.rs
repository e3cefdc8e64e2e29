//! Cross-checks the pattern found in a read against the one found in its mate.
use crate::config::RunConfig;
use crate::extract::{extract, reverse_complement};
use crate::fastq::ReadPair;

/// A barcode confirmed by both mates together with the context it carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedObservation {
    /// Barcode shared by both mates
    pub barcode: Vec<u8>,
    /// Context read from the forward mate
    pub context: Vec<u8>,
}

/// What a single read pair contributed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairOutcome {
    /// Both mates agree on the barcode
    Validated(ValidatedObservation),
    /// Mates carry different read identifiers
    HeaderMismatch,
    /// No complete pattern in the forward read
    NoForwardPattern,
    /// No complete pattern in the reverse-complemented reverse read
    NoReversePattern,
    /// Both patterns found but the barcodes differ
    BarcodeMismatch {
        /// Barcode read from the forward mate
        forward_barcode: Vec<u8>,
    },
    /// Barcodes agree but contexts differ and agreement was required
    ContextMismatch,
}

/// Extracts the pattern from `forward` and from the reverse complement of `reverse`.
/// The barcodes must be identical; the forward context is the one reported.
pub fn reconcile(forward: &[u8], reverse: &[u8], config: &RunConfig) -> PairOutcome {
    let fwd = match extract(forward, &config.pattern) {
        Some(pattern) => pattern,
        None => return PairOutcome::NoForwardPattern,
    };
    let rev = match extract(&reverse_complement(reverse), &config.pattern) {
        Some(pattern) => pattern,
        None => return PairOutcome::NoReversePattern,
    };

    if fwd.barcode != rev.barcode {
        return PairOutcome::BarcodeMismatch {
            forward_barcode: fwd.barcode,
        };
    }
    if config.require_context_agreement && fwd.context != rev.context {
        return PairOutcome::ContextMismatch;
    }

    PairOutcome::Validated(ValidatedObservation {
        barcode: fwd.barcode,
        context: fwd.context,
    })
}

/// Reconciles a pair read from the inputs, skipping it when the identifiers disagree
pub fn reconcile_pair(pair: &ReadPair, config: &RunConfig) -> PairOutcome {
    if !pair.same_template() {
        return PairOutcome::HeaderMismatch;
    }
    reconcile(pair.forward.seq(), pair.reverse.seq(), config)
}
