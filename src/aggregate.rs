//! Per-barcode and per-context accumulation of reconciled pairs.
//!
//! An [`AggregateState`] is owned by a single worker while it is filled. States built over
//! consecutive stretches of the input are combined with [`AggregateState::merge`] in input order,
//! which gives the same result as one pass over the whole input, including the first-seen order
//! that breaks ties between equally frequent contexts.
use crate::config::{ContextClass, RunConfig};
use crate::reconcile::PairOutcome;
use crate::summary::{
    count_distribution, percent, round2, ContextStat, CorrectionSummary, Summary,
    UnfilteredBarcode, ValidatedBarcode,
};
use log::{debug, info};
use serde::Serialize;
use std::collections::HashMap;

/// What happened to the read pairs of a run
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct PairTally {
    /// Pairs read from the inputs
    pub total_pairs: u64,
    /// Pairs whose mates agree on the barcode
    pub validated_pairs: u64,
    /// Pairs whose mates carry different read identifiers
    pub header_mismatch: u64,
    /// Pairs without a complete pattern in the forward read
    pub no_forward_pattern: u64,
    /// Pairs without a complete pattern in the reverse-complemented reverse read
    pub no_reverse_pattern: u64,
    /// Pairs whose mates carry different barcodes
    pub barcode_mismatch: u64,
    /// Pairs rejected because their mates carry different contexts
    pub context_mismatch: u64,
}

impl PairTally {
    fn add(&mut self, other: &PairTally) {
        self.total_pairs += other.total_pairs;
        self.validated_pairs += other.validated_pairs;
        self.header_mismatch += other.header_mismatch;
        self.no_forward_pattern += other.no_forward_pattern;
        self.no_reverse_pattern += other.no_reverse_pattern;
        self.barcode_mismatch += other.barcode_mismatch;
        self.context_mismatch += other.context_mismatch;
    }

    /// Pairs that did not yield an observation
    pub fn unvalidated_pairs(&self) -> u64 {
        self.total_pairs - self.validated_pairs
    }
}

/// Counts for one barcode
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BarcodeTally {
    /// Unfiltered read count
    pub reads: u64,
    /// Validated pairs per context, in the order the contexts were first seen
    pub contexts: Vec<(Vec<u8>, u64)>,
}

impl BarcodeTally {
    fn add_context(&mut self, context: &[u8], count: u64) {
        match self.contexts.iter_mut().find(|(seen, _)| seen.as_slice() == context) {
            Some((_, n)) => *n += count,
            None => self.contexts.push((context.to_vec(), count)),
        }
    }

    fn merge(&mut self, other: BarcodeTally) {
        self.reads += other.reads;
        for (context, count) in other.contexts {
            self.add_context(&context, count);
        }
    }

    /// Validated pairs over all contexts
    pub fn validated(&self) -> u64 {
        self.contexts.iter().map(|(_, count)| count).sum()
    }

    /// The most frequent context and its count. The earliest seen wins a tie.
    pub fn dominant(&self) -> Option<(&[u8], u64)> {
        self.contexts
            .iter()
            .fold(None, |best: Option<(&[u8], u64)>, (context, count)| match best {
                Some((_, best_count)) if best_count >= *count => best,
                _ => Some((context.as_slice(), *count)),
            })
    }
}

/// Counts for one context
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ContextTally {
    /// Validated pairs carrying the context
    pub occurrences: u64,
    /// Of those, pairs whose middle base is the converted one
    pub conversions: u64,
}

/// Running totals over the reconciled pairs of a run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AggregateState {
    tally: PairTally,
    barcodes: HashMap<Vec<u8>, BarcodeTally>,
    contexts: HashMap<Vec<u8>, ContextTally>,
}

impl AggregateState {
    /// Empty totals
    pub fn new() -> Self {
        Self::default()
    }

    /// Outcome counts so far
    pub fn tally(&self) -> &PairTally {
        &self.tally
    }

    /// Counts one validated observation
    pub fn record(&mut self, barcode: &[u8], context: &[u8], class: ContextClass) {
        let entry = self.barcodes.entry(barcode.to_vec()).or_default();
        entry.reads += 1;
        entry.add_context(context, 1);

        let entry = self.contexts.entry(context.to_vec()).or_default();
        entry.occurrences += 1;
        if class == ContextClass::Converted {
            entry.conversions += 1;
        }
    }

    /// Folds the outcome of one read pair into the totals
    pub fn observe(&mut self, outcome: PairOutcome, config: &RunConfig) {
        self.tally.total_pairs += 1;
        match outcome {
            PairOutcome::Validated(observation) => {
                self.tally.validated_pairs += 1;
                let class = config.conversion.classify(&observation.context);
                self.record(&observation.barcode, &observation.context, class);
            }
            PairOutcome::HeaderMismatch => self.tally.header_mismatch += 1,
            PairOutcome::NoForwardPattern => self.tally.no_forward_pattern += 1,
            PairOutcome::NoReversePattern => self.tally.no_reverse_pattern += 1,
            PairOutcome::BarcodeMismatch { forward_barcode } => {
                self.tally.barcode_mismatch += 1;
                if config.count_discordant {
                    self.barcodes.entry(forward_barcode).or_default().reads += 1;
                }
            }
            PairOutcome::ContextMismatch => self.tally.context_mismatch += 1,
        }
    }

    /// Adds the totals of a state built over input that follows this one
    pub fn merge(&mut self, other: AggregateState) {
        self.tally.add(&other.tally);
        for (barcode, tally) in other.barcodes {
            self.barcodes.entry(barcode).or_default().merge(tally);
        }
        for (context, tally) in other.contexts {
            let entry = self.contexts.entry(context).or_default();
            entry.occurrences += tally.occurrences;
            entry.conversions += tally.conversions;
        }
    }

    /// Resolves each barcode to its dominant context, keeping it only when that context holds
    /// at least `min_pct` percent of the barcode's validated pairs, and derives the summary
    /// tables.
    pub fn finalize(&self, sample: &str, config: &RunConfig) -> Summary {
        let mut unfiltered = self
            .barcodes
            .iter()
            .filter(|(_, tally)| tally.reads > 0)
            .map(|(barcode, tally)| UnfilteredBarcode {
                barcode: to_string(barcode),
                total_count: tally.validated(),
                read_count: tally.reads,
                distinct_contexts: tally.contexts.len(),
                context_counts: tally
                    .contexts
                    .iter()
                    .map(|(context, count)| format!("{}:{}", to_string(context), count))
                    .collect::<Vec<String>>()
                    .join(";"),
            })
            .collect::<Vec<UnfilteredBarcode>>();
        unfiltered.sort_by(|a, b| {
            b.total_count
                .cmp(&a.total_count)
                .then_with(|| b.read_count.cmp(&a.read_count))
                .then_with(|| a.barcode.cmp(&b.barcode))
        });

        let mut validated = self
            .barcodes
            .iter()
            .filter_map(|(barcode, tally)| {
                let (context, count) = tally.dominant()?;
                let total = tally.validated();
                let pct = percent(count, total);
                if passes_min_pct(count, total, config.min_pct) {
                    Some(ValidatedBarcode {
                        barcode: to_string(barcode),
                        context: to_string(context),
                        count,
                        total_count: total,
                        percent: round2(pct),
                    })
                } else {
                    debug!(
                        "Dropping barcode {}: best context {} holds {:.2}%",
                        to_string(barcode),
                        to_string(context),
                        pct
                    );
                    None
                }
            })
            .collect::<Vec<ValidatedBarcode>>();
        validated.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.barcode.cmp(&b.barcode))
        });

        let contexts = self.context_stats(&validated);
        let correction = self.correction(sample, &validated, config);
        let distribution =
            count_distribution(self.barcodes.values().map(|tally| tally.validated()));

        info!(
            "{} barcodes observed, {} retained at minimum percent {}",
            unfiltered.len(),
            validated.len(),
            config.min_pct
        );

        Summary {
            unfiltered,
            validated,
            contexts,
            correction,
            distribution,
            tally: self.tally.clone(),
        }
    }

    fn context_stats(&self, validated: &[ValidatedBarcode]) -> Vec<ContextStat> {
        let mut resolved: HashMap<&str, (u64, u64)> = HashMap::new();
        for barcode in validated {
            let entry = resolved.entry(barcode.context.as_str()).or_default();
            entry.0 += 1;
            entry.1 += barcode.count;
        }
        let resolved_total = validated.iter().map(|barcode| barcode.count).sum::<u64>();
        let reads_total = self.contexts.values().map(|tally| tally.occurrences).sum::<u64>();

        let mut stats = self
            .contexts
            .iter()
            .map(|(context, tally)| {
                let context = to_string(context);
                let (resolved_barcodes, resolved_reads) =
                    resolved.get(context.as_str()).copied().unwrap_or_default();
                ContextStat {
                    conversion_rate: if tally.occurrences == 0 {
                        0.0
                    } else {
                        tally.conversions as f64 / tally.occurrences as f64
                    },
                    percent_of_reads: round2(percent(tally.occurrences, reads_total)),
                    percent: round2(percent(resolved_reads, resolved_total)),
                    occurrences: tally.occurrences,
                    conversions: tally.conversions,
                    resolved_barcodes,
                    resolved_reads,
                    context,
                }
            })
            .collect::<Vec<ContextStat>>();
        stats.sort_by(|a, b| {
            b.percent
                .partial_cmp(&a.percent)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    b.percent_of_reads
                        .partial_cmp(&a.percent_of_reads)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| a.context.cmp(&b.context))
        });
        stats
    }

    fn correction(
        &self,
        sample: &str,
        validated: &[ValidatedBarcode],
        config: &RunConfig,
    ) -> CorrectionSummary {
        let expected = config.conversion.expected();
        let corrected = config.conversion.corrected();
        let (correction_events, no_correction_events) =
            validated
                .iter()
                .fold((0, 0), |(yes, no), barcode| match barcode.context.as_bytes() {
                    context if context == corrected => (yes + 1, no),
                    context if context == expected => (yes, no + 1),
                    _ => (yes, no),
                });
        let total_barcodes = correction_events + no_correction_events;

        let validated_reads = self.contexts.values().map(|tally| tally.occurrences).sum::<u64>();
        let read_conversions = self.contexts.values().map(|tally| tally.conversions).sum::<u64>();

        CorrectionSummary {
            sample: sample.to_string(),
            total_barcodes,
            correction_events,
            no_correction_events,
            correction_pct: round2(percent(correction_events, total_barcodes)),
            no_correction_pct: round2(percent(no_correction_events, total_barcodes)),
            validated_reads,
            read_conversions,
            read_correction_rate: if validated_reads == 0 {
                0.0
            } else {
                read_conversions as f64 / validated_reads as f64
            },
        }
    }
}

/// `count / total >= min_pct / 100`, compared without dividing so a share sitting exactly on
/// the threshold passes
fn passes_min_pct(count: u64, total: u64, min_pct: f64) -> bool {
    total > 0 && count as f64 * 100.0 >= min_pct * total as f64
}

fn to_string(seq: &[u8]) -> String {
    String::from_utf8_lossy(seq).into_owned()
}
