#![warn(missing_debug_implementations, rust_2018_idioms, missing_docs)]

//! Command line entry point of `oligoprof`.
use bio::io::fastq;
use log::{error, info};
use oligoprof::cli::Oligoprof;
use oligoprof::error::Error;
use oligoprof::fastq::{open_fastq, sample_name, PairedRecords};
use oligoprof::{pipeline, report, Result};
use std::time::Instant;
use structopt::StructOpt;

fn main() {
    let opt = Oligoprof::from_args();
    opt.set_logging();

    let start = Instant::now();
    if let Err(e) = run(&opt) {
        error!("{}", e);
        std::process::exit(1);
    }
    info!("Total runtime: {:.2} seconds", start.elapsed().as_secs_f64());
}

fn run(opt: &Oligoprof) -> Result<()> {
    let config = opt.run_config()?;

    rayon::ThreadPoolBuilder::new()
        .num_threads(opt.threads)
        .build_global()
        .map_err(|_| Error::ThreadError)?;

    let sample = sample_name(&opt.r1, &opt.r2)?;
    info!("Processing sample: {}", sample);
    info!(
        "Anchors: [{}], [{}], [{}]; barcode length {}, context length {}, pattern span {}",
        String::from_utf8_lossy(config.pattern.anchor1.seq()),
        String::from_utf8_lossy(config.pattern.anchor2.seq()),
        String::from_utf8_lossy(config.pattern.anchor3.seq()),
        config.pattern.barcode_len,
        config.pattern.context_len,
        config.pattern.span()
    );

    let forward = fastq::Reader::new(open_fastq(&opt.r1)?).records();
    let reverse = fastq::Reader::new(open_fastq(&opt.r2)?).records();
    let mut pairs = PairedRecords::new(forward, reverse, opt.r1.clone(), opt.r2.clone());

    let state = pipeline::aggregate_pairs(&mut pairs, &config)?;
    let tally = state.tally();
    info!(
        "Total paired reads processed: {}; validated matched pairs: {} ({:.2}%); unvalidated: {}",
        pairs.pairs(),
        tally.validated_pairs,
        oligoprof::summary::percent(tally.validated_pairs, tally.total_pairs),
        tally.unvalidated_pairs()
    );
    if tally.validated_pairs == 0 {
        return Err(Error::NoValidatedReads);
    }

    let summary = state.finalize(&sample, &config);
    report::write_reports(&opt.output_dir, &sample, &summary)?;
    if summary.validated.is_empty() {
        return Err(Error::NoValidatedContexts(config.min_pct));
    }

    let correction = &summary.correction;
    info!(
        "Correction events: {} ({}%), no correction events: {} ({}%), read-level correction rate {:.4}",
        correction.correction_events,
        correction.correction_pct,
        correction.no_correction_events,
        correction.no_correction_pct,
        correction.read_correction_rate
    );
    Ok(())
}
