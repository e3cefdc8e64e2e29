//! Command line options and logging setup.
use crate::config::{AnchorSpec, ConversionSpec, PatternSpec, RunConfig};
use crate::error::Error;
use crate::Result;
use log::LevelFilter;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "oligoprof",
    about = "Analyze barcoded oligonucleotide libraries from paired-end Illumina sequencing data.\n\
             Reads are searched for [anchor1][barcode][anchor2][context][anchor3]."
)]
#[allow(missing_docs)]
pub struct Oligoprof {
    #[structopt(long, help = "FASTQ file of forward reads", parse(from_os_str))]
    pub r1: PathBuf,
    #[structopt(long, help = "FASTQ file of reverse reads", parse(from_os_str))]
    pub r2: PathBuf,
    #[structopt(long, help = "Original context sequence (e.g. CTA)")]
    pub context: String,
    #[structopt(long, help = "Corrected version of the context (e.g. CCA)")]
    pub corrected_context: String,
    #[structopt(long, help = "Anchor before the barcode")]
    pub anchor1: String,
    #[structopt(long, help = "Anchor between barcode and context")]
    pub anchor2: String,
    #[structopt(long, help = "Anchor after the context")]
    pub anchor3: String,
    #[structopt(long = "anch1-mm", help = "Mismatches allowed in anchor1", default_value = "2")]
    pub anch1_mm: usize,
    #[structopt(long = "anch2-mm", help = "Mismatches allowed in anchor2", default_value = "1")]
    pub anch2_mm: usize,
    #[structopt(long = "anch3-mm", help = "Mismatches allowed in anchor3", default_value = "2")]
    pub anch3_mm: usize,
    #[structopt(long, help = "Length of the barcode", default_value = "9")]
    pub barcode_length: usize,
    #[structopt(long, help = "Length of the context", default_value = "3")]
    pub context_length: usize,
    #[structopt(
        long,
        help = "Minimum percent of a barcode's reads its context needs to be validated",
        default_value = "40"
    )]
    pub min_pct: f64,
    #[structopt(
        long,
        help = "Directory to store output files",
        default_value = "output",
        parse(from_os_str)
    )]
    pub output_dir: PathBuf,
    #[structopt(short, long, help = "Number of threads", default_value = "1")]
    pub threads: usize,
    #[structopt(long, help = "Read pairs processed per batch", default_value = "10000")]
    pub chunk_size: usize,
    #[structopt(
        long,
        help = "Also require forward and reverse contexts to agree before a pair is validated"
    )]
    pub require_context_agreement: bool,
    #[structopt(
        long,
        help = "Count pairs whose barcodes disagree towards the forward barcode's unfiltered total"
    )]
    pub count_discordant: bool,
    #[structopt(
        short,
        long,
        help = "Increase output verbosity (-v, -vv, -vvv)",
        parse(from_occurrences)
    )]
    pub verbose: u8,
}

impl Oligoprof {
    /// Initializes `env_logger` at a level chosen by the number of `-v` flags
    pub fn set_logging(&self) {
        let level = match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        env_logger::Builder::new()
            .filter_level(level)
            .parse_filters(&std::env::var("RUST_LOG").unwrap_or_default())
            .init();
    }

    /// Builds and validates the run configuration
    pub fn run_config(&self) -> Result<RunConfig> {
        let pattern = PatternSpec {
            anchor1: AnchorSpec::new(&self.anchor1, self.anch1_mm),
            anchor2: AnchorSpec::new(&self.anchor2, self.anch2_mm),
            anchor3: AnchorSpec::new(&self.anchor3, self.anch3_mm),
            barcode_len: self.barcode_length,
            context_len: self.context_length,
        };
        let conversion = ConversionSpec::new(&self.context, &self.corrected_context);
        let config = RunConfig {
            require_context_agreement: self.require_context_agreement,
            count_discordant: self.count_discordant,
            chunk_size: self.chunk_size,
            ..RunConfig::new(pattern, conversion, self.min_pct)
        };

        let mut problems = match config.validate() {
            Err(Error::InvalidConfiguration(msg)) => vec![msg],
            Err(e) => return Err(e),
            Ok(()) => Vec::new(),
        };
        if self.threads == 0 {
            problems.push("--threads must be a positive integer. Got: 0".to_string());
        }
        if problems.is_empty() {
            Ok(config)
        } else {
            Err(Error::InvalidConfiguration(problems.join("\n")))
        }
    }
}
