//! Paired FASTQ input: opening, lock-step iteration and sample naming.
use crate::error::Error;
use crate::Result;
use bio::io::fastq;
use log::debug;
use regex::Regex;
use std::fmt::Display;
use std::io;
use std::path::{Path, PathBuf};

/// Accepted FASTQ file extensions
pub const FASTQ_EXTENSIONS: [&str; 2] = [".fastq", ".fq"];

/// A forward read and its mate, taken from the same position of their streams
#[derive(Debug, Clone)]
pub struct ReadPair {
    /// Record from the R1 file
    pub forward: fastq::Record,
    /// Record from the R2 file, as sequenced
    pub reverse: fastq::Record,
}

impl ReadPair {
    /// Pairs two records without checking their identifiers
    pub fn new(forward: fastq::Record, reverse: fastq::Record) -> Self {
        Self { forward, reverse }
    }

    /// Whether both reads carry the same identifier once any `/1`, `/2` suffix is removed
    pub fn same_template(&self) -> bool {
        template_id(self.forward.id()) == template_id(self.reverse.id())
    }
}

/// Read identifier up to the first `/`
pub fn template_id(id: &str) -> &str {
    id.split('/').next().unwrap_or(id)
}

/// Opens an uncompressed FASTQ file after checking its name and existence
pub fn open_fastq<P: AsRef<Path>>(path: P) -> Result<Box<dyn io::Read>> {
    let path = path.as_ref();
    let name = path.to_string_lossy();
    if !FASTQ_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
        return Err(invalid_input(
            path,
            "Expected FastQ files with '.fastq' or '.fq' extension.",
        ));
    }
    if !path.is_file() {
        return Err(invalid_input(path, "File not found"));
    }

    let (rdr, format) = niffler::from_path(path).map_err(|e| match e {
        niffler::Error::FeatureDisabled => {
            invalid_input(path, "Compressed input is not supported")
        }
        niffler::Error::FileTooShort => {
            invalid_input(path, "File is too short to contain a FASTQ record")
        }
        other => invalid_input(path, &other.to_string()),
    })?;
    if format != niffler::compression::Format::No {
        return Err(invalid_input(path, "Compressed input is not supported"));
    }
    debug!("Opened {}", path.display());
    Ok(rdr)
}

/// Iterates two record streams in lock-step, validating every record and failing when one
/// stream runs out before the other.
#[derive(Debug)]
pub struct PairedRecords<F, R> {
    forward: F,
    reverse: R,
    forward_path: PathBuf,
    reverse_path: PathBuf,
    pairs: usize,
    done: bool,
}

impl<F, R, E1, E2> PairedRecords<F, R>
where
    F: Iterator<Item = std::result::Result<fastq::Record, E1>>,
    R: Iterator<Item = std::result::Result<fastq::Record, E2>>,
    E1: Display,
    E2: Display,
{
    /// Paths are only used to describe errors
    pub fn new<P: Into<PathBuf>>(forward: F, reverse: R, forward_path: P, reverse_path: P) -> Self {
        Self {
            forward,
            reverse,
            forward_path: forward_path.into(),
            reverse_path: reverse_path.into(),
            pairs: 0,
            done: false,
        }
    }

    /// Pairs yielded so far
    pub fn pairs(&self) -> usize {
        self.pairs
    }

    fn desync(&mut self, forward_left: usize, reverse_left: usize) -> Error {
        Error::PairDesync {
            forward: self.forward_path.clone(),
            reverse: self.reverse_path.clone(),
            forward_count: self.pairs + forward_left,
            reverse_count: self.pairs + reverse_left,
        }
    }
}

impl<F, R, E1, E2> Iterator for PairedRecords<F, R>
where
    F: Iterator<Item = std::result::Result<fastq::Record, E1>>,
    R: Iterator<Item = std::result::Result<fastq::Record, E2>>,
    E1: Display,
    E2: Display,
{
    type Item = Result<ReadPair>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let index = self.pairs + 1;
        let item = match (self.forward.next(), self.reverse.next()) {
            (None, None) => {
                self.done = true;
                return None;
            }
            (Some(_), None) => {
                let forward_left = 1 + self.forward.by_ref().count();
                Err(self.desync(forward_left, 0))
            }
            (None, Some(_)) => {
                let reverse_left = 1 + self.reverse.by_ref().count();
                Err(self.desync(0, reverse_left))
            }
            (Some(forward), Some(reverse)) => validate(forward, &self.forward_path, index)
                .and_then(|forward| {
                    validate(reverse, &self.reverse_path, index)
                        .map(|reverse| ReadPair::new(forward, reverse))
                }),
        };

        match item {
            Ok(pair) => {
                self.pairs = index;
                Some(Ok(pair))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

fn validate<E: Display>(
    record: std::result::Result<fastq::Record, E>,
    path: &Path,
    index: usize,
) -> Result<fastq::Record> {
    let malformed = |reason: String| Error::MalformedRecord {
        path: path.to_path_buf(),
        index,
        reason,
    };
    let record = record.map_err(|e| malformed(e.to_string()))?;
    if record.seq().is_empty() {
        return Err(malformed("Sequence line is empty".to_string()));
    }
    record.check().map_err(|e| malformed(e.to_string()))?;
    Ok(record)
}

/// Infers the sample from `<sample>_R1` / `<sample>_R2` file names; both must agree.
pub fn sample_name<P: AsRef<Path>>(forward: P, reverse: P) -> Result<String> {
    let forward = forward.as_ref();
    let reverse = reverse.as_ref();

    let forward_sample = mate_prefix(forward, "R1")
        .ok_or_else(|| invalid_input(forward, "Could not infer sample name from R1 file name."))?;
    let reverse_sample = mate_prefix(reverse, "R2")
        .ok_or_else(|| invalid_input(reverse, "Could not infer sample name from R2 file name."))?;

    if forward_sample != reverse_sample {
        return Err(invalid_input(
            reverse,
            &format!(
                "R1 and R2 filenames appear to come from different samples ('{}' and '{}')",
                forward_sample, reverse_sample
            ),
        ));
    }
    Ok(forward_sample)
}

fn mate_prefix(path: &Path, mate: &str) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    let re = Regex::new(&format!(r"(\w+)_{}", mate)).ok()?;
    re.captures(&name)
        .and_then(|captures| captures.get(1))
        .map(|sample| sample.as_str().to_string())
}

fn invalid_input(path: &Path, reason: &str) -> Error {
    Error::InvalidInput {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
