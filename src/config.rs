//! Run-wide parameters. Built once, validated, then shared read-only by every stage.
use crate::error::Error;
use crate::Result;

/// Default mismatch budget for the first anchor
pub const DEFAULT_ANCHOR1_MM: usize = 2;
/// Default mismatch budget for the second anchor
pub const DEFAULT_ANCHOR2_MM: usize = 1;
/// Default mismatch budget for the third anchor
pub const DEFAULT_ANCHOR3_MM: usize = 2;
/// Default barcode length
pub const DEFAULT_BARCODE_LEN: usize = 9;
/// Default context length
pub const DEFAULT_CONTEXT_LEN: usize = 3;
/// Default minimum percent a context needs within a barcode
pub const DEFAULT_MIN_PCT: f64 = 40.0;
/// Default number of read pairs handed to the worker pool at once
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// A literal anchor and the number of substitutions tolerated when locating it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorSpec {
    seq: Vec<u8>,
    max_mismatches: usize,
}

impl AnchorSpec {
    /// Surrounding whitespace is trimmed and the sequence upper-cased
    pub fn new<T: AsRef<str>>(seq: T, max_mismatches: usize) -> Self {
        Self {
            seq: seq.as_ref().trim().to_ascii_uppercase().into_bytes(),
            max_mismatches,
        }
    }

    /// Upper-cased anchor bases
    pub fn seq(&self) -> &[u8] {
        &self.seq
    }

    /// Mismatch budget for this anchor
    pub fn max_mismatches(&self) -> usize {
        self.max_mismatches
    }

    /// Number of anchor bases
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    /// Whether the anchor has no bases
    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }
}

/// Layout of `[anchor1][barcode][anchor2][context][anchor3]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSpec {
    /// Searched anywhere in the read
    pub anchor1: AnchorSpec,
    /// Must directly follow the barcode
    pub anchor2: AnchorSpec,
    /// Must directly follow the context
    pub anchor3: AnchorSpec,
    /// Bases between `anchor1` and `anchor2`
    pub barcode_len: usize,
    /// Bases between `anchor2` and `anchor3`
    pub context_len: usize,
}

impl PatternSpec {
    /// Bases spanned by a complete pattern
    pub fn span(&self) -> usize {
        self.anchor1.len()
            + self.barcode_len
            + self.anchor2.len()
            + self.context_len
            + self.anchor3.len()
    }
}

/// How a context relates to the conversion under study
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextClass {
    /// Middle base carries the converted base
    Converted,
    /// Middle base carries the original base
    Unconverted,
    /// Middle base is neither
    Other,
}

/// The original context and its converted form, e.g. `CTA` and `CCA`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSpec {
    expected: Vec<u8>,
    corrected: Vec<u8>,
}

impl ConversionSpec {
    /// Both contexts are trimmed and upper-cased
    pub fn new<T: AsRef<str>>(expected: T, corrected: T) -> Self {
        Self {
            expected: expected.as_ref().trim().to_ascii_uppercase().into_bytes(),
            corrected: corrected.as_ref().trim().to_ascii_uppercase().into_bytes(),
        }
    }

    /// Context before correction
    pub fn expected(&self) -> &[u8] {
        &self.expected
    }

    /// Context after correction
    pub fn corrected(&self) -> &[u8] {
        &self.corrected
    }

    /// Index of the base checked for conversion
    pub fn site(&self) -> usize {
        self.expected.len() / 2
    }

    /// Classifies a context by its middle base. Contexts of the wrong length are `Other`.
    pub fn classify(&self, context: &[u8]) -> ContextClass {
        if context.len() != self.expected.len() {
            return ContextClass::Other;
        }
        let site = self.site();
        match context[site] {
            base if base == self.corrected[site] => ContextClass::Converted,
            base if base == self.expected[site] => ContextClass::Unconverted,
            _ => ContextClass::Other,
        }
    }
}

/// Everything a run needs, passed explicitly to each stage
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Where barcode and context sit in a read
    pub pattern: PatternSpec,
    /// Conversion being measured
    pub conversion: ConversionSpec,
    /// Share a barcode's dominant context needs to be validated, in percent
    pub min_pct: f64,
    /// Reject pairs whose mates carry different contexts
    pub require_context_agreement: bool,
    /// Add pairs with disagreeing barcodes to the forward barcode's read count
    pub count_discordant: bool,
    /// Read pairs handed to the pool at once
    pub chunk_size: usize,
}

impl RunConfig {
    /// Configuration with the optional checks off and the default chunk size. Call
    /// [`RunConfig::validate`] before use.
    pub fn new(pattern: PatternSpec, conversion: ConversionSpec, min_pct: f64) -> Self {
        Self {
            pattern,
            conversion,
            min_pct,
            require_context_agreement: false,
            count_discordant: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Collects every problem with the parameters, one per line
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if !(0.0..=100.0).contains(&self.min_pct) {
            errors.push(format!(
                "--min-pct must be between 0 and 100. Got: {}",
                self.min_pct
            ));
        }
        if self.pattern.barcode_len == 0 {
            errors.push("--barcode-length must be a positive integer. Got: 0".to_string());
        }
        if self.pattern.context_len == 0 {
            errors.push("--context-length must be a positive integer. Got: 0".to_string());
        }
        if self.chunk_size == 0 {
            errors.push("--chunk-size must be a positive integer. Got: 0".to_string());
        }

        let anchors = [
            ("--anchor1", &self.pattern.anchor1),
            ("--anchor2", &self.pattern.anchor2),
            ("--anchor3", &self.pattern.anchor3),
        ];
        for (name, anchor) in anchors.iter() {
            check_dna(name, anchor.seq(), &mut errors);
            if anchor.max_mismatches() > anchor.len() {
                errors.push(format!(
                    "{} allows {} mismatches but is only {} bases long",
                    name,
                    anchor.max_mismatches(),
                    anchor.len()
                ));
            }
        }

        let contexts = [
            ("--context", self.conversion.expected()),
            ("--corrected-context", self.conversion.corrected()),
        ];
        for (name, context) in contexts.iter() {
            check_dna(name, context, &mut errors);
            if context.len() != self.pattern.context_len {
                errors.push(format!(
                    "{} must match --context-length. Context length: {}. Got: '{}'",
                    name,
                    self.pattern.context_len,
                    String::from_utf8_lossy(context)
                ));
            }
        }

        let (expected, corrected) = (self.conversion.expected(), self.conversion.corrected());
        if expected.len() == corrected.len() && !expected.is_empty() {
            let site = self.conversion.site();
            if expected[site] == corrected[site] {
                errors.push(format!(
                    "--context and --corrected-context must differ at the middle base. Got: '{}' and '{}'",
                    String::from_utf8_lossy(expected),
                    String::from_utf8_lossy(corrected)
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidConfiguration(errors.join("\n")))
        }
    }
}

fn check_dna(name: &str, seq: &[u8], errors: &mut Vec<String>) {
    if seq.is_empty() {
        errors.push(format!("{} must be a non-empty string.", name));
    } else if !seq.iter().all(|nuc| crate::NUCLEOTIDES.contains(nuc)) {
        errors.push(format!(
            "{} can only contain A, C, G, T characters. Got: '{}'",
            name,
            String::from_utf8_lossy(seq)
        ));
    }
}
