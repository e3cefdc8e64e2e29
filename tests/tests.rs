use assert_cmd::prelude::*;
use oligoprof::extract::reverse_complement;
use predicates::str::contains;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use walkdir::WalkDir;

fn forward_read(barcode: &str, context: &str) -> String {
    format!("GATCCGTAC{}TTCGA{}GGACATTAGGT", barcode, context)
}

fn reverse_read(barcode: &str, context: &str) -> String {
    String::from_utf8(reverse_complement(forward_read(barcode, context).as_bytes())).unwrap()
}

fn write_fastq(path: &Path, records: &[(String, String)]) {
    let text = records
        .iter()
        .map(|(id, seq)| format!("@{}\n{}\n+\n{}\n", id, seq, "I".repeat(seq.len())))
        .collect::<String>();
    fs::write(path, text).unwrap();
}

/// Writes `<sample>_R1.fastq` and `<sample>_R2.fastq` from `(id, forward, reverse)` triples
fn write_pairs(dir: &Path, sample: &str, pairs: &[(&str, String, String)]) -> (PathBuf, PathBuf) {
    let r1 = dir.join(format!("{}_R1.fastq", sample));
    let r2 = dir.join(format!("{}_R2.fastq", sample));
    let forward = pairs
        .iter()
        .map(|(id, fwd, _)| (format!("{}/1", id), fwd.clone()))
        .collect::<Vec<(String, String)>>();
    let reverse = pairs
        .iter()
        .map(|(id, _, rev)| (format!("{}/2", id), rev.clone()))
        .collect::<Vec<(String, String)>>();
    write_fastq(&r1, &forward);
    write_fastq(&r2, &reverse);
    (r1, r2)
}

fn example_pairs() -> Vec<(&'static str, String, String)> {
    vec![
        ("p1", forward_read("AAATTTCCG", "CCA"), reverse_read("AAATTTCCG", "CCA")),
        ("p2", forward_read("AAATTTCCG", "CCA"), reverse_read("AAATTTCCG", "CCA")),
        ("p3", forward_read("AAATTTCCG", "CTA"), reverse_read("AAATTTCCG", "CTA")),
        ("p4", forward_read("GGGCCCAAA", "CTA"), reverse_read("GGGCCCAAA", "CTA")),
        ("p5", forward_read("TTGGCCAAT", "CCA"), "ACGTACGTACGTACGTACGT".to_string()),
        ("p6", forward_read("CACACACAC", "CGA"), reverse_read("CACACACAC", "CGA")),
    ]
}

fn command(r1: &Path, r2: &Path, out: &Path) -> Command {
    let mut cmd = Command::cargo_bin("oligoprof").unwrap();
    cmd.arg("--r1")
        .arg(r1)
        .arg("--r2")
        .arg(r2)
        .arg("--output-dir")
        .arg(out)
        .args(&[
            "--context",
            "CTA",
            "--corrected-context",
            "CCA",
            "--anchor1",
            "CGTAC",
            "--anchor2",
            "TTCGA",
            "--anchor3",
            "GGACATT",
        ]);
    cmd
}

#[test]
fn cli_no_args() {
    Command::cargo_bin("oligoprof").unwrap().assert().failure();
}

#[test]
fn cli_no_such_file() {
    let dir = TempDir::new().unwrap();
    command(
        &dir.path().join("missing_R1.fastq"),
        &dir.path().join("missing_R2.fastq"),
        &dir.path().join("out"),
    )
    .assert()
    .failure()
    .stderr(contains("File not found"));
}

#[test]
fn cli_invalid_configuration() {
    let dir = TempDir::new().unwrap();
    let (r1, r2) = write_pairs(dir.path(), "lib1", &example_pairs());
    command(&r1, &r2, &dir.path().join("out"))
        .args(&["--context-length", "4", "--min-pct", "140"])
        .assert()
        .failure()
        .stderr(contains("--context must match --context-length"))
        .stderr(contains("--min-pct must be between 0 and 100"));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn cli_profiles_sample() {
    let dir = TempDir::new().unwrap();
    let (r1, r2) = write_pairs(dir.path(), "lib1", &example_pairs());
    let out = dir.path().join("out");
    command(&r1, &r2, &out)
        .args(&["--threads", "2", "--chunk-size", "2"])
        .assert()
        .success();

    let mut written = WalkDir::new(&out)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect::<Vec<String>>();
    written.sort();
    assert_eq!(
        written,
        vec![
            "lib1_barcode_count_distribution.csv",
            "lib1_barcode_count_summary_unfiltered.csv",
            "lib1_barcode_count_summary_validated.csv",
            "lib1_context_distribution_percent.csv",
            "lib1_correction_summary.csv",
            "lib1_pair_tally.csv",
        ]
    );

    let validated =
        fs::read_to_string(out.join("lib1_barcode_count_summary_validated.csv")).unwrap();
    assert_eq!(
        validated.lines().collect::<Vec<&str>>(),
        vec![
            "barcode,context,count,total_count,percent",
            "AAATTTCCG,CCA,2,3,66.67",
            "CACACACAC,CGA,1,1,100.0",
            "GGGCCCAAA,CTA,1,1,100.0",
        ]
    );

    let correction = fs::read_to_string(out.join("lib1_correction_summary.csv")).unwrap();
    assert_eq!(
        correction.lines().nth(1),
        Some("lib1,2,1,1,50.0,50.0,5,2,0.4")
    );

    let tally = fs::read_to_string(out.join("lib1_pair_tally.csv")).unwrap();
    assert_eq!(tally.lines().nth(1), Some("6,5,0,0,1,0,0"));
}

#[test]
fn cli_high_threshold_drops_split_barcodes() {
    let dir = TempDir::new().unwrap();
    let (r1, r2) = write_pairs(dir.path(), "lib1", &example_pairs());
    let out = dir.path().join("out");
    command(&r1, &r2, &out)
        .args(&["--min-pct", "70"])
        .assert()
        .success();

    let validated =
        fs::read_to_string(out.join("lib1_barcode_count_summary_validated.csv")).unwrap();
    assert!(!validated.contains("AAATTTCCG"));
    assert_eq!(validated.lines().count(), 3);
}

#[test]
fn cli_counts_discordant_barcodes() {
    let dir = TempDir::new().unwrap();
    let mut pairs = example_pairs();
    pairs.push((
        "p7",
        forward_read("GGGGGGGGG", "CCA"),
        reverse_read("TTTTTTTTT", "CCA"),
    ));
    let (r1, r2) = write_pairs(dir.path(), "lib1", &pairs);

    let out = dir.path().join("plain");
    command(&r1, &r2, &out).assert().success();
    let unfiltered =
        fs::read_to_string(out.join("lib1_barcode_count_summary_unfiltered.csv")).unwrap();
    assert!(!unfiltered.contains("GGGGGGGGG"));

    let out = dir.path().join("discordant");
    command(&r1, &r2, &out)
        .arg("--count-discordant")
        .assert()
        .success();
    let unfiltered =
        fs::read_to_string(out.join("lib1_barcode_count_summary_unfiltered.csv")).unwrap();
    let lines = unfiltered.lines().collect::<Vec<&str>>();
    assert_eq!(
        lines[0],
        "barcode,total_count,read_count,distinct_contexts,context_counts"
    );
    assert_eq!(lines[1], "AAATTTCCG,3,3,2,CCA:2;CTA:1");
    assert_eq!(lines.last(), Some(&"GGGGGGGGG,0,1,0,"));
}

#[test]
fn cli_pair_desync() {
    let dir = TempDir::new().unwrap();
    let (r1, r2) = write_pairs(dir.path(), "lib1", &example_pairs());
    let short = TempDir::new().unwrap();
    let mut pairs = example_pairs();
    pairs.truncate(4);
    let (_, short_r2) = write_pairs(short.path(), "lib1", &pairs);
    fs::copy(&short_r2, &r2).unwrap();

    command(&r1, &r2, &dir.path().join("out"))
        .assert()
        .failure()
        .stderr(contains("out of sync"))
        .stderr(contains("has 6 records"))
        .stderr(contains("has 4"));
}

#[test]
fn cli_malformed_record() {
    let dir = TempDir::new().unwrap();
    let (r1, r2) = write_pairs(dir.path(), "lib1", &example_pairs());
    let mut forward = fs::read_to_string(&r1).unwrap();
    forward.push_str("@p7/1\nACGTACGT\n+\nIIII\n");
    fs::write(&r1, forward).unwrap();
    let mut reverse = fs::read_to_string(&r2).unwrap();
    reverse.push_str("@p7/2\nACGTACGT\n+\nIIIIIIII\n");
    fs::write(&r2, reverse).unwrap();

    command(&r1, &r2, &dir.path().join("out"))
        .assert()
        .failure()
        .stderr(contains("Malformed FASTQ record 7"));
}

#[test]
fn cli_no_validated_reads() {
    let dir = TempDir::new().unwrap();
    let pairs = vec![
        ("p1", forward_read("AAATTTCCG", "CCA"), reverse_read("TTTTTTTTT", "CCA")),
        ("p2", "ACGTACGTACGTACGTACGT".to_string(), reverse_read("AAATTTCCG", "CCA")),
    ];
    let (r1, r2) = write_pairs(dir.path(), "lib1", &pairs);
    command(&r1, &r2, &dir.path().join("out"))
        .assert()
        .failure()
        .stderr(contains("No validated reads were found"));
}

#[test]
fn cli_sample_names_must_agree() {
    let dir = TempDir::new().unwrap();
    let (r1, _) = write_pairs(dir.path(), "lib1", &example_pairs());
    let (_, r2) = write_pairs(dir.path(), "lib2", &example_pairs());
    command(&r1, &r2, &dir.path().join("out"))
        .assert()
        .failure()
        .stderr(contains("different samples"));
}
