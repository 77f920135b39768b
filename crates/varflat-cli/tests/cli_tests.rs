//! Integration tests for the varflat binary.

use std::fs;
use std::io::Write;

use assert_cmd::Command;
use flate2::write::GzEncoder;
use flate2::Compression;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

const SMALL_VCF: &str = "##fileformat=VCFv4.2\n\
##INFO=<ID=DP,Number=1,Type=Integer,Description=\"Total Depth\">\n\
##INFO=<ID=AF,Number=A,Type=Float,Description=\"Allele Frequency\">\n\
##INFO=<ID=DB,Number=0,Type=Flag,Description=\"dbSNP membership\">\n\
##INFO=<ID=ANN,Number=.,Type=String,Description=\"Functional annotations\">\n\
##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">\n\
##FORMAT=<ID=GQ,Number=1,Type=Integer,Description=\"Genotype Quality\">\n\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tNA00001\n\
20\t14370\trs6054257\tG\tA\t29\tPASS\tDP=14;DB;ANN=A|missense_variant&splice_region_variant|MODERATE|PIK3CD|PIK3CD|transcript|||||||||||\tGT:GQ\t0|1:48\n\
20\t17330\t.\tT\tC\t3\tq10\tDP=11\tGT:GQ\t1|1:49\n";

fn varflat() -> Command {
    Command::cargo_bin("varflat").unwrap()
}

fn write_vcf(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn ndjson(stdout: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_flattens_to_ndjson() {
    let dir = TempDir::new().unwrap();
    let input = write_vcf(&dir, "small.vcf", SMALL_VCF);

    let output = varflat().arg(&input).output().unwrap();
    assert!(output.status.success());

    let docs = ndjson(&output.stdout);
    // Record 1: one doc per annotation effect (2); record 2: one plain doc.
    assert_eq!(docs.len(), 3);

    assert_eq!(docs[0]["type"], "variant_vcf");
    assert_eq!(docs[0]["CHROM"], "20");
    assert_eq!(docs[0]["POS"], 14370);
    assert_eq!(docs[0]["ALT"], "A");
    assert_eq!(docs[0]["sample"], "NA00001");
    assert_eq!(docs[0]["INFO_DP"], 14);
    assert_eq!(docs[0]["INFO_DB"], true);
    assert_eq!(docs[0]["ANN_effect"], "missense_variant");
    assert_eq!(docs[1]["ANN_effect"], "splice_region_variant");

    assert_eq!(docs[2]["FILTER"], serde_json::json!(["q10"]));
    assert_eq!(docs[2]["GQ"], 49);
    assert!(docs[2].get("ANN_effect").is_none());
}

#[test]
fn test_one_flag_nests_annotations() {
    let dir = TempDir::new().unwrap();
    let input = write_vcf(&dir, "small.vcf", SMALL_VCF);

    let output = varflat().arg("--one").arg(&input).output().unwrap();
    assert!(output.status.success());

    let docs = ndjson(&output.stdout);
    // One doc per (record, sample) pair, no per-annotation expansion.
    assert_eq!(docs.len(), 2);
    let nested = docs[0]["ANN"].as_array().unwrap();
    assert_eq!(nested.len(), 2);
    assert!(docs[1].get("ANN").is_none());
}

#[test]
fn test_gzip_input() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("small.vcf.gz");
    let mut encoder = GzEncoder::new(fs::File::create(&path).unwrap(), Compression::default());
    encoder.write_all(SMALL_VCF.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let output = varflat().arg(&path).output().unwrap();
    assert!(output.status.success());
    assert_eq!(ndjson(&output.stdout).len(), 3);
}

#[test]
fn test_mapping_side_file() {
    let dir = TempDir::new().unwrap();
    let input = write_vcf(&dir, "small.vcf", SMALL_VCF);
    let mapping = dir.path().join("mapping.json");

    varflat()
        .arg(&input)
        .arg("--mapping")
        .arg(&mapping)
        .assert()
        .success();

    let doc: Value = serde_json::from_str(&fs::read_to_string(&mapping).unwrap()).unwrap();
    let props = doc["properties"].as_object().unwrap();
    assert_eq!(props["INFO_DP"]["type"], "long");
    assert_eq!(props["INFO_AF"]["type"], "float");
    assert_eq!(props["INFO_DB"]["type"], "boolean");
    // String-typed ANN is left to dynamic mapping.
    assert!(!props.contains_key("INFO_ANN"));
}

#[test]
fn test_meta_side_file() {
    let dir = TempDir::new().unwrap();
    let input = write_vcf(&dir, "small.vcf", SMALL_VCF);
    let meta = dir.path().join("meta.ndjson");

    varflat()
        .arg(&input)
        .arg("--meta")
        .arg(&meta)
        .assert()
        .success();

    let docs: Vec<Value> = fs::read_to_string(&meta)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["sample"], "NA00001");
    assert_eq!(docs[0]["type"], "variant_meta");
    assert_eq!(docs[0]["file_format"], "VCFv4.2");
}

#[test]
fn test_missing_input_argument_fails_with_usage() {
    varflat()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_bad_value_aborts_with_diagnostic() {
    let bad = "##fileformat=VCFv4.2\n\
##INFO=<ID=DP,Number=1,Type=Integer,Description=\"Total Depth\">\n\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
20\t14370\trs1\tG\tA\t29\tPASS\tDP=fourteen\n";
    let dir = TempDir::new().unwrap();
    let input = write_vcf(&dir, "bad.vcf", bad);

    varflat()
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("DP").and(predicate::str::contains("fourteen")));
}
