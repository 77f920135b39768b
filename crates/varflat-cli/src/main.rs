//! varflat - flatten VCF files into newline-delimited JSON for bulk indexing.
//!
//! Reads a plain or gzip-compressed VCF file, expands every record into one
//! flat document per relevant (allele, sample, annotation) tuple, and writes
//! the documents to stdout, one JSON object per line. Optionally writes a
//! derived index-mapping document and per-sample metadata documents to side
//! files. Any decode or coercion failure aborts the stream with a non-zero
//! exit and a diagnostic naming the offending field.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use flate2::read::MultiGzDecoder;
use serde_json::Value;
use varflat_core::{index_mapping, sample_metadata, Flattener, VcfReader};

/// Flatten VCF records into newline-delimited JSON documents.
#[derive(Debug, Parser)]
#[command(name = "varflat", version, about)]
struct Args {
    /// Input VCF file, plain or gzip-compressed
    input: PathBuf,

    /// Write the derived index mapping for INFO fields to this file
    #[arg(long, value_name = "FILE")]
    mapping: Option<PathBuf>,

    /// Write one metadata document per sample to this file
    #[arg(long, value_name = "FILE")]
    meta: Option<PathBuf>,

    /// Do not permute rows by annotations: emit one document per sample with
    /// the full annotation list nested under ANN
    #[arg(long)]
    one: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    run(&args)
}

fn run(args: &Args) -> Result<()> {
    let input = open_input(&args.input)?;
    let mut reader = VcfReader::new(input)
        .with_context(|| format!("failed to read VCF header from {}", args.input.display()))?;
    let header = reader.header().clone();

    if let Some(path) = &args.mapping {
        write_documents(path, std::iter::once(index_mapping(&header)))
            .with_context(|| format!("failed to write mapping to {}", path.display()))?;
    }
    if let Some(path) = &args.meta {
        write_documents(path, sample_metadata(&header).into_iter())
            .with_context(|| format!("failed to write metadata to {}", path.display()))?;
    }

    let flattener = Flattener::new(&header).single_annotation_row(args.one);
    let stdout = io::stdout().lock();
    let mut out = BufWriter::new(stdout);
    while let Some(record) = reader.next_record()? {
        for doc in flattener.flatten(&record)? {
            serde_json::to_writer(&mut out, &doc)?;
            out.write_all(b"\n")?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Open the input file, transparently decompressing gzip. The format is
/// sniffed from the two magic bytes rather than the file name, matching
/// files compressed in place without an extension change.
fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    let file =
        File::open(path).with_context(|| format!("cannot open input file {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let is_gzip = {
        let buf = reader.fill_buf()?;
        buf.len() >= 2 && buf[0] == 0x1f && buf[1] == 0x8b
    };
    if is_gzip {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

/// Write documents to a side file, one JSON object per line.
fn write_documents<I: Iterator<Item = Value>>(path: &Path, docs: I) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for doc in docs {
        serde_json::to_writer(&mut out, &doc)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}
