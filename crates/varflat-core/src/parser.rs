//! Line-oriented VCF text parser.
//!
//! Turns raw header lines and tab-separated record lines into the typed
//! model in [`crate::types`]. The reader is pull-based: the header is parsed
//! once on construction, then records are produced one at a time and owned
//! exclusively by the caller.

use std::io::BufRead;

use anyhow::{bail, Context, Result};

use crate::types::{FieldDef, FieldType, SampleEntry, VariantRecord, VcfHeader};

/// Streaming VCF reader over any buffered source.
#[derive(Debug)]
pub struct VcfReader<R: BufRead> {
    reader: R,
    header: VcfHeader,
    line: String,
    line_no: usize,
}

impl<R: BufRead> VcfReader<R> {
    /// Read and parse the header, leaving the reader positioned at the
    /// first record line.
    ///
    /// # Errors
    ///
    /// Returns an error if the input ends before the `#CHROM` column header,
    /// a structured header line is malformed, or a field declaration carries
    /// an unrecognized type name.
    pub fn new(mut reader: R) -> Result<Self> {
        let mut header = VcfHeader::default();
        let mut line = String::new();
        let mut line_no = 0;
        let mut saw_columns = false;

        loop {
            line.clear();
            let n = reader.read_line(&mut line).context("failed to read VCF header")?;
            if n == 0 {
                break;
            }
            line_no += 1;
            let trimmed = line.trim_end();
            if trimmed.is_empty() {
                continue;
            }
            if let Some(body) = trimmed.strip_prefix("##") {
                parse_header_line(&mut header, body)
                    .with_context(|| format!("malformed header line {line_no}: {trimmed}"))?;
            } else if trimmed.starts_with("#CHROM") {
                let cols: Vec<&str> = trimmed.split('\t').collect();
                if cols.len() > 9 {
                    header.samples = cols[9..].iter().map(|s| (*s).to_string()).collect();
                }
                saw_columns = true;
                break;
            } else {
                bail!("unexpected line {line_no} before #CHROM column header: {trimmed}");
            }
        }
        if !saw_columns {
            bail!("input ended before the #CHROM column header line");
        }

        Ok(Self {
            reader,
            header,
            line,
            line_no,
        })
    }

    /// The parsed header. Immutable for the life of the stream.
    #[must_use]
    pub fn header(&self) -> &VcfHeader {
        &self.header
    }

    /// Pull the next record, or `None` at end of stream.
    ///
    /// # Errors
    ///
    /// Returns an error for unreadable input or a malformed record line,
    /// naming the line number.
    pub fn next_record(&mut self) -> Result<Option<VariantRecord>> {
        loop {
            self.line.clear();
            let n = self
                .reader
                .read_line(&mut self.line)
                .context("failed to read VCF record")?;
            if n == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let trimmed = self.line.trim_end();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let record = parse_record(&self.header, trimmed)
                .with_context(|| format!("malformed record at line {}", self.line_no))?;
            return Ok(Some(record));
        }
    }
}

impl<R: BufRead> Iterator for VcfReader<R> {
    type Item = Result<VariantRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// Parse one `##`-prefixed header line (prefix already stripped).
fn parse_header_line(header: &mut VcfHeader, body: &str) -> Result<()> {
    if let Some(version) = body.strip_prefix("fileformat=") {
        header.file_format = version.to_string();
    } else if let Some(decl) = structured_body(body, "INFO") {
        let def = parse_field_def(decl)?;
        header.infos.insert(def.id.clone(), def);
    } else if let Some(decl) = structured_body(body, "FORMAT") {
        let def = parse_field_def(decl)?;
        header.formats.insert(def.id.clone(), def);
    } else if let Some(decl) = structured_body(body, "FILTER") {
        let fields = parse_structured_fields(decl);
        let id = require_field(&fields, "ID", decl)?;
        let description = lookup_field(&fields, "Description").unwrap_or_default();
        header.filters.insert(id, description);
    } else if let Some(decl) = structured_body(body, "contig") {
        let fields = parse_structured_fields(decl);
        header.contigs.push(require_field(&fields, "ID", decl)?);
    } else {
        header.extras.push(body.to_string());
    }
    Ok(())
}

/// For `KEY=<...>` lines, return the text between the angle brackets.
fn structured_body<'a>(body: &'a str, key: &str) -> Option<&'a str> {
    body.strip_prefix(key)?
        .strip_prefix("=<")?
        .strip_suffix('>')
}

/// Parse an INFO/FORMAT declaration body into a [`FieldDef`].
fn parse_field_def(decl: &str) -> Result<FieldDef> {
    let fields = parse_structured_fields(decl);
    let id = require_field(&fields, "ID", decl)?;
    let number = require_field(&fields, "Number", decl)?;
    let ty = require_field(&fields, "Type", decl)?;
    let field_type = FieldType::parse(&ty, &id)?;
    Ok(FieldDef {
        id,
        number,
        field_type,
        description: lookup_field(&fields, "Description").unwrap_or_default(),
    })
}

/// Split `key=value` pairs on commas outside double quotes, stripping the
/// quotes from quoted values (descriptions may contain commas).
fn parse_structured_fields(decl: &str) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in decl.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                push_structured_field(&mut fields, &current);
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    push_structured_field(&mut fields, &current);
    fields
}

fn push_structured_field(fields: &mut Vec<(String, String)>, pair: &str) {
    if let Some((key, value)) = pair.split_once('=') {
        fields.push((key.to_string(), value.to_string()));
    }
}

fn lookup_field(fields: &[(String, String)], key: &str) -> Option<String> {
    fields
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
}

fn require_field(fields: &[(String, String)], key: &str, decl: &str) -> Result<String> {
    lookup_field(fields, key).with_context(|| format!("declaration is missing {key}: <{decl}>"))
}

/// Parse one tab-separated record line.
fn parse_record(header: &VcfHeader, line: &str) -> Result<VariantRecord> {
    let cols: Vec<&str> = line.split('\t').collect();
    if cols.len() < 8 {
        bail!("expected at least 8 columns, found {}", cols.len());
    }

    let pos: u64 = cols[1]
        .parse()
        .with_context(|| format!("invalid POS {:?}", cols[1]))?;
    let alt_alleles = if cols[4] == "." {
        Vec::new()
    } else {
        cols[4].split(',').map(str::to_string).collect()
    };
    let quality = if cols[5] == "." {
        None
    } else {
        Some(
            cols[5]
                .parse::<f64>()
                .with_context(|| format!("invalid QUAL {:?}", cols[5]))?,
        )
    };
    let info = if cols[7] == "." {
        Vec::new()
    } else {
        cols[7]
            .split(';')
            .map(|entry| match entry.split_once('=') {
                Some((key, value)) => (key.to_string(), Some(value.to_string())),
                None => (entry.to_string(), None),
            })
            .collect()
    };

    let mut samples = Vec::new();
    if cols.len() > 9 {
        let keys: Vec<&str> = cols[8].split(':').collect();
        for (i, col) in cols[9..].iter().enumerate() {
            let name = header
                .samples
                .get(i)
                .with_context(|| format!("sample column {} has no name in the header", i + 1))?;
            samples.push(parse_sample(name, &keys, col));
        }
    }

    Ok(VariantRecord {
        chrom: cols[0].to_string(),
        pos,
        id: cols[2].to_string(),
        ref_allele: cols[3].to_string(),
        alt_alleles,
        quality,
        filter: cols[6].to_string(),
        info,
        samples,
    })
}

/// Parse one sample column, deriving the reserved bookkeeping fields.
fn parse_sample(name: &str, keys: &[&str], col: &str) -> SampleEntry {
    let mut entry = SampleEntry {
        sample: name.to_string(),
        ..SampleEntry::default()
    };
    // Trailing fields may be dropped from a sample column; zip stops at the
    // shorter side.
    for (key, value) in keys.iter().zip(col.split(':')) {
        entry.fields.insert((*key).to_string(), value.to_string());
    }

    if let Some(gt) = entry.fields.get("GT") {
        entry.gt = parse_genotype(gt);
    }
    entry.dp = int_or_zero(entry.fields.get("DP"));
    entry.mq = float_or_zero(entry.fields.get("MQ"));
    entry.gq = int_or_zero(entry.fields.get("GQ"));
    entry.gl = entry
        .fields
        .get("GL")
        .map(|raw| raw.split(',').filter_map(|p| p.parse().ok()).collect())
        .unwrap_or_default();
    if let Some(depths) = entry.fields.get("AD").and_then(|raw| int_list(raw)) {
        if let Some((first, rest)) = depths.split_first() {
            entry.ref_depth = Some(*first);
            entry.alt_depths = Some(rest.to_vec());
        }
    }
    entry
}

/// Split a GT value on `/` or `|` into allele indexes. Unset entries (`.`)
/// are skipped; a fully uncalled genotype yields an empty list.
fn parse_genotype(gt: &str) -> Vec<i64> {
    gt.split(['/', '|'])
        .filter(|tok| *tok != ".")
        .filter_map(|tok| tok.parse().ok())
        .collect()
}

fn int_or_zero(raw: Option<&String>) -> i64 {
    raw.and_then(|v| v.parse().ok()).unwrap_or(0)
}

fn float_or_zero(raw: Option<&String>) -> f64 {
    raw.and_then(|v| v.parse().ok()).unwrap_or(0.0)
}

fn int_list(raw: &str) -> Option<Vec<i64>> {
    raw.split(',').map(|p| p.parse().ok()).collect()
}
