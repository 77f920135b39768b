//! Header metadata and variant record model.
//!
//! The header is parsed once per stream and is read-only afterwards; every
//! other type here lives for exactly one record and is consumed into output
//! documents by the flattener.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::error::{Result, VarflatError};

/// Header-declared data type of an INFO or FORMAT field.
///
/// Closed set, matched exhaustively: anything else in a declaration is a
/// fatal [`VarflatError::UnknownFieldType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldType {
    /// Whole-number values.
    Integer,
    /// Floating point values.
    Float,
    /// Free-form text values.
    String,
    /// Presence-only field with no value.
    Flag,
}

impl FieldType {
    /// Parse a declared type name, naming the owning field on failure.
    ///
    /// # Errors
    ///
    /// Returns [`VarflatError::UnknownFieldType`] for any name outside
    /// Integer/Float/String/Flag.
    pub fn parse(ty: &str, field: &str) -> Result<Self> {
        match ty {
            "Integer" => Ok(Self::Integer),
            "Float" => Ok(Self::Float),
            "String" => Ok(Self::String),
            "Flag" => Ok(Self::Flag),
            other => Err(VarflatError::UnknownFieldType {
                field: field.to_string(),
                ty: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Integer => "Integer",
            Self::Float => "Float",
            Self::String => "String",
            Self::Flag => "Flag",
        };
        write!(f, "{name}")
    }
}

/// One INFO or FORMAT field declaration from the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDef {
    /// Field identifier (e.g., "DP", "AF").
    pub id: String,
    /// Declared cardinality (e.g., "1", "A", "R", ".").
    /// Exactly `"1"` means scalar; everything else is multi-valued.
    pub number: String,
    /// Declared data type.
    pub field_type: FieldType,
    /// Human-readable field description.
    pub description: String,
}

impl FieldDef {
    /// Whether values of this field are comma-separated lists.
    #[must_use]
    pub fn is_multi_valued(&self) -> bool {
        self.number != "1"
    }
}

/// VCF header metadata: field declarations, sample names, and the
/// descriptive lines carried through to metadata documents.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VcfHeader {
    /// VCF format version (e.g., "VCFv4.2").
    pub file_format: String,
    /// Header lines not otherwise parsed, verbatim without the `##` prefix.
    pub extras: Vec<String>,
    /// Contig/chromosome identifiers in declaration order.
    pub contigs: Vec<String>,
    /// FILTER declarations keyed by filter ID with descriptions.
    pub filters: HashMap<String, String>,
    /// INFO field declarations keyed by field ID.
    pub infos: HashMap<String, FieldDef>,
    /// FORMAT field declarations keyed by field ID.
    pub formats: HashMap<String, FieldDef>,
    /// Sample names from the column header, in column order.
    pub samples: Vec<String>,
}

/// One parsed variant record: a single chromosomal position with its
/// alternate alleles, record-level field values, and per-sample entries.
#[derive(Debug, Clone, Default)]
pub struct VariantRecord {
    /// Chromosome name (e.g., "chr1", "1", "X").
    pub chrom: String,
    /// 1-based position on the chromosome.
    pub pos: u64,
    /// Variant identifier column, verbatim (e.g., "rs6054257" or ".").
    pub id: String,
    /// Reference allele bases.
    pub ref_allele: String,
    /// Alternate alleles; genotype index k refers to `alt_alleles[k - 1]`.
    /// Empty when the record calls no alternates (ALT of `.`).
    pub alt_alleles: Vec<String>,
    /// Phred-scaled quality, absent when the column is `.`.
    pub quality: Option<f64>,
    /// Filter status, semicolon-delimited, verbatim.
    pub filter: String,
    /// Raw INFO values in source order. `None` marks a Flag present without
    /// a value.
    pub info: Vec<(String, Option<String>)>,
    /// Per-sample entries in column order; empty for site-only files.
    pub samples: Vec<SampleEntry>,
}

/// Per-sample genotype data for one record.
///
/// The reserved bookkeeping fields (DP, GT, MQ, GL, GQ and the AD-derived
/// depths) are parsed into dedicated slots so every sample document carries
/// them even when the source values are zero-valued or absent; everything
/// else stays raw in `fields` until the flattener coerces it.
#[derive(Debug, Clone, Default)]
pub struct SampleEntry {
    /// Sample name from the header.
    pub sample: String,
    /// Genotype allele indexes (0 = REF, k = k-th ALT). Empty when the
    /// genotype is uncalled.
    pub gt: Vec<i64>,
    /// Read depth; 0 when absent.
    pub dp: i64,
    /// Mapping quality; 0 when absent.
    pub mq: f64,
    /// Genotype quality; 0 when absent.
    pub gq: i64,
    /// Genotype likelihoods; empty when absent.
    pub gl: Vec<f64>,
    /// Raw FORMAT values keyed by field ID, reserved keys included.
    pub fields: BTreeMap<String, String>,
    /// Reference-allele read depth, derived from AD.
    pub ref_depth: Option<i64>,
    /// Alternate-allele read depths, derived from AD.
    pub alt_depths: Option<Vec<i64>>,
}
