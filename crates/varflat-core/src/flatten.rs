//! The record-flattening pivot engine.
//!
//! One [`VariantRecord`] expands into zero or more flat documents, one per
//! relevant (allele, sample, annotation) tuple, each already carrying the
//! full scalar context for direct bulk indexing. Three nested steps do the
//! expansion: common fields once per record, allele fields once per
//! alternate, then the per-sample / per-annotation cross-product.

use serde_json::Value;

use crate::annotation;
use crate::coerce;
use crate::document::{float_value, merge_into, Document};
use crate::error::{Result, VarflatError};
use crate::types::{SampleEntry, VariantRecord, VcfHeader};

/// Document type tag carried by every flattened record document.
pub const RECORD_DOC_TYPE: &str = "variant_vcf";

/// Name of the packed annotation INFO field.
const ANN_KEY: &str = "ANN";

/// FORMAT fields parsed into dedicated [`SampleEntry`] slots and therefore
/// excluded from the generic per-field coercion loop.
const RESERVED_FORMAT_KEYS: [&str; 6] = ["DP", "GT", "MQ", "GL", "GQ", "AD"];

/// Flattens variant records against a fixed header.
#[derive(Debug, Clone, Copy)]
pub struct Flattener<'a> {
    header: &'a VcfHeader,
    single_annotation_row: bool,
}

impl<'a> Flattener<'a> {
    /// Create a flattener for records parsed under `header`.
    #[must_use]
    pub fn new(header: &'a VcfHeader) -> Self {
        Self {
            header,
            single_annotation_row: false,
        }
    }

    /// When set, each sample document carries the record's entire annotation
    /// list nested under `ANN` instead of being expanded into one document
    /// per annotation entry.
    #[must_use]
    pub fn single_annotation_row(mut self, yes: bool) -> Self {
        self.single_annotation_row = yes;
        self
    }

    /// Expand one record into its output documents.
    ///
    /// A record with no alternate alleles produces no documents. A record
    /// without an `ANN` field produces exactly one document per
    /// (allele, matching sample) pair.
    ///
    /// # Errors
    ///
    /// Any decode or coercion failure aborts the record (and, in streaming
    /// callers, the whole stream): [`VarflatError::DecodeError`],
    /// [`VarflatError::CoercionError`], or [`VarflatError::UndeclaredField`]
    /// for an INFO/FORMAT name missing from the header.
    pub fn flatten(&self, record: &VariantRecord) -> Result<Vec<Document>> {
        let (common, anns) = self.common_fields(record)?;

        let mut out = Vec::new();
        for (idx, alt) in record.alt_alleles.iter().enumerate() {
            let mut allele_fields = Document::new();
            allele_fields.insert("ALT".to_string(), Value::String(alt.clone()));

            if record.samples.is_empty() {
                self.emit_site_only(alt, &allele_fields, &common, &anns, &mut out);
                continue;
            }

            // Genotype indexes are 1-based over the alternates.
            let gt_index = (idx + 1) as i64;
            for sample in &record.samples {
                if !sample_matches_allele(sample, gt_index) {
                    continue;
                }
                let sample_fields = self.sample_fields(sample)?;
                self.emit_for_sample(alt, &sample_fields, &allele_fields, &common, &anns, &mut out);
            }
        }
        Ok(out)
    }

    /// Build the fields shared by every document of this record, and decode
    /// the annotation list if present.
    fn common_fields(&self, record: &VariantRecord) -> Result<(Document, Vec<Document>)> {
        let mut common = Document::new();
        common.insert("type".to_string(), Value::String(RECORD_DOC_TYPE.to_string()));
        common.insert("CHROM".to_string(), Value::String(record.chrom.clone()));
        common.insert("POS".to_string(), Value::from(record.pos));
        common.insert("REF".to_string(), Value::String(record.ref_allele.clone()));
        common.insert(
            "QUAL".to_string(),
            record.quality.map_or(Value::Null, float_value),
        );
        common.insert("ID".to_string(), Value::String(record.id.clone()));
        common.insert(
            "FILTER".to_string(),
            Value::Array(
                record
                    .filter
                    .split(';')
                    .map(|f| Value::String(f.to_string()))
                    .collect(),
            ),
        );

        let mut anns = Vec::new();
        for (key, raw) in &record.info {
            if key == ANN_KEY {
                let entries: Vec<String> = raw
                    .as_deref()
                    .unwrap_or_default()
                    .split(',')
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                anns = annotation::decode(&entries)?;
                continue;
            }
            let def = self
                .header
                .infos
                .get(key)
                .ok_or_else(|| VarflatError::UndeclaredField {
                    scope: "INFO",
                    field: key.clone(),
                })?;
            let value = coerce::coerce(raw.as_deref().unwrap_or_default(), def)?;
            common.insert(format!("INFO_{key}"), value);
        }
        Ok((common, anns))
    }

    /// Build the per-sample fields: the generic coerced FORMAT values plus
    /// the reserved bookkeeping keys that appear in every sample document.
    fn sample_fields(&self, sample: &SampleEntry) -> Result<Document> {
        let mut fields = Document::new();
        fields.insert("sample".to_string(), Value::String(sample.sample.clone()));

        for (key, raw) in &sample.fields {
            if RESERVED_FORMAT_KEYS.contains(&key.as_str()) {
                continue;
            }
            let def = self
                .header
                .formats
                .get(key)
                .ok_or_else(|| VarflatError::UndeclaredField {
                    scope: "FORMAT",
                    field: key.clone(),
                })?;
            fields.insert(key.clone(), coerce::coerce(raw, def)?);
        }

        fields.insert("DP".to_string(), Value::from(sample.dp));
        if !sample.gt.is_empty() {
            fields.insert("GT".to_string(), Value::from(sample.gt.clone()));
        }
        fields.insert("MQ".to_string(), float_value(sample.mq));
        if !sample.gl.is_empty() {
            fields.insert(
                "GL".to_string(),
                Value::Array(sample.gl.iter().copied().map(float_value).collect()),
            );
        }
        fields.insert("GQ".to_string(), Value::from(sample.gq));
        fields.insert(
            "Ref_Depth".to_string(),
            Value::from(sample.ref_depth.unwrap_or(0)),
        );
        fields.insert(
            "Alt_depths".to_string(),
            sample
                .alt_depths
                .as_ref()
                .map_or(Value::Null, |depths| Value::from(depths.clone())),
        );
        Ok(fields)
    }

    /// Emit documents for one allele of a record with no samples.
    fn emit_site_only(
        &self,
        alt: &str,
        allele_fields: &Document,
        common: &Document,
        anns: &[Document],
        out: &mut Vec<Document>,
    ) {
        if anns.is_empty() {
            let mut doc = allele_fields.clone();
            merge_into(&mut doc, common);
            out.push(doc);
            return;
        }
        for ann in anns_for_allele(anns, alt) {
            let mut doc = ann.clone();
            merge_into(&mut doc, common);
            merge_into(&mut doc, allele_fields);
            out.push(doc);
        }
    }

    /// Emit documents for one (allele, sample) pair. Exactly one of the
    /// three branches runs; the single-annotation-row mode never doubles up
    /// with the annotation-free branch.
    fn emit_for_sample(
        &self,
        alt: &str,
        sample_fields: &Document,
        allele_fields: &Document,
        common: &Document,
        anns: &[Document],
        out: &mut Vec<Document>,
    ) {
        if anns.is_empty() {
            let mut doc = sample_fields.clone();
            merge_into(&mut doc, common);
            merge_into(&mut doc, allele_fields);
            out.push(doc);
        } else if self.single_annotation_row {
            let mut doc = sample_fields.clone();
            merge_into(&mut doc, common);
            merge_into(&mut doc, allele_fields);
            doc.insert(
                ANN_KEY.to_string(),
                Value::Array(anns.iter().cloned().map(Value::Object).collect()),
            );
            out.push(doc);
        } else {
            for ann in anns_for_allele(anns, alt) {
                let mut doc = ann.clone();
                merge_into(&mut doc, sample_fields);
                merge_into(&mut doc, common);
                merge_into(&mut doc, allele_fields);
                out.push(doc);
            }
        }
    }
}

/// A sample matches an allele when its genotype list contains the allele's
/// 1-based index. An empty list means no genotype was called, which is
/// non-exclusionary: the sample matches every allele.
fn sample_matches_allele(sample: &SampleEntry, gt_index: i64) -> bool {
    sample.gt.is_empty() || sample.gt.contains(&gt_index)
}

/// Annotation entries linked to an allele: those whose `ANN_allele` equals
/// the alternate allele string exactly. Non-matching entries link to no
/// document.
fn anns_for_allele<'d>(anns: &'d [Document], alt: &'d str) -> impl Iterator<Item = &'d Document> {
    anns.iter()
        .filter(move |ann| ann.get("ANN_allele").and_then(Value::as_str) == Some(alt))
}
