//! Decoder for the packed `ANN` functional-annotation sub-format.
//!
//! Decodes one or more annotations per the SnpEff VCF annotation standard
//! 1.0 (<http://snpeff.sourceforge.net/VCFannotationformat_v1.0.pdf>): each
//! entry is pipe-delimited with a fixed positional layout, and the effect
//! sub-field may pack several `&`-joined consequence labels that share every
//! other sub-field.

use serde_json::Value;

use crate::document::Document;
use crate::error::{Result, VarflatError};

/// Positional sub-field names of one ANN entry, in wire order.
const ANN_FIELDS: [&str; 16] = [
    "allele",
    "effect",
    "impact",
    "gene_name",
    "gene_id",
    "feature_type",
    "feature_id",
    "transcript_biotype",
    "rank_total",
    "hgvs_c",
    "hgvs_p",
    "cdna_position",
    "cds_position",
    "protein_position",
    "distance_to_feature",
    "errors_warnings_info",
];

/// Index of the effect sub-field, the one that fans out on `&`.
const EFFECT_IDX: usize = 1;

/// Decode raw ANN entries into flat annotation documents.
///
/// Produces one document per effect label, keys prefixed with `ANN_`.
/// Sub-fields that are empty strings in the source are omitted rather than
/// stored empty: absence is semantically distinct from empty string.
/// Output order follows input order, with effect-expanded documents adjacent
/// and in `&`-list order. An empty input yields an empty output.
///
/// # Errors
///
/// Returns [`VarflatError::DecodeError`] when an entry has fewer than two
/// pipe-delimited sub-fields. That is an upstream contract violation, not
/// something to recover from or silently drop.
pub fn decode(anns: &[String]) -> Result<Vec<Document>> {
    let mut decoded = Vec::new();
    for ann in anns {
        let parts: Vec<&str> = ann.split('|').collect();
        if parts.len() <= EFFECT_IDX {
            return Err(VarflatError::DecodeError(format!(
                "annotation entry has {} sub-field(s), expected at least {}: {ann:?}",
                parts.len(),
                EFFECT_IDX + 1
            )));
        }
        for effect in parts[EFFECT_IDX].split('&') {
            let mut doc = Document::new();
            for (name, &val) in ANN_FIELDS.iter().zip(&parts) {
                let key = format!("ANN_{name}");
                if *name == "effect" {
                    doc.insert(key, Value::String(effect.to_string()));
                } else if !val.is_empty() {
                    doc.insert(key, Value::String(val.to_string()));
                }
            }
            decoded.push(doc);
        }
    }
    Ok(decoded)
}
