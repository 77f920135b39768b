//! Per-sample metadata documents.

use serde_json::{json, Value};

use crate::types::VcfHeader;

/// Document type tag carried by every metadata document.
pub const META_DOC_TYPE: &str = "variant_meta";

/// Emit one descriptive document per declared sample, carrying a verbatim
/// copy of the header-level metadata. No coercion happens here.
#[must_use]
pub fn sample_metadata(header: &VcfHeader) -> Vec<Value> {
    header
        .samples
        .iter()
        .map(|sample| {
            json!({
                "sample": sample,
                "type": META_DOC_TYPE,
                "extras": header.extras,
                "file_format": header.file_format,
                "filters": header.filters,
                "contigs": header.contigs,
                "infos": header.infos,
            })
        })
        .collect()
}
