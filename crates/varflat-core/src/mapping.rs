//! Index-mapping derivation from header INFO declarations.

use serde_json::{json, Value};

use crate::types::{FieldType, VcfHeader};

/// Derive a static index-mapping document for the record-level fields.
///
/// Integer maps to `long`, Float to `float`, Flag to `boolean`. String-typed
/// fields are omitted entirely and left to dynamic mapping downstream. Field
/// names carry the `INFO_` prefix used in flattened documents.
#[must_use]
pub fn index_mapping(header: &VcfHeader) -> Value {
    let mut properties = serde_json::Map::new();
    for (key, def) in &header.infos {
        let mapped = match def.field_type {
            FieldType::Integer => "long",
            FieldType::Float => "float",
            FieldType::Flag => "boolean",
            FieldType::String => continue,
        };
        properties.insert(format!("INFO_{key}"), json!({ "type": mapped }));
    }
    json!({ "properties": properties })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldDef;

    fn header_with(fields: &[(&str, FieldType)]) -> VcfHeader {
        let mut header = VcfHeader::default();
        for (id, field_type) in fields {
            header.infos.insert(
                (*id).to_string(),
                FieldDef {
                    id: (*id).to_string(),
                    number: "1".to_string(),
                    field_type: *field_type,
                    description: String::new(),
                },
            );
        }
        header
    }

    #[test]
    fn test_mapping_types() {
        let header = header_with(&[
            ("DP", FieldType::Integer),
            ("AF", FieldType::Float),
            ("DB", FieldType::Flag),
        ]);
        let mapping = index_mapping(&header);
        let props = &mapping["properties"];
        assert_eq!(props["INFO_DP"]["type"], "long");
        assert_eq!(props["INFO_AF"]["type"], "float");
        assert_eq!(props["INFO_DB"]["type"], "boolean");
    }

    #[test]
    fn test_string_fields_omitted() {
        let header = header_with(&[("CS", FieldType::String), ("DP", FieldType::Integer)]);
        let mapping = index_mapping(&header);
        let props = mapping["properties"].as_object().unwrap();
        assert!(!props.contains_key("INFO_CS"));
        assert_eq!(props.len(), 1);
    }

    #[test]
    fn test_empty_header_yields_empty_properties() {
        let mapping = index_mapping(&VcfHeader::default());
        assert!(mapping["properties"].as_object().unwrap().is_empty());
    }
}
