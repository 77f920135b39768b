//! Flat output documents and merge semantics.

use serde_json::Value;

/// A flat, self-describing output document: an ordered mapping from field
/// name to JSON value. Documents are write-once; they are emitted as soon as
/// they are built and never mutated afterwards.
pub type Document = serde_json::Map<String, Value>;

/// Merge `src` into `dst`, later writes winning on key collision.
///
/// The flattener stacks common, allele, sample, and annotation fields with
/// this: the most specific context field must not be clobbered by a shared
/// one, so callers merge in most-specific-last order.
pub fn merge_into(dst: &mut Document, src: &Document) {
    for (key, value) in src {
        dst.insert(key.clone(), value.clone());
    }
}

/// Convert a float to a JSON value, mapping NaN and infinities to null.
///
/// JSON has no representation for non-finite numbers; an explicit null keeps
/// every emitted document representable downstream.
#[must_use]
pub fn float_value(v: f64) -> Value {
    serde_json::Number::from_f64(v).map_or(Value::Null, Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(pairs: &[(&str, Value)]) -> Document {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_merge_last_writer_wins() {
        let mut dst = doc(&[("a", json!(1)), ("b", json!("shared"))]);
        let src = doc(&[("b", json!("specific")), ("c", json!(true))]);
        merge_into(&mut dst, &src);
        assert_eq!(dst["a"], json!(1));
        assert_eq!(dst["b"], json!("specific"));
        assert_eq!(dst["c"], json!(true));
    }

    #[test]
    fn test_merge_is_content_associative() {
        // Building field-by-field or in bulk must give the same content.
        let a = doc(&[("x", json!(1)), ("y", json!(2))]);
        let b = doc(&[("y", json!(3))]);
        let c = doc(&[("z", json!(4))]);

        let mut bulk = a.clone();
        merge_into(&mut bulk, &b);
        merge_into(&mut bulk, &c);

        let mut stepwise = Document::new();
        for part in [&a, &b, &c] {
            for (k, v) in part {
                stepwise.insert(k.clone(), v.clone());
            }
        }
        assert_eq!(bulk, stepwise);
    }

    #[test]
    fn test_float_value_guards_non_finite() {
        assert_eq!(float_value(1.5), json!(1.5));
        assert_eq!(float_value(f64::NAN), Value::Null);
        assert_eq!(float_value(f64::INFINITY), Value::Null);
        assert_eq!(float_value(f64::NEG_INFINITY), Value::Null);
    }
}
