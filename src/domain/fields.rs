//! Field normalization for raw store rows.
//!
//! The store keys fields by their display label ("Name", "Image", ...). The
//! display model uses lower-cased keys and a single image instead of an
//! attachment list.

use super::entities::{Fields, RawRecord};
use serde_json::Value;

/// Key of the attachment list collapsed by [`extract_image_field`].
pub const IMAGE_KEY: &str = "image";

/// Copy `fields` with every key lower-cased. Only the top level is touched;
/// nested objects keep their keys. On collision the key that comes later in
/// the row's field order wins.
pub fn lowercase_keys(fields: &Fields) -> Fields {
    fields
        .iter()
        .map(|(key, value)| (key.to_lowercase(), value.clone()))
        .collect()
}

/// Return a copy of `record` whose `image` is the first attachment only.
///
/// Empty, missing or non-array `image` values are removed entirely.
pub fn extract_image_field(record: &Fields) -> Fields {
    let mut out = record.clone();
    let first = match out.remove(IMAGE_KEY) {
        Some(Value::Array(mut images)) if !images.is_empty() => Some(images.swap_remove(0)),
        _ => None,
    };
    if let Some(image) = first.filter(|v| !v.is_null()) {
        out.insert(IMAGE_KEY.to_string(), image);
    }
    out
}

/// Lower-case the row's keys and tag it with the row id under `id`.
pub fn normalize_record(raw: &RawRecord) -> Fields {
    let mut fields = lowercase_keys(&raw.fields);
    fields.insert("id".to_string(), Value::String(raw.id.clone()));
    fields
}

/// First element of a row reference field (e.g. `creator: ["rec1", "rec2"]` -> `rec1`).
pub fn first_reference<'a>(fields: &'a Fields, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .and_then(Value::as_array)
        .and_then(|refs| refs.first())
        .and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(v: Value) -> Fields {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_lowercase_keys_top_level_only() {
        let input = fields(json!({
            "Name": "Zapier",
            "Image": [{"url": "https://x/1.png"}],
            "Meta": {"Nested": true}
        }));
        let out = lowercase_keys(&input);
        assert_eq!(out.get("name"), Some(&json!("Zapier")));
        assert!(out.contains_key("image"));
        assert_eq!(out.get("meta"), Some(&json!({"Nested": true})));
        assert!(!out.contains_key("Name"));
    }

    #[test]
    fn test_lowercase_keys_collision_follows_field_order() {
        let out = lowercase_keys(&fields(json!({"name": "a", "Name": "b"})));
        assert_eq!(out.len(), 1);
        assert_eq!(out["name"], "b");

        let out = lowercase_keys(&fields(json!({"Name": "b", "name": "a"})));
        assert_eq!(out["name"], "a");
    }

    #[test]
    fn test_lowercase_keys_empty() {
        assert!(lowercase_keys(&Fields::new()).is_empty());
    }

    #[test]
    fn test_lowercase_keys_idempotent() {
        let input = fields(json!({"Name": "A", "DESCRIPTION": "b", "link": "c"}));
        let once = lowercase_keys(&input);
        assert_eq!(lowercase_keys(&once), once);
    }

    #[test]
    fn test_extract_image_keeps_first() {
        let input = fields(json!({
            "name": "A",
            "image": [{"url": "https://x/1.png"}, {"url": "https://x/2.png"}]
        }));
        let out = extract_image_field(&input);
        assert_eq!(out.get("image"), Some(&json!({"url": "https://x/1.png"})));
        assert_eq!(out.get("name"), Some(&json!("A")));
        // input untouched
        assert_eq!(input["image"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_extract_image_empty_or_missing() {
        let empty = fields(json!({"name": "A", "image": []}));
        assert!(!extract_image_field(&empty).contains_key("image"));

        let missing = fields(json!({"name": "A"}));
        let out = extract_image_field(&missing);
        assert!(!out.contains_key("image"));
        assert_eq!(out, missing);
    }

    #[test]
    fn test_normalize_record_tags_id() {
        let raw = RawRecord::new("rec1", fields(json!({"Name": "A"})));
        let out = normalize_record(&raw);
        assert_eq!(out.get("id"), Some(&json!("rec1")));
        assert_eq!(out.get("name"), Some(&json!("A")));
    }

    #[test]
    fn test_first_reference() {
        let f = fields(json!({"creator": ["c1", "c2"], "empty": [], "text": "x"}));
        assert_eq!(first_reference(&f, "creator"), Some("c1"));
        assert_eq!(first_reference(&f, "empty"), None);
        assert_eq!(first_reference(&f, "text"), None);
        assert_eq!(first_reference(&f, "missing"), None);
    }
}
