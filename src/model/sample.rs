//! Raw dataset samples
//!
//! A sample is whatever JSON object the dataset produced; the client only
//! searches and prints it.

use serde_json::Value;

pub type Sample = Value;

/// Lowercased compact JSON, the haystack for sample search
pub fn search_text(sample: &Sample) -> String {
    serde_json::to_string(sample)
        .unwrap_or_default()
        .to_lowercase()
}

/// Key/value pairs for display, in the order the backend sent them.
///
/// Strings print raw, objects and arrays print as indented JSON, scalars
/// print their JSON form.
pub fn display_fields(sample: &Sample) -> Vec<(String, String)> {
    match sample {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| (key.clone(), display_value(value)))
            .collect(),
        other => vec![("value".to_string(), display_value(other))],
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(_) | Value::Array(_) => {
            serde_json::to_string_pretty(value).unwrap_or_default()
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_text_covers_keys_and_values() {
        let sample = json!({"Question": "Which is HEAVIER?", "answerKey": "B"});
        let text = search_text(&sample);
        assert!(text.contains("heavier"));
        assert!(text.contains("answerkey"));
    }

    #[test]
    fn test_display_fields_keep_server_order() {
        let sample: Sample =
            serde_json::from_str(r#"{"zeta": "last?", "alpha": 1, "choices": {"label": ["A", "B"]}}"#)
                .unwrap();
        let fields = display_fields(&sample);
        let keys: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "choices"]);
        assert_eq!(fields[0].1, "last?");
        assert_eq!(fields[1].1, "1");
        assert!(fields[2].1.contains('\n'));
    }

    #[test]
    fn test_non_object_sample() {
        let fields = display_fields(&json!("plain"));
        assert_eq!(fields, vec![("value".to_string(), "plain".to_string())]);
    }
}
