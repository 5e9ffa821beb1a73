//! Lenient readers over the open `data` map of an activity.
//!
//! Missing or wrongly typed fields read as defaults; nothing here fails.

use serde_json::Value;

/// String field, trimmed; numbers and booleans are stringified.
pub fn text(data: &Value, key: &str) -> String {
    match data.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// String field or a fallback when blank.
pub fn text_or(data: &Value, key: &str, fallback: &str) -> String {
    let value = text(data, key);
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

/// Integer field; numeric strings and floats are accepted.
#[allow(clippy::cast_possible_truncation)]
pub fn int(data: &Value, key: &str) -> Option<i64> {
    match data.get(key)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Float field; numeric strings are accepted.
pub fn float(data: &Value, key: &str) -> Option<f64> {
    let value = match data.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|f| f.is_finite())
}

/// Array field, empty when missing.
pub fn array<'a>(data: &'a Value, key: &str) -> &'a [Value] {
    data.get(key)
        .and_then(Value::as_array)
        .map_or(&[], Vec::as_slice)
}

/// Array of strings; objects contribute their `text` or `label` field.
pub fn strings(data: &Value, key: &str) -> Vec<String> {
    array(data, key).iter().map(item_text).collect()
}

/// Text of a list item that may be a bare string or an object.
pub fn item_text(item: &Value) -> String {
    match item {
        Value::String(s) => s.trim().to_string(),
        Value::Object(_) => {
            let label = text(item, "text");
            if label.is_empty() {
                text(item, "label")
            } else {
                label
            }
        }
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_variants() {
        let data = json!({"a": " hi ", "b": 3, "c": true, "d": null});
        assert_eq!(text(&data, "a"), "hi");
        assert_eq!(text(&data, "b"), "3");
        assert_eq!(text(&data, "c"), "true");
        assert_eq!(text(&data, "d"), "");
        assert_eq!(text(&Value::Null, "a"), "");
        assert_eq!(text_or(&data, "d", "Untitled"), "Untitled");
    }

    #[test]
    fn test_int_accepts_strings_and_floats() {
        let data = json!({"a": "6", "b": 2.6, "c": "x", "d": -1});
        assert_eq!(int(&data, "a"), Some(6));
        assert_eq!(int(&data, "b"), Some(3));
        assert_eq!(int(&data, "c"), None);
        assert_eq!(int(&data, "d"), Some(-1));
    }

    #[test]
    fn test_strings_from_mixed_items() {
        let data = json!({"items": ["one", {"text": "two"}, {"label": "three"}, 4, null]});
        assert_eq!(strings(&data, "items"), vec!["one", "two", "three", "4", ""]);
    }
}
