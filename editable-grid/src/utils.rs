use serde_json::Value;

/// Walk a dotted path (`"content.result"`) into a JSON value. Array
/// segments are numeric indices.
pub fn json_at_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut cur = root;
    for seg in path.split('.') {
        if seg.is_empty() {
            return None;
        }
        cur = match cur {
            Value::Object(map) => map.get(seg)?,
            Value::Array(items) => items.get(seg.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(cur)
}

/// Render a JSON value the way a text input would hold it: bare strings
/// unquoted, null empty, everything else through its JSON representation.
pub fn value_to_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Fixed-decimals display formatting with a thousands separator
/// (`1234.5` with 2 decimals -> `"1 234.50"`).
pub fn format_number(
    value: f64,
    decimals: usize,
    decimal_sep: char,
    thousands_sep: char,
) -> String {
    let negative = value < 0.0;
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    if negative {
        out.push('-');
    }
    for (idx, ch) in int_part.chars().enumerate() {
        if idx != 0 && (int_part.len() - idx) % 3 == 0 {
            out.push(thousands_sep);
        }
        out.push(ch);
    }
    if let Some(frac) = frac_part {
        if !frac.is_empty() {
            out.push(decimal_sep);
            out.push_str(frac);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_at_path() {
        let doc = json!({"content": {"result": 42, "items": [{"id": "a"}]}});
        assert_eq!(json_at_path(&doc, "content.result"), Some(&json!(42)));
        assert_eq!(json_at_path(&doc, "content.items.0.id"), Some(&json!("a")));
        assert_eq!(json_at_path(&doc, "content.missing"), None);
        assert_eq!(json_at_path(&doc, ""), None);
    }

    #[test]
    fn test_value_to_display() {
        assert_eq!(value_to_display(&json!("plain")), "plain");
        assert_eq!(value_to_display(&json!(null)), "");
        assert_eq!(value_to_display(&json!(3.5)), "3.5");
        assert_eq!(value_to_display(&json!(true)), "true");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1234.5, 2, '.', ' '), "1 234.50");
        assert_eq!(format_number(-1234567.891, 3, ',', '.'), "-1.234.567,891");
        assert_eq!(format_number(12.0, 0, '.', ' '), "12");
        assert_eq!(format_number(999.0, 2, '.', ' '), "999.00");
    }
}
