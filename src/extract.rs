// src/extract.rs

use regex::Regex;
use serde_json::{Map, Value};

/// Recovers a JSON object embedded in free-form model output.
///
/// Models asked for "STRICT JSON only" still wrap their answer in markdown
/// fences or prose often enough that a plain parse is not good enough. The
/// recovery is attempted in order: strip code fences, parse the whole string,
/// then isolate the first balanced-brace span and parse that.
///
/// Returns `None` when no complete object can be isolated. Never returns a
/// value that failed parsing, and never a truncated one.
pub fn extract_json(text: &str) -> Option<Map<String, Value>> {
    let fence_open = Regex::new(r"```json\s*").unwrap();
    let fence = Regex::new(r"```\s*").unwrap();

    let text = fence_open.replace_all(text, "");
    let text = fence.replace_all(&text, "");
    let text = text.trim();

    // The whole string may already be the object
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) {
        return Some(map);
    }

    let start = text.find('{')?;

    // Walk the brace nesting to find where the object ends. Trailing prose
    // after the closing brace is ignored; an unbalanced span is a failure.
    let mut depth: i32 = 0;
    let mut end = None;
    for (i, ch) in text[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    end = Some(start + i + 1);
                    break;
                }
            }
            _ => {}
        }
    }

    let end = end?;
    match serde_json::from_str::<Value>(&text[start..end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_object_round_trips() {
        let original = json!({"coverage_percent": 85, "missing_points": ["closing"]});
        let extracted = extract_json(&original.to_string()).unwrap();
        assert_eq!(Value::Object(extracted), original);
    }

    #[test]
    fn test_fenced_object_is_recovered() {
        let original = json!({"clarity_score": 70, "strengths": ["clear opening"]});
        let text = format!("```json\n{}\n```", original);
        let extracted = extract_json(&text).unwrap();
        assert_eq!(Value::Object(extracted), original);
    }

    #[test]
    fn test_untagged_fence_is_recovered() {
        let original = json!({"coverage_percent": 100});
        let text = format!("```\n{}\n```", original);
        let extracted = extract_json(&text).unwrap();
        assert_eq!(Value::Object(extracted), original);
    }

    #[test]
    fn test_trailing_prose_is_ignored() {
        let original = json!({"clarity_score": 60, "overall_feedback": "Good pacing."});
        let text = format!("{} Hope that helps!", original);
        let extracted = extract_json(&text).unwrap();
        assert_eq!(Value::Object(extracted), original);
    }

    #[test]
    fn test_leading_prose_is_ignored() {
        let original = json!({"coverage_percent": 40});
        let text = format!("Here is the analysis you asked for: {}", original);
        let extracted = extract_json(&text).unwrap();
        assert_eq!(Value::Object(extracted), original);
    }

    #[test]
    fn test_nested_objects_are_scanned_by_depth() {
        let original = json!({"a": {"b": {"c": 1}}, "d": 2});
        let text = format!("{} and some commentary", original);
        let extracted = extract_json(&text).unwrap();
        assert_eq!(Value::Object(extracted), original);
    }

    #[test]
    fn test_unbalanced_braces_return_none() {
        assert!(extract_json(r#"{"a": {"b": 1}"#).is_none());
    }

    #[test]
    fn test_no_braces_return_none() {
        assert!(extract_json("just plain text, no braces").is_none());
    }

    #[test]
    fn test_balanced_but_invalid_json_returns_none() {
        assert!(extract_json("{this is not json}").is_none());
    }

    #[test]
    fn test_first_of_multiple_objects_wins() {
        let text = r#"{"first": 1} {"second": 2}"#;
        let extracted = extract_json(text).unwrap();
        assert_eq!(Value::Object(extracted), json!({"first": 1}));
    }

    #[test]
    fn test_empty_input_returns_none() {
        assert!(extract_json("").is_none());
        assert!(extract_json("```json\n```").is_none());
    }
}
