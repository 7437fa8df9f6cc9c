//! Best-effort recovery of a JSON object from free-form model output.
//!
//! Strict parsing is always tried first; the repair pass only runs when the
//! raw object span does not parse.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("valid trailing comma regex"));

/// Extract the outermost JSON object from `text`.
///
/// Returns `None` when there is no `{ … }` span or neither the raw span nor
/// its repaired form parses to an object.
#[must_use]
pub fn recover_json(text: &str) -> Option<Value> {
    let span = object_span(text)?;
    let span = normalize_quotes(span);

    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(&span) {
        return Some(value);
    }

    let repaired = escape_string_contents(&span);
    let repaired = TRAILING_COMMA.replace_all(&repaired, "$1");
    match serde_json::from_str::<Value>(&repaired) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

/// Heuristic for output cut off by the token budget.
#[must_use]
pub fn looks_truncated(text: &str) -> bool {
    let stripped = text.trim();
    if stripped.is_empty() {
        return false;
    }
    let open = stripped.matches('{').count();
    let close = stripped.matches('}').count();
    open > close || stripped.ends_with(',')
}

fn object_span(text: &str) -> Option<&str> {
    let mut body = text.trim();
    if body.starts_with("```") {
        body = body.trim_start_matches("```json").trim_start_matches("```");
        body = body.trim_end().trim_end_matches("```");
    }
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    (start < end).then(|| &body[start..=end])
}

fn normalize_quotes(span: &str) -> String {
    span.replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
}

/// Escape unescaped double quotes and raw control characters inside strings.
///
/// A quote closes a string only when the next non-space character is one that
/// may legally follow a string (`:`, `,`, `}` or `]`); any other quote inside
/// a string is treated as content.
fn escape_string_contents(span: &str) -> String {
    let chars: Vec<char> = span.chars().collect();
    let mut out = String::with_capacity(span.len() + 16);
    let mut in_string = false;
    let mut escaped = false;

    for (i, &ch) in chars.iter().enumerate() {
        if escaped {
            out.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' => {
                out.push(ch);
                escaped = true;
            }
            '"' if !in_string => {
                in_string = true;
                out.push(ch);
            }
            '"' => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if matches!(next, Some(':' | ',' | '}' | ']')) {
                    in_string = false;
                    out.push(ch);
                } else {
                    out.push_str("\\\"");
                }
            }
            '\n' if in_string => out.push_str("\\n"),
            '\r' if in_string => out.push_str("\\r"),
            '\t' if in_string => out.push_str("\\t"),
            c if in_string && c.is_control() => {
                out.push_str(&format!("\\u{:04x}", u32::from(c)));
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn plain_object_parses() {
        assert_eq!(recover_json(r#"{"a": 1}"#), Some(json!({"a": 1})));
    }

    #[test]
    fn markdown_fences_are_stripped() {
        let text = "```json\n{\"seo_score\": 70}\n```";
        assert_eq!(recover_json(text), Some(json!({"seo_score": 70})));
    }

    #[test]
    fn surrounding_prose_is_ignored() {
        let text = "Here is the analysis:\n{\"issues\": [\"x\"]}\nHope this helps!";
        assert_eq!(recover_json(text), Some(json!({"issues": ["x"]})));
    }

    #[test]
    fn typographic_quotes_are_normalized() {
        let text = "{\u{201C}kpi\u{201D}: \u{201C}CTR up\u{201D}}";
        assert_eq!(recover_json(text), Some(json!({"kpi": "CTR up"})));
    }

    #[test]
    fn unescaped_inner_quotes_are_repaired() {
        let text = r#"{"task": "Target the keyword "flowers baku" on /shop", "day": 1}"#;
        let value = recover_json(text).expect("repaired");
        assert_eq!(value["task"], "Target the keyword \"flowers baku\" on /shop");
        assert_eq!(value["day"], 1);
    }

    #[test]
    fn raw_newlines_inside_strings_are_escaped() {
        let text = "{\"description\": \"line one\nline two\"}";
        let value = recover_json(text).expect("repaired");
        assert_eq!(value["description"], "line one\nline two");
    }

    #[test]
    fn trailing_commas_are_removed() {
        let text = r#"{"checklist": ["a", "b",], "kpi": "x",}"#;
        assert_eq!(
            recover_json(text),
            Some(json!({"checklist": ["a", "b"], "kpi": "x"}))
        );
    }

    #[test]
    fn text_without_object_is_none() {
        assert_eq!(recover_json("I cannot help with that."), None);
        assert_eq!(recover_json(""), None);
        assert_eq!(recover_json("} backwards {"), None);
    }

    #[test]
    fn unrecoverable_garbage_is_none() {
        assert_eq!(recover_json("{ this is : not json at all }"), None);
    }

    #[test]
    fn truncation_heuristic() {
        assert!(looks_truncated(r#"{"roadmap": [{"day": 1, "task": "x"},"#));
        assert!(looks_truncated(r#"{"a": {"b": 1}"#));
        assert!(!looks_truncated(r#"{"a": 1}"#));
        assert!(!looks_truncated(""));
    }
}
