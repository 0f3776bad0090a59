//! Small parsing helpers shared by the turn processor.

/// Extracts the first balanced `{...}` JSON object from a text blob.
///
/// Model responses are frequently wrapped in prose or markdown fences, so
/// the parser scans from the first `{` and tracks brace depth, skipping
/// braces that appear inside string literals. Returns `None` when no
/// balanced object exists; the caller falls through to the rule-based
/// fallback in that case.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (idx, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + idx + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_object_surrounded_by_prose() {
        let text = "Sure! Here is the JSON you asked for:\n{\"a\": 1}\nHope that helps.";
        assert_eq!(extract_json_object(text), Some("{\"a\": 1}"));
    }

    #[test]
    fn extracts_nested_objects() {
        let text = "prefix {\"outer\": {\"inner\": 2}} suffix";
        assert_eq!(extract_json_object(text), Some("{\"outer\": {\"inner\": 2}}"));
    }

    #[test]
    fn braces_inside_strings_are_ignored() {
        let text = r#"{"feedback": "use \"I feel\" statements, e.g. {like this}"}"#;
        assert_eq!(extract_json_object(text), Some(text));
    }

    #[test]
    fn unbalanced_input_yields_none() {
        assert_eq!(extract_json_object("{\"a\": 1"), None);
        assert_eq!(extract_json_object("no json here"), None);
    }
}
