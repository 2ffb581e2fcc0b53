//! Lenient parsing of model replies that should contain JSON.
//!
//! Models are asked for bare JSON but often wrap it in a fenced code block or
//! surround it with prose. Parsing tries, in order:
//!
//! 1. the trimmed reply with a leading ```` ```json ```` / ```` ``` ```` marker
//!    and a trailing ```` ``` ```` removed;
//! 2. the contents of the first fenced block anywhere in the reply;
//! 3. the first balanced `{...}` object in the reply.

use serde::de::DeserializeOwned;

/// Why a reply could not be turned into the expected value.
#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    #[error("reply was empty")]
    Empty,

    #[error("reply was not valid JSON: {0}")]
    Invalid(#[source] serde_json::Error),
}

/// Remove a surrounding fenced-code marker, if any.
pub fn strip_code_fence(reply: &str) -> &str {
    let mut s = reply.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest;
    } else if let Some(rest) = s.strip_prefix("```") {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

/// Parse a reply into `T`, tolerating code fences and surrounding prose.
pub fn parse_reply<T: DeserializeOwned>(reply: &str) -> Result<T, ReplyError> {
    let stripped = strip_code_fence(reply);
    if stripped.is_empty() {
        return Err(ReplyError::Empty);
    }

    let first_err = match serde_json::from_str(stripped) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let candidates = [fenced_block(reply), first_json_object(reply)];
    for candidate in candidates.into_iter().flatten() {
        if let Ok(value) = serde_json::from_str(candidate) {
            return Ok(value);
        }
    }

    Err(ReplyError::Invalid(first_err))
}

/// Contents of the first fenced code block, without its language tag.
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")? + 3;
    let rest = &text[start..];
    let end = rest.find("```")?;
    let block = &rest[..end];
    // drop the info string (e.g. `json`) on the opening line
    let body = match block.find('\n') {
        Some(nl) if !block[..nl].trim_start().starts_with(['{', '[']) => &block[nl + 1..],
        _ => block,
    };
    Some(body.trim())
}

/// The first balanced `{...}` span, honouring string literals.
fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
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
    use serde_json::{Value, json};

    #[test]
    fn strips_json_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("  ```\n[1]\n```  "), "[1]");
        assert_eq!(strip_code_fence("{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn fenced_and_bare_parse_identically() {
        let bare = r#"{"sentiment": "positive", "confidence": 0.9}"#;
        let fenced = format!("```json\n{bare}\n```");
        let a: Value = parse_reply(bare).unwrap();
        let b: Value = parse_reply(&fenced).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn finds_fenced_block_after_prose() {
        let reply = "Sure! Here is the result:\n```json\n{\"entities\": []}\n```\nHope it helps.";
        let v: Value = parse_reply(reply).unwrap();
        assert_eq!(v, json!({"entities": []}));
    }

    #[test]
    fn finds_object_inside_prose() {
        let reply = r#"The answer is {"label": "a } b", "n": {"x": 1}} as requested."#;
        let v: Value = parse_reply(reply).unwrap();
        assert_eq!(v["label"], "a } b");
        assert_eq!(v["n"]["x"], 1);
    }

    #[test]
    fn empty_reply_is_an_error() {
        assert!(matches!(parse_reply::<Value>("  ``` ```"), Err(ReplyError::Empty)));
        assert!(matches!(parse_reply::<Value>(""), Err(ReplyError::Empty)));
    }

    #[test]
    fn prose_without_json_is_invalid() {
        let err = parse_reply::<Value>("I cannot help with that.").unwrap_err();
        assert!(matches!(err, ReplyError::Invalid(_)));
        assert!(err.to_string().starts_with("reply was not valid JSON"));
    }

    #[test]
    fn unbalanced_object_is_invalid() {
        assert!(parse_reply::<Value>("result: {\"a\": 1").is_err());
    }
}
