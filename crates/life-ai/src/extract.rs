//! Locate a JSON object inside free-form generator output.
//!
//! Model output often wraps the payload in prose or code fences. The scanner
//! walks from each `{` and tracks depth, skipping braces inside string
//! literals, so nested braces in surrounding text cannot truncate or extend
//! the match. The first balanced span that parses as a JSON object wins.

use serde_json::Value;
use thiserror::Error;

/// Unrecoverable extraction failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// No balanced `{...}` span exists in the text.
    #[error("no JSON object found in response")]
    NoObject,
    /// Balanced spans exist but none of them is valid JSON.
    #[error("malformed JSON object: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Index of the `}` that closes the `{` at `start`, if any.
fn closing_brace(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extract the first JSON object embedded in `text`.
pub fn extract_object(text: &str) -> Result<Value, ParseError> {
    let bytes = text.as_bytes();
    let mut last_err = None;
    let mut from = 0;
    while let Some(offset) = text[from..].find('{') {
        let start = from + offset;
        if let Some(end) = closing_brace(bytes, start) {
            match serde_json::from_str::<Value>(&text[start..=end]) {
                Ok(v) if v.is_object() => return Ok(v),
                Ok(_) => {}
                Err(e) => last_err = Some(e),
            }
        }
        from = start + 1;
    }
    Err(last_err.map_or(ParseError::NoObject, ParseError::Malformed))
}
