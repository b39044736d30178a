//! Small text utilities shared by the stages.

use std::borrow::Cow;

/// Strips an enclosing Markdown code fence from generated text.
///
/// Generators are asked for bare artifacts but routinely wrap them anyway
/// (```` ```hcl … ``` ````). The opening fence's info string is dropped along
/// with the fence. Text without an enclosing fence is returned trimmed.
///
/// ```rust
/// use terramend::utils::strip_code_fences;
///
/// assert_eq!(strip_code_fences("```hcl\nresource \"x\" {}\n```"), "resource \"x\" {}");
/// assert_eq!(strip_code_fences("plain text"), "plain text");
/// ```
#[must_use]
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let body = match rest.split_once('\n') {
        Some((_info, body)) => body,
        // Single-line fence like ```{}```
        None => rest,
    };
    let body = body.trim_end();
    let body = body.strip_suffix("```").unwrap_or(body);
    body.trim().to_string()
}

/// Truncates text to at most `max_chars` characters, on a char boundary.
///
/// Borrows when no truncation is needed.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => Cow::Owned(text[..idx].to_string()),
        None => Cow::Borrowed(text),
    }
}
