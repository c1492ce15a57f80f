//! Catalog code parsing: lookup text from users and `#code` tags in upload captions.

use std::sync::OnceLock;

use regex::Regex;

/// Return the lookup code if the whole (trimmed) text is ASCII letters/digits.
pub fn parse_lookup_code(text: &str) -> Option<&str> {
    let code = text.trim();
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(code)
}

/// Extract the first `#token` from an upload caption.
pub fn caption_code(caption: &str) -> Option<&str> {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    let re = TAG_RE.get_or_init(|| Regex::new(r"#(\w+)").expect("valid regex"));
    re.captures(caption)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}
