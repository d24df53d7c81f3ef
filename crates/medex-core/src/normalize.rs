use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</?[^>]+>").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Strip markup tags and collapse every whitespace run to a single space.
///
/// Tags are removed without a replacement, so `a<br>b` becomes `ab`. Unterminated tags
/// (`<b` with no `>`) are left in place. Never fails; empty input yields an empty string.
pub fn normalize(raw: &str) -> String {
    let stripped = TAG_RE.replace_all(raw, "");
    WHITESPACE_RE.replace_all(&stripped, " ").trim().to_string()
}
