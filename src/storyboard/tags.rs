use once_cell::sync::Lazy;
use regex::Regex;

pub const OPEN_MARKER: &str = "<canvas_page>";
pub const CLOSE_MARKER: &str = "</canvas_page>";

static H1_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").expect("h1 regex"));

static MODULE_IN_TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bmodule\s+([A-Za-z0-9]+)").expect("module regex"));

/// Extracts the trimmed inner text of the first `<tag>...</tag>` region,
/// case-insensitively. Empty-after-trim counts as absent.
pub fn extract_tag(tag: &str, block: &str) -> Option<String> {
    let pattern = format!(r"(?is)<{tag}>(.*?)</{tag}>", tag = regex::escape(tag));
    let re = Regex::new(&pattern).ok()?;
    let inner = re.captures(block)?.get(1)?.as_str().trim().to_string();
    if inner.is_empty() {
        None
    } else {
        Some(inner)
    }
}

/// Text of the first `<h1>` run inside the block, if any.
pub fn first_heading(block: &str) -> Option<String> {
    let inner = H1_RE.captures(block)?.get(1)?.as_str().trim().to_string();
    if inner.is_empty() {
        None
    } else {
        Some(inner)
    }
}

/// A "Module <identifier>" substring, normalized to "Module {identifier}"
/// ("Module 3", "Module One", ...).
pub fn module_phrase(text: &str) -> Option<String> {
    MODULE_IN_TITLE_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| format!("Module {}", m.as_str()))
}
