use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::content::{GeneratedContent, QuizSpec};
use crate::models::storyboard::ContentKind;

static FENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)```(?:html|json)?").expect("fence regex"));

/// Removes any fenced code-block delimiters the generator wrapped around HTML
/// or JSON, then trims.
pub fn strip_code_fences(raw: &str) -> String {
    FENCE_RE.replace_all(raw, "").trim().to_string()
}

/// Byte offset of the last top-level `{...}` object that terminates the text,
/// found by walking brace depth backwards from the end. Braces inside JSON
/// string values can defeat the count; the caller treats a failed parse as
/// "no quiz spec", never as an error.
fn trailing_object_start(text: &str) -> Option<usize> {
    let trimmed = text.trim_end();
    if !trimmed.ends_with('}') {
        return None;
    }
    let bytes = trimmed.as_bytes();
    let mut depth: i64 = 0;
    for i in (0..bytes.len()).rev() {
        match bytes[i] {
            b'}' => depth += 1,
            b'{' => {
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

/// Splits a cleaned quiz response into leading HTML and the trailing parsed
/// quiz object. On parse failure the whole text degrades to HTML.
pub fn split_trailing_quiz_json(cleaned: &str) -> (String, Option<QuizSpec>) {
    let Some(start) = trailing_object_start(cleaned) else {
        return (cleaned.to_string(), None);
    };
    match serde_json::from_str::<QuizSpec>(cleaned[start..].trim()) {
        Ok(spec) => (cleaned[..start].trim().to_string(), Some(spec)),
        Err(err) => {
            log::warn!("Trailing quiz JSON did not parse, keeping response as HTML: {}", err);
            (cleaned.to_string(), None)
        }
    }
}

/// Full response post-processing: strip fences, then split trailing quiz JSON
/// for quiz blocks only. Non-quiz kinds never populate `quiz_spec`.
pub fn post_process(raw: &str, kind: ContentKind) -> GeneratedContent {
    let cleaned = strip_code_fences(raw);
    if kind == ContentKind::Quiz {
        let (html_body, quiz_spec) = split_trailing_quiz_json(&cleaned);
        GeneratedContent {
            html_body,
            quiz_spec,
        }
    } else {
        GeneratedContent {
            html_body: cleaned,
            quiz_spec: None,
        }
    }
}
