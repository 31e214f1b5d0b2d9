use serde::{Deserialize, Serialize};

/// Canvas rejects page/assignment titles longer than this.
pub const MAX_TITLE_LEN: usize = 255;

pub const DEFAULT_MODULE_NAME: &str = "General";

/// One text-bearing node as produced by the document-reading collaborator:
/// either plain paragraph text or a table already serialized to `<table>` HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextNode {
    Paragraph(String),
    Table(String),
}

impl TextNode {
    pub fn text(&self) -> &str {
        match self {
            TextNode::Paragraph(text) => text,
            TextNode::Table(html) => html,
        }
    }
}

/// One `<canvas_page>...</canvas_page>` region sliced out of the source
/// document. Immutable after extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryboardBlock {
    pub sequence_index: usize,
    pub raw_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Page,
    Assignment,
    Discussion,
    Quiz,
}

impl ContentKind {
    /// Normalizes free-text `<page_type>` content. Unrecognized values and
    /// absent tags default to a plain page.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "assignment" | "homework" => ContentKind::Assignment,
            "discussion" | "forum" => ContentKind::Discussion,
            "quiz" | "exam" | "test" => ContentKind::Quiz,
            _ => ContentKind::Page,
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentKind::Page => write!(f, "page"),
            ContentKind::Assignment => write!(f, "assignment"),
            ContentKind::Discussion => write!(f, "discussion"),
            ContentKind::Quiz => write!(f, "quiz"),
        }
    }
}

/// Metadata resolved from one storyboard block. The driver may edit this
/// before generation starts; the resolver itself performs no side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPageMeta {
    pub sequence_index: usize,
    pub content_kind: ContentKind,
    pub title: String,
    pub module_name: String,
    pub template_hint: String,
}

impl ResolvedPageMeta {
    /// Title capped to the Canvas field-length limit, applied before any
    /// create call is issued.
    pub fn canvas_title(&self) -> String {
        if self.title.chars().count() <= MAX_TITLE_LEN {
            self.title.clone()
        } else {
            self.title.chars().take(MAX_TITLE_LEN).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_kind_parses_known_values() {
        assert_eq!(ContentKind::parse("page"), ContentKind::Page);
        assert_eq!(ContentKind::parse("Assignment"), ContentKind::Assignment);
        assert_eq!(ContentKind::parse(" QUIZ "), ContentKind::Quiz);
        assert_eq!(ContentKind::parse("discussion"), ContentKind::Discussion);
    }

    #[test]
    fn content_kind_maps_aliases() {
        assert_eq!(ContentKind::parse("homework"), ContentKind::Assignment);
        assert_eq!(ContentKind::parse("exam"), ContentKind::Quiz);
        assert_eq!(ContentKind::parse("forum"), ContentKind::Discussion);
    }

    #[test]
    fn content_kind_defaults_unrecognized_to_page() {
        assert_eq!(ContentKind::parse(""), ContentKind::Page);
        assert_eq!(ContentKind::parse("worksheet"), ContentKind::Page);
    }

    #[test]
    fn canvas_title_caps_at_platform_limit() {
        let meta = ResolvedPageMeta {
            sequence_index: 0,
            content_kind: ContentKind::Page,
            title: "x".repeat(300),
            module_name: "Week 1".into(),
            template_hint: String::new(),
        };
        assert_eq!(meta.canvas_title().chars().count(), MAX_TITLE_LEN);

        let short = ResolvedPageMeta {
            title: "Intro".into(),
            ..meta
        };
        assert_eq!(short.canvas_title(), "Intro");
    }

    #[test]
    fn canvas_title_truncation_respects_char_boundaries() {
        let meta = ResolvedPageMeta {
            sequence_index: 0,
            content_kind: ContentKind::Page,
            title: "é".repeat(300),
            module_name: "Week 1".into(),
            template_hint: String::new(),
        };
        let capped = meta.canvas_title();
        assert_eq!(capped.chars().count(), MAX_TITLE_LEN);
    }
}
