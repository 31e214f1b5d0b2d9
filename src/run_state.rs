use std::collections::HashMap;

use crate::models::content::GeneratedContent;
use crate::models::storyboard::{ResolvedPageMeta, StoryboardBlock, TextNode};
use crate::storyboard::{extract_blocks, resolve};

/// Run-scoped module-name cache, keyed by trimmed lowercase name. Guarantees
/// at most one module create per distinct name within a run.
pub type ModuleCache = HashMap<String, i64>;

/// One extracted block paired with its resolved metadata.
#[derive(Debug, Clone)]
pub struct ParsedPage {
    pub block: StoryboardBlock,
    pub meta: ResolvedPageMeta,
}

/// In-memory state for one publishing run. Nothing here is persisted; a new
/// run starts from a clean slate against the same course.
#[derive(Debug, Default)]
pub struct RunState {
    pub pages: Vec<ParsedPage>,
    generated: HashMap<usize, GeneratedContent>,
    pub module_cache: ModuleCache,
}

impl RunState {
    /// Extracts and resolves every block from the document's text nodes,
    /// threading the carry-forward module name through in document order.
    pub fn load(nodes: &[TextNode]) -> Self {
        let blocks = extract_blocks(nodes);
        let mut prior_module: Option<String> = None;
        let pages = blocks
            .into_iter()
            .map(|block| {
                let meta = resolve(&block, prior_module.as_deref());
                prior_module = Some(meta.module_name.clone());
                ParsedPage { block, meta }
            })
            .collect();

        Self {
            pages,
            generated: HashMap::new(),
            module_cache: ModuleCache::new(),
        }
    }

    pub fn record_generated(&mut self, sequence_index: usize, content: GeneratedContent) {
        self.generated.insert(sequence_index, content);
    }

    pub fn generated_for(&self, sequence_index: usize) -> Option<&GeneratedContent> {
        self.generated.get(&sequence_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::storyboard::ContentKind;

    #[test]
    fn load_resolves_blocks_in_document_order() {
        let nodes = vec![
            TextNode::Paragraph("<canvas_page>".into()),
            TextNode::Paragraph("<page_title>Intro</page_title>".into()),
            TextNode::Paragraph("<module_name>Week 1</module_name>".into()),
            TextNode::Paragraph("</canvas_page>".into()),
            TextNode::Paragraph("<canvas_page>".into()),
            TextNode::Paragraph("<page_type>quiz</page_type>".into()),
            TextNode::Paragraph("<page_title>Checkpoint</page_title>".into()),
            TextNode::Paragraph("</canvas_page>".into()),
        ];

        let state = RunState::load(&nodes);
        assert_eq!(state.pages.len(), 2);
        assert_eq!(state.pages[0].meta.title, "Intro");
        assert_eq!(state.pages[1].meta.content_kind, ContentKind::Quiz);
        // Second block inherits the first block's module.
        assert_eq!(state.pages[1].meta.module_name, "Week 1");
    }

    #[test]
    fn generated_content_is_cached_by_index() {
        let mut state = RunState::default();
        assert!(state.generated_for(0).is_none());

        state.record_generated(
            0,
            GeneratedContent {
                html_body: "<p>done</p>".into(),
                quiz_spec: None,
            },
        );
        assert_eq!(
            state.generated_for(0).map(|c| c.html_body.as_str()),
            Some("<p>done</p>")
        );
    }
}
