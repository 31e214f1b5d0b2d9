use crate::models::storyboard::{
    ContentKind, ResolvedPageMeta, StoryboardBlock, DEFAULT_MODULE_NAME,
};
use crate::storyboard::tags;

/// One step of the module-name fallback chain. Strategies are pure and
/// applied in order until one yields a value.
type ModuleStrategy = fn(&StoryboardBlock, Option<&str>) -> Option<String>;

const MODULE_STRATEGIES: &[ModuleStrategy] = &[
    explicit_tag,
    heading_scan,
    title_pattern,
    carry_forward,
];

fn explicit_tag(block: &StoryboardBlock, _prior: Option<&str>) -> Option<String> {
    tags::extract_tag("module_name", &block.raw_text)
}

fn heading_scan(block: &StoryboardBlock, _prior: Option<&str>) -> Option<String> {
    tags::first_heading(&block.raw_text)
}

fn title_pattern(block: &StoryboardBlock, _prior: Option<&str>) -> Option<String> {
    tags::module_phrase(&title_for(block))
}

fn carry_forward(_block: &StoryboardBlock, prior: Option<&str>) -> Option<String> {
    prior.filter(|m| !m.trim().is_empty()).map(String::from)
}

fn title_for(block: &StoryboardBlock) -> String {
    tags::extract_tag("page_title", &block.raw_text)
        .unwrap_or_else(|| format!("Page {}", block.sequence_index + 1))
}

/// Resolves per-block metadata. `prior_module` is the most recently resolved
/// module name of an earlier block in the same run; an absent `<module_name>`
/// inherits it (module continuity is positional by author convention).
pub fn resolve(block: &StoryboardBlock, prior_module: Option<&str>) -> ResolvedPageMeta {
    let content_kind = ContentKind::parse(
        &tags::extract_tag("page_type", &block.raw_text).unwrap_or_default(),
    );
    let title = title_for(block);
    let module_name = MODULE_STRATEGIES
        .iter()
        .find_map(|strategy| strategy(block, prior_module))
        .unwrap_or_else(|| DEFAULT_MODULE_NAME.to_string());
    let template_hint =
        tags::extract_tag("template_type", &block.raw_text).unwrap_or_default();

    ResolvedPageMeta {
        sequence_index: block.sequence_index,
        content_kind,
        title,
        module_name,
        template_hint,
    }
}
