use crate::canvas::CanvasPublisher;
use crate::generator::{ContentGenerator, TemplateContext};
use crate::models::publish::PublishResult;
use crate::run_state::RunState;

/// Publishes the selected pages sequentially in document order. Generation
/// results are cached in the run state so a re-run of a failed selection does
/// not pay for regeneration; a failed block is reported and skipped, never
/// aborting the batch.
pub async fn run_batch(
    generator: &dyn ContentGenerator,
    publisher: &CanvasPublisher,
    ctx: &TemplateContext,
    state: &mut RunState,
    selection: &[usize],
) -> Vec<PublishResult> {
    let mut results = Vec::with_capacity(selection.len());

    for &index in selection {
        let Some(page) = state.pages.iter().find(|p| p.meta.sequence_index == index) else {
            log::warn!("No parsed page with index {}, skipping", index);
            continue;
        };
        let meta = page.meta.clone();
        let block = page.block.clone();

        if state.generated_for(index).is_none() {
            log::info!("Generating {} '{}'", meta.content_kind, meta.title);
            match generator.generate(&meta, &block, ctx).await {
                Ok(content) => state.record_generated(index, content),
                Err(err) => {
                    log::error!("Generation failed for '{}': {}", meta.title, err);
                    results.push(PublishResult::failed(&meta, err));
                    continue;
                }
            }
        }

        // Present after the branch above unless record_generated was skipped,
        // which only happens on the error path that already continued.
        let Some(content) = state.generated_for(index).cloned() else {
            continue;
        };

        log::info!(
            "Publishing {} '{}' into module '{}'",
            meta.content_kind,
            meta.title,
            meta.module_name
        );
        let result = publisher
            .publish(&meta, &content, &mut state.module_cache)
            .await;

        if let Some(err) = &result.error {
            log::error!("'{}' failed at {}: {}", meta.title, err.error_code(), err);
        } else if !result.question_failures.is_empty() {
            log::warn!(
                "'{}' published with {} question failure(s)",
                meta.title,
                result.question_failures.len()
            );
        }
        results.push(result);
    }

    results
}

/// Generation-only pass for dry runs: fills the run-state cache and returns
/// (index, title) pairs of the pages that generated successfully.
pub async fn generate_selection(
    generator: &dyn ContentGenerator,
    ctx: &TemplateContext,
    state: &mut RunState,
    selection: &[usize],
) -> Vec<(usize, String)> {
    let mut generated = Vec::new();
    for &index in selection {
        let Some(page) = state.pages.iter().find(|p| p.meta.sequence_index == index) else {
            continue;
        };
        let meta = page.meta.clone();
        let block = page.block.clone();

        if state.generated_for(index).is_some() {
            generated.push((index, meta.title));
            continue;
        }
        match generator.generate(&meta, &block, ctx).await {
            Ok(content) => {
                state.record_generated(index, content);
                generated.push((index, meta.title));
            }
            Err(err) => log::error!("Generation failed for '{}': {}", meta.title, err),
        }
    }
    generated
}
