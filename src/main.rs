use std::process::ExitCode;
use std::sync::Arc;

use storyforge::canvas::{
    CanvasApi, CanvasPublisher, ClassicQuizEngine, HttpCanvasClient, NewQuizEngine,
    PublishDefaults, QuizEngine, QuizEngineKind,
};
use storyforge::config::Config;
use storyforge::generator::{load_kb_snippets, OpenAiGenerator, TemplateContext};
use storyforge::models::storyboard::TextNode;
use storyforge::pipeline::{generate_selection, run_batch};
use storyforge::run_state::RunState;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let Some(path) = std::env::args().nth(1) else {
        log::error!("Usage: storyforge <storyboard.txt>");
        return ExitCode::FAILURE;
    };

    let config = Config::from_env();
    if !config.dry_run {
        config.validate_for_upload();
    }

    let nodes = match read_storyboard(&path) {
        Ok(nodes) => nodes,
        Err(err) => {
            log::error!("Could not read '{}': {}", path, err);
            return ExitCode::FAILURE;
        }
    };

    let mut state = RunState::load(&nodes);
    if state.pages.is_empty() {
        log::error!("No <canvas_page> blocks found in '{}'", path);
        return ExitCode::FAILURE;
    }
    log::info!("Parsed {} page block(s) from '{}'", state.pages.len(), path);
    for page in &state.pages {
        log::info!(
            "  [{}] {} '{}' -> module '{}'",
            page.meta.sequence_index,
            page.meta.content_kind,
            page.meta.title,
            page.meta.module_name
        );
    }

    let generator = OpenAiGenerator::new(&config.openai_api_key, config.openai_model.clone());
    let ctx = build_template_context(&config).await;
    let selection: Vec<usize> = state.pages.iter().map(|p| p.meta.sequence_index).collect();

    if config.dry_run {
        let generated = generate_selection(&generator, &ctx, &mut state, &selection).await;
        log::info!(
            "Dry run complete: {}/{} page(s) generated",
            generated.len(),
            selection.len()
        );
        for (index, title) in &generated {
            let preview: String = state
                .generated_for(*index)
                .map(|c| c.html_body.chars().take(120).collect())
                .unwrap_or_default();
            log::info!("  [{}] '{}': {}", index, title, preview);
        }
        return if generated.len() == selection.len() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    let publisher = match build_publisher(&config) {
        Ok(p) => p,
        Err(err) => {
            log::error!("Could not build Canvas client: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let results = run_batch(&generator, &publisher, &ctx, &mut state, &selection).await;

    let mut failures = 0;
    for result in &results {
        if result.is_success() {
            log::info!(
                "OK   {} '{}' in module '{}'",
                result.content_kind,
                result.title,
                result.module_name
            );
        } else {
            failures += 1;
            let detail = result
                .error
                .as_ref()
                .map(|e| format!("{} ({})", e, e.error_code()))
                .unwrap_or_else(|| "unknown failure".to_string());
            log::error!("FAIL {} '{}': {}", result.content_kind, result.title, detail);
        }
        for qerr in &result.question_failures {
            log::warn!("     '{}': {}", result.title, qerr);
        }
    }

    log::info!(
        "Run complete: {} ok, {} failed",
        results.len() - failures,
        failures
    );
    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Reads the pre-extracted storyboard text, one node per line. Lines that
/// open with `<table` are table nodes serialized by the document reader.
fn read_storyboard(path: &str) -> std::io::Result<Vec<TextNode>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(raw
        .lines()
        .map(|line| {
            if line.trim_start().starts_with("<table") {
                TextNode::Table(line.to_string())
            } else {
                TextNode::Paragraph(line.to_string())
            }
        })
        .collect())
}

async fn build_template_context(config: &Config) -> TemplateContext {
    let mut ctx = TemplateContext::default();
    if config.kb_configured() {
        let http = reqwest::Client::new();
        ctx.kb_snippets = load_kb_snippets(
            &http,
            &config.kb_owner,
            &config.kb_repo,
            &config.kb_branch,
            &config.kb_paths,
        )
        .await;
        log::info!("Loaded {} knowledge-base snippet(s)", ctx.kb_snippets.len());
    }
    ctx
}

fn build_publisher(config: &Config) -> storyforge::errors::PipelineResult<CanvasPublisher> {
    let api: Arc<dyn CanvasApi> = Arc::new(HttpCanvasClient::new(
        &config.canvas_domain,
        config.canvas_course_id.clone(),
        config.canvas_token.clone(),
    )?);

    let quiz_engine: Arc<dyn QuizEngine> = match config.quiz_engine {
        QuizEngineKind::Classic => Arc::new(ClassicQuizEngine::new(api.clone())),
        QuizEngineKind::NewQuizzes => {
            Arc::new(NewQuizEngine::new(api.clone(), config.new_quiz_template_id))
        }
    };

    Ok(CanvasPublisher::new(
        api,
        quiz_engine,
        PublishDefaults {
            assignment_points: config.assignment_points,
            submission_type: config.submission_type.clone(),
        },
    ))
}
