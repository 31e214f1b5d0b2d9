use std::time::Duration;

use async_openai::{config::OpenAIConfig, error::OpenAIError, Client};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use crate::constants::prompts::PAGE_BUILDER_SYSTEM_PROMPT;
use crate::errors::{PipelineError, PipelineResult};
use crate::generator::postprocess::post_process;
use crate::models::content::GeneratedContent;
use crate::models::storyboard::{ResolvedPageMeta, StoryboardBlock};

const MAX_ATTEMPTS: u32 = 3;
const BASE_BACKOFF_SECS: u64 = 2;
const MAX_KB_SNIPPETS: usize = 4;

/// Template/knowledge context handed to the generator alongside each block.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    /// Inlined template HTML, when the driver supplies one document wholesale.
    pub template_html: Option<String>,
    /// Pre-fetched knowledge-base snippets (structure reference only).
    pub kb_snippets: Vec<String>,
}

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generates Canvas-ready HTML (and, for quizzes, a structured quiz spec)
    /// for one block. Two calls with identical inputs are not guaranteed to
    /// return identical output; callers cache the first result.
    async fn generate(
        &self,
        meta: &ResolvedPageMeta,
        block: &StoryboardBlock,
        ctx: &TemplateContext,
    ) -> PipelineResult<GeneratedContent>;
}

pub fn build_user_prompt(
    meta: &ResolvedPageMeta,
    block: &StoryboardBlock,
    ctx: &TemplateContext,
) -> String {
    let mut prompt = String::new();

    let hint = if meta.template_hint.is_empty() {
        "auto"
    } else {
        &meta.template_hint
    };
    prompt.push_str(&format!(
        "Use template_type=\"{}\" if it matches a known template; otherwise choose the closest layout.\n",
        hint
    ));

    if let Some(template) = &ctx.template_html {
        prompt.push_str("\n--- TEMPLATE HTML ---\n");
        prompt.push_str(template);
        prompt.push('\n');
    }

    if !ctx.kb_snippets.is_empty() {
        prompt.push_str("\n--- KB SNIPPETS (for structure only; DO NOT paste verbatim) ---\n");
        let top: Vec<&str> = ctx
            .kb_snippets
            .iter()
            .take(MAX_KB_SNIPPETS)
            .map(String::as_str)
            .collect();
        prompt.push_str(&top.join("\n\n---SNIPPET---\n"));
        prompt.push('\n');
    }

    prompt.push_str("\nStoryboard page block:\n");
    prompt.push_str(&block.raw_text);
    prompt
}

/// Chat-completion implementation of the generator contract.
pub struct OpenAiGenerator {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAiGenerator {
    pub fn new(api_key: &SecretString, model: impl Into<String>) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key.expose_secret());
        Self {
            client: Client::with_config(config),
            model: model.into(),
            temperature: 0.2,
        }
    }

    async fn complete(&self, user_prompt: &str) -> Result<String, OpenAIError> {
        let body = json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                {"role": "system", "content": PAGE_BUILDER_SYSTEM_PROMPT},
                {"role": "user", "content": user_prompt},
            ],
        });

        let response: serde_json::Value = self.client.chat().create_byot(body).await?;
        let content = response["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .trim()
            .to_string();
        Ok(content)
    }
}

#[async_trait]
impl ContentGenerator for OpenAiGenerator {
    async fn generate(
        &self,
        meta: &ResolvedPageMeta,
        block: &StoryboardBlock,
        ctx: &TemplateContext,
    ) -> PipelineResult<GeneratedContent> {
        let user_prompt = build_user_prompt(meta, block, ctx);

        let mut attempt: u32 = 0;
        let raw = loop {
            match self.complete(&user_prompt).await {
                Ok(text) => break text,
                Err(err) if attempt + 1 < MAX_ATTEMPTS => {
                    attempt += 1;
                    let delay = Duration::from_secs(BASE_BACKOFF_SECS << attempt);
                    log::warn!(
                        "Generation attempt {} failed for '{}', retrying in {:?}: {}",
                        attempt,
                        meta.title,
                        delay,
                        err
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    return Err(PipelineError::Generation(format!(
                        "'{}' after {} attempts: {}",
                        meta.title, MAX_ATTEMPTS, err
                    )))
                }
            }
        };

        Ok(post_process(&raw, meta.content_kind))
    }
}
