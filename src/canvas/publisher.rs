use std::sync::Arc;

use crate::canvas::api::CanvasApi;
use crate::canvas::quiz::{publish_quiz, QuizEngine};
use crate::errors::{PipelineError, PipelineResult};
use crate::models::content::GeneratedContent;
use crate::models::publish::{ContentHandle, ModuleRef, PublishResult};
use crate::models::storyboard::{ContentKind, ResolvedPageMeta};
use crate::run_state::ModuleCache;

pub const DEFAULT_ASSIGNMENT_POINTS: f64 = 10.0;
pub const DEFAULT_SUBMISSION_TYPE: &str = "online_upload";

#[derive(Debug, Clone)]
pub struct PublishDefaults {
    pub assignment_points: f64,
    pub submission_type: String,
}

impl Default for PublishDefaults {
    fn default() -> Self {
        Self {
            assignment_points: DEFAULT_ASSIGNMENT_POINTS,
            submission_type: DEFAULT_SUBMISSION_TYPE.to_string(),
        }
    }
}

/// Drives the per-block publish protocol: resolve the target module, create
/// the content resource, link it into the module. Each stage's failure is
/// mapped to its own error variant so the driver can report where a block
/// stopped.
pub struct CanvasPublisher {
    api: Arc<dyn CanvasApi>,
    quiz_engine: Arc<dyn QuizEngine>,
    defaults: PublishDefaults,
}

impl CanvasPublisher {
    pub fn new(
        api: Arc<dyn CanvasApi>,
        quiz_engine: Arc<dyn QuizEngine>,
        defaults: PublishDefaults,
    ) -> Self {
        Self {
            api,
            quiz_engine,
            defaults,
        }
    }

    /// Resolves a module name to its remote id, creating the module when no
    /// existing one matches. The run-scoped cache guarantees at most one
    /// create per distinct name within a run.
    pub async fn resolve_module(
        &self,
        name: &str,
        cache: &mut ModuleCache,
    ) -> PipelineResult<ModuleRef> {
        let key = name.trim().to_lowercase();
        if let Some(id) = cache.get(&key) {
            return Ok(ModuleRef {
                name: name.trim().to_string(),
                remote_id: *id,
            });
        }

        // A failed listing is not fatal; we fall through to creation, which
        // at worst duplicates a module that already existed remotely.
        let existing = match self.api.list_modules().await {
            Ok(modules) => modules,
            Err(err) => {
                log::warn!("Module list failed, will create '{}' blind: {}", name, err);
                Vec::new()
            }
        };

        let id = match existing
            .iter()
            .find(|m| m.name.trim().to_lowercase() == key)
        {
            Some(module) => {
                log::info!("Reusing module '{}' (id {})", module.name, module.id);
                module.id
            }
            None => {
                let id = self.api.create_module(name.trim()).await.map_err(|err| {
                    PipelineError::ModuleResolution {
                        module: name.to_string(),
                        detail: err.to_string(),
                    }
                })?;
                log::info!("Created module '{}' (id {})", name.trim(), id);
                id
            }
        };

        cache.insert(key, id);
        Ok(ModuleRef {
            name: name.trim().to_string(),
            remote_id: id,
        })
    }

    /// Publishes one generated block. Never panics and never rolls back: a
    /// partially published block is reported as such in the result.
    pub async fn publish(
        &self,
        meta: &ResolvedPageMeta,
        content: &GeneratedContent,
        cache: &mut ModuleCache,
    ) -> PublishResult {
        let module = match self.resolve_module(&meta.module_name, cache).await {
            Ok(module) => module,
            Err(err) => return PublishResult::failed(meta, err),
        };

        let title = meta.canvas_title();
        let (handle, question_failures) = match self.create_resource(meta, content, &title).await {
            Ok(created) => created,
            Err(err) => return PublishResult::failed(meta, err),
        };

        match self
            .api
            .create_module_item(module.remote_id, &title, &handle)
            .await
        {
            Ok(()) => PublishResult::linked(meta, handle, question_failures),
            Err(err) => {
                let link_err = PipelineError::ModuleLink {
                    title: title.clone(),
                    detail: err.to_string(),
                };
                log::error!("{}", link_err);
                PublishResult::unlinked(meta, handle, question_failures, link_err)
            }
        }
    }

    async fn create_resource(
        &self,
        meta: &ResolvedPageMeta,
        content: &GeneratedContent,
        title: &str,
    ) -> PipelineResult<(ContentHandle, Vec<PipelineError>)> {
        let wrap = |err: PipelineError| PipelineError::ResourceCreation {
            kind: meta.content_kind,
            detail: err.to_string(),
        };

        match meta.content_kind {
            ContentKind::Page => {
                let slug = self
                    .api
                    .create_page(title, &content.html_body)
                    .await
                    .map_err(wrap)?;
                Ok((ContentHandle::Page { slug }, Vec::new()))
            }
            ContentKind::Assignment => {
                let id = self
                    .api
                    .create_assignment(
                        title,
                        &content.html_body,
                        self.defaults.assignment_points,
                        &self.defaults.submission_type,
                    )
                    .await
                    .map_err(wrap)?;
                Ok((ContentHandle::Assignment { id }, Vec::new()))
            }
            ContentKind::Discussion => {
                let id = self
                    .api
                    .create_discussion(title, &content.html_body)
                    .await
                    .map_err(wrap)?;
                Ok((ContentHandle::Discussion { id }, Vec::new()))
            }
            ContentKind::Quiz => {
                let (shell, failures) =
                    publish_quiz(self.quiz_engine.as_ref(), meta, content).await?;
                Ok((shell.handle, failures))
            }
        }
    }
}
