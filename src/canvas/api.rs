use async_trait::async_trait;

use crate::errors::PipelineResult;
use crate::models::publish::ContentHandle;

/// One module as returned by the Canvas module-list endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteModule {
    pub id: i64,
    pub name: String,
}

/// The Canvas REST surface the publishing protocol consumes. Kept narrow so
/// tests can swap in an in-memory implementation.
///
/// All calls are fire-once: resource creation is not idempotent, so nothing
/// here retries on its own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CanvasApi: Send + Sync {
    async fn list_modules(&self) -> PipelineResult<Vec<RemoteModule>>;

    async fn create_module(&self, name: &str) -> PipelineResult<i64>;

    /// Returns the created page's slug ("url" in Canvas terms).
    async fn create_page(&self, title: &str, body: &str) -> PipelineResult<String>;

    async fn create_assignment(
        &self,
        title: &str,
        body: &str,
        points: f64,
        submission_type: &str,
    ) -> PipelineResult<i64>;

    async fn create_discussion(&self, title: &str, body: &str) -> PipelineResult<i64>;

    async fn create_module_item(
        &self,
        module_id: i64,
        title: &str,
        handle: &ContentHandle,
    ) -> PipelineResult<()>;

    /// Classic quiz shell; returns the quiz id.
    async fn create_classic_quiz(&self, title: &str, description: &str) -> PipelineResult<i64>;

    async fn create_classic_question(
        &self,
        quiz_id: i64,
        payload: &serde_json::Value,
    ) -> PipelineResult<()>;

    /// New Quiz (LTI) shell; returns the assignment-level id used for linking,
    /// which is distinct from the quiz's internal id.
    async fn create_new_quiz(&self, title: &str, instructions: &str) -> PipelineResult<i64>;

    async fn create_new_quiz_item(
        &self,
        assignment_id: i64,
        payload: &serde_json::Value,
    ) -> PipelineResult<()>;

    /// Best-effort clone of an existing New Quiz. Not every Canvas instance
    /// exposes the endpoint; Ok(None) means "unsupported, create fresh".
    async fn clone_new_quiz(&self, template_assignment_id: i64) -> PipelineResult<Option<i64>>;

    async fn update_new_quiz(
        &self,
        assignment_id: i64,
        title: &str,
        instructions: &str,
    ) -> PipelineResult<()>;
}
