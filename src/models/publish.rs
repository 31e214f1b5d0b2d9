use chrono::{DateTime, Utc};

use crate::errors::PipelineError;
use crate::models::storyboard::{ContentKind, ResolvedPageMeta};

/// A resolved remote Module identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRef {
    pub name: String,
    pub remote_id: i64,
}

/// Handle to a created Canvas resource, shaped the way module-item linking
/// needs it: pages link by slug, everything else by numeric content id. A New
/// Quiz is linked through its assignment id, not its internal quiz id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentHandle {
    Page { slug: String },
    Assignment { id: i64 },
    Discussion { id: i64 },
    ClassicQuiz { id: i64 },
    NewQuiz { assignment_id: i64 },
}

impl ContentHandle {
    pub fn module_item_type(&self) -> &'static str {
        match self {
            ContentHandle::Page { .. } => "Page",
            ContentHandle::Assignment { .. } | ContentHandle::NewQuiz { .. } => "Assignment",
            ContentHandle::Discussion { .. } => "Discussion",
            ContentHandle::ClassicQuiz { .. } => "Quiz",
        }
    }

    pub fn page_slug(&self) -> Option<&str> {
        match self {
            ContentHandle::Page { slug } => Some(slug),
            _ => None,
        }
    }

    pub fn content_id(&self) -> Option<i64> {
        match self {
            ContentHandle::Page { .. } => None,
            ContentHandle::Assignment { id }
            | ContentHandle::Discussion { id }
            | ContentHandle::ClassicQuiz { id } => Some(*id),
            ContentHandle::NewQuiz { assignment_id } => Some(*assignment_id),
        }
    }
}

/// Outcome of attempting to publish one block. Ephemeral; reported to the
/// driver for display, never persisted.
#[derive(Debug, Clone)]
pub struct PublishResult {
    pub content_kind: ContentKind,
    pub title: String,
    pub module_name: String,
    pub handle: Option<ContentHandle>,
    pub module_link_ok: bool,
    /// Per-question failures from the quiz sub-protocol; non-fatal.
    pub question_failures: Vec<PipelineError>,
    pub error: Option<PipelineError>,
    pub completed_at: DateTime<Utc>,
}

impl PublishResult {
    pub fn failed(meta: &ResolvedPageMeta, error: PipelineError) -> Self {
        Self {
            content_kind: meta.content_kind,
            title: meta.canvas_title(),
            module_name: meta.module_name.clone(),
            handle: None,
            module_link_ok: false,
            question_failures: Vec::new(),
            error: Some(error),
            completed_at: Utc::now(),
        }
    }

    pub fn linked(
        meta: &ResolvedPageMeta,
        handle: ContentHandle,
        question_failures: Vec<PipelineError>,
    ) -> Self {
        Self {
            content_kind: meta.content_kind,
            title: meta.canvas_title(),
            module_name: meta.module_name.clone(),
            handle: Some(handle),
            module_link_ok: true,
            question_failures,
            error: None,
            completed_at: Utc::now(),
        }
    }

    /// Resource exists in Canvas but could not be linked into its module; an
    /// accepted inconsistent end-state requiring manual follow-up.
    pub fn unlinked(
        meta: &ResolvedPageMeta,
        handle: ContentHandle,
        question_failures: Vec<PipelineError>,
        error: PipelineError,
    ) -> Self {
        Self {
            content_kind: meta.content_kind,
            title: meta.canvas_title(),
            module_name: meta.module_name.clone(),
            handle: Some(handle),
            module_link_ok: false,
            question_failures,
            error: Some(error),
            completed_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.module_link_ok
    }
}
