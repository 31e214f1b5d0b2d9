use thiserror::Error;

use crate::models::storyboard::ContentKind;

#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Module resolution failed for '{module}': {detail}")]
    ModuleResolution { module: String, detail: String },

    #[error("{kind} creation failed: {detail}")]
    ResourceCreation { kind: ContentKind, detail: String },

    #[error("Module link failed for '{title}': {detail}")]
    ModuleLink { title: String, detail: String },

    #[error("Question {position} append failed: {detail}")]
    QuestionAppend { position: usize, detail: String },

    #[error("Canvas returned {status}: {body}")]
    RemoteStatus { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),
}

impl PipelineError {
    pub fn error_code(&self) -> &'static str {
        match self {
            PipelineError::Generation(_) => "GENERATION_ERROR",
            PipelineError::ModuleResolution { .. } => "MODULE_RESOLUTION_ERROR",
            PipelineError::ResourceCreation { .. } => "RESOURCE_CREATION_ERROR",
            PipelineError::ModuleLink { .. } => "MODULE_LINK_ERROR",
            PipelineError::QuestionAppend { .. } => "QUESTION_APPEND_ERROR",
            PipelineError::RemoteStatus { .. } => "REMOTE_STATUS_ERROR",
            PipelineError::Transport(_) => "TRANSPORT_ERROR",
        }
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        PipelineError::Transport(err.to_string())
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
