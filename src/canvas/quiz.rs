use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::canvas::api::CanvasApi;
use crate::errors::{PipelineError, PipelineResult};
use crate::models::content::{GeneratedContent, QuizQuestion};
use crate::models::publish::ContentHandle;
use crate::models::storyboard::{ContentKind, ResolvedPageMeta};

const POINTS_PER_QUESTION: u32 = 1;
const DEFAULT_QUESTION_TITLE: &str = "Question";

/// Which quiz backend a run publishes to. The two are mutually exclusive and
/// wire-incompatible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizEngineKind {
    Classic,
    NewQuizzes,
}

impl QuizEngineKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "classic" => QuizEngineKind::Classic,
            _ => QuizEngineKind::NewQuizzes,
        }
    }
}

/// The created-but-possibly-empty quiz object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizShell {
    pub remote_id: i64,
    pub handle: ContentHandle,
}

/// Common capability contract of the two quiz backends. The sub-protocol in
/// `publish_quiz` is written against this, not against either concrete
/// backend.
#[async_trait]
pub trait QuizEngine: Send + Sync {
    async fn create_shell(&self, title: &str, description: &str) -> PipelineResult<QuizShell>;

    async fn append_question(
        &self,
        shell: &QuizShell,
        position: usize,
        question: &QuizQuestion,
    ) -> PipelineResult<()>;
}

/// Classic quiz payload: single-select multiple choice, weight 100 on correct
/// answers and 0 otherwise, one point per question.
pub(crate) fn classic_question_payload(question: &QuizQuestion) -> Value {
    let answers: Vec<Value> = question
        .answers
        .iter()
        .map(|a| {
            json!({
                "text": a.text,
                "weight": if a.is_correct { 100 } else { 0 },
            })
        })
        .collect();

    let name = if question.question_name.is_empty() {
        DEFAULT_QUESTION_TITLE
    } else {
        &question.question_name
    };

    json!({
        "question": {
            "question_name": name,
            "question_text": question.question_text,
            "question_type": "multiple_choice_question",
            "points_possible": POINTS_PER_QUESTION,
            "answers": answers,
        }
    })
}

/// New Quiz item payload: synthesized UUID per choice, the correct choice's
/// id as the scoring target (first answer when nothing is flagged correct),
/// shuffle rules, and question-level plus per-choice feedback.
pub(crate) fn new_quiz_item_payload(question: &QuizQuestion, position: usize) -> Option<Value> {
    if question.answers.is_empty() {
        return None;
    }

    let mut choices = Vec::new();
    let mut choice_ids = Vec::new();
    let mut answer_feedback = Map::new();
    let mut correct_choice_id: Option<String> = None;

    for (idx, answer) in question.answers.iter().enumerate() {
        let cid = Uuid::new_v4().to_string();
        choices.push(json!({
            "id": cid,
            "position": idx + 1,
            "itemBody": format!("<p>{}</p>", answer.text),
        }));
        if answer.is_correct && correct_choice_id.is_none() {
            correct_choice_id = Some(cid.clone());
        }
        if let Some(feedback) = &answer.feedback {
            answer_feedback.insert(cid.clone(), Value::String(feedback.clone()));
        }
        choice_ids.push(cid);
    }

    // Scoring is never left undefined.
    let correct = correct_choice_id.unwrap_or_else(|| choice_ids[0].clone());

    let title = if question.question_name.is_empty() {
        DEFAULT_QUESTION_TITLE
    } else {
        &question.question_name
    };

    let mut entry = json!({
        "interaction_type_slug": "choice",
        "title": title,
        "item_body": question.question_text,
        "calculator_type": "none",
        "interaction_data": {"choices": choices},
        "properties": {
            "shuffleRules": {"choices": {"toLock": [], "shuffled": question.shuffle}},
            "varyPointsByAnswer": false,
        },
        "scoring_data": {"value": correct},
        "scoring_algorithm": "Equivalence",
    });

    if let Some(feedback) = &question.feedback {
        let mut block = Map::new();
        if let Some(text) = &feedback.correct {
            block.insert("correct".into(), Value::String(text.clone()));
        }
        if let Some(text) = &feedback.incorrect {
            block.insert("incorrect".into(), Value::String(text.clone()));
        }
        if let Some(text) = &feedback.neutral {
            block.insert("neutral".into(), Value::String(text.clone()));
        }
        if !block.is_empty() {
            entry["feedback"] = Value::Object(block);
        }
    }
    if !answer_feedback.is_empty() {
        entry["answer_feedback"] = Value::Object(answer_feedback);
    }

    Some(json!({
        "item": {
            "entry_type": "Item",
            "points_possible": POINTS_PER_QUESTION,
            "position": position,
            "entry": entry,
        }
    }))
}

pub struct ClassicQuizEngine {
    api: Arc<dyn CanvasApi>,
}

impl ClassicQuizEngine {
    pub fn new(api: Arc<dyn CanvasApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl QuizEngine for ClassicQuizEngine {
    async fn create_shell(&self, title: &str, description: &str) -> PipelineResult<QuizShell> {
        let id = self.api.create_classic_quiz(title, description).await?;
        Ok(QuizShell {
            remote_id: id,
            handle: ContentHandle::ClassicQuiz { id },
        })
    }

    async fn append_question(
        &self,
        shell: &QuizShell,
        _position: usize,
        question: &QuizQuestion,
    ) -> PipelineResult<()> {
        let payload = classic_question_payload(question);
        self.api
            .create_classic_question(shell.remote_id, &payload)
            .await
    }
}

pub struct NewQuizEngine {
    api: Arc<dyn CanvasApi>,
    /// Optional template assignment to duplicate; falls back to fresh
    /// creation when the instance rejects cloning.
    template_assignment_id: Option<i64>,
}

impl NewQuizEngine {
    pub fn new(api: Arc<dyn CanvasApi>, template_assignment_id: Option<i64>) -> Self {
        Self {
            api,
            template_assignment_id,
        }
    }
}

#[async_trait]
impl QuizEngine for NewQuizEngine {
    async fn create_shell(&self, title: &str, description: &str) -> PipelineResult<QuizShell> {
        if let Some(template_id) = self.template_assignment_id {
            if let Some(assignment_id) = self.api.clone_new_quiz(template_id).await? {
                // Clones carry the template's title; rename and set the
                // generated description.
                self.api
                    .update_new_quiz(assignment_id, title, description)
                    .await?;
                return Ok(QuizShell {
                    remote_id: assignment_id,
                    handle: ContentHandle::NewQuiz { assignment_id },
                });
            }
            log::warn!(
                "Template {} clone not supported on this instance; creating a fresh New Quiz",
                template_id
            );
        }

        let assignment_id = self.api.create_new_quiz(title, description).await?;
        Ok(QuizShell {
            remote_id: assignment_id,
            handle: ContentHandle::NewQuiz { assignment_id },
        })
    }

    async fn append_question(
        &self,
        shell: &QuizShell,
        position: usize,
        question: &QuizQuestion,
    ) -> PipelineResult<()> {
        let Some(payload) = new_quiz_item_payload(question, position) else {
            log::warn!("Skipping question {} with no answers", position);
            return Ok(());
        };
        self.api
            .create_new_quiz_item(shell.remote_id, &payload)
            .await
    }
}

/// The quiz sub-protocol: create the shell, then append each question
/// independently. A question failure is reported and skipped; the shell is
/// never deleted because of it.
pub async fn publish_quiz(
    engine: &dyn QuizEngine,
    meta: &ResolvedPageMeta,
    content: &GeneratedContent,
) -> PipelineResult<(QuizShell, Vec<PipelineError>)> {
    let description = content
        .quiz_spec
        .as_ref()
        .filter(|spec| !spec.quiz_description.trim().is_empty())
        .map(|spec| spec.quiz_description.clone())
        .unwrap_or_else(|| content.html_body.clone());

    let shell = engine
        .create_shell(&meta.canvas_title(), &description)
        .await
        .map_err(|err| PipelineError::ResourceCreation {
            kind: ContentKind::Quiz,
            detail: err.to_string(),
        })?;

    let mut failures = Vec::new();
    if let Some(spec) = &content.quiz_spec {
        for (idx, question) in spec.questions.iter().enumerate() {
            let position = idx + 1;
            if let Err(err) = engine.append_question(&shell, position, question).await {
                let failure = PipelineError::QuestionAppend {
                    position,
                    detail: err.to_string(),
                };
                log::warn!("'{}': {}", meta.title, failure);
                failures.push(failure);
            }
        }
    } else {
        log::info!(
            "Quiz '{}' has no structured questions; shell created from HTML only",
            meta.title
        );
    }

    Ok((shell, failures))
}
