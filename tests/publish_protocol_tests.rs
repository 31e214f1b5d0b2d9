use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use storyforge::canvas::{
    CanvasApi, CanvasPublisher, ClassicQuizEngine, PublishDefaults, RemoteModule,
};
use storyforge::errors::{PipelineError, PipelineResult};
use storyforge::generator::{ContentGenerator, TemplateContext};
use storyforge::models::content::{GeneratedContent, QuizAnswer, QuizQuestion, QuizSpec};
use storyforge::models::publish::ContentHandle;
use storyforge::models::storyboard::{ContentKind, ResolvedPageMeta, StoryboardBlock, TextNode};
use storyforge::pipeline::run_batch;
use storyforge::run_state::RunState;

#[derive(Default)]
struct CanvasState {
    next_id: i64,
    modules: Vec<RemoteModule>,
    module_creates: usize,
    pages: Vec<(String, String)>,
    assignments: Vec<(String, f64, String)>,
    discussions: Vec<String>,
    module_items: Vec<(i64, String, String)>,
    classic_quizzes: Vec<(i64, String, String)>,
    classic_questions: HashMap<i64, Vec<serde_json::Value>>,
    question_appends: usize,
    fail_question_at: Option<usize>,
    fail_module_items: bool,
}

struct InMemoryCanvasApi {
    state: Arc<RwLock<CanvasState>>,
}

impl InMemoryCanvasApi {
    fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(CanvasState {
                next_id: 100,
                ..CanvasState::default()
            })),
        }
    }

    async fn alloc_id(&self) -> i64 {
        let mut state = self.state.write().await;
        state.next_id += 1;
        state.next_id
    }
}

#[async_trait]
impl CanvasApi for InMemoryCanvasApi {
    async fn list_modules(&self) -> PipelineResult<Vec<RemoteModule>> {
        Ok(self.state.read().await.modules.clone())
    }

    async fn create_module(&self, name: &str) -> PipelineResult<i64> {
        let id = self.alloc_id().await;
        let mut state = self.state.write().await;
        state.module_creates += 1;
        state.modules.push(RemoteModule {
            id,
            name: name.to_string(),
        });
        Ok(id)
    }

    async fn create_page(&self, title: &str, body: &str) -> PipelineResult<String> {
        let mut state = self.state.write().await;
        state.pages.push((title.to_string(), body.to_string()));
        Ok(title.to_lowercase().replace(' ', "-"))
    }

    async fn create_assignment(
        &self,
        title: &str,
        _body: &str,
        points: f64,
        submission_type: &str,
    ) -> PipelineResult<i64> {
        let id = self.alloc_id().await;
        let mut state = self.state.write().await;
        state
            .assignments
            .push((title.to_string(), points, submission_type.to_string()));
        Ok(id)
    }

    async fn create_discussion(&self, title: &str, _body: &str) -> PipelineResult<i64> {
        let id = self.alloc_id().await;
        self.state.write().await.discussions.push(title.to_string());
        Ok(id)
    }

    async fn create_module_item(
        &self,
        module_id: i64,
        title: &str,
        handle: &ContentHandle,
    ) -> PipelineResult<()> {
        let mut state = self.state.write().await;
        if state.fail_module_items {
            return Err(PipelineError::RemoteStatus {
                status: 400,
                body: "link rejected".into(),
            });
        }
        state.module_items.push((
            module_id,
            title.to_string(),
            handle.module_item_type().to_string(),
        ));
        Ok(())
    }

    async fn create_classic_quiz(&self, title: &str, description: &str) -> PipelineResult<i64> {
        let id = self.alloc_id().await;
        let mut state = self.state.write().await;
        state
            .classic_quizzes
            .push((id, title.to_string(), description.to_string()));
        Ok(id)
    }

    async fn create_classic_question(
        &self,
        quiz_id: i64,
        payload: &serde_json::Value,
    ) -> PipelineResult<()> {
        let mut state = self.state.write().await;
        state.question_appends += 1;
        if state.fail_question_at == Some(state.question_appends) {
            return Err(PipelineError::RemoteStatus {
                status: 422,
                body: "invalid question".into(),
            });
        }
        state
            .classic_questions
            .entry(quiz_id)
            .or_default()
            .push(payload.clone());
        Ok(())
    }

    async fn create_new_quiz(&self, _title: &str, _instructions: &str) -> PipelineResult<i64> {
        Ok(self.alloc_id().await)
    }

    async fn create_new_quiz_item(
        &self,
        _assignment_id: i64,
        _payload: &serde_json::Value,
    ) -> PipelineResult<()> {
        Ok(())
    }

    async fn clone_new_quiz(&self, _template_assignment_id: i64) -> PipelineResult<Option<i64>> {
        Ok(None)
    }

    async fn update_new_quiz(
        &self,
        _assignment_id: i64,
        _title: &str,
        _instructions: &str,
    ) -> PipelineResult<()> {
        Ok(())
    }
}

/// Deterministic generator: quizzes get a three-question spec, everything
/// else plain HTML. Optionally fails for a chosen sequence index.
struct StubGenerator {
    fail_index: Option<usize>,
}

#[async_trait]
impl ContentGenerator for StubGenerator {
    async fn generate(
        &self,
        meta: &ResolvedPageMeta,
        _block: &StoryboardBlock,
        _ctx: &TemplateContext,
    ) -> PipelineResult<GeneratedContent> {
        if self.fail_index == Some(meta.sequence_index) {
            return Err(PipelineError::Generation("model unavailable".into()));
        }
        let quiz_spec = match meta.content_kind {
            ContentKind::Quiz => Some(QuizSpec {
                quiz_description: format!("<p>{} questions</p>", meta.title),
                questions: (1..=3)
                    .map(|n| QuizQuestion {
                        question_name: format!("Q{}", n),
                        question_text: format!("<p>Question {}</p>", n),
                        answers: vec![
                            QuizAnswer {
                                text: "Right".into(),
                                is_correct: true,
                                feedback: None,
                            },
                            QuizAnswer {
                                text: "Wrong".into(),
                                is_correct: false,
                                feedback: None,
                            },
                        ],
                        shuffle: false,
                        feedback: None,
                    })
                    .collect(),
            }),
            _ => None,
        };
        Ok(GeneratedContent {
            html_body: format!("<h2>{}</h2><p>Generated body.</p>", meta.title),
            quiz_spec,
        })
    }
}

fn paragraphs(lines: &[&str]) -> Vec<TextNode> {
    lines
        .iter()
        .map(|l| TextNode::Paragraph((*l).to_string()))
        .collect()
}

fn publisher_for(api: &Arc<InMemoryCanvasApi>) -> CanvasPublisher {
    let api: Arc<dyn CanvasApi> = Arc::new(InMemoryCanvasApi {
        state: api.state.clone(),
    });
    let engine = Arc::new(ClassicQuizEngine::new(api.clone()));
    CanvasPublisher::new(api, engine, PublishDefaults::default())
}

fn all_indices(state: &RunState) -> Vec<usize> {
    state.pages.iter().map(|p| p.meta.sequence_index).collect()
}

#[tokio::test]
async fn page_block_publishes_end_to_end() {
    let nodes = paragraphs(&[
        "<canvas_page>",
        "<page_title>Course Welcome</page_title>",
        "<module_name>Week 1</module_name>",
        "<p>Welcome text.</p>",
        "</canvas_page>",
    ]);
    let mut state = RunState::load(&nodes);
    let api = Arc::new(InMemoryCanvasApi::new());
    let publisher = publisher_for(&api);
    let generator = StubGenerator { fail_index: None };

    let selection = all_indices(&state);
    let results = run_batch(
        &generator,
        &publisher,
        &TemplateContext::default(),
        &mut state,
        &selection,
    )
    .await;

    assert_eq!(results.len(), 1);
    assert!(results[0].is_success());

    let canvas = api.state.read().await;
    assert_eq!(canvas.module_creates, 1);
    assert_eq!(canvas.modules[0].name, "Week 1");
    assert_eq!(canvas.pages.len(), 1);
    assert_eq!(canvas.pages[0].0, "Course Welcome");
    assert_eq!(canvas.module_items.len(), 1);
    assert_eq!(canvas.module_items[0].1, "Course Welcome");
    assert_eq!(canvas.module_items[0].2, "Page");
}

#[tokio::test]
async fn module_is_created_once_per_run() {
    let nodes = paragraphs(&[
        "<canvas_page>",
        "<page_title>Lesson A</page_title>",
        "<module_name>Week 1</module_name>",
        "</canvas_page>",
        "<canvas_page>",
        "<page_title>Lesson B</page_title>",
        "</canvas_page>",
        "<canvas_page>",
        "<page_title>Lesson C</page_title>",
        "<module_name>week 1</module_name>",
        "</canvas_page>",
    ]);
    let mut state = RunState::load(&nodes);
    let api = Arc::new(InMemoryCanvasApi::new());
    let publisher = publisher_for(&api);
    let generator = StubGenerator { fail_index: None };

    let selection = all_indices(&state);
    let results = run_batch(
        &generator,
        &publisher,
        &TemplateContext::default(),
        &mut state,
        &selection,
    )
    .await;

    assert!(results.iter().all(|r| r.is_success()));

    let canvas = api.state.read().await;
    // Blocks two and three resolve to "Week 1" by carry-forward and
    // case-insensitive match; the module is still created exactly once.
    assert_eq!(canvas.module_creates, 1);
    assert_eq!(canvas.module_items.len(), 3);
    let module_id = canvas.modules[0].id;
    assert!(canvas.module_items.iter().all(|(id, _, _)| *id == module_id));
}

#[tokio::test]
async fn quiz_question_failure_is_partial_not_fatal() {
    let nodes = paragraphs(&[
        "<canvas_page>",
        "<page_type>quiz</page_type>",
        "<page_title>Checkpoint</page_title>",
        "<module_name>Week 2</module_name>",
        "</canvas_page>",
    ]);
    let mut state = RunState::load(&nodes);
    let api = Arc::new(InMemoryCanvasApi::new());
    api.state.write().await.fail_question_at = Some(2);
    let publisher = publisher_for(&api);
    let generator = StubGenerator { fail_index: None };

    let selection = all_indices(&state);
    let results = run_batch(
        &generator,
        &publisher,
        &TemplateContext::default(),
        &mut state,
        &selection,
    )
    .await;

    assert_eq!(results.len(), 1);
    let result = &results[0];
    // The quiz itself published and linked; one question was lost.
    assert!(result.is_success());
    assert_eq!(result.question_failures.len(), 1);
    assert_eq!(result.question_failures[0].error_code(), "QUESTION_APPEND_ERROR");

    let canvas = api.state.read().await;
    assert_eq!(canvas.classic_quizzes.len(), 1);
    let quiz_id = canvas.classic_quizzes[0].0;
    // Questions 1 and 3 were appended; question 2's failure did not stop 3.
    let stored = canvas.classic_questions.get(&quiz_id).unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0]["question"]["question_name"], "Q1");
    assert_eq!(stored[1]["question"]["question_name"], "Q3");
    assert_eq!(canvas.module_items.len(), 1);
    assert_eq!(canvas.module_items[0].2, "Quiz");
}

#[tokio::test]
async fn link_failure_leaves_resource_in_place() {
    let nodes = paragraphs(&[
        "<canvas_page>",
        "<page_type>discussion</page_type>",
        "<page_title>Introduce Yourself</page_title>",
        "<module_name>Week 1</module_name>",
        "</canvas_page>",
    ]);
    let mut state = RunState::load(&nodes);
    let api = Arc::new(InMemoryCanvasApi::new());
    api.state.write().await.fail_module_items = true;
    let publisher = publisher_for(&api);
    let generator = StubGenerator { fail_index: None };

    let selection = all_indices(&state);
    let results = run_batch(
        &generator,
        &publisher,
        &TemplateContext::default(),
        &mut state,
        &selection,
    )
    .await;

    let result = &results[0];
    assert!(!result.is_success());
    assert!(!result.module_link_ok);
    // The discussion was created and its handle retained for manual cleanup.
    assert!(matches!(
        result.handle,
        Some(ContentHandle::Discussion { .. })
    ));
    assert_eq!(
        result.error.as_ref().map(|e| e.error_code()),
        Some("MODULE_LINK_ERROR")
    );

    let canvas = api.state.read().await;
    assert_eq!(canvas.discussions.len(), 1);
    assert!(canvas.module_items.is_empty());
}

#[tokio::test]
async fn generation_failure_skips_block_and_continues() {
    let nodes = paragraphs(&[
        "<canvas_page>",
        "<page_title>First</page_title>",
        "<module_name>Week 1</module_name>",
        "</canvas_page>",
        "<canvas_page>",
        "<page_title>Second</page_title>",
        "</canvas_page>",
    ]);
    let mut state = RunState::load(&nodes);
    let api = Arc::new(InMemoryCanvasApi::new());
    let publisher = publisher_for(&api);
    let generator = StubGenerator {
        fail_index: Some(0),
    };

    let selection = all_indices(&state);
    let results = run_batch(
        &generator,
        &publisher,
        &TemplateContext::default(),
        &mut state,
        &selection,
    )
    .await;

    assert_eq!(results.len(), 2);
    assert_eq!(
        results[0].error.as_ref().map(|e| e.error_code()),
        Some("GENERATION_ERROR")
    );
    assert!(results[1].is_success());

    let canvas = api.state.read().await;
    assert_eq!(canvas.pages.len(), 1);
    assert_eq!(canvas.pages[0].0, "Second");
}

#[tokio::test]
async fn assignment_uses_configured_defaults() {
    let nodes = paragraphs(&[
        "<canvas_page>",
        "<page_type>assignment</page_type>",
        "<page_title>Essay One</page_title>",
        "<module_name>Week 3</module_name>",
        "</canvas_page>",
    ]);
    let mut state = RunState::load(&nodes);
    let api = Arc::new(InMemoryCanvasApi::new());
    let publisher = publisher_for(&api);
    let generator = StubGenerator { fail_index: None };

    let selection = all_indices(&state);
    let results = run_batch(
        &generator,
        &publisher,
        &TemplateContext::default(),
        &mut state,
        &selection,
    )
    .await;

    assert!(results[0].is_success());

    let canvas = api.state.read().await;
    assert_eq!(canvas.assignments.len(), 1);
    let (title, points, submission_type) = &canvas.assignments[0];
    assert_eq!(title, "Essay One");
    assert_eq!(*points, 10.0);
    assert_eq!(submission_type, "online_upload");
    assert_eq!(canvas.module_items[0].2, "Assignment");
}
