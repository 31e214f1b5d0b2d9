use serde::{Deserialize, Serialize};

/// Output of one generation request for one block. Callers cache it keyed by
/// block identity; regeneration is explicit because the generator is
/// non-deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedContent {
    pub html_body: String,
    /// Present only for quiz blocks whose trailing JSON parsed successfully.
    /// Absence is a valid state: the quiz shell is created from the HTML with
    /// zero questions appended.
    pub quiz_spec: Option<QuizSpec>,
}

/// The trailing JSON object the generator emits for quiz blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSpec {
    #[serde(default)]
    pub quiz_description: String,
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    #[serde(default)]
    pub question_name: String,
    #[serde(default)]
    pub question_text: String,
    #[serde(default)]
    pub answers: Vec<QuizAnswer>,
    #[serde(default)]
    pub shuffle: bool,
    #[serde(default)]
    pub feedback: Option<QuestionFeedback>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizAnswer {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionFeedback {
    #[serde(default)]
    pub correct: Option<String>,
    #[serde(default)]
    pub incorrect: Option<String>,
    #[serde(default)]
    pub neutral: Option<String>,
}
