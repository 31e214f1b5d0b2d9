//! Shared fixtures for unit tests.

use crate::models::content::{GeneratedContent, QuizAnswer, QuizQuestion, QuizSpec};
use crate::models::storyboard::{ContentKind, ResolvedPageMeta};

pub fn sample_meta(kind: ContentKind) -> ResolvedPageMeta {
    ResolvedPageMeta {
        sequence_index: 0,
        content_kind: kind,
        title: "Intro to Testing".into(),
        module_name: "Week 1".into(),
        template_hint: String::new(),
    }
}

pub fn sample_content() -> GeneratedContent {
    GeneratedContent {
        html_body: "<h2>Welcome</h2><p>Course overview.</p>".into(),
        quiz_spec: None,
    }
}

pub fn sample_quiz_content() -> GeneratedContent {
    GeneratedContent {
        html_body: "<p>Checkpoint quiz.</p>".into(),
        quiz_spec: Some(sample_quiz_spec()),
    }
}

pub fn sample_quiz_spec() -> QuizSpec {
    QuizSpec {
        quiz_description: "<p>Answer all questions.</p>".into(),
        questions: vec![
            sample_question("Q1", "<p>What is 2 + 2?</p>", &["3", "4"], 1),
            sample_question("Q2", "<p>Pick the even number.</p>", &["7", "8"], 1),
            sample_question("Q3", "<p>Pick the prime.</p>", &["5", "6"], 0),
        ],
    }
}

pub fn sample_question(
    name: &str,
    text: &str,
    answers: &[&str],
    correct_index: usize,
) -> QuizQuestion {
    QuizQuestion {
        question_name: name.into(),
        question_text: text.into(),
        answers: answers
            .iter()
            .enumerate()
            .map(|(i, a)| QuizAnswer {
                text: (*a).into(),
                is_correct: i == correct_index,
                feedback: None,
            })
            .collect(),
        shuffle: false,
        feedback: None,
    }
}
