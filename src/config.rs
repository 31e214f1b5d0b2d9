use std::env;

use secrecy::SecretString;

use crate::canvas::publisher::{DEFAULT_ASSIGNMENT_POINTS, DEFAULT_SUBMISSION_TYPE};
use crate::canvas::QuizEngineKind;

#[derive(Clone, Debug)]
pub struct Config {
    pub canvas_domain: String,
    pub canvas_course_id: String,
    pub canvas_token: SecretString,
    pub openai_api_key: SecretString,
    pub openai_model: String,
    pub quiz_engine: QuizEngineKind,
    pub new_quiz_template_id: Option<i64>,
    pub assignment_points: f64,
    pub submission_type: String,
    pub kb_owner: String,
    pub kb_repo: String,
    pub kb_branch: String,
    pub kb_paths: Vec<String>,
    pub dry_run: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            canvas_domain: env::var("CANVAS_DOMAIN")
                .unwrap_or_else(|_| "canvas.instructure.com".to_string()),
            canvas_course_id: env::var("CANVAS_COURSE_ID").unwrap_or_default(),
            canvas_token: SecretString::from(env::var("CANVAS_TOKEN").unwrap_or_default()),
            openai_api_key: SecretString::from(env::var("OPENAI_API_KEY").unwrap_or_default()),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            quiz_engine: QuizEngineKind::parse(
                &env::var("QUIZ_ENGINE").unwrap_or_else(|_| "new".to_string()),
            ),
            new_quiz_template_id: env::var("NEW_QUIZ_TEMPLATE_ID")
                .ok()
                .and_then(|v| v.parse().ok()),
            assignment_points: env::var("ASSIGNMENT_POINTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_ASSIGNMENT_POINTS),
            submission_type: env::var("ASSIGNMENT_SUBMISSION_TYPE")
                .unwrap_or_else(|_| DEFAULT_SUBMISSION_TYPE.to_string()),
            kb_owner: env::var("KB_OWNER").unwrap_or_default(),
            kb_repo: env::var("KB_REPO").unwrap_or_default(),
            kb_branch: env::var("KB_BRANCH").unwrap_or_else(|_| "main".to_string()),
            kb_paths: env::var("KB_PATHS")
                .map(|v| v.split(',').map(|p| p.trim().to_string()).collect())
                .unwrap_or_default(),
            dry_run: env::var("DRY_RUN")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }

    /// Validate that upload-critical configuration is set
    /// Panics if required credentials are missing
    pub fn validate_for_upload(&self) {
        use secrecy::ExposeSecret;

        if self.canvas_course_id.is_empty() {
            panic!("FATAL: CANVAS_COURSE_ID is not set! Set it to the target course id.");
        }

        if self.canvas_token.expose_secret().is_empty() {
            panic!("FATAL: CANVAS_TOKEN is not set! Generate an access token in Canvas and set CANVAS_TOKEN.");
        }

        if self.openai_api_key.expose_secret().is_empty() {
            panic!("FATAL: OPENAI_API_KEY is not set! Set OPENAI_API_KEY environment variable.");
        }
    }

    pub fn kb_configured(&self) -> bool {
        !self.kb_owner.is_empty() && !self.kb_repo.is_empty() && !self.kb_paths.is_empty()
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            canvas_domain: "canvas.test.edu".to_string(),
            canvas_course_id: "101".to_string(),
            canvas_token: SecretString::from("test_canvas_token".to_string()),
            openai_api_key: SecretString::from("test_openai_key".to_string()),
            openai_model: "gpt-4o".to_string(),
            quiz_engine: QuizEngineKind::Classic,
            new_quiz_template_id: None,
            assignment_points: DEFAULT_ASSIGNMENT_POINTS,
            submission_type: DEFAULT_SUBMISSION_TYPE.to_string(),
            kb_owner: String::new(),
            kb_repo: String::new(),
            kb_branch: "main".to_string(),
            kb_paths: Vec::new(),
            dry_run: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env_with_defaults() {
        let config = Config::from_env();

        // Should use env vars if set, or fall back to defaults
        assert!(!config.canvas_domain.is_empty());
        assert!(!config.openai_model.is_empty());
        assert!(!config.submission_type.is_empty());
    }

    #[test]
    fn test_test_config() {
        let config = Config::test_config();

        assert_eq!(config.canvas_course_id, "101");
        assert_eq!(config.quiz_engine, QuizEngineKind::Classic);
        assert!(config.dry_run);
        assert!(!config.kb_configured());
    }
}
