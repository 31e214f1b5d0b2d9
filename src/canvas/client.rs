use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};

use crate::canvas::api::{CanvasApi, RemoteModule};
use crate::errors::{PipelineError, PipelineResult};
use crate::models::publish::ContentHandle;

const LIST_TIMEOUT: Duration = Duration::from_secs(60);
const CREATE_TIMEOUT: Duration = Duration::from_secs(120);

/// reqwest-backed Canvas client. Bearer-authenticated; every call carries a
/// bounded timeout. Quiz creation paths are the slowest and get the longer
/// budget.
pub struct HttpCanvasClient {
    http: reqwest::Client,
    base_url: String,
    course_id: String,
    token: SecretString,
}

impl HttpCanvasClient {
    pub fn new(
        domain: &str,
        course_id: impl Into<String>,
        token: SecretString,
    ) -> PipelineResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(CREATE_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: format!("https://{}", normalize_domain(domain)),
            course_id: course_id.into(),
            token,
        })
    }

    fn course_url(&self, path: &str) -> String {
        format!("{}/api/v1/courses/{}/{}", self.base_url, self.course_id, path)
    }

    fn new_quiz_url(&self, path: &str) -> String {
        format!(
            "{}/api/quiz/v1/courses/{}/{}",
            self.base_url, self.course_id, path
        )
    }

    async fn get_json(&self, url: &str, timeout: Duration) -> PipelineResult<Value> {
        let response = self
            .http
            .get(url)
            .bearer_auth(self.token.expose_secret())
            .timeout(timeout)
            .send()
            .await?;
        Self::into_json(response).await
    }

    async fn post_json(&self, url: &str, payload: &Value) -> PipelineResult<Value> {
        let response = self
            .http
            .post(url)
            .bearer_auth(self.token.expose_secret())
            .json(payload)
            .send()
            .await?;
        Self::into_json(response).await
    }

    async fn patch_json(&self, url: &str, payload: &Value) -> PipelineResult<Value> {
        let response = self
            .http
            .patch(url)
            .bearer_auth(self.token.expose_secret())
            .json(payload)
            .send()
            .await?;
        Self::into_json(response).await
    }

    /// Non-2xx responses surface the raw status and body for diagnostics.
    async fn into_json(response: reqwest::Response) -> PipelineResult<Value> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(PipelineError::RemoteStatus {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body)
            .map_err(|err| PipelineError::Transport(format!("invalid JSON from Canvas: {}", err)))
    }

    fn require_id(value: &Value, field: &str, context: &str) -> PipelineResult<i64> {
        value[field].as_i64().ok_or_else(|| {
            PipelineError::Transport(format!("{} response missing numeric '{}'", context, field))
        })
    }
}

pub(crate) fn normalize_domain(domain: &str) -> String {
    domain
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_matches('/')
        .to_string()
}

#[async_trait]
impl CanvasApi for HttpCanvasClient {
    async fn list_modules(&self) -> PipelineResult<Vec<RemoteModule>> {
        let value = self
            .get_json(&self.course_url("modules"), LIST_TIMEOUT)
            .await?;
        let modules = value
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|m| {
                        Some(RemoteModule {
                            id: m["id"].as_i64()?,
                            name: m["name"].as_str()?.to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(modules)
    }

    async fn create_module(&self, name: &str) -> PipelineResult<i64> {
        let payload = json!({"module": {"name": name, "published": true}});
        let value = self.post_json(&self.course_url("modules"), &payload).await?;
        Self::require_id(&value, "id", "module create")
    }

    async fn create_page(&self, title: &str, body: &str) -> PipelineResult<String> {
        let payload = json!({"wiki_page": {"title": title, "body": body, "published": true}});
        let value = self.post_json(&self.course_url("pages"), &payload).await?;
        value["url"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| PipelineError::Transport("page create response missing 'url'".into()))
    }

    async fn create_assignment(
        &self,
        title: &str,
        body: &str,
        points: f64,
        submission_type: &str,
    ) -> PipelineResult<i64> {
        let payload = json!({
            "assignment": {
                "name": title,
                "description": body,
                "points_possible": points,
                "submission_types": [submission_type],
                "published": true,
            }
        });
        let value = self
            .post_json(&self.course_url("assignments"), &payload)
            .await?;
        Self::require_id(&value, "id", "assignment create")
    }

    async fn create_discussion(&self, title: &str, body: &str) -> PipelineResult<i64> {
        let payload = json!({"title": title, "message": body, "published": true});
        let value = self
            .post_json(&self.course_url("discussion_topics"), &payload)
            .await?;
        Self::require_id(&value, "id", "discussion create")
    }

    async fn create_module_item(
        &self,
        module_id: i64,
        title: &str,
        handle: &ContentHandle,
    ) -> PipelineResult<()> {
        let mut item = json!({
            "title": title,
            "type": handle.module_item_type(),
            "published": true,
        });
        match handle.page_slug() {
            Some(slug) => item["page_url"] = json!(slug),
            None => item["content_id"] = json!(handle.content_id()),
        }
        self.post_json(
            &self.course_url(&format!("modules/{}/items", module_id)),
            &json!({"module_item": item}),
        )
        .await?;
        Ok(())
    }

    async fn create_classic_quiz(&self, title: &str, description: &str) -> PipelineResult<i64> {
        let payload = json!({
            "quiz": {
                "title": title,
                "description": description,
                "quiz_type": "assignment",
                "published": true,
            }
        });
        let value = self.post_json(&self.course_url("quizzes"), &payload).await?;
        Self::require_id(&value, "id", "classic quiz create")
    }

    async fn create_classic_question(
        &self,
        quiz_id: i64,
        payload: &Value,
    ) -> PipelineResult<()> {
        self.post_json(
            &self.course_url(&format!("quizzes/{}/questions", quiz_id)),
            payload,
        )
        .await?;
        Ok(())
    }

    async fn create_new_quiz(&self, title: &str, instructions: &str) -> PipelineResult<i64> {
        let payload = json!({
            "quiz": {
                "title": title,
                "points_possible": 1,
                "instructions": instructions,
            }
        });
        let value = self.post_json(&self.new_quiz_url("quizzes"), &payload).await?;
        // The externally usable handle is the assignment id; some instances
        // only return "id".
        value["assignment_id"]
            .as_i64()
            .or_else(|| value["id"].as_i64())
            .ok_or_else(|| {
                PipelineError::Transport("new quiz create response missing assignment id".into())
            })
    }

    async fn create_new_quiz_item(
        &self,
        assignment_id: i64,
        payload: &Value,
    ) -> PipelineResult<()> {
        self.post_json(
            &self.new_quiz_url(&format!("quizzes/{}/items", assignment_id)),
            payload,
        )
        .await?;
        Ok(())
    }

    async fn clone_new_quiz(&self, template_assignment_id: i64) -> PipelineResult<Option<i64>> {
        let url = self.new_quiz_url(&format!("quizzes/{}/clone", template_assignment_id));
        match self.post_json(&url, &json!({})).await {
            Ok(value) => Ok(value["assignment_id"].as_i64().or_else(|| value["id"].as_i64())),
            // Instances without the clone endpoint answer 404; treat any
            // remote rejection as "unsupported" and let the caller fall back.
            Err(PipelineError::RemoteStatus { status, .. }) => {
                log::warn!(
                    "New Quiz clone unsupported for template {} (status {})",
                    template_assignment_id,
                    status
                );
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    async fn update_new_quiz(
        &self,
        assignment_id: i64,
        title: &str,
        instructions: &str,
    ) -> PipelineResult<()> {
        let payload = json!({"quiz": {"title": title, "instructions": instructions}});
        self.patch_json(
            &self.new_quiz_url(&format!("quizzes/{}", assignment_id)),
            &payload,
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_domain_strips_scheme_and_slashes() {
        assert_eq!(
            normalize_domain("https://canvas.instructure.com/"),
            "canvas.instructure.com"
        );
        assert_eq!(
            normalize_domain("http://canvas.test.edu"),
            "canvas.test.edu"
        );
        assert_eq!(normalize_domain("  canvas.test.edu "), "canvas.test.edu");
    }

    #[test]
    fn urls_target_both_api_generations() {
        let client = HttpCanvasClient::new(
            "canvas.test.edu",
            "101",
            SecretString::from("token".to_string()),
        )
        .expect("client should build");

        assert_eq!(
            client.course_url("pages"),
            "https://canvas.test.edu/api/v1/courses/101/pages"
        );
        assert_eq!(
            client.new_quiz_url("quizzes/7/items"),
            "https://canvas.test.edu/api/quiz/v1/courses/101/quizzes/7/items"
        );
    }
}
