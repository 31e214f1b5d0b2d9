use std::time::Duration;

const KB_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_SNIPPET_LEN: usize = 8_000;

/// Fetches one knowledge-base file from a GitHub raw-content branch. Returns
/// None (with a warning) on any failure; a missing snippet never blocks a run.
pub async fn fetch_repo_text(
    http: &reqwest::Client,
    owner: &str,
    repo: &str,
    branch: &str,
    path: &str,
) -> Option<String> {
    let url = format!("https://raw.githubusercontent.com/{owner}/{repo}/{branch}/{path}");
    let response = match http.get(&url).timeout(KB_FETCH_TIMEOUT).send().await {
        Ok(r) => r,
        Err(err) => {
            log::warn!("KB fetch error for {}: {}", path, err);
            return None;
        }
    };
    if !response.status().is_success() {
        log::warn!("KB fetch failed ({}) for {}", response.status(), path);
        return None;
    }
    response.text().await.ok()
}

/// Loads the configured KB paths, truncating very large files to keep the
/// prompt lean.
pub async fn load_kb_snippets(
    http: &reqwest::Client,
    owner: &str,
    repo: &str,
    branch: &str,
    paths: &[String],
) -> Vec<String> {
    let mut snippets = Vec::new();
    for path in paths {
        let path = path.trim();
        if path.is_empty() {
            continue;
        }
        if let Some(text) = fetch_repo_text(http, owner, repo, branch, path).await {
            snippets.push(truncate_snippet(text));
        }
    }
    snippets
}

fn truncate_snippet(text: String) -> String {
    if text.chars().count() <= MAX_SNIPPET_LEN {
        return text;
    }
    let mut truncated: String = text.chars().take(MAX_SNIPPET_LEN).collect();
    truncated.push_str("\n<!-- [truncated] -->");
    truncated
}
