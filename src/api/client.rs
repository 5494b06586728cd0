use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

use super::types::*;

#[derive(Clone)]
pub struct CodeJudgeClient {
    client: Client,
    base_url: String,
    token: Option<Arc<str>>,
}

impl CodeJudgeClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Exchanges credentials for a bearer token used by every later request.
    pub async fn login(&mut self, account: &str, password: &str) -> Result<()> {
        let resp = self
            .client
            .post(self.url("/api/v2/User/Login"))
            .json(&json!({ "account": account, "password": password }))
            .send()
            .await
            .context("Failed to send login request")?
            .error_for_status()
            .context("Login rejected")?;

        let body = resp.text().await.context("Failed to read login response")?;
        let token = body.trim().trim_matches('"');
        if token.is_empty() {
            anyhow::bail!("Login response did not contain a token");
        }

        debug!(account, "logged in");
        self.token = Some(Arc::from(token));
        Ok(())
    }

    pub async fn groups(&self) -> Result<Vec<Group>> {
        self.post("/api/v2/User/Groups", None)
            .await
            .context("Failed to fetch groups")
    }

    pub async fn exercises(&self, group_id: i64) -> Result<Vec<Exercise>> {
        self.post(
            "/api/v2/Group/Exercise/List",
            Some(json!({ "GroupId": group_id })),
        )
        .await
        .context("Failed to fetch exercises")
    }

    pub async fn problem_set(&self, group_id: i64, problem_set_id: i64) -> Result<ProblemSet> {
        let activity: Activity = self
            .post(
                "/api/v2/Group/Exercise/Problems",
                Some(json!({
                    "ActivityId": null,
                    "GroupId": group_id,
                    "ProblemSetId": problem_set_id,
                })),
            )
            .await
            .with_context(|| format!("Failed to fetch problem set {problem_set_id}"))?;
        Ok(activity.problem_set)
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: Option<Value>) -> Result<T> {
        let token = self.token.as_deref().context("Not logged in")?;

        let mut req = self.client.post(self.url(path)).bearer_auth(token);
        if let Some(body) = body {
            req = req.json(&body);
        }

        let resp = req
            .send()
            .await
            .with_context(|| format!("Failed to send request to {path}"))?
            .error_for_status()?;

        resp.json()
            .await
            .with_context(|| format!("Failed to parse response from {path}"))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let client = CodeJudgeClient::new("https://example.test/").unwrap();
        assert_eq!(
            client.url("/api/v2/User/Groups"),
            "https://example.test/api/v2/User/Groups"
        );
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn requests_without_token_fail_fast() {
        let client = CodeJudgeClient::new("http://127.0.0.1:9").unwrap();
        let err = client.groups().await.unwrap_err();
        assert!(format!("{err:#}").contains("Not logged in"));
    }
}
