//! Achievement ledger notifiers.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::instrument;

use careerpath_core::error::ServiceError;
use careerpath_core::model::AchievementDescriptor;
use careerpath_core::traits::AchievementNotifier;

use crate::error::{check_status, request_error};

const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Records achievements via `POST {base_url}/api/achievements/user/{user_id}/add`.
pub struct HttpAchievementNotifier {
    base_url: reqwest::Url,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpAchievementNotifier {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        let base_url = reqwest::Url::parse(base_url)
            .with_context(|| format!("invalid achievements URL: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("achievements URL cannot carry a path: {base_url}");
        }

        Ok(Self {
            base_url,
            timeout_secs,
            client,
        })
    }
}

impl HttpAchievementNotifier {
    /// The user id is pushed as a single escaped path segment.
    fn award_url(&self, user_id: &str) -> Result<reqwest::Url, ServiceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ServiceError::Unknown(format!("bad ledger URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "achievements", "user", user_id, "add"]);
        Ok(url)
    }
}

#[async_trait]
impl AchievementNotifier for HttpAchievementNotifier {
    #[instrument(skip(self, descriptor), fields(achievement = %descriptor.id))]
    async fn notify(
        &self,
        user_id: &str,
        descriptor: &AchievementDescriptor,
    ) -> Result<(), ServiceError> {
        if user_id.trim().is_empty() {
            return Err(ServiceError::Unknown("no user to award".into()));
        }

        let response = self
            .client
            .post(self.award_url(user_id)?)
            .json(descriptor)
            .send()
            .await
            .map_err(|e| request_error(e, self.timeout_secs))?;
        check_status(response).await?;
        Ok(())
    }
}

/// Notifier for deployments without an achievement ledger. Logs and succeeds.
pub struct LogNotifier;

#[async_trait]
impl AchievementNotifier for LogNotifier {
    async fn notify(
        &self,
        user_id: &str,
        descriptor: &AchievementDescriptor,
    ) -> Result<(), ServiceError> {
        tracing::info!(
            user = user_id,
            points = descriptor.points,
            "achievement unlocked: {}",
            descriptor.title
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn posts_descriptor_for_user() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/achievements/user/student-7/add"))
            .and(body_json(serde_json::json!({
                "id": "complete-career-quiz",
                "title": "Career Quiz Completed",
                "description": "Completed the career quiz and received recommendations",
                "icon": "\u{1f393}",
                "points": 50
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = HttpAchievementNotifier::new(&server.uri()).unwrap();
        notifier
            .notify("student-7", &AchievementDescriptor::quiz_completed())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn user_id_is_a_single_escaped_segment() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/achievements/user/a%2Fb%3Fc%23d/add"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = HttpAchievementNotifier::new(&format!("{}/", server.uri())).unwrap();
        notifier
            .notify("a/b?c#d", &AchievementDescriptor::quiz_completed())
            .await
            .unwrap();
    }

    #[test]
    fn award_url_keeps_base_path() {
        let notifier = HttpAchievementNotifier::new("http://ledger.local/v2/").unwrap();
        assert_eq!(
            notifier.award_url("student-7").unwrap().as_str(),
            "http://ledger.local/v2/api/achievements/user/student-7/add"
        );
    }

    #[test]
    fn rejects_unparseable_base_url() {
        assert!(HttpAchievementNotifier::new("not a url").is_err());
    }

    #[tokio::test]
    async fn ledger_failure_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = HttpAchievementNotifier::new(&server.uri()).unwrap();
        let err = notifier
            .notify("student-7", &AchievementDescriptor::quiz_completed())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ServiceError::Status {
                status: 503,
                message: "maintenance".into(),
            }
        );
    }

    #[tokio::test]
    async fn blank_user_is_rejected_without_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let notifier = HttpAchievementNotifier::new(&server.uri()).unwrap();
        assert!(notifier
            .notify("  ", &AchievementDescriptor::quiz_completed())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn log_notifier_always_succeeds() {
        LogNotifier
            .notify("anyone", &AchievementDescriptor::quiz_completed())
            .await
            .unwrap();
    }
}
