//! HTTP question bank: `GET {base_url}/api/career-questions`.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use careerpath_core::error::LoadError;
use careerpath_core::model::Question;
use careerpath_core::traits::QuestionBank;

use crate::error::{check_status, read_json, request_error};

const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Question bank served by the careerpath backend.
pub struct HttpQuestionBank {
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpQuestionBank {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
            client,
        })
    }
}

#[derive(Deserialize)]
struct QuestionsResponse {
    questions: Vec<Question>,
}

#[async_trait]
impl QuestionBank for HttpQuestionBank {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_questions(&self) -> Result<Vec<Question>, LoadError> {
        let response = self
            .client
            .get(format!("{}/api/career-questions", self.base_url))
            .send()
            .await
            .map_err(|e| LoadError::Fetch(request_error(e, self.timeout_secs)))?;
        let response = check_status(response).await.map_err(LoadError::Fetch)?;

        let body: QuestionsResponse = read_json(response).await.map_err(|e| LoadError::Parse {
            origin: self.base_url.clone(),
            message: e.to_string(),
        })?;
        tracing::debug!("fetched {} questions", body.questions.len());
        Ok(body.questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use careerpath_core::error::ServiceError;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetches_questions() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "questions": [{
                "id": "r1",
                "text": "I enjoy working with tools and machines",
                "category": "psychometric",
                "options": [
                    {"id": "r1_a", "text": "Strongly Agree", "scores": {"R": 5, "C": 1}},
                    {"id": "r1_b", "text": "Disagree", "scores": {}}
                ]
            }],
            "model_info": {"total_questions": 1}
        });

        Mock::given(method("GET"))
            .and(path("/api/career-questions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .expect(1)
            .mount(&server)
            .await;

        let bank = HttpQuestionBank::new(&server.uri()).unwrap();
        let questions = bank.fetch_questions().await.unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].options[0].scores.r, 5);
        assert_eq!(questions[0].options[0].scores.c, 1);
        assert!(questions[0].options[1].scores.is_zero());
    }

    #[tokio::test]
    async fn server_error_is_fetch_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/career-questions"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({"error": "Failed to get questions"})),
            )
            .mount(&server)
            .await;

        let bank = HttpQuestionBank::new(&server.uri()).unwrap();
        let err = bank.fetch_questions().await.unwrap_err();
        assert_eq!(
            err,
            LoadError::Fetch(ServiceError::Status {
                status: 500,
                message: "Failed to get questions".into(),
            })
        );
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn garbage_body_is_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/career-questions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let bank = HttpQuestionBank::new(&server.uri()).unwrap();
        let err = bank.fetch_questions().await.unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        // Nothing listens on port 9 on the loopback interface
        let bank = HttpQuestionBank::with_timeout("http://127.0.0.1:9", 2).unwrap();
        let err = bank.fetch_questions().await.unwrap_err();
        assert!(matches!(err, LoadError::Fetch(_)));
    }
}
