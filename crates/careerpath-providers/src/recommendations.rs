//! HTTP recommendation service: `POST {base_url}/api/career-recommendations`.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use careerpath_core::error::ServiceError;
use careerpath_core::model::{AptitudeVector, CareerRecommendation, PersonalityProfile};
use careerpath_core::traits::{RecommendationService, RemoteRecommendation};

use crate::error::{check_status, read_json, request_error};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Remote scorer exposed by the careerpath backend.
pub struct HttpRecommendationService {
    base_url: String,
    api_key: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpRecommendationService {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self> {
        Self::with_timeout(base_url, api_key, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(
        base_url: &str,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            timeout_secs,
            client,
        })
    }
}

#[derive(Serialize)]
struct RecommendationRequest<'a> {
    answers: &'a [String],
}

#[derive(Deserialize)]
struct RecommendationResponse {
    #[serde(default)]
    aptitude: Option<AptitudeVector>,
    /// Career names only; the detailed list carries everything we need.
    #[serde(default)]
    recommendations: Vec<String>,
    #[serde(default)]
    detailed_recommendations: Option<Vec<CareerRecommendation>>,
    #[serde(default)]
    personality_profile: Option<PersonalityProfile>,
    #[serde(default)]
    quiz_completed_at: Option<DateTime<Utc>>,
}

impl RecommendationResponse {
    fn into_remote(self) -> Result<RemoteRecommendation, ServiceError> {
        let aptitude = self
            .aptitude
            .ok_or_else(|| ServiceError::Malformed("response has no aptitude".into()))?;

        if let Some(list) = &self.detailed_recommendations {
            if let Some(bad) = list.iter().find(|r| !valid_percentage(r.match_percentage)) {
                return Err(ServiceError::Malformed(format!(
                    "match percentage {} for {} is outside [0, 100]",
                    bad.match_percentage, bad.career
                )));
            }
        }

        if let Some(profile) = &self.personality_profile {
            if let Some((dimension, bad)) =
                profile.iter().find(|(_, e)| !valid_percentage(e.percentage))
            {
                return Err(ServiceError::Malformed(format!(
                    "personality percentage {} for {} is outside [0, 100]",
                    bad.percentage, dimension
                )));
            }
        }

        if self.detailed_recommendations.is_none() && !self.recommendations.is_empty() {
            tracing::debug!(
                "response lists {} careers without details, deriving locally",
                self.recommendations.len()
            );
        }

        Ok(RemoteRecommendation {
            aptitude,
            recommendations: self.detailed_recommendations,
            personality_profile: self.personality_profile,
            completed_at: self.quiz_completed_at,
        })
    }
}

fn valid_percentage(value: f64) -> bool {
    value.is_finite() && (0.0..=100.0).contains(&value)
}

#[async_trait]
impl RecommendationService for HttpRecommendationService {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, answers), fields(answers = answers.len()))]
    async fn compute(&self, answers: &[String]) -> Result<RemoteRecommendation, ServiceError> {
        let start = Instant::now();

        let mut request = self
            .client
            .post(format!("{}/api/career-recommendations", self.base_url))
            .json(&RecommendationRequest { answers });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| request_error(e, self.timeout_secs))?;
        let response = check_status(response).await?;
        let body: RecommendationResponse = read_json(response).await?;
        let remote = body.into_remote()?;

        tracing::debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            "remote aptitude {}",
            remote.aptitude
        );
        Ok(remote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use careerpath_core::model::Dimension;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn answers() -> Vec<String> {
        vec!["r1_a".into(), "i1_b".into()]
    }

    #[tokio::test]
    async fn parses_full_response() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "recommendations": ["Mechanical Engineer"],
            "detailed_recommendations": [{
                "career": "Mechanical Engineer",
                "riasecType": "R",
                "typeName": "Realistic (Doers)",
                "description": "Practical, hands-on problem solvers",
                "score": 8,
                "matchPercentage": 100
            }],
            "aptitude": {"R": 8, "I": 2, "A": 0, "S": 0, "E": 0, "C": 1},
            "personality_profile": {
                "R": {"score": 8, "percentage": 72.7, "name": "Realistic", "description": "Hands-on"}
            },
            "quiz_completed_at": "2025-01-15T10:30:00.000Z"
        });

        Mock::given(method("POST"))
            .and(path("/api/career-recommendations"))
            .and(body_json(serde_json::json!({"answers": ["r1_a", "i1_b"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .expect(1)
            .mount(&server)
            .await;

        let service = HttpRecommendationService::new(&server.uri(), None).unwrap();
        let remote = service.compute(&answers()).await.unwrap();

        assert_eq!(remote.aptitude, AptitudeVector::new(8, 2, 0, 0, 0, 1));
        let recs = remote.recommendations.unwrap();
        assert_eq!(recs[0].type_name, "Realistic (Doers)");
        assert_eq!(recs[0].match_percentage, 100.0);
        let profile = remote.personality_profile.unwrap();
        assert_eq!(profile.get(Dimension::Realistic).unwrap().percentage, 72.7);
        assert!(remote.completed_at.is_some());
    }

    #[tokio::test]
    async fn sends_bearer_token_when_configured() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/career-recommendations"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"aptitude": {"I": 3}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let service =
            HttpRecommendationService::new(&server.uri(), Some("sk-test".into())).unwrap();
        let remote = service.compute(&answers()).await.unwrap();
        assert_eq!(remote.aptitude, AptitudeVector::new(0, 3, 0, 0, 0, 0));
        assert!(remote.recommendations.is_none());
        assert!(remote.personality_profile.is_none());
    }

    #[tokio::test]
    async fn server_error_maps_to_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/career-recommendations"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({"error": "Failed to get recommendations"})),
            )
            .mount(&server)
            .await;

        let service = HttpRecommendationService::new(&server.uri(), None).unwrap();
        let err = service.compute(&answers()).await.unwrap_err();
        assert_eq!(
            err,
            ServiceError::Status {
                status: 500,
                message: "Failed to get recommendations".into(),
            }
        );
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn missing_aptitude_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/career-recommendations"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"recommendations": ["Teacher"]})),
            )
            .mount(&server)
            .await;

        let service = HttpRecommendationService::new(&server.uri(), None).unwrap();
        let err = service.compute(&answers()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Malformed(_)));
    }

    #[tokio::test]
    async fn out_of_range_match_is_malformed() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "aptitude": {"R": 1},
            "detailed_recommendations": [{
                "career": "Pilot",
                "typeName": "Realistic (Doers)",
                "matchPercentage": 140.0
            }]
        });
        Mock::given(method("POST"))
            .and(path("/api/career-recommendations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let service = HttpRecommendationService::new(&server.uri(), None).unwrap();
        let err = service.compute(&answers()).await.unwrap_err();
        assert!(err.to_string().contains("outside [0, 100]"));
    }

    #[tokio::test]
    async fn out_of_range_profile_share_is_malformed() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "aptitude": {"R": 1, "I": 9},
            "personality_profile": {
                "R": {"score": 1, "percentage": 250.0, "name": "Realistic"}
            }
        });
        Mock::given(method("POST"))
            .and(path("/api/career-recommendations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .expect(1)
            .mount(&server)
            .await;

        let service = HttpRecommendationService::new(&server.uri(), None).unwrap();
        let err = service.compute(&answers()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Malformed(_)));
        assert!(err.to_string().contains("personality percentage 250"));
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/career-recommendations"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"aptitude": {}}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let service = HttpRecommendationService::with_timeout(&server.uri(), None, 1).unwrap();
        let err = service.compute(&answers()).await.unwrap_err();
        assert_eq!(err, ServiceError::Timeout(1));
    }
}
