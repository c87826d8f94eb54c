//! In-memory collaborators for testing sessions without a backend.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use careerpath_core::error::{LoadError, ServiceError};
use careerpath_core::model::{AchievementDescriptor, Question};
use careerpath_core::traits::{
    AchievementNotifier, QuestionBank, RecommendationService, RemoteRecommendation,
};

/// A question bank that serves a fixed batch, or a fixed failure.
pub struct MockQuestionBank {
    response: Result<Vec<Question>, LoadError>,
    call_count: AtomicU32,
}

impl MockQuestionBank {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            response: Ok(questions),
            call_count: AtomicU32::new(0),
        }
    }

    pub fn failing(error: LoadError) -> Self {
        Self {
            response: Err(error),
            call_count: AtomicU32::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl QuestionBank for MockQuestionBank {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_questions(&self) -> Result<Vec<Question>, LoadError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.response.clone()
    }
}

/// A recommendation service with a canned response.
pub struct MockRecommendationService {
    response: Result<RemoteRecommendation, ServiceError>,
    call_count: AtomicU32,
    last_answers: Mutex<Option<Vec<String>>>,
}

impl MockRecommendationService {
    pub fn with_response(response: RemoteRecommendation) -> Self {
        Self {
            response: Ok(response),
            call_count: AtomicU32::new(0),
            last_answers: Mutex::new(None),
        }
    }

    /// Fails every call with `error`.
    pub fn failing(error: ServiceError) -> Self {
        Self {
            response: Err(error),
            call_count: AtomicU32::new(0),
            last_answers: Mutex::new(None),
        }
    }

    /// A service that is never reachable, for offline scoring.
    pub fn offline() -> Self {
        Self::failing(ServiceError::Network("offline mode".into()))
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Option ids sent on the most recent call.
    pub fn last_answers(&self) -> Option<Vec<String>> {
        self.last_answers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl RecommendationService for MockRecommendationService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn compute(&self, answers: &[String]) -> Result<RemoteRecommendation, ServiceError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_answers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(answers.to_vec());
        self.response.clone()
    }
}

/// Counts notifications and records who was awarded what.
#[derive(Default)]
pub struct MockNotifier {
    fail: bool,
    call_count: AtomicU32,
    awarded: Mutex<Vec<(String, AchievementDescriptor)>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn awarded(&self) -> Vec<(String, AchievementDescriptor)> {
        self.awarded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl AchievementNotifier for MockNotifier {
    async fn notify(
        &self,
        user_id: &str,
        descriptor: &AchievementDescriptor,
    ) -> Result<(), ServiceError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if self.fail {
            return Err(ServiceError::Status {
                status: 500,
                message: "mock ledger failure".into(),
            });
        }
        self.awarded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((user_id.to_string(), descriptor.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use careerpath_core::model::AptitudeVector;

    #[tokio::test]
    async fn service_records_answers() {
        let service = MockRecommendationService::with_response(RemoteRecommendation {
            aptitude: AptitudeVector::new(1, 0, 0, 0, 0, 0),
            recommendations: None,
            personality_profile: None,
            completed_at: None,
        });

        let remote = service.compute(&["a".to_string()]).await.unwrap();
        assert_eq!(remote.aptitude.r, 1);
        assert_eq!(service.call_count(), 1);
        assert_eq!(service.last_answers(), Some(vec!["a".to_string()]));
    }

    #[tokio::test]
    async fn offline_service_fails_transiently() {
        let service = MockRecommendationService::offline();
        let err = service.compute(&[]).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn notifier_counts_failures_too() {
        let notifier = MockNotifier::failing();
        assert!(notifier
            .notify("u", &AchievementDescriptor::quiz_completed())
            .await
            .is_err());
        assert_eq!(notifier.call_count(), 1);
        assert!(notifier.awarded().is_empty());
    }

    #[tokio::test]
    async fn bank_serves_failure() {
        let bank = MockQuestionBank::failing(LoadError::Empty);
        assert_eq!(bank.fetch_questions().await.unwrap_err(), LoadError::Empty);
        assert_eq!(bank.call_count(), 1);
    }
}
