//! Collaborator traits for the quiz session.
//!
//! The engine talks to the outside world through these three seams. HTTP
//! implementations live in `careerpath-providers`; a file-backed question
//! bank lives in [`crate::parser`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LoadError, ServiceError};
use crate::model::{
    AchievementDescriptor, AptitudeVector, CareerRecommendation, PersonalityProfile, Question,
};

// ---------------------------------------------------------------------------
// Question bank
// ---------------------------------------------------------------------------

/// Supplies the ordered, read-only question sequence for a quiz attempt.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// Human-readable backend name (e.g. "http").
    fn name(&self) -> &str;

    /// Fetch every question, in presentation order.
    async fn fetch_questions(&self) -> Result<Vec<Question>, LoadError>;
}

// ---------------------------------------------------------------------------
// Remote recommendation service
// ---------------------------------------------------------------------------

/// Stateless service that scores a completed attempt remotely.
#[async_trait]
pub trait RecommendationService: Send + Sync {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// Score the selected option ids, in question order.
    async fn compute(&self, answers: &[String]) -> Result<RemoteRecommendation, ServiceError>;
}

/// What the remote service returned for an attempt.
///
/// Only `aptitude` is mandatory; the session derives any missing piece
/// locally from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRecommendation {
    pub aptitude: AptitudeVector,
    #[serde(default)]
    pub recommendations: Option<Vec<CareerRecommendation>>,
    #[serde(default)]
    pub personality_profile: Option<PersonalityProfile>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Achievement ledger
// ---------------------------------------------------------------------------

/// Receives the completion event for a quiz attempt.
#[async_trait]
pub trait AchievementNotifier: Send + Sync {
    /// Record an achievement for a user. Callers never retry.
    async fn notify(
        &self,
        user_id: &str,
        descriptor: &AchievementDescriptor,
    ) -> Result<(), ServiceError>;
}
