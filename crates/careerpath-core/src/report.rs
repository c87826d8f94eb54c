//! Quiz results with JSON persistence.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matcher::{dominant_dimensions, DOMINANT_COUNT};
use crate::model::{Answer, AptitudeVector, CareerRecommendation, Dimension, PersonalityProfile};

/// Where a result's recommendations were computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    /// The remote recommendation service answered.
    Remote,
    /// The remote call failed and the local matcher was used.
    Fallback,
}

impl fmt::Display for ResultSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultSource::Remote => write!(f, "remote"),
            ResultSource::Fallback => write!(f, "fallback"),
        }
    }
}

/// The terminal artifact of a completed quiz attempt. An immutable snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    /// Unique attempt identifier.
    pub id: Uuid,
    /// One answer per question, in presentation order.
    pub answers: Vec<Answer>,
    /// When the attempt completed.
    pub timestamp: DateTime<Utc>,
    /// Careers ranked by match percentage, highest first.
    pub recommendations: Vec<CareerRecommendation>,
    pub aptitude: AptitudeVector,
    pub personality_profile: PersonalityProfile,
    pub source: ResultSource,
}

impl QuizResult {
    /// The first `n` recommendations.
    pub fn top_recommendations(&self, n: usize) -> &[CareerRecommendation] {
        &self.recommendations[..n.min(self.recommendations.len())]
    }

    /// The three highest-scoring dimensions.
    pub fn dominant_dimensions(&self) -> Vec<Dimension> {
        dominant_dimensions(&self.aptitude, DOMINANT_COUNT)
    }

    /// Save the result as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize result")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write result to {}", path.display()))?;
        Ok(())
    }

    /// Load a result from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read result from {}", path.display()))?;
        let result: QuizResult =
            serde_json::from_str(&content).context("failed to parse result JSON")?;
        Ok(result)
    }
}
