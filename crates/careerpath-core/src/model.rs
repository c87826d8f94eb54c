//! Core data model types for careerpath.
//!
//! These are the fundamental types the assessment engine works with:
//! RIASEC dimensions, questions and their weighted options, committed
//! answers, aptitude vectors, and the career/personality outputs.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One of Holland's six interest dimensions.
///
/// The declaration order is the canonical order (R, I, A, S, E, C) and is
/// what `Ord` uses, so every tie-break built on it is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    Realistic,
    Investigative,
    Artistic,
    Social,
    Enterprising,
    Conventional,
}

impl Dimension {
    /// All six dimensions in canonical order.
    pub const ALL: [Dimension; 6] = [
        Dimension::Realistic,
        Dimension::Investigative,
        Dimension::Artistic,
        Dimension::Social,
        Dimension::Enterprising,
        Dimension::Conventional,
    ];

    /// Single-letter code used on the wire ("R", "I", ...).
    pub fn letter(self) -> &'static str {
        match self {
            Dimension::Realistic => "R",
            Dimension::Investigative => "I",
            Dimension::Artistic => "A",
            Dimension::Social => "S",
            Dimension::Enterprising => "E",
            Dimension::Conventional => "C",
        }
    }

    /// Full dimension name.
    pub fn name(self) -> &'static str {
        match self {
            Dimension::Realistic => "Realistic",
            Dimension::Investigative => "Investigative",
            Dimension::Artistic => "Artistic",
            Dimension::Social => "Social",
            Dimension::Enterprising => "Enterprising",
            Dimension::Conventional => "Conventional",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "r" | "realistic" => Ok(Dimension::Realistic),
            "i" | "investigative" => Ok(Dimension::Investigative),
            "a" | "artistic" => Ok(Dimension::Artistic),
            "s" | "social" => Ok(Dimension::Social),
            "e" | "enterprising" => Ok(Dimension::Enterprising),
            "c" | "conventional" => Ok(Dimension::Conventional),
            other => Err(format!("unknown RIASEC dimension: {other}")),
        }
    }
}

// Serialized as the bare letter so dimensions work as map keys in both
// JSON and TOML documents.
impl Serialize for Dimension {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.letter())
    }
}

impl<'de> Deserialize<'de> for Dimension {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

/// Per-dimension integer weights attached to an answer option.
///
/// Weights may be zero or negative. Missing dimensions default to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreWeights {
    #[serde(rename = "R", default)]
    pub r: i32,
    #[serde(rename = "I", default)]
    pub i: i32,
    #[serde(rename = "A", default)]
    pub a: i32,
    #[serde(rename = "S", default)]
    pub s: i32,
    #[serde(rename = "E", default)]
    pub e: i32,
    #[serde(rename = "C", default)]
    pub c: i32,
}

impl ScoreWeights {
    pub fn new(r: i32, i: i32, a: i32, s: i32, e: i32, c: i32) -> Self {
        Self { r, i, a, s, e, c }
    }

    pub fn get(&self, dimension: Dimension) -> i32 {
        match dimension {
            Dimension::Realistic => self.r,
            Dimension::Investigative => self.i,
            Dimension::Artistic => self.a,
            Dimension::Social => self.s,
            Dimension::Enterprising => self.e,
            Dimension::Conventional => self.c,
        }
    }

    pub fn is_zero(&self) -> bool {
        Dimension::ALL.iter().all(|&d| self.get(d) == 0)
    }
}

/// Six-dimensional aggregate score. Every component is non-negative and the
/// zero vector is the identity for aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AptitudeVector {
    #[serde(rename = "R", default)]
    pub r: u32,
    #[serde(rename = "I", default)]
    pub i: u32,
    #[serde(rename = "A", default)]
    pub a: u32,
    #[serde(rename = "S", default)]
    pub s: u32,
    #[serde(rename = "E", default)]
    pub e: u32,
    #[serde(rename = "C", default)]
    pub c: u32,
}

impl AptitudeVector {
    pub const ZERO: AptitudeVector = AptitudeVector {
        r: 0,
        i: 0,
        a: 0,
        s: 0,
        e: 0,
        c: 0,
    };

    pub fn new(r: u32, i: u32, a: u32, s: u32, e: u32, c: u32) -> Self {
        Self { r, i, a, s, e, c }
    }

    pub fn get(&self, dimension: Dimension) -> u32 {
        self.as_array()[dimension.index()]
    }

    pub fn set(&mut self, dimension: Dimension, value: u32) {
        let slot = match dimension {
            Dimension::Realistic => &mut self.r,
            Dimension::Investigative => &mut self.i,
            Dimension::Artistic => &mut self.a,
            Dimension::Social => &mut self.s,
            Dimension::Enterprising => &mut self.e,
            Dimension::Conventional => &mut self.c,
        };
        *slot = value;
    }

    /// Components in canonical order.
    pub fn as_array(&self) -> [u32; 6] {
        [self.r, self.i, self.a, self.s, self.e, self.c]
    }

    /// `(dimension, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, u32)> + '_ {
        Dimension::ALL.iter().map(move |&d| (d, self.get(d)))
    }

    /// Sum of all six components.
    pub fn total(&self) -> u64 {
        self.as_array().iter().map(|&v| u64::from(v)).sum()
    }

    pub fn is_zero(&self) -> bool {
        self.total() == 0
    }

    pub fn dot(&self, other: &AptitudeVector) -> f64 {
        self.as_array()
            .iter()
            .zip(other.as_array().iter())
            .map(|(&a, &b)| f64::from(a) * f64::from(b))
            .sum()
    }

    /// Euclidean length.
    pub fn magnitude(&self) -> f64 {
        self.dot(self).sqrt()
    }
}

impl fmt::Display for AptitudeVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(d, v)| format!("{d}:{v}")).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// Question category, used for grouping and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Psychometric,
    Academic,
    Aptitude,
    Socioeconomic,
    Aspiration,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Psychometric => write!(f, "psychometric"),
            Category::Academic => write!(f, "academic"),
            Category::Aptitude => write!(f, "aptitude"),
            Category::Socioeconomic => write!(f, "socioeconomic"),
            Category::Aspiration => write!(f, "aspiration"),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "psychometric" => Ok(Category::Psychometric),
            "academic" => Ok(Category::Academic),
            "aptitude" => Ok(Category::Aptitude),
            "socioeconomic" => Ok(Category::Socioeconomic),
            "aspiration" => Ok(Category::Aspiration),
            other => Err(format!("unknown question category: {other}")),
        }
    }
}

/// A single multiple-choice question. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within the question bank.
    #[serde(default)]
    pub id: String,
    /// Prompt shown to the student.
    pub text: String,
    pub category: Category,
    /// Ordered answer options; a valid question has at least one.
    #[serde(default)]
    pub options: Vec<AnswerOption>,
}

impl Question {
    /// Look up an option by id.
    pub fn option(&self, option_id: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.id == option_id)
    }
}

/// One selectable option of a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOption {
    /// Unique within its question.
    #[serde(default)]
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub scores: ScoreWeights,
}

/// A committed selection for one question.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub option_id: String,
}

impl Answer {
    pub fn new(question_id: impl Into<String>, option_id: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            option_id: option_id.into(),
        }
    }
}

/// A career in the matcher's catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerProfile {
    pub name: String,
    /// Label of the dominant dimension, e.g. "Investigative (Thinkers)".
    pub type_name: String,
    #[serde(default)]
    pub description: String,
    /// The aptitude shape this career rewards.
    pub ideal_vector: AptitudeVector,
}

/// A career ranked against a student's aptitude vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerRecommendation {
    pub career: String,
    pub type_name: String,
    #[serde(default)]
    pub description: String,
    /// Similarity in `[0, 100]`, rounded to one decimal.
    pub match_percentage: f64,
}

/// Share of the total aggregated score attributable to one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Raw aggregated score for the dimension.
    #[serde(default)]
    pub score: u32,
    /// Percentage in `[0, 100]`, rounded to one decimal.
    pub percentage: f64,
}

/// Percentages below this are omitted from the "top insights" view.
pub const INSIGHT_THRESHOLD_PERCENT: f64 = 5.0;

/// Per-dimension personality breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonalityProfile {
    entries: BTreeMap<Dimension, PersonalityEntry>,
}

impl PersonalityProfile {
    pub fn new(entries: BTreeMap<Dimension, PersonalityEntry>) -> Self {
        Self { entries }
    }

    pub fn get(&self, dimension: Dimension) -> Option<&PersonalityEntry> {
        self.entries.get(&dimension)
    }

    /// Entries in canonical dimension order.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, &PersonalityEntry)> {
        self.entries.iter().map(|(d, e)| (*d, e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries at or above the reporting threshold, highest percentage
    /// first, ties in canonical order.
    pub fn top_insights(&self) -> Vec<(Dimension, &PersonalityEntry)> {
        let mut insights: Vec<_> = self
            .iter()
            .filter(|(_, e)| e.percentage >= INSIGHT_THRESHOLD_PERCENT)
            .collect();
        insights.sort_by(|a, b| b.1.percentage.total_cmp(&a.1.percentage));
        insights
    }
}

/// Payload sent to the achievement ledger when a quiz completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementDescriptor {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub points: u32,
}

impl AchievementDescriptor {
    /// The fixed descriptor awarded for finishing the career quiz.
    pub fn quiz_completed() -> Self {
        Self {
            id: "complete-career-quiz".into(),
            title: "Career Quiz Completed".into(),
            description: "Completed the career quiz and received recommendations".into(),
            icon: "\u{1f393}".into(),
            points: 50,
        }
    }
}
