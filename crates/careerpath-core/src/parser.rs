//! Question bank parsing and validation.
//!
//! Question banks are TOML or JSON documents holding a list of questions,
//! each with weighted options. Validation is all-or-nothing: one malformed
//! question rejects the whole batch.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::LoadError;
use crate::model::{Dimension, Question};
use crate::traits::QuestionBank;

/// A named, validated list of questions.
#[derive(Debug, Clone)]
pub struct QuestionSet {
    pub id: String,
    pub name: String,
    pub description: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct QuestionBankFile {
    #[serde(default)]
    question_bank: Option<QuestionBankHeader>,
    #[serde(default)]
    questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct QuestionBankHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

/// Document format, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankFormat {
    Toml,
    Json,
}

impl BankFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => BankFormat::Json,
            _ => BankFormat::Toml,
        }
    }
}

/// Read, parse and validate a question bank file.
pub fn parse_question_set(path: &Path) -> Result<QuestionSet, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| LoadError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_question_set_str(&content, BankFormat::from_path(path), path)
}

/// Parse and validate a question bank from a string (useful for testing).
pub fn parse_question_set_str(
    content: &str,
    format: BankFormat,
    source_path: &Path,
) -> Result<QuestionSet, LoadError> {
    let parse_error = |message: String| LoadError::Parse {
        origin: source_path.display().to_string(),
        message,
    };

    let parsed: QuestionBankFile = match format {
        BankFormat::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string()))?,
        BankFormat::Json => {
            serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?
        }
    };

    validate_questions(&parsed.questions)?;

    let stem = source_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("questions")
        .to_string();
    let (id, name, description) = match parsed.question_bank {
        Some(header) => (header.id, header.name, header.description),
        None => (stem.clone(), stem, String::new()),
    };

    Ok(QuestionSet {
        id,
        name,
        description,
        questions: parsed.questions,
    })
}

/// Check that a fetched batch is usable by a quiz session.
///
/// Rejects an empty batch, blank or duplicate question ids, questions with
/// no options, and blank or duplicate option ids within a question.
pub fn validate_questions(questions: &[Question]) -> Result<(), LoadError> {
    if questions.is_empty() {
        return Err(LoadError::Empty);
    }

    let mut seen_questions = HashSet::new();
    for (position, question) in questions.iter().enumerate() {
        let invalid = |reason: String| LoadError::InvalidQuestion {
            question_id: if question.id.is_empty() {
                format!("#{}", position + 1)
            } else {
                question.id.clone()
            },
            reason,
        };

        if question.id.trim().is_empty() {
            return Err(invalid("missing id".into()));
        }
        if !seen_questions.insert(question.id.as_str()) {
            return Err(invalid("duplicate question id".into()));
        }
        if question.options.is_empty() {
            return Err(invalid("question has no options".into()));
        }

        let mut seen_options = HashSet::new();
        for option in &question.options {
            if option.id.trim().is_empty() {
                return Err(invalid(format!("option {:?} is missing an id", option.text)));
            }
            if !seen_options.insert(option.id.as_str()) {
                return Err(invalid(format!("duplicate option id {:?}", option.id)));
            }
        }
    }

    Ok(())
}

/// A non-fatal finding from [`lint_questions`].
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Report questions that are valid but unlikely to discriminate between
/// students.
pub fn lint_questions(questions: &[Question]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for question in questions {
        for option in &question.options {
            if option.scores.is_zero() {
                warnings.push(ValidationWarning {
                    question_id: Some(question.id.clone()),
                    message: format!("option {} carries no weight in any dimension", option.id),
                });
            }
        }

        if question.options.len() > 1
            && question
                .options
                .windows(2)
                .all(|pair| pair[0].scores == pair[1].scores)
        {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: "all options score identically".into(),
            });
        }
    }

    // Dimensions no option can raise
    for dimension in Dimension::ALL {
        let reachable = questions
            .iter()
            .flat_map(|q| q.options.iter())
            .any(|o| o.scores.get(dimension) > 0);
        if !reachable {
            warnings.push(ValidationWarning {
                question_id: None,
                message: format!(
                    "no option raises the {} ({dimension}) dimension",
                    dimension.name()
                ),
            });
        }
    }

    warnings
}

/// Question bank backed by a local TOML or JSON file. The file is re-read
/// on every fetch so edits show up on the next attempt.
pub struct FileQuestionBank {
    path: PathBuf,
}

impl FileQuestionBank {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl QuestionBank for FileQuestionBank {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch_questions(&self) -> Result<Vec<Question>, LoadError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| LoadError::Read {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;
        let set = parse_question_set_str(&content, BankFormat::from_path(&self.path), &self.path)?;
        tracing::debug!(
            "loaded {} questions from {}",
            set.questions.len(),
            self.path.display()
        );
        Ok(set.questions)
    }
}
