//! Score aggregation: folds committed answers into an aptitude vector.
//!
//! Weights are summed per dimension in a wide signed accumulator and each
//! total is clamped at zero only once, after every answer has been added.
//! Because the clamp happens after the sum, the result does not depend on
//! the order of the answers.

use std::collections::HashMap;

use crate::error::DataIntegrityError;
use crate::model::{Answer, AnswerOption, AptitudeVector, Dimension, Question};

/// Questions keyed by id for answer resolution.
pub struct QuestionIndex<'a> {
    by_id: HashMap<&'a str, &'a Question>,
}

impl<'a> QuestionIndex<'a> {
    pub fn new(questions: &'a [Question]) -> Self {
        Self {
            by_id: questions.iter().map(|q| (q.id.as_str(), q)).collect(),
        }
    }

    pub fn question(&self, question_id: &str) -> Option<&'a Question> {
        self.by_id.get(question_id).copied()
    }

    /// Find the option an answer selected.
    pub fn resolve(&self, answer: &Answer) -> Result<&'a AnswerOption, DataIntegrityError> {
        let question = self
            .question(&answer.question_id)
            .ok_or_else(|| DataIntegrityError::UnknownQuestion(answer.question_id.clone()))?;
        question
            .option(&answer.option_id)
            .ok_or_else(|| DataIntegrityError::UnknownOption {
                question_id: answer.question_id.clone(),
                option_id: answer.option_id.clone(),
            })
    }
}

/// Sum the weights of every selected option, starting from the zero vector.
pub fn aggregate(
    answers: &[Answer],
    questions: &QuestionIndex<'_>,
) -> Result<AptitudeVector, DataIntegrityError> {
    let mut totals = [0i64; 6];
    for answer in answers {
        let option = questions.resolve(answer)?;
        for (slot, dimension) in totals.iter_mut().zip(Dimension::ALL) {
            *slot += i64::from(option.scores.get(dimension));
        }
    }

    let mut vector = AptitudeVector::ZERO;
    for (total, dimension) in totals.into_iter().zip(Dimension::ALL) {
        let clamped = total.clamp(0, i64::from(u32::MAX));
        vector.set(dimension, u32::try_from(clamped).unwrap_or(u32::MAX));
    }
    Ok(vector)
}

/// Pair option ids with questions in presentation order.
///
/// Used by callers that only have the raw selection list (e.g. the remote
/// wire format). Fails if the lengths differ or an id is not an option of
/// the question at the same position.
pub fn answers_from_option_ids(
    questions: &[Question],
    option_ids: &[String],
) -> Result<Vec<Answer>, DataIntegrityError> {
    if option_ids.len() > questions.len() {
        return Err(DataIntegrityError::UnknownQuestion(format!(
            "#{}",
            questions.len() + 1
        )));
    }

    questions
        .iter()
        .zip(option_ids)
        .map(|(question, option_id)| {
            if question.option(option_id).is_some() {
                Ok(Answer::new(question.id.clone(), option_id.clone()))
            } else {
                Err(DataIntegrityError::UnknownOption {
                    question_id: question.id.clone(),
                    option_id: option_id.clone(),
                })
            }
        })
        .collect()
}
