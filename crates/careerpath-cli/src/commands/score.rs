//! The `careerpath score` command.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use careerpath_core::catalog::CareerCatalog;
use careerpath_core::matcher::RecommendationMatcher;
use careerpath_core::model::{AptitudeVector, CareerRecommendation, PersonalityProfile};
use careerpath_core::parser::parse_question_set;
use careerpath_core::scoring::{aggregate, answers_from_option_ids, QuestionIndex};

use super::output::print_scores;

#[derive(Serialize)]
struct ScoreReport<'a> {
    aptitude: AptitudeVector,
    recommendations: &'a [CareerRecommendation],
    personality_profile: &'a PersonalityProfile,
}

pub fn execute(
    bank: PathBuf,
    answers: String,
    catalog: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let set = parse_question_set(&bank)?;
    let catalog = CareerCatalog::load_or_builtin(catalog.as_deref())?;

    let option_ids: Vec<String> = answers
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if option_ids.len() < set.questions.len() {
        eprintln!(
            "Warning: {} of {} questions answered; scoring the partial set.",
            option_ids.len(),
            set.questions.len()
        );
    }

    let answers = answers_from_option_ids(&set.questions, &option_ids)?;
    let index = QuestionIndex::new(&set.questions);
    let aptitude = aggregate(&answers, &index)?;
    let outcome = RecommendationMatcher::new(&catalog).match_vector(&aptitude);

    if json {
        let report = ScoreReport {
            aptitude,
            recommendations: &outcome.recommendations,
            personality_profile: &outcome.personality_profile,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Question bank: {} ({} answers)\n", set.name, answers.len());
    print_scores(
        &aptitude,
        &outcome.recommendations,
        &outcome.personality_profile,
    );
    Ok(())
}
