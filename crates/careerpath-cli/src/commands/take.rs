//! The `careerpath take` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use careerpath_core::error::ServiceError;
use careerpath_core::model::Answer;
use careerpath_core::report::QuizResult;
use careerpath_core::session::{
    QuizSession, SessionError, SessionObserver, SessionState, Step,
};
use careerpath_core::traits::RecommendationService;
use careerpath_providers::config::{load_config_from, QuestionBankConfig};
use careerpath_providers::mock::MockRecommendationService;
use careerpath_providers::{create_notifier, create_question_bank, create_recommendation_service};

use super::output::print_result;

/// Console session observer.
struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn on_state_change(&self, _from: SessionState, to: SessionState) {
        if to == SessionState::Submitting {
            eprintln!("Scoring your answers...");
        }
    }

    fn on_answer(&self, _index: usize, _answer: &Answer) {}

    fn on_submission_degraded(&self, reason: &ServiceError) {
        eprintln!("Recommendation service unavailable ({reason}); scored locally.");
    }

    fn on_complete(&self, result: &QuizResult) {
        eprintln!("Quiz complete: {} careers ranked.", result.recommendations.len());
    }

    fn on_notify_failed(&self, error: &ServiceError) {
        eprintln!("Could not record your achievement: {error}");
    }
}

pub async fn execute(
    answers: Option<String>,
    bank: Option<PathBuf>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
    user: Option<String>,
    offline: bool,
) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(user) = user {
        config.user_id = user;
    }
    if let Some(path) = bank {
        config.question_bank = QuestionBankConfig::File { path };
    }

    let catalog = Arc::new(config.load_catalog()?);
    let question_bank = create_question_bank(&config.question_bank)?;
    let service: Arc<dyn RecommendationService> = if offline {
        Arc::new(MockRecommendationService::offline())
    } else {
        create_recommendation_service(&config.service)?
    };
    let notifier = create_notifier(&config.achievements)?;

    let mut session = QuizSession::new(
        question_bank,
        service,
        notifier,
        config.session_config(catalog),
    )
    .with_observer(Arc::new(ConsoleObserver));

    if let Err(e) = session.load().await {
        let message = session
            .load_error()
            .map(|l| l.user_message())
            .unwrap_or("Failed to load questions.");
        return Err(e).context(message);
    }

    let cancel = session.cancel_handle();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let outcome = match answers {
        Some(list) => answer_from_list(&mut session, &list).await,
        None => answer_interactively(&mut session).await,
    };
    ctrl_c.abort();

    let result = match outcome {
        Ok(result) => result,
        Err(e) if session.is_cancelled() => {
            tracing::debug!("session ended: {e}");
            anyhow::bail!("quiz cancelled");
        }
        Err(e) => return Err(e),
    };

    print_result(&result);

    if let Some(mut path) = output {
        if path.is_dir() {
            let stamp = result.timestamp.format("%Y-%m-%dT%H%M%S");
            path = path.join(format!("result-{stamp}.json"));
        }
        result.save_json(&path)?;
        eprintln!("Result saved to: {}", path.display());
    }

    Ok(())
}

async fn answer_from_list(session: &mut QuizSession, list: &str) -> Result<QuizResult> {
    let picks: Vec<&str> = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let total = session.questions().len();
    anyhow::ensure!(
        picks.len() == total,
        "expected {total} answers, got {}",
        picks.len()
    );

    for pick in picks {
        session.select_option(pick)?;
        if let Step::Completed(result) = session.next().await? {
            return Ok(*result);
        }
    }
    anyhow::bail!("quiz did not complete")
}

async fn answer_interactively(session: &mut QuizSession) -> Result<QuizResult> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let Some(question) = session.current_question() else {
            anyhow::bail!("session is {}", session.state());
        };
        let progress = session.progress();
        println!(
            "\nQuestion {} of {} ({:.0}% done)",
            session.current_index() + 1,
            progress.total,
            progress.percent()
        );
        println!("{}", question.text);
        for (n, option) in question.options.iter().enumerate() {
            let marker = if session.selected_option() == Some(option.id.as_str()) {
                "*"
            } else {
                " "
            };
            println!(" {marker}{}. {}", n + 1, option.text);
        }
        let hint = if session.current_index() > 0 { ", b = back" } else { "" };
        println!("Choose 1-{}{hint}:", question.options.len());

        let option_ids: Vec<String> = question.options.iter().map(|o| o.id.clone()).collect();
        let Some(line) = lines.next_line().await? else {
            anyhow::bail!("input closed before the quiz was finished");
        };
        let input = line.trim();

        if input.eq_ignore_ascii_case("b") {
            if let Err(e) = session.previous() {
                println!("{e}");
            }
            continue;
        }
        if !input.is_empty() {
            let chosen = input
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| option_ids.get(i))
                .cloned()
                .unwrap_or_else(|| input.to_string());
            if let Err(e) = session.select_option(&chosen) {
                println!("{e}");
                continue;
            }
        }

        match session.next().await {
            Ok(Step::Advanced { .. }) => {}
            Ok(Step::Completed(result)) => return Ok(*result),
            Err(SessionError::NoSelection) => println!("Please choose an option."),
            Err(e) => return Err(e.into()),
        }
    }
}
