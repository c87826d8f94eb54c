//! Quiz session state machine.
//!
//! A session walks a student through the question bank one question at a
//! time and, on the final answer, turns the answers into a [`QuizResult`]:
//!
//! ```text
//! Loading -> InProgress -> Submitting -> Completed
//!    |  ^
//!    v  | retry
//!  Error
//! ```
//!
//! Submission asks the remote recommendation service first and silently
//! falls back to the local aggregator and matcher when that fails. Either
//! way the achievement notifier is called exactly once before the session
//! completes. Each session owns an abort handle; cancelling it (explicitly
//! or by dropping the session) stops an in-flight remote call and prevents a
//! late response from completing the session.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::{AbortHandle, AbortRegistration, Abortable};
use uuid::Uuid;

use crate::catalog::CareerCatalog;
use crate::error::{LoadError, ServiceError};
use crate::matcher::RecommendationMatcher;
use crate::model::{
    AchievementDescriptor, Answer, AptitudeVector, CareerRecommendation, Dimension,
    PersonalityProfile, Question,
};
use crate::parser::validate_questions;
use crate::report::{QuizResult, ResultSource};
use crate::scoring::{aggregate, QuestionIndex};
use crate::traits::{AchievementNotifier, QuestionBank, RecommendationService, RemoteRecommendation};

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Loading,
    InProgress,
    Submitting,
    Completed,
    Error,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Loading => write!(f, "loading"),
            SessionState::InProgress => write!(f, "in-progress"),
            SessionState::Submitting => write!(f, "submitting"),
            SessionState::Completed => write!(f, "completed"),
            SessionState::Error => write!(f, "error"),
        }
    }
}

/// Misuse of the session API. Collaborator failures other than
/// [`LoadError`] never show up here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("cannot {operation} while the session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    #[error("no option selected for the current question")]
    NoSelection,

    #[error("question {question_id:?} has no option {option_id:?}")]
    UnknownOption {
        question_id: String,
        option_id: String,
    },

    #[error("already at the first question")]
    AtFirstQuestion,

    #[error("session was cancelled")]
    Cancelled,

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Outcome of a successful [`QuizSession::next`].
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Moved on to the question at `index`.
    Advanced { index: usize },
    /// The final answer was committed and the attempt is scored.
    Completed(Box<QuizResult>),
}

/// How far through the question bank a session is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
}

impl Progress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            100.0 * self.answered as f64 / self.total as f64
        }
    }
}

/// Per-session configuration. Passed in explicitly; nothing is global.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Who receives the completion achievement.
    pub user_id: String,
    /// Catalog for the local fallback and for filling gaps in remote results.
    pub catalog: Arc<CareerCatalog>,
    /// Descriptor sent to the achievement notifier on completion.
    pub achievement: AchievementDescriptor,
    /// Upper bound on the remote call. `None` waits indefinitely.
    pub remote_timeout: Option<Duration>,
    /// Upper bound on the achievement notification.
    pub notify_timeout: Duration,
}

impl SessionConfig {
    pub fn new(user_id: impl Into<String>, catalog: Arc<CareerCatalog>) -> Self {
        Self {
            user_id: user_id.into(),
            catalog,
            achievement: AchievementDescriptor::quiz_completed(),
            remote_timeout: Some(Duration::from_secs(30)),
            notify_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_remote_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.remote_timeout = timeout;
        self
    }

    pub fn with_notify_timeout(mut self, timeout: Duration) -> Self {
        self.notify_timeout = timeout;
        self
    }
}

/// Observability hooks for a session.
pub trait SessionObserver: Send + Sync {
    fn on_state_change(&self, from: SessionState, to: SessionState);
    fn on_answer(&self, index: usize, answer: &Answer);
    fn on_submission_degraded(&self, reason: &ServiceError);
    fn on_complete(&self, result: &QuizResult);
    fn on_notify_failed(&self, error: &ServiceError);
}

/// No-op observer.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_state_change(&self, _: SessionState, _: SessionState) {}
    fn on_answer(&self, _: usize, _: &Answer) {}
    fn on_submission_degraded(&self, _: &ServiceError) {}
    fn on_complete(&self, _: &QuizResult) {}
    fn on_notify_failed(&self, _: &ServiceError) {}
}

/// Cancels a session from outside, e.g. from another task while
/// [`QuizSession::next`] is awaiting the remote service.
#[derive(Debug, Clone)]
pub struct CancelHandle(AbortHandle);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.is_aborted()
    }
}

/// One quiz attempt. Create a fresh session per attempt.
pub struct QuizSession {
    bank: Arc<dyn QuestionBank>,
    service: Arc<dyn RecommendationService>,
    notifier: Arc<dyn AchievementNotifier>,
    observer: Arc<dyn SessionObserver>,
    config: SessionConfig,
    attempt_id: Uuid,

    state: SessionState,
    questions: Vec<Question>,
    answers: Vec<Answer>,
    current_index: usize,
    /// Tentative selection for the current question.
    selected: Option<String>,
    /// Last committed option per question, used to pre-select on revisits.
    remembered: Vec<Option<String>>,
    result: Option<QuizResult>,
    load_error: Option<LoadError>,
    notified: bool,

    abort_handle: AbortHandle,
    abort_registration: Option<AbortRegistration>,
}

impl QuizSession {
    pub fn new(
        bank: Arc<dyn QuestionBank>,
        service: Arc<dyn RecommendationService>,
        notifier: Arc<dyn AchievementNotifier>,
        config: SessionConfig,
    ) -> Self {
        let (abort_handle, abort_registration) = AbortHandle::new_pair();
        Self {
            bank,
            service,
            notifier,
            observer: Arc::new(NoopObserver),
            config,
            attempt_id: Uuid::new_v4(),
            state: SessionState::Loading,
            questions: Vec::new(),
            answers: Vec::new(),
            current_index: 0,
            selected: None,
            remembered: Vec::new(),
            result: None,
            load_error: None,
            notified: false,
            abort_handle,
            abort_registration: Some(abort_registration),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The question awaiting an answer, while in progress.
    pub fn current_question(&self) -> Option<&Question> {
        if self.state == SessionState::InProgress {
            self.questions.get(self.current_index)
        } else {
            None
        }
    }

    /// The tentative (uncommitted) selection for the current question.
    pub fn selected_option(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_last_question(&self) -> bool {
        !self.questions.is_empty() && self.current_index + 1 == self.questions.len()
    }

    pub fn progress(&self) -> Progress {
        Progress {
            answered: self.answers.len(),
            total: self.questions.len(),
        }
    }

    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    pub fn load_error(&self) -> Option<&LoadError> {
        self.load_error.as_ref()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(self.abort_handle.clone())
    }

    pub fn cancel(&self) {
        self.abort_handle.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.abort_handle.is_aborted()
    }

    /// Fetch and validate the question bank. Only valid in `Loading`.
    pub async fn load(&mut self) -> Result<(), SessionError> {
        self.expect_state("load", SessionState::Loading)?;

        let fetched = self
            .bank
            .fetch_questions()
            .await
            .and_then(|questions| validate_questions(&questions).map(|()| questions));

        match fetched {
            Ok(questions) => {
                tracing::debug!(
                    "loaded {} questions from {} bank",
                    questions.len(),
                    self.bank.name()
                );
                self.remembered = vec![None; questions.len()];
                self.questions = questions;
                self.answers.clear();
                self.current_index = 0;
                self.selected = None;
                self.load_error = None;
                self.transition(SessionState::InProgress);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("failed to load questions: {e}");
                self.load_error = Some(e.clone());
                self.transition(SessionState::Error);
                Err(SessionError::Load(e))
            }
        }
    }

    /// Leave the `Error` state and try loading again.
    pub async fn retry(&mut self) -> Result<(), SessionError> {
        self.expect_state("retry", SessionState::Error)?;
        self.transition(SessionState::Loading);
        self.load().await
    }

    /// Tentatively select an option for the current question. Replaces any
    /// earlier selection; nothing is committed until [`next`](Self::next).
    pub fn select_option(&mut self, option_id: &str) -> Result<(), SessionError> {
        self.expect_state("select an option", SessionState::InProgress)?;
        let question = &self.questions[self.current_index];
        if question.option(option_id).is_none() {
            return Err(SessionError::UnknownOption {
                question_id: question.id.clone(),
                option_id: option_id.to_string(),
            });
        }
        self.selected = Some(option_id.to_string());
        Ok(())
    }

    /// Commit the tentative selection and advance. On the final question
    /// this submits the attempt and returns the result.
    pub async fn next(&mut self) -> Result<Step, SessionError> {
        self.expect_state("advance", SessionState::InProgress)?;
        let Some(option_id) = self.selected.take() else {
            return Err(SessionError::NoSelection);
        };

        let index = self.current_index;
        let answer = Answer::new(self.questions[index].id.clone(), option_id.clone());
        self.remembered[index] = Some(option_id);
        self.observer.on_answer(index, &answer);
        self.answers.push(answer);
        self.current_index += 1;

        if self.current_index < self.questions.len() {
            self.selected = self.remembered[self.current_index].clone();
            return Ok(Step::Advanced {
                index: self.current_index,
            });
        }

        self.transition(SessionState::Submitting);
        let result = self.submit().await?;
        Ok(Step::Completed(Box::new(result)))
    }

    /// Step back one question, un-committing its answer and restoring it as
    /// the tentative selection.
    pub fn previous(&mut self) -> Result<(), SessionError> {
        self.expect_state("go back", SessionState::InProgress)?;
        if self.current_index == 0 {
            return Err(SessionError::AtFirstQuestion);
        }
        self.current_index -= 1;
        self.selected = self.answers.pop().map(|a| a.option_id);
        Ok(())
    }

    async fn submit(&mut self) -> Result<QuizResult, SessionError> {
        let option_ids: Vec<String> = self.answers.iter().map(|a| a.option_id.clone()).collect();
        let remote = self.request_remote(option_ids).await;

        if self.is_cancelled() {
            tracing::info!(
                attempt = %self.attempt_id,
                "session cancelled during submission, discarding response"
            );
            return Err(SessionError::Cancelled);
        }

        let catalog = Arc::clone(&self.config.catalog);
        let matcher = RecommendationMatcher::new(&catalog);
        let (aptitude, recommendations, personality_profile, source) = match remote {
            Ok(remote) => {
                let aptitude = remote.aptitude;
                let (recommendations, profile) = fill_from_remote(remote, &matcher);
                (aptitude, recommendations, profile, ResultSource::Remote)
            }
            Err(reason) => {
                tracing::warn!(
                    attempt = %self.attempt_id,
                    reason = reason.kind(),
                    answers = self.answers.len(),
                    "recommendation service unavailable, using local fallback: {reason}"
                );
                self.observer.on_submission_degraded(&reason);
                let aptitude = self.local_aptitude();
                let outcome = matcher.match_vector(&aptitude);
                (
                    aptitude,
                    outcome.recommendations,
                    outcome.personality_profile,
                    ResultSource::Fallback,
                )
            }
        };

        let result = QuizResult {
            id: self.attempt_id,
            answers: self.answers.clone(),
            timestamp: Utc::now(),
            recommendations,
            aptitude,
            personality_profile,
            source,
        };

        self.notify_completion().await;

        tracing::info!(
            attempt = %self.attempt_id,
            source = %result.source,
            "quiz completed with aptitude {}",
            result.aptitude
        );
        self.result = Some(result.clone());
        self.transition(SessionState::Completed);
        self.observer.on_complete(&result);
        Ok(result)
    }

    async fn request_remote(
        &mut self,
        option_ids: Vec<String>,
    ) -> Result<RemoteRecommendation, ServiceError> {
        let Some(registration) = self.abort_registration.take() else {
            return Err(ServiceError::Cancelled);
        };
        let service = Arc::clone(&self.service);
        let call = Abortable::new(
            async move { service.compute(&option_ids).await },
            registration,
        );

        let outcome = match self.config.remote_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(outcome) => outcome,
                Err(_) => return Err(ServiceError::Timeout(timeout_secs(limit))),
            },
            None => call.await,
        };

        outcome.unwrap_or(Err(ServiceError::Cancelled))
    }

    fn local_aptitude(&self) -> AptitudeVector {
        let index = QuestionIndex::new(&self.questions);
        match aggregate(&self.answers, &index) {
            Ok(vector) => vector,
            Err(e) => {
                tracing::error!(attempt = %self.attempt_id, "data integrity fault: {e}");
                AptitudeVector::ZERO
            }
        }
    }

    async fn notify_completion(&mut self) {
        if self.notified {
            return;
        }
        self.notified = true;

        let outcome = tokio::time::timeout(
            self.config.notify_timeout,
            self.notifier
                .notify(&self.config.user_id, &self.config.achievement),
        )
        .await
        .unwrap_or_else(|_| Err(ServiceError::Timeout(timeout_secs(self.config.notify_timeout))));

        match outcome {
            Ok(()) => tracing::debug!(
                user = %self.config.user_id,
                "recorded achievement {}",
                self.config.achievement.id
            ),
            Err(e) => {
                tracing::warn!(user = %self.config.user_id, "achievement notification failed: {e}");
                self.observer.on_notify_failed(&e);
            }
        }
    }

    fn expect_state(
        &self,
        operation: &'static str,
        expected: SessionState,
    ) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn transition(&mut self, to: SessionState) {
        let from = self.state;
        self.state = to;
        tracing::debug!(attempt = %self.attempt_id, "session {from} -> {to}");
        self.observer.on_state_change(from, to);
    }
}

impl Drop for QuizSession {
    fn drop(&mut self) {
        self.abort_handle.abort();
    }
}

/// Take the remote pieces that are present and derive the rest locally from
/// the remote aptitude.
fn fill_from_remote(
    remote: RemoteRecommendation,
    matcher: &RecommendationMatcher<'_>,
) -> (Vec<CareerRecommendation>, PersonalityProfile) {
    let recommendations = match remote.recommendations {
        Some(mut list) if !list.is_empty() => {
            list.sort_by(|a, b| b.match_percentage.total_cmp(&a.match_percentage));
            list
        }
        _ => matcher.recommend(&remote.aptitude),
    };
    let profile = match remote.personality_profile {
        Some(profile) if is_complete_profile(&profile) => profile,
        Some(profile) if !profile.is_empty() => {
            tracing::debug!(
                entries = profile.len(),
                "remote personality profile is incomplete, deriving locally"
            );
            matcher.personality_profile(&remote.aptitude)
        }
        _ => matcher.personality_profile(&remote.aptitude),
    };
    (recommendations, profile)
}

/// One entry per dimension, each share within `[0, 100]`.
fn is_complete_profile(profile: &PersonalityProfile) -> bool {
    Dimension::ALL.iter().all(|&dimension| {
        profile
            .get(dimension)
            .is_some_and(|entry| (0.0..=100.0).contains(&entry.percentage))
    })
}

/// Whole seconds, rounded up so sub-second limits never report zero.
fn timeout_secs(limit: Duration) -> u64 {
    limit.as_secs() + u64::from(limit.subsec_nanos() > 0)
}
