use std::sync::Arc;
use std::time::Duration;

use quiz_core::Clock;
use quiz_core::format::results_message;
use quiz_core::model::{
    AnswerOutcome, FeedbackAdvance, FeedbackToken, GameResult, QuizQuestion, QuizSession,
    SessionPhase,
};

use crate::error::{QuizError, SourceError};
use crate::question_source::{QuestionSource, SourceEvent};
use crate::statistics_service::StatisticsService;

/// Pause between scoring an answer and advancing, while the outcome shows.
pub const FEEDBACK_INTERVAL: Duration = Duration::from_secs(1);

/// How many deliveries without a question are re-requested before the round
/// is surfaced as a source failure.
const MAX_EMPTY_DELIVERIES: u32 = 3;

/// Display snapshot for the question currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizStep {
    pub counter: String,
    pub question: QuizQuestion,
}

/// A finished round plus the aggregate-backed summary to display.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundReport {
    pub result: GameResult,
    pub message: String,
}

/// Outcome of a feedback pause elapsing.
#[derive(Debug, Clone, PartialEq)]
pub enum StepAdvance {
    /// The next question is on screen.
    Next(QuizStep),
    /// The round finished and was recorded.
    Finished(RoundReport),
    /// The token was stale; nothing changed.
    Ignored,
}

/// Orchestrates one quiz run against a question source and the statistics
/// store.
///
/// The service is stateless across rounds: the session is passed in, so a
/// presentation layer owns exactly one session and can retry or replay by
/// calling [`QuizLoopService::begin`] again.
pub struct QuizLoopService {
    clock: Clock,
    source: Arc<dyn QuestionSource>,
    statistics: Arc<StatisticsService>,
    feedback_interval: Duration,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        source: Arc<dyn QuestionSource>,
        statistics: Arc<StatisticsService>,
    ) -> Self {
        Self {
            clock,
            source,
            statistics,
            feedback_interval: FEEDBACK_INTERVAL,
        }
    }

    #[must_use]
    pub fn with_feedback_interval(mut self, interval: Duration) -> Self {
        self.feedback_interval = interval;
        self
    }

    /// How long the presentation layer pauses before delivering the token.
    #[must_use]
    pub fn feedback_interval(&self) -> Duration {
        self.feedback_interval
    }

    /// Begin a fresh round; also the retry action after a failure.
    ///
    /// Primes the source, fetches the first question, and returns its
    /// display step. Statistics are never touched here.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Source` when priming or fetching fails and
    /// `QuizError::SourceStalled` when the source keeps delivering nothing.
    pub async fn begin(&self, session: &mut QuizSession) -> Result<QuizStep, QuizError> {
        if session.phase() == SessionPhase::Idle {
            session.start()?;
        } else {
            session.restart();
        }

        let load_event = match self.source.load_data().await {
            Ok(()) => SourceEvent::DataLoaded,
            Err(err) => SourceEvent::LoadFailed(err.to_string()),
        };
        Self::apply_event(session, load_event)?;

        self.fetch_step(session).await
    }

    /// Score the player's answer.
    ///
    /// The caller displays the outcome, waits out
    /// [`QuizLoopService::feedback_interval`] (through a scheduler or an
    /// inline sleep), then hands the token to [`QuizLoopService::advance`].
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` when no question is awaiting an answer.
    pub fn answer(
        &self,
        session: &mut QuizSession,
        answer: bool,
    ) -> Result<AnswerOutcome, QuizError> {
        Ok(session.submit_answer(answer)?)
    }

    /// Deliver the end of the feedback pause.
    ///
    /// Advances to the next question, or finalizes the round: the result
    /// is stored, the aggregate read back, and the summary rendered. A
    /// stale token returns [`StepAdvance::Ignored`] and changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` for fetch failures on the next question or for
    /// statistics persistence failures on the last one.
    pub async fn advance(
        &self,
        session: &mut QuizSession,
        token: FeedbackToken,
    ) -> Result<StepAdvance, QuizError> {
        match session.on_feedback_elapsed(token) {
            FeedbackAdvance::NextQuestion => {
                Ok(StepAdvance::Next(self.fetch_step(session).await?))
            }
            FeedbackAdvance::RoundFinished { correct, total } => {
                let aggregate = self.statistics.store(correct, total).await?;
                let round = GameResult::new(correct, total, self.clock.now())?;
                let message = results_message(&round, &aggregate);
                tracing::info!(correct, total, "round complete");
                Ok(StepAdvance::Finished(RoundReport {
                    result: round,
                    message,
                }))
            }
            FeedbackAdvance::Ignored => Ok(StepAdvance::Ignored),
        }
    }

    /// Fold a transport event into the session.
    ///
    /// This is the entry point for push-based sources that deliver through
    /// callbacks; the pull-based `begin`/`advance` path routes through it
    /// too. Returns the display step when the event put a question on
    /// screen.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Source` for a `LoadFailed` event.
    pub fn apply_event(
        session: &mut QuizSession,
        event: SourceEvent,
    ) -> Result<Option<QuizStep>, QuizError> {
        match event {
            SourceEvent::DataLoaded => Ok(None),
            SourceEvent::QuestionReceived(question) => {
                if session.on_question_received(question) {
                    Ok(Self::step_snapshot(session))
                } else {
                    Ok(None)
                }
            }
            SourceEvent::LoadFailed(message) => {
                tracing::warn!(%message, "question source failed");
                Err(QuizError::Source(SourceError::Catalog(message)))
            }
        }
    }

    async fn fetch_step(&self, session: &mut QuizSession) -> Result<QuizStep, QuizError> {
        for _ in 0..MAX_EMPTY_DELIVERIES {
            let event = match self.source.next_question().await {
                Ok(question) => SourceEvent::QuestionReceived(question),
                Err(err) => SourceEvent::LoadFailed(err.to_string()),
            };
            if let Some(step) = Self::apply_event(session, event)? {
                return Ok(step);
            }
        }
        tracing::warn!(attempts = MAX_EMPTY_DELIVERIES, "source delivered no question");
        Err(QuizError::SourceStalled)
    }

    fn step_snapshot(session: &QuizSession) -> Option<QuizStep> {
        session.current_question().cloned().map(|question| QuizStep {
            counter: session.counter_text(),
            question,
        })
    }
}
