use thiserror::Error;

use crate::model::QuizQuestion;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("a session needs at least one question")]
    InvalidQuestionsAmount,

    #[error("session already started")]
    NotIdle,

    #[error("no question is awaiting an answer")]
    NotAwaitingAnswer,
}

//
// ─── PHASES & EVENTS ───────────────────────────────────────────────────────────
//

/// Lifecycle phase of a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    AwaitingQuestion,
    AwaitingAnswer,
    ShowingFeedback,
    RoundComplete,
}

/// Ties a feedback pause to the answer that started it.
///
/// Issued by [`QuizSession::submit_answer`]; the session ignores any token
/// that does not belong to the current round and question, so a timer that
/// outlives a restart cannot advance the fresh round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackToken {
    epoch: u64,
    index: u32,
}

/// Outcome of scoring one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub token: FeedbackToken,
}

/// What a feedback pause elapsing leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackAdvance {
    /// More questions remain; the session awaits the next one.
    NextQuestion,
    /// The round is over with `correct` of `total` answers right.
    RoundFinished { correct: u32, total: u32 },
    /// The token was stale or no feedback was showing.
    Ignored,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// State machine for one run of yes/no questions.
///
/// `Idle -> AwaitingQuestion -> AwaitingAnswer -> ShowingFeedback ->
/// (AwaitingQuestion | RoundComplete)`. The session never talks to the
/// question source or storage itself; callers observe the phase, feed it
/// events, and finalize the round when it reports completion.
#[derive(Debug, Clone)]
pub struct QuizSession {
    questions_amount: u32,
    current_index: u32,
    correct_answers: u32,
    current_question: Option<QuizQuestion>,
    phase: SessionPhase,
    epoch: u64,
}

impl QuizSession {
    /// Create an idle session of `questions_amount` questions.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidQuestionsAmount` for a zero-length run.
    pub fn new(questions_amount: u32) -> Result<Self, SessionError> {
        if questions_amount == 0 {
            return Err(SessionError::InvalidQuestionsAmount);
        }
        Ok(Self {
            questions_amount,
            current_index: 0,
            correct_answers: 0,
            current_question: None,
            phase: SessionPhase::Idle,
            epoch: 0,
        })
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn questions_amount(&self) -> u32 {
        self.questions_amount
    }

    #[must_use]
    pub fn current_index(&self) -> u32 {
        self.current_index
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.current_question.as_ref()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == SessionPhase::RoundComplete
    }

    /// Position counter for the question on screen, e.g. `"3/10"`.
    #[must_use]
    pub fn counter_text(&self) -> String {
        format!("{}/{}", self.current_index + 1, self.questions_amount)
    }

    /// Begin the first round.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotIdle` once the session has started; use
    /// [`QuizSession::restart`] for subsequent rounds.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Idle {
            return Err(SessionError::NotIdle);
        }
        self.begin_round();
        Ok(())
    }

    /// Begin a fresh round from any state.
    ///
    /// Resets the cursor and score and invalidates every outstanding
    /// feedback token. Never touches stored statistics.
    pub fn restart(&mut self) {
        self.begin_round();
    }

    fn begin_round(&mut self) {
        self.epoch += 1;
        self.current_index = 0;
        self.correct_answers = 0;
        self.current_question = None;
        self.phase = SessionPhase::AwaitingQuestion;
    }

    /// Deliver a resolved question request.
    ///
    /// Accepted only while a question is awaited; deliveries in any other
    /// phase (e.g. resolving after a restart) are discarded. An absent
    /// question is a non-event: the session keeps awaiting so the caller
    /// may request again.
    ///
    /// Returns `true` when the question is now awaiting an answer.
    pub fn on_question_received(&mut self, question: Option<QuizQuestion>) -> bool {
        if self.phase != SessionPhase::AwaitingQuestion {
            return false;
        }
        let Some(question) = question else {
            return false;
        };
        self.current_question = Some(question);
        self.phase = SessionPhase::AwaitingAnswer;
        true
    }

    /// Score the player's yes/no answer against the current question.
    ///
    /// Transitions to `ShowingFeedback` and issues the token that must
    /// accompany [`QuizSession::on_feedback_elapsed`].
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotAwaitingAnswer` when no question is
    /// awaiting an answer.
    pub fn submit_answer(&mut self, answer: bool) -> Result<AnswerOutcome, SessionError> {
        if self.phase != SessionPhase::AwaitingAnswer {
            return Err(SessionError::NotAwaitingAnswer);
        }
        let question = self
            .current_question
            .as_ref()
            .ok_or(SessionError::NotAwaitingAnswer)?;

        let is_correct = answer == question.correct_answer();
        if is_correct {
            self.correct_answers += 1;
        }
        self.phase = SessionPhase::ShowingFeedback;
        Ok(AnswerOutcome {
            is_correct,
            token: FeedbackToken {
                epoch: self.epoch,
                index: self.current_index,
            },
        })
    }

    /// Deliver the end of a feedback pause.
    ///
    /// Only the token issued for the current question in the current round
    /// advances the session; anything else returns
    /// [`FeedbackAdvance::Ignored`] without changing state.
    pub fn on_feedback_elapsed(&mut self, token: FeedbackToken) -> FeedbackAdvance {
        if self.phase != SessionPhase::ShowingFeedback
            || token.epoch != self.epoch
            || token.index != self.current_index
        {
            return FeedbackAdvance::Ignored;
        }

        self.current_question = None;
        if self.current_index == self.questions_amount - 1 {
            self.phase = SessionPhase::RoundComplete;
            FeedbackAdvance::RoundFinished {
                correct: self.correct_answers,
                total: self.questions_amount,
            }
        } else {
            self.current_index += 1;
            self.phase = SessionPhase::AwaitingQuestion;
            FeedbackAdvance::NextQuestion
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ImageRef;

    fn question(correct_answer: bool) -> QuizQuestion {
        QuizQuestion::new(ImageRef::new("poster-1"), "Rating above 6?", correct_answer)
    }

    fn started(amount: u32) -> QuizSession {
        let mut session = QuizSession::new(amount).unwrap();
        session.start().unwrap();
        session
    }

    #[test]
    fn rejects_zero_question_session() {
        let err = QuizSession::new(0).unwrap_err();
        assert_eq!(err, SessionError::InvalidQuestionsAmount);
    }

    #[test]
    fn start_is_only_valid_from_idle() {
        let mut session = started(3);
        assert_eq!(session.start().unwrap_err(), SessionError::NotIdle);
    }

    #[test]
    fn full_round_walks_indices_in_order() {
        let mut session = started(3);
        let mut seen = Vec::new();

        for step in 0..3 {
            assert_eq!(session.phase(), SessionPhase::AwaitingQuestion);
            assert!(session.on_question_received(Some(question(true))));
            assert_eq!(session.phase(), SessionPhase::AwaitingAnswer);
            seen.push(session.current_index());

            let outcome = session.submit_answer(true).unwrap();
            assert!(outcome.is_correct);
            assert_eq!(session.phase(), SessionPhase::ShowingFeedback);

            let advance = session.on_feedback_elapsed(outcome.token);
            if step < 2 {
                assert_eq!(advance, FeedbackAdvance::NextQuestion);
            } else {
                assert_eq!(
                    advance,
                    FeedbackAdvance::RoundFinished {
                        correct: 3,
                        total: 3
                    }
                );
            }
        }

        assert_eq!(seen, vec![0, 1, 2]);
        assert!(session.is_complete());
    }

    #[test]
    fn correct_answers_counts_matches_only() {
        let mut session = started(3);
        let truths = [true, false, true];
        let answers = [true, true, false];

        for (truth, answer) in truths.into_iter().zip(answers) {
            session.on_question_received(Some(question(truth)));
            let outcome = session.submit_answer(answer).unwrap();
            assert_eq!(outcome.is_correct, truth == answer);
            session.on_feedback_elapsed(outcome.token);
        }

        // Only the first answer matched its ground truth.
        assert_eq!(session.correct_answers(), 1);
    }

    #[test]
    fn counter_text_is_one_based() {
        let mut session = started(10);
        assert_eq!(session.counter_text(), "1/10");

        session.on_question_received(Some(question(true)));
        let outcome = session.submit_answer(true).unwrap();
        session.on_feedback_elapsed(outcome.token);
        assert_eq!(session.counter_text(), "2/10");
    }

    #[test]
    fn absent_question_is_a_no_op() {
        let mut session = started(3);
        assert!(!session.on_question_received(None));
        assert_eq!(session.phase(), SessionPhase::AwaitingQuestion);

        // A later real delivery still lands.
        assert!(session.on_question_received(Some(question(true))));
    }

    #[test]
    fn late_delivery_outside_awaiting_is_discarded() {
        let mut session = started(3);
        session.on_question_received(Some(question(true)));

        assert!(!session.on_question_received(Some(question(false))));
        assert_eq!(session.phase(), SessionPhase::AwaitingAnswer);
        assert!(session.current_question().unwrap().correct_answer());
    }

    #[test]
    fn answer_outside_awaiting_answer_fails() {
        let mut session = started(3);
        assert_eq!(
            session.submit_answer(true).unwrap_err(),
            SessionError::NotAwaitingAnswer
        );

        session.on_question_received(Some(question(true)));
        let outcome = session.submit_answer(true).unwrap();
        assert_eq!(
            session.submit_answer(true).unwrap_err(),
            SessionError::NotAwaitingAnswer
        );
        session.on_feedback_elapsed(outcome.token);
    }

    #[test]
    fn stale_token_after_restart_is_ignored() {
        let mut session = started(3);
        session.on_question_received(Some(question(true)));
        let outcome = session.submit_answer(true).unwrap();

        session.restart();
        assert_eq!(
            session.on_feedback_elapsed(outcome.token),
            FeedbackAdvance::Ignored
        );
        assert_eq!(session.phase(), SessionPhase::AwaitingQuestion);
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn replayed_token_is_ignored() {
        let mut session = started(3);
        session.on_question_received(Some(question(true)));
        let outcome = session.submit_answer(true).unwrap();

        assert_eq!(
            session.on_feedback_elapsed(outcome.token),
            FeedbackAdvance::NextQuestion
        );
        assert_eq!(
            session.on_feedback_elapsed(outcome.token),
            FeedbackAdvance::Ignored
        );
    }

    #[test]
    fn restart_resets_cursor_and_score() {
        let mut session = started(2);
        session.on_question_received(Some(question(true)));
        let outcome = session.submit_answer(true).unwrap();
        session.on_feedback_elapsed(outcome.token);

        session.restart();
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.correct_answers(), 0);
        assert_eq!(session.phase(), SessionPhase::AwaitingQuestion);
        assert!(session.current_question().is_none());
    }
}
