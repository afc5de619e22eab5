use thiserror::Error;

use crate::model::GameResult;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StatisticsAggregateError {
    #[error("correct answers total ({correct}) exceeds questions total ({total})")]
    CorrectExceedsTotal { correct: u32, total: u32 },
}

/// Durable aggregate of every round ever played.
///
/// `best_game` is `None` until the first round is recorded. Counters only
/// grow; the sole mutation path is [`StatisticsAggregate::apply_round`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatisticsAggregate {
    games_count: u32,
    correct_answers_total: u32,
    total_questions_total: u32,
    best_game: Option<GameResult>,
}

impl StatisticsAggregate {
    /// The aggregate before any round has been played.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rehydrate the aggregate from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsAggregateError::CorrectExceedsTotal` if the
    /// running sums are inconsistent.
    pub fn from_persisted(
        games_count: u32,
        correct_answers_total: u32,
        total_questions_total: u32,
        best_game: Option<GameResult>,
    ) -> Result<Self, StatisticsAggregateError> {
        if correct_answers_total > total_questions_total {
            return Err(StatisticsAggregateError::CorrectExceedsTotal {
                correct: correct_answers_total,
                total: total_questions_total,
            });
        }
        Ok(Self {
            games_count,
            correct_answers_total,
            total_questions_total,
            best_game,
        })
    }

    #[must_use]
    pub fn games_count(&self) -> u32 {
        self.games_count
    }

    #[must_use]
    pub fn correct_answers_total(&self) -> u32 {
        self.correct_answers_total
    }

    #[must_use]
    pub fn total_questions_total(&self) -> u32 {
        self.total_questions_total
    }

    #[must_use]
    pub fn best_game(&self) -> Option<&GameResult> {
        self.best_game.as_ref()
    }

    /// Cumulative correct-answer ratio as a percentage.
    ///
    /// Defined as `0` before any question has been recorded.
    #[must_use]
    pub fn total_accuracy(&self) -> f64 {
        if self.total_questions_total == 0 {
            return 0.0;
        }
        f64::from(self.correct_answers_total) / f64::from(self.total_questions_total) * 100.0
    }

    /// Fold one finished round into the aggregate.
    ///
    /// Increments the games counter, adds the round to the running sums,
    /// and replaces the best game when the round outranks it
    /// (see [`GameResult::is_better_than`]).
    pub fn apply_round(&mut self, round: GameResult) {
        self.games_count = self.games_count.saturating_add(1);
        self.correct_answers_total = self.correct_answers_total.saturating_add(round.correct());
        self.total_questions_total = self.total_questions_total.saturating_add(round.total());
        let replace = self
            .best_game
            .as_ref()
            .is_none_or(|best| round.is_better_than(best));
        if replace {
            self.best_game = Some(round);
        }
    }
}
