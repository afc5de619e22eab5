use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GameResultError {
    #[error("a round must contain at least one question")]
    EmptyRound,

    #[error("correct answers ({correct}) exceed round size ({total})")]
    CorrectExceedsTotal { correct: u32, total: u32 },
}

/// One finished round: how many of `total` questions were answered
/// correctly, and when the round completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    correct: u32,
    total: u32,
    date: DateTime<Utc>,
}

impl GameResult {
    /// Build a result, validating `0 <= correct <= total` and `total > 0`.
    ///
    /// # Errors
    ///
    /// Returns `GameResultError::EmptyRound` for a zero-question round and
    /// `GameResultError::CorrectExceedsTotal` when the score overruns it.
    pub fn new(correct: u32, total: u32, date: DateTime<Utc>) -> Result<Self, GameResultError> {
        if total == 0 {
            return Err(GameResultError::EmptyRound);
        }
        if correct > total {
            return Err(GameResultError::CorrectExceedsTotal { correct, total });
        }
        Ok(Self {
            correct,
            total,
            date,
        })
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Ranking rule for the best-game record.
    ///
    /// A strictly higher `correct` count wins. On equal `correct`, the
    /// smaller `total` wins (it is the higher-accuracy round). Equal on
    /// both, the later `date` wins, so the record tracks the most recent
    /// occurrence of the top score.
    #[must_use]
    pub fn is_better_than(&self, other: &GameResult) -> bool {
        if self.correct != other.correct {
            return self.correct > other.correct;
        }
        if self.total != other.total {
            return self.total < other.total;
        }
        self.date > other.date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn rejects_empty_round() {
        let err = GameResult::new(0, 0, fixed_now()).unwrap_err();
        assert_eq!(err, GameResultError::EmptyRound);
    }

    #[test]
    fn rejects_score_above_total() {
        let err = GameResult::new(11, 10, fixed_now()).unwrap_err();
        assert_eq!(
            err,
            GameResultError::CorrectExceedsTotal {
                correct: 11,
                total: 10
            }
        );
    }

    #[test]
    fn higher_correct_count_wins() {
        let now = fixed_now();
        let five = GameResult::new(5, 10, now).unwrap();
        let eight = GameResult::new(8, 10, now).unwrap();
        assert!(eight.is_better_than(&five));
        assert!(!five.is_better_than(&eight));
    }

    #[test]
    fn equal_correct_smaller_total_wins() {
        let now = fixed_now();
        let tight = GameResult::new(8, 10, now).unwrap();
        let loose = GameResult::new(8, 20, now).unwrap();
        assert!(tight.is_better_than(&loose));
        assert!(!loose.is_better_than(&tight));
    }

    #[test]
    fn full_tie_later_date_wins() {
        let earlier = GameResult::new(8, 10, fixed_now()).unwrap();
        let later = GameResult::new(8, 10, fixed_now() + Duration::hours(1)).unwrap();
        assert!(later.is_better_than(&earlier));
        assert!(!earlier.is_better_than(&later));
    }
}
