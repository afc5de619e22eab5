mod game_result;
mod question;
mod session;
mod statistics;

pub use game_result::{GameResult, GameResultError};
pub use question::{ImageRef, QuizQuestion};
pub use session::{
    AnswerOutcome, FeedbackAdvance, FeedbackToken, QuizSession, SessionError, SessionPhase,
};
pub use statistics::{StatisticsAggregate, StatisticsAggregateError};
