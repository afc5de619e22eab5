//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{GameResultError, SessionError, StatisticsAggregateError};
use storage::repository::StorageError;

/// Errors emitted by the catalog loader and question factory.
///
/// All of these are recoverable: the boundary surfaces them as a message
/// plus a retry action that begins a fresh round.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("the movie catalog is empty")]
    EmptyCatalog,

    #[error("the catalog has not been loaded yet")]
    NotLoaded,

    #[error("catalog feed rejected the request: {0}")]
    Catalog(String),

    #[error("catalog request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `StatisticsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatisticsError {
    #[error("invalid round: {correct} correct of {total}")]
    InvalidRound { correct: u32, total: u32 },

    #[error(transparent)]
    Aggregate(#[from] StatisticsAggregateError),

    #[error(transparent)]
    Round(#[from] GameResultError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `QuizLoopService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("question source stalled without delivering a question")]
    SourceStalled,

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Statistics(#[from] StatisticsError),

    #[error(transparent)]
    Round(#[from] GameResultError),
}
