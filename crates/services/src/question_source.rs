use async_trait::async_trait;

use quiz_core::model::QuizQuestion;

use crate::error::SourceError;

/// Transport-agnostic event emitted by a question source.
///
/// Push-based integrations (a delegate-style network layer, a test
/// harness) deliver these directly into
/// [`crate::quiz_loop::QuizLoopService::apply_event`]; the pull-based
/// fetch path builds them from [`QuestionSource`] results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    /// Backing data finished loading; questions may now be requested.
    DataLoaded,
    /// A question request resolved. `None` mirrors a delivery that carried
    /// no question; the session treats it as a non-event.
    QuestionReceived(Option<QuizQuestion>),
    /// Loading or fetching failed, with a user-facing description.
    LoadFailed(String),
}

/// Supplies yes/no questions on demand.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Prime the source: fetch and validate its backing data.
    ///
    /// Priming again after success is a no-op, so a retry path may call
    /// this unconditionally.
    ///
    /// # Errors
    ///
    /// Returns `SourceError` when the backing data cannot be obtained.
    async fn load_data(&self) -> Result<(), SourceError>;

    /// Resolve the next question.
    ///
    /// `Ok(None)` is a delivery without a question — the recoverable
    /// upstream edge case, distinct from a failed fetch.
    ///
    /// # Errors
    ///
    /// Returns `SourceError` when the fetch itself fails.
    async fn next_question(&self) -> Result<Option<QuizQuestion>, SourceError>;
}
