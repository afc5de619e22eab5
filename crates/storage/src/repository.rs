use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Fixed keys under which the statistics aggregate persists.
///
/// A closed enum rather than free-form strings: every adapter stores the
/// same six slots, and a typo cannot silently create a seventh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKey {
    GamesCount,
    BestGameCorrect,
    BestGameTotal,
    BestGameDate,
    CorrectAnswers,
    TotalQuestions,
}

impl StatKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StatKey::GamesCount => "games_count",
            StatKey::BestGameCorrect => "best_game_correct",
            StatKey::BestGameTotal => "best_game_total",
            StatKey::BestGameDate => "best_game_date",
            StatKey::CorrectAnswers => "correct_answers",
            StatKey::TotalQuestions => "total_questions",
        }
    }
}

/// Key-value contract the statistics service persists through.
#[async_trait]
pub trait KeyValueRepository: Send + Sync {
    /// Fetch an integer slot; `None` when the key was never written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be read.
    async fn get_int(&self, key: StatKey) -> Result<Option<i64>, StorageError>;

    /// Write an integer slot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set_int(&self, key: StatKey, value: i64) -> Result<(), StorageError>;

    /// Fetch a timestamp slot; `None` when the key was never written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be read.
    async fn get_date(&self, key: StatKey) -> Result<Option<DateTime<Utc>>, StorageError>;

    /// Write a timestamp slot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set_date(&self, key: StatKey, value: DateTime<Utc>) -> Result<(), StorageError>;

    /// Apply a grouped update.
    ///
    /// Adapters apply the whole batch as one transaction where the backend
    /// allows it; otherwise entries are written in the order given, so
    /// callers can order entries to keep invariants across a torn write.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any entry cannot be stored; a transactional
    /// adapter then stores none of them.
    async fn write_batch(
        &self,
        ints: &[(StatKey, i64)],
        dates: &[(StatKey, DateTime<Utc>)],
    ) -> Result<(), StorageError>;
}

#[derive(Default)]
struct Tables {
    ints: HashMap<StatKey, i64>,
    dates: HashMap<StatKey, DateTime<Utc>>,
}

/// In-memory key-value store for tests and prototyping.
///
/// One mutex guards both tables, so a batch is observed all-or-nothing.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Tables>, StorageError> {
        self.tables
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl KeyValueRepository for InMemoryRepository {
    async fn get_int(&self, key: StatKey) -> Result<Option<i64>, StorageError> {
        Ok(self.lock()?.ints.get(&key).copied())
    }

    async fn set_int(&self, key: StatKey, value: i64) -> Result<(), StorageError> {
        self.lock()?.ints.insert(key, value);
        Ok(())
    }

    async fn get_date(&self, key: StatKey) -> Result<Option<DateTime<Utc>>, StorageError> {
        Ok(self.lock()?.dates.get(&key).copied())
    }

    async fn set_date(&self, key: StatKey, value: DateTime<Utc>) -> Result<(), StorageError> {
        self.lock()?.dates.insert(key, value);
        Ok(())
    }

    async fn write_batch(
        &self,
        ints: &[(StatKey, i64)],
        dates: &[(StatKey, DateTime<Utc>)],
    ) -> Result<(), StorageError> {
        let mut tables = self.lock()?;
        for (key, value) in ints {
            tables.ints.insert(*key, *value);
        }
        for (key, value) in dates {
            tables.dates.insert(*key, *value);
        }
        Ok(())
    }
}

/// Aggregates the key-value repository behind a trait object for easy
/// backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub stats: Arc<dyn KeyValueRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            stats: Arc::new(InMemoryRepository::new()),
        }
    }
}
