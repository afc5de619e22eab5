use std::sync::Arc;

use tokio::sync::Mutex;

use quiz_core::Clock;
use quiz_core::model::{GameResult, StatisticsAggregate};
use storage::repository::{KeyValueRepository, StatKey, StorageError};

use crate::error::StatisticsError;

/// Durable aggregate of completed rounds, persisted under fixed keys.
///
/// Writers serialize on an internal lock, so the aggregate invariants are
/// never observed broken mid-update even if a future caller shares the
/// service across tasks.
pub struct StatisticsService {
    clock: Clock,
    store: Arc<dyn KeyValueRepository>,
    write_lock: Mutex<()>,
}

impl StatisticsService {
    #[must_use]
    pub fn new(clock: Clock, store: Arc<dyn KeyValueRepository>) -> Self {
        Self {
            clock,
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Record a completed round and return the updated aggregate.
    ///
    /// The whole update lands as one batched write; within the batch the
    /// questions total precedes the correct total, so even a non-
    /// transactional adapter can never leave the correct count ahead.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError::InvalidRound` for `total == 0` or
    /// `correct > total`, without touching storage; storage failures are
    /// propagated as `StatisticsError::Storage`.
    pub async fn store(
        &self,
        correct: u32,
        total: u32,
    ) -> Result<StatisticsAggregate, StatisticsError> {
        if total == 0 || correct > total {
            return Err(StatisticsError::InvalidRound { correct, total });
        }

        let _guard = self.write_lock.lock().await;

        let mut aggregate = self.load_aggregate().await?;
        let round = GameResult::new(correct, total, self.clock.now())?;
        aggregate.apply_round(round);

        let mut ints = vec![
            (
                StatKey::TotalQuestions,
                i64::from(aggregate.total_questions_total()),
            ),
            (
                StatKey::CorrectAnswers,
                i64::from(aggregate.correct_answers_total()),
            ),
            (StatKey::GamesCount, i64::from(aggregate.games_count())),
        ];
        let mut dates = Vec::new();
        if let Some(best) = aggregate.best_game() {
            ints.push((StatKey::BestGameCorrect, i64::from(best.correct())));
            ints.push((StatKey::BestGameTotal, i64::from(best.total())));
            dates.push((StatKey::BestGameDate, best.date()));
        }
        self.store.write_batch(&ints, &dates).await?;

        tracing::debug!(
            correct,
            total,
            games = aggregate.games_count(),
            "round recorded"
        );
        Ok(aggregate)
    }

    /// Snapshot of the full durable aggregate.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError` on storage failures or corrupted state.
    pub async fn aggregate(&self) -> Result<StatisticsAggregate, StatisticsError> {
        self.load_aggregate().await
    }

    /// Number of rounds ever completed.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError` on storage failures.
    pub async fn games_count(&self) -> Result<u32, StatisticsError> {
        self.read_u32(StatKey::GamesCount).await
    }

    /// The highest-ranked round ever stored, if any.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError` on storage failures or corrupted state.
    pub async fn best_game(&self) -> Result<Option<GameResult>, StatisticsError> {
        self.load_best_game().await
    }

    /// Cumulative accuracy percentage; `0` before any round.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError` on storage failures or corrupted state.
    pub async fn total_accuracy(&self) -> Result<f64, StatisticsError> {
        Ok(self.load_aggregate().await?.total_accuracy())
    }

    async fn load_aggregate(&self) -> Result<StatisticsAggregate, StatisticsError> {
        let games_count = self.read_u32(StatKey::GamesCount).await?;
        let correct_total = self.read_u32(StatKey::CorrectAnswers).await?;
        let questions_total = self.read_u32(StatKey::TotalQuestions).await?;
        let best_game = self.load_best_game().await?;
        Ok(StatisticsAggregate::from_persisted(
            games_count,
            correct_total,
            questions_total,
            best_game,
        )?)
    }

    async fn load_best_game(&self) -> Result<Option<GameResult>, StatisticsError> {
        let correct = self.store.get_int(StatKey::BestGameCorrect).await?;
        let total = self.store.get_int(StatKey::BestGameTotal).await?;
        let date = self.store.get_date(StatKey::BestGameDate).await?;

        match (correct, total, date) {
            (Some(correct), Some(total), Some(date)) => {
                let correct = stat_u32(StatKey::BestGameCorrect, correct)?;
                let total = stat_u32(StatKey::BestGameTotal, total)?;
                Ok(Some(GameResult::new(correct, total, date)?))
            }
            _ => Ok(None),
        }
    }

    async fn read_u32(&self, key: StatKey) -> Result<u32, StatisticsError> {
        match self.store.get_int(key).await? {
            Some(value) => stat_u32(key, value),
            None => Ok(0),
        }
    }
}

fn stat_u32(key: StatKey, value: i64) -> Result<u32, StatisticsError> {
    u32::try_from(value).map_err(|_| {
        StatisticsError::Storage(StorageError::Serialization(format!(
            "invalid {}: {value}",
            key.as_str()
        )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::time::{fixed_now, fixed_clock};
    use storage::repository::InMemoryRepository;

    fn service() -> StatisticsService {
        StatisticsService::new(fixed_clock(), Arc::new(InMemoryRepository::new()))
    }

    #[tokio::test]
    async fn fresh_store_reports_zeroes() {
        let stats = service();
        assert_eq!(stats.games_count().await.unwrap(), 0);
        assert_eq!(stats.total_accuracy().await.unwrap(), 0.0);
        assert!(stats.best_game().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn store_accumulates_across_rounds() {
        let stats = service();
        for (correct, total) in [(5_u32, 10_u32), (8, 10), (3, 10)] {
            stats.store(correct, total).await.unwrap();
        }

        let aggregate = stats.aggregate().await.unwrap();
        assert_eq!(aggregate.games_count(), 3);
        assert_eq!(aggregate.correct_answers_total(), 16);
        assert_eq!(aggregate.total_questions_total(), 30);
        assert!((aggregate.total_accuracy() - 16.0 / 30.0 * 100.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn invalid_rounds_are_rejected_without_writing() {
        let stats = service();

        assert!(matches!(
            stats.store(1, 0).await.unwrap_err(),
            StatisticsError::InvalidRound {
                correct: 1,
                total: 0
            }
        ));
        assert!(matches!(
            stats.store(11, 10).await.unwrap_err(),
            StatisticsError::InvalidRound {
                correct: 11,
                total: 10
            }
        ));

        assert_eq!(stats.games_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn best_game_follows_the_ranking_rule() {
        let stats = service();

        stats.store(5, 10).await.unwrap();
        stats.store(8, 10).await.unwrap();
        stats.store(6, 10).await.unwrap();

        let best = stats.best_game().await.unwrap().unwrap();
        assert_eq!((best.correct(), best.total()), (8, 10));
    }

    #[tokio::test]
    async fn tied_best_game_refreshes_its_date() {
        let repo: Arc<dyn KeyValueRepository> = Arc::new(InMemoryRepository::new());

        let first = StatisticsService::new(fixed_clock(), Arc::clone(&repo));
        first.store(8, 10).await.unwrap();

        let later = fixed_now() + Duration::days(1);
        let second = StatisticsService::new(Clock::fixed(later), Arc::clone(&repo));
        second.store(8, 10).await.unwrap();

        let best = second.best_game().await.unwrap().unwrap();
        assert_eq!(best.date(), later);
        assert_eq!(second.games_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn aggregate_survives_service_reconstruction() {
        let repo: Arc<dyn KeyValueRepository> = Arc::new(InMemoryRepository::new());

        StatisticsService::new(fixed_clock(), Arc::clone(&repo))
            .store(9, 10)
            .await
            .unwrap();

        let reopened = StatisticsService::new(fixed_clock(), repo);
        let aggregate = reopened.aggregate().await.unwrap();
        assert_eq!(aggregate.games_count(), 1);
        assert_eq!(aggregate.best_game().unwrap().correct(), 9);
    }
}
