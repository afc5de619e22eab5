use std::sync::Arc;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::{Mutex, RwLock};

use quiz_core::model::{ImageRef, QuizQuestion};

use crate::catalog::{CatalogLoader, MovieItem};
use crate::error::SourceError;
use crate::question_source::QuestionSource;

/// Thresholds drawn for the rating comparison in question text.
const THRESHOLD_RANGE: std::ops::RangeInclusive<u32> = 5..=9;

/// Builds yes/no questions from a loaded movie catalog.
///
/// Each question draws a random movie and a random rating threshold; the
/// ground truth is whether the movie's rating exceeds the threshold.
pub struct QuestionFactory {
    loader: Arc<dyn CatalogLoader>,
    movies: RwLock<Vec<MovieItem>>,
    rng: Mutex<StdRng>,
}

impl QuestionFactory {
    #[must_use]
    pub fn new(loader: Arc<dyn CatalogLoader>) -> Self {
        Self {
            loader,
            movies: RwLock::new(Vec::new()),
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Factory with a fixed RNG seed for deterministic tests.
    #[must_use]
    pub fn with_seed(loader: Arc<dyn CatalogLoader>, seed: u64) -> Self {
        Self {
            loader,
            movies: RwLock::new(Vec::new()),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

#[async_trait]
impl QuestionSource for QuestionFactory {
    async fn load_data(&self) -> Result<(), SourceError> {
        if !self.movies.read().await.is_empty() {
            return Ok(());
        }
        let items = self.loader.load().await?;
        tracing::debug!(movies = items.len(), "catalog loaded");
        *self.movies.write().await = items;
        Ok(())
    }

    async fn next_question(&self) -> Result<Option<QuizQuestion>, SourceError> {
        let movies = self.movies.read().await;
        if movies.is_empty() {
            return Err(SourceError::NotLoaded);
        }

        let (index, threshold) = {
            let mut rng = self.rng.lock().await;
            (
                rng.random_range(0..movies.len()),
                rng.random_range(THRESHOLD_RANGE),
            )
        };
        let movie = &movies[index];

        let text = format!(
            "Is the rating of \"{}\" higher than {}?",
            movie.title, threshold
        );
        let correct_answer = movie.rating_value() > f64::from(threshold);
        Ok(Some(QuizQuestion::new(
            ImageRef::new(movie.image_url.clone()),
            text,
            correct_answer,
        )))
    }
}
