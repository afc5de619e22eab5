use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::SourceError;

/// One entry in the movie catalog feed.
///
/// The feed serializes ratings as strings; [`MovieItem::rating_value`]
/// normalizes unparsable ratings to `0.0`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieItem {
    #[serde(rename = "fullTitle", alias = "title")]
    pub title: String,
    #[serde(rename = "imDbRating")]
    pub rating: String,
    #[serde(rename = "image")]
    pub image_url: String,
}

impl MovieItem {
    #[must_use]
    pub fn rating_value(&self) -> f64 {
        self.rating.parse().unwrap_or(0.0)
    }
}

/// Top-level catalog feed payload.
///
/// The feed reports its own errors in-band: a non-empty `errorMessage`
/// means the item list must not be used even when present.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieCatalog {
    #[serde(rename = "errorMessage", default)]
    pub error_message: String,
    #[serde(default)]
    pub items: Vec<MovieItem>,
}

impl MovieCatalog {
    /// Validate feed-level errors and emptiness.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Catalog` for an error-bearing feed and
    /// `SourceError::EmptyCatalog` for a feed without items.
    pub fn into_items(self) -> Result<Vec<MovieItem>, SourceError> {
        if !self.error_message.is_empty() {
            return Err(SourceError::Catalog(self.error_message));
        }
        if self.items.is_empty() {
            return Err(SourceError::EmptyCatalog);
        }
        Ok(self.items)
    }
}

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub base_url: String,
    pub api_key: String,
}

impl CatalogConfig {
    /// Read the catalog endpoint from the environment.
    ///
    /// Returns `None` without `QUIZ_API_KEY`; callers then fall back to the
    /// bundled catalog.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("QUIZ_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("QUIZ_API_URL")
            .unwrap_or_else(|_| "https://tv-api.com/en/API/MostPopularMovies".into());
        Some(Self { base_url, api_key })
    }
}

/// Loads the movie catalog backing question generation.
#[async_trait]
pub trait CatalogLoader: Send + Sync {
    /// Fetch and validate the catalog.
    ///
    /// # Errors
    ///
    /// Returns `SourceError` for transport failures and for feeds that are
    /// error-bearing or empty.
    async fn load(&self) -> Result<Vec<MovieItem>, SourceError>;
}

/// Fetches the catalog feed over HTTP.
pub struct HttpCatalogLoader {
    client: Client,
    config: CatalogConfig,
}

impl HttpCatalogLoader {
    #[must_use]
    pub fn new(config: CatalogConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl CatalogLoader for HttpCatalogLoader {
    async fn load(&self) -> Result<Vec<MovieItem>, SourceError> {
        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.api_key
        );
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(SourceError::HttpStatus(response.status()));
        }
        let catalog: MovieCatalog = response.json().await?;
        catalog.into_items()
    }
}

/// Serves a fixed catalog: the bundled offline set, or any list in tests.
pub struct StaticCatalogLoader {
    items: Vec<MovieItem>,
}

impl StaticCatalogLoader {
    #[must_use]
    pub fn new(items: Vec<MovieItem>) -> Self {
        Self { items }
    }

    /// Catalog for keyless runs, mirroring the feed's top entries.
    #[must_use]
    pub fn bundled() -> Self {
        let classics = [
            ("The Godfather", "9.2"),
            ("The Dark Knight", "9.0"),
            ("Kill Bill", "8.1"),
            ("The Avengers", "8.0"),
            ("Deadpool", "8.0"),
            ("The Green Knight", "6.6"),
            ("Old", "5.8"),
            ("Tesla", "5.1"),
            ("The Ice Age Adventures of Buck Wild", "4.3"),
            ("Vivarium", "5.8"),
        ];
        let items = classics
            .into_iter()
            .enumerate()
            .map(|(i, (title, rating))| MovieItem {
                title: title.to_owned(),
                rating: rating.to_owned(),
                image_url: format!("bundled://poster/{i}"),
            })
            .collect();
        Self { items }
    }
}

#[async_trait]
impl CatalogLoader for StaticCatalogLoader {
    async fn load(&self) -> Result<Vec<MovieItem>, SourceError> {
        if self.items.is_empty() {
            return Err(SourceError::EmptyCatalog);
        }
        Ok(self.items.clone())
    }
}
