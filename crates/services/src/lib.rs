#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod question_factory;
pub mod question_source;
pub mod quiz_loop;
pub mod statistics_service;

pub use quiz_core::Clock;

pub use catalog::{CatalogConfig, CatalogLoader, HttpCatalogLoader, StaticCatalogLoader};
pub use error::{QuizError, SourceError, StatisticsError};
pub use question_factory::QuestionFactory;
pub use question_source::{QuestionSource, SourceEvent};
pub use quiz_loop::{FEEDBACK_INTERVAL, QuizLoopService, QuizStep, RoundReport, StepAdvance};
pub use statistics_service::StatisticsService;
