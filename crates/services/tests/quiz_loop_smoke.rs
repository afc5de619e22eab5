use std::sync::Arc;

use quiz_core::model::QuizSession;
use quiz_core::time::fixed_clock;
use services::{
    QuestionFactory, QuizLoopService, StatisticsService, StaticCatalogLoader, StepAdvance,
};
use storage::repository::InMemoryRepository;

#[tokio::test]
async fn perfect_round_records_statistics_and_summary() {
    let factory = QuestionFactory::with_seed(Arc::new(StaticCatalogLoader::bundled()), 42);
    let statistics = Arc::new(StatisticsService::new(
        fixed_clock(),
        Arc::new(InMemoryRepository::new()),
    ));
    let service = QuizLoopService::new(fixed_clock(), Arc::new(factory), Arc::clone(&statistics));

    let mut session = QuizSession::new(10).unwrap();
    let mut step = service.begin(&mut session).await.unwrap();

    let report = loop {
        // Answer with the question's own ground truth: a perfect round.
        let truth = step.question.correct_answer();
        let outcome = service.answer(&mut session, truth).unwrap();
        assert!(outcome.is_correct);

        match service.advance(&mut session, outcome.token).await.unwrap() {
            StepAdvance::Next(next) => step = next,
            StepAdvance::Finished(report) => break report,
            StepAdvance::Ignored => panic!("token should never be stale here"),
        }
    };

    assert_eq!(report.result.correct(), 10);
    assert_eq!(report.result.total(), 10);
    assert!(report.message.starts_with("Your result: 10/10"));
    assert!(report.message.contains("Quizzes played: 1"));
    assert!(report.message.contains("Record: 10/10"));
    assert!(report.message.ends_with("Average accuracy: 100.00%"));

    let aggregate = statistics.aggregate().await.unwrap();
    assert_eq!(aggregate.games_count(), 1);
    assert_eq!(aggregate.correct_answers_total(), 10);
    assert_eq!(aggregate.total_questions_total(), 10);

    let best = aggregate.best_game().unwrap();
    assert_eq!((best.correct(), best.total()), (10, 10));
}

#[tokio::test]
async fn replay_accumulates_rounds_in_the_same_store() {
    let factory = QuestionFactory::with_seed(Arc::new(StaticCatalogLoader::bundled()), 7);
    let statistics = Arc::new(StatisticsService::new(
        fixed_clock(),
        Arc::new(InMemoryRepository::new()),
    ));
    let service = QuizLoopService::new(fixed_clock(), Arc::new(factory), Arc::clone(&statistics));

    let mut session = QuizSession::new(3).unwrap();
    for expected_games in 1..=2 {
        let mut step = service.begin(&mut session).await.unwrap();
        loop {
            let outcome = service.answer(&mut session, step.question.correct_answer()).unwrap();
            match service.advance(&mut session, outcome.token).await.unwrap() {
                StepAdvance::Next(next) => step = next,
                StepAdvance::Finished(report) => {
                    assert!(report.message.contains(&format!(
                        "Quizzes played: {expected_games}"
                    )));
                    break;
                }
                StepAdvance::Ignored => panic!("token should never be stale here"),
            }
        }
    }

    let aggregate = statistics.aggregate().await.unwrap();
    assert_eq!(aggregate.games_count(), 2);
    assert_eq!(aggregate.total_questions_total(), 6);
}
