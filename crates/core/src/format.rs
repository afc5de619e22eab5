use chrono::{DateTime, Utc};

use crate::model::{GameResult, StatisticsAggregate};

/// Render the end-of-round summary shown to the player.
///
/// Composes the round score, the cumulative games counter, the best-game
/// record with its timestamp, and the total accuracy to two decimals.
/// Pure: no clock, no storage.
#[must_use]
pub fn results_message(round: &GameResult, aggregate: &StatisticsAggregate) -> String {
    let mut lines = vec![
        format!("Your result: {}/{}", round.correct(), round.total()),
        format!("Quizzes played: {}", aggregate.games_count()),
    ];
    if let Some(best) = aggregate.best_game() {
        lines.push(format!(
            "Record: {}/{} ({})",
            best.correct(),
            best.total(),
            format_record_date(best.date())
        ));
    }
    lines.push(format!(
        "Average accuracy: {:.2}%",
        aggregate.total_accuracy()
    ));
    lines.join("\n")
}

fn format_record_date(date: DateTime<Utc>) -> String {
    date.format("%d.%m.%y %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn renders_all_four_lines() {
        let round = GameResult::new(8, 10, fixed_now()).unwrap();
        let best = GameResult::new(9, 10, fixed_now()).unwrap();
        let aggregate = StatisticsAggregate::from_persisted(3, 17, 30, Some(best)).unwrap();

        let message = results_message(&round, &aggregate);
        assert_eq!(
            message,
            "Your result: 8/10\n\
             Quizzes played: 3\n\
             Record: 9/10 (03.01.24 12:30)\n\
             Average accuracy: 56.67%"
        );
    }

    #[test]
    fn perfect_first_round_reads_one_hundred_percent() {
        let round = GameResult::new(10, 10, fixed_now()).unwrap();
        let mut aggregate = StatisticsAggregate::empty();
        aggregate.apply_round(round.clone());

        let message = results_message(&round, &aggregate);
        assert!(message.starts_with("Your result: 10/10"));
        assert!(message.contains("Quizzes played: 1"));
        assert!(message.contains("Record: 10/10"));
        assert!(message.ends_with("Average accuracy: 100.00%"));
    }

    #[test]
    fn missing_record_line_is_skipped() {
        let round = GameResult::new(2, 5, fixed_now()).unwrap();
        let aggregate = StatisticsAggregate::empty();

        let message = results_message(&round, &aggregate);
        assert!(!message.contains("Record:"));
        assert!(message.ends_with("Average accuracy: 0.00%"));
    }
}
