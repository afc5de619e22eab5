use quiz_core::time::fixed_now;
use storage::repository::{KeyValueRepository, StatKey};
use storage::sqlite::SqliteRepository;

async fn fresh_repo(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_round_trips_ints_and_dates() {
    let repo = fresh_repo("memdb_kv_roundtrip").await;

    assert!(repo.get_int(StatKey::GamesCount).await.unwrap().is_none());

    repo.set_int(StatKey::GamesCount, 7).await.unwrap();
    repo.set_int(StatKey::GamesCount, 8).await.unwrap();
    repo.set_date(StatKey::BestGameDate, fixed_now())
        .await
        .unwrap();

    assert_eq!(repo.get_int(StatKey::GamesCount).await.unwrap(), Some(8));
    assert_eq!(
        repo.get_date(StatKey::BestGameDate).await.unwrap(),
        Some(fixed_now())
    );
}

#[tokio::test]
async fn sqlite_batch_commits_every_slot_together() {
    let repo = fresh_repo("memdb_kv_batch").await;

    repo.write_batch(
        &[
            (StatKey::TotalQuestions, 10),
            (StatKey::CorrectAnswers, 9),
            (StatKey::GamesCount, 1),
            (StatKey::BestGameCorrect, 9),
            (StatKey::BestGameTotal, 10),
        ],
        &[(StatKey::BestGameDate, fixed_now())],
    )
    .await
    .unwrap();

    assert_eq!(
        repo.get_int(StatKey::TotalQuestions).await.unwrap(),
        Some(10)
    );
    assert_eq!(repo.get_int(StatKey::CorrectAnswers).await.unwrap(), Some(9));
    assert_eq!(repo.get_int(StatKey::GamesCount).await.unwrap(), Some(1));
    assert_eq!(repo.get_int(StatKey::BestGameCorrect).await.unwrap(), Some(9));
    assert_eq!(repo.get_int(StatKey::BestGameTotal).await.unwrap(), Some(10));
    assert_eq!(
        repo.get_date(StatKey::BestGameDate).await.unwrap(),
        Some(fixed_now())
    );
}

#[tokio::test]
async fn sqlite_batch_overwrites_prior_slots() {
    let repo = fresh_repo("memdb_kv_overwrite").await;

    repo.write_batch(&[(StatKey::TotalQuestions, 10), (StatKey::CorrectAnswers, 5)], &[])
        .await
        .unwrap();
    repo.write_batch(&[(StatKey::TotalQuestions, 20), (StatKey::CorrectAnswers, 13)], &[])
        .await
        .unwrap();

    assert_eq!(
        repo.get_int(StatKey::TotalQuestions).await.unwrap(),
        Some(20)
    );
    assert_eq!(
        repo.get_int(StatKey::CorrectAnswers).await.unwrap(),
        Some(13)
    );
}
