use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{KeyValueRepository, StatKey, StorageError};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

#[async_trait]
impl KeyValueRepository for SqliteRepository {
    async fn get_int(&self, key: StatKey) -> Result<Option<i64>, StorageError> {
        let row = sqlx::query("SELECT int_value FROM stat_values WHERE key = ?1")
            .bind(key.as_str())
            .fetch_optional(self.pool())
            .await
            .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };
        row.try_get::<Option<i64>, _>("int_value").map_err(ser)
    }

    async fn set_int(&self, key: StatKey, value: i64) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO stat_values (key, int_value)
                VALUES (?1, ?2)
                ON CONFLICT(key) DO UPDATE SET int_value = excluded.int_value
            ",
        )
        .bind(key.as_str())
        .bind(value)
        .execute(self.pool())
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_date(&self, key: StatKey) -> Result<Option<DateTime<Utc>>, StorageError> {
        let row = sqlx::query("SELECT date_value FROM stat_values WHERE key = ?1")
            .bind(key.as_str())
            .fetch_optional(self.pool())
            .await
            .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };
        row.try_get::<Option<DateTime<Utc>>, _>("date_value")
            .map_err(ser)
    }

    async fn set_date(&self, key: StatKey, value: DateTime<Utc>) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO stat_values (key, date_value)
                VALUES (?1, ?2)
                ON CONFLICT(key) DO UPDATE SET date_value = excluded.date_value
            ",
        )
        .bind(key.as_str())
        .bind(value)
        .execute(self.pool())
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn write_batch(
        &self,
        ints: &[(StatKey, i64)],
        dates: &[(StatKey, DateTime<Utc>)],
    ) -> Result<(), StorageError> {
        let mut tx = self.pool().begin().await.map_err(conn)?;

        for (key, value) in ints {
            sqlx::query(
                r"
                    INSERT INTO stat_values (key, int_value)
                    VALUES (?1, ?2)
                    ON CONFLICT(key) DO UPDATE SET int_value = excluded.int_value
                ",
            )
            .bind(key.as_str())
            .bind(*value)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        for (key, value) in dates {
            sqlx::query(
                r"
                    INSERT INTO stat_values (key, date_value)
                    VALUES (?1, ?2)
                    ON CONFLICT(key) DO UPDATE SET date_value = excluded.date_value
                ",
            )
            .bind(key.as_str())
            .bind(*value)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)
    }
}
