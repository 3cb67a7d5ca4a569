// craftwatch-core/src/repositories/sqlite/tracked_targets.rs
//
// Durable registry of tracked status messages, one row per published
// message. The colon-joined key string only exists at this layer; callers
// work with the structured TrackedKey.

use async_trait::async_trait;
use sqlx::{Pool, Row, Sqlite};

use craftwatch_common::error::Error;
use craftwatch_common::models::tracker::{ServerKind, TrackedKey, TrackedTarget};
use craftwatch_common::traits::repository_traits::TrackerRepository;

#[derive(Clone)]
pub struct SqliteTrackerRepository {
    pool: Pool<Sqlite>,
}

impl SqliteTrackerRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

fn row_to_target(row: &sqlx::sqlite::SqliteRow) -> Result<TrackedTarget, Error> {
    let address: String = row.try_get("address")?;
    let kind_str: String = row.try_get("kind")?;
    let kind: ServerKind = kind_str.parse().map_err(Error::Parse)?;
    Ok(TrackedTarget { address, kind })
}

#[async_trait]
impl TrackerRepository for SqliteTrackerRepository {
    async fn set(&self, key: &TrackedKey, target: &TrackedTarget) -> Result<(), Error> {
        let q = r#"
            INSERT INTO tracked_targets (key, address, kind)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (key)
            DO UPDATE SET address = excluded.address,
                          kind = excluded.kind,
                          updated_at = CURRENT_TIMESTAMP
        "#;
        sqlx::query(q)
            .bind(key.encode())
            .bind(&target.address)
            .bind(target.kind.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get(&self, key: &TrackedKey) -> Result<Option<TrackedTarget>, Error> {
        let q = r#"
            SELECT address, kind
            FROM tracked_targets
            WHERE key = ?1
        "#;
        let row_opt = sqlx::query(q)
            .bind(key.encode())
            .fetch_optional(&self.pool)
            .await?;

        match row_opt {
            Some(r) => Ok(Some(row_to_target(&r)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &TrackedKey) -> Result<(), Error> {
        sqlx::query("DELETE FROM tracked_targets WHERE key = ?1")
            .bind(key.encode())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn all(&self) -> Result<Vec<(TrackedKey, TrackedTarget)>, Error> {
        let q = r#"
            SELECT key, address, kind
            FROM tracked_targets
            ORDER BY created_at
        "#;
        let rows = sqlx::query(q).fetch_all(&self.pool).await?;

        let mut out = Vec::new();
        for r in rows {
            let key_str: String = r.try_get("key")?;
            let key = TrackedKey::decode(&key_str).map_err(Error::Parse)?;
            out.push((key, row_to_target(&r)?));
        }
        Ok(out)
    }

    async fn rekey(&self, old: &TrackedKey, new: &TrackedKey) -> Result<(), Error> {
        // Single UPDATE of the primary key column keeps the replacement
        // atomic: the old key stops resolving the moment the new one does.
        sqlx::query(
            r#"
            UPDATE tracked_targets
            SET key = ?1,
                updated_at = CURRENT_TIMESTAMP
            WHERE key = ?2
            "#,
        )
        .bind(new.encode())
        .bind(old.encode())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
