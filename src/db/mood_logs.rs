use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::mood_log::{LogFilter, LogOrder, MoodLog, NewMoodLog};

/// Append-only storage for chat turns.
///
/// Implementations scope every call to its own connection (or lock guard) and
/// release it on every exit path; nothing is shared between requests.
#[async_trait]
pub trait MoodLogStore: Send + Sync {
    /// Persists one row and returns it once durably committed.
    async fn append(&self, log: NewMoodLog) -> Result<MoodLog, sqlx::Error>;

    async fn fetch(&self, filter: &LogFilter, order: LogOrder) -> Result<Vec<MoodLog>, sqlx::Error>;

    /// Readiness probe.
    async fn ping(&self) -> Result<(), sqlx::Error>;
}

const SELECT_FILTERED: &str = r#"
    SELECT id, user_id, session_id, mood, reason, date, username, created_at
    FROM mood_logs
    WHERE ($1::TEXT IS NULL OR user_id = $1)
      AND ($2::TEXT IS NULL OR date COLLATE "C" >= $2)
      AND ($3::TEXT IS NULL OR date COLLATE "C" <= $3)
"#;

#[derive(Clone)]
pub struct PgMoodLogStore {
    pool: PgPool,
}

impl PgMoodLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl MoodLogStore for PgMoodLogStore {
    async fn append(&self, log: NewMoodLog) -> Result<MoodLog, sqlx::Error> {
        // Rolled back on drop if anything below fails.
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, MoodLog>(
            r#"
            INSERT INTO mood_logs (user_id, session_id, mood, reason, date, username)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, session_id, mood, reason, date, username, created_at
            "#,
        )
        .bind(&log.user_id)
        .bind(&log.session_id)
        .bind(&log.mood)
        .bind(&log.reason)
        .bind(&log.date)
        .bind(&log.username)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn fetch(&self, filter: &LogFilter, order: LogOrder) -> Result<Vec<MoodLog>, sqlx::Error> {
        let order_by = match order {
            LogOrder::NewestFirst => "ORDER BY created_at DESC, id DESC",
            LogOrder::Insertion => "ORDER BY id ASC",
        };
        let sql = format!("{SELECT_FILTERED} {order_by}");

        let mut conn = self.pool.acquire().await?;
        sqlx::query_as::<_, MoodLog>(&sql)
            .bind(&filter.user_id)
            .bind(&filter.date_from)
            .bind(&filter.date_to)
            .fetch_all(&mut *conn)
            .await
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| ())
    }
}
