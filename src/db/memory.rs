use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::db::MoodLogStore;
use crate::models::mood_log::{LogFilter, LogOrder, MoodLog, NewMoodLog};

/// In-process store used when no `DATABASE_URL` is configured.
/// Rows live only as long as the process.
#[derive(Clone, Default)]
pub struct MemoryMoodLogStore {
    rows: Arc<Mutex<Vec<MoodLog>>>,
}

impl MemoryMoodLogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MoodLogStore for MemoryMoodLogStore {
    async fn append(&self, log: NewMoodLog) -> Result<MoodLog, sqlx::Error> {
        let mut rows = self.rows.lock().await;
        let row = MoodLog {
            id: rows.len() as i64 + 1,
            user_id: log.user_id,
            session_id: log.session_id,
            mood: log.mood,
            reason: log.reason,
            date: log.date,
            username: log.username,
            created_at: Utc::now(),
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn fetch(&self, filter: &LogFilter, order: LogOrder) -> Result<Vec<MoodLog>, sqlx::Error> {
        let rows = self.rows.lock().await;
        let mut matching: Vec<MoodLog> = rows.iter().filter(|r| filter.matches(r)).cloned().collect();

        if order == LogOrder::NewestFirst {
            matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        }
        Ok(matching)
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(user_id: &str, date: &str) -> NewMoodLog {
        NewMoodLog {
            user_id: user_id.into(),
            session_id: "sess_00000001".into(),
            mood: "calm".into(),
            reason: "tea".into(),
            date: date.into(),
            username: "Anonymous".into(),
        }
    }

    #[tokio::test]
    async fn test_append_assigns_increasing_ids() {
        let store = MemoryMoodLogStore::new();
        let first = store.append(entry("user_a", "2024-01-01")).await.unwrap();
        let second = store.append(entry("user_a", "2024-01-02")).await.unwrap();
        assert!(second.id > first.id);
        assert!(second.created_at >= first.created_at);
    }

    #[tokio::test]
    async fn test_fetch_newest_first() {
        let store = MemoryMoodLogStore::new();
        for date in ["2024-01-01", "2024-01-02", "2024-01-03"] {
            store.append(entry("user_a", date)).await.unwrap();
        }

        let rows = store
            .fetch(&LogFilter::default(), LogOrder::NewestFirst)
            .await
            .unwrap();
        let dates: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-03", "2024-01-02", "2024-01-01"]);
    }

    #[tokio::test]
    async fn test_fetch_insertion_order() {
        let store = MemoryMoodLogStore::new();
        for date in ["2024-03-01", "2024-01-01", "2024-02-01"] {
            store.append(entry("user_a", date)).await.unwrap();
        }

        let rows = store
            .fetch(&LogFilter::default(), LogOrder::Insertion)
            .await
            .unwrap();
        let dates: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-03-01", "2024-01-01", "2024-02-01"]);
    }

    #[tokio::test]
    async fn test_fetch_applies_filter() {
        let store = MemoryMoodLogStore::new();
        store.append(entry("user_a", "2024-01-10")).await.unwrap();
        store.append(entry("user_b", "2024-01-10")).await.unwrap();
        store.append(entry("user_a", "2024-02-10")).await.unwrap();

        let filter = LogFilter {
            user_id: Some("user_a".into()),
            date_from: Some("2024-01-01".into()),
            date_to: Some("2024-01-31".into()),
        };
        let rows = store.fetch(&filter, LogOrder::NewestFirst).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, "user_a");
        assert_eq!(rows[0].date, "2024-01-10");
    }
}
