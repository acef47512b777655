use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const UNKNOWN_MOOD: &str = "unknown";
pub const ANONYMOUS_USERNAME: &str = "Anonymous";

/// One persisted chat turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MoodLog {
    #[serde(skip)]
    pub id: i64,
    pub user_id: String,
    pub session_id: String,
    pub mood: String,
    pub reason: String,
    /// `YYYY-MM-DD`, compared as a plain string by every filter.
    pub date: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// A row ready for insertion; `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewMoodLog {
    pub user_id: String,
    pub session_id: String,
    pub mood: String,
    pub reason: String,
    pub date: String,
    pub username: String,
}

impl NewMoodLog {
    /// Applies the logging defaults to whatever the flow engine produced.
    pub fn from_turn(
        user_id: String,
        session_id: String,
        message: &str,
        mood: Option<&str>,
        reason: Option<&str>,
        username: Option<&str>,
        today: chrono::NaiveDate,
    ) -> Self {
        Self {
            user_id,
            session_id,
            mood: non_empty(mood).unwrap_or(UNKNOWN_MOOD).to_string(),
            reason: non_empty(reason).unwrap_or(message).to_string(),
            date: today.format("%Y-%m-%d").to_string(),
            username: non_empty(username).unwrap_or(ANONYMOUS_USERNAME).to_string(),
        }
    }
}

/// Query-string filters shared by `/logs` and `/analytics`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogFilter {
    pub user_id: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl LogFilter {
    /// Empty query values behave as if the parameter were not given.
    pub fn normalized(self) -> Self {
        Self {
            user_id: self.user_id.filter(|s| !s.is_empty()),
            date_from: self.date_from.filter(|s| !s.is_empty()),
            date_to: self.date_to.filter(|s| !s.is_empty()),
        }
    }

    /// Byte-wise string comparison, inclusive on both ends.
    pub fn matches(&self, log: &MoodLog) -> bool {
        if let Some(user_id) = &self.user_id {
            if &log.user_id != user_id {
                return false;
            }
        }
        if let Some(from) = &self.date_from {
            if log.date.as_str() < from.as_str() {
                return false;
            }
        }
        if let Some(to) = &self.date_to {
            if log.date.as_str() > to.as_str() {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOrder {
    /// `created_at` descending, most recent insert first on ties.
    NewestFirst,
    /// Order rows were written in.
    Insertion,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
