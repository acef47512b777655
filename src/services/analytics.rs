use crate::dto::AnalyticsResponse;
use crate::models::mood_log::MoodLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupBy {
    #[default]
    Day,
    Month,
    Year,
}

impl GroupBy {
    /// Unrecognised values group by day rather than being rejected.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("month") => GroupBy::Month,
            Some("year") => GroupBy::Year,
            _ => GroupBy::Day,
        }
    }

    /// Prefix of a `YYYY-MM-DD` string; shorter strings are used whole.
    pub fn bucket_label(self, date: &str) -> &str {
        let len = match self {
            GroupBy::Day => return date,
            GroupBy::Month => 7,
            GroupBy::Year => 4,
        };
        match date.char_indices().nth(len) {
            Some((idx, _)) => &date[..idx],
            None => date,
        }
    }
}

/// Buckets every row; reasons and moods only when non-empty.
pub fn aggregate(rows: &[MoodLog], group_by: GroupBy) -> AnalyticsResponse {
    let mut out = AnalyticsResponse::default();

    for row in rows {
        *out
            .buckets
            .entry(group_by.bucket_label(&row.date).to_string())
            .or_insert(0) += 1;

        if !row.reason.is_empty() {
            out.reasons.push(row.reason.clone());
        }
        if !row.mood.is_empty() {
            *out.top_moods.entry(row.mood.clone()).or_insert(0) += 1;
        }
    }

    out
}
