use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};

use crate::error::AppResult;
use crate::models::mood_log::{LogFilter, LogOrder, MoodLog};
use crate::AppState;

pub async fn list_logs(
    State(state): State<AppState>,
    query: Result<Query<LogFilter>, QueryRejection>,
) -> AppResult<Json<Vec<MoodLog>>> {
    let Query(filter) = query?;
    let filter = filter.normalized();
    let logs = state.store.fetch(&filter, LogOrder::NewestFirst).await?;
    Ok(Json(logs))
}
