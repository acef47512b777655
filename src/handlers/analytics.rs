use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};

use crate::dto::{AnalyticsQuery, AnalyticsResponse};
use crate::error::AppResult;
use crate::models::mood_log::LogOrder;
use crate::services::analytics::{aggregate, GroupBy};
use crate::AppState;

pub async fn get_analytics(
    State(state): State<AppState>,
    query: Result<Query<AnalyticsQuery>, QueryRejection>,
) -> AppResult<Json<AnalyticsResponse>> {
    let Query(query) = query?;
    let group_by = GroupBy::parse(query.group_by.as_deref());
    let filter = query.filter.normalized();

    let rows = state.store.fetch(&filter, LogOrder::Insertion).await?;
    tracing::debug!(rows = rows.len(), group_by = ?group_by, "Aggregating mood logs");

    Ok(Json(aggregate(&rows, group_by)))
}
