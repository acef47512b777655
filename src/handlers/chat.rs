use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::Utc;
use validator::Validate;

use crate::dto::{ChatRequest, ChatResponse};
use crate::error::{AppError, AppResult};
use crate::models::mood_log::NewMoodLog;
use crate::services::identity;
use crate::AppState;

pub async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<Json<ChatResponse>> {
    let Json(body) = body?;
    body.validate()?;

    let user_id = identity::resolve(body.user_id, identity::generate_user_id);
    let session_id = identity::resolve(body.session_id, identity::generate_session_id);

    let outcome = state
        .flow
        .handle(&user_id, &session_id, &body.message)
        .await
        .map_err(AppError::FlowEngine)?;

    let username = outcome.extra.username().map(String::from);

    // Every turn is logged, however much the flow engine inferred.
    let log = state
        .store
        .append(NewMoodLog::from_turn(
            user_id,
            session_id,
            &body.message,
            outcome.mood.as_deref(),
            outcome.reason.as_deref(),
            username.as_deref(),
            Utc::now().date_naive(),
        ))
        .await?;

    tracing::info!(
        user_id = %log.user_id,
        session_id = %log.session_id,
        stage = %outcome.stage,
        mood = %log.mood,
        "Chat turn logged"
    );

    Ok(Json(ChatResponse {
        reply: outcome.reply,
        stage: outcome.stage,
        user_id: log.user_id,
        session_id: log.session_id,
        username,
    }))
}
