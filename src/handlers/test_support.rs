//! Shared fixtures for handler tests: memory-backed state and canned flow engines.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use crate::config::Config;
use crate::db::{MemoryMoodLogStore, MoodLogStore};
use crate::models::mood_log::{LogFilter, LogOrder, MoodLog, NewMoodLog};
use crate::services::flow::{FlowEngine, FlowOutcome};
use crate::AppState;

/// Returns the same outcome for every message.
pub struct ScriptedFlow {
    outcome: FlowOutcome,
}

impl ScriptedFlow {
    pub fn new(outcome: FlowOutcome) -> Self {
        Self { outcome }
    }
}

impl Default for ScriptedFlow {
    fn default() -> Self {
        Self::new(FlowOutcome {
            reply: "How are you feeling today?".into(),
            stage: "ask_mood".into(),
            ..Default::default()
        })
    }
}

#[async_trait]
impl FlowEngine for ScriptedFlow {
    async fn handle(&self, _: &str, _: &str, _: &str) -> anyhow::Result<FlowOutcome> {
        Ok(self.outcome.clone())
    }
}

pub struct FailingFlow;

#[async_trait]
impl FlowEngine for FailingFlow {
    async fn handle(&self, _: &str, _: &str, _: &str) -> anyhow::Result<FlowOutcome> {
        anyhow::bail!("flow engine unavailable")
    }
}

/// Every call fails the way an exhausted pool does.
pub struct FailingStore;

#[async_trait]
impl MoodLogStore for FailingStore {
    async fn append(&self, _: NewMoodLog) -> Result<MoodLog, sqlx::Error> {
        Err(sqlx::Error::PoolTimedOut)
    }

    async fn fetch(&self, _: &LogFilter, _: LogOrder) -> Result<Vec<MoodLog>, sqlx::Error> {
        Err(sqlx::Error::PoolTimedOut)
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        Err(sqlx::Error::PoolTimedOut)
    }
}

pub fn test_state(flow: impl FlowEngine + 'static) -> (AppState, MemoryMoodLogStore) {
    let store = MemoryMoodLogStore::new();
    let state = test_state_with_store(flow, store.clone());
    (state, store)
}

pub fn test_state_with_store(
    flow: impl FlowEngine + 'static,
    store: impl MoodLogStore + 'static,
) -> AppState {
    AppState {
        config: Arc::new(Config::for_tests()),
        store: Arc::new(store),
        flow: Arc::new(flow),
    }
}

pub async fn seed(store: &MemoryMoodLogStore, user_id: &str, date: &str, mood: &str, reason: &str) {
    store
        .append(NewMoodLog {
            user_id: user_id.into(),
            session_id: "sess_seed".into(),
            mood: mood.into(),
            reason: reason.into(),
            date: date.into(),
            username: "Anonymous".into(),
        })
        .await
        .unwrap();
}

pub async fn get(state: AppState, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(state, request).await
}

pub async fn post_json(state: AppState, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(state, request).await
}

async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = crate::app(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}
