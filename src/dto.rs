//! # Mood Journal — Request/Response DTOs
//!
//! All API contract types in one module.
//!
//! Conventions:
//! - `*Request`  → deserialized from client JSON body
//! - `*Query`    → deserialized from query params
//! - `*Response` → serialized to client JSON
//! - Validation is expressed via `validator` derive macros

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::mood_log::LogFilter;

// ============================================================================
// Chat
// ============================================================================

/// POST /chat
#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(max = 5000, message = "Message must be under 5000 characters"))]
    pub message: String,

    /// Generated as `user_<8 hex>` when missing or empty
    #[validate(length(max = 128, message = "user_id must be under 128 characters"))]
    pub user_id: Option<String>,

    /// Generated as `sess_<8 hex>` when missing or empty
    #[validate(length(max = 128, message = "session_id must be under 128 characters"))]
    pub session_id: Option<String>,
}

/// Response for POST /chat
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub stage: String,
    pub user_id: String,
    pub session_id: String,
    /// Whatever the flow engine reported; null when it reported nothing
    pub username: Option<String>,
}

// ============================================================================
// Analytics
// ============================================================================

/// GET /analytics query params
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    /// "day", "month" or "year". Anything else groups by day. Default: "day"
    pub group_by: Option<String>,

    #[serde(flatten)]
    pub filter: LogFilter,
}

/// Response for GET /analytics
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    /// Bucket label → number of log entries
    pub buckets: BTreeMap<String, i64>,
    /// Non-empty reasons in retrieval order
    pub reasons: Vec<String>,
    /// Non-empty mood → number of log entries
    pub top_moods: BTreeMap<String, i64>,
}

// ============================================================================
// System
// ============================================================================

/// GET /health
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}
