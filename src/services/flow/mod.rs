//! The conversational flow engine turns one chat message into a reply plus
//! whatever mood metadata it could infer. The chat handler only depends on the
//! [`FlowEngine`] trait; which implementation runs is decided at startup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod keyword;
pub mod remote;

pub use keyword::KeywordFlowEngine;
pub use remote::RemoteFlowEngine;

#[async_trait]
pub trait FlowEngine: Send + Sync {
    /// Errors are surfaced to the caller as-is; nothing is logged for the turn.
    async fn handle(
        &self,
        user_id: &str,
        session_id: &str,
        message: &str,
    ) -> anyhow::Result<FlowOutcome>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowOutcome {
    pub reply: String,
    pub stage: String,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub extra: FlowExtra,
}

/// Open-ended metadata attached to a turn. Only `username` has a meaning here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowExtra(pub Map<String, Value>);

impl FlowExtra {
    pub fn with_username(username: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert("username".into(), Value::String(username.into()));
        Self(map)
    }

    /// Non-string values are ignored.
    pub fn username(&self) -> Option<&str> {
        self.0.get("username").and_then(Value::as_str)
    }
}
