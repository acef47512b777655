use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{FlowEngine, FlowExtra, FlowOutcome};

pub const STAGE_ASK_MOOD: &str = "ask_mood";
pub const STAGE_ASK_REASON: &str = "ask_reason";
pub const STAGE_CLOSING: &str = "closing";

/// Word → mood it is recorded as.
const MOOD_WORDS: &[(&str, &str)] = &[
    ("happy", "happy"),
    ("glad", "happy"),
    ("great", "happy"),
    ("good", "happy"),
    ("cheerful", "happy"),
    ("joyful", "happy"),
    ("sad", "sad"),
    ("down", "sad"),
    ("unhappy", "sad"),
    ("depressed", "sad"),
    ("lonely", "sad"),
    ("angry", "angry"),
    ("mad", "angry"),
    ("furious", "angry"),
    ("annoyed", "angry"),
    ("irritated", "angry"),
    ("anxious", "anxious"),
    ("worried", "anxious"),
    ("nervous", "anxious"),
    ("scared", "anxious"),
    ("stressed", "stressed"),
    ("overwhelmed", "stressed"),
    ("tired", "tired"),
    ("exhausted", "tired"),
    ("sleepy", "tired"),
    ("drained", "tired"),
    ("calm", "calm"),
    ("relaxed", "calm"),
    ("peaceful", "calm"),
    ("content", "calm"),
    ("excited", "excited"),
    ("thrilled", "excited"),
];

const NAME_MARKERS: &[&str] = &["my name is ", "i'm called ", "im called ", "call me "];

/// Sessions untouched for this long are dropped by [`KeywordFlowEngine::cleanup`].
pub const SESSION_IDLE_TTL: Duration = Duration::from_secs(30 * 60);
const CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

struct SessionState {
    pending_mood: Option<String>,
    username: Option<String>,
    last_seen: Instant,
}

impl SessionState {
    fn new() -> Self {
        Self {
            pending_mood: None,
            username: None,
            last_seen: Instant::now(),
        }
    }
}

/// Built-in three-step flow: ask for a mood, ask what is behind it, close.
///
/// Session progress is held in memory only and keyed by session id. A session
/// is forgotten once it closes or after [`SESSION_IDLE_TTL`] without a message.
#[derive(Clone, Default)]
pub struct KeywordFlowEngine {
    sessions: Arc<Mutex<HashMap<String, SessionState>>>,
}

impl KeywordFlowEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops sessions idle for `idle` or longer.
    pub async fn cleanup(&self, idle: Duration) {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();
        let before = sessions.len();

        sessions.retain(|_, state| now.duration_since(state.last_seen) < idle);

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = sessions.len(), "Evicted idle flow sessions");
        }
    }

    /// Periodically evicts idle sessions for the life of the process.
    pub fn spawn_cleanup_worker(&self) {
        let engine = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                ticker.tick().await;
                engine.cleanup(SESSION_IDLE_TTL).await;
            }
        });
    }

    #[cfg(test)]
    async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[async_trait]
impl FlowEngine for KeywordFlowEngine {
    async fn handle(
        &self,
        user_id: &str,
        session_id: &str,
        message: &str,
    ) -> anyhow::Result<FlowOutcome> {
        let mut sessions = self.sessions.lock().await;
        let state = sessions
            .entry(session_id.to_string())
            .or_insert_with(SessionState::new);
        state.last_seen = Instant::now();

        if let Some(name) = extract_username(message) {
            state.username = Some(name);
        }
        let detected = detect_mood(message);

        let (reply, stage, mood, reason) = match (state.pending_mood.take(), detected) {
            (Some(mood), _) => (
                format!("Thank you for sharing. I've noted that you feel {mood}. Take care of yourself."),
                STAGE_CLOSING,
                Some(mood),
                Some(message.trim().to_string()),
            ),
            (None, Some(mood)) => {
                state.pending_mood = Some(mood.to_string());
                (
                    format!("It sounds like you're feeling {mood}. What do you think is behind it?"),
                    STAGE_ASK_REASON,
                    Some(mood.to_string()),
                    None,
                )
            }
            (None, None) => {
                let greeting = match &state.username {
                    Some(name) => format!("Hi {name}! How are you feeling today?"),
                    None => "Hi! How are you feeling today?".to_string(),
                };
                (greeting, STAGE_ASK_MOOD, None, None)
            }
        };

        let extra = state
            .username
            .clone()
            .map(FlowExtra::with_username)
            .unwrap_or_default();

        if stage == STAGE_CLOSING {
            sessions.remove(session_id);
        }

        tracing::debug!(user_id = %user_id, session_id = %session_id, stage = stage, "Keyword flow step");

        Ok(FlowOutcome {
            reply,
            stage: stage.to_string(),
            mood,
            reason,
            extra,
        })
    }
}

fn detect_mood(message: &str) -> Option<&'static str> {
    let lower = message.to_lowercase();
    lower
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .find_map(|word| {
            MOOD_WORDS
                .iter()
                .find(|(keyword, _)| *keyword == word)
                .map(|(_, mood)| *mood)
        })
}

fn extract_username(message: &str) -> Option<String> {
    // ASCII lowercasing keeps byte offsets aligned with `message`.
    let lower = message.to_ascii_lowercase();
    NAME_MARKERS.iter().find_map(|marker| {
        let start = lower.find(marker)? + marker.len();
        let name: String = message[start..]
            .trim_start()
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '-' || *c == '\'')
            .collect();
        (!name.is_empty()).then_some(name)
    })
}
