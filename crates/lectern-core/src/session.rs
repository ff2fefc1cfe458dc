//! Conversation turn records
//!
//! Turn history is owned by the session manager in `lectern-rag`; only the
//! record type lives here so the answer composer can consume turns without
//! depending on the session implementation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which side of the exchange a turn records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    Question,
    Answer,
}

/// One recorded exchange half within a study session.
///
/// Questions carry the set of lectures judged relevant; answers carry how
/// many source chunks backed them. History is append-only for the life of a
/// session and is never persisted across sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub kind: TurnKind,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Lectures judged relevant; populated for questions, empty for answers.
    pub relevant_lectures: Vec<String>,
    /// Source chunks backing the answer; zero for questions.
    pub source_count: usize,
}

impl ConversationTurn {
    pub fn question(text: impl Into<String>, relevant_lectures: Vec<String>) -> Self {
        Self {
            kind: TurnKind::Question,
            text: text.into(),
            timestamp: Utc::now(),
            relevant_lectures,
            source_count: 0,
        }
    }

    pub fn answer(text: impl Into<String>, source_count: usize) -> Self {
        Self {
            kind: TurnKind::Answer,
            text: text.into(),
            timestamp: Utc::now(),
            relevant_lectures: Vec::new(),
            source_count,
        }
    }
}
