//! Study session manager
//!
//! Maintains the rolling conversation history of one interactive study
//! session so follow-up questions can be answered in context. Holds no
//! embeddings and does no ranking; clearing the history never touches the
//! vector store.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use lectern_core::{ConversationTurn, TurnKind};

/// Statistics for the current session.
#[derive(Debug, Clone)]
pub struct SessionStats {
    pub started_at: DateTime<Utc>,
    pub questions_asked: usize,
    pub exchanges: usize,
    pub topics_covered: BTreeSet<String>,
}

/// Append-only conversation history for one session.
///
/// History lives in memory only; a process restart or an explicit
/// [`clear`](StudySession::clear) resets it to empty.
pub struct StudySession {
    started_at: DateTime<Utc>,
    history: Vec<ConversationTurn>,
}

impl StudySession {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            history: Vec::new(),
        }
    }

    pub fn record_question(&mut self, text: impl Into<String>, relevant_lectures: Vec<String>) {
        self.history
            .push(ConversationTurn::question(text, relevant_lectures));
    }

    pub fn record_answer(&mut self, text: impl Into<String>, source_count: usize) {
        self.history.push(ConversationTurn::answer(text, source_count));
    }

    /// The last `n` turns, oldest first; fewer if the history is shorter.
    pub fn recent_context(&self, n: usize) -> &[ConversationTurn] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn stats(&self) -> SessionStats {
        let questions_asked = self
            .history
            .iter()
            .filter(|t| t.kind == TurnKind::Question)
            .count();
        let topics_covered = self
            .history
            .iter()
            .filter(|t| t.kind == TurnKind::Question)
            .flat_map(|t| t.relevant_lectures.iter().cloned())
            .collect();

        SessionStats {
            started_at: self.started_at,
            questions_asked,
            exchanges: self.history.len(),
            topics_covered,
        }
    }
}

impl Default for StudySession {
    fn default() -> Self {
        Self::new()
    }
}
