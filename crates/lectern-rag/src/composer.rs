//! Answer composer
//!
//! Turns retrieved chunks plus recent conversation context into a prompt for
//! the generation provider. Generation failures are converted into a
//! degraded, user-visible answer; an interactive session never crashes
//! because the model was unreachable.

use lectern_core::{ConversationTurn, GenerationProvider, ScoredChunk, TurnKind};

/// How many characters of a previous answer are quoted back as context.
const CONTEXT_ANSWER_CHARS: usize = 200;

/// A composed answer with its provenance.
#[derive(Debug, Clone)]
pub struct ComposedAnswer {
    pub text: String,
    pub sources_used: usize,
    pub relevant_lectures: Vec<String>,
    /// True when the generation provider failed and `text` explains the
    /// failure instead of answering.
    pub degraded: bool,
}

/// Builds tutor-style prompts and calls the generation provider.
pub struct AnswerComposer<G: GenerationProvider> {
    provider: G,
}

impl<G: GenerationProvider> AnswerComposer<G> {
    pub fn new(provider: G) -> Self {
        Self { provider }
    }

    /// Answer `question` from the ranked `results` and recent `history`.
    pub async fn answer(
        &self,
        question: &str,
        results: &[ScoredChunk],
        history: &[ConversationTurn],
    ) -> ComposedAnswer {
        let relevant_lectures = lectures_in_rank_order(results);
        let prompt = build_prompt(question, results, history);

        match self.provider.generate(&prompt).await {
            Ok(text) => ComposedAnswer {
                text,
                sources_used: results.len(),
                relevant_lectures,
                degraded: false,
            },
            Err(e) => {
                let mut text = format!(
                    "Sorry, I couldn't generate an answer: {e}. The course material itself was searched successfully"
                );
                if relevant_lectures.is_empty() {
                    text.push('.');
                } else {
                    text.push_str(&format!(
                        ", and the most relevant passages came from: {}.",
                        relevant_lectures.join(", ")
                    ));
                }
                ComposedAnswer {
                    text,
                    sources_used: results.len(),
                    relevant_lectures,
                    degraded: true,
                }
            }
        }
    }
}

fn lectures_in_rank_order(results: &[ScoredChunk]) -> Vec<String> {
    let mut lectures = Vec::new();
    for result in results {
        if !lectures.contains(&result.chunk.lecture) {
            lectures.push(result.chunk.lecture.clone());
        }
    }
    lectures
}

fn build_prompt(question: &str, results: &[ScoredChunk], history: &[ConversationTurn]) -> String {
    let mut context_parts = Vec::new();
    for turn in history {
        match turn.kind {
            TurnKind::Question => context_parts.push(format!("Previous Q: {}", turn.text)),
            TurnKind::Answer => {
                let quoted: String = turn.text.chars().take(CONTEXT_ANSWER_CHARS).collect();
                context_parts.push(format!("Previous A: {quoted}..."));
            }
        }
    }
    let context_summary = context_parts.join(" | ");

    if results.is_empty() {
        return format!(
            "You are a helpful course tutor having a conversation with a student.\n\n\
             CONVERSATION CONTEXT:\n{context_summary}\n\n\
             CURRENT QUESTION: {question}\n\n\
             There is no specific course content for this question. Give a helpful \
             general answer, note that it is not based on the course materials, and \
             encourage follow-up questions."
        );
    }

    let content_context = results
        .iter()
        .map(|r| {
            format!(
                "From {} ({}): {}",
                r.chunk.lecture,
                r.chunk.kind.as_str(),
                r.chunk.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are a helpful course tutor having a conversation with a student.\n\n\
         CONVERSATION CONTEXT:\n{context_summary}\n\n\
         CURRENT QUESTION: {question}\n\n\
         RELEVANT COURSE CONTENT:\n{content_context}\n\n\
         Please provide a helpful, conversational answer that:\n\
         1. Directly addresses the current question\n\
         2. References the conversation context if relevant\n\
         3. Uses the course content to support your explanation\n\
         4. Encourages follow-up questions\n\n\
         If this seems like a follow-up question, acknowledge the connection to \
         previous topics."
    )
}
