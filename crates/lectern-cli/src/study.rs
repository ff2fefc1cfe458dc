//! Interactive study session loop

use colored::*;

use lectern_core::{GenerationProvider, Result, RetrievalConfig, TurnKind};
use lectern_rag::{AnswerComposer, Retriever, StudySession};

use crate::ui;

/// How many prior turns are threaded into each prompt.
const CONTEXT_TURNS: usize = 6;

/// Run the interactive study session until the user exits.
pub async fn run_study_session<G: GenerationProvider>(
    retriever: &Retriever,
    composer: &AnswerComposer<G>,
    retrieval: &RetrievalConfig,
) -> Result<()> {
    ui::display_banner();
    println!(
        "{}",
        "Ask me anything about your course content. I'll remember the conversation for follow-ups."
            .dimmed()
    );

    let mut session = StudySession::new();
    let mut input_history: Vec<String> = Vec::new();

    loop {
        println!("{}", "─".repeat(60).dimmed());
        let input = ui::handle_input_with_history(&mut input_history)?;

        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "exit" | "quit" | "q" => {
                show_session_stats(&session);
                println!("\n{}", "Good luck with your coursework!".green());
                return Ok(());
            }
            "help" => {
                ui::print_help();
                continue;
            }
            "stats" => {
                show_session_stats(&session);
                continue;
            }
            "history" => {
                show_history(&session, 5);
                continue;
            }
            "topics" => {
                ui::render_index_stats(&retriever.snapshot().stats());
                continue;
            }
            "clear" => {
                session.clear();
                println!("{}", "Conversation history cleared".green());
                continue;
            }
            _ => {}
        }

        println!("{}", "Searching course content...".dimmed());
        match retriever.search(&input, retrieval).await {
            Ok(results) => {
                let answer = composer
                    .answer(&input, &results, session.recent_context(CONTEXT_TURNS))
                    .await;

                session.record_question(&input, answer.relevant_lectures.clone());
                session.record_answer(&answer.text, answer.sources_used);

                ui::render_answer(&answer, session.history().len());
            }
            Err(e) => {
                // A single bad query (e.g. an embedding space mismatch) is
                // fatal for that query, not for the session.
                println!("{} {}", "Search failed:".red(), e);
            }
        }
    }
}

fn show_session_stats(session: &StudySession) {
    let stats = session.stats();
    let duration = chrono::Utc::now() - stats.started_at;

    println!("\n{}", "Study session stats".bold());
    println!("{}", "─".repeat(40));
    println!("  duration:   {}m {}s", duration.num_minutes(), duration.num_seconds() % 60);
    println!("  questions:  {}", stats.questions_asked);
    println!("  exchanges:  {}", stats.exchanges);
    if !stats.topics_covered.is_empty() {
        let topics: Vec<&str> = stats.topics_covered.iter().map(String::as_str).collect();
        println!("  topics:     {}", topics.join(", "));
    }
}

fn show_history(session: &StudySession, last_n: usize) {
    println!("\n{}", format!("Recent conversation (last {last_n})").bold());
    println!("{}", "─".repeat(50));

    // Both halves of each exchange.
    for turn in session.recent_context(last_n * 2) {
        let timestamp = turn.timestamp.format("%H:%M");
        match turn.kind {
            TurnKind::Question => {
                println!("[{}] {} {}", timestamp, "You:".green(), turn.text);
            }
            TurnKind::Answer => {
                let preview: String = turn.text.chars().take(100).collect();
                println!("[{}] {} {}...", timestamp, "Tutor:".blue(), preview);
            }
        }
        println!();
    }
}
