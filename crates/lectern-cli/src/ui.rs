//! UI utilities for the CLI

use colored::*;
use crossterm::{
    event::{self, Event, KeyCode},
    terminal::{disable_raw_mode, enable_raw_mode, size},
};
use std::io::{self, IsTerminal, Write};

use lectern_core::Result;
use lectern_rag::{ComposedAnswer, IndexStats};

/// Display the startup banner.
pub fn display_banner() {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = std::cmp::min(64, terminal_width.saturating_sub(4));

    let top_border = format!("┌{}┐", "─".repeat(banner_width - 2));
    let bottom_border = format!("└{}┘", "─".repeat(banner_width - 2));
    let empty_line = format!("│{}│", " ".repeat(banner_width - 2));

    println!();
    println!("{}", top_border.blue());
    println!("{}", empty_line.blue());

    let lines = [
        "Lectern - course material study assistant",
        "",
        "Ask questions about your lecture notes in plain language.",
        "Follow-ups keep the conversation context.",
    ];
    for line in lines {
        if line.is_empty() {
            println!("{}", empty_line.blue());
        } else {
            let pad = banner_width.saturating_sub(line.chars().count() + 4);
            println!("{}", format!("│  {}{}│", line, " ".repeat(pad)).blue());
        }
    }

    println!("{}", empty_line.blue());
    println!("{}", bottom_border.blue());
    println!();
    println!("{}", "Tip: type a question, or 'help' for commands".dimmed());
    println!();
}

/// Display help for the interactive session.
pub fn print_help() {
    println!("{}", "Available commands:".bold());
    println!("  {} - ask any question about the course content", "<question>".green());
    println!("  {} - show study session statistics", "stats".green());
    println!("  {} - show the recent conversation", "history".green());
    println!("  {} - list indexed lecture topics", "topics".green());
    println!("  {} - clear the conversation history", "clear".green());
    println!("  {} - show this help message", "help".green());
    println!("  {} - end the study session", "exit/quit".green());
}

/// Handle input with command history navigation.
pub fn handle_input_with_history(history: &mut Vec<String>) -> Result<String> {
    // Piped input is read line by line; EOF ends the session.
    if !io::stdin().is_terminal() {
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok("exit".to_string());
        }
        let input = input.trim().to_string();
        if !input.is_empty() {
            history.push(input.clone());
        }
        return Ok(input);
    }

    enable_raw_mode()?;
    let mut input = String::new();
    let mut history_index: Option<usize> = None;
    let mut cursor_pos = 0;

    print!("{} ", "lectern>".green().bold());
    io::stdout().flush()?;

    loop {
        if let Event::Key(key_event) = event::read()? {
            match key_event.code {
                KeyCode::Enter => {
                    disable_raw_mode()?;
                    println!();
                    if !input.is_empty() {
                        history.push(input.clone());
                    }
                    return Ok(input);
                }
                KeyCode::Char(c) => {
                    input.insert(cursor_pos, c);
                    cursor_pos += 1;
                    print!("\r{} {}", "lectern>".green().bold(), input);
                    io::stdout().flush()?;
                }
                KeyCode::Backspace => {
                    if cursor_pos > 0 {
                        input.remove(cursor_pos - 1);
                        cursor_pos -= 1;
                        print!(
                            "\r{} {}  \r{} {}",
                            "lectern>".green().bold(),
                            input,
                            "lectern>".green().bold(),
                            input
                        );
                        io::stdout().flush()?;
                    }
                }
                KeyCode::Up => {
                    if !history.is_empty() {
                        let new_index = match history_index {
                            None => history.len() - 1,
                            Some(idx) if idx > 0 => idx - 1,
                            Some(idx) => idx,
                        };
                        history_index = Some(new_index);
                        input = history[new_index].clone();
                        cursor_pos = input.len();
                        print!(
                            "\r{} {}  \r{} {}",
                            "lectern>".green().bold(),
                            " ".repeat(50),
                            "lectern>".green().bold(),
                            input
                        );
                        io::stdout().flush()?;
                    }
                }
                KeyCode::Down => {
                    if let Some(idx) = history_index {
                        if idx < history.len() - 1 {
                            let new_index = idx + 1;
                            history_index = Some(new_index);
                            input = history[new_index].clone();
                        } else {
                            history_index = None;
                            input.clear();
                        }
                        cursor_pos = input.len();
                        print!(
                            "\r{} {}  \r{} {}",
                            "lectern>".green().bold(),
                            " ".repeat(50),
                            "lectern>".green().bold(),
                            input
                        );
                        io::stdout().flush()?;
                    }
                }
                KeyCode::Esc => {
                    disable_raw_mode()?;
                    println!();
                    return Ok(String::new());
                }
                _ => {}
            }
        }
    }
}

/// Render a composed answer with its source attribution.
pub fn render_answer(answer: &ComposedAnswer, exchanges: usize) {
    println!("\n{}", "Answer:".bold());
    println!("{}", "─".repeat(40));
    if answer.degraded {
        println!("{}", answer.text.yellow());
    } else {
        println!("{}", answer.text);
    }
    println!("{}", "─".repeat(40));

    if answer.sources_used > 0 {
        println!(
            "{} {}",
            "Referenced:".dimmed(),
            answer.relevant_lectures.join(", ")
        );
    } else {
        println!("{}", "Not based on specific course content".yellow());
    }
    if exchanges > 0 {
        println!("{} {}", "Conversation exchanges:".dimmed(), exchanges);
    }
}

/// Render index statistics.
pub fn render_index_stats(stats: &IndexStats) {
    println!("{}", "Index statistics".bold());
    println!("{}", "─".repeat(30));
    println!("  chunks:   {}", stats.chunk_count);
    println!("  lectures: {}", stats.lecture_count);
    if !stats.per_lecture.is_empty() {
        println!("  per lecture:");
        for (lecture, count) in &stats.per_lecture {
            println!("    {} {} {}", "•".blue(), lecture, format!("({count} chunks)").dimmed());
        }
    }
    if !stats.per_kind.is_empty() {
        println!("  per kind:");
        for (kind, count) in &stats.per_kind {
            println!("    {} {} {}", "•".blue(), kind, format!("({count})").dimmed());
        }
    }
}
