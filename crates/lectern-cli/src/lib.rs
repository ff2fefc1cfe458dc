//! Terminal interface for the Lectern study assistant

mod study;
mod ui;

pub use study::run_study_session;
pub use ui::{display_banner, handle_input_with_history, print_help, render_answer, render_index_stats};

// Re-export core types
pub use lectern_core::{Error, Result};
