use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;

use lectern_cli::{render_answer, render_index_stats, run_study_session};
use lectern_core::{EmbeddingProvider, RelevanceMode, RetrievalConfig};
use lectern_ollama::OllamaClient;
use lectern_rag::{
    AnswerComposer, CorpusLoad, HashingEmbedder, LectureCorpus, Retriever, Snapshot, VectorStore,
};

#[derive(Parser)]
#[command(name = "lectern")]
#[command(about = "Study assistant over your own lecture notes", long_about = None)]
struct Cli {
    /// Directory of per-lecture text files
    #[arg(long, default_value = "notes")]
    notes: PathBuf,

    /// Curated Markdown study guide to fold into the index
    #[arg(long)]
    guide: Option<PathBuf>,

    /// Directory holding the persisted index
    #[arg(long, default_value = "index")]
    data: PathBuf,

    /// Embed with the offline hashing embedder instead of Ollama
    #[arg(long)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build or refresh the index for the corpus
    Index {
        /// Rebuild even when the cached snapshot looks current
        #[arg(long)]
        force: bool,
    },
    /// Ask a single question against the index
    Ask {
        question: String,
        #[arg(long, default_value_t = 5)]
        top_k: usize,
        #[arg(long, value_enum, default_value_t = ModeArg::Semantic)]
        mode: ModeArg,
    },
    /// Show index statistics
    Stats,
    /// Start an interactive study session
    Study {
        #[arg(long, default_value_t = 5)]
        top_k: usize,
        #[arg(long, value_enum, default_value_t = ModeArg::Semantic)]
        mode: ModeArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Semantic,
    Keyword,
}

impl From<ModeArg> for RelevanceMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Semantic => RelevanceMode::Semantic,
            ModeArg::Keyword => RelevanceMode::Keyword,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let embedder: Arc<dyn EmbeddingProvider> = if cli.offline {
        Arc::new(HashingEmbedder::default())
    } else {
        Arc::new(OllamaClient::from_env()?)
    };

    match &cli.command {
        Command::Index { force } => {
            let snapshot = build_index(&cli, embedder.as_ref(), *force).await?;
            println!("{} indexed {} chunks", "✓".green(), snapshot.len());
            render_index_stats(&snapshot.stats());
        }
        Command::Ask {
            question,
            top_k,
            mode,
        } => {
            let snapshot = build_index(&cli, embedder.as_ref(), false).await?;
            let retrieval = RetrievalConfig {
                top_k: *top_k,
                mode: (*mode).into(),
                ..Default::default()
            };
            let retriever = Retriever::new(Arc::new(snapshot), embedder);

            let results = retriever.search(question, &retrieval).await?;
            if results.is_empty() {
                println!("{}", "No relevant course content found".yellow());
            }
            for result in &results {
                let excerpt: String = result.chunk.text.chars().take(120).collect();
                println!(
                    "{} {} {}",
                    format!("[{:.3}]", result.score).dimmed(),
                    format!("{} #{}", result.chunk.lecture, result.chunk.sequence_number).bold(),
                    excerpt
                );
            }

            let composer = AnswerComposer::new(OllamaClient::from_env()?);
            let answer = composer.answer(question, &results, &[]).await;
            render_answer(&answer, 0);
        }
        Command::Stats => {
            let store = VectorStore::new(&cli.data);
            match store.load()? {
                Some(snapshot) => render_index_stats(&snapshot.stats()),
                None => println!("{}", "No index found; run 'lectern index' first".yellow()),
            }
        }
        Command::Study { top_k, mode } => {
            let snapshot = build_index(&cli, embedder.as_ref(), false).await?;
            let retrieval = RetrievalConfig {
                top_k: *top_k,
                mode: (*mode).into(),
                ..Default::default()
            };
            let retriever = Retriever::new(Arc::new(snapshot), embedder);
            let composer = AnswerComposer::new(OllamaClient::from_env()?);

            run_study_session(&retriever, &composer, &retrieval).await?;
        }
    }

    Ok(())
}

/// Load the corpus and return a current snapshot, building one if needed.
async fn build_index(cli: &Cli, embedder: &dyn EmbeddingProvider, force: bool) -> Result<Snapshot> {
    let mut corpus = LectureCorpus::new(&cli.notes);
    if let Some(guide) = &cli.guide {
        corpus = corpus.with_guide(guide);
    }

    let CorpusLoad { chunks, failures } = corpus.load()?;
    for failure in &failures {
        eprintln!("{} {}", "warning:".yellow(), failure);
    }
    if chunks.is_empty() && failures.is_empty() {
        eprintln!(
            "{} no lecture text found under {}",
            "warning:".yellow(),
            cli.notes.display()
        );
    }

    let store = VectorStore::new(&cli.data);
    let snapshot = if force {
        let snapshot = store.build(chunks, embedder).await?;
        if let Err(e) = store.persist(&snapshot) {
            eprintln!("{} snapshot could not be persisted: {e}", "warning:".yellow());
        }
        snapshot
    } else {
        store.load_or_build(chunks, embedder).await?
    };

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }
}
