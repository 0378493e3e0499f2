use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use softmatch::config::Config;
use softmatch::model::traits::EmbeddingModel;
use softmatch::model::word2vec::Word2VecModel;
use softmatch::output::terminal;
use softmatch::scoring::snippets::SnippetDocument;
use softmatch::topics::document::TopicTermsDocument;
use softmatch::topics::generate_with_progress;
use softmatch::topics::spec::{load_topics, normalize_term, TopicSpec};

/// Softmatch: expand seed terms into weighted topic vocabularies.
///
/// Grows each topic's hand-written seed terms through word embedding
/// neighbors, groups near-synonyms, and scores text snippets against the
/// result.
#[derive(Parser)]
#[command(name = "softmatch", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand topic seed terms and write the topic-terms document
    Expand {
        /// Topics document (default: SOFTMATCH_TOPICS_FILE or ./topics.yml)
        #[arg(long)]
        topics: Option<PathBuf>,

        /// Word2vec model file (default: SOFTMATCH_MODEL_PATH)
        #[arg(long)]
        model: Option<PathBuf>,

        /// Allow a term to appear in at most one topic
        #[arg(long)]
        enforce_disjoint_terms: bool,

        /// Write the document here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Print a per-topic summary to stderr
        #[arg(long)]
        summary: bool,
    },

    /// Add topic probabilities to a snippet document
    Score {
        /// Topic-terms document produced by `softmatch expand`
        topic_map: PathBuf,

        /// Snippet document to read instead of stdin
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Show the nearest neighbors of a term in the model
    Neighbors {
        /// Term or phrase to look up (normalized like a seed)
        term: String,

        /// Word2vec model file (default: SOFTMATCH_MODEL_PATH)
        #[arg(long)]
        model: Option<PathBuf>,

        /// Number of neighbors to show (default: 20)
        #[arg(long, default_value = "20")]
        top: usize,
    },
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Logs go to stderr; stdout is reserved for JSON output
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("softmatch=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Expand {
            topics,
            model,
            enforce_disjoint_terms,
            output,
            summary,
        } => {
            let config = Config::load().with_overrides(
                topics.as_deref(),
                model.as_deref(),
                enforce_disjoint_terms,
            );
            config.require_model()?;

            let topics = load_topics(&config.topics_file)?;
            let model = Word2VecModel::load(&config.model_path)?;

            let doc = expand_all(&topics, &model, config.enforce_disjoint_terms)?;

            let json = serde_json::to_string_pretty(&doc)?;
            match output {
                Some(path) => {
                    fs::write(&path, json + "\n")
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!(path = %path.display(), terms = doc.term_count(), "Wrote topic terms");
                }
                None => println!("{json}"),
            }

            if summary {
                terminal::display_expansion_summary(&doc);
            }
        }

        Commands::Score { topic_map, input } => {
            let term_to_topics = TopicTermsDocument::load(&topic_map)?.term_to_topics();

            let raw = read_input(input.as_deref())?;
            let mut doc: SnippetDocument =
                serde_json::from_str(&raw).context("Failed to parse snippet document")?;
            doc.annotate(&term_to_topics);

            println!("{}", serde_json::to_string(&doc)?);
        }

        Commands::Neighbors { term, model, top } => {
            let config = Config::load().with_overrides(None, model.as_deref(), false);
            config.require_model()?;
            let model = Word2VecModel::load(&config.model_path)?;

            let term = normalize_term(&term);
            let neighbors = model.neighbors(&term, top);
            terminal::display_neighbors(&term, &neighbors);
        }
    }

    Ok(())
}

/// Expand every topic with a progress bar, then rank all records together.
fn expand_all(
    topics: &[TopicSpec],
    model: &Word2VecModel,
    enforce_disjoint: bool,
) -> Result<TopicTermsDocument> {
    eprintln!(
        "Expanding {} topics against a {}-term vocabulary...",
        topics.len(),
        model.vocab_size()
    );

    let pb = ProgressBar::new(topics.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Topics [{bar:30}] {pos}/{len} {msg}")
            .context("Invalid progress bar template")?,
    );

    let doc = generate_with_progress(topics, model, enforce_disjoint, |topic| {
        pb.set_message(topic.id.clone());
        pb.inc(1);
    });
    pb.finish_and_clear();

    if enforce_disjoint {
        eprintln!("{}", "Disjoint terms enforced: each term kept in one topic.".dimmed());
    }

    Ok(doc)
}

/// Read the whole input from a file, or from stdin when no path is given.
fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut raw = String::new();
            io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read snippet document from stdin")?;
            Ok(raw)
        }
    }
}
