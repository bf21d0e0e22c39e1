//! Bilingual Book Aligner
//!
//! Pairs the chapters of two editions of a book, aligns their paragraphs
//! and writes the interleaved result. Progress is checkpointed, so an
//! interrupted run picks up where it stopped.

mod ingest;
mod translator;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use bitext::{
    AlignConfig, Book, Chapter, ChapterMatcher, CheckpointStore, CombinedBook, MatchConfig, Pipeline,
    PipelineConfig, SimilarityScorer,
};
use bitext_embed::EmbeddingModel;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use crate::ingest::BookReader;
use crate::translator::AzureTranslator;

/// Default checkpoint directory
fn default_checkpoint_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bitext")
        .join("checkpoints")
}

#[derive(Parser)]
#[command(name = "bitext-align")]
#[command(about = "Align two editions of a book paragraph by paragraph")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Checkpoint directory
    #[arg(short = 'C', long, env = "BITEXT_CHECKPOINT_DIR")]
    checkpoint_dir: Option<PathBuf>,
}

/// The two editions to work on.
#[derive(Args)]
struct BookPair {
    /// Source edition (JSON book or directory of chapter files)
    left: PathBuf,

    /// Target edition (JSON book or directory of chapter files)
    right: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Match chapters and align paragraphs
    Align {
        #[command(flatten)]
        books: BookPair,

        /// Directory with config.json, tokenizer.json and model.safetensors
        #[arg(short, long, env = "BITEXT_MODEL_DIR")]
        model_dir: PathBuf,

        /// Translate the source edition's chapter openings before matching
        #[arg(short, long)]
        translate: bool,

        /// Azure Translator subscription key
        #[arg(long, env = "BITEXT_TRANSLATOR_KEY")]
        translator_key: Option<String>,

        /// Azure Translator resource region
        #[arg(long, env = "BITEXT_TRANSLATOR_REGION", default_value = "eastus")]
        translator_region: String,

        /// Source language code
        #[arg(long, default_value = "en")]
        from: String,

        /// Target language code
        #[arg(long, default_value = "zh-Hans")]
        to: String,

        /// Ignore existing checkpoints
        #[arg(long)]
        fresh: bool,

        /// Align already aligned chapters again
        #[arg(long)]
        realign: bool,

        /// Chapter acceptance threshold [default: 0.8]
        #[arg(long)]
        accept_threshold: Option<f32>,

        /// Paragraph acceptance threshold [default: 0.7]
        #[arg(long)]
        align_threshold: Option<f32>,

        /// Write the combined book as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print a preview of the aligned chapters
        #[arg(short, long)]
        preview: bool,
    },
    /// Show the combined view of an aligned pair
    Preview {
        #[command(flatten)]
        books: BookPair,

        /// Print JSON instead of the coloured preview
        #[arg(long)]
        json: bool,
    },
    /// Clear alignments so the pair is aligned again
    Reset {
        #[command(flatten)]
        books: BookPair,

        /// Also drop the chapter matching
        #[arg(long)]
        rematch: bool,
    },
    /// Show checkpoint state for a pair
    Status {
        #[command(flatten)]
        books: BookPair,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let store = CheckpointStore::new(cli.checkpoint_dir.unwrap_or_else(default_checkpoint_dir));
    let reader = BookReader::new()?;

    match cli.command {
        Commands::Align {
            books,
            model_dir,
            translate,
            translator_key,
            translator_region,
            from,
            to,
            fresh,
            realign,
            accept_threshold,
            align_threshold,
            output,
            preview,
        } => {
            let (mut left, right) = read_pair(&reader, &books)?;
            if !fresh {
                if let Some(saved) = store.load_book(&left)? {
                    left = saved;
                }
            }

            let model = EmbeddingModel::load(&model_dir)
                .with_context(|| format!("failed to load model from {}", model_dir.display()))?;
            let scorer = SimilarityScorer::new(model);
            let mut matching = MatchConfig::new();
            if let Some(threshold) = accept_threshold {
                matching = matching.with_accept_threshold(threshold);
            }
            let mut alignment = AlignConfig::new();
            if let Some(threshold) = align_threshold {
                alignment = alignment.with_threshold(threshold);
            }
            let config = PipelineConfig::new()
                .with_matching(matching)
                .with_alignment(alignment)
                .with_realign(realign);
            let pipeline = Pipeline::new(&scorer, config)?.with_checkpoints(&store);

            if translate {
                let Some(key) = translator_key else {
                    bail!("--translate needs a translator key (BITEXT_TRANSLATOR_KEY)");
                };
                let translator = AzureTranslator::new(key, translator_region, from, to)?;
                pipeline.translate(&mut left, &translator)?;
            }

            let mut matcher = if fresh {
                ChapterMatcher::new(&left, &right, pipeline.config().matching.clone())?
            } else {
                pipeline.open_matcher(&left, &right)?
            };
            let report = pipeline.run(&mut left, &right, &mut matcher)?;
            print!("{report}");

            let combined = CombinedBook::build(&left, &right, matcher.matches());
            if let Some(path) = output {
                write_combined(&path, &combined)?;
            }
            if preview {
                print!("{}", combined.render_preview());
            }
        }
        Commands::Preview { books, json } => {
            let (left, right) = read_pair(&reader, &books)?;
            let (left, matcher) = restore(&store, &left, &right)?;
            let combined = CombinedBook::build(&left, &right, matcher.matches());
            if json {
                println!("{}", serde_json::to_string_pretty(&combined)?);
            } else {
                print!("{}", combined.render_preview());
            }
        }
        Commands::Reset { books, rematch } => {
            let (fresh, right) = read_pair(&reader, &books)?;
            let Some(mut left) = store.load_book(&fresh)? else {
                warn!(title = %fresh.title, "nothing to reset");
                return Ok(());
            };
            left.reset();
            let path = store.save_book(&left)?;
            info!(path = %path.display(), "alignment cleared");

            if rematch && store.remove_matcher(&left, &right)? {
                info!("chapter matching cleared");
            }
        }
        Commands::Status { books } => {
            let (left, right) = read_pair(&reader, &books)?;
            let counts = ChapterMatcher::check_chapter_counts(&left, &right);
            println!(
                "{}: {} chapters ({} main), {}: {} chapters ({} main)",
                left.title,
                left.chapters.len(),
                counts.left,
                right.title,
                right.chapters.len(),
                counts.right
            );

            let left = store.load_book(&left)?.unwrap_or(left);
            match store.load_matcher(&left, &right)? {
                Some(matcher) => {
                    let aligned = matcher
                        .matches()
                        .iter()
                        .filter(|m| left.chapters.get(m.left).is_some_and(Chapter::is_aligned))
                        .count();
                    let bad = matcher
                        .matches()
                        .iter()
                        .filter(|m| left.chapters.get(m.left).is_some_and(Chapter::is_bad_aligned))
                        .count();
                    println!(
                        "matching {}: {} pair(s), {} aligned, {} bad-aligned, {} unmatched",
                        if matcher.is_finished() { "finished" } else { "in progress" },
                        matcher.matches().len(),
                        aligned,
                        bad,
                        matcher.unmatched_left().len()
                    );
                    for issue in matcher.unmatched_issues(&left) {
                        println!("  unmatched: {issue}");
                    }
                }
                None => println!("not matched yet"),
            }
        }
    }

    Ok(())
}

fn read_pair(reader: &BookReader, books: &BookPair) -> Result<(Book, Book)> {
    let left = reader.read(&books.left)?;
    let right = reader.read(&books.right)?;
    Ok((left, right))
}

/// Restores the checkpointed left book and matcher of a pair.
fn restore(store: &CheckpointStore, left: &Book, right: &Book) -> Result<(Book, ChapterMatcher)> {
    let saved = store
        .load_book(left)?
        .with_context(|| format!("no checkpoint for {:?} in {}", left.title, store.dir().display()))?;
    saved.validate_subjects(right)?;
    let matcher = store
        .load_matcher(&saved, right)?
        .with_context(|| format!("{:?} has not been matched with {:?}", left.title, right.title))?;
    Ok((saved, matcher))
}

fn write_combined(path: &Path, combined: &CombinedBook) -> Result<()> {
    let json = serde_json::to_vec_pretty(combined)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), chapters = combined.chapters.len(), "combined book written");
    Ok(())
}
