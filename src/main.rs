//! KNotion anchor CLI
//!
//! Drives the anchoring session against a page snapshot on disk and a JSON
//! annotation store: capture a highlight, re-apply saved ones, remove or
//! list them.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use knotion_anchor::annotations::{AnnotationStore, JsonFileStore};
use knotion_anchor::config::Config;
use knotion_anchor::dom::{find_text, parse, to_markup, Document};
use knotion_anchor::{AnchorEngine, AnnotationSession, Selection};

/// Durable text highlights for page snapshots
#[derive(Parser, Debug)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// Annotation store (overrides KNOTION_STORE_PATH)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::FilePath)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Highlight text on a page and save it with a comment
    Capture {
        /// Page snapshot (well-formed XHTML)
        #[arg(value_hint = clap::ValueHint::FilePath)]
        page: PathBuf,

        /// Text to select; must lie within one text node
        #[arg(short, long)]
        text: String,

        /// Which match of `text` to select, counting from 0
        #[arg(long, default_value_t = 0)]
        occurrence: usize,

        /// Comment attached to the highlight
        #[arg(short, long)]
        comment: String,

        /// Write the highlighted page here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Re-apply saved highlights to a page
    Rehydrate {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        page: PathBuf,

        /// Write the highlighted page here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete a saved highlight
    Remove {
        /// Highlight id
        id: String,
    },

    /// List saved highlights for a page
    List {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        page: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "knotion_anchor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env: {}, using defaults", e);
        Config::default()
    });

    let cli = Cli::parse();
    let store_path = cli.store.unwrap_or(config.store.path.clone());
    tracing::debug!("Annotation store: {}", store_path.display());
    let store = JsonFileStore::new(store_path);

    match cli.command {
        Commands::Capture {
            page,
            text,
            occurrence,
            comment,
            output,
        } => {
            let mut doc = load_page(&page)?;
            let mut session = open_session(&config, store, &page);
            session.enable(&mut doc)?;

            let range = find_text(&doc, doc.root(), &text, occurrence)
                .with_context(|| format!("{:?} (match {}) not found in {}", text, occurrence, page.display()))?;
            if session
                .on_pointer_up(&doc, &Selection::from_range(range))
                .is_none()
            {
                bail!("Selection {:?} has no visible text", text);
            }
            let Some(highlight) = session.confirm(&mut doc, &comment)? else {
                bail!("Comment must not be blank");
            };

            println!("{}", highlight.id);
            if let Some(output) = output {
                write_page(&output, &doc)?;
            }
        }

        Commands::Rehydrate { page, output } => {
            let mut doc = load_page(&page)?;
            let mut session = open_session(&config, store, &page);
            let report = session.enable(&mut doc)?;

            for failure in &report.failed {
                eprintln!("{}: {}", failure.id, failure.error);
            }
            tracing::info!(
                "Applied {} highlights, {} failed",
                report.applied_count(),
                report.failed.len()
            );

            match output {
                Some(output) => write_page(&output, &doc)?,
                None => println!("{}", to_markup(&doc)),
            }
        }

        Commands::Remove { id } => {
            let mut store = store;
            if !store.delete(&id)? {
                bail!("No highlight with id {}", id);
            }
            tracing::info!("Removed highlight {}", id);
        }

        Commands::List { page } => {
            for record in store.load(&page_key(&page))? {
                println!(
                    "{}\t{}\t[{}, {})\t{}",
                    record.id,
                    record.created_at.to_rfc3339(),
                    record.range_start,
                    record.range_end,
                    record.text
                );
            }
        }
    }

    Ok(())
}

fn open_session(config: &Config, store: JsonFileStore, page: &Path) -> AnnotationSession<JsonFileStore> {
    let engine = AnchorEngine::new(config.marker.clone());
    AnnotationSession::create(engine, store, page_key(page))
}

/// Records are keyed by the page's file name so snapshots can move
fn page_key(page: &Path) -> String {
    page.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| page.display().to_string())
}

fn load_page(path: &Path) -> Result<Document> {
    let markup = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse(&markup).with_context(|| format!("Failed to parse {}", path.display()))
}

fn write_page(path: &Path, doc: &Document) -> Result<()> {
    fs::write(path, to_markup(doc)).with_context(|| format!("Failed to write {}", path.display()))
}
